use chrono::Local;
use simplelog::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// `off|error|warn|info|debug|trace`, case-insensitive.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// `cafe_log_<date>_<time>.txt` in the working directory
pub fn timestamped_log_name() -> PathBuf {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    PathBuf::from(format!("cafe_log_{}.txt", date_and_time))
}

/// Terminal logger, plus a file logger when `file` is given. Returns the file actually
/// opened. A second call in the same process leaves the first logger in place.
pub fn init_logging(level: LevelFilter, file: Option<&Path>) -> Result<Option<PathBuf>, String> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let mut opened = None;
    if let Some(path) = file {
        let handle = File::create(path)
            .map_err(|e| format!("cannot create log file {}: {}", path.display(), e))?;
        loggers.push(WriteLogger::new(level, Config::default(), handle));
        opened = Some(path.to_path_buf());
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => Ok(opened),
        Err(e) => Err(format!("logger already initialized: {}", e)),
    }
}
