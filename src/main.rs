#![allow(non_snake_case)]
use MatchaBerryCafe::Utils::config::CafeConfig;
use MatchaBerryCafe::Utils::logger::save_surface_to_csv;
use MatchaBerryCafe::Utils::logging::{init_logging, parse_level, timestamped_log_name};
use MatchaBerryCafe::Utils::plots::{plot_surface, sample_surface};
use MatchaBerryCafe::cafe::evaluator::{DerivativeEvaluator, SymbolicEngine};
use MatchaBerryCafe::cafe::input::{Command, HELP, coerce_pair, parse_command};
use MatchaBerryCafe::cafe::service::{ChefService, GeminiClient, encode_image, mime_from_path};
use MatchaBerryCafe::cafe::session::CafeSession;
use MatchaBerryCafe::cafe::views::{eval_report, render};
use MatchaBerryCafe::cafe::worker::ServiceWorker;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use simplelog::LevelFilter;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "matchaberry")]
#[command(about = "MatchaBerry Cafe: partial and directional derivatives served in the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: <config dir>/matchaberry/config.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Starting recipe, e.g. "sin(x)*exp(y)"
    #[arg(long, value_name = "EXPR")]
    expr: Option<String>,

    /// off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Also log to a file; without a name a timestamped one is created
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    /// No chef: explanations and photo reading are disabled
    #[arg(long)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the derivatives once and print them
    Eval {
        /// f(x, y)
        expression: String,

        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true, required = true)]
        point: Vec<String>,

        /// heading; gives the directional derivative instead of the partials
        #[arg(long, num_args = 2, value_names = ["U", "V"], allow_negative_numbers = true)]
        dir: Option<Vec<String>>,

        /// print the result bundle as JSON
        #[arg(long)]
        json: bool,

        /// compare the partials against a central difference
        #[arg(long)]
        check: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CafeConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let level_name = cli.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    let level = parse_level(&level_name);
    let log_file = match &cli.log_file {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(timestamped_log_name()),
        None => config.logging.file.clone(),
    };
    match init_logging(level.unwrap_or(LevelFilter::Info), log_file.as_deref()) {
        Ok(Some(path)) => info!("logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("{}", e),
    }
    if level.is_none() {
        warn!("unknown log level '{}', using info", level_name);
    }

    match cli.command {
        Some(Commands::Eval {
            expression,
            point,
            dir,
            json,
            check,
        }) => run_eval(&expression, &point, dir.as_deref(), json, check),
        None => run_cafe(&cli.expr, cli.offline, &config),
    }
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

fn run_eval(
    expression: &str,
    point: &[String],
    dir: Option<&[String]>,
    json: bool,
    check: bool,
) -> ExitCode {
    let point = coerce_pair(&as_strs(point));
    let heading = dir.map(|dir| coerce_pair(&as_strs(dir)));
    let evaluator = DerivativeEvaluator::new(SymbolicEngine);
    match eval_report(&evaluator, expression, point, heading, json, check) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(1)
        }
    }
}

fn open_kitchen(offline: bool, config: &CafeConfig) -> Option<ServiceWorker> {
    if offline {
        info!("offline: the chef is off duty");
        return None;
    }
    match GeminiClient::from_env(&config.service) {
        Ok(client) => {
            let chef: Arc<dyn ChefService> = Arc::new(client);
            Some(ServiceWorker::new(chef))
        }
        Err(e) => {
            warn!("{}; explanations are disabled", e);
            None
        }
    }
}

fn run_cafe(expr: &Option<String>, offline: bool, config: &CafeConfig) -> ExitCode {
    let mut settings = config.session.clone();
    if let Some(expr) = expr {
        settings.expression = expr.clone();
    }
    let mut session = CafeSession::with_settings(DerivativeEvaluator::new(SymbolicEngine), &settings);
    let worker = open_kitchen(offline, config);
    session.set_explanations_enabled(worker.is_some());
    let timeout = Duration::from_secs(config.service.timeout_secs + 1);

    println!("{}", render(&session));
    println!("type 'help' for the menu");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("☕ > ");
        let _ = io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                error!("cannot read input: {}", e);
                return ExitCode::from(1);
            }
            None => break,
        };
        let request = match parse_command(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Invalid(message) => {
                println!("{}", message);
                continue;
            }
            Command::Show => None,
            Command::Go(view) => session.navigate(view),
            Command::Expression(text) => session.set_expression(&text),
            Command::Point(x, y) => session.set_point(x, y),
            Command::Direction(u, v) => session.set_direction(u, v),
            Command::Image(path) => {
                if worker.is_none() {
                    println!("the chef is off duty, no photos today");
                    continue;
                }
                match fs::read(&path) {
                    Ok(bytes) => {
                        Some(session.request_extraction(encode_image(&bytes), mime_from_path(&path)))
                    }
                    Err(e) => {
                        error!("cannot read {}: {}", path.display(), e);
                        continue;
                    }
                }
            }
            Command::Plot(path) => {
                let point = session.point();
                match plot_surface(session.expression(), (point.x, point.y), &config.plot, &path) {
                    Ok(_) => println!("surface served at {}", path.display()),
                    Err(e) => error!("cannot plot: {}", e),
                }
                continue;
            }
            Command::Export(path) => {
                let point = session.point();
                let grid = sample_surface(
                    session.expression(),
                    (point.x, point.y),
                    config.plot.half_range,
                    config.plot.samples,
                );
                match grid.map(|grid| save_surface_to_csv(&grid, &path)) {
                    Ok(Ok(())) => println!("surface exported to {}", path.display()),
                    Ok(Err(e)) => error!("cannot write {}: {}", path.display(), e),
                    Err(e) => error!("cannot sample: {}", e),
                }
                continue;
            }
        };
        if let Some(worker) = &worker {
            if let Some(request) = request {
                worker.submit(request);
            }
            worker.settle(&mut session, timeout);
        }
        println!("{}", render(&session));
    }
    info!("the cafe is closed, see you soon");
    ExitCode::SUCCESS
}
