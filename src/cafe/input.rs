//! Terminal commands of the cafe and lenient number input.
use crate::cafe::session::View;
use std::path::PathBuf;

/// Number typed by the user. Anything that is not a finite number counts as `0`.
pub fn coerce_number(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Two numbers from the first two arguments; a missing one is `0`.
pub fn coerce_pair(args: &[&str]) -> (f64, f64) {
    let first = args.first().map(|a| coerce_number(a)).unwrap_or(0.0);
    let second = args.get(1).map(|a| coerce_number(a)).unwrap_or(0.0);
    (first, second)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Go(View),
    Expression(String),
    Point(f64, f64),
    Direction(f64, f64),
    Image(PathBuf),
    Plot(PathBuf),
    Export(PathBuf),
    Show,
    Help,
    Quit,
    Empty,
    /// the message says what is wrong with the line
    Invalid(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();
    let needs_file = |make: fn(PathBuf) -> Command| {
        if rest.is_empty() {
            Command::Invalid(format!("usage: {} <file>", word))
        } else {
            make(PathBuf::from(rest))
        }
    };
    match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "lobby" | "bakery" | "partial" | "path" | "directional" => match word.parse::<View>() {
            Ok(view) => Command::Go(view),
            Err(e) => Command::Invalid(e),
        },
        "expr" if rest.is_empty() => Command::Invalid("usage: expr <f(x, y)>".to_string()),
        "expr" => Command::Expression(rest.to_string()),
        "point" => {
            let (x, y) = coerce_pair(&args);
            Command::Point(x, y)
        }
        "dir" => {
            let (u, v) = coerce_pair(&args);
            Command::Direction(u, v)
        }
        "image" => needs_file(Command::Image),
        "plot" => needs_file(Command::Plot),
        "export" => needs_file(Command::Export),
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("unknown command '{}', try 'help'", other)),
    }
}

pub const HELP: &str = "\
  lobby | bakery | path    walk to a room (aliases: partial, directional)
  expr <f(x, y)>           new recipe, e.g. expr sin(x)*exp(y)
  point <x> <y>            evaluation point
  dir <u> <v>              heading on the Path
  image <file>             read a recipe off a photo
  plot <file.png|svg>      draw the surface around the point
  export <file.csv>        save the sampled surface
  show                     print the current room
  help                     this list
  quit                     leave the cafe";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(" 2.5 "), 2.5);
        assert_eq!(coerce_number("-3"), -3.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
    }

    #[test]
    fn test_point_and_direction() {
        assert_eq!(parse_command("point 1 2"), Command::Point(1.0, 2.0));
        assert_eq!(parse_command("point 1 oops"), Command::Point(1.0, 0.0));
        assert_eq!(parse_command("dir"), Command::Direction(0.0, 0.0));
        assert_eq!(parse_command("DIR -1 0.5"), Command::Direction(-1.0, 0.5));
    }

    #[test]
    fn test_navigation_aliases() {
        assert_eq!(parse_command("bakery"), Command::Go(View::Partial));
        assert_eq!(parse_command("partial"), Command::Go(View::Partial));
        assert_eq!(parse_command("Path"), Command::Go(View::Directional));
        assert_eq!(parse_command("directional"), Command::Go(View::Directional));
        assert_eq!(parse_command("lobby"), Command::Go(View::Lobby));
    }

    #[test]
    fn test_expression_keeps_spaces() {
        assert_eq!(
            parse_command("expr  x^2 -  y^2 "),
            Command::Expression("x^2 -  y^2".to_string())
        );
        assert!(matches!(parse_command("expr"), Command::Invalid(_)));
    }

    #[test]
    fn test_file_commands() {
        assert_eq!(
            parse_command("plot my surface.svg"),
            Command::Plot(PathBuf::from("my surface.svg"))
        );
        assert_eq!(parse_command("export grid.csv"), Command::Export(PathBuf::from("grid.csv")));
        assert!(matches!(parse_command("image"), Command::Invalid(_)));
    }

    #[test]
    fn test_misc() {
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(parse_command("q"), Command::Quit);
        assert_eq!(parse_command("help"), Command::Help);
        assert!(matches!(parse_command("brew tea"), Command::Invalid(_)));
    }
}
