//! Text rendering of the three rooms.
//!
//! Rendering only reads the session. The chef's HTML is not printed as is: tags are
//! stripped and the basic entities decoded first.
use crate::cafe::evaluator::{
    CHECK_TOLERANCE, DerivativeEvaluator, MathEngine, ResultBundle, VARIABLES, cross_check,
};
use crate::cafe::session::{CafeSession, View};
use log::{info, warn};
use regex::Regex;
use std::error::Error;
use std::sync::LazyLock;
use strum::IntoEnumIterator;
use tabled::{builder::Builder, settings::Style};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</p\s*>|</li\s*>|</h[1-6]\s*>|</ul\s*>").unwrap()
});
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li[^>]*>").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Plain text of an HTML fragment.
pub fn html_to_text(html: &str) -> String {
    let text = BREAK.replace_all(html, "\n");
    let text = BULLET.replace_all(&text, "• ");
    let text = TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let text = BLANK_LINES.replace_all(&text, "\n");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn table(rows: Vec<[String; 2]>) -> String {
    let mut builder = Builder::default();
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

/// Every field of a bundle, full precision; used by the `eval` command.
pub fn bundle_table(expression: &str, bundle: &ResultBundle) -> String {
    let mut rows = vec![
        ["calculation".to_string(), bundle.kind().to_string()],
        ["f(x, y)".to_string(), expression.to_string()],
    ];
    match bundle {
        ResultBundle::Partial {
            f_x,
            f_y,
            val_x,
            val_y,
        } => {
            rows.push(["∂f/∂x".to_string(), f_x.clone()]);
            rows.push(["∂f/∂y".to_string(), f_y.clone()]);
            rows.push(["∂f/∂x at point".to_string(), val_x.to_string()]);
            rows.push(["∂f/∂y at point".to_string(), val_y.to_string()]);
        }
        ResultBundle::Directional {
            f_x,
            f_y,
            vx,
            vy,
            u,
            v,
            directional_deriv,
        } => {
            rows.push(["∂f/∂x".to_string(), f_x.clone()]);
            rows.push(["∂f/∂y".to_string(), f_y.clone()]);
            rows.push(["gradient".to_string(), format!("({}, {})", vx, vy)]);
            rows.push(["unit heading".to_string(), format!("({}, {})", u, v)]);
            rows.push(["directional derivative".to_string(), directional_deriv.to_string()]);
        }
    }
    table(rows)
}

fn nav_bar(active: View) -> String {
    let rooms: Vec<String> = View::iter()
        .map(|view| {
            if view == active {
                format!("[{}]", view)
            } else {
                view.to_string()
            }
        })
        .collect();
    format!("☕ MatchaBerry Cafe    {}", rooms.join("  "))
}

const PARTIAL_FACTS: [(&str, &str); 3] = [
    (
        "Instantaneous Rate",
        "Measures how a function changes as only one variable varies, while others are held strictly constant.",
    ),
    (
        "Geometric Tangents",
        "Defines the slope of a line tangent to the surface at a specific point, parallel to the coordinate axes.",
    ),
    (
        "Simplified View",
        "Allows us to treat complex surfaces as a collection of single-variable curves for easier analysis.",
    ),
];

const DIRECTIONAL_FACTS: [(&str, &str); 3] = [
    (
        "Full Directionality",
        "Finds the slope of a surface in any direction, extending the concept beyond just the X and Y axes.",
    ),
    (
        "Gradient Connection",
        "Directly computed using the dot product of the Gradient vector (∇f) and a unit direction vector.",
    ),
    (
        "Steepest Path",
        "The maximum value always occurs in the direction of the Gradient vector itself.",
    ),
];

const MENU: [(&str, &str); 8] = [
    ("Economics", "Companies use partial derivatives to calculate marginal revenue and optimize profit per price increase."),
    ("Weather", "Meteorologists track temperature gradients over space and time to predict storms and cold fronts."),
    ("Engineering", "Optimize material density vs weight for bridges by calculating how stress varies across beams."),
    ("Medicine", "MRI scans use rates of signal change in X and Y directions to reconstruct clear 3D images of tissue."),
    ("Navigation", "GPS finds the steepest uphill path using gradients to help hikers or rescue teams plan safe routes."),
    ("AI Training", "Neural networks learn through gradient descent, 'climbing down' error surfaces to find best models."),
    ("Graphics", "Games use directional derivatives to calculate surface light reflection for realistic 3D shadows."),
    ("Self-Driving", "Autopilot systems use gradients of cost functions to decide the safest direction to steer the vehicle."),
];

pub fn render_lobby() -> String {
    let mut out = String::new();
    out.push_str("✿ Pastel Calculus Treats ✿\n\n");
    out.push_str("Freshly Brewed Calculus\n");
    out.push_str(
        "A delightful space where math meets matcha. Explore the geometry of surfaces\n\
         with our cute AI-powered bakery! Type 'bakery' to step in.\n\n",
    );
    for (title, facts) in [
        ("Partial Derivatives", PARTIAL_FACTS),
        ("Directional Derivatives", DIRECTIONAL_FACTS),
    ] {
        out.push_str(title);
        out.push('\n');
        for (name, text) in facts {
            out.push_str(&format!("  ✓ {}: {}\n", name, text));
        }
        out.push('\n');
    }
    out.push_str("Real-World Menu\n");
    out.push_str(&table(
        MENU.iter()
            .map(|(name, text)| [name.to_string(), text.to_string()])
            .collect(),
    ));
    out
}

fn chef_notes<E: MathEngine>(session: &CafeSession<E>) -> String {
    if session.is_loading() {
        "The chef is whisking up an explanation...".to_string()
    } else if !session.explanations_enabled() {
        "(the chef is off duty)".to_string()
    } else if session.explanation().is_empty() {
        "(nothing yet)".to_string()
    } else {
        html_to_text(session.explanation())
    }
}

fn error_line<E: MathEngine>(session: &CafeSession<E>) -> String {
    match session.last_error() {
        Some(e) => format!("⚠ this recipe did not bake: {}\n\n", e),
        None => String::new(),
    }
}

pub fn render_bakery<E: MathEngine>(session: &CafeSession<E>) -> String {
    let point = session.point();
    let mut out = String::new();
    out.push_str("The Partial Slicer\n\n");
    out.push_str(&table(vec![
        ["Recipe".to_string(), session.expression().to_string()],
        ["X-Coord".to_string(), point.x.to_string()],
        ["Y-Coord".to_string(), point.y.to_string()],
    ]));
    out.push_str("\n\n");
    out.push_str(&error_line(session));
    out.push_str("Measurements\n");
    let rows = match session.results() {
        Some(ResultBundle::Partial {
            f_x,
            f_y,
            val_x,
            val_y,
        }) => vec![
            ["∂f/∂x:".to_string(), format!("{:.2}    ({})", val_x, f_x)],
            ["∂f/∂y:".to_string(), format!("{:.2}    ({})", val_y, f_y)],
        ],
        _ => vec![
            ["∂f/∂x:".to_string(), String::new()],
            ["∂f/∂y:".to_string(), String::new()],
        ],
    };
    out.push_str(&table(rows));
    out.push_str("\n\nChef's Recipe\n");
    out.push_str(&chef_notes(session));
    out
}

pub fn render_path<E: MathEngine>(session: &CafeSession<E>) -> String {
    let point = session.point();
    let heading = session.direction();
    let mut out = String::new();
    out.push_str("The Path Finder\n\n");
    out.push_str(&table(vec![
        ["Recipe Formula".to_string(), session.expression().to_string()],
        ["Starting Point (x,y)".to_string(), format!("({}, {})", point.x, point.y)],
        ["Heading (u,v)".to_string(), format!("({}, {})", heading.u, heading.v)],
    ]));
    out.push_str("\n\n");
    out.push_str(&error_line(session));
    out.push_str("Path Slope\n");
    let rows = match session.results() {
        Some(ResultBundle::Directional {
            vx,
            vy,
            u,
            v,
            directional_deriv,
            ..
        }) => vec![
            ["Slope".to_string(), format!("{:.3}", directional_deriv)],
            ["Heading".to_string(), format!("({:.1}, {:.1})", u, v)],
            ["Gradient".to_string(), format!("({:.1}, {:.1})", vx, vy)],
        ],
        _ => vec![
            ["Slope".to_string(), String::new()],
            ["Heading".to_string(), String::new()],
            ["Gradient".to_string(), String::new()],
        ],
    };
    out.push_str(&table(rows));
    out.push_str("\n\nDiscovery Notes\n");
    out.push_str(&chef_notes(session));
    out
}

/// The active room under the navigation bar.
pub fn render<E: MathEngine>(session: &CafeSession<E>) -> String {
    let body = match session.view() {
        View::Lobby => render_lobby(),
        View::Partial => render_bakery(session),
        View::Directional => render_path(session),
    };
    format!("{}\n\n{}\n", nav_bar(session.view()), body)
}

/// What `matchaberry eval` prints: the bundle as a table, or as JSON. With `check` the
/// partials are compared against a central difference; the verdict is appended to the
/// table and logged either way.
pub fn eval_report<E: MathEngine>(
    evaluator: &DerivativeEvaluator<E>,
    expression: &str,
    point: (f64, f64),
    heading: Option<(f64, f64)>,
    json: bool,
    check: bool,
) -> Result<String, Box<dyn Error>> {
    let (x, y) = point;
    let bundle = match heading {
        Some((u, v)) => evaluator.compute_directional(expression, x, y, u, v)?,
        None => evaluator.compute_partial(expression, x, y)?,
    };
    let mut out = if json {
        serde_json::to_string_pretty(&bundle)?
    } else {
        bundle_table(expression, &bundle)
    };
    if check {
        let gaps = cross_check(expression, x, y, CHECK_TOLERANCE)?;
        for (var, (gap, ok)) in VARIABLES.iter().zip(gaps) {
            let verdict = if ok { "ok" } else { "MISMATCH" };
            if ok {
                info!("∂f/∂{} agrees with the central difference, gap {:e}", var, gap);
            } else {
                warn!("∂f/∂{} is off the central difference by {:e}", var, gap);
            }
            if !json {
                out.push_str(&format!("\ncheck ∂f/∂{}: gap {:.1e} {}", var, gap, verdict));
            }
        }
    }
    Ok(out)
}
