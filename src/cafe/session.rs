//! # Cafe Session
//!
//! All state of one visit to the cafe: the recipe (expression), the point, the heading,
//! the active view, the last result bundle and the chef's last explanation.
//!
//! Every committed change runs one [`CafeSession::recompute`] for the active view. A
//! successful computation produces a [`ServiceRequest`] for the chef; the caller ships it
//! to a background worker and later feeds the [`ServiceReply`] back through
//! [`CafeSession::apply_reply`]. Requests are numbered, and only the reply to the latest
//! request of its channel is committed, so a slow answer about an old recipe never
//! replaces the answer about the current one.
//!
//! The session never blocks and never touches the network itself.
use crate::Utils::config::SessionSettings;
use crate::cafe::evaluator::{
    CalculationKind, DerivativeEvaluator, MathEngine, ResultBundle, SymbolicEngine,
};
use crate::cafe::service::{ServiceError, clean_extracted_expression};
use crate::symbolic::symbolic_errors::ComputationError;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::str::FromStr;
use strum_macros::{Display, EnumIter};

/// The three mutually exclusive pages of the cafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum View {
    #[default]
    Lobby,
    /// partial derivative workbench
    #[strum(serialize = "Bakery")]
    Partial,
    /// directional derivative workbench
    #[strum(serialize = "Path")]
    Directional,
}

impl FromStr for View {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lobby" => Ok(View::Lobby),
            "bakery" | "partial" => Ok(View::Partial),
            "path" | "directional" => Ok(View::Directional),
            other => Err(format!("no such room: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Heading as typed, not normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Direction {
    pub u: f64,
    pub v: f64,
}

impl Default for Direction {
    fn default() -> Self {
        Direction { u: 1.0, v: 1.0 }
    }
}

/// Work for the background chef.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRequest {
    Explain {
        seq: u64,
        kind: CalculationKind,
        expression: String,
        results: ResultBundle,
    },
    ExtractExpression {
        seq: u64,
        image_base64: String,
        mime: String,
    },
}

impl ServiceRequest {
    pub fn seq(&self) -> u64 {
        match self {
            ServiceRequest::Explain { seq, .. } | ServiceRequest::ExtractExpression { seq, .. } => {
                *seq
            }
        }
    }
}

/// What came back; the variant names the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceOutcome {
    Explanation(Result<String, ServiceError>),
    Expression(Result<String, ServiceError>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReply {
    pub seq: u64,
    pub outcome: ServiceOutcome,
}

pub struct CafeSession<E: MathEngine = SymbolicEngine> {
    evaluator: DerivativeEvaluator<E>,
    view: View,
    expression: String,
    point: Point,
    direction: Direction,
    results: Option<ResultBundle>,
    last_error: Option<ComputationError>,
    explanation: String,
    explanations_enabled: bool,
    // latest issued sequence numbers and whether their replies are still due
    explain_seq: u64,
    explain_pending: bool,
    extract_seq: u64,
    extract_pending: bool,
}

impl CafeSession<SymbolicEngine> {
    pub fn new() -> Self {
        Self::with_settings(DerivativeEvaluator::new(SymbolicEngine), &SessionSettings::default())
    }
}

impl Default for CafeSession<SymbolicEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: MathEngine> CafeSession<E> {
    pub fn with_settings(evaluator: DerivativeEvaluator<E>, settings: &SessionSettings) -> Self {
        CafeSession {
            evaluator,
            view: View::Lobby,
            expression: settings.expression.clone(),
            point: Point {
                x: settings.point[0],
                y: settings.point[1],
            },
            direction: Direction {
                u: settings.direction[0],
                v: settings.direction[1],
            },
            results: None,
            last_error: None,
            explanation: String::new(),
            explanations_enabled: true,
            explain_seq: 0,
            explain_pending: false,
            extract_seq: 0,
            extract_pending: false,
        }
    }

    /// Without explanations no [`ServiceRequest::Explain`] is ever issued.
    pub fn set_explanations_enabled(&mut self, enabled: bool) {
        self.explanations_enabled = enabled;
    }

    pub fn explanations_enabled(&self) -> bool {
        self.explanations_enabled
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn results(&self) -> Option<&ResultBundle> {
        self.results.as_ref()
    }

    /// Error of the latest computation, cleared by the next success.
    pub fn last_error(&self) -> Option<&ComputationError> {
        self.last_error.as_ref()
    }

    /// Raw HTML as received.
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// true while the reply to the latest explanation or extraction request is due
    pub fn is_loading(&self) -> bool {
        self.explain_pending || self.extract_pending
    }

    pub fn navigate(&mut self, view: View) -> Option<ServiceRequest> {
        info!("entering the {}", view);
        self.view = view;
        self.recompute()
    }

    pub fn set_expression(&mut self, expression: &str) -> Option<ServiceRequest> {
        self.expression = expression.trim().to_string();
        self.recompute()
    }

    pub fn set_point(&mut self, x: f64, y: f64) -> Option<ServiceRequest> {
        self.point = Point { x, y };
        self.recompute()
    }

    /// The heading only matters on the Path.
    pub fn set_direction(&mut self, u: f64, v: f64) -> Option<ServiceRequest> {
        self.direction = Direction { u, v };
        match self.view {
            View::Directional => self.recompute(),
            _ => None,
        }
    }

    /// Runs the computation of the active view. On success the bundle is stored and an
    /// explanation request is returned; on failure the previous bundle stays and nothing
    /// is requested.
    pub fn recompute(&mut self) -> Option<ServiceRequest> {
        let Point { x, y } = self.point;
        let outcome = match self.view {
            View::Lobby => return None,
            View::Partial => self.evaluator.compute_partial(&self.expression, x, y),
            View::Directional => {
                let Direction { u, v } = self.direction;
                self.evaluator
                    .compute_directional(&self.expression, x, y, u, v)
            }
        };
        match outcome {
            Ok(bundle) => {
                debug!("{}: {:?}", self.expression, bundle);
                self.last_error = None;
                self.results = Some(bundle.clone());
                self.issue_explanation(bundle)
            }
            Err(e) => {
                error!("cannot compute derivatives of '{}': {}", self.expression, e);
                self.last_error = Some(e);
                None
            }
        }
    }

    fn issue_explanation(&mut self, results: ResultBundle) -> Option<ServiceRequest> {
        if !self.explanations_enabled {
            return None;
        }
        self.explain_seq += 1;
        self.explain_pending = true;
        Some(ServiceRequest::Explain {
            seq: self.explain_seq,
            kind: results.kind(),
            expression: self.expression.clone(),
            results,
        })
    }

    /// Request to read a recipe off a photo.
    pub fn request_extraction(&mut self, image_base64: String, mime: &str) -> ServiceRequest {
        self.extract_seq += 1;
        self.extract_pending = true;
        ServiceRequest::ExtractExpression {
            seq: self.extract_seq,
            image_base64,
            mime: mime.to_string(),
        }
    }

    /// Commits a reply if it answers the latest request of its channel. An extracted
    /// recipe replaces the expression, which may in turn produce an explanation request.
    pub fn apply_reply(&mut self, reply: ServiceReply) -> Option<ServiceRequest> {
        match reply.outcome {
            ServiceOutcome::Explanation(result) => {
                if reply.seq != self.explain_seq {
                    debug!("dropping stale explanation #{} (latest #{})", reply.seq, self.explain_seq);
                    return None;
                }
                self.explain_pending = false;
                match result {
                    Ok(html) => self.explanation = html,
                    Err(e) => warn!("the chef could not explain: {}", e),
                }
                None
            }
            ServiceOutcome::Expression(result) => {
                if reply.seq != self.extract_seq {
                    debug!("dropping stale extraction #{} (latest #{})", reply.seq, self.extract_seq);
                    return None;
                }
                self.extract_pending = false;
                match result {
                    Ok(raw) => {
                        let recipe = clean_extracted_expression(&raw);
                        if recipe.is_empty() {
                            warn!("the chef found no recipe in the photo");
                            return None;
                        }
                        info!("recipe read from photo: {}", recipe);
                        self.set_expression(&recipe)
                    }
                    Err(e) => {
                        warn!("the chef could not read the photo: {}", e);
                        None
                    }
                }
            }
        }
    }
}
