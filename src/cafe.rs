//! The cafe itself: derivative workbenches, the chef who explains results and the
//! terminal rooms they are shown in.
///____________________________________________________________________________________________________________________________
/// # Derivative evaluator
/// partial and directional derivatives of f(x, y) at a point through an injected `MathEngine`
///# Example#
/// ```
/// use MatchaBerryCafe::cafe::evaluator::{DerivativeEvaluator, SymbolicEngine};
/// let evaluator = DerivativeEvaluator::new(SymbolicEngine);
/// let bundle = evaluator.compute_directional("x^2 - y^2", 1.0, 2.0, 1.0, 1.0).unwrap();
/// println!("{:?}", bundle);
/// ```
pub mod evaluator;
/// command line parsing and lenient numbers
pub mod input;
/// the chef: explanation and image-to-recipe requests (Gemini)
pub mod service;
///____________________________________________________________________________________________________________________________
/// # Session
/// stores, view routing, recompute trigger and sequence-numbered service replies
///# Example#
/// ```
/// use MatchaBerryCafe::cafe::session::{CafeSession, View};
/// let mut session = CafeSession::new();
/// session.set_explanations_enabled(false);
/// session.set_point(1.0, 2.0);
/// session.navigate(View::Partial);
/// println!("{}", MatchaBerryCafe::cafe::views::render(&session));
/// ```
pub mod session;
mod session_tests;
/// text rendering of the rooms
pub mod views;
/// background threads for service calls
pub mod worker;
