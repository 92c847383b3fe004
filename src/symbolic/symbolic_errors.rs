//! Errors raised by the symbolic engine: parsing a string, differentiating the
//! resulting tree and evaluating it at a point.
use std::fmt;

/// Everything that can go wrong between a user-typed formula and a number.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputationError {
    /// The input is not a well-formed expression
    Parse {
        input: String,
        position: usize,
        message: String,
    },
    /// `name(...)` where `name` is not a supported function
    UnknownFunction(String),
    /// evaluation met a variable that has no value in the scope
    UnknownVariable(String),
    /// empty or whitespace-only input
    EmptyExpression,
}

impl ComputationError {
    pub(crate) fn parse_error(input: &str, remaining: &str, message: &str) -> Self {
        let position = input.len().saturating_sub(remaining.len());
        ComputationError::Parse {
            input: input.to_string(),
            position,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputationError::Parse {
                input,
                position,
                message,
            } => write!(
                f,
                "cannot parse '{}' at position {}: {}",
                input, position, message
            ),
            ComputationError::UnknownFunction(name) => write!(f, "unknown function '{}'", name),
            ComputationError::UnknownVariable(name) => {
                write!(f, "variable '{}' has no value", name)
            }
            ComputationError::EmptyExpression => write!(f, "expression is empty"),
        }
    }
}

impl std::error::Error for ComputationError {}
