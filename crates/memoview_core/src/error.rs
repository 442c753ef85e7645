//! Error types for memoview_core

use std::sync::Arc;

use thiserror::Error;

/// A comparator could not decide whether two inputs are equal.
///
/// Memo cells treat this as a forced cache miss.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("comparator failed{}: {message}", input_suffix(.input))]
pub struct EqualityError {
    /// Name of the input being compared, if the comparator was per-input
    pub input: Option<Arc<str>>,
    /// What went wrong
    pub message: String,
}

impl EqualityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            input: None,
            message: message.into(),
        }
    }

    /// Attach the input name this comparison was made for
    pub fn for_input(mut self, name: impl Into<Arc<str>>) -> Self {
        self.input = Some(name.into());
        self
    }
}

fn input_suffix(input: &Option<Arc<str>>) -> String {
    match input {
        Some(name) => format!(" for input `{name}`"),
        None => String::new(),
    }
}

/// Errors raised by render functions and callbacks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A required input was not present in the input set
    #[error("missing input `{0}`")]
    MissingInput(Arc<str>),

    /// An input was present but held the wrong kind of value
    #[error("input `{input}` expected {expected}, found {found}")]
    TypeMismatch {
        input: Arc<str>,
        expected: &'static str,
        found: &'static str,
    },

    /// The render function itself failed
    #[error("render failed: {0}")]
    Failed(String),
}

impl RenderError {
    pub fn failed(message: impl Into<String>) -> Self {
        RenderError::Failed(message.into())
    }
}

/// Result type for render functions
pub type Result<T> = std::result::Result<T, RenderError>;
