// ABOUTME: Error types for the extraction engine including ErrorCode enum and ExtractError struct.
// ABOUTME: Configuration and I/O failures only; missing data and failed casts are never errors.

use std::fmt;

/// Error codes representing the categories of configuration and I/O failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A step string without the `action:argument` separator.
    InvalidStep,
    /// A step action other than `get`, `find` or `haveText`.
    UnknownAction,
    /// A step with an empty argument.
    MissingArgument,
    /// A `get` argument the selector engine rejects.
    InvalidSelector,
    /// A `customFunction` name that is not registered.
    UnknownFunction,
    /// A field rule that is structurally unusable.
    InvalidConfig,
    /// Reading a config file or an HTML snapshot failed.
    Io,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidStep => "invalid step syntax",
            ErrorCode::UnknownAction => "unsupported step action",
            ErrorCode::MissingArgument => "step missing argument",
            ErrorCode::InvalidSelector => "invalid selector",
            ErrorCode::UnknownFunction => "unknown custom function",
            ErrorCode::InvalidConfig => "invalid field config",
            ErrorCode::Io => "i/o error",
        };
        write!(f, "{}", s)
    }
}

/// The error type for building an engine and loading its inputs.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    /// Field path (or file path for I/O errors) the error belongs to.
    pub field: String,
    /// The offending step text or operation name.
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unipage: {} {}: {}", self.op, self.field, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(code: ErrorCode, field: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            code,
            field: field.into(),
            op: op.into(),
            source: None,
        }
    }

    /// Create an InvalidStep error for a step without a separator.
    pub fn invalid_step(step: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidStep, String::new(), step)
    }

    /// Create an UnknownAction error.
    pub fn unknown_action(step: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownAction, String::new(), step)
    }

    /// Create a MissingArgument error.
    pub fn missing_argument(step: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingArgument, String::new(), step)
    }

    /// Create an InvalidSelector error.
    pub fn invalid_selector(step: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSelector, String::new(), step)
    }

    /// Create an UnknownFunction error.
    pub fn unknown_function(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownFunction, field, name)
    }

    /// Create an InvalidConfig error with a description of what is wrong.
    pub fn invalid_config(
        field: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            source,
            ..Self::new(ErrorCode::InvalidConfig, field, op)
        }
    }

    /// Create an Io error for the given path.
    pub fn io(path: impl Into<String>, op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            source,
            ..Self::new(ErrorCode::Io, path, op)
        }
    }

    /// Attach the field path the error occurred in.
    pub fn in_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Returns true if the error comes from malformed step text or an unusable rule.
    pub fn is_config(&self) -> bool {
        self.code != ErrorCode::Io
    }

    /// Returns true if this is an UnknownFunction error.
    pub fn is_unknown_function(&self) -> bool {
        self.code == ErrorCode::UnknownFunction
    }

    /// Returns true if this is an Io error.
    pub fn is_io(&self) -> bool {
        self.code == ErrorCode::Io
    }
}
