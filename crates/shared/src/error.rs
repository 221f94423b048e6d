use thiserror::Error;

/// Why a command line does not match the device grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("empty command line")]
    Empty,
    #[error("unknown verb `{0}`")]
    UnknownVerb(String),
    #[error("unknown {kind} `{token}`")]
    UnknownToken { kind: &'static str, token: String },
    #[error("`{verb}` expects {expected} arguments, got {actual}")]
    Arity {
        verb: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid value `{value}` for {field}")]
    InvalidValue { field: &'static str, value: String },
}

/// A configuration value that parsed but falls outside what the panel supports.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{source_name} opacity {value} outside [0, 1]")]
    OpacityOutOfRange { source_name: &'static str, value: f64 },
    #[error("{source_name} scale {value} must be finite and positive")]
    InvalidScale { source_name: &'static str, value: f64 },
    #[error("background mode `{0}` is not a single token")]
    InvalidBackground(String),
}
