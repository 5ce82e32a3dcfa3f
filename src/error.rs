use thiserror::Error;

/// A value that cannot be written as JSON text.
#[derive(Error, Debug, PartialEq)]
pub enum EncodingError {
    #[error("cannot encode non-finite number `{0}`")]
    NonFiniteNumber(f64),

    #[error("duplicate key `{0}` in object")]
    DuplicateKey(String),

    #[error("nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("error at line {line_number}: {message}")]
    Syntax { message: String, line_number: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn new(message: String, line_number: usize) -> Self {
        ParseError::Syntax {
            message,
            line_number,
        }
    }
}

/// Raised when a `Value` does not have the shape a typed config expects.
/// `path` locates the offending value from the root, e.g. `.conf.complex.list[2]`.
#[derive(Error, Debug, PartialEq)]
pub enum ConversionError {
    #[error("type mismatch at `${path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} at `${path}` does not fit in {target}")]
    OutOfRange {
        path: String,
        value: String,
        target: &'static str,
    },

    #[error("missing required member `${path}`")]
    MissingMember { path: String },

    #[error("duplicate element at `${path}`")]
    DuplicateElement { path: String },

    #[error("check failed at `${path}`: {message}")]
    CheckFailed { path: String, message: String },
}

impl ConversionError {
    /// Prefixes the path with the segment of the enclosing container.
    pub fn at(mut self, segment: &str) -> Self {
        match &mut self {
            ConversionError::TypeMismatch { path, .. }
            | ConversionError::OutOfRange { path, .. }
            | ConversionError::MissingMember { path }
            | ConversionError::DuplicateElement { path }
            | ConversionError::CheckFailed { path, .. } => path.insert_str(0, segment),
        }
        self
    }
}
