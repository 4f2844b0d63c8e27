use thiserror::Error;

/// Result type for STL reading and writing.
pub type Result<T> = std::result::Result<T, StlError>;

/// Errors raised while reading or writing STL data.
#[derive(Error, Debug)]
pub enum StlError {
    /// The underlying stream or file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes do not match either STL encoding.
    #[error("{}", format_message(.line, .message))]
    Format {
        line: Option<usize>,
        message: String,
    },
}

impl StlError {
    pub(crate) fn format(message: impl Into<String>) -> StlError {
        StlError::Format {
            line: None,
            message: message.into(),
        }
    }

    pub(crate) fn format_at(line: usize, message: impl Into<String>) -> StlError {
        StlError::Format {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Line of the ASCII input the error was found on, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            StlError::Format { line, .. } => *line,
            _ => None,
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, StlError::Format { .. })
    }
}

fn format_message(line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("malformed STL at line {}: {}", line, message),
        None => format!("malformed STL: {}", message),
    }
}
