//! Error type shared by every exercise of the exam pipeline
use std::fmt;
use std::io;

/// Error types for the exam pipeline
#[derive(Debug)]
pub enum ExamError {
    /// file missing or unreadable
    Io(io::Error),
    /// malformed field in the measurements file
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    /// degenerate time grid, zero exambirulobin value, bad arguments
    InvalidInput(String),
    /// bad configuration document
    Config(String),
    /// the posterior sampler rejected model or data
    Sampler(String),
    /// plotting backend failure
    Plot(String),
}

impl fmt::Display for ExamError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExamError::Io(err) => write!(f, "I/O error: {}", err),
            ExamError::Parse {
                line,
                column,
                message,
            } => write!(f, "Parse error at line {}, column {}: {}", line, column, message),
            ExamError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ExamError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ExamError::Sampler(msg) => write!(f, "Sampler error: {}", msg),
            ExamError::Plot(msg) => write!(f, "Plot error: {}", msg),
        }
    }
}

impl std::error::Error for ExamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExamError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ExamError {
    fn from(err: io::Error) -> Self {
        ExamError::Io(err)
    }
}

impl From<csv::Error> for ExamError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => ExamError::Io(io_err),
            kind => ExamError::Parse {
                line,
                column: 0,
                message: format!("{:?}", kind),
            },
        }
    }
}

impl From<Box<dyn std::error::Error>> for ExamError {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        ExamError::Plot(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_error() {
        let err = ExamError::Parse {
            line: 3,
            column: 2,
            message: "not a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error at line 3, column 2: not a number"
        );
    }

    #[test]
    fn test_io_error_conversion_keeps_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "values.csv");
        let err: ExamError = io_err.into();
        assert!(matches!(err, ExamError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
