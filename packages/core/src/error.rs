use thiserror::Error;

#[derive(Error, Debug)]
pub enum CueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid time axis: duration {duration}s cannot be mapped")]
    InvalidAxis { duration: f64 },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

pub type CueResult<T> = Result<T, CueError>;

impl CueError {
    pub fn invalid_time(msg: impl Into<String>) -> Self {
        CueError::InvalidTime(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        CueError::Decode(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        CueError::MalformedDocument(msg.into())
    }

    /// Message to show the user, for failures that are not programming errors.
    ///
    /// Decode failures and malformed imports are expected at runtime and get a
    /// single notice. Everything else is a contract violation and returns `None`.
    pub fn user_notice(&self) -> Option<String> {
        match self {
            CueError::Decode(reason) => {
                Some(format!("Could not decode the audio file: {}", reason))
            }
            CueError::MalformedDocument(reason) => {
                Some(format!("Could not open the cue document: {}", reason))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_notice_only_for_runtime_failures() {
        assert!(CueError::decode("unsupported codec").user_notice().is_some());
        assert!(CueError::malformed("not json").user_notice().is_some());
        let out_of_range = CueError::IndexOutOfRange { index: 3, len: 1 };
        assert!(out_of_range.user_notice().is_none());
        assert!(CueError::invalid_time("-1").user_notice().is_none());
    }

    #[test]
    fn test_display() {
        let err = CueError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(err.to_string(), "Index 4 out of range (len 2)");
    }
}
