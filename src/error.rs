use thiserror::Error;

/// Why a document could not be acquired
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Unsupported content: {message}")]
    Unsupported { message: String },

    #[error("No readable text in {source_name}")]
    Empty { source_name: String },

    #[error("Failed to parse {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Short category label for user-facing messages
    pub fn category(&self) -> &'static str {
        match self {
            LoadError::Network { .. } => "network",
            LoadError::Unsupported { .. } => "unsupported",
            LoadError::Empty { .. } => "empty",
            LoadError::Parse { .. } => "parse",
            LoadError::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        LoadError::Network {
            message: err.to_string(),
        }
    }
}

/// The playback scheduler task is gone
#[derive(Error, Debug)]
#[error("Playback scheduler has stopped")]
pub struct SchedulerStopped;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_messages() {
        let err = LoadError::Empty {
            source_name: "notes.txt".to_string(),
        };
        assert_eq!(err.category(), "empty");
        assert_eq!(err.to_string(), "No readable text in notes.txt");

        let err = LoadError::Unsupported {
            message: "PDF".to_string(),
        };
        assert_eq!(err.category(), "unsupported");
    }
}
