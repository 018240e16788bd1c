use crate::errors::ArborError;

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("tmux not found in PATH. Install tmux to use terminal sessions.")]
    MultiplexerNotFound,

    #[error("tmux session '{session}' is not running")]
    NotRunning { session: String },

    #[error("Invalid window name: cannot be empty")]
    InvalidWindowName,

    #[error("Invalid assistant command: cannot be empty")]
    InvalidCommand,

    #[error("Invalid window id: '{id}'")]
    InvalidWindowId { id: String },

    #[error("Working directory not found: {path}")]
    WorkingDirectoryNotFound { path: String },

    #[error("tmux {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("IO operation failed: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ArborError for TerminalError {
    fn error_code(&self) -> &'static str {
        match self {
            TerminalError::MultiplexerNotFound => "MULTIPLEXER_NOT_FOUND",
            TerminalError::NotRunning { .. } => "MULTIPLEXER_NOT_RUNNING",
            TerminalError::InvalidWindowName => "INVALID_WINDOW_NAME",
            TerminalError::InvalidCommand => "INVALID_COMMAND",
            TerminalError::InvalidWindowId { .. } => "INVALID_WINDOW_ID",
            TerminalError::WorkingDirectoryNotFound { .. } => "WORKING_DIRECTORY_NOT_FOUND",
            TerminalError::CommandFailed { .. } => "TERMINAL_COMMAND_FAILED",
            TerminalError::IoError { .. } => "TERMINAL_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            TerminalError::MultiplexerNotFound
                | TerminalError::InvalidWindowName
                | TerminalError::InvalidCommand
                | TerminalError::WorkingDirectoryNotFound { .. }
        )
    }
}
