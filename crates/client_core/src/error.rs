use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a usable response (connect, timeout, bad JSON).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response; `message` comes from the `{message}` error body when present.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{0}")]
    EmptyInput(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            ClientError::Server { status, .. } => Some(*status),
            ClientError::EmptyInput(_) => None,
        }
    }

    /// Message worth showing to a reader, if the server supplied one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}
