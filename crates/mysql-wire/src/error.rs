//! Error types for the MySQL client protocol.

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Client protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("dial {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Unsupported authentication plugin: {0}")]
    UnsupportedAuthPlugin(String),

    #[error("Error {code} ({state}): {message}")]
    Server {
        code: u16,
        state: String,
        message: String,
    },

    #[error("Connection closed by server")]
    Disconnected,
}

impl Error {
    /// Create a new protocol error.
    pub fn protocol(msg: impl std::fmt::Display) -> Self {
        Error::Protocol(msg.to_string())
    }

    /// Server error code, when the server answered with an ERR packet.
    pub fn server_code(&self) -> Option<u16> {
        match self {
            Error::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}
