//! Error types for the session layer.

use avalon_game::GameError;
use avalon_protocol::GameId;

/// Errors surfaced by session actors and the directory.
///
/// Rule rejections pass through unchanged from the game core; the
/// other variants mean the session itself could not be reached.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operation violated the game rules. The snapshot is
    /// unchanged; the caller may try something else.
    #[error(transparent)]
    Rule(#[from] GameError),

    /// No session with this id exists.
    #[error("game {0} not found")]
    GameNotFound(GameId),

    /// The session's actor is gone or its channel is closed.
    #[error("game {0} is unavailable")]
    Unavailable(GameId),
}

impl SessionError {
    /// The rule rejection inside, if that is what this is.
    pub fn as_rule(&self) -> Option<&GameError> {
        match self {
            SessionError::Rule(e) => Some(e),
            _ => None,
        }
    }
}
