//! Session directory: creates, locates, and tears down game actors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use avalon_protocol::GameId;

use crate::actor::spawn_game;
use crate::{GameHandle, SessionConfig, SessionError};

/// Counter for generating unique game ids.
static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Maps session ids to their running actors.
///
/// This is the arena+index entry point for higher layers: transports
/// and bots resolve a session id to a [`GameHandle`] here and talk to
/// the actor directly afterwards.
#[derive(Default)]
pub struct SessionDirectory {
    games: HashMap<GameId, GameHandle>,
}

impl SessionDirectory {
    /// Creates a new, empty directory.
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
        }
    }

    /// Spawns a new game session and returns its id.
    pub fn create_game(&mut self, config: SessionConfig) -> GameId {
        let game_id = GameId(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_game(game_id, config);
        self.games.insert(game_id, handle);
        tracing::info!(%game_id, "game created");
        game_id
    }

    /// Resolves a session id to a handle.
    pub fn get(&self, game_id: GameId) -> Result<GameHandle, SessionError> {
        self.games
            .get(&game_id)
            .cloned()
            .ok_or(SessionError::GameNotFound(game_id))
    }

    /// Shuts a session down and forgets it.
    pub async fn destroy_game(&mut self, game_id: GameId) -> Result<(), SessionError> {
        let handle = self
            .games
            .remove(&game_id)
            .ok_or(SessionError::GameNotFound(game_id))?;
        // An already-stopped actor is fine; the entry is gone either way.
        let _ = handle.shutdown().await;
        tracing::info!(%game_id, "game destroyed");
        Ok(())
    }

    /// Number of live sessions.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Ids of all live sessions.
    pub fn game_ids(&self) -> Vec<GameId> {
        self.games.keys().copied().collect()
    }
}
