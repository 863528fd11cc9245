//! Stateful session layer for Avalon games.
//!
//! Each game session runs as an isolated Tokio task (actor model) that
//! owns the canonical [`avalon_game::GameSnapshot`], serializes every
//! operation against it, manages the single phase-deadline timer, and
//! publishes one filtered view per participant after each accepted
//! transition.
//!
//! # Key types
//!
//! - [`GameHandle`]: send operations to a running session actor
//! - [`SessionDirectory`]: create/locate/tear down sessions by id
//! - [`SessionConfig`]: per-phase deadlines, channel sizes, rng seed
//! - [`SessionError`]: actor availability plus rule rejections

mod actor;
mod config;
mod directory;
mod error;

pub use actor::{spawn_game, GameHandle};
pub use config::SessionConfig;
pub use directory::SessionDirectory;
pub use error::SessionError;
