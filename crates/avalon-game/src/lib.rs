//! Pure rule engine for Avalon game sessions.
//!
//! Everything in this crate is a function from a snapshot (plus inputs)
//! to either a new snapshot or a rule-violation error. No I/O, no
//! clocks, no global randomness; operations that need entropy take a
//! `&mut impl Rng` so callers (and tests) control the source.
//!
//! # Key pieces
//!
//! - [`GameSnapshot`]: the single source of truth for one session,
//!   copy-on-write: operations never mutate the input snapshot.
//! - [`tables`]: player-count lookup tables for role counts, team
//!   sizes, and quest resolution.
//! - Rule operations (`join`, `start`, `propose_team`, `vote`, …),
//!   see the methods on [`GameSnapshot`].
//! - Timeout resolvers, one per interruptible phase, producing the
//!   snapshot as if the missing actions had defaulted.
//! - [`GameSnapshot::player_view`]: the per-participant projection.
//!
//! The stateful half (actor, timers, broadcast) lives in
//! `avalon-session`; it calls into this crate and owns all effects.

mod error;
mod ops;
mod state;
pub mod tables;
mod timeout;
mod view;

pub use error::GameError;
pub use state::{GameSnapshot, LadyOfTheLake, PendingReveal, Player};
