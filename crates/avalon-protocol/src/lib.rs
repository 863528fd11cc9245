//! Client-facing types for Avalon game sessions.
//!
//! This crate defines everything a client (UI transport or bot) sees:
//!
//! - **Identity** ([`GameId`], [`PlayerId`]): opaque newtype ids.
//! - **Game vocabulary** ([`Role`], [`Team`], [`Phase`], [`Vote`],
//!   [`QuestCard`], [`QuestResult`]): the enums that appear in views
//!   and operation inputs.
//! - **Views** ([`PlayerView`] and friends): the per-participant
//!   filtered projection of a game snapshot.
//!
//! The crate carries no game rules and no I/O. Everything here is a
//! plain serde type with a stable JSON shape; the inline tests pin
//! those shapes so client SDKs can rely on them.

mod types;
mod view;

pub use types::{GameId, Phase, PlayerId, QuestCard, QuestResult, Role, Team, Vote};
pub use view::{ActionEligibility, InvestigationView, PlayerView, RosterEntry, ViewUpdate};
