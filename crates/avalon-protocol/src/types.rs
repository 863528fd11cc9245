//! Identity newtypes and the game vocabulary enums.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a game session.
///
/// `#[serde(transparent)]` makes a `GameId(7)` serialize as plain `7`,
/// which is what session directories and clients pass around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// A unique identifier for a participant within a game session.
///
/// Ids are assigned by the game when a participant joins and are unique
/// per session, not globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Roles and teams
// ---------------------------------------------------------------------------

/// A participant's hidden role.
///
/// Exactly one `Merlin` and one `Assassin` exist per started game; the
/// remaining slots are plain `Good`/`Evil` per the role table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Merlin,
    Assassin,
    Evil,
    Good,
}

impl Role {
    /// The alignment this role fights for.
    pub fn team(self) -> Team {
        match self {
            Role::Merlin | Role::Good => Team::Good,
            Role::Assassin | Role::Evil => Team::Evil,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Merlin => write!(f, "merlin"),
            Role::Assassin => write!(f, "assassin"),
            Role::Evil => write!(f, "evil"),
            Role::Good => write!(f, "good"),
        }
    }
}

/// An alignment: the answer to "which side?", and also the winner type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Good,
    Evil,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Good => write!(f, "good"),
            Team::Evil => write!(f, "evil"),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The phase of a game session.
///
/// ```text
/// lobby → team_building ⇄ voting → quest → {team_building | assassination} → game_over
/// ```
///
/// with an optional `lady_of_the_lake → lady_reveal → team_building`
/// detour. `GameOver` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    TeamBuilding,
    Voting,
    Quest,
    Assassination,
    LadyOfTheLake,
    LadyReveal,
    GameOver,
}

impl Phase {
    /// Whether this phase auto-resolves when its deadline expires.
    ///
    /// `Lobby` and `GameOver` have no deadline; a timer firing there
    /// is a no-op.
    pub fn is_timed(self) -> bool {
        !matches!(self, Phase::Lobby | Phase::GameOver)
    }

    /// Whether the game has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lobby => "lobby",
            Phase::TeamBuilding => "team_building",
            Phase::Voting => "voting",
            Phase::Quest => "quest",
            Phase::Assassination => "assassination",
            Phase::LadyOfTheLake => "lady_of_the_lake",
            Phase::LadyReveal => "lady_reveal",
            Phase::GameOver => "game_over",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A ballot on a proposed team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Approve,
    Reject,
}

/// A card a team member plays on a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestCard {
    Success,
    Fail,
}

/// The outcome of a completed quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestResult {
    Success,
    Fail,
}

// =========================================================================
// Tests
// =========================================================================
