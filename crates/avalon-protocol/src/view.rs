//! Per-participant view projections.
//!
//! Every participant sees a different filtered slice of the same game:
//! their own role, the roles they are entitled to know, and only the
//! public parts of everything else. The server derives one [`PlayerView`]
//! per participant after every accepted transition and publishes it on
//! the session's topic; clients filter [`ViewUpdate`]s by their own id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Phase, PlayerId, QuestResult, Role, Team, Vote};

/// One entry in the public roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub name: String,
    /// Presence flag maintained by the transport collaborator.
    pub connected: bool,
}

/// Which actions this participant may currently take.
///
/// Derived from the phase and the participant's role/position, so a
/// client never has to re-implement the rules to enable buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEligibility {
    pub can_propose: bool,
    pub can_vote: bool,
    pub can_play_quest: bool,
    pub can_assassinate: bool,
    pub can_investigate: bool,
}

/// A Lady-of-the-Lake reveal in progress.
///
/// `team` is populated only in the revealer's own view; everyone else
/// learns that an investigation happened, not what it found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationView {
    pub target: PlayerId,
    pub revealer: PlayerId,
    pub team: Option<Team>,
}

/// A participant-specific projection of a game snapshot.
///
/// This is the only game state a client ever receives. Hidden
/// information is filtered server-side: `visible_roles` is empty unless
/// the viewer is entitled to the evil role map, and `votes` is withheld
/// during `team_building`/`quest` so partial tallies never leak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub phase: Phase,
    pub roster: Vec<RosterEntry>,

    /// The viewer's own role; `None` before the game starts.
    pub role: Option<Role>,
    /// The evil/assassin role map, if the viewer is merlin, evil, or
    /// the assassin. Empty otherwise.
    pub visible_roles: HashMap<PlayerId, Role>,

    /// Quest number currently being played, 1..=5.
    pub current_quest: u8,
    pub quest_results: Vec<QuestResult>,
    pub leader: Option<PlayerId>,
    pub proposed_team: Vec<PlayerId>,
    pub failed_votes: u8,
    /// Ballot map; empty while `team_building`/`quest`.
    pub votes: HashMap<PlayerId, Vote>,
    /// How many quest cards are in so far. Counts only, never who
    /// played what.
    pub quest_cards_played: usize,

    pub lady_holder: Option<PlayerId>,
    pub investigation: Option<InvestigationView>,

    pub winner: Option<Team>,
    pub eligibility: ActionEligibility,

    /// Milliseconds until the current phase auto-resolves; `None` for
    /// untimed phases. Stamped by the session actor, not derived from
    /// the snapshot.
    pub deadline_ms_remaining: Option<u64>,
}

/// One published update on a session's topic.
///
/// Subscribers receive every participant's update and filter by
/// `player_id`. Delivery is at-most-once; a lagging subscriber
/// re-queries the current view on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewUpdate {
    pub player_id: PlayerId,
    pub view: PlayerView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> PlayerView {
        PlayerView {
            player_id: PlayerId(1),
            phase: Phase::Voting,
            roster: vec![RosterEntry {
                player_id: PlayerId(1),
                name: "alice".into(),
                connected: true,
            }],
            role: Some(Role::Merlin),
            visible_roles: HashMap::from([(PlayerId(2), Role::Assassin)]),
            current_quest: 2,
            quest_results: vec![QuestResult::Success],
            leader: Some(PlayerId(1)),
            proposed_team: vec![PlayerId(1), PlayerId(2)],
            failed_votes: 1,
            votes: HashMap::new(),
            quest_cards_played: 0,
            lady_holder: Some(PlayerId(3)),
            investigation: None,
            winner: None,
            eligibility: ActionEligibility {
                can_vote: true,
                ..ActionEligibility::default()
            },
            deadline_ms_remaining: Some(30_000),
        }
    }

    #[test]
    fn test_view_round_trip() {
        let view = sample_view();
        let bytes = serde_json::to_vec(&view).unwrap();
        let decoded: PlayerView = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(view, decoded);
    }

    #[test]
    fn test_view_json_shape() {
        let json: serde_json::Value = serde_json::to_value(sample_view()).unwrap();
        assert_eq!(json["phase"], "voting");
        assert_eq!(json["role"], "merlin");
        assert_eq!(json["visible_roles"]["2"], "assassin");
        assert_eq!(json["eligibility"]["can_vote"], true);
        assert_eq!(json["deadline_ms_remaining"], 30_000);
    }

    #[test]
    fn test_view_update_round_trip() {
        let update = ViewUpdate {
            player_id: PlayerId(4),
            view: sample_view(),
        };
        let bytes = serde_json::to_vec(&update).unwrap();
        let decoded: ViewUpdate = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(update, decoded);
    }
}
