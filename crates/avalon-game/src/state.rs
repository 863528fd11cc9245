//! The game snapshot: the single source of truth for one session.

use std::collections::{HashMap, HashSet};

use avalon_protocol::{GameId, Phase, PlayerId, QuestCard, QuestResult, Role, Team, Vote};

/// One participant's public record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Presence flag maintained by the transport collaborator.
    pub connected: bool,
}

/// The pending result of an investigate ability, shown during
/// `lady_reveal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReveal {
    pub target: PlayerId,
    pub team: Team,
    pub revealer: PlayerId,
}

/// Lady-of-the-Lake bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LadyOfTheLake {
    /// Current holder; assigned at start to the participant immediately
    /// after Merlin in the player order. `None` before start.
    pub holder: Option<PlayerId>,
    /// Participants already investigated, never eligible again.
    pub used_targets: HashSet<PlayerId>,
    pub pending_reveal: Option<PendingReveal>,
}

/// An immutable snapshot of one game session.
///
/// Rule operations consume `&self` and return a fresh snapshot
/// (copy-on-write): the input is never mutated, so transition functions
/// stay free of aliasing bugs and are trivially unit-testable.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub id: GameId,
    /// Participants keyed by id. Insertion order lives in
    /// `player_order`.
    pub players: HashMap<PlayerId, Player>,
    /// Leader rotation and team-size indexing order. Appended on join,
    /// shuffled once at start, fixed afterwards.
    pub player_order: Vec<PlayerId>,
    /// Hidden role assignments. Empty until start.
    pub roles: HashMap<PlayerId, Role>,
    pub phase: Phase,
    /// 1..=5, monotonically non-decreasing within a game.
    pub current_quest: u8,
    /// One entry per completed quest; the game ends at three of a kind.
    pub quest_results: Vec<QuestResult>,
    pub current_leader_index: usize,
    pub proposed_team: Vec<PlayerId>,
    /// Ballots for the current proposal; cleared on every new proposal.
    pub votes: HashMap<PlayerId, Vote>,
    pub failed_votes: u8,
    /// Cards submitted for the in-progress quest, keyed by player so
    /// the quest timeout knows who still owes one. Cleared each round.
    pub quest_cards: HashMap<PlayerId, QuestCard>,
    pub winner: Option<Team>,
    pub lady_of_the_lake: LadyOfTheLake,
    /// Monotonic source for fresh participant ids.
    pub(crate) next_player_id: u64,
}

impl GameSnapshot {
    /// A fresh snapshot in the lobby, with no participants.
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            players: HashMap::new(),
            player_order: Vec::new(),
            roles: HashMap::new(),
            phase: Phase::Lobby,
            current_quest: 1,
            quest_results: Vec::new(),
            current_leader_index: 0,
            proposed_team: Vec::new(),
            votes: HashMap::new(),
            failed_votes: 0,
            quest_cards: HashMap::new(),
            winner: None,
            lady_of_the_lake: LadyOfTheLake::default(),
            next_player_id: 1,
        }
    }

    /// Number of participants in the session.
    pub fn player_count(&self) -> usize {
        self.player_order.len()
    }

    /// The current leader, once the game has started.
    pub fn leader(&self) -> Option<PlayerId> {
        if self.phase == Phase::Lobby {
            return None;
        }
        self.player_order.get(self.current_leader_index).copied()
    }

    /// Whether roles have been dealt.
    pub fn has_started(&self) -> bool {
        !self.roles.is_empty()
    }

    /// The one participant holding the Merlin role, once started.
    pub fn merlin(&self) -> Option<PlayerId> {
        self.roles
            .iter()
            .find(|(_, role)| **role == Role::Merlin)
            .map(|(pid, _)| *pid)
    }

    /// A participant's alignment. Unassigned roles count as good,
    /// which only matters for participants joining a running game.
    pub fn team_of(&self, player_id: PlayerId) -> Team {
        self.roles.get(&player_id).map_or(Team::Good, |r| r.team())
    }

    pub(crate) fn is_participant(&self, player_id: PlayerId) -> bool {
        self.players.contains_key(&player_id)
    }

    /// Completed quests won by each side so far: `(successes, fails)`.
    pub fn quest_tally(&self) -> (usize, usize) {
        let successes = self
            .quest_results
            .iter()
            .filter(|r| **r == QuestResult::Success)
            .count();
        (successes, self.quest_results.len() - successes)
    }
}
