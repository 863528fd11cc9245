//! Rule operations: pure transitions from snapshot to snapshot.
//!
//! Every operation takes `&self` plus inputs and returns either a new
//! snapshot or a [`GameError`], never mutating the input. Operations
//! that need entropy (role dealing, leader selection) take an injected
//! `&mut impl Rng`.

use std::collections::HashSet;

use avalon_protocol::{Phase, PlayerId, QuestCard, Role, Team, Vote};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::state::{GameSnapshot, PendingReveal, Player};
use crate::tables::{self, MAX_FAILED_VOTES, MAX_PLAYERS, MIN_PLAYERS};
use crate::GameError;

impl GameSnapshot {
    /// Adds a participant and returns the new snapshot with the fresh id.
    ///
    /// Only capacity is enforced here; restricting joins to the lobby
    /// is caller policy.
    pub fn join(&self, name: &str) -> Result<(GameSnapshot, PlayerId), GameError> {
        if self.player_count() == MAX_PLAYERS {
            return Err(GameError::GameFull);
        }
        let mut next = self.clone();
        let player_id = PlayerId(next.next_player_id);
        next.next_player_id += 1;
        next.players.insert(
            player_id,
            Player {
                id: player_id,
                name: name.to_owned(),
                connected: true,
            },
        );
        next.player_order.push(player_id);
        Ok((next, player_id))
    }

    /// Deals roles, seats the Lady of the Lake, picks a starting
    /// leader, and opens team building.
    pub fn start(&self, rng: &mut impl Rng) -> Result<GameSnapshot, GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::WrongPhaseOrTurn);
        }
        if self.player_count() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        let mut next = self.clone();
        let n = next.player_count();
        next.player_order.shuffle(rng);

        let (good, evil) = tables::role_distribution(n);
        let mut deck = Vec::with_capacity(n);
        deck.push(Role::Merlin);
        deck.push(Role::Assassin);
        deck.extend(std::iter::repeat_n(Role::Evil, evil - 1));
        deck.extend(std::iter::repeat_n(Role::Good, good - 1));
        deck.shuffle(rng);
        next.roles = next.player_order.iter().copied().zip(deck).collect();

        // The Lady starts with the seat right after Merlin, cyclically.
        let merlin_seat = next
            .player_order
            .iter()
            .position(|pid| next.roles[pid] == Role::Merlin)
            .expect("a started game always has a merlin");
        next.lady_of_the_lake.holder = Some(next.player_order[(merlin_seat + 1) % n]);

        next.current_leader_index = rng.random_range(0..n);
        next.phase = Phase::TeamBuilding;
        Ok(next)
    }

    /// The current leader proposes a team for the current quest.
    pub fn propose_team(
        &self,
        player_id: PlayerId,
        team: &[PlayerId],
    ) -> Result<GameSnapshot, GameError> {
        if self.phase != Phase::TeamBuilding || self.leader() != Some(player_id) {
            return Err(GameError::WrongPhaseOrTurn);
        }
        if team.len() != tables::quest_size(self.player_count(), self.current_quest) {
            return Err(GameError::WrongTeamSize);
        }
        for member in team {
            if !self.is_participant(*member) {
                return Err(GameError::UnknownParticipant(*member));
            }
        }
        // Duplicates would make the effective team smaller than tabled.
        if team.iter().collect::<HashSet<_>>().len() != team.len() {
            return Err(GameError::WrongTeamSize);
        }

        let mut next = self.clone();
        next.proposed_team = team.to_vec();
        next.votes.clear();
        next.phase = Phase::Voting;
        Ok(next)
    }

    /// Records a ballot; re-voting overwrites. Once everyone has voted
    /// the proposal settles.
    pub fn vote(&self, player_id: PlayerId, choice: Vote) -> Result<GameSnapshot, GameError> {
        if self.phase != Phase::Voting || !self.is_participant(player_id) {
            return Err(GameError::CannotVote);
        }
        let mut next = self.clone();
        next.votes.insert(player_id, choice);
        if next.votes.len() == next.player_count() {
            next.settle_ballots();
        }
        Ok(next)
    }

    /// A team member plays a quest card; resubmitting overwrites. Once
    /// every member has played, the quest resolves.
    pub fn play_quest_card(
        &self,
        player_id: PlayerId,
        card: QuestCard,
    ) -> Result<GameSnapshot, GameError> {
        if self.phase != Phase::Quest || !self.proposed_team.contains(&player_id) {
            return Err(GameError::CannotPlayCard);
        }
        let mut next = self.clone();
        next.quest_cards.insert(player_id, card);
        if next.quest_cards.len() == next.proposed_team.len() {
            next.settle_quest();
        }
        Ok(next)
    }

    /// The assassin's one shot: evil wins iff the target is Merlin.
    pub fn assassinate(&self, target_id: PlayerId) -> Result<GameSnapshot, GameError> {
        if self.phase != Phase::Assassination {
            return Err(GameError::CannotAssassinateNow);
        }
        if !self.is_participant(target_id) {
            return Err(GameError::UnknownParticipant(target_id));
        }
        let mut next = self.clone();
        next.winner = Some(if next.roles.get(&target_id) == Some(&Role::Merlin) {
            Team::Evil
        } else {
            Team::Good
        });
        next.phase = Phase::GameOver;
        Ok(next)
    }

    /// Opens the Lady-of-the-Lake window. Entry is externally
    /// triggered; the core never enters this phase on its own.
    pub fn begin_investigate(&self) -> Result<GameSnapshot, GameError> {
        if self.phase != Phase::TeamBuilding
            || !self.has_started()
            || self.lady_of_the_lake.holder.is_none()
        {
            return Err(GameError::CannotUseAbility);
        }
        let mut next = self.clone();
        next.phase = Phase::LadyOfTheLake;
        Ok(next)
    }

    /// The holder investigates a target: learns its alignment, passes
    /// the Lady on, and the reveal is shown.
    pub fn use_investigate(
        &self,
        player_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<GameSnapshot, GameError> {
        if self.phase != Phase::LadyOfTheLake
            || self.lady_of_the_lake.holder != Some(player_id)
        {
            return Err(GameError::CannotUseAbility);
        }
        if !self.is_participant(target_id) {
            return Err(GameError::UnknownParticipant(target_id));
        }
        if target_id == player_id || self.lady_of_the_lake.used_targets.contains(&target_id) {
            return Err(GameError::CannotUseAbility);
        }
        let mut next = self.clone();
        next.investigate_target(player_id, target_id);
        Ok(next)
    }

    /// Clears any pending reveal and opens the next quest round. Used
    /// after a reveal (or its timeout) and when an investigate window
    /// finds no eligible target.
    pub fn continue_to_next_quest(&self) -> GameSnapshot {
        let mut next = self.clone();
        next.lady_of_the_lake.pending_reveal = None;
        next.next_round();
        next
    }

    /// Updates a participant's presence flag (transport bookkeeping).
    pub fn set_connected(
        &self,
        player_id: PlayerId,
        connected: bool,
    ) -> Result<GameSnapshot, GameError> {
        if !self.is_participant(player_id) {
            return Err(GameError::UnknownParticipant(player_id));
        }
        let mut next = self.clone();
        if let Some(player) = next.players.get_mut(&player_id) {
            player.connected = connected;
        }
        Ok(next)
    }

    // -- shared transition tails ------------------------------------------

    /// Settles a complete ballot set: strict majority approves, ties
    /// reject.
    pub(crate) fn settle_ballots(&mut self) {
        let approvals = self.votes.values().filter(|v| **v == Vote::Approve).count();
        if approvals * 2 > self.player_count() {
            self.quest_cards.clear();
            self.failed_votes = 0;
            self.phase = Phase::Quest;
        } else {
            self.reject_proposal();
        }
    }

    /// A rejected (or never-made) proposal: bump the failure counter,
    /// end the game at the cap, otherwise rotate the leader.
    pub(crate) fn reject_proposal(&mut self) {
        self.failed_votes += 1;
        if self.failed_votes >= MAX_FAILED_VOTES {
            self.winner = Some(Team::Evil);
            self.phase = Phase::GameOver;
        } else {
            self.advance_leader();
            self.proposed_team.clear();
            self.phase = Phase::TeamBuilding;
        }
    }

    /// Resolves a complete card set and routes to the next phase.
    pub(crate) fn settle_quest(&mut self) {
        let cards: Vec<QuestCard> = self.quest_cards.values().copied().collect();
        let result = tables::resolve_quest(&cards, self.player_count(), self.current_quest);
        self.quest_results.push(result);

        let (successes, fails) = self.quest_tally();
        if successes >= 3 {
            self.phase = Phase::Assassination;
        } else if fails >= 3 {
            self.winner = Some(Team::Evil);
            self.phase = Phase::GameOver;
        } else {
            self.next_round();
        }
    }

    pub(crate) fn investigate_target(&mut self, revealer: PlayerId, target: PlayerId) {
        let team = self.team_of(target);
        self.lady_of_the_lake.used_targets.insert(target);
        self.lady_of_the_lake.holder = Some(target);
        self.lady_of_the_lake.pending_reveal = Some(PendingReveal {
            target,
            team,
            revealer,
        });
        self.phase = Phase::LadyReveal;
    }

    pub(crate) fn next_round(&mut self) {
        self.advance_leader();
        self.proposed_team.clear();
        self.votes.clear();
        self.quest_cards.clear();
        // Clamped so an investigate detour after the final round cannot
        // index past the quest table.
        self.current_quest = (self.current_quest + 1).min(tables::QUEST_COUNT);
        self.phase = Phase::TeamBuilding;
    }

    pub(crate) fn advance_leader(&mut self) {
        self.current_leader_index = (self.current_leader_index + 1) % self.player_count();
    }
}
