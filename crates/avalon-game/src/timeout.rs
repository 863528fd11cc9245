//! Per-phase timeout resolvers.
//!
//! When a phase deadline expires, the session actor asks the snapshot
//! to resolve itself as if the missing participant actions had
//! defaulted. Each resolver reuses the exact settlement path its
//! participant-action counterpart takes, so a timed-out phase and a
//! fully-acted phase are indistinguishable downstream.

use avalon_protocol::{Phase, PlayerId, QuestCard, Role, Vote};
use rand::Rng;

use crate::state::GameSnapshot;

impl GameSnapshot {
    /// Resolves an expired deadline for the current phase.
    ///
    /// Returns `None` for phases with no timeout semantics (`lobby`,
    /// `game_over`); a stale or spurious deadline there is a no-op.
    pub fn resolve_deadline(&self, rng: &mut impl Rng) -> Option<GameSnapshot> {
        match self.phase {
            Phase::TeamBuilding => Some(self.team_building_timed_out()),
            Phase::Voting => Some(self.voting_timed_out()),
            Phase::Quest => Some(self.quest_timed_out(rng)),
            Phase::Assassination => Some(self.assassination_timed_out(rng)),
            Phase::LadyOfTheLake => Some(self.investigate_timed_out(rng)),
            Phase::LadyReveal => Some(self.continue_to_next_quest()),
            Phase::Lobby | Phase::GameOver => None,
        }
    }

    /// No proposal was made: treated as a rejected proposal.
    pub fn team_building_timed_out(&self) -> GameSnapshot {
        let mut next = self.clone();
        next.reject_proposal();
        next
    }

    /// Non-voters are recorded as approving, then the ballots settle
    /// normally.
    pub fn voting_timed_out(&self) -> GameSnapshot {
        let mut next = self.clone();
        for pid in self.player_order.clone() {
            next.votes.entry(pid).or_insert(Vote::Approve);
        }
        next.settle_ballots();
        next
    }

    /// Missing team members auto-play: evil-aligned roles fail with
    /// probability one half, everyone else succeeds.
    pub fn quest_timed_out(&self, rng: &mut impl Rng) -> GameSnapshot {
        let mut next = self.clone();
        for pid in next.proposed_team.clone() {
            if next.quest_cards.contains_key(&pid) {
                continue;
            }
            let card = match next.roles.get(&pid) {
                Some(Role::Evil | Role::Assassin) if rng.random_bool(0.5) => QuestCard::Fail,
                _ => QuestCard::Success,
            };
            next.quest_cards.insert(pid, card);
        }
        next.settle_quest();
        next
    }

    /// The assassin never fired: a target is picked uniformly among
    /// good-aligned participants. Random, not informed by anything
    /// Merlin-shaped.
    pub fn assassination_timed_out(&self, rng: &mut impl Rng) -> GameSnapshot {
        let candidates: Vec<PlayerId> = self
            .player_order
            .iter()
            .copied()
            .filter(|pid| {
                !matches!(self.roles.get(pid), Some(Role::Evil | Role::Assassin))
            })
            .collect();
        let target = candidates[rng.random_range(0..candidates.len())];
        self.assassinate(target)
            .expect("assassination phase always has a good-aligned target")
    }

    /// The holder never investigated: a target is picked uniformly
    /// among the eligible, or the round simply moves on if nobody is.
    pub fn investigate_timed_out(&self, rng: &mut impl Rng) -> GameSnapshot {
        let holder = self.lady_of_the_lake.holder;
        let eligible: Vec<PlayerId> = self
            .player_order
            .iter()
            .copied()
            .filter(|pid| {
                Some(*pid) != holder && !self.lady_of_the_lake.used_targets.contains(pid)
            })
            .collect();
        match (holder, eligible.as_slice()) {
            (Some(revealer), [_, ..]) => {
                let target = eligible[rng.random_range(0..eligible.len())];
                let mut next = self.clone();
                next.investigate_target(revealer, target);
                next
            }
            _ => self.continue_to_next_quest(),
        }
    }
}
