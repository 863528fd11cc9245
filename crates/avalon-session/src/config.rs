//! Session configuration.

use std::time::Duration;

use avalon_protocol::Phase;

/// Settings for one game session actor.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the leader has to propose a team.
    pub team_building_deadline: Duration,
    /// How long participants have to cast ballots.
    pub voting_deadline: Duration,
    /// How long team members have to play quest cards.
    pub quest_deadline: Duration,
    /// How long the assassin has to pick a target.
    pub assassination_deadline: Duration,
    /// How long the Lady holder has to investigate.
    pub investigate_deadline: Duration,
    /// How long a reveal stays on screen before the next round opens.
    pub reveal_deadline: Duration,

    /// Command channel capacity (bounded; senders wait when full).
    pub command_buffer: usize,
    /// Broadcast ring capacity; slow subscribers past this lag miss
    /// updates and must re-query.
    pub broadcast_capacity: usize,

    /// Deterministic seed for the actor's rng. `None` seeds from OS
    /// entropy; tests set it for reproducible deals and fallbacks.
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            team_building_deadline: Duration::from_secs(60),
            voting_deadline: Duration::from_secs(30),
            quest_deadline: Duration::from_secs(30),
            assassination_deadline: Duration::from_secs(60),
            investigate_deadline: Duration::from_secs(30),
            reveal_deadline: Duration::from_secs(10),
            command_buffer: 64,
            broadcast_capacity: 64,
            rng_seed: None,
        }
    }
}

impl SessionConfig {
    /// Clamp any unusable values so the config is safe to run with.
    ///
    /// Called by `spawn_game`. Zero-capacity channels cannot exist, so
    /// both buffers are floored at 1. Deadlines are left alone; a zero
    /// deadline just auto-resolves immediately, which tests use.
    pub fn validated(mut self) -> Self {
        if self.command_buffer == 0 {
            self.command_buffer = 1;
        }
        if self.broadcast_capacity == 0 {
            self.broadcast_capacity = 1;
        }
        self
    }

    /// The deadline to arm when entering `phase`, or `None` for
    /// untimed phases.
    pub fn deadline_for(&self, phase: Phase) -> Option<Duration> {
        match phase {
            Phase::TeamBuilding => Some(self.team_building_deadline),
            Phase::Voting => Some(self.voting_deadline),
            Phase::Quest => Some(self.quest_deadline),
            Phase::Assassination => Some(self.assassination_deadline),
            Phase::LadyOfTheLake => Some(self.investigate_deadline),
            Phase::LadyReveal => Some(self.reveal_deadline),
            Phase::Lobby | Phase::GameOver => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deadlines_cover_every_timed_phase() {
        let cfg = SessionConfig::default();
        for phase in [
            Phase::TeamBuilding,
            Phase::Voting,
            Phase::Quest,
            Phase::Assassination,
            Phase::LadyOfTheLake,
            Phase::LadyReveal,
        ] {
            assert!(cfg.deadline_for(phase).is_some(), "{phase}");
            assert!(phase.is_timed());
        }
        assert_eq!(cfg.deadline_for(Phase::Lobby), None);
        assert_eq!(cfg.deadline_for(Phase::GameOver), None);
    }

    #[test]
    fn test_validated_floors_channel_capacities() {
        let cfg = SessionConfig {
            command_buffer: 0,
            broadcast_capacity: 0,
            ..SessionConfig::default()
        }
        .validated();
        assert_eq!(cfg.command_buffer, 1);
        assert_eq!(cfg.broadcast_capacity, 1);
    }
}
