//! Per-participant view derivation.
//!
//! The one function that decides who gets to see what. It reads the
//! snapshot, never mutates it, and is re-derivable at any time. The
//! session actor calls it after every accepted transition and on
//! demand for `get_view`.

use avalon_protocol::{
    ActionEligibility, InvestigationView, Phase, PlayerId, PlayerView, Role, RosterEntry, Vote,
};

use crate::state::GameSnapshot;
use crate::GameError;

impl GameSnapshot {
    /// Projects this snapshot into what `player_id` is allowed to see.
    pub fn player_view(&self, player_id: PlayerId) -> Result<PlayerView, GameError> {
        if !self.is_participant(player_id) {
            return Err(GameError::UnknownParticipant(player_id));
        }

        let role = self.roles.get(&player_id).copied();

        // Merlin and the evil team know who evil is; nobody else does.
        let visible_roles = match role {
            Some(Role::Merlin | Role::Evil | Role::Assassin) => self
                .roles
                .iter()
                .filter(|(_, r)| matches!(r, Role::Evil | Role::Assassin))
                .map(|(pid, r)| (*pid, *r))
                .collect(),
            _ => Default::default(),
        };

        // Withheld while ballots or cards are still trickling in, so a
        // partial tally never leaks.
        let votes = match self.phase {
            Phase::TeamBuilding | Phase::Quest => Default::default(),
            _ => self.votes.clone(),
        };

        let investigation = self.lady_of_the_lake.pending_reveal.map(|reveal| {
            InvestigationView {
                target: reveal.target,
                revealer: reveal.revealer,
                team: (reveal.revealer == player_id).then_some(reveal.team),
            }
        });

        let eligibility = ActionEligibility {
            can_propose: self.phase == Phase::TeamBuilding && self.leader() == Some(player_id),
            can_vote: self.phase == Phase::Voting,
            can_play_quest: self.phase == Phase::Quest
                && self.proposed_team.contains(&player_id)
                && !self.quest_cards.contains_key(&player_id),
            can_assassinate: self.phase == Phase::Assassination && role == Some(Role::Assassin),
            can_investigate: self.phase == Phase::LadyOfTheLake
                && self.lady_of_the_lake.holder == Some(player_id),
        };

        Ok(PlayerView {
            player_id,
            phase: self.phase,
            roster: self
                .player_order
                .iter()
                .map(|pid| {
                    let p = &self.players[pid];
                    RosterEntry {
                        player_id: p.id,
                        name: p.name.clone(),
                        connected: p.connected,
                    }
                })
                .collect(),
            role,
            visible_roles,
            current_quest: self.current_quest,
            quest_results: self.quest_results.clone(),
            leader: self.leader(),
            proposed_team: self.proposed_team.clone(),
            failed_votes: self.failed_votes,
            votes,
            quest_cards_played: self.quest_cards.len(),
            lady_holder: self.lady_of_the_lake.holder,
            investigation,
            winner: self.winner,
            eligibility,
            deadline_ms_remaining: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avalon_protocol::GameId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn started_game() -> GameSnapshot {
        let mut game = GameSnapshot::new(GameId(1));
        for name in ["a", "b", "c", "d", "e"] {
            game = game.join(name).unwrap().0;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        game.start(&mut rng).unwrap()
    }

    fn find_role(game: &GameSnapshot, role: Role) -> PlayerId {
        *game.roles.iter().find(|(_, r)| **r == role).unwrap().0
    }

    #[test]
    fn test_unknown_participant_is_rejected() {
        let game = started_game();
        assert_eq!(
            game.player_view(PlayerId(99)),
            Err(GameError::UnknownParticipant(PlayerId(99)))
        );
    }

    #[test]
    fn test_merlin_and_evil_see_the_evil_map() {
        let game = started_game();
        let merlin = find_role(&game, Role::Merlin);
        let assassin = find_role(&game, Role::Assassin);

        let merlin_view = game.player_view(merlin).unwrap();
        assert_eq!(merlin_view.role, Some(Role::Merlin));
        assert_eq!(merlin_view.visible_roles.len(), 2); // assassin + 1 evil at n=5
        assert!(merlin_view.visible_roles.contains_key(&assassin));

        let assassin_view = game.player_view(assassin).unwrap();
        assert_eq!(assassin_view.visible_roles.len(), 2);
    }

    #[test]
    fn test_plain_good_sees_nothing_hidden() {
        let game = started_game();
        let good = find_role(&game, Role::Good);
        let view = game.player_view(good).unwrap();
        assert!(view.visible_roles.is_empty());
        assert_eq!(view.role, Some(Role::Good));
    }

    #[test]
    fn test_votes_withheld_during_team_building_and_quest() {
        let mut game = started_game();
        game.votes.insert(game.player_order[0], Vote::Approve);

        game.phase = Phase::TeamBuilding;
        let pid = game.player_order[0];
        assert!(game.player_view(pid).unwrap().votes.is_empty());

        game.phase = Phase::Quest;
        assert!(game.player_view(pid).unwrap().votes.is_empty());

        game.phase = Phase::Voting;
        assert_eq!(game.player_view(pid).unwrap().votes.len(), 1);
    }

    #[test]
    fn test_eligibility_tracks_leader_and_phase() {
        let game = started_game();
        let leader = game.leader().unwrap();
        let other = *game.player_order.iter().find(|p| **p != leader).unwrap();

        assert!(game.player_view(leader).unwrap().eligibility.can_propose);
        assert!(!game.player_view(other).unwrap().eligibility.can_propose);
        assert!(!game.player_view(leader).unwrap().eligibility.can_vote);
    }

    #[test]
    fn test_reveal_team_only_visible_to_revealer() {
        let mut game = started_game();
        let holder = game.lady_of_the_lake.holder.unwrap();
        let target = *game.player_order.iter().find(|p| **p != holder).unwrap();
        game.phase = Phase::LadyOfTheLake;
        let game = game.use_investigate(holder, target).unwrap();

        let revealer_view = game.player_view(holder).unwrap();
        let reveal = revealer_view.investigation.unwrap();
        assert_eq!(reveal.target, target);
        assert!(reveal.team.is_some());

        let target_view = game.player_view(target).unwrap();
        assert!(target_view.investigation.unwrap().team.is_none());
    }
}
