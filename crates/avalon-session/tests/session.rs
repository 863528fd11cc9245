//! Integration tests for the session layer: directory, actor
//! serialization, view broadcast, and phase deadlines.
//!
//! Deadline tests run with `start_paused = true` so Tokio's clock is
//! virtual: sleeps auto-advance past the actor's `sleep_until` and the
//! whole schedule is deterministic.

use std::time::Duration;

use avalon_game::GameError;
use avalon_protocol::{GameId, Phase, PlayerId, QuestCard, Role, Team, Vote};
use avalon_session::{spawn_game, GameHandle, SessionConfig, SessionDirectory, SessionError};

// =========================================================================
// Helpers
// =========================================================================

/// Seeded config so deals are reproducible across runs.
fn seeded_config() -> SessionConfig {
    SessionConfig {
        rng_seed: Some(7),
        ..SessionConfig::default()
    }
}

fn handle_with(config: SessionConfig) -> GameHandle {
    spawn_game(GameId(1), config)
}

async fn join_players(handle: &GameHandle, n: usize) -> Vec<PlayerId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        ids.push(handle.join(format!("player-{i}")).await.unwrap());
    }
    ids
}

/// Everyone's current view, keyed by the order of `players`.
async fn views_of(
    handle: &GameHandle,
    players: &[PlayerId],
) -> Vec<avalon_protocol::PlayerView> {
    let mut views = Vec::with_capacity(players.len());
    for pid in players {
        views.push(handle.get_view(*pid).await.unwrap());
    }
    views
}

fn rule_error(err: SessionError) -> GameError {
    match err {
        SessionError::Rule(e) => e,
        other => panic!("expected a rule error, got {other}"),
    }
}

// =========================================================================
// Directory
// =========================================================================

#[tokio::test]
async fn test_directory_create_returns_unique_ids() {
    let mut dir = SessionDirectory::new();
    let g1 = dir.create_game(SessionConfig::default());
    let g2 = dir.create_game(SessionConfig::default());
    assert_ne!(g1, g2);
    assert_eq!(dir.game_count(), 2);
    assert!(dir.game_ids().contains(&g1));
}

#[tokio::test]
async fn test_directory_get_unknown_game() {
    let dir = SessionDirectory::new();
    assert!(matches!(
        dir.get(GameId(9999)),
        Err(SessionError::GameNotFound(GameId(9999)))
    ));
}

#[tokio::test]
async fn test_directory_destroy_game() {
    let mut dir = SessionDirectory::new();
    let game_id = dir.create_game(SessionConfig::default());
    dir.destroy_game(game_id).await.unwrap();
    assert_eq!(dir.game_count(), 0);
    assert!(dir.get(game_id).is_err());

    // Destroying twice reports not-found, not a hang.
    assert!(matches!(
        dir.destroy_game(game_id).await,
        Err(SessionError::GameNotFound(_))
    ));
}

#[tokio::test]
async fn test_handle_after_shutdown_is_unavailable() {
    let handle = handle_with(seeded_config());
    handle.shutdown().await.unwrap();
    // The actor drains its channel and stops; later calls fail cleanly.
    let mut saw_unavailable = false;
    for _ in 0..10 {
        if matches!(handle.join("late").await, Err(SessionError::Unavailable(_))) {
            saw_unavailable = true;
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(saw_unavailable);
}

// =========================================================================
// Joining and views
// =========================================================================

#[tokio::test]
async fn test_join_assigns_distinct_ids_and_caps_at_ten() {
    let handle = handle_with(seeded_config());
    let mut ids = join_players(&handle, 10).await;
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 10);

    let err = handle.join("eleventh").await.unwrap_err();
    assert_eq!(rule_error(err), GameError::GameFull);
}

#[tokio::test]
async fn test_every_join_publishes_a_view_per_participant() {
    let handle = handle_with(seeded_config());
    let mut updates = handle.subscribe();

    let players = join_players(&handle, 5).await;

    // Joins publish 1 + 2 + … + 5 updates; replies are sent after
    // publishing, so everything is already in the ring.
    let mut received = Vec::new();
    while let Ok(update) = updates.try_recv() {
        received.push(update);
    }
    assert_eq!(received.len(), 15);

    // The last batch is one view per current participant.
    let last_batch: Vec<_> = received.split_off(received.len() - 5);
    let mut seen: Vec<PlayerId> = last_batch.iter().map(|u| u.player_id).collect();
    seen.sort();
    let mut expected = players.clone();
    expected.sort();
    assert_eq!(seen, expected);
    assert!(last_batch.iter().all(|u| u.view.roster.len() == 5));
}

#[tokio::test]
async fn test_get_view_for_stranger_is_rejected() {
    let handle = handle_with(seeded_config());
    join_players(&handle, 5).await;
    let err = handle.get_view(PlayerId(999)).await.unwrap_err();
    assert_eq!(rule_error(err), GameError::UnknownParticipant(PlayerId(999)));
}

// =========================================================================
// Starting and hidden information
// =========================================================================

#[tokio::test]
async fn test_start_requires_five() {
    let handle = handle_with(seeded_config());
    join_players(&handle, 4).await;
    let err = handle.start().await.unwrap_err();
    assert_eq!(rule_error(err), GameError::NotEnoughPlayers);
}

#[tokio::test]
async fn test_start_gives_each_player_exactly_one_secret_role() {
    let handle = handle_with(seeded_config());
    let players = join_players(&handle, 5).await;
    handle.start().await.unwrap();

    let views = views_of(&handle, &players).await;
    assert!(views.iter().all(|v| v.phase == Phase::TeamBuilding));
    assert!(views.iter().all(|v| v.role.is_some()));

    let merlins = views
        .iter()
        .filter(|v| v.role == Some(Role::Merlin))
        .count();
    assert_eq!(merlins, 1);

    let holder = views[0].lady_holder.unwrap();
    let merlin = views
        .iter()
        .find(|v| v.role == Some(Role::Merlin))
        .unwrap()
        .player_id;
    assert_ne!(holder, merlin);
}

#[tokio::test]
async fn test_rejected_operation_leaves_state_unchanged() {
    let handle = handle_with(seeded_config());
    let players = join_players(&handle, 5).await;
    handle.start().await.unwrap();

    let leader = handle.get_view(players[0]).await.unwrap().leader.unwrap();
    let non_leader = *players.iter().find(|p| **p != leader).unwrap();

    let err = handle
        .propose_team(non_leader, vec![players[0], players[1]])
        .await
        .unwrap_err();
    assert_eq!(rule_error(err), GameError::WrongPhaseOrTurn);

    let view = handle.get_view(players[0]).await.unwrap();
    assert_eq!(view.phase, Phase::TeamBuilding);
    assert!(view.proposed_team.is_empty());
}

// =========================================================================
// A full game through the actor, the way a bot client plays it
// =========================================================================

#[tokio::test]
async fn test_full_game_three_successes_then_assassination() {
    let handle = handle_with(seeded_config());
    let players = join_players(&handle, 5).await;
    handle.start().await.unwrap();

    for quest in 1..=3u8 {
        let any_view = handle.get_view(players[0]).await.unwrap();
        assert_eq!(any_view.phase, Phase::TeamBuilding);
        assert_eq!(any_view.current_quest, quest);

        // The leader proposes the first seats of the public roster.
        let leader = any_view.leader.unwrap();
        let size = [2, 3, 2][quest as usize - 1];
        let team: Vec<PlayerId> = any_view
            .roster
            .iter()
            .take(size)
            .map(|entry| entry.player_id)
            .collect();
        handle.propose_team(leader, team.clone()).await.unwrap();

        for pid in &players {
            handle.vote(*pid, Vote::Approve).await.unwrap();
        }
        for pid in &team {
            handle.play_quest_card(*pid, QuestCard::Success).await.unwrap();
        }
    }

    let views = views_of(&handle, &players).await;
    assert!(views.iter().all(|v| v.phase == Phase::Assassination));
    let assassin = views
        .iter()
        .find(|v| v.role == Some(Role::Assassin))
        .unwrap();
    assert!(assassin.eligibility.can_assassinate);

    // The assassin finds Merlin (the test cheats; a real evil player
    // guesses).
    let merlin = views
        .iter()
        .find(|v| v.role == Some(Role::Merlin))
        .unwrap()
        .player_id;
    handle.assassinate(merlin).await.unwrap();

    let final_view = handle.get_view(players[0]).await.unwrap();
    assert_eq!(final_view.phase, Phase::GameOver);
    assert_eq!(final_view.winner, Some(Team::Evil));
}

// =========================================================================
// Phase deadlines
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_team_building_deadline_counts_a_rejection() {
    let handle = handle_with(SessionConfig {
        team_building_deadline: Duration::from_secs(5),
        ..seeded_config()
    });
    let players = join_players(&handle, 5).await;
    handle.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(6)).await;

    let view = handle.get_view(players[0]).await.unwrap();
    assert_eq!(view.phase, Phase::TeamBuilding);
    assert_eq!(view.failed_votes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_deadline_never_fires() {
    // Short team-building deadline, long voting deadline. Proposing
    // before the first deadline must invalidate it: well past the
    // original expiry the game is still calmly in voting.
    let handle = handle_with(SessionConfig {
        team_building_deadline: Duration::from_secs(5),
        voting_deadline: Duration::from_secs(600),
        ..seeded_config()
    });
    let players = join_players(&handle, 5).await;
    handle.start().await.unwrap();

    let leader = handle.get_view(players[0]).await.unwrap().leader.unwrap();
    let view = handle.get_view(players[0]).await.unwrap();
    let team: Vec<PlayerId> = view.roster.iter().take(2).map(|e| e.player_id).collect();
    handle.propose_team(leader, team).await.unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;

    let view = handle.get_view(players[0]).await.unwrap();
    assert_eq!(view.phase, Phase::Voting, "stale timer must not resolve");
    assert_eq!(view.failed_votes, 0);
}

#[tokio::test(start_paused = true)]
async fn test_voting_deadline_approves_the_silent() {
    let handle = handle_with(SessionConfig {
        voting_deadline: Duration::from_secs(5),
        ..seeded_config()
    });
    let players = join_players(&handle, 5).await;
    handle.start().await.unwrap();

    let view = handle.get_view(players[0]).await.unwrap();
    let leader = view.leader.unwrap();
    let team: Vec<PlayerId> = view.roster.iter().take(2).map(|e| e.player_id).collect();
    handle.propose_team(leader, team).await.unwrap();

    // Nobody votes; silence approves.
    tokio::time::sleep(Duration::from_secs(6)).await;

    let view = handle.get_view(players[0]).await.unwrap();
    assert_eq!(view.phase, Phase::Quest);
}

#[tokio::test(start_paused = true)]
async fn test_lobby_never_times_out() {
    let handle = handle_with(seeded_config());
    let players = join_players(&handle, 5).await;

    tokio::time::sleep(Duration::from_secs(3600)).await;

    let view = handle.get_view(players[0]).await.unwrap();
    assert_eq!(view.phase, Phase::Lobby);
    assert_eq!(view.deadline_ms_remaining, None);
}

#[tokio::test(start_paused = true)]
async fn test_views_carry_deadline_remaining() {
    let handle = handle_with(SessionConfig {
        team_building_deadline: Duration::from_secs(60),
        ..seeded_config()
    });
    let players = join_players(&handle, 5).await;
    handle.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;

    let view = handle.get_view(players[0]).await.unwrap();
    let remaining = view.deadline_ms_remaining.unwrap();
    assert!(remaining <= 50_000, "10s of 60s elapsed, got {remaining}ms");
    assert!(remaining > 0);
}

#[tokio::test(start_paused = true)]
async fn test_unattended_game_times_out_to_an_evil_win() {
    // Nobody ever proposes: five team-building expiries are five
    // rejections, and the fifth hands evil the game.
    let handle = handle_with(SessionConfig {
        team_building_deadline: Duration::from_millis(100),
        ..seeded_config()
    });
    let players = join_players(&handle, 5).await;
    handle.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;

    let view = handle.get_view(players[0]).await.unwrap();
    assert_eq!(view.phase, Phase::GameOver);
    assert_eq!(view.winner, Some(Team::Evil));
    assert_eq!(view.failed_votes, 5);

    // Terminal phase: no deadline, nothing more ever fires.
    tokio::time::sleep(Duration::from_secs(3600)).await;
    let after = handle.get_view(players[0]).await.unwrap();
    assert_eq!(after.winner, Some(Team::Evil));
    assert_eq!(after.deadline_ms_remaining, None);
}

// =========================================================================
// Presence
// =========================================================================

#[tokio::test]
async fn test_presence_flag_round_trips_through_views() {
    let handle = handle_with(seeded_config());
    let players = join_players(&handle, 5).await;

    handle.set_connected(players[2], false).await.unwrap();

    let view = handle.get_view(players[0]).await.unwrap();
    let entry = view
        .roster
        .iter()
        .find(|e| e.player_id == players[2])
        .unwrap();
    assert!(!entry.connected);
}
