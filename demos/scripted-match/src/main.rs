//! Scripted five-player match driven entirely through the session API.
//!
//! Five bots join a game, the good side pushes three quests through,
//! and the assassin takes a blind shot at Merlin. Every decision is
//! made from the bots' own filtered views, the same way a networked
//! client would play. Run with `RUST_LOG=debug` to watch the actor.

use avalon_protocol::{Phase, PlayerId, PlayerView, QuestCard, Role, Vote};
use avalon_session::{SessionConfig, SessionDirectory};

const NAMES: [&str; 5] = ["arthur", "gwen", "lancelot", "kay", "morgana"];

// ---------------------------------------------------------------------------
// Bot helpers
// ---------------------------------------------------------------------------

async fn views(
    handle: &avalon_session::GameHandle,
    players: &[PlayerId],
) -> Vec<PlayerView> {
    let mut out = Vec::with_capacity(players.len());
    for pid in players {
        out.push(handle.get_view(*pid).await.expect("participant view"));
    }
    out
}

fn describe(view: &PlayerView) -> String {
    let role = view
        .role
        .map(|r| format!("{r:?}"))
        .unwrap_or_else(|| "?".into());
    let known: Vec<String> = view
        .visible_roles
        .keys()
        .map(|pid| pid.to_string())
        .collect();
    if known.is_empty() {
        format!("{} plays as {role}", view.player_id)
    } else {
        format!("{} plays as {role}, sees evil in {}", view.player_id, known.join(", "))
    }
}

// ---------------------------------------------------------------------------
// The match
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut directory = SessionDirectory::new();
    let game_id = directory.create_game(SessionConfig::default());
    let handle = directory.get(game_id)?;
    println!("== game {game_id} ==");

    let mut players = Vec::new();
    for name in NAMES {
        let pid = handle.join(name).await?;
        println!("{name} joined as {pid}");
        players.push(pid);
    }

    handle.start().await?;
    for view in views(&handle, &players).await {
        println!("{}", describe(&view));
    }

    // Three quests. Each leader proposes the front of the roster and
    // everyone approves; the bots are all playing nice today, so every
    // member throws a success card.
    for quest in 1..=3u8 {
        let table = handle.get_view(players[0]).await?;
        assert_eq!(table.current_quest, quest);
        let leader = table.leader.expect("a leader outside the lobby");
        let size = table.roster.len().min(match quest {
            1 => 2,
            2 => 3,
            _ => 2,
        });
        let team: Vec<PlayerId> = table
            .roster
            .iter()
            .take(size)
            .map(|entry| entry.player_id)
            .collect();

        println!(
            "-- quest {quest}: {leader} proposes {}",
            team.iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        handle.propose_team(leader, team.clone()).await?;

        for pid in &players {
            handle.vote(*pid, Vote::Approve).await?;
        }
        for pid in &team {
            handle.play_quest_card(*pid, QuestCard::Success).await?;
        }

        let after = handle.get_view(players[0]).await?;
        let result = after.quest_results.last().expect("a settled quest");
        println!("   quest {quest} resolved: {result:?}");
    }

    // Good took three quests; evil gets its one shot.
    let table = handle.get_view(players[0]).await?;
    assert_eq!(table.phase, Phase::Assassination);

    let everyone = views(&handle, &players).await;
    let assassin = everyone
        .iter()
        .find(|v| v.role == Some(Role::Assassin))
        .expect("one assassin per deal");

    // The assassin cannot see who Merlin is, so the bot guesses the
    // first good-aligned seat it cannot identify as evil.
    let guess = assassin
        .roster
        .iter()
        .map(|entry| entry.player_id)
        .find(|pid| *pid != assassin.player_id && !assassin.visible_roles.contains_key(pid))
        .expect("someone to accuse");
    println!("-- {} assassinates {guess}", assassin.player_id);
    handle.assassinate(guess).await?;

    let finale = handle.get_view(players[0]).await?;
    let winner = finale.winner.expect("a winner at game over");
    println!("== {winner:?} wins ==");

    directory.destroy_game(game_id).await?;
    Ok(())
}
