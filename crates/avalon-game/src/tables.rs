//! Player-count lookup tables.
//!
//! Pure, stateless functions mapping player count to role counts and
//! per-quest team sizes, and card sets to quest outcomes. The tables
//! are only defined for 5..=10 players; `start` rejects fewer and
//! `join` rejects more, so an out-of-range query is a programmer error
//! and panics rather than surfacing as a user-facing error.

use avalon_protocol::{QuestCard, QuestResult};

/// Minimum participants required to start a game.
pub const MIN_PLAYERS: usize = 5;

/// Maximum participants a session accepts.
pub const MAX_PLAYERS: usize = 10;

/// Number of quests in a game.
pub const QUEST_COUNT: u8 = 5;

/// Rejected proposals before evil wins outright.
pub const MAX_FAILED_VOTES: u8 = 5;

/// `(good, evil)` role counts for a player count.
pub fn role_distribution(player_count: usize) -> (usize, usize) {
    match player_count {
        5 => (3, 2),
        6 => (4, 2),
        7 => (4, 3),
        8 => (5, 3),
        9 => (6, 3),
        10 => (6, 4),
        n => panic!("role distribution undefined for {n} players"),
    }
}

/// Team size for a given quest (1..=5) at a given player count.
pub fn quest_size(player_count: usize, quest_number: u8) -> usize {
    let sizes: [usize; 5] = match player_count {
        5 => [2, 3, 2, 3, 3],
        6 => [2, 3, 4, 3, 4],
        7 => [2, 3, 3, 4, 4],
        8..=10 => [3, 4, 4, 5, 5],
        n => panic!("quest sizes undefined for {n} players"),
    };
    assert!(
        (1..=QUEST_COUNT).contains(&quest_number),
        "quest number {quest_number} out of range"
    );
    sizes[quest_number as usize - 1]
}

/// How many fail cards sink a quest.
///
/// Quest 4 in games of 7+ players needs two fails; every other quest
/// fails on a single one.
pub fn fails_needed(player_count: usize, quest_number: u8) -> usize {
    if player_count >= 7 && quest_number == 4 { 2 } else { 1 }
}

/// Resolves a completed card set into a quest outcome.
pub fn resolve_quest(cards: &[QuestCard], player_count: usize, quest_number: u8) -> QuestResult {
    let fails = cards.iter().filter(|c| **c == QuestCard::Fail).count();
    if fails >= fails_needed(player_count, quest_number) {
        QuestResult::Fail
    } else {
        QuestResult::Success
    }
}
