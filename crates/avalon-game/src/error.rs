//! Rule-violation errors.

use avalon_protocol::PlayerId;

/// Why an operation was rejected.
///
/// Every rule operation either succeeds with a new snapshot or fails
/// with exactly one of these, leaving the snapshot untouched. All
/// variants are locally recoverable: the session survives, the caller
/// just tried something the rules don't allow right now.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The session already has 10 participants.
    #[error("game is full")]
    GameFull,

    /// Fewer than 5 participants have joined.
    #[error("not enough players to start")]
    NotEnoughPlayers,

    /// The operation is not legal in the current phase, or the caller
    /// is not the participant whose turn it is.
    #[error("wrong phase or not your turn")]
    WrongPhaseOrTurn,

    /// The proposed team does not match the quest-size table.
    #[error("proposed team has the wrong size")]
    WrongTeamSize,

    /// Voting is not open, or the caller is not a participant.
    #[error("cannot vote now")]
    CannotVote,

    /// No quest in progress, or the caller is not on the team.
    #[error("cannot play a quest card now")]
    CannotPlayCard,

    /// The assassination window is not open.
    #[error("cannot assassinate now")]
    CannotAssassinateNow,

    /// The investigate ability is not available to this caller or
    /// against this target.
    #[error("cannot use the investigate ability")]
    CannotUseAbility,

    /// The referenced participant id is not part of this game.
    #[error("unknown participant {0}")]
    UnknownParticipant(PlayerId),
}
