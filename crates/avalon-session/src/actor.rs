//! Game actor: an isolated Tokio task that owns one game session.
//!
//! All operations against a session's snapshot go through the actor's
//! command channel, so they are strictly serialized. The actor also
//! owns the single pending phase-deadline timer; a deadline firing is
//! processed through the same serialization point as user commands, so
//! a race between "user acts right at the deadline" and "timer fires"
//! is resolved by ordering, not locking. Whichever loses simply sees
//! the phase has moved on.

use avalon_game::{GameError, GameSnapshot};
use avalon_protocol::{GameId, PlayerId, PlayerView, QuestCard, ViewUpdate, Vote};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, Instant};

use crate::{SessionConfig, SessionError};

/// Commands sent to a game actor through its channel. Variants with a
/// `oneshot::Sender` are request/reply; the caller suspends until the
/// actor answers.
pub(crate) enum GameCommand {
    Join {
        name: String,
        reply: oneshot::Sender<Result<PlayerId, GameError>>,
    },
    Start {
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    ProposeTeam {
        player_id: PlayerId,
        team: Vec<PlayerId>,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Vote {
        player_id: PlayerId,
        choice: Vote,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    PlayQuestCard {
        player_id: PlayerId,
        card: QuestCard,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    Assassinate {
        target_id: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    BeginInvestigate {
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    UseInvestigate {
        player_id: PlayerId,
        target_id: PlayerId,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    SetConnected {
        player_id: PlayerId,
        connected: bool,
        reply: oneshot::Sender<Result<(), GameError>>,
    },
    GetView {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<PlayerView, GameError>>,
    },
    Shutdown,
}

/// Handle to a running game actor. Cheap to clone; the
/// [`SessionDirectory`](crate::SessionDirectory) holds one per session.
#[derive(Clone)]
pub struct GameHandle {
    game_id: GameId,
    sender: mpsc::Sender<GameCommand>,
    updates: broadcast::Sender<ViewUpdate>,
}

impl GameHandle {
    /// The session this handle talks to.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Subscribes to this session's view updates. One [`ViewUpdate`]
    /// per participant per accepted transition; filter by your own id.
    /// Lagging receivers miss updates and should re-query with
    /// [`get_view`](Self::get_view).
    pub fn subscribe(&self) -> broadcast::Receiver<ViewUpdate> {
        self.updates.subscribe()
    }

    /// Adds a participant, returning their fresh id.
    pub async fn join(&self, name: impl Into<String>) -> Result<PlayerId, SessionError> {
        let name = name.into();
        self.request(|reply| GameCommand::Join { name, reply }).await
    }

    /// Deals roles and opens team building.
    pub async fn start(&self) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::Start { reply }).await
    }

    /// The leader proposes a team for the current quest.
    pub async fn propose_team(
        &self,
        player_id: PlayerId,
        team: Vec<PlayerId>,
    ) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::ProposeTeam {
            player_id,
            team,
            reply,
        })
        .await
    }

    /// Casts (or overwrites) a ballot on the proposed team.
    pub async fn vote(&self, player_id: PlayerId, choice: Vote) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::Vote {
            player_id,
            choice,
            reply,
        })
        .await
    }

    /// Plays a quest card for a team member.
    pub async fn play_quest_card(
        &self,
        player_id: PlayerId,
        card: QuestCard,
    ) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::PlayQuestCard {
            player_id,
            card,
            reply,
        })
        .await
    }

    /// The assassin names a target.
    pub async fn assassinate(&self, target_id: PlayerId) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::Assassinate { target_id, reply })
            .await
    }

    /// Externally triggers the Lady-of-the-Lake window.
    pub async fn begin_investigate(&self) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::BeginInvestigate { reply })
            .await
    }

    /// The Lady holder investigates a target.
    pub async fn use_investigate(
        &self,
        player_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::UseInvestigate {
            player_id,
            target_id,
            reply,
        })
        .await
    }

    /// Updates a participant's presence flag.
    pub async fn set_connected(
        &self,
        player_id: PlayerId,
        connected: bool,
    ) -> Result<(), SessionError> {
        self.request(|reply| GameCommand::SetConnected {
            player_id,
            connected,
            reply,
        })
        .await
    }

    /// Fetches the participant's current filtered view.
    pub async fn get_view(&self, player_id: PlayerId) -> Result<PlayerView, SessionError> {
        self.request(|reply| GameCommand::GetView { player_id, reply })
            .await
    }

    /// Tells the actor to stop. Idempotent; pending commands already
    /// queued are dropped unanswered.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.sender
            .send(GameCommand::Shutdown)
            .await
            .map_err(|_| SessionError::Unavailable(self.game_id))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, GameError>>) -> GameCommand,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| SessionError::Unavailable(self.game_id))?;
        reply_rx
            .await
            .map_err(|_| SessionError::Unavailable(self.game_id))?
            .map_err(SessionError::from)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct GameActor {
    game_id: GameId,
    snapshot: GameSnapshot,
    config: SessionConfig,
    rng: StdRng,
    /// The single pending phase deadline. Replaced (never duplicated)
    /// on every rearm; `None` means no timer is armed.
    deadline: Option<Instant>,
    receiver: mpsc::Receiver<GameCommand>,
    updates: broadcast::Sender<ViewUpdate>,
}

/// Resolves when the armed deadline passes; pends forever when no
/// deadline is armed, so `select!` just serves other branches.
async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

impl GameActor {
    async fn run(mut self) {
        tracing::info!(game_id = %self.game_id, "game actor started");

        loop {
            // The deadline branch is rebuilt from the current value on
            // every iteration, so a deadline superseded by an accepted
            // transition can never fire.
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(GameCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = deadline_elapsed(self.deadline) => self.handle_deadline(),
            }
        }

        tracing::info!(game_id = %self.game_id, "game actor stopped");
    }

    fn handle_command(&mut self, cmd: GameCommand) {
        match cmd {
            GameCommand::Join { name, reply } => {
                let result = self.snapshot.join(&name).map(|(next, player_id)| {
                    tracing::info!(
                        game_id = %self.game_id,
                        %player_id,
                        players = next.player_count(),
                        "player joined"
                    );
                    self.apply(next, false);
                    player_id
                });
                let _ = reply.send(self.logged("join", result));
            }
            GameCommand::Start { reply } => {
                let result = self.snapshot.start(&mut self.rng).map(|next| {
                    tracing::info!(
                        game_id = %self.game_id,
                        players = next.player_count(),
                        "game started"
                    );
                    self.apply(next, false);
                });
                let _ = reply.send(self.logged("start", result));
            }
            GameCommand::ProposeTeam {
                player_id,
                team,
                reply,
            } => {
                let result = self.snapshot.propose_team(player_id, &team);
                let _ = reply.send(self.settle("propose_team", result));
            }
            GameCommand::Vote {
                player_id,
                choice,
                reply,
            } => {
                let result = self.snapshot.vote(player_id, choice);
                let _ = reply.send(self.settle("vote", result));
            }
            GameCommand::PlayQuestCard {
                player_id,
                card,
                reply,
            } => {
                let result = self.snapshot.play_quest_card(player_id, card);
                let _ = reply.send(self.settle("play_quest_card", result));
            }
            GameCommand::Assassinate { target_id, reply } => {
                let result = self.snapshot.assassinate(target_id);
                let _ = reply.send(self.settle("assassinate", result));
            }
            GameCommand::BeginInvestigate { reply } => {
                let result = self.snapshot.begin_investigate();
                let _ = reply.send(self.settle("begin_investigate", result));
            }
            GameCommand::UseInvestigate {
                player_id,
                target_id,
                reply,
            } => {
                let result = self.snapshot.use_investigate(player_id, target_id);
                let _ = reply.send(self.settle("use_investigate", result));
            }
            GameCommand::SetConnected {
                player_id,
                connected,
                reply,
            } => {
                let result = self.snapshot.set_connected(player_id, connected);
                let _ = reply.send(self.settle("set_connected", result));
            }
            GameCommand::GetView { player_id, reply } => {
                let view = self.snapshot.player_view(player_id).map(|mut view| {
                    view.deadline_ms_remaining = self.remaining_ms();
                    view
                });
                let _ = reply.send(view);
            }
            GameCommand::Shutdown => unreachable!("handled by the run loop"),
        }
    }

    /// Applies a successful transition result, or logs the rejection.
    fn settle(
        &mut self,
        op: &'static str,
        result: Result<GameSnapshot, GameError>,
    ) -> Result<(), GameError> {
        let next = self.logged(op, result)?;
        self.apply(next, false);
        Ok(())
    }

    fn logged<T>(
        &self,
        op: &'static str,
        result: Result<T, GameError>,
    ) -> Result<T, GameError> {
        if let Err(reason) = &result {
            tracing::debug!(
                game_id = %self.game_id,
                phase = %self.snapshot.phase,
                op,
                %reason,
                "operation rejected"
            );
        }
        result
    }

    /// Installs an accepted snapshot: rearms the deadline when the
    /// phase changed (or when forced, for same-phase round turnover on
    /// timeout), then fans a view out to every participant.
    fn apply(&mut self, next: GameSnapshot, force_rearm: bool) {
        let phase_changed = next.phase != self.snapshot.phase;
        self.snapshot = next;

        if phase_changed || force_rearm {
            self.rearm_deadline();
        }
        if phase_changed && self.snapshot.phase.is_terminal() {
            tracing::info!(
                game_id = %self.game_id,
                winner = ?self.snapshot.winner,
                quests = self.snapshot.quest_results.len(),
                "game finished"
            );
        }

        self.publish_views();
    }

    /// Cancels any pending deadline, then arms the new phase's one.
    /// At most one deadline is ever pending per session.
    fn rearm_deadline(&mut self) {
        self.deadline = None;
        if let Some(timeout) = self.config.deadline_for(self.snapshot.phase) {
            self.deadline = Some(Instant::now() + timeout);
            tracing::debug!(
                game_id = %self.game_id,
                phase = %self.snapshot.phase,
                timeout_ms = timeout.as_millis() as u64,
                "phase deadline armed"
            );
        }
    }

    /// The deadline fired: auto-resolve the current phase. In an
    /// untimed phase this is a no-op.
    fn handle_deadline(&mut self) {
        self.deadline = None;
        let phase = self.snapshot.phase;
        match self.snapshot.resolve_deadline(&mut self.rng) {
            Some(next) => {
                tracing::info!(game_id = %self.game_id, %phase, "phase deadline expired, auto-resolving");
                self.apply(next, true);
            }
            None => {
                tracing::debug!(game_id = %self.game_id, %phase, "deadline fired in untimed phase, ignoring");
            }
        }
    }

    fn remaining_ms(&self) -> Option<u64> {
        self.deadline
            .map(|at| at.saturating_duration_since(Instant::now()).as_millis() as u64)
    }

    /// Publishes one filtered view per participant. Fire-and-forget:
    /// delivery to any given subscriber is at most once.
    fn publish_views(&self) {
        let remaining = self.remaining_ms();
        for player_id in &self.snapshot.player_order {
            match self.snapshot.player_view(*player_id) {
                Ok(mut view) => {
                    view.deadline_ms_remaining = remaining;
                    let _ = self.updates.send(ViewUpdate {
                        player_id: *player_id,
                        view,
                    });
                }
                Err(reason) => tracing::warn!(
                    game_id = %self.game_id,
                    player_id = %player_id,
                    %reason,
                    "view derivation failed for a roster member"
                ),
            }
        }
    }
}

/// Spawns a new game actor task and returns a handle to it.
pub fn spawn_game(game_id: GameId, config: SessionConfig) -> GameHandle {
    let config = config.validated();
    let (sender, receiver) = mpsc::channel(config.command_buffer);
    let (updates, _) = broadcast::channel(config.broadcast_capacity);

    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let actor = GameActor {
        game_id,
        snapshot: GameSnapshot::new(game_id),
        config,
        rng,
        deadline: None,
        receiver,
        updates: updates.clone(),
    };

    tokio::spawn(actor.run());

    GameHandle {
        game_id,
        sender,
        updates,
    }
}
