//! Runtime controller - drives an [`Engine`] on tokio timers
//!
//! A single spawned driver task owns the engine and multiplexes three
//! sources with `select!`: the command channel (lifecycle + player
//! actions), the gravity deadline, and the lock-delay deadline. Timers are
//! `Option<Instant>` deadlines on the driver; cancelling one is clearing
//! the option before the next loop turn, so a cancelled timer can never
//! fire late and no two timers of the same kind can coexist.
//!
//! Observers get the latest state through a `watch` channel and discrete
//! events through a bounded `broadcast` channel. All engine access happens
//! on the driver task; the public handle only sends commands.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::core::{drop_interval_ms, Engine, EngineConfig, GameSnapshot};
use crate::types::{GameAction, LINE_CLEAR_PAUSE_MS, LOCK_DELAY_MS};

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 16;

/// Discrete gameplay events, fire-once per occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    LinesCleared(u32),
    Paused,
    Resumed,
    Reset,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug)]
enum Command {
    Start,
    Stop,
    Pause,
    Resume,
    Reset(u32),
    Action(GameAction),
    PlayerAction { cancel_lock: bool },
    Shutdown,
}

/// Handle to a running controller.
///
/// Dropping the handle shuts the driver task down (the command channel
/// closes); `shutdown` does the same but waits for the task to finish.
pub struct GameController {
    cmd_tx: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<GameSnapshot>,
    event_tx: broadcast::Sender<GameEvent>,
    driver: JoinHandle<()>,
}

impl GameController {
    /// Build an engine from `config` and spawn the driver task.
    ///
    /// The controller starts Stopped; call [`start`](Self::start) to begin
    /// gravity.
    pub fn spawn(config: EngineConfig) -> Self {
        let engine = Engine::new(config);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);

        let driver = Driver {
            engine,
            snapshot_tx,
            event_tx: event_tx.clone(),
            state: RunState::Stopped,
            gravity_at: None,
            lock_at: None,
            on_ground: false,
            game_over_emitted: false,
        };
        let handle = tokio::spawn(driver.run(cmd_rx));

        Self {
            cmd_tx,
            snapshot_rx,
            event_tx,
            driver: handle,
        }
    }

    pub async fn start(&self) {
        self.send(Command::Start).await;
    }

    pub async fn stop(&self) {
        self.send(Command::Stop).await;
    }

    pub async fn pause(&self) {
        self.send(Command::Pause).await;
    }

    pub async fn resume(&self) {
        self.send(Command::Resume).await;
    }

    /// Reinitialize the engine with a new seed. Gravity re-arms only if the
    /// controller was Running and not Paused.
    pub async fn reset(&self, seed: u32) {
        self.send(Command::Reset(seed)).await;
    }

    /// Forward a player action to the engine on the driver timeline
    pub async fn apply(&self, action: GameAction) {
        self.send(Command::Action(action)).await;
    }

    /// Input-layer hook: a move/rotate happened, optionally cancelling a
    /// pending lock delay so the piece gets a fresh grounding check.
    pub async fn notify_player_action(&self, cancel_lock: bool) {
        self.send(Command::PlayerAction { cancel_lock }).await;
    }

    /// Latest published snapshot (latest-value semantics)
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to the continuously updated snapshot stream
    pub fn watch(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Subscribe to the discrete event stream. Events are not replayed to
    /// late subscribers.
    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }

    /// Stop the driver task and wait for it to finish
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.cmd_tx.send(Command::Shutdown).await;
        self.driver.await.context("controller driver panicked")
    }

    async fn send(&self, cmd: Command) {
        // A closed channel means the driver is gone; commands become no-ops.
        let _ = self.cmd_tx.send(cmd).await;
    }
}

/// Sleep until an optional deadline; a `None` deadline never fires
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

struct Driver {
    engine: Engine,
    snapshot_tx: watch::Sender<GameSnapshot>,
    event_tx: broadcast::Sender<GameEvent>,
    state: RunState,
    gravity_at: Option<Instant>,
    lock_at: Option<Instant>,
    on_ground: bool,
    game_over_emitted: bool,
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        loop {
            let gravity_at = self.gravity_at;
            let lock_at = self.lock_at;
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = wait_until(gravity_at), if gravity_at.is_some() => self.gravity_tick(),
                _ = wait_until(lock_at), if lock_at.is_some() => self.lock_expired(),
            }
        }
        debug!("controller driver finished");
    }

    fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    fn arm_gravity_in(&mut self, extra_ms: u64) {
        let interval = drop_interval_ms(self.engine.level());
        self.gravity_at = Some(Instant::now() + Duration::from_millis(interval + extra_ms));
    }

    fn cancel_timers(&mut self) {
        self.gravity_at = None;
        self.lock_at = None;
        self.on_ground = false;
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.engine.snapshot());
    }

    fn emit(&self, event: GameEvent) {
        // No subscribers is fine; the stream is fire-and-forget multicast.
        let _ = self.event_tx.send(event);
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Reset(seed) => self.reset(seed),
            Command::Action(action) => self.apply_action(action),
            Command::PlayerAction { cancel_lock } => {
                if cancel_lock && self.lock_at.take().is_some() {
                    self.on_ground = false;
                }
            }
            Command::Shutdown => {}
        }
    }

    fn start(&mut self) {
        if self.state == RunState::Running {
            return;
        }
        if self.engine.game_over() {
            debug!("start ignored, session is over; reset first");
            return;
        }
        self.state = RunState::Running;
        self.arm_gravity_in(0);
        info!(level = self.engine.level(), "controller running");
    }

    fn stop(&mut self) {
        self.cancel_timers();
        self.state = RunState::Stopped;
        info!("controller stopped");
    }

    fn pause(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        self.cancel_timers();
        self.state = RunState::Paused;
        self.emit(GameEvent::Paused);
        debug!("paused");
    }

    fn resume(&mut self) {
        if self.state != RunState::Paused {
            return;
        }
        self.state = RunState::Running;
        self.arm_gravity_in(0);
        self.emit(GameEvent::Resumed);
        debug!("resumed");
    }

    fn reset(&mut self, seed: u32) {
        self.lock_at = None;
        self.on_ground = false;
        self.game_over_emitted = false;
        self.engine.reset(seed);
        if self.is_running() {
            self.arm_gravity_in(0);
        } else {
            self.gravity_at = None;
        }
        self.publish();
        self.emit(GameEvent::Reset);
        info!(seed, "session reset");
    }

    fn apply_action(&mut self, action: GameAction) {
        if self.engine.game_over() {
            return;
        }
        match action {
            GameAction::MoveLeft => {
                if self.engine.move_left() {
                    self.publish();
                }
            }
            GameAction::MoveRight => {
                if self.engine.move_right() {
                    self.publish();
                }
            }
            GameAction::RotateCw => {
                if self.engine.rotate_cw() {
                    self.publish();
                }
            }
            GameAction::RotateCcw => {
                if self.engine.rotate_ccw() {
                    self.publish();
                }
            }
            GameAction::SoftDrop => {
                if self.engine.soft_drop() > 0 {
                    self.publish();
                }
            }
            GameAction::HardDrop => self.hard_drop(),
            GameAction::Hold => self.hold(),
        }
    }

    fn hard_drop(&mut self) {
        let lines_before = self.engine.lines();
        let rows = self.engine.hard_drop();
        debug!(rows, "hard drop");
        // The drop locked; any pending lock delay is for a piece that no
        // longer exists.
        self.lock_at = None;
        self.on_ground = false;

        let cleared = self.engine.lines() - lines_before;
        if cleared > 0 {
            self.emit(GameEvent::LinesCleared(cleared));
        }
        self.publish();

        if self.engine.game_over() {
            self.finalize_game_over();
            return;
        }
        if self.is_running() {
            let pause = if cleared > 0 { LINE_CLEAR_PAUSE_MS } else { 0 };
            self.arm_gravity_in(pause);
        }
    }

    fn hold(&mut self) {
        if self.engine.hold() {
            // The active piece respawned; grounding state starts over.
            self.lock_at = None;
            self.on_ground = false;
            self.publish();
        } else if self.engine.game_over() {
            self.publish();
            self.finalize_game_over();
        }
    }

    fn gravity_tick(&mut self) {
        self.gravity_at = None;
        if !self.is_running() {
            return;
        }
        if self.engine.game_over() {
            self.finalize_game_over();
            return;
        }

        if self.engine.step_down() {
            self.on_ground = false;
            self.publish();
        } else if !self.on_ground {
            self.on_ground = true;
            self.lock_at = Some(Instant::now() + Duration::from_millis(LOCK_DELAY_MS));
        }
        self.arm_gravity_in(0);
    }

    fn lock_expired(&mut self) {
        self.lock_at = None;
        if !self.is_running() || self.engine.game_over() {
            return;
        }

        let lines_before = self.engine.lines();
        let moved = self.engine.finalize_lock();
        self.on_ground = false;

        if moved {
            // Late descent: the engine let the piece keep falling.
            self.publish();
            return;
        }

        let cleared = self.engine.lines() - lines_before;
        if cleared > 0 {
            self.emit(GameEvent::LinesCleared(cleared));
            // Hold gravity for the line-clear pause before the next tick.
            self.arm_gravity_in(LINE_CLEAR_PAUSE_MS);
        }
        self.publish();

        if self.engine.game_over() {
            self.finalize_game_over();
        }
    }

    fn finalize_game_over(&mut self) {
        self.cancel_timers();
        self.state = RunState::Stopped;
        self.publish();
        if !self.game_over_emitted {
            self.game_over_emitted = true;
            self.emit(GameEvent::GameOver);
            info!(
                score = self.engine.score(),
                lines = self.engine.lines(),
                "game over"
            );
        }
    }
}
