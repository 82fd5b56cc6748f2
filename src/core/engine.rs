//! Engine module - one mutable game session
//!
//! Ties board, bag, shape/kick tables, and scoring into a single state
//! machine: spawn, move, rotate, drop, hold, lock, clear. Rejected actions
//! return false/zero and leave state untouched; terminal conditions flip
//! `game_over`, after which every mutator is a no-op until `reset`.
//!
//! The engine is deliberately not thread-safe. It is driven from a single
//! logical timeline (the controller's driver task, or one calling thread).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::pieces::{kick_offsets, shape, spawn_origin};
use crate::core::rng::RandomBag;
use crate::core::scoring::ScoreState;
use crate::core::snapshot::GameSnapshot;
use crate::core::Board;
use crate::types::{
    Coord, PieceKind, Rotation, BAG_SIZE, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, QUEUE_MIN,
};

/// The falling piece. Replaced wholesale on every transition, never
/// mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub origin: Coord,
}

impl ActivePiece {
    /// New piece at the standard spawn position for the given board width
    pub fn spawn(kind: PieceKind, width: u8) -> Self {
        Self {
            kind,
            rotation: Rotation::Spawn,
            origin: spawn_origin(width),
        }
    }

    /// Absolute occupied cells: the shape table translated by the origin
    pub fn cells(&self) -> [Coord; 4] {
        shape(self.kind, self.rotation).map(|offset| self.origin + offset)
    }

    fn translated(&self, dx: i8, dy: i8) -> Self {
        Self {
            origin: self.origin + Coord::new(dx, dy),
            ..*self
        }
    }
}

/// Session configuration, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub width: u8,
    pub height: u8,
    pub seed: u32,
    pub hold_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            seed: 1,
            hold_enabled: true,
        }
    }
}

/// Complete game session state
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    bag: RandomBag,
    queue: VecDeque<PieceKind>,
    active: Option<ActivePiece>,
    hold: Option<PieceKind>,
    can_hold: bool,
    hold_enabled: bool,
    score: ScoreState,
    game_over: bool,
}

impl Engine {
    /// Construct a session and spawn the first piece.
    ///
    /// With a non-empty starting board this could already be game over;
    /// callers observe that through `game_over()`.
    pub fn new(config: EngineConfig) -> Self {
        let mut engine = Self {
            board: Board::new(config.width, config.height),
            bag: RandomBag::new(config.seed),
            queue: VecDeque::new(),
            active: None,
            hold: None,
            can_hold: true,
            hold_enabled: config.hold_enabled,
            score: ScoreState::new(),
            game_over: false,
        };
        engine.spawn_next();
        engine
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn level(&self) -> u32 {
        self.score.level()
    }

    pub fn lines(&self) -> u32 {
        self.score.lines()
    }

    /// Upcoming pieces, soonest first
    pub fn queue(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Top the queue up in whole shuffled-bag batches. Callers pop one
    /// piece right after, so the queue is kept one past the preview
    /// minimum.
    fn refill_queue(&mut self) {
        while self.queue.len() <= QUEUE_MIN {
            for _ in 0..BAG_SIZE {
                self.queue.push_back(self.bag.next());
            }
        }
    }

    fn spawn(&mut self, kind: PieceKind) -> bool {
        let piece = ActivePiece::spawn(kind, self.board.width());
        if self.board.collides(&piece.cells()) {
            debug!(?kind, "spawn blocked, game over");
            self.game_over = true;
            self.active = None;
            return false;
        }
        self.active = Some(piece);
        true
    }

    fn spawn_next(&mut self) -> bool {
        self.refill_queue();
        let Some(kind) = self.queue.pop_front() else {
            self.game_over = true;
            self.active = None;
            return false;
        };
        self.spawn(kind)
    }

    /// Movement primitive: commit the translated piece only if it fits
    fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        if self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        let moved = active.translated(dx, dy);
        if self.board.collides(&moved.cells()) {
            return false;
        }
        self.active = Some(moved);
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(1, 0)
    }

    /// Single downward step. Never locks; a blocked step just reports false.
    pub fn step_down(&mut self) -> bool {
        self.try_move(0, 1)
    }

    /// Descend until blocked, 1 point per row. Does not lock.
    pub fn soft_drop(&mut self) -> u32 {
        let mut rows = 0u32;
        while self.step_down() {
            rows += 1;
        }
        self.score.add_drop_points(rows, false);
        rows
    }

    /// Descend until blocked, 2 points per row, then lock unconditionally.
    /// Returns the number of rows descended.
    pub fn hard_drop(&mut self) -> u32 {
        if self.game_over || self.active.is_none() {
            return 0;
        }
        let mut rows = 0u32;
        while self.step_down() {
            rows += 1;
        }
        self.score.add_drop_points(rows, true);
        self.lock_and_advance();
        rows
    }

    fn try_rotate(&mut self, clockwise: bool) -> bool {
        if self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        let to = if clockwise {
            active.rotation.cw()
        } else {
            active.rotation.ccw()
        };
        for &kick in kick_offsets(active.kind, active.rotation, to) {
            let candidate = ActivePiece {
                kind: active.kind,
                rotation: to,
                origin: active.origin + kick,
            };
            if !self.board.collides(&candidate.cells()) {
                self.active = Some(candidate);
                return true;
            }
        }
        false
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.try_rotate(true)
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.try_rotate(false)
    }

    /// Bank the current piece. The latch re-enables on the next lock.
    ///
    /// First use stashes the active kind and pulls from the queue; later
    /// uses swap with the held kind. The incoming piece respawns at the
    /// standard spawn position; a colliding respawn is game over.
    pub fn hold(&mut self) -> bool {
        if !self.hold_enabled || !self.can_hold || self.game_over {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let incoming = match self.hold.take() {
            Some(held) => {
                self.hold = Some(active.kind);
                held
            }
            None => {
                self.hold = Some(active.kind);
                self.refill_queue();
                let Some(kind) = self.queue.pop_front() else {
                    self.game_over = true;
                    self.active = None;
                    return false;
                };
                kind
            }
        };

        self.can_hold = false;
        self.spawn(incoming)
    }

    /// Lock finalization used by the controller after the lock delay.
    ///
    /// A late descent is still honored (returns true, nothing locks);
    /// otherwise the piece is written down, lines clear, and the next piece
    /// spawns (returns false).
    pub fn finalize_lock(&mut self) -> bool {
        if self.game_over || self.active.is_none() {
            return false;
        }
        if self.step_down() {
            return true;
        }
        self.lock_and_advance();
        false
    }

    /// Write the active piece into the board, clear lines, score, re-enable
    /// hold, and spawn the next piece.
    fn lock_and_advance(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        for cell in active.cells() {
            // Overhang above the board is never materialized.
            if cell.y < 0 {
                continue;
            }
            if !self.board.in_bounds(cell) {
                // Unaddressable lock cell: fatal. Partial writes stay.
                debug!(x = cell.x, y = cell.y, "lock out of bounds, game over");
                self.game_over = true;
                return;
            }
            self.board = self.board.set(cell.x, cell.y, Some(active.kind));
        }

        let (cleared, board) = self.board.clear_full_rows();
        self.board = board;
        if cleared > 0 {
            let points = self.score.apply_line_clear(cleared);
            debug!(cleared, points, level = self.score.level(), "lines cleared");
        }

        self.can_hold = true;
        self.spawn_next();
    }

    /// Row the active piece would land on (rendering aid)
    pub fn ghost_row(&self) -> Option<i8> {
        let active = self.active?;
        let mut drop = 0i8;
        while !self.board.collides(&active.translated(0, drop + 1).cells()) {
            drop += 1;
        }
        Some(active.origin.y + drop)
    }

    /// Atomically reinitialize everything, equivalent to fresh construction
    /// with the new seed.
    pub fn reset(&mut self, seed: u32) {
        self.board = Board::new(self.board.width(), self.board.height());
        self.bag.reseed(seed);
        self.queue.clear();
        self.active = None;
        self.hold = None;
        self.can_hold = true;
        self.score.reset();
        self.game_over = false;
        self.spawn_next();
    }

    /// Defensive, immutable aggregate of the current state. Owned copies
    /// only; callers cannot reach engine internals through it.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.clone(),
            active: self.active,
            ghost_row: self.ghost_row(),
            queue: self.queue.iter().copied().collect(),
            hold: self.hold,
            can_hold: self.can_hold,
            score: self.score.score(),
            level: self.score.level(),
            lines: self.score.lines(),
            game_over: self.game_over,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
