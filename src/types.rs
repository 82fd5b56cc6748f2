//! Core types shared across the crate
//!
//! Pure data types plus the timing constants the runtime controller drives
//! the engine with. No behavior beyond small total functions.

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Default board dimensions
pub const DEFAULT_BOARD_WIDTH: u8 = 10;
pub const DEFAULT_BOARD_HEIGHT: u8 = 20;

/// Gravity timing (milliseconds): interval at level L is
/// `max(MIN_DROP_MS, BASE_DROP_MS - (L - 1) * DROP_DECAY_PER_LEVEL_MS)`.
pub const BASE_DROP_MS: u64 = 1000;
pub const DROP_DECAY_PER_LEVEL_MS: u64 = 60;
pub const MIN_DROP_MS: u64 = 50;

/// Grace period after a piece grounds before it locks (milliseconds)
pub const LOCK_DELAY_MS: u64 = 500;

/// Gravity pause after a line clear (milliseconds)
pub const LINE_CLEAR_PAUSE_MS: u64 = 300;

/// Pieces per randomizer bag
pub const BAG_SIZE: usize = 7;

/// Minimum upcoming pieces kept ahead of consumption
pub const QUEUE_MIN: usize = 5;

/// Board coordinate: origin (0, 0) top-left, y grows downward.
/// Rows above the visible board are negative (spawn overhang).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i8,
    pub y: i8,
}

impl Coord {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All seven kinds, in bag order before shuffling
    pub const ALL: [PieceKind; BAG_SIZE] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];
}

/// Rotation states, cyclic (Spawn is the orientation pieces enter with)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    Spawn,
    R90,
    R180,
    R270,
}

impl Rotation {
    fn index(self) -> u8 {
        match self {
            Rotation::Spawn => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Rotation::Spawn,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }

    /// Clockwise successor
    pub fn cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Counter-clockwise predecessor
    pub fn ccw(self) -> Self {
        Self::from_index(self.index() + 3)
    }
}

/// Cell on the board (None = empty; the kind is kept for rendering color only)
pub type Cell = Option<PieceKind>;

/// Player actions accepted by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    MoveLeft,
    MoveRight,
    RotateCw,
    RotateCcw,
    SoftDrop,
    HardDrop,
    Hold,
}
