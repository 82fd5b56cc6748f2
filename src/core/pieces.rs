//! Pieces module - tetromino shapes and SRS-style wall kicks
//!
//! Shapes are static per-kind, per-rotation offset lists relative to the
//! piece origin (y grows downward). Kick tables are keyed by the ordered
//! (from, to) rotation pair; the I piece gets the wider kick range, O never
//! kicks, and an unmapped transition falls back to a single zero offset.

use crate::types::{Coord, PieceKind, Rotation};

/// Occupied cells of a piece, relative to its origin
pub type Shape = [Coord; 4];

const fn c(x: i8, y: i8) -> Coord {
    Coord::new(x, y)
}

/// Get the relative cell offsets for a piece kind and rotation
pub fn shape(kind: PieceKind, rotation: Rotation) -> Shape {
    match kind {
        PieceKind::I => i_shape(rotation),
        PieceKind::O => [c(0, 0), c(1, 0), c(0, 1), c(1, 1)],
        PieceKind::T => t_shape(rotation),
        PieceKind::S => s_shape(rotation),
        PieceKind::Z => z_shape(rotation),
        PieceKind::J => j_shape(rotation),
        PieceKind::L => l_shape(rotation),
    }
}

fn i_shape(rotation: Rotation) -> Shape {
    match rotation {
        Rotation::Spawn | Rotation::R180 => [c(-1, 1), c(0, 1), c(1, 1), c(2, 1)],
        Rotation::R90 | Rotation::R270 => [c(0, 0), c(0, 1), c(0, 2), c(0, 3)],
    }
}

fn t_shape(rotation: Rotation) -> Shape {
    match rotation {
        Rotation::Spawn => [c(0, 0), c(-1, 1), c(0, 1), c(1, 1)],
        Rotation::R90 => [c(0, 0), c(0, 1), c(1, 1), c(0, 2)],
        Rotation::R180 => [c(-1, 1), c(0, 1), c(1, 1), c(0, 2)],
        Rotation::R270 => [c(0, 0), c(-1, 1), c(0, 1), c(0, 2)],
    }
}

fn s_shape(rotation: Rotation) -> Shape {
    match rotation {
        Rotation::Spawn | Rotation::R180 => [c(0, 0), c(1, 0), c(-1, 1), c(0, 1)],
        Rotation::R90 | Rotation::R270 => [c(0, 0), c(0, 1), c(1, 1), c(1, 2)],
    }
}

fn z_shape(rotation: Rotation) -> Shape {
    match rotation {
        Rotation::Spawn | Rotation::R180 => [c(-1, 0), c(0, 0), c(0, 1), c(1, 1)],
        Rotation::R90 | Rotation::R270 => [c(1, 0), c(0, 1), c(1, 1), c(0, 2)],
    }
}

fn j_shape(rotation: Rotation) -> Shape {
    match rotation {
        Rotation::Spawn => [c(-1, 0), c(-1, 1), c(0, 1), c(1, 1)],
        Rotation::R90 => [c(0, 0), c(1, 0), c(0, 1), c(0, 2)],
        Rotation::R180 => [c(-1, 1), c(0, 1), c(1, 1), c(1, 2)],
        Rotation::R270 => [c(0, 0), c(0, 1), c(-1, 2), c(0, 2)],
    }
}

fn l_shape(rotation: Rotation) -> Shape {
    match rotation {
        Rotation::Spawn => [c(1, 0), c(-1, 1), c(0, 1), c(1, 1)],
        Rotation::R90 => [c(0, 0), c(0, 1), c(0, 2), c(1, 2)],
        Rotation::R180 => [c(-1, 1), c(0, 1), c(1, 1), c(-1, 2)],
        Rotation::R270 => [c(-1, 0), c(0, 0), c(0, 1), c(0, 2)],
    }
}

static ZERO_KICK: [Coord; 1] = [c(0, 0)];

/// JLSTZ kick trials, indexed by [`transition_index`]
static JLSTZ_KICKS: [[Coord; 5]; 8] = [
    [c(0, 0), c(-1, 0), c(-1, -1), c(0, 2), c(-1, 2)], // Spawn -> R90
    [c(0, 0), c(1, 0), c(1, 1), c(0, -2), c(1, -2)],   // R90 -> Spawn
    [c(0, 0), c(1, 0), c(1, 1), c(0, -2), c(1, -2)],   // R90 -> R180
    [c(0, 0), c(-1, 0), c(-1, -1), c(0, 2), c(-1, 2)], // R180 -> R90
    [c(0, 0), c(1, 0), c(1, -1), c(0, 2), c(1, 2)],    // R180 -> R270
    [c(0, 0), c(-1, 0), c(-1, 1), c(0, -2), c(-1, -2)], // R270 -> R180
    [c(0, 0), c(-1, 0), c(-1, 1), c(0, -2), c(-1, -2)], // R270 -> Spawn
    [c(0, 0), c(1, 0), c(1, -1), c(0, 2), c(1, 2)],    // Spawn -> R270
];

/// I kick trials, same indexing, wider horizontal reach
static I_KICKS: [[Coord; 5]; 8] = [
    [c(0, 0), c(-2, 0), c(1, 0), c(-2, 1), c(1, -2)], // Spawn -> R90
    [c(0, 0), c(2, 0), c(-1, 0), c(2, -1), c(-1, 2)], // R90 -> Spawn
    [c(0, 0), c(-1, 0), c(2, 0), c(-1, -2), c(2, 1)], // R90 -> R180
    [c(0, 0), c(1, 0), c(-2, 0), c(1, 2), c(-2, -1)], // R180 -> R90
    [c(0, 0), c(2, 0), c(-1, 0), c(2, -1), c(-1, 2)], // R180 -> R270
    [c(0, 0), c(-2, 0), c(1, 0), c(-2, 1), c(1, -2)], // R270 -> R180
    [c(0, 0), c(1, 0), c(-2, 0), c(1, 2), c(-2, -1)], // R270 -> Spawn
    [c(0, 0), c(-1, 0), c(2, 0), c(-1, -2), c(2, 1)], // Spawn -> R270
];

/// Table row for a single-step transition; `None` for anything else
/// (identity, 180-degree jumps).
fn transition_index(from: Rotation, to: Rotation) -> Option<usize> {
    match (from, to) {
        (Rotation::Spawn, Rotation::R90) => Some(0),
        (Rotation::R90, Rotation::Spawn) => Some(1),
        (Rotation::R90, Rotation::R180) => Some(2),
        (Rotation::R180, Rotation::R90) => Some(3),
        (Rotation::R180, Rotation::R270) => Some(4),
        (Rotation::R270, Rotation::R180) => Some(5),
        (Rotation::R270, Rotation::Spawn) => Some(6),
        (Rotation::Spawn, Rotation::R270) => Some(7),
        _ => None,
    }
}

/// Ordered kick offsets to try for a rotation transition.
///
/// Fails closed: a transition pair with no table entry gets the single
/// zero-offset trial rather than an error.
pub fn kick_offsets(kind: PieceKind, from: Rotation, to: Rotation) -> &'static [Coord] {
    let table: &'static [[Coord; 5]; 8] = match kind {
        PieceKind::O => return &ZERO_KICK,
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    };
    match transition_index(from, to) {
        Some(index) => &table[index],
        None => &ZERO_KICK,
    }
}

/// Standard spawn origin: horizontally centered, one row above the board
pub fn spawn_origin(width: u8) -> Coord {
    Coord::new((width / 2) as i8, -1)
}
