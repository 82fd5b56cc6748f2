//! Immutable snapshot of a game session
//!
//! Everything here is an owned copy: handing a snapshot to an observer can
//! never alias or mutate engine-owned state.

use serde::{Deserialize, Serialize};

use crate::core::engine::ActivePiece;
use crate::core::Board;
use crate::types::PieceKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub active: Option<ActivePiece>,
    /// Row the active piece would land on (rendering aid)
    pub ghost_row: Option<i8>,
    /// Upcoming pieces, soonest first
    pub queue: Vec<PieceKind>,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over && self.active.is_some()
    }
}
