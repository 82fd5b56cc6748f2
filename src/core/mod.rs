//! Core rules engine - pure, deterministic, and testable
//!
//! No UI, networking, or I/O in here: the same seed always produces the
//! same game. The runtime controller in [`crate::controller`] drives this
//! module against wall-clock time.

pub mod board;
pub mod engine;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use board::Board;
pub use engine::{ActivePiece, Engine, EngineConfig};
pub use pieces::{kick_offsets, shape, spawn_origin};
pub use rng::{RandomBag, SimpleRng};
pub use scoring::{drop_interval_ms, ScoreState};
pub use snapshot::GameSnapshot;
