//! Deterministic Tetris rules engine with an async runtime controller
//!
//! [`crate::core`] holds the UI-independent rules: board, SRS-style pieces,
//! 7-bag randomizer, scoring, and the [`Engine`] session state machine.
//! [`controller`] drives an engine on tokio timers (gravity, lock delay,
//! line-clear pause) and publishes snapshot and event streams.

pub mod controller;
pub mod core;
pub mod types;

pub use controller::{GameController, GameEvent};
pub use core::{Engine, EngineConfig, GameSnapshot};
pub use types::{GameAction, PieceKind, Rotation};
