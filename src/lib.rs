//! # Duel Replay
//!
//! A deterministic, reversible replay engine for observing a trading-card
//! duel.
//!
//! ## Overview
//!
//! The engine consumes an append-only log of simulator messages and keeps
//! an explorable view of the match: every card attribute and every
//! player-global fact (life points, turn, phase, zone disablement) stores
//! its full history, so an observer can step forward to the latest
//! processed state, step backward to any earlier one, and, when caught up
//! to the live tail, accept newly appended messages.
//!
//! The engine is an *observer*: it never decides legality, it replays what
//! the authoritative simulator asserted happened. Wire transport, log
//! persistence, and rendering live outside this crate; messages arrive
//! already decoded as [`message::AnyMessage`] values.
//!
//! ## Architecture
//!
//! [`board::DuelBoard`] owns all state and the message cursor. Each
//! attribute lives in a [`timeline::Timeline`], an append-and-rewind
//! history, which makes every step O(1) per affected attribute in either
//! direction. The interpreter gives each critical message kind a forward
//! and a backward branch that are exact inverses.

pub mod board;
pub mod errors;
pub mod message;
pub mod place;
pub mod timeline;

pub use board::{AsCard, BoardSnapshot, Card, CardView, DuelBoard};
pub use errors::BoardError;
pub use message::{AnyMessage, Information};
pub use place::Place;
