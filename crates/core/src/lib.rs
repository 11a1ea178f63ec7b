//! Core types for the Nira assistant backend
//!
//! This crate provides foundational types used across all other crates:
//! - Chat request/reply types
//! - Error types

pub mod conversation;
pub mod error;

pub use conversation::{
    epoch_millis, HistoryEntry, InboundMessage, ReplyResult, Sender, UserContext, HISTORY_WINDOW,
};
pub use error::{Error, Result};
