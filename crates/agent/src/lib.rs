//! Lead-qualifying chat responder
//!
//! Features:
//! - Regex lead classification
//! - Keyword-bucketed canned replies with a seedable RNG
//! - `ResponseResolver` that tries the generative backend once and never fails the caller

pub mod fallback;
pub mod lead;
pub mod resolver;

pub use fallback::{FallbackBank, GENERIC_REPLIES};
pub use lead::LeadClassifier;
pub use resolver::{FallbackReason, ReplySource, Resolution, ResponseResolver};
