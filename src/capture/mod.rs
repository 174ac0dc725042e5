// src/capture/mod.rs
//! Capture pipeline: resolve → normalize → fingerprint → classify → store,
//! and export-time ordering over the stored records.
pub mod classify;
pub mod message;
pub mod normalize;
pub mod order;
pub mod resolve;
pub mod store;

pub use message::{Author, CapturedMessage, ConversationMetadata};
pub use order::order_messages;
pub use store::{CaptureReport, CaptureStore, Clock, StepClock, SystemClock};
