// src/core/mod.rs

pub mod fingerprint;
pub mod html;
pub mod sanitize;

pub use fingerprint::Fingerprint;
