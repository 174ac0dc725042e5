// src/core/fingerprint.rs
// Deterministic 53-bit content hash (cyrb53 over UTF-16 code units), rendered in base36.
// Dedup key only; not a security boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier produced for the empty string. Never a content message.
pub const EMPTY_FINGERPRINT: &str = "empty";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        Self::with_seed(text, 0)
    }

    pub fn with_seed(text: &str, seed: u32) -> Self {
        if text.is_empty() {
            return Fingerprint(s!(EMPTY_FINGERPRINT));
        }
        Fingerprint(to_base36(cyrb53(text, seed)))
    }

    pub fn is_empty_marker(&self) -> bool {
        self.0 == EMPTY_FINGERPRINT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The combined value is `(h2 & 0x1F_FFFF) << 32 | h1`, always non-negative.
fn cyrb53(text: &str, seed: u32) -> u64 {
    let mut h1: u32 = 0xdead_beef ^ seed;
    let mut h2: u32 = 0x41c6_ce57 ^ seed;
    for unit in text.encode_utf16() {
        let ch = unit as u32;
        h1 = (h1 ^ ch).wrapping_mul(2_654_435_761);
        h2 = (h2 ^ ch).wrapping_mul(1_597_334_677);
    }
    h1 = (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507)
        ^ (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909);
    h2 = (h2 ^ (h2 >> 16)).wrapping_mul(2_246_822_507)
        ^ (h1 ^ (h1 >> 13)).wrapping_mul(3_266_489_909);

    (((h2 & 0x1f_ffff) as u64) << 32) | h1 as u64
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return s!("0");
    }
    let mut buf = Vec::with_capacity(11);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}
