// src/capture/message.rs
use serde::{Deserialize, Serialize};

use crate::core::Fingerprint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
    Unknown,
}

impl Author {
    pub fn as_str(self) -> &'static str {
        match self {
            Author::User => "user",
            Author::Assistant => "assistant",
            Author::Unknown => "unknown",
        }
    }
}

/// One captured conversation message. Owned by the capture store; never
/// mutated after insertion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedMessage {
    pub fingerprint: Fingerprint,
    pub sanitized_html: String,
    pub normalized_text: String,
    pub author: Author,
    pub attachments: Vec<String>,
    /// Position among the page's turn containers; `None` when the element has none.
    /// Serialized as `-1` in the handoff shape.
    #[serde(with = "turn_sentinel")]
    pub turn_index: Option<usize>,
    pub dom_position: f64,
    pub captured_at_millis: i64,
}

mod turn_sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(i) => s.serialize_i64(*i as i64),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(d)?;
        Ok(if raw < 0 { None } else { Some(raw as usize) })
    }
}

/// Title and participant names, extracted once per session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    pub title: String,
    pub user_name: String,
    pub assistant_name: String,
}

impl ConversationMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.user_name.is_empty() && self.assistant_name.is_empty()
    }

    pub fn speaker(&self, author: Author) -> &str {
        match author {
            Author::User => &self.user_name,
            _ => &self.assistant_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_index_uses_minus_one_on_the_wire() {
        let msg = CapturedMessage {
            fingerprint: Fingerprint::of("hi"),
            sanitized_html: s!("hi"),
            normalized_text: s!("hi"),
            author: Author::User,
            attachments: vec![],
            turn_index: None,
            dom_position: 10.0,
            captured_at_millis: 1,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["turnIndex"], -1);
        let back: CapturedMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back.turn_index, None);
    }
}
