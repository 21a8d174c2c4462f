//! Ranked suggestion results

use serde::{Deserialize, Serialize};
use super::event::Event;
use super::tag::TagKind;

/// A tag shared by the user and the event, with what it added to the score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedTag {
    pub tag_id: i64,
    pub kind: TagKind,
    pub code: String,
    pub name: String,
    pub contribution: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub event: Event,
    pub score: u32,
    pub matched_tags: Vec<MatchedTag>,
}
