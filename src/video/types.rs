use serde::Serialize;
use std::fmt;

/// Canonical 11-character video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub const LEN: usize = 11;

    /// Only called by the extractor once the candidate has been validated.
    pub(super) fn new_unchecked(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(candidate: &str) -> bool {
        candidate.len() == Self::LEN
            && candidate
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What the user typed, plus the id parsed out of it.
///
/// `canonical_id` is derived from `raw_input` on every change and is never set on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoReference {
    raw_input: String,
    canonical_id: Option<VideoId>,
}

impl VideoReference {
    pub fn set_raw_input(&mut self, raw_input: &str) {
        self.raw_input = raw_input.to_string();
        self.canonical_id = super::extract(raw_input).ok();
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn canonical_id(&self) -> Option<&VideoId> {
        self.canonical_id.as_ref()
    }
}
