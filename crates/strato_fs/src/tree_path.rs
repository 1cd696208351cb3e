//! Validated hierarchical paths and their canonical store keys

use crate::{FsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered, non-empty sequence of non-empty UTF-8 segments.
///
/// The canonical store key for a path is the JSON-array serialization
/// of its segments, so `["home", "alice"]` addresses the literal key
/// `["home","alice"]`. The same path always produces the same key, and
/// two distinct paths can never collide because JSON string escaping is
/// injective. The key is never parsed back; nodes carry their path in
/// the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    /// Build a path from segments, rejecting empty sequences and empty
    /// segments.
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(FsError::InvalidPath("empty path".to_string()));
        }
        if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
            return Err(FsError::InvalidPath(format!(
                "empty segment at position {pos}"
            )));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; the constructor rejects empty paths.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A root-level path has a single segment.
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Final segment, the node's own name.
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Parent path; `None` for root-level paths.
    pub fn parent(&self) -> Option<TreePath> {
        if self.segments.len() <= 1 {
            None
        } else {
            Some(TreePath {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Strict ancestor paths, shortest first. Empty for root-level paths.
    pub fn ancestors(&self) -> impl Iterator<Item = TreePath> + '_ {
        (1..self.segments.len()).map(move |n| TreePath {
            segments: self.segments[..n].to_vec(),
        })
    }

    /// Canonical key in the flat store: the JSON array of the segments.
    pub fn storage_key(&self) -> String {
        serde_json::to_string(&self.segments).unwrap_or_default()
    }
}

impl TryFrom<Vec<String>> for TreePath {
    type Error = FsError;

    fn try_from(segments: Vec<String>) -> Result<Self> {
        TreePath::new(segments)
    }
}

impl TryFrom<&[&str]> for TreePath {
    type Error = FsError;

    fn try_from(segments: &[&str]) -> Result<Self> {
        TreePath::new(segments.iter().copied())
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}
