//! Persisted node records and their wire codec

use crate::{FsError, Result, TreePath};
use serde::{Deserialize, Serialize};
use strato_kv::ObjectStore;

/// Wire envelope, exactly as persisted.
///
/// Both variants share the shape `{"type", "path", "data"}`. A file's
/// `data` holds its content; a directory's `data` holds its child names
/// as a nested JSON array *string* (`"[\"name\", ...]"`), which is what
/// existing producers of this format wrote and what must round-trip.
#[derive(Debug, Serialize, Deserialize)]
struct WireNode {
    #[serde(rename = "type")]
    kind: String,
    path: Vec<String>,
    data: String,
}

const KIND_FILE: &str = "file";
const KIND_DIR: &str = "dir";

/// The value stored at a path's key: a file with content, or a
/// directory listing the names of its immediate children.
///
/// A path's variant is fixed at creation; it never flips between file
/// and directory without a deletion in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File { path: TreePath, data: String },
    Directory { path: TreePath, children: Vec<String> },
}

impl Node {
    pub fn empty_dir(path: TreePath) -> Self {
        Node::Directory {
            path,
            children: Vec::new(),
        }
    }

    pub fn path(&self) -> &TreePath {
        match self {
            Node::File { path, .. } => path,
            Node::Directory { path, .. } => path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File { .. })
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory { .. })
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let key = self.path().storage_key();
        let wire = match self {
            Node::File { path, data } => WireNode {
                kind: KIND_FILE.to_string(),
                path: path.segments().to_vec(),
                data: data.clone(),
            },
            Node::Directory { path, children } => WireNode {
                kind: KIND_DIR.to_string(),
                path: path.segments().to_vec(),
                data: serde_json::to_string(children).map_err(|e| FsError::Corrupt {
                    key: key.clone(),
                    reason: e.to_string(),
                })?,
            },
        };
        serde_json::to_vec(&wire).map_err(|e| FsError::Corrupt {
            key,
            reason: e.to_string(),
        })
    }

    /// Decode a stored payload. Any malformed shape is `Corrupt`:
    /// unknown `type` tags, missing fields, or a directory `data` that
    /// is not a JSON string array. Nothing is coerced.
    pub fn from_bytes(key: &str, bytes: &[u8]) -> Result<Self> {
        let corrupt = |reason: String| FsError::Corrupt {
            key: key.to_string(),
            reason,
        };

        let wire: WireNode =
            serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
        let path = TreePath::new(wire.path).map_err(|e| corrupt(e.to_string()))?;

        match wire.kind.as_str() {
            KIND_FILE => Ok(Node::File {
                path,
                data: wire.data,
            }),
            KIND_DIR => {
                let children: Vec<String> = serde_json::from_str(&wire.data)
                    .map_err(|e| corrupt(format!("directory child list: {e}")))?;
                Ok(Node::Directory { path, children })
            }
            other => Err(corrupt(format!("unknown node type {other:?}"))),
        }
    }
}

/// Read and decode the node at `key`, if any.
pub(crate) async fn load_node(store: &dyn ObjectStore, key: &str) -> Result<Option<Node>> {
    match store.get(key).await? {
        Some(bytes) => Ok(Some(Node::from_bytes(key, &bytes)?)),
        None => Ok(None),
    }
}
