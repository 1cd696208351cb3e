//! Child-list maintenance on directory nodes

use crate::key_locks::KeyLocks;
use crate::node::load_node;
use crate::{FsError, Node, Result, TreePath};
use std::sync::Arc;
use strato_kv::ObjectStore;

/// Maintains directory nodes and their child-name lists.
///
/// Each mutation is a read-modify-write of one directory key, executed
/// under that key's lock so concurrent writers to the same directory
/// cannot lose updates.
pub struct DirectoryIndex {
    store: Arc<dyn ObjectStore>,
    locks: Arc<KeyLocks>,
}

impl DirectoryIndex {
    pub fn new(store: Arc<dyn ObjectStore>, locks: Arc<KeyLocks>) -> Self {
        Self { store, locks }
    }

    /// Write a new empty directory node at `path`.
    ///
    /// Fails with `AlreadyExists` when any node, file or directory,
    /// occupies the path.
    pub async fn create_dir(&self, path: &TreePath) -> Result<()> {
        let key = path.storage_key();
        let _guard = self.locks.acquire(&key).await;

        if self.store.get(&key).await?.is_some() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }

        let node = Node::empty_dir(path.clone());
        self.store.put(&key, &node.to_bytes()?).await?;
        tracing::debug!(path = %path, "created directory");
        Ok(())
    }

    /// Record `name` as a child of the directory at `dir_path`.
    ///
    /// Adding a name that is already listed is a no-op. The directory
    /// node must exist; its absence means the index is inconsistent and
    /// surfaces as `ParentMissing`.
    pub async fn add_child(&self, dir_path: &TreePath, name: &str) -> Result<()> {
        self.mutate_children(dir_path, |children| {
            if children.iter().any(|c| c == name) {
                false
            } else {
                children.push(name.to_string());
                true
            }
        })
        .await
    }

    /// Drop `name` from the child list of the directory at `dir_path`.
    ///
    /// Removing a name that is not listed is a no-op.
    pub async fn remove_child(&self, dir_path: &TreePath, name: &str) -> Result<()> {
        self.mutate_children(dir_path, |children| {
            let before = children.len();
            children.retain(|c| c != name);
            children.len() != before
        })
        .await
    }

    /// Directory deletion is not supported: a directory node is never
    /// freed once created. The store is left untouched.
    pub async fn delete_dir(&self, path: &TreePath) -> Result<()> {
        tracing::warn!(path = %path, "directory deletion requested but unsupported");
        Err(FsError::Unsupported("directory deletion"))
    }

    /// Read-modify-write of one directory's child list under its key
    /// lock. `mutate` reports whether anything changed; an unchanged
    /// list skips the write-back.
    async fn mutate_children<F>(&self, dir_path: &TreePath, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<String>) -> bool,
    {
        let key = dir_path.storage_key();
        let _guard = self.locks.acquire(&key).await;

        let node = load_node(self.store.as_ref(), &key)
            .await?
            .ok_or_else(|| FsError::ParentMissing(dir_path.to_string()))?;

        match node {
            Node::Directory { path, mut children } => {
                if mutate(&mut children) {
                    let node = Node::Directory { path, children };
                    self.store.put(&key, &node.to_bytes()?).await?;
                    tracing::debug!(path = %dir_path, "updated child list");
                }
                Ok(())
            }
            // a file where the index expects a directory is the same
            // inconsistency as a missing node
            Node::File { .. } => Err(FsError::ParentMissing(dir_path.to_string())),
        }
    }
}
