//! Path-addressed file operations over the flat store

use crate::key_locks::KeyLocks;
use crate::node::load_node;
use crate::{DirectoryIndex, FsError, Node, Result, TreePath};
use std::sync::Arc;
use strato_kv::ObjectStore;

/// The public surface: directory-aware create/update/delete/read over
/// a flat object store.
///
/// No state is cached between calls; every operation observes the
/// store as it is at call time. Operations on independent paths may run
/// concurrently; operations touching the same path or the same parent
/// directory are serialized through [`KeyLocks`].
pub struct FileSystem {
    store: Arc<dyn ObjectStore>,
    index: DirectoryIndex,
    locks: Arc<KeyLocks>,
}

impl FileSystem {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        let locks = Arc::new(KeyLocks::new());
        let index = DirectoryIndex::new(store.clone(), locks.clone());
        Self {
            store,
            index,
            locks,
        }
    }

    /// Create a directory node at `path`.
    ///
    /// Root-level paths are allowed; this is how the top of a namespace
    /// is bootstrapped.
    pub async fn create_dir(&self, path: &TreePath) -> Result<()> {
        self.index.create_dir(path).await
    }

    /// Always fails with `Unsupported`; directory nodes are never freed.
    pub async fn delete_dir(&self, path: &TreePath) -> Result<()> {
        self.index.delete_dir(path).await
    }

    /// Create a file at `path` with `data` as its content.
    ///
    /// Missing ancestor directories are created on the way down, so a
    /// single call may issue several writes. An ancestor created here
    /// stays behind if a later step fails; stray directories are
    /// harmless. An occupied target path fails with `AlreadyExists`
    /// and nothing is overwritten.
    pub async fn create_file(&self, path: &TreePath, data: &str) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            FsError::InvalidPath(format!("a file cannot sit at the namespace root: {path}"))
        })?;

        for ancestor in path.ancestors() {
            if self.store.get(&ancestor.storage_key()).await?.is_none() {
                match self.index.create_dir(&ancestor).await {
                    Ok(()) => tracing::info!(path = %ancestor, "created missing ancestor"),
                    // another writer created it between our check and
                    // the write; an existing directory is what we want
                    Err(FsError::AlreadyExists(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        let key = path.storage_key();
        let _guard = self.locks.acquire(&key).await;

        if self.store.get(&key).await?.is_some() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }

        let node = Node::File {
            path: path.clone(),
            data: data.to_string(),
        };
        self.store.put(&key, &node.to_bytes()?).await?;

        // The parent listing is updated second. If that fails, the
        // fresh node must not stay behind as an orphan; the write is
        // rolled back best-effort, and a failed rollback is reported as
        // its own error rather than hidden behind the first one.
        if let Err(index_err) = self.index.add_child(&parent, path.leaf()).await {
            tracing::warn!(path = %path, error = %index_err, "parent index update failed, removing fresh node");
            return match self.store.delete(&key).await {
                Ok(()) => Err(index_err),
                Err(cleanup_err) => Err(FsError::Inconsistent {
                    key,
                    reason: format!(
                        "index update failed ({index_err}); compensating delete failed ({cleanup_err})"
                    ),
                }),
            };
        }

        tracing::info!(path = %path, bytes = data.len(), "created file");
        Ok(())
    }

    /// Replace the content of the existing file at `path`.
    ///
    /// The path and variant are untouched, and the parent listing is
    /// not involved. A missing node or a directory at `path` fails with
    /// `NotFound`.
    pub async fn update_file(&self, path: &TreePath, data: &str) -> Result<()> {
        let key = path.storage_key();
        let _guard = self.locks.acquire(&key).await;

        match load_node(self.store.as_ref(), &key).await? {
            Some(Node::File { path: node_path, .. }) => {
                let node = Node::File {
                    path: node_path,
                    data: data.to_string(),
                };
                self.store.put(&key, &node.to_bytes()?).await?;
                tracing::debug!(path = %path, bytes = data.len(), "updated file");
                Ok(())
            }
            Some(Node::Directory { .. }) | None => Err(FsError::NotFound(path.to_string())),
        }
    }

    /// Delete the file at `path`: its parent's listing entry and the
    /// node itself.
    ///
    /// The listing entry goes first. A crash between the two steps
    /// leaves an unlisted node, never a listing that points at nothing;
    /// the unlisted node keeps blocking creates at that path until it
    /// is reconciled out-of-band.
    pub async fn delete_file(&self, path: &TreePath) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            FsError::InvalidPath(format!("a file cannot sit at the namespace root: {path}"))
        })?;

        let key = path.storage_key();
        let _guard = self.locks.acquire(&key).await;

        match load_node(self.store.as_ref(), &key).await? {
            Some(node) if node.is_file() => {}
            _ => return Err(FsError::NotFound(path.to_string())),
        }

        self.index.remove_child(&parent, path.leaf()).await?;
        self.store.delete(&key).await?;
        tracing::info!(path = %path, "deleted file");
        Ok(())
    }

    /// The node at `path`, or `None` when nothing exists there.
    ///
    /// A directory comes back with its child list as bare names, not
    /// full paths. Corrupt payloads are an error, not `None`.
    pub async fn get_file(&self, path: &TreePath) -> Result<Option<Node>> {
        load_node(self.store.as_ref(), &path.storage_key()).await
    }

    /// File content at `path`.
    ///
    /// Missing paths, directories, and undecodable payloads all come
    /// back as `None`; store failures still surface as errors. Callers
    /// that need to tell those cases apart use [`FileSystem::get_file`].
    pub async fn fetch_file(&self, path: &TreePath) -> Result<Option<String>> {
        match self.get_file(path).await {
            Ok(Some(Node::File { data, .. })) => Ok(Some(data)),
            Ok(Some(Node::Directory { .. })) | Ok(None) => Ok(None),
            Err(FsError::Corrupt { key, reason }) => {
                tracing::warn!(%key, %reason, "undecodable node treated as absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use strato_kv::{MemoryStore, StoreError};
    use tokio::sync::Barrier;

    fn fs() -> FileSystem {
        FileSystem::new(Arc::new(MemoryStore::new()))
    }

    fn path(segments: &[&str]) -> TreePath {
        TreePath::new(segments.iter().copied()).unwrap()
    }

    async fn children_of(fs: &FileSystem, dir: &TreePath) -> Vec<String> {
        match fs.get_file(dir).await.unwrap().unwrap() {
            Node::Directory { children, .. } => children,
            Node::File { .. } => panic!("expected a directory"),
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let fs = fs();
        let file = path(&["home", "alice", "notes.txt"]);

        fs.create_file(&file, "contents").await.unwrap();

        match fs.get_file(&file).await.unwrap().unwrap() {
            Node::File { data, .. } => assert_eq!(data, "contents"),
            Node::Directory { .. } => panic!("expected a file"),
        }
        assert_eq!(
            fs.fetch_file(&file).await.unwrap().unwrap(),
            "contents"
        );
    }

    #[tokio::test]
    async fn test_missing_ancestors_are_created() {
        let fs = fs();
        fs.create_file(&path(&["a", "b", "c"]), "x").await.unwrap();

        assert_eq!(children_of(&fs, &path(&["a"])).await, vec!["b"]);
        assert_eq!(children_of(&fs, &path(&["a", "b"])).await, vec!["c"]);
    }

    #[tokio::test]
    async fn test_create_rejects_root_level_file() {
        let fs = fs();
        assert!(matches!(
            fs.create_file(&path(&["home"]), "x").await,
            Err(FsError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_double_create_rejected_and_first_content_kept() {
        let fs = fs();
        let file = path(&["home", "alice", "notes.txt"]);

        fs.create_file(&file, "first").await.unwrap();
        assert!(matches!(
            fs.create_file(&file, "second").await,
            Err(FsError::AlreadyExists(_))
        ));

        assert_eq!(fs.fetch_file(&file).await.unwrap().unwrap(), "first");
        // the parent lists the name exactly once
        assert_eq!(
            children_of(&fs, &path(&["home", "alice"])).await,
            vec!["notes.txt"]
        );
    }

    #[tokio::test]
    async fn test_create_over_directory_rejected() {
        let fs = fs();
        let dir = path(&["home", "alice"]);
        fs.create_dir(&path(&["home"])).await.unwrap();
        fs.create_dir(&dir).await.unwrap();

        assert!(matches!(
            fs.create_file(&dir, "x").await,
            Err(FsError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_create_under_file_parent_fails_and_rolls_back() {
        let store = Arc::new(MemoryStore::new());
        let fs = FileSystem::new(store.clone());
        let blocker = path(&["a", "b"]);
        fs.create_file(&blocker, "plain file").await.unwrap();

        // ["a","b"] already holds a file, so it cannot serve as a parent
        let target = path(&["a", "b", "c"]);
        assert!(matches!(
            fs.create_file(&target, "x").await,
            Err(FsError::ParentMissing(_))
        ));

        // the half-created node was compensated away
        assert!(store.get(&target.storage_key()).await.unwrap().is_none());
        // the file standing in the way is untouched
        assert_eq!(
            fs.fetch_file(&blocker).await.unwrap().unwrap(),
            "plain file"
        );
    }

    #[tokio::test]
    async fn test_update_replaces_content_only() {
        let fs = fs();
        let file = path(&["home", "alice", "notes.txt"]);
        let parent = path(&["home", "alice"]);

        fs.create_file(&file, "v1").await.unwrap();
        let listing_before = children_of(&fs, &parent).await;

        fs.update_file(&file, "v2").await.unwrap();
        fs.update_file(&file, "v3").await.unwrap();

        assert_eq!(fs.fetch_file(&file).await.unwrap().unwrap(), "v3");
        assert_eq!(children_of(&fs, &parent).await, listing_before);
    }

    #[tokio::test]
    async fn test_update_missing_or_directory_is_not_found() {
        let fs = fs();
        assert!(matches!(
            fs.update_file(&path(&["no", "such"]), "x").await,
            Err(FsError::NotFound(_))
        ));

        fs.create_dir(&path(&["home"])).await.unwrap();
        fs.create_dir(&path(&["home", "dir"])).await.unwrap();
        assert!(matches!(
            fs.update_file(&path(&["home", "dir"]), "x").await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_node_and_listing() {
        let fs = fs();
        let file = path(&["home", "alice", "notes.txt"]);
        fs.create_file(&file, "x").await.unwrap();

        fs.delete_file(&file).await.unwrap();

        assert!(fs.get_file(&file).await.unwrap().is_none());
        assert!(children_of(&fs, &path(&["home", "alice"]))
            .await
            .is_empty());
        // the path is free again
        fs.create_file(&file, "y").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_or_directory_is_not_found() {
        let fs = fs();
        assert!(matches!(
            fs.delete_file(&path(&["no", "such"])).await,
            Err(FsError::NotFound(_))
        ));

        fs.create_dir(&path(&["home"])).await.unwrap();
        fs.create_dir(&path(&["home", "dir"])).await.unwrap();
        assert!(matches!(
            fs.delete_file(&path(&["home", "dir"])).await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_on_empty_store_is_none() {
        let fs = fs();
        assert!(fs.get_file(&path(&["nope"])).await.unwrap().is_none());
        assert!(fs.fetch_file(&path(&["nope"])).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_dir_unsupported_and_store_unchanged() {
        let fs = fs();
        let dir = path(&["home"]);
        fs.create_dir(&dir).await.unwrap();

        assert!(matches!(
            fs.delete_dir(&dir).await,
            Err(FsError::Unsupported(_))
        ));
        assert!(fs.get_file(&dir).await.unwrap().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_fetch_file_masks_wrong_variant_and_corruption() {
        let store = Arc::new(MemoryStore::new());
        let fs = FileSystem::new(store.clone());

        fs.create_dir(&path(&["home"])).await.unwrap();
        assert!(fs.fetch_file(&path(&["home"])).await.unwrap().is_none());

        // plant an undecodable payload directly in the store
        let bad = path(&["home", "bad"]);
        store.put(&bad.storage_key(), b"not a node").await.unwrap();
        assert!(fs.fetch_file(&bad).await.unwrap().is_none());
        // get_file does not mask it
        assert!(matches!(
            fs.get_file(&bad).await,
            Err(FsError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_create_race_yields_one_winner() {
        let fs = Arc::new(fs());
        let file = path(&["home", "alice", "race.txt"]);
        let barrier = Arc::new(Barrier::new(2));

        let spawn = |content: &'static str| {
            let fs = fs.clone();
            let file = file.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                fs.create_file(&file, content).await
            })
        };

        let (a, b) = futures::join!(spawn("from-a"), spawn("from-b"));
        let results = [a.unwrap(), b.unwrap()];

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let exists = results
            .iter()
            .filter(|r| matches!(r, Err(FsError::AlreadyExists(_))))
            .count();
        assert_eq!((ok, exists), (1, 1));

        // exactly one listing entry for the contested name
        let listing = children_of(&fs, &path(&["home", "alice"])).await;
        assert_eq!(listing, vec!["race.txt"]);
    }

    /// Store that fails selected operations, for exercising the
    /// compensation paths.
    struct FlakyStore {
        inner: MemoryStore,
        fail_put: HashSet<String>,
        fail_delete: HashSet<String>,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_put: HashSet::new(),
                fail_delete: HashSet::new(),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
        async fn put(&self, key: &str, value: &[u8]) -> strato_kv::Result<()> {
            if self.fail_put.contains(key) {
                return Err(StoreError::Transient("injected put failure".to_string()));
            }
            self.inner.put(key, value).await
        }

        async fn get(&self, key: &str) -> strato_kv::Result<Option<Vec<u8>>> {
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> strato_kv::Result<()> {
            if self.fail_delete.contains(key) {
                return Err(StoreError::Transient("injected delete failure".to_string()));
            }
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_failed_index_update_rolls_back_the_file() {
        let file = path(&["home", "alice", "notes.txt"]);
        let parent = path(&["home", "alice"]);

        // pre-build the tree, then make the parent's key unwritable
        let mut flaky = FlakyStore::new();
        flaky.fail_put.insert(parent.storage_key());
        let seeded = FileSystem::new(Arc::new(MemoryStore::new()));
        seeded.create_dir(&path(&["home"])).await.unwrap();
        seeded.create_dir(&parent).await.unwrap();
        for p in [path(&["home"]), parent.clone()] {
            let key = p.storage_key();
            let bytes = seeded.store.get(&key).await.unwrap().unwrap();
            flaky.inner.put(&key, &bytes).await.unwrap();
        }

        let fs = FileSystem::new(Arc::new(flaky));
        let err = fs.create_file(&file, "x").await.unwrap_err();
        assert!(matches!(err, FsError::Store(_)));

        // the compensating delete removed the half-created node
        assert!(fs.get_file(&file).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_compensation_reports_inconsistency() {
        let file = path(&["home", "alice", "notes.txt"]);
        let parent = path(&["home", "alice"]);

        let seeded = FileSystem::new(Arc::new(MemoryStore::new()));
        seeded.create_dir(&path(&["home"])).await.unwrap();
        seeded.create_dir(&parent).await.unwrap();

        let mut flaky = FlakyStore::new();
        flaky.fail_put.insert(parent.storage_key());
        flaky.fail_delete.insert(file.storage_key());
        for p in [path(&["home"]), parent.clone()] {
            let key = p.storage_key();
            let bytes = seeded.store.get(&key).await.unwrap().unwrap();
            flaky.inner.put(&key, &bytes).await.unwrap();
        }

        let fs = FileSystem::new(Arc::new(flaky));
        let err = fs.create_file(&file, "x").await.unwrap_err();
        assert!(matches!(err, FsError::Inconsistent { .. }));
    }
}
