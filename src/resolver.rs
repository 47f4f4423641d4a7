//! Folder-to-document hierarchy resolution.
//!
//! Each source directory becomes an empty "folder" document in the target
//! collection. [`FolderResolver::resolve`] maps a relative directory path to
//! the id of its deepest folder-document, creating any missing ancestors
//! root-to-leaf and memoizing every id in a [`FolderCache`].
//!
//! The cache is keyed by normalized [`FolderPath`], so every file under
//! `a/b` shares one `a` and one `a/b` document no matter how many siblings
//! reference them. Failures are not cached: a path whose creation failed is
//! attempted again the next time it is resolved.

use std::collections::HashMap;
use tracing::debug;

use crate::client::DocumentService;
use crate::error::{FolderCreationError, RemoteError};
use crate::models::{FolderPath, RemoteDocumentId};

/// Append-only map from folder path to the document created for it.
///
/// Scoped to a single import run. A path is inserted at most once and its id
/// never changes afterwards.
#[derive(Debug, Default, Clone)]
pub struct FolderCache {
    ids: HashMap<FolderPath, RemoteDocumentId>,
}

impl FolderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &FolderPath) -> Option<&RemoteDocumentId> {
        self.ids.get(path)
    }

    /// Record `id` for `path`. An existing entry wins; the returned id is
    /// whatever the cache holds afterwards.
    pub fn insert(&mut self, path: FolderPath, id: RemoteDocumentId) -> &RemoteDocumentId {
        self.ids.entry(path).or_insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Resolves relative directories to remote folder-document ids.
pub struct FolderResolver<'a> {
    service: &'a dyn DocumentService,
    cache: FolderCache,
}

impl<'a> FolderResolver<'a> {
    pub fn new(service: &'a dyn DocumentService) -> Self {
        Self::with_cache(service, FolderCache::new())
    }

    /// Start from a pre-populated cache.
    pub fn with_cache(service: &'a dyn DocumentService, cache: FolderCache) -> Self {
        Self { service, cache }
    }

    pub fn cache(&self) -> &FolderCache {
        &self.cache
    }

    pub fn into_cache(self) -> FolderCache {
        self.cache
    }

    /// Return the folder-document id for `relative_dir`, creating missing
    /// segments as needed.
    ///
    /// `Ok(None)` means the path names the import root itself (empty or `.`)
    /// and no remote call was made. On failure, ancestors created before the
    /// failing segment stay cached; the failing path does not.
    pub fn resolve(
        &mut self,
        relative_dir: &str,
        collection_id: &str,
    ) -> Result<Option<RemoteDocumentId>, FolderCreationError> {
        let Some(folder) = FolderPath::parse(relative_dir) else {
            return Ok(None);
        };

        if let Some(id) = self.cache.get(&folder) {
            return Ok(Some(id.clone()));
        }

        let mut parent: Option<RemoteDocumentId> = None;
        for (segment, cumulative) in folder.prefixes() {
            if let Some(id) = self.cache.get(&cumulative) {
                parent = Some(id.clone());
                continue;
            }

            let created = self
                .service
                .create_folder_document(segment, collection_id, parent.as_ref())
                .and_then(|id| {
                    // An empty id would be sent on as `parentDocumentId: ""`.
                    if id.as_str().is_empty() {
                        Err(RemoteError::NotOk {
                            endpoint: "documents.create".to_string(),
                            body: format!("empty document id for folder '{}'", cumulative),
                        })
                    } else {
                        Ok(id)
                    }
                })
                .map_err(|source| {
                    debug!(folder = %cumulative, error = %source, "folder creation failed");
                    FolderCreationError {
                        path: cumulative.to_string(),
                        source,
                    }
                })?;
            debug!(folder = %cumulative, id = %created, "folder created");

            parent = Some(self.cache.insert(cumulative, created).clone());
        }

        Ok(parent)
    }
}
