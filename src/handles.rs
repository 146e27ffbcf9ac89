//! Scoped preview handles: in-memory blobs addressed by `blob:` URLs.
//!
//! A [`HandleRegistry`] plays the role of a browser's object-URL table. Each
//! [`PreviewHandle`] it hands out owns one entry and removes it when dropped
//! (or when [`PreviewHandle::revoke`] is called), so an entry is revoked
//! exactly once and never outlives the value that displays it.
//!
//! Handles hold only a weak reference to the registry; dropping the registry
//! first is fine and later handle drops become no-ops.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;

/// URL scheme prefix of every handle.
pub const BLOB_URL_PREFIX: &str = "blob:toolbox/";

/// Immutable binary payload behind a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Arc<[u8]>,
    mime: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Created/revoked counters of a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub created: u64,
    pub revoked: u64,
    pub live: usize,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    revoked: u64,
    live: HashMap<u64, Blob>,
}

/// Table of live handles. Cheap to clone; clones share the table.
#[derive(Clone, Default)]
pub struct HandleRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `blob` and return the handle that owns its entry.
    pub fn create(&self, blob: Blob) -> PreviewHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id, blob.clone());
        drop(inner);

        let url = format!("{BLOB_URL_PREFIX}{id}");
        debug!("Created handle {} ({} bytes, {})", url, blob.len(), blob.mime());
        PreviewHandle {
            id,
            url,
            blob,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Look up a live handle by URL. Revoked URLs resolve to `None`.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        let id = url.strip_prefix(BLOB_URL_PREFIX)?.parse::<u64>().ok()?;
        self.lock().live.get(&id).cloned()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.resolve(url).is_some()
    }

    /// Number of handles that have not been revoked yet.
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.lock();
        RegistryStats {
            created: inner.next_id,
            revoked: inner.revoked,
            live: inner.live.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Owner of one registry entry. Revokes the entry when dropped.
pub struct PreviewHandle {
    id: u64,
    url: String,
    blob: Blob,
    registry: Weak<Mutex<RegistryInner>>,
}

impl PreviewHandle {
    /// The `blob:toolbox/{id}` URL of this handle.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    pub fn bytes(&self) -> &[u8] {
        self.blob.bytes()
    }

    pub fn mime(&self) -> &str {
        self.blob.mime()
    }

    pub fn len(&self) -> usize {
        self.blob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blob.is_empty()
    }

    /// Revoke now instead of at end of scope.
    pub fn revoke(self) {
        drop(self);
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut inner = registry.lock().unwrap_or_else(|e| e.into_inner());
        if inner.live.remove(&self.id).is_some() {
            inner.revoked += 1;
            debug!("Revoked handle {}", self.url);
        }
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("url", &self.url)
            .field("mime", &self.blob.mime())
            .field("len", &self.blob.len())
            .finish()
    }
}
