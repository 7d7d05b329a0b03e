//! Build-time resource manifest and related configuration types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{WorkerError, WorkerResult};

/// Logical key for the document root.
///
/// The bare origin, an empty path, and single-page-app fragment routes
/// (`origin/#...`) all normalize to this key. Not generalized beyond the
/// root: multi-path client routers are out of scope.
pub const ROOT_ALIAS: &str = "/";

/// Fixed metadata-partition key under which the manifest snapshot persists.
pub const SNAPSHOT_KEY: &str = "manifest";

/// Mapping from logical resource path to content fingerprint.
///
/// Produced by the build pipeline, embedded as static configuration, and
/// never mutated at runtime. The fingerprint format is opaque to the worker;
/// only equality matters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    resources: BTreeMap<String, String>,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, fingerprint: impl Into<String>) {
        self.resources.insert(path.into(), fingerprint.into());
    }

    /// Mirror `document_key`'s fingerprint under [`ROOT_ALIAS`].
    ///
    /// Build pipelines emit the root alias alongside the document entry
    /// (e.g. `"/"` next to `"index.html"`); this helper enforces that the
    /// two fingerprints agree.
    pub fn with_root_alias(mut self, document_key: &str) -> WorkerResult<Self> {
        let fingerprint = self
            .resources
            .get(document_key)
            .cloned()
            .ok_or_else(|| WorkerError::MissingDocumentEntry {
                key: document_key.to_string(),
            })?;
        self.resources.insert(ROOT_ALIAS.to_string(), fingerprint);
        Ok(self)
    }

    #[must_use]
    pub fn fingerprint(&self, key: &str) -> Option<&str> {
        self.resources.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Serialize for the metadata-partition snapshot.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Parse a previously persisted snapshot.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            resources: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Ordered subset of manifest paths fetched fresh at install.
#[derive(Clone, Debug, Default)]
pub struct ShellSet(Vec<String>);

impl ShellSet {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every shell path must resolve in the manifest.
    pub fn validate(&self, manifest: &Manifest) -> WorkerResult<()> {
        for path in &self.0 {
            if !manifest.contains(path) {
                return Err(WorkerError::ShellNotInManifest { path: path.clone() });
            }
        }
        Ok(())
    }
}

/// Names of the three cache partitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionNames {
    /// Partition requests are served from.
    pub live: String,
    /// Partition the installer stages the shell into.
    pub staging: String,
    /// Partition holding the single manifest snapshot entry.
    pub metadata: String,
}

impl Default for PartitionNames {
    fn default() -> Self {
        Self {
            live: "app-cache".to_string(),
            staging: "app-staging".to_string(),
            metadata: "app-manifest".to_string(),
        }
    }
}
