//! Local cache for the doctor onboarding form template.
//!
//! The backend publishes the template together with a version tag. The cached copy is only
//! served while its tag matches the one the caller expects; a mismatch drops the cache.

use crate::constants::ONBOARDING_TEMPLATE_FILENAME;
use crate::storage::StateFile;
use crate::CoreResult;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CachedTemplate {
    pub version: String,
    pub template: Value,
    pub cached_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct TemplateCache {
    file: StateFile,
}

impl TemplateCache {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            file: StateFile::new(state_dir, ONBOARDING_TEMPLATE_FILENAME),
        }
    }

    /// The cached entry, whatever its version.
    pub fn cached(&self) -> CoreResult<Option<CachedTemplate>> {
        self.file.read()
    }

    /// The cached template if its version tag equals `version`.
    ///
    /// A cached entry with a different tag is removed.
    pub fn get(&self, version: &str) -> CoreResult<Option<Value>> {
        match self.cached()? {
            Some(entry) if entry.version == version => Ok(Some(entry.template)),
            Some(entry) => {
                tracing::info!(
                    cached = %entry.version,
                    wanted = %version,
                    "onboarding template cache invalidated"
                );
                self.file.remove()?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn put(&self, version: &str, template: Value) -> CoreResult<()> {
        self.file.write(&CachedTemplate {
            version: version.to_string(),
            template,
            cached_at: Utc::now(),
        })
    }

    pub fn clear(&self) -> CoreResult<()> {
        self.file.remove()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matching_version_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TemplateCache::new(dir.path());
        cache.put("v3", json!({ "steps": ["personal"] })).unwrap();

        assert_eq!(
            cache.get("v3").unwrap(),
            Some(json!({ "steps": ["personal"] }))
        );
    }

    #[test]
    fn version_mismatch_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TemplateCache::new(dir.path());
        cache.put("v3", json!({})).unwrap();

        assert_eq!(cache.get("v4").unwrap(), None);
        assert_eq!(cache.cached().unwrap(), None);
    }
}
