//! Snapshot document for the in-memory backend.
//!
//! One JSON object with a top-level section per entity kind, each mapping
//! id → full record. Timestamps serialize as RFC 3339 and load back to the
//! identical instant. The live [`Tables`] struct *is* the document — what
//! the store holds in memory is exactly what lands on disk.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Caseworker, Organization, Session, Transaction, User, WorkType};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub organizations: HashMap<String, Organization>,
    #[serde(default)]
    pub caseworkers: HashMap<String, Caseworker>,
    #[serde(default)]
    pub users: HashMap<String, User>,
    #[serde(default, rename = "workTypes")]
    pub work_types: HashMap<String, WorkType>,
    #[serde(default)]
    pub sessions: HashMap<String, Session>,
    #[serde(default)]
    pub transactions: HashMap<String, Transaction>,
}

impl Tables {
    pub fn serialize(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Load the most recent snapshot. A missing file is a cold start; an
/// unreadable or unparsable one is logged prominently and the store starts
/// empty rather than refusing to boot.
pub(crate) fn load(path: &Path) -> Tables {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no snapshot file, starting empty");
            return Tables::default();
        }
        Err(err) => {
            tracing::error!(
                path = %path.display(),
                error = %err,
                "snapshot file unreadable; starting with an empty store"
            );
            return Tables::default();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(tables) => tables,
        Err(err) => {
            tracing::error!(
                path = %path.display(),
                error = %err,
                "snapshot file corrupt; starting with an empty store"
            );
            Tables::default()
        }
    }
}

/// Write the serialized snapshot to disk: temp file in the target
/// directory, then rename, so a crash mid-write never leaves a truncated
/// document where the loader will find it.
pub(crate) async fn persist(path: &Path, bytes: Vec<u8>) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn org(id: &str) -> Organization {
        Organization {
            id: id.to_string(),
            name: "Shelter Network".into(),
            tier: crate::types::OrgTier::Basic,
            features: HashMap::from([("quickDonate".to_string(), true)]),
            subdomain: Some("shelter".into()),
            branding: HashMap::new(),
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[test]
    fn document_round_trips_timestamps_exactly() {
        let mut tables = Tables::default();
        tables.organizations.insert("o1".into(), org("o1"));

        let bytes = tables.serialize().unwrap();
        let loaded: Tables = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(loaded.organizations["o1"], tables.organizations["o1"]);
        assert_eq!(
            loaded.organizations["o1"].created_at,
            tables.organizations["o1"].created_at
        );
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tables = load(&dir.path().join("absent.json"));
        assert!(tables.organizations.is_empty());
        assert!(tables.transactions.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, b"{not json").unwrap();
        let tables = load(&path);
        assert!(tables.sessions.is_empty());
    }

    #[tokio::test]
    async fn persist_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let mut tables = Tables::default();
        tables.organizations.insert("o1".into(), org("o1"));
        persist(&path, tables.serialize().unwrap()).await.unwrap();

        let loaded = load(&path);
        assert_eq!(loaded.organizations.len(), 1);
        assert!(!path.with_extension("tmp").exists());
    }
}
