//! Researcher profiles and the flat-file store that holds them.
//!
//! The whole file is read on every call and rewritten in full on every
//! update. There is no locking: two concurrent updates race, and the later
//! write silently drops whatever the earlier one added.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    pub orcid: Option<String>,
    pub google_scholar: Option<String>,
    pub linked_in: Option<String>,
    pub github: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub doi: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date_published: Option<String>,
}

/// Body of a profile update; the id comes from the request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub title: String,
    pub affiliation: String,
    #[serde(default)]
    pub h_index: Option<u32>,
    pub research_interests: Vec<String>,
    pub awards: Vec<String>,
    pub publications: Vec<Publication>,
    pub social_links: SocialLinks,
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
    pub title: String,
    pub affiliation: String,
    pub h_index: Option<u32>,
    pub research_interests: Vec<String>,
    pub awards: Vec<String>,
    pub publications: Vec<Publication>,
    pub social_links: SocialLinks,
    pub is_public: bool,
}

impl ProfileRecord {
    pub fn from_update(id: impl Into<String>, update: ProfileUpdate) -> Self {
        Self {
            id: id.into(),
            name: update.name,
            title: update.title,
            affiliation: update.affiliation,
            h_index: update.h_index,
            research_interests: update.research_interests,
            awards: update.awards,
            publications: update.publications,
            social_links: update.social_links,
            is_public: update.is_public,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("profile {0} not found")]
    NotFound(String),
    #[error("profile store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("profile store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Profiles keyed by user id, persisted as one pretty-printed JSON object.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, user_id: &str) -> Result<ProfileRecord, StoreError> {
        let mut profiles = self.load()?;
        profiles
            .remove(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }

    /// Replace the profile for `user_id`, creating it if absent.
    pub fn put(&self, user_id: &str, update: ProfileUpdate) -> Result<ProfileRecord, StoreError> {
        let mut profiles = self.load()?;
        let record = ProfileRecord::from_update(user_id, update);
        profiles.insert(user_id.to_string(), record.clone());
        self.save(&profiles)?;

        tracing::debug!(user_id, path = %self.path.display(), "profile saved");
        Ok(record)
    }

    fn load(&self) -> Result<BTreeMap<String, ProfileRecord>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, profiles: &BTreeMap<String, ProfileRecord>) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(profiles)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn update(name: &str) -> ProfileUpdate {
        ProfileUpdate {
            name: name.to_string(),
            title: "Researcher".to_string(),
            affiliation: "Test University".to_string(),
            h_index: Some(12),
            research_interests: vec!["AI".to_string(), "Machine Learning".to_string()],
            awards: vec!["Best Paper 2023".to_string()],
            publications: vec![Publication {
                id: "pub-1".to_string(),
                title: "On Things".to_string(),
                doi: "10.1000/xyz123".to_string(),
                url: None,
                date_published: Some("2023-05-01".to_string()),
            }],
            social_links: SocialLinks {
                orcid: Some("0000-0002-1825-0097".to_string()),
                ..SocialLinks::default()
            },
            is_public: true,
        }
    }

    fn store() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path().join("profiles.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let (_dir, store) = store();
        assert!(matches!(store.get("user-1"), Err(StoreError::NotFound(id)) if id == "user-1"));
        assert!(!store.path().exists());
    }

    #[test]
    fn put_then_get_returns_record() {
        let (_dir, store) = store();

        let saved = store.put("user-1", update("Ada")).unwrap();
        assert_eq!(saved.id, "user-1");
        assert_eq!(saved.name, "Ada");

        assert_eq!(store.get("user-1").unwrap(), saved);
    }

    #[test]
    fn put_keeps_other_profiles_and_replaces_own() {
        let (_dir, store) = store();

        store.put("user-1", update("Ada")).unwrap();
        store.put("user-2", update("Grace")).unwrap();
        store.put("user-1", update("Ada Lovelace")).unwrap();

        assert_eq!(store.get("user-1").unwrap().name, "Ada Lovelace");
        assert_eq!(store.get("user-2").unwrap().name, "Grace");
    }

    #[test]
    fn file_uses_camel_case_keyed_by_user_id() {
        let (_dir, store) = store();
        store.put("user-1", update("Ada")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        let profile = &raw["user-1"];

        assert_eq!(profile["id"], json!("user-1"));
        assert_eq!(profile["hIndex"], json!(12));
        assert_eq!(profile["isPublic"], json!(true));
        assert_eq!(profile["socialLinks"]["orcid"], json!("0000-0002-1825-0097"));
        assert_eq!(profile["socialLinks"]["linkedIn"], json!(null));
        assert_eq!(profile["publications"][0]["datePublished"], json!("2023-05-01"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (_dir, store) = store();
        fs::write(store.path(), b"{not json").unwrap();

        assert!(matches!(store.get("user-1"), Err(StoreError::Corrupt(_))));
        assert!(matches!(
            store.put("user-1", update("Ada")),
            Err(StoreError::Corrupt(_))
        ));
    }
}
