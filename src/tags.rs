use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use ulid::Ulid;

/// A user-defined label assignable to any number of packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
}

/// The single persisted document backing the store, rewritten wholesale
/// after each mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDocument {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub package_tags: BTreeMap<String, Vec<String>>,
}

/// Tag definitions plus package-to-tag assignments, persisted as one JSON
/// file per user. The document is loaded fresh on every operation and
/// mutations are serialized through an in-process lock, so overlapping
/// calls from the GUI cannot interleave their read-modify-write cycles.
pub struct TagStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TagStore {
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME")?;
        Ok(Self::at(PathBuf::from(home)
            .join(".config")
            .join("brewdeck")
            .join("tags.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("tag store lock poisoned"))
    }

    /// A missing or unreadable document means "no tags yet", not an error.
    fn load(&self) -> TagDocument {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => TagDocument::default(),
        }
    }

    /// Persist failures must reach the caller: a dropped write here loses
    /// user-created tags.
    fn save(&self, doc: &TagDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        Ok(self.load().tags)
    }

    pub fn create_tag(&self, name: &str, color: &str, description: &str) -> Result<Tag> {
        let _guard = self.lock()?;
        let tag = Tag {
            id: Ulid::new().to_string(),
            name: name.to_string(),
            color: color.to_string(),
            description: description.to_string(),
        };
        let mut doc = self.load();
        doc.tags.push(tag.clone());
        self.save(&doc)?;
        Ok(tag)
    }

    /// Deleting a tag also removes it from every package's assignment set;
    /// idempotent when the id is unknown.
    pub fn delete_tag(&self, id: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut doc = self.load();
        doc.tags.retain(|tag| tag.id != id);
        for ids in doc.package_tags.values_mut() {
            ids.retain(|assigned| assigned != id);
        }
        doc.package_tags.retain(|_, ids| !ids.is_empty());
        self.save(&doc)
    }

    pub fn package_tags(&self, package: &str) -> Result<Vec<Tag>> {
        let doc = self.load();
        let assigned = match doc.package_tags.get(package) {
            Some(ids) => ids.clone(),
            None => return Ok(Vec::new()),
        };
        Ok(doc
            .tags
            .into_iter()
            .filter(|tag| assigned.contains(&tag.id))
            .collect())
    }

    pub fn add_package_tag(&self, package: &str, tag: &Tag) -> Result<()> {
        let _guard = self.lock()?;
        let mut doc = self.load();
        let ids = doc.package_tags.entry(package.to_string()).or_default();
        if !ids.contains(&tag.id) {
            ids.push(tag.id.clone());
        }
        self.save(&doc)
    }

    /// A package whose tag set becomes empty loses its entry entirely; no
    /// empty sets are persisted.
    pub fn remove_package_tag(&self, package: &str, tag_id: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut doc = self.load();
        if let Some(ids) = doc.package_tags.get_mut(package) {
            ids.retain(|assigned| assigned != tag_id);
            if ids.is_empty() {
                doc.package_tags.remove(package);
            }
        }
        self.save(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, TagStore) {
        let dir = TempDir::new().unwrap();
        let store = TagStore::at(dir.path().join("tags.json"));
        (dir, store)
    }

    #[test]
    fn created_tag_round_trips_through_list() {
        let (_dir, store) = store();
        let created = store
            .create_tag("essentials", "#007AFF", "daily drivers")
            .unwrap();
        assert!(!created.id.is_empty());

        let tags = store.list_tags().unwrap();
        assert_eq!(tags, vec![created]);
    }

    #[test]
    fn fresh_ids_are_unique() {
        let (_dir, store) = store();
        let first = store.create_tag("a", "#111111", "").unwrap();
        let second = store.create_tag("b", "#222222", "").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn missing_or_corrupt_file_reads_as_empty() {
        let (dir, store) = store();
        assert!(store.list_tags().unwrap().is_empty());

        fs::write(dir.path().join("tags.json"), "{not json").unwrap();
        assert!(store.list_tags().unwrap().is_empty());
        assert!(store.package_tags("git").unwrap().is_empty());
    }

    #[test]
    fn add_package_tag_is_idempotent() {
        let (_dir, store) = store();
        let tag = store.create_tag("cli", "#34C759", "").unwrap();

        store.add_package_tag("git", &tag).unwrap();
        store.add_package_tag("git", &tag).unwrap();

        let assigned = store.package_tags("git").unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, tag.id);
    }

    #[test]
    fn remove_absent_assignment_is_a_no_op() {
        let (_dir, store) = store();
        store.remove_package_tag("git", "no-such-id").unwrap();
        assert!(store.package_tags("git").unwrap().is_empty());
    }

    #[test]
    fn removing_last_assignment_drops_the_package_entry() {
        let (dir, store) = store();
        let tag = store.create_tag("cli", "#34C759", "").unwrap();
        store.add_package_tag("git", &tag).unwrap();
        store.remove_package_tag("git", &tag.id).unwrap();

        let content = fs::read_to_string(dir.path().join("tags.json")).unwrap();
        let doc: TagDocument = serde_json::from_str(&content).unwrap();
        assert!(!doc.package_tags.contains_key("git"));
    }

    #[test]
    fn delete_tag_cascades_into_assignments() {
        let (_dir, store) = store();
        let keep = store.create_tag("keep", "#111111", "").unwrap();
        let doomed = store.create_tag("doomed", "#222222", "").unwrap();
        store.add_package_tag("git", &keep).unwrap();
        store.add_package_tag("git", &doomed).unwrap();
        store.add_package_tag("node", &doomed).unwrap();

        store.delete_tag(&doomed.id).unwrap();

        let tags = store.list_tags().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, keep.id);

        // git keeps its remaining tag; node's set emptied so its entry is gone
        let git_tags = store.package_tags("git").unwrap();
        assert_eq!(git_tags.len(), 1);
        assert_eq!(git_tags[0].id, keep.id);
        assert!(store.package_tags("node").unwrap().is_empty());

        // deleting again is fine
        store.delete_tag(&doomed.id).unwrap();
    }

    #[test]
    fn document_keeps_camel_case_key_on_disk() {
        let (dir, store) = store();
        let tag = store.create_tag("cli", "#34C759", "").unwrap();
        store.add_package_tag("git", &tag).unwrap();

        let content = fs::read_to_string(dir.path().join("tags.json")).unwrap();
        assert!(content.contains("\"packageTags\""));
    }
}
