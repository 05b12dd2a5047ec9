use serde::Serialize;

use crate::model::subject::{Kkm, Subject};

/// Last threshold used for a subject name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInfo {
    pub name: String,
    #[serde(rename = "lastKKM")]
    pub last_kkm: Kkm,
}

/// Deduplicated list of subject names seen across all semesters.
///
/// Used to suggest names and thresholds when a subject recurs in a later
/// semester. Entries keep their first-seen order; saving a name again only
/// updates its threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubjectCatalog {
    entries: Vec<SubjectInfo>,
}

impl SubjectCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from stored entries. Later duplicates update earlier ones.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = SubjectInfo>) -> Self {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.upsert(entry.name, entry.last_kkm);
        }
        catalog
    }

    /// Record `kkm` as the latest threshold for `name`.
    ///
    /// Returns `true` when the name was new to the catalog.
    pub fn upsert(&mut self, name: impl Into<String>, kkm: Kkm) -> bool {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.last_kkm = kkm;
            return false;
        }
        self.entries.push(SubjectInfo {
            name,
            last_kkm: kkm,
        });
        true
    }

    /// Upsert every subject in list order.
    pub fn sync_from_subjects(&mut self, subjects: &[Subject]) {
        for subject in subjects {
            self.upsert(subject.name().as_str(), subject.kkm());
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SubjectInfo> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Threshold to pre-fill for `name`, or the default for unknown names.
    #[must_use]
    pub fn suggested_kkm(&self, name: &str) -> Kkm {
        self.get(name.trim()).map_or(Kkm::DEFAULT, |e| e.last_kkm)
    }

    /// Case-insensitive substring match, in catalog order.
    #[must_use]
    pub fn suggestions(&self, query: &str) -> Vec<&SubjectInfo> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[SubjectInfo] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
