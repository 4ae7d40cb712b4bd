//! Skill Profile: the user's self-declared skills, persisted in a single named slot.
//!
//! The store is the only writer of the slot. Storage trouble never surfaces as an
//! error: reads degrade to an empty profile and writes become best-effort, so the
//! analyzer keeps working without a profile.

pub mod handlers;
pub mod storage;
pub mod suggestions;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::profile::storage::ProfileSlot;

/// Lower-cases and trims a skill name. Applied on every insert and every comparison.
pub fn normalize_skill(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ────────────────────────────────────────────────────────────────────────────
// SkillSet
// ────────────────────────────────────────────────────────────────────────────

/// Insertion-ordered set of normalized skill names.
///
/// Not `Deserialize`: values read back from storage go through `FromIterator`,
/// which re-normalizes and drops duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a skill. Returns false for blanks and skills already present.
    pub fn insert(&mut self, raw: &str) -> bool {
        let skill = normalize_skill(raw);
        if skill.is_empty() || self.0.contains(&skill) {
            return false;
        }
        self.0.push(skill);
        true
    }

    /// Removes a skill. Returns false if it was not a member.
    pub fn remove(&mut self, raw: &str) -> bool {
        let skill = normalize_skill(raw);
        let before = self.0.len();
        self.0.retain(|s| *s != skill);
        self.0.len() != before
    }

    pub fn contains(&self, raw: &str) -> bool {
        let skill = normalize_skill(raw);
        self.0.contains(&skill)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.insert(skill.as_ref());
        }
        set
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SkillProfileStore
// ────────────────────────────────────────────────────────────────────────────

/// Reads and writes the persisted skill profile through a `ProfileSlot`.
///
/// Cloning is cheap; clones share the slot and the write lock.
#[derive(Clone)]
pub struct SkillProfileStore {
    slot: Arc<dyn ProfileSlot>,
    write_lock: Arc<Mutex<()>>,
}

impl SkillProfileStore {
    pub fn new(slot: Arc<dyn ProfileSlot>) -> Self {
        Self {
            slot,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the persisted profile, or an empty one when nothing was ever
    /// written or the slot cannot be read.
    pub async fn get_skills(&self) -> SkillSet {
        let payload = match self.slot.read().await {
            Ok(Some(payload)) => payload,
            Ok(None) => return SkillSet::new(),
            Err(e) => {
                warn!("Skill profile unavailable ({}), using empty profile: {e}", self.slot.describe());
                return SkillSet::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&payload) {
            Ok(skills) => skills.into_iter().collect(),
            Err(e) => {
                warn!("Skill profile in {} is corrupt, using empty profile: {e}", self.slot.describe());
                SkillSet::new()
            }
        }
    }

    /// Normalizes and appends `raw`, persisting before returning.
    /// Blank input and existing members leave the profile untouched.
    pub async fn add_skill(&self, raw: &str) -> SkillSet {
        let _guard = self.write_lock.lock().await;
        let mut skills = self.get_skills().await;
        if skills.insert(raw) {
            debug!("Adding skill '{}'", normalize_skill(raw));
            self.persist(&skills).await;
        }
        skills
    }

    /// Normalizes and removes `raw`. Removing a non-member is a no-op.
    pub async fn remove_skill(&self, raw: &str) -> SkillSet {
        let _guard = self.write_lock.lock().await;
        let mut skills = self.get_skills().await;
        if skills.remove(raw) {
            debug!("Removing skill '{}'", normalize_skill(raw));
            self.persist(&skills).await;
        }
        skills
    }

    async fn persist(&self, skills: &SkillSet) {
        let payload = match serde_json::to_string(skills) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize skill profile: {e}");
                return;
            }
        };
        if let Err(e) = self.slot.write(&payload).await {
            warn!("Skill profile write to {} dropped: {e}", self.slot.describe());
        }
    }
}
