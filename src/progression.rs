//! Persisted progression record: unlocked weapons, high score, run count.
//!
//! Persisted to LocalStorage on wasm. Saves merge with the stored record so
//! the high score never decreases and the unlocked set only grows; unknown
//! or missing fields default, keeping old saves forward-compatible.

use serde::{Deserialize, Serialize};

use crate::weapons::WeaponId;

fn default_unlocked() -> Vec<WeaponId> {
    vec![WeaponId::Fists]
}

/// The cross-run save record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    /// Unlocked weapon ids, insertion order (order is irrelevant)
    #[serde(default = "default_unlocked")]
    pub unlocked_weapons: Vec<WeaponId>,
    #[serde(default)]
    pub high_score: u32,
    #[serde(default)]
    pub total_runs: u32,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionRecord {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "powder_brawl_save";

    /// Fresh record: fists unlocked, nothing else
    pub fn new() -> Self {
        Self {
            unlocked_weapons: default_unlocked(),
            high_score: 0,
            total_runs: 0,
        }
    }

    pub fn is_unlocked(&self, id: WeaponId) -> bool {
        self.unlocked_weapons.contains(&id)
    }

    /// Add a weapon to the unlocked set. Returns false if already present.
    pub fn unlock(&mut self, id: WeaponId) -> bool {
        if self.is_unlocked(id) {
            return false;
        }
        self.unlocked_weapons.push(id);
        true
    }

    /// Raise the high score if beaten. Returns true on a new high.
    pub fn update_high_score(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            return true;
        }
        false
    }

    pub fn increment_runs(&mut self) -> u32 {
        self.total_runs += 1;
        self.total_runs
    }

    /// Apply a completed run: bump the run counter, raise the high score.
    /// Returns true when the score set a new high.
    pub fn record_run(&mut self, score: u32) -> bool {
        self.increment_runs();
        self.update_high_score(score)
    }

    /// Merge another record in, preserving monotonicity: high score and run
    /// count never decrease, the unlocked set only grows.
    pub fn merge(&mut self, other: &ProgressionRecord) {
        for &id in &other.unlocked_weapons {
            self.unlock(id);
        }
        self.high_score = self.high_score.max(other.high_score);
        self.total_runs = self.total_runs.max(other.total_runs);
    }

    /// Load the record from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(record) = serde_json::from_str::<ProgressionRecord>(&json) {
                    log::info!(
                        "Loaded progression ({} runs, high score {})",
                        record.total_runs,
                        record.high_score
                    );
                    return record;
                }
                log::warn!("Corrupt progression record, starting fresh");
            }
        }

        log::info!("No progression record found, starting fresh");
        Self::new()
    }

    /// Save the record to LocalStorage, merged with whatever is already
    /// stored (WASM only). Failures are logged and ignored.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let mut merged = Self::load();
            merged.merge(self);
            if let Ok(json) = serde_json::to_string(&merged) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save progression (storage unavailable)");
                } else {
                    log::info!("Progression saved");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_fists() {
        let record = ProgressionRecord::new();
        assert_eq!(record.unlocked_weapons, vec![WeaponId::Fists]);
        assert_eq!(record.high_score, 0);
        assert_eq!(record.total_runs, 0);
    }

    #[test]
    fn test_high_score_is_monotonic() {
        let mut record = ProgressionRecord::new();
        assert!(record.update_high_score(350));
        assert!(!record.update_high_score(200));
        assert_eq!(record.high_score, 350);
        assert!(!record.update_high_score(350), "ties are not new highs");
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut record = ProgressionRecord::new();
        assert!(record.unlock(WeaponId::Sword));
        assert!(!record.unlock(WeaponId::Sword));
        assert_eq!(record.unlocked_weapons.len(), 2);
    }

    #[test]
    fn test_record_run() {
        let mut record = ProgressionRecord::new();
        assert!(record.record_run(100));
        assert!(!record.record_run(50));
        assert_eq!(record.total_runs, 2);
        assert_eq!(record.high_score, 100);
    }

    #[test]
    fn test_merge_preserves_monotonicity() {
        let mut a = ProgressionRecord::new();
        a.high_score = 400;
        a.total_runs = 2;
        a.unlock(WeaponId::Staff);

        let mut b = ProgressionRecord::new();
        b.high_score = 300;
        b.total_runs = 6;
        b.unlock(WeaponId::Sword);

        a.merge(&b);
        assert_eq!(a.high_score, 400);
        assert_eq!(a.total_runs, 6);
        assert!(a.is_unlocked(WeaponId::Sword));
        assert!(a.is_unlocked(WeaponId::Staff));
    }

    #[test]
    fn test_missing_fields_default() {
        // An old or foreign save with no fields at all still loads
        let record: ProgressionRecord = serde_json::from_str("{}").expect("defaults apply");
        assert_eq!(record, ProgressionRecord::new());

        // Unknown fields are ignored
        let record: ProgressionRecord =
            serde_json::from_str(r#"{"highScore": 1, "high_score": 42, "levelsCompleted": []}"#)
                .expect("unknown fields ignored");
        assert_eq!(record.high_score, 42);
    }
}
