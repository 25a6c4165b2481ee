//! The collection ledger: every distinct special code ever captured.
//!
//! The ledger owns three pieces of durable state under an injected store
//! handle: the collection map (one record per distinct code), the
//! achievement list, and the lifetime generation counter. Loading degrades
//! to empty state when storage is unreadable or corrupt. Each `record`
//! call is one atomic unit from the caller's view: the record is created or
//! bumped, persisted, and achievements are evaluated synchronously before
//! the call returns. A failed store write is logged and the in-memory state
//! kept, so persistence is best-effort while the session stays consistent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{self, Achievement};
use crate::rules::{self, Rarity};
use crate::store::{load_json, persist_json, KeyValueStore};

const COLLECTION_KEY: &str = "collection";
const ACHIEVEMENTS_KEY: &str = "achievements";
const GENERATED_KEY: &str = "generated";

/// One distinct captured code.
///
/// Keyed by `code` in the collection map, so there is exactly one record
/// per code value. `rarity` and `description` are fixed at first capture;
/// both re-derive deterministically from the pattern catalog, so a
/// reset-and-replay reproduces them exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedSequence {
    pub code: String,
    pub first_seen: DateTime<Utc>,
    pub count: u64,
    pub rarity: Rarity,
    pub description: String,
}

/// Distinct-count per rarity tier, in the persisted display shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RarityBreakdown {
    pub common: usize,
    pub rare: usize,
    pub epic: usize,
    pub legendary: usize,
}

impl RarityBreakdown {
    pub fn of(&self, rarity: Rarity) -> usize {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }
}

/// Snapshot of collection progress for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    /// Distinct codes collected.
    pub total: usize,
    /// Sum of per-code occurrence counts.
    pub total_seen: u64,
    /// Lifetime number of codes generated, matched or not.
    pub total_generated: u64,
    pub by_rarity: RarityBreakdown,
}

/// Durable collection of special codes plus the achievements they unlock.
pub struct Ledger<S> {
    store: S,
    collection: BTreeMap<String, CollectedSequence>,
    achievements: Vec<Achievement>,
    generated: u64,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Hydrate a ledger from `store`, falling back to empty state wherever
    /// storage is absent or corrupt.
    pub fn open(store: S) -> Self {
        let collection = load_json(&store, COLLECTION_KEY).unwrap_or_default();
        let achievements = achievements::hydrate(
            load_json(&store, ACHIEVEMENTS_KEY).unwrap_or_default(),
        );
        let generated = load_json(&store, GENERATED_KEY).unwrap_or_default();
        Ledger {
            store,
            collection,
            achievements,
            generated,
        }
    }

    /// Feed a freshly generated code through the collection gate.
    ///
    /// Bumps the lifetime generation counter, then records the code if the
    /// pattern catalog deems it special. Returns the record when one was
    /// created or updated.
    pub fn observe(&mut self, code: &str) -> Option<&CollectedSequence> {
        self.generated += 1;
        persist_json(&mut self.store, GENERATED_KEY, &self.generated);
        if rules::is_special(code) {
            Some(self.record(code))
        } else {
            None
        }
    }

    /// Record a capture of `code`: create the record on first sight,
    /// increment its count otherwise. Achievements are evaluated against
    /// the updated collection before this returns.
    pub fn record(&mut self, code: &str) -> &CollectedSequence {
        self.record_at(code, Utc::now())
    }

    fn record_at(&mut self, code: &str, now: DateTime<Utc>) -> &CollectedSequence {
        match self.collection.get_mut(code) {
            Some(existing) => existing.count += 1,
            None => {
                let (rarity, description) = rules::classify(code);
                self.collection.insert(
                    code.to_string(),
                    CollectedSequence {
                        code: code.to_string(),
                        first_seen: now,
                        count: 1,
                        rarity,
                        description: description.to_string(),
                    },
                );
            }
        }
        persist_json(&mut self.store, COLLECTION_KEY, &self.collection);

        let unlocked = achievements::evaluate(&mut self.achievements, &self.collection, now);
        if !unlocked.is_empty() {
            persist_json(&mut self.store, ACHIEVEMENTS_KEY, &self.achievements);
        }

        &self.collection[code]
    }

    /// The record for `code`, if collected.
    pub fn get(&self, code: &str) -> Option<&CollectedSequence> {
        self.collection.get(code)
    }

    /// All collected sequences, in code order.
    pub fn sequences(&self) -> impl Iterator<Item = &CollectedSequence> {
        self.collection.values()
    }

    /// Achievement catalog with current unlock state.
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    /// Number of distinct codes collected.
    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn stats(&self) -> CollectionStats {
        let mut by_rarity = RarityBreakdown::default();
        for seq in self.collection.values() {
            match seq.rarity {
                Rarity::Common => by_rarity.common += 1,
                Rarity::Rare => by_rarity.rare += 1,
                Rarity::Epic => by_rarity.epic += 1,
                Rarity::Legendary => by_rarity.legendary += 1,
            }
        }
        CollectionStats {
            total: self.collection.len(),
            total_seen: self.collection.values().map(|s| s.count).sum(),
            total_generated: self.generated,
            by_rarity,
        }
    }

    /// Clear the collection and relock every achievement. The lifetime
    /// generation counter is not part of the collection and survives.
    pub fn reset(&mut self) {
        self.collection.clear();
        self.achievements = achievements::initial();
        if let Err(e) = self.store.remove(COLLECTION_KEY) {
            log::warn!("failed to clear {COLLECTION_KEY:?} state: {e}");
        }
        if let Err(e) = self.store.remove(ACHIEVEMENTS_KEY) {
            log::warn!("failed to clear {ACHIEVEMENTS_KEY:?} state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use chrono::TimeZone;

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    #[test]
    fn first_capture_creates_a_classified_record() {
        let mut ledger = Ledger::open(MemoryStore::new());
        let seq = ledger.record_at("123456", ts(1_000)).clone();
        assert_eq!(seq.code, "123456");
        assert_eq!(seq.count, 1);
        assert_eq!(seq.first_seen, ts(1_000));
        assert_eq!(seq.rarity, Rarity::Legendary);
        assert_eq!(seq.description, "The Ultimate Sequence");
    }

    #[test]
    fn repeat_captures_bump_the_count_only() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.record_at("777777", ts(1_000));
        let seq = ledger.record_at("777777", ts(2_000)).clone();
        assert_eq!(seq.count, 2);
        assert_eq!(seq.first_seen, ts(1_000));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn stats_track_distinct_seen_and_rarity() {
        let mut ledger = Ledger::open(MemoryStore::new());
        for code in ["111481", "222481", "333481", "123481", "321481"] {
            ledger.record(code);
        }
        ledger.record("111481");
        let stats = ledger.stats();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.total_seen, 6);
        assert_eq!(stats.by_rarity.common, 5);
        assert_eq!(stats.by_rarity.of(Rarity::Legendary), 0);
    }

    #[test]
    fn observe_gates_on_the_pattern_catalog() {
        let mut ledger = Ledger::open(MemoryStore::new());
        assert!(ledger.observe("845907").is_none());
        assert!(ledger.observe("123456").is_some());
        assert_eq!(ledger.len(), 1);
        let stats = ledger.stats();
        assert_eq!(stats.total_generated, 2);
        assert_eq!(stats.total_seen, 1);
    }

    #[test]
    fn achievements_unlock_synchronously_inside_record() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.record("123456");
        let ultimate = ledger
            .achievements()
            .iter()
            .find(|a| a.id == "ultimate-sequence")
            .unwrap();
        assert!(ultimate.unlocked);
        assert!(ultimate.unlocked_at.is_some());
        let legendary = ledger
            .achievements()
            .iter()
            .find(|a| a.id == "legendary-finder")
            .unwrap();
        assert!(legendary.unlocked);
    }

    #[test]
    fn unlock_timestamps_survive_repeat_evaluation() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.record_at("777777", ts(1_000));
        let stamped = ledger
            .achievements()
            .iter()
            .find(|a| a.id == "lucky-seven")
            .unwrap()
            .unlocked_at;
        ledger.record_at("777777", ts(9_000));
        let unchanged = ledger
            .achievements()
            .iter()
            .find(|a| a.id == "lucky-seven")
            .unwrap()
            .unlocked_at;
        assert_eq!(stamped, unchanged);
        assert_eq!(stamped, Some(ts(1_000)));
    }

    #[test]
    fn state_survives_a_reopen() {
        let mut store = MemoryStore::new();
        {
            let mut ledger = Ledger::open(&mut store);
            ledger.observe("123456");
            ledger.observe("845907");
        }
        let ledger = Ledger::open(&mut store);
        let stats = ledger.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.total_generated, 2);
        assert!(ledger
            .achievements()
            .iter()
            .find(|a| a.id == "ultimate-sequence")
            .unwrap()
            .unlocked);
    }

    #[test]
    fn corrupt_state_degrades_to_an_empty_ledger() {
        let mut store = MemoryStore::new();
        store.write(COLLECTION_KEY, "][ not json").unwrap();
        store.write(ACHIEVEMENTS_KEY, "{\"wrong\": \"shape\"}").unwrap();
        store.write(GENERATED_KEY, "plenty").unwrap();

        let mut ledger = Ledger::open(&mut store);
        assert!(ledger.is_empty());
        assert_eq!(ledger.stats().total_generated, 0);
        // And the ledger is fully usable afterwards.
        ledger.record("112233");
        assert_eq!(ledger.stats().by_rarity.rare, 1);
    }

    #[test]
    fn reset_clears_records_and_relocks_achievements() {
        let mut store = MemoryStore::new();
        let mut ledger = Ledger::open(&mut store);
        ledger.observe("123456");
        ledger.observe("777777");
        ledger.reset();

        assert!(ledger.is_empty());
        assert!(ledger.achievements().iter().all(|a| !a.unlocked));
        // Lifetime counter survives a collection reset.
        assert_eq!(ledger.stats().total_generated, 2);
        drop(ledger);
        assert_eq!(store.read(COLLECTION_KEY).unwrap(), None);
        assert_eq!(store.read(ACHIEVEMENTS_KEY).unwrap(), None);
    }

    #[test]
    fn replay_after_reset_reproduces_rarities() {
        let mut ledger = Ledger::open(MemoryStore::new());
        let before = ledger.record("012345").clone();
        ledger.reset();
        let after = ledger.record("012345").clone();
        assert_eq!(before.rarity, after.rarity);
        assert_eq!(before.description, after.description);
    }

    #[test]
    fn persisted_collection_is_keyed_by_code_with_camel_case_fields() {
        let mut store = MemoryStore::new();
        {
            let mut ledger = Ledger::open(&mut store);
            ledger.record_at("123456", ts(1_700_000_000));
        }
        let raw = store.read(COLLECTION_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let record = &json["123456"];
        assert_eq!(record["code"], "123456");
        assert_eq!(record["count"], 1);
        assert_eq!(record["rarity"], "Legendary");
        // ISO-8601 timestamp.
        assert!(record["firstSeen"].as_str().unwrap().contains('T'));
    }

    /// Store double whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn write(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
            })
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_keep_in_memory_state() {
        let mut ledger = Ledger::open(BrokenStore);
        let seq = ledger.record("123456").clone();
        assert_eq!(seq.count, 1);
        assert_eq!(ledger.stats().total, 1);
        assert!(ledger
            .achievements()
            .iter()
            .find(|a| a.id == "first-special")
            .unwrap()
            .unlocked);
    }
}
