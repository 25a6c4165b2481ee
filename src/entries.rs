//! The durable list of provisioned entries.
//!
//! A thin lifecycle over the `"entries"` store key: load-or-default on
//! open, write-through on every mutation. Entries are owned here after
//! parsing and removed only on explicit request.

use uuid::Uuid;

use crate::store::{load_json, persist_json, KeyValueStore};
use crate::Entry;

const ENTRIES_KEY: &str = "entries";

/// Provisioned entries, backed by a durable store.
pub struct EntryList<S> {
    store: S,
    entries: Vec<Entry>,
}

impl<S: KeyValueStore> EntryList<S> {
    /// Hydrate the list from `store`; unreadable or corrupt state degrades
    /// to an empty list.
    pub fn open(store: S) -> Self {
        let entries = load_json(&store, ENTRIES_KEY).unwrap_or_default();
        EntryList { store, entries }
    }

    /// Append an entry and persist the list.
    pub fn add(&mut self, entry: Entry) -> &Entry {
        self.entries.push(entry);
        persist_json(&mut self.store, ENTRIES_KEY, &self.entries);
        self.entries.last().unwrap()
    }

    /// Remove the entry with the given id. Returns whether one was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            persist_json(&mut self.store, ENTRIES_KEY, &self.entries);
        }
        removed
    }

    pub fn get(&self, id: Uuid) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn sample(account: &str) -> Entry {
        Entry::from_uri(format!(
            "otpauth://totp/Example:{account}?secret=JBSWY3DPEHPK3PXP"
        ))
        .unwrap()
    }

    #[test]
    fn starts_empty_on_a_fresh_store() {
        let list = EntryList::open(MemoryStore::new());
        assert!(list.is_empty());
    }

    #[test]
    fn add_and_remove_round_trip() {
        let mut list = EntryList::open(MemoryStore::new());
        let id = list.add(sample("alice@example.com")).id;
        list.add(sample("bob@example.com"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(id).unwrap().account_name, "alice@example.com");

        assert!(list.remove(id));
        assert_eq!(list.len(), 1);
        assert!(list.get(id).is_none());
        // Removing the same id again is a no-op.
        assert!(!list.remove(id));
    }

    #[test]
    fn entries_survive_a_reopen() {
        let mut store = MemoryStore::new();
        let id = {
            let mut list = EntryList::open(&mut store);
            let id = list.add(sample("alice@example.com")).id;
            list.add(sample("bob@example.com"));
            id
        };
        let list = EntryList::open(&mut store);
        assert_eq!(list.len(), 2);
        let alice = list.get(id).unwrap();
        assert_eq!(alice.issuer, "Example");
        assert_eq!(alice.secret, "JBSWY3DPEHPK3PXP");
        assert_eq!(alice.digits, 6);
    }

    #[test]
    fn corrupt_entry_state_degrades_to_empty() {
        let mut store = MemoryStore::new();
        store.write(ENTRIES_KEY, "42").unwrap();
        let list = EntryList::open(&mut store);
        assert!(list.is_empty());
    }

    #[test]
    fn persisted_layout_is_a_json_array_of_entries() {
        let mut store = MemoryStore::new();
        {
            let mut list = EntryList::open(&mut store);
            list.add(sample("alice@example.com"));
        }
        let raw = store.read(ENTRIES_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["accountName"], "alice@example.com");
        assert_eq!(json[0]["issuer"], "Example");
    }
}
