//! Ordered client-side mirror of the remote prediction history.
//!
//! Entries are kept newest first. Locally prepended entries stay *pending*
//! until a reconcile finds the server's copy; reconciliation follows an
//! "eventually consistent, client wins" policy: pending entries the server
//! does not list yet are kept at the head, everything else is replaced by the
//! server's view.

use std::collections::HashSet;
use verity_core::{EntryKey, HistoryEntry};

/// How the backend addresses entries for deletion, learned from its listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteContract {
    /// Listings carry server ids; deletes must name one.
    ById,
    /// Listings carry no ids; deletes name the entry text.
    ByText,
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    entry: HistoryEntry,
    pending: bool,
}

impl Slot {
    const fn confirmed(entry: HistoryEntry) -> Self {
        Self {
            entry,
            pending: false,
        }
    }
}

/// Outcome of [`HistoryCache::reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Pending entries still unconfirmed after the merge.
    pub pending: usize,
    /// Pending entries the server listed, as `(local key, server key)`.
    pub confirmed: Vec<(EntryKey, EntryKey)>,
}

impl Reconciled {
    /// Server key that replaced the local `key`, if the merge confirmed it.
    #[must_use]
    pub fn server_key(&self, key: &EntryKey) -> Option<&EntryKey> {
        self.confirmed
            .iter()
            .find(|(local, _)| local == key)
            .map(|(_, server)| server)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryCache {
    slots: Vec<Slot>,
    contract: Option<DeleteContract>,
}

impl HistoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache wholesale with a server listing, preserving order.
    ///
    /// Repeated durable ids are dropped after their first occurrence.
    pub fn seed(&mut self, entries: Vec<HistoryEntry>) {
        self.observe(&entries);
        self.slots = dedup_durable(entries).into_iter().map(Slot::confirmed).collect();
    }

    /// Delete addressing learned from the last non-empty listing, if any.
    #[must_use]
    pub const fn contract(&self) -> Option<DeleteContract> {
        self.contract
    }

    fn observe(&mut self, listing: &[HistoryEntry]) {
        if listing.is_empty() {
            return;
        }
        self.contract = Some(if listing.iter().any(|entry| entry.key.is_durable()) {
            DeleteContract::ById
        } else {
            DeleteContract::ByText
        });
    }

    /// Insert an unconfirmed entry at the head.
    pub fn prepend(&mut self, entry: HistoryEntry) {
        self.slots.insert(
            0,
            Slot {
                entry,
                pending: true,
            },
        );
    }

    /// Drop every entry addressed by `key`, returning how many were removed.
    ///
    /// Call only after the server confirmed the delete. A text key removes
    /// all entries sharing that text.
    pub fn evict(&mut self, key: &EntryKey) -> usize {
        let before = self.slots.len();
        self.slots.retain(|slot| !slot.entry.matches(key));
        before - self.slots.len()
    }

    /// Merge a fresh server listing into the cache.
    ///
    /// Confirmed entries first claim the server row carrying their own key.
    /// Each pending entry is then matched (by text and label) against at most
    /// one unclaimed server row. Matched entries are replaced by the server
    /// copy; unmatched ones are kept ahead of the server listing in their
    /// current order.
    pub fn reconcile(&mut self, server: Vec<HistoryEntry>) -> Reconciled {
        self.observe(&server);
        let server = dedup_durable(server);
        let mut claimed = vec![false; server.len()];

        for slot in self.slots.iter().filter(|slot| !slot.pending) {
            if let Some(i) = server.iter().enumerate().position(|(i, remote)| {
                !claimed[i] && remote.key == slot.entry.key && remote.same_prediction(&slot.entry)
            }) {
                claimed[i] = true;
            }
        }

        let mut confirmed = Vec::new();
        let kept: Vec<Slot> = self
            .slots
            .iter()
            .filter(|slot| slot.pending)
            .filter(|slot| {
                let found = server
                    .iter()
                    .enumerate()
                    .position(|(i, remote)| !claimed[i] && remote.same_prediction(&slot.entry));
                if let Some(i) = found {
                    claimed[i] = true;
                    confirmed.push((slot.entry.key.clone(), server[i].key.clone()));
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();

        let pending = kept.len();
        self.slots = kept
            .into_iter()
            .chain(server.into_iter().map(Slot::confirmed))
            .collect();
        Reconciled { pending, confirmed }
    }

    /// Read-only view of the entries, newest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.slots.iter().map(|slot| &slot.entry)
    }

    /// Owned copy of the entries for presentation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries().cloned().collect()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.slots.get(index).map(|slot| &slot.entry)
    }

    /// Number of entries not yet confirmed by a server listing.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|slot| slot.pending).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn dedup_durable(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut seen = HashSet::new();
    let before = entries.len();
    let unique: Vec<HistoryEntry> = entries
        .into_iter()
        .filter(|entry| !entry.key.is_durable() || seen.insert(entry.key.clone()))
        .collect();
    if unique.len() != before {
        tracing::warn!(
            dropped = before - unique.len(),
            "server history listed duplicate ids"
        );
    }
    unique
}
