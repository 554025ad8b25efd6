//! Connection store
//!
//! Ordered collection of connection profiles plus the selection pointer.
//! Mutations are applied only after the gateway confirmed them; the
//! request side of each operation lives in `App`.
//!
//! Invariants upheld by every method:
//! - no two profiles share an `id`
//! - the selection is `None` or the `id` of a profile in the collection

use crate::api::{ConnectionId, ConnectionProfile};
use crate::ticket::{InFlight, Ticket, TicketIssuer};
use tracing::{debug, info};

/// Banner text used when a refresh failure carries no message
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load connections.";

#[derive(Debug, Default)]
pub struct ConnectionStore {
    profiles: Vec<ConnectionProfile>,
    selection: Option<ConnectionId>,
    /// Collection-level error banner
    error: Option<String>,
    refresh: InFlight,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiles(&self) -> &[ConnectionProfile] {
        &self.profiles
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn get(&self, id: ConnectionId) -> Option<&ConnectionProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: ConnectionId) -> Option<usize> {
        self.profiles.iter().position(|p| p.id == id)
    }

    pub fn selection(&self) -> Option<ConnectionId> {
        self.selection
    }

    /// The selected profile
    pub fn active(&self) -> Option<&ConnectionProfile> {
        self.selection.and_then(|id| self.get(id))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.refresh.is_busy()
    }

    /// Point the selection at `id`. Unknown ids are refused.
    pub fn select(&mut self, id: ConnectionId) -> bool {
        if self.contains(id) {
            self.selection = Some(id);
            true
        } else {
            false
        }
    }

    /// Start a refresh: marks loading and clears the banner.
    pub fn begin_refresh(&mut self, issuer: &mut TicketIssuer) -> Ticket {
        self.error = None;
        self.refresh.begin(issuer)
    }

    /// Apply a refresh completion. Stale completions are ignored and return
    /// false. On failure the previous collection is kept.
    pub fn finish_refresh(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ConnectionProfile>, String>,
    ) -> bool {
        if !self.refresh.settle(ticket) {
            debug!(ticket = ticket.value(), "ignoring stale connection list");
            return false;
        }
        match result {
            Ok(profiles) => {
                info!(count = profiles.len(), "connections loaded");
                self.profiles = dedupe(profiles);
                self.repair_selection();
            }
            Err(message) => {
                self.error = Some(if message.trim().is_empty() {
                    LOAD_FAILED_MESSAGE.to_string()
                } else {
                    message
                });
            }
        }
        true
    }

    /// A profile was created: prepend it (dropping any stale copy with the
    /// same id), select it and clear the banner.
    pub fn apply_created(&mut self, profile: ConnectionProfile) {
        info!(id = profile.id, name = %profile.name, "connection created");
        self.profiles.retain(|p| p.id != profile.id);
        self.selection = Some(profile.id);
        self.profiles.insert(0, profile);
        self.error = None;
    }

    /// A profile was updated: replace it in place. Returns false when the
    /// profile is no longer in the collection.
    pub fn apply_updated(&mut self, profile: ConnectionProfile) -> bool {
        let Some(idx) = self.position(profile.id) else {
            debug!(id = profile.id, "updated connection no longer present");
            return false;
        };
        info!(id = profile.id, name = %profile.name, "connection updated");
        self.profiles[idx] = profile;
        true
    }

    /// A profile was deleted: remove it and repair the selection.
    /// Returns false when the id was not present.
    pub fn apply_deleted(&mut self, id: ConnectionId) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);
        if self.profiles.len() == before {
            return false;
        }
        info!(id, "connection deleted");
        self.repair_selection();
        self.error = None;
        true
    }

    /// Drop everything, including any outstanding refresh.
    pub fn clear(&mut self) {
        self.profiles.clear();
        self.selection = None;
        self.error = None;
        self.refresh.abandon();
    }

    /// Keep the selection if it still exists, else fall back to the first
    /// profile, else `None`.
    fn repair_selection(&mut self) {
        let keep = self.selection.filter(|id| self.contains(*id));
        self.selection = keep.or_else(|| self.profiles.first().map(|p| p.id));
    }
}

/// Keep the first occurrence of every id
fn dedupe(profiles: Vec<ConnectionProfile>) -> Vec<ConnectionProfile> {
    let mut seen = std::collections::HashSet::new();
    profiles.into_iter().filter(|p| seen.insert(p.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(id: ConnectionId, name: &str) -> ConnectionProfile {
        ConnectionProfile {
            id,
            name: name.to_string(),
            connection_string: format!("postgresql://localhost/{name}"),
            created_at: Utc::now(),
        }
    }

    fn loaded(profiles: Vec<ConnectionProfile>) -> ConnectionStore {
        let mut issuer = TicketIssuer::new();
        let mut store = ConnectionStore::new();
        let t = store.begin_refresh(&mut issuer);
        assert!(store.finish_refresh(t, Ok(profiles)));
        store
    }

    fn ids(store: &ConnectionStore) -> Vec<ConnectionId> {
        store.profiles().iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_refresh_selects_first() {
        let store = loaded(vec![profile(1, "A"), profile(2, "B")]);
        assert_eq!(store.selection(), Some(1));
        assert!(!store.is_loading());
    }

    #[test]
    fn test_refresh_preserves_existing_selection() {
        let mut issuer = TicketIssuer::new();
        let mut store = loaded(vec![profile(1, "A"), profile(2, "B")]);
        store.select(2);
        let t = store.begin_refresh(&mut issuer);
        store.finish_refresh(t, Ok(vec![profile(1, "A"), profile(2, "B"), profile(3, "C")]));
        assert_eq!(store.selection(), Some(2));
    }

    #[test]
    fn test_refresh_repairs_vanished_selection() {
        let mut issuer = TicketIssuer::new();
        let mut store = loaded(vec![profile(1, "A"), profile(2, "B")]);
        store.select(2);
        let t = store.begin_refresh(&mut issuer);
        store.finish_refresh(t, Ok(vec![profile(3, "C"), profile(1, "A")]));
        assert_eq!(store.selection(), Some(3));

        let t = store.begin_refresh(&mut issuer);
        store.finish_refresh(t, Ok(vec![]));
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_refresh_failure_keeps_collection() {
        let mut issuer = TicketIssuer::new();
        let mut store = loaded(vec![profile(1, "A")]);
        let t = store.begin_refresh(&mut issuer);
        assert!(store.is_loading());
        store.finish_refresh(t, Err("boom".to_string()));
        assert_eq!(ids(&store), vec![1]);
        assert_eq!(store.selection(), Some(1));
        assert_eq!(store.error(), Some("boom"));
        assert!(!store.is_loading());
    }

    #[test]
    fn test_refresh_failure_blank_message_falls_back() {
        let mut issuer = TicketIssuer::new();
        let mut store = ConnectionStore::new();
        let t = store.begin_refresh(&mut issuer);
        store.finish_refresh(t, Err(String::new()));
        assert_eq!(store.error(), Some(LOAD_FAILED_MESSAGE));
    }

    #[test]
    fn test_begin_refresh_clears_error() {
        let mut issuer = TicketIssuer::new();
        let mut store = ConnectionStore::new();
        let t = store.begin_refresh(&mut issuer);
        store.finish_refresh(t, Err("boom".to_string()));
        store.begin_refresh(&mut issuer);
        assert_eq!(store.error(), None);
    }

    #[test]
    fn test_stale_refresh_ignored() {
        let mut issuer = TicketIssuer::new();
        let mut store = ConnectionStore::new();
        let old = store.begin_refresh(&mut issuer);
        let new = store.begin_refresh(&mut issuer);
        assert!(!store.finish_refresh(old, Ok(vec![profile(9, "old")])));
        assert!(store.is_empty());
        assert!(store.finish_refresh(new, Ok(vec![profile(1, "A")])));
        assert_eq!(ids(&store), vec![1]);
    }

    #[test]
    fn test_refresh_dedupes_ids() {
        let store = loaded(vec![profile(1, "A"), profile(1, "A again"), profile(2, "B")]);
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.get(1).unwrap().name, "A");
    }

    #[test]
    fn test_created_is_prepended_and_selected() {
        let mut store = loaded(vec![profile(1, "A"), profile(2, "B")]);
        store.apply_created(profile(3, "C"));
        assert_eq!(ids(&store), vec![3, 1, 2]);
        assert_eq!(store.selection(), Some(3));
    }

    #[test]
    fn test_created_replaces_stale_copy() {
        let mut store = loaded(vec![profile(1, "A"), profile(2, "B")]);
        store.apply_created(profile(2, "B2"));
        assert_eq!(ids(&store), vec![2, 1]);
        assert_eq!(store.get(2).unwrap().name, "B2");
    }

    #[test]
    fn test_created_clears_banner() {
        let mut issuer = TicketIssuer::new();
        let mut store = ConnectionStore::new();
        let t = store.begin_refresh(&mut issuer);
        store.finish_refresh(t, Err("down".to_string()));
        store.apply_created(profile(1, "A"));
        assert_eq!(store.error(), None);
    }

    #[test]
    fn test_updated_in_place() {
        let mut store = loaded(vec![profile(1, "A"), profile(2, "B"), profile(3, "C")]);
        store.select(2);
        assert!(store.apply_updated(profile(2, "Renamed")));
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert_eq!(store.get(2).unwrap().name, "Renamed");
        assert_eq!(store.selection(), Some(2));
    }

    #[test]
    fn test_updated_missing_is_noop() {
        let mut store = loaded(vec![profile(1, "A")]);
        assert!(!store.apply_updated(profile(5, "ghost")));
        assert_eq!(ids(&store), vec![1]);
    }

    #[test]
    fn test_delete_selected_repairs_selection() {
        let mut store = loaded(vec![profile(1, "A"), profile(2, "B")]);
        assert!(store.apply_deleted(1));
        assert_eq!(store.selection(), Some(2));
        assert!(store.apply_deleted(2));
        assert_eq!(store.selection(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_unselected_keeps_selection() {
        let mut store = loaded(vec![profile(1, "A"), profile(2, "B")]);
        store.select(2);
        store.apply_deleted(1);
        assert_eq!(store.selection(), Some(2));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut store = loaded(vec![profile(1, "A")]);
        assert!(!store.apply_deleted(42));
        assert_eq!(ids(&store), vec![1]);
    }

    #[test]
    fn test_select_unknown_refused() {
        let mut store = loaded(vec![profile(1, "A")]);
        assert!(!store.select(99));
        assert_eq!(store.selection(), Some(1));
    }

    #[test]
    fn test_clear() {
        let mut issuer = TicketIssuer::new();
        let mut store = loaded(vec![profile(1, "A")]);
        let t = store.begin_refresh(&mut issuer);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.selection(), None);
        assert!(!store.is_loading());
        // Refresh that was in flight during the clear is dropped
        assert!(!store.finish_refresh(t, Ok(vec![profile(1, "A")])));
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_unique_across_mixed_mutations() {
        let mut store = loaded(vec![profile(1, "A"), profile(2, "B")]);
        store.apply_created(profile(3, "C"));
        store.apply_created(profile(1, "A2"));
        store.apply_updated(profile(3, "C2"));
        store.apply_deleted(2);
        store.apply_created(profile(2, "B2"));
        store.apply_created(profile(2, "B3"));

        let mut seen = ids(&store);
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
        let sel = store.selection().unwrap();
        assert!(store.contains(sel));
    }
}
