//! Fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use mess_preferences::auth::{IdentityGate, SignedInHandler, SignedInListeners, Subscription};
use mess_preferences::drive::{EntryKind, EntryQuery, FileRef};
use mess_preferences::error::{Error, Result};
use mess_preferences::service::TableService;
use mess_preferences::sheets::Grid;

pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

pub fn june_fifth() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
}

pub fn grid(rows: &[&[&str]]) -> Grid {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

pub fn alice_and_bob() -> Grid {
    grid(&[
        &["h1", "h1", "h1", "h1", "h1", "h1"],
        &["h2", "h2", "h2", "h2", "h2", "h2"],
        &["1", "Alice", "OFF", "ON", "ON", "veg"],
        &["2", "Bob", "ON", "ON", "OFF", "none"],
    ])
}

pub fn only_bob() -> Grid {
    grid(&[
        &["h1", "h1", "h1", "h1", "h1", "h1"],
        &["h2", "h2", "h2", "h2", "h2", "h2"],
        &["2", "Bob", "ON", "ON", "OFF", "none"],
    ])
}

/// Identity gate that signs in and out without a network
#[derive(Default)]
pub struct FakeGate {
    pub fail_initialize: bool,
    pub withhold_token: bool,
    initialized: AtomicBool,
    signed_in: AtomicBool,
    pub disconnects: AtomicUsize,
    listeners: SignedInListeners,
}

impl FakeGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_initialize: true,
            ..Self::default()
        }
    }

    /// Start out already signed in, as with a session restored by the browser
    pub fn signed_in() -> Self {
        let gate = Self::default();
        gate.signed_in.store(true, Ordering::SeqCst);
        gate
    }

    /// Signed in, but the provider hands out no access token
    pub fn signed_in_without_token() -> Self {
        let gate = Self {
            withhold_token: true,
            ..Self::default()
        };
        gate.signed_in.store(true, Ordering::SeqCst);
        gate
    }

    /// Flip the flag from outside, as a provider-side sign-in/out would
    pub fn set_signed_in(&self, value: bool) {
        let previous = self.signed_in.swap(value, Ordering::SeqCst);
        if previous != value {
            self.listeners.notify(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait]
impl IdentityGate for FakeGate {
    async fn initialize(&self, _client_id: &str, _scopes: &[String]) -> Result<()> {
        if self.fail_initialize {
            return Err(Error::auth("identity provider unreachable"));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    fn subscribe(&self, handler: SignedInHandler) -> Subscription {
        self.listeners.subscribe(handler)
    }

    async fn sign_in(&self) -> Result<()> {
        self.set_signed_in(true);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.set_signed_in(false);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn access_token(&self) -> Option<String> {
        if self.withhold_token {
            return None;
        }
        self.is_signed_in().then(|| "fake-token".to_string())
    }
}

struct Entry {
    id: String,
    name: String,
    parent: Option<String>,
    kind: EntryKind,
}

/// Holds the first `get_values` call until released
#[derive(Default)]
pub struct Hold {
    pub started: Notify,
    pub release: Notify,
}

/// In-memory folder tree plus a queue of grids handed out by `get_values`
#[derive(Default)]
pub struct FakeTables {
    entries: Vec<Entry>,
    grids: Mutex<VecDeque<Result<Grid>>>,
    pub hold_first: Option<Arc<Hold>>,
    pub fail_find: bool,
    pub find_calls: AtomicUsize,
    pub value_calls: AtomicUsize,
    pub ranges: Mutex<Vec<String>>,
}

impl FakeTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(mut self, id: &str, name: &str, parent: Option<&str>) -> Self {
        self.entries.push(Entry {
            id: id.to_string(),
            name: name.to_string(),
            parent: parent.map(str::to_string),
            kind: EntryKind::Folder,
        });
        self
    }

    pub fn sheet(mut self, id: &str, name: &str, parent: &str) -> Self {
        self.entries.push(Entry {
            id: id.to_string(),
            name: name.to_string(),
            parent: Some(parent.to_string()),
            kind: EntryKind::Spreadsheet,
        });
        self
    }

    pub fn grid(self, grid: Grid) -> Self {
        self.grids.lock().unwrap().push_back(Ok(grid));
        self
    }

    pub fn values_error(self, error: Error) -> Self {
        self.grids.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn holding_first(mut self, hold: Arc<Hold>) -> Self {
        self.hold_first = Some(hold);
        self
    }

    /// 2024/June/DayWiseSheets with the given sheet names
    pub fn standard_tree(sheets: &[(&str, &str)]) -> Self {
        let mut tables = Self::new()
            .folder("y2024", "2024", None)
            .folder("y2023", "2023", None)
            .folder("june", "June", Some("y2024"))
            .folder("june-2023", "June", Some("y2023"))
            .folder("daywise", "DayWiseSheets", Some("june"));
        for (id, name) in sheets {
            tables = tables.sheet(id, name, "daywise");
        }
        tables
    }
}

#[async_trait]
impl TableService for FakeTables {
    async fn find_entries(&self, access_token: &str, query: &EntryQuery) -> Result<Vec<FileRef>> {
        assert_eq!(access_token, "fake-token");
        assert!(query.trashed_false);
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find {
            return Err(Error::Api {
                status: 500,
                message: "backend error".to_string(),
            });
        }

        Ok(self
            .entries
            .iter()
            .filter(|e| e.kind == query.kind)
            .filter(|e| query.name.as_ref().map_or(true, |n| *n == e.name))
            .filter(|e| query.parent_id.is_none() || query.parent_id == e.parent)
            .map(|e| FileRef::new(&e.id, &e.name))
            .collect())
    }

    async fn get_values(&self, access_token: &str, _spreadsheet_id: &str, range: &str) -> Result<Grid> {
        assert_eq!(access_token, "fake-token");
        let call = self.value_calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push(range.to_string());
        let next = self
            .grids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));

        if call == 0 {
            if let Some(hold) = &self.hold_first {
                hold.started.notify_one();
                hold.release.notified().await;
            }
        }
        next
    }
}
