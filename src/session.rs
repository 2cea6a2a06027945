//! Session controller: sign-in state, today's records and the search box
//!
//! The controller owns every piece of derived state. A sign-in starts the
//! locate → fetch → index pipeline; a sign-out wipes everything. Each pipeline
//! run carries a generation number, and a run whose generation is no longer
//! current when it finishes is dropped without touching state. That covers a
//! sign-out (or sign-out + sign-in) while a fetch is still in flight.

use std::sync::{Arc, PoisonError};

use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, Mutex};

use crate::auth::{IdentityGate, Subscription};
use crate::config::ClientOptions;
use crate::error::{Error, LookupStep, Result};
use crate::fetcher::fetch_range;
use crate::locator::{month_folder_name, SheetLocator};
use crate::records::{PreferenceCard, RecordSet, Row};
use crate::service::TableService;

/// Source of today's date
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Why a signed-in session shows no data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The folder walk found nothing for today
    NoSheetForToday(LookupStep),
    /// Today's sheet exists but has no rows below the header
    SheetEmpty,
    /// Reading today's sheet failed
    FetchFailed(String),
}

/// Controller states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    /// The identity gate could not be set up; nothing works until restart
    Unavailable(String),
    SignedOut,
    Loading,
    Ready,
    Empty(EmptyReason),
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::Loading | Self::Ready | Self::Empty(_))
    }
}

/// Search box state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub term: String,
    pub matches: Vec<Row>,
    pub selected: Option<Row>,
}

/// Snapshot handed to whatever renders the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub state: SessionState,
    pub signed_in: bool,
    pub loading: bool,
    /// Date prefix of today's sheet name
    pub display_date: Option<String>,
    pub term: String,
    /// Names of the current matches, in sheet order
    pub matches: Vec<String>,
    pub selected: Option<PreferenceCard>,
    /// Last human-readable problem, if any
    pub notice: Option<String>,
}

struct Inner {
    state: SessionState,
    generation: u64,
    records: RecordSet,
    search: SearchState,
    display_date: Option<String>,
    notice: Option<String>,
}

impl Inner {
    fn clear(&mut self) {
        self.records = RecordSet::default();
        self.search = SearchState::default();
        self.display_date = None;
    }
}

/// Result of one pipeline run
struct Outcome {
    display_date: Option<String>,
    records: Result<RecordSet>,
}

/// Drives the identity gate and the table pipeline for one user session
pub struct SessionController {
    gate: Arc<dyn IdentityGate>,
    service: Arc<dyn TableService>,
    options: ClientOptions,
    clock: Clock,
    inner: Mutex<Inner>,
    /// Dropping it with the controller unsubscribes from the gate
    subscription: std::sync::Mutex<Option<Subscription>>,
}

impl SessionController {
    pub fn new(
        gate: Arc<dyn IdentityGate>,
        service: Arc<dyn TableService>,
        options: ClientOptions,
    ) -> Self {
        Self {
            gate,
            service,
            options,
            clock: Arc::new(|| Local::now().date_naive()),
            inner: Mutex::new(Inner {
                state: SessionState::Initializing,
                generation: 0,
                records: RecordSet::default(),
                search: SearchState::default(),
                display_date: None,
                notice: None,
            }),
            subscription: std::sync::Mutex::new(None),
        }
    }

    /// Replace the source of today's date
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Set up the identity gate, start listening to it and follow its current state
    ///
    /// A failure leaves the controller [`SessionState::Unavailable`]; there is no retry.
    pub async fn initialize(self: &Arc<Self>) {
        self.inner.lock().await.state = SessionState::Initializing;

        if let Err(e) = self
            .gate
            .initialize(&self.options.client_id, &self.options.scopes)
            .await
        {
            error!("Error initializing identity gate: {}", e);
            let mut inner = self.inner.lock().await;
            inner.state = SessionState::Unavailable(e.to_string());
            inner.notice = Some(e.to_string());
            return;
        }

        self.listen();

        if self.gate.is_signed_in() {
            self.follow_gate().await;
        } else {
            let mut inner = self.inner.lock().await;
            if inner.state == SessionState::Initializing {
                inner.state = SessionState::SignedOut;
            }
        }
    }

    /// Forward gate notifications to [`Self::on_signed_in_change`]
    fn listen(self: &Arc<Self>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = self.gate.subscribe(Box::new(move |signed_in| {
            let _ = tx.send(signed_in);
        }));

        // Replacing the handle drops any earlier subscription.
        *self.subscription.lock().unwrap_or_else(PoisonError::into_inner) = Some(subscription);

        let controller = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(signed_in) = rx.recv().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                controller.on_signed_in_change(signed_in).await;
            }
            debug!("Signed-in listener finished");
        });
    }

    /// React to a gate notification
    ///
    /// The flag is only logged: the gate is asked again, so late or duplicate
    /// notifications cannot move the controller into a state the gate is not in.
    pub async fn on_signed_in_change(&self, notified: bool) {
        debug!("Signed-in change notified: {}", notified);
        self.follow_gate().await;
    }

    async fn follow_gate(&self) {
        if self.gate.is_signed_in() {
            let generation = {
                let mut inner = self.inner.lock().await;
                if !matches!(inner.state, SessionState::SignedOut | SessionState::Initializing) {
                    return;
                }
                inner.generation += 1;
                inner.clear();
                inner.notice = None;
                inner.state = SessionState::Loading;
                inner.generation
            };
            self.run_pipeline(generation).await;
        } else {
            let mut inner = self.inner.lock().await;
            if inner.state.is_signed_in() {
                info!("Signed out by the identity gate");
                inner.generation += 1;
                inner.clear();
                inner.notice = None;
                inner.state = SessionState::SignedOut;
            }
        }
    }

    /// Ask the gate to sign in, then follow its state
    pub async fn sign_in(&self) {
        if !self.gate.is_initialized() {
            error!("Identity gate not initialized");
            self.inner.lock().await.notice = Some(Error::auth("identity gate not initialized").to_string());
            return;
        }

        if let Err(e) = self.gate.sign_in().await {
            error!("Error signing in: {}", e);
            self.inner.lock().await.notice = Some(e.to_string());
        }
        self.follow_gate().await;
    }

    /// Clear all derived state, sign out and drop cached consent
    pub async fn sign_out(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            inner.clear();
            inner.notice = None;
            if !matches!(inner.state, SessionState::Unavailable(_)) {
                inner.state = SessionState::SignedOut;
            }
        }

        if !self.gate.is_initialized() {
            error!("Identity gate not initialized");
            return;
        }

        if let Err(e) = self.gate.sign_out().await {
            error!("Error signing out: {}", e);
            self.inner.lock().await.notice = Some(e.to_string());
        }
        if let Err(e) = self.gate.disconnect().await {
            warn!("Error dropping consent: {}", e);
            self.inner.lock().await.notice = Some(e.to_string());
        }
    }

    async fn run_pipeline(&self, generation: u64) {
        let today = (self.clock)();
        debug!("Pipeline generation {} started for {}", generation, today);

        let outcome = self.load(today).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation || inner.state != SessionState::Loading {
            debug!(
                "Discarding pipeline generation {} (current {}, state {:?})",
                generation, inner.generation, inner.state
            );
            return;
        }

        inner.display_date = outcome.display_date;
        match outcome.records {
            Ok(records) => {
                info!("Loaded {} record(s)", records.len());
                inner.records = records;
                inner.state = SessionState::Ready;
            }
            Err(e) => {
                let state = match &e {
                    Error::Auth(_) => {
                        error!("Pipeline lost authorization: {}", e);
                        SessionState::SignedOut
                    }
                    Error::NotFound(step) => SessionState::Empty(EmptyReason::NoSheetForToday(*step)),
                    Error::EmptyResult => SessionState::Empty(EmptyReason::SheetEmpty),
                    other => {
                        error!("Error fetching today's sheet: {}", other);
                        SessionState::Empty(EmptyReason::FetchFailed(other.to_string()))
                    }
                };
                if state == SessionState::SignedOut {
                    inner.clear();
                }
                inner.records = RecordSet::default();
                inner.notice = Some(e.to_string());
                inner.state = state;
            }
        }
    }

    async fn load(&self, today: NaiveDate) -> Outcome {
        let Some(token) = self.gate.access_token() else {
            return Outcome {
                display_date: None,
                records: Err(Error::auth("no access token")),
            };
        };

        let month = self
            .options
            .month_folder
            .clone()
            .unwrap_or_else(|| month_folder_name(today));
        let locator = SheetLocator::new(self.service.as_ref())
            .with_day_wise_folder(&self.options.day_wise_folder);

        let sheet = match locator.locate_today_sheet(&token, &month, today).await {
            Ok(sheet) => sheet,
            Err(e) => {
                return Outcome {
                    display_date: None,
                    records: Err(e),
                }
            }
        };

        let records = fetch_range(self.service.as_ref(), &token, &sheet.id, &sheet.name)
            .await
            .map(RecordSet::from_grid)
            .and_then(|records| {
                if records.is_empty() {
                    Err(Error::EmptyResult)
                } else {
                    Ok(records)
                }
            });

        Outcome {
            display_date: Some(sheet.display_date().to_string()),
            records,
        }
    }

    /// Update the search term; a new search clears the selection
    pub async fn search(&self, term: &str) -> Vec<Row> {
        let mut inner = self.inner.lock().await;
        let matches = inner.records.search(term);
        inner.search = SearchState {
            term: term.to_string(),
            matches: matches.clone(),
            selected: None,
        };
        matches
    }

    /// Select the match at `index`; the term becomes the selected name
    pub async fn select(&self, index: usize) -> Option<PreferenceCard> {
        let mut inner = self.inner.lock().await;
        let row = inner.search.matches.get(index).cloned()?;
        inner.search.term = row.name().unwrap_or_default().to_string();
        inner.search.matches.clear();
        let card = row.card();
        inner.search.selected = Some(row);
        Some(card)
    }

    pub async fn clear_selection(&self) {
        self.inner.lock().await.search.selected = None;
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    /// Today's records
    pub async fn records(&self) -> RecordSet {
        self.inner.lock().await.records.clone()
    }

    pub async fn search_state(&self) -> SearchState {
        self.inner.lock().await.search.clone()
    }

    pub async fn view(&self) -> SessionView {
        let inner = self.inner.lock().await;
        SessionView {
            state: inner.state.clone(),
            signed_in: inner.state.is_signed_in(),
            loading: inner.state == SessionState::Loading,
            display_date: inner.display_date.clone(),
            term: inner.search.term.clone(),
            matches: inner
                .search
                .matches
                .iter()
                .map(|row| row.name().unwrap_or_default().to_string())
                .collect(),
            selected: inner.search.selected.as_ref().map(Row::card),
            notice: inner.notice.clone(),
        }
    }
}
