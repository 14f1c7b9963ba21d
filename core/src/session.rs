//! The dashboard session, sole owner of the working set.
//!
//! RULES:
//!   - Only the session mutates the working set.
//!   - Every mutation is persisted to the snapshot and logged as an event.
//!   - Every score change goes through EmployeeRecord::set_stress_score,
//!     so a record's level never disagrees with its score.
//!   - All randomness flows through the session's RngBank.
//!   - Remote collaborators never hold a reference to the working set.

use crate::{
    config::DashboardConfig,
    demo::DemoRoster,
    employee::EmployeeRecord,
    error::{MindError, MindResult},
    event::{DashboardEvent, EventLogEntry, IngestSource},
    ingest::RecordIngestor,
    notification::{SwapConfirmation, SwapDispatcher, SwapNotification},
    planner::{OptimizationPlanner, OptimizationSummary, SwapProposal},
    remote::{Prediction, RemoteClient},
    rng::{RngBank, StreamRng, StreamSlot},
    scoring::{StressLevel, StressScorer},
    stats::{self, AnalyticsCards, DepartmentStats, HomeCounters, StressDistribution, TrendPoint},
    store::{now_rfc3339, DashboardStore},
    swap::SwapExecutor,
    types::{RawRow, SessionId},
    working_set::WorkingSet,
};

pub const WELCOMED_FLAG: &str = "welcomed";

/// A fresh random session id, for callers that do not supply one.
pub fn new_session_id() -> SessionId {
    uuid::Uuid::new_v4().to_string()
}

/// What a successful swap hands back to the caller.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub notification: SwapNotification,
    pub confirmation: SwapConfirmation,
    /// The high-stress side after the swap.
    pub staff:        EmployeeRecord,
    /// The healthy side after the swap.
    pub swap_with:    EmployeeRecord,
}

pub struct DashboardSession {
    pub session_id: SessionId,
    pub store:      DashboardStore,
    config:         DashboardConfig,
    rng_bank:       RngBank,
    ingestor:       RecordIngestor,
    working_set:    WorkingSet,
    event_seq:      u64,
    ingest_draws:   u64,
    trend_draws:    u64,
}

impl DashboardSession {
    /// Open a session over a migrated store. The working set starts empty;
    /// call `load_or_seed` to populate it.
    pub fn open(
        session_id: SessionId,
        seed: u64,
        config: DashboardConfig,
        store: DashboardStore,
    ) -> MindResult<Self> {
        config.validate()?;
        let scorer = StressScorer::new(config.scoring.clone());
        let mut session = Self {
            session_id: session_id.clone(),
            store,
            config,
            rng_bank: RngBank::new(seed),
            ingestor: RecordIngestor::new(scorer),
            working_set: WorkingSet::default(),
            event_seq: 0,
            ingest_draws: 0,
            trend_draws: 0,
        };
        log::info!("Session {session_id} opened (seed {})", session.rng_bank.master_seed());
        session.emit(DashboardEvent::SessionOpened { session_id, seed })?;
        Ok(session)
    }

    /// In-memory store with test config. Used by tests only.
    pub fn build_test(session_id: SessionId, seed: u64) -> MindResult<Self> {
        let store = DashboardStore::in_memory()?;
        store.migrate()?;
        Self::open(session_id, seed, DashboardConfig::default_test(), store)
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn scorer(&self) -> &StressScorer {
        self.ingestor.scorer()
    }

    pub fn records(&self) -> &[EmployeeRecord] {
        self.working_set.records()
    }

    pub fn find(&self, employee_id: &str) -> Option<&EmployeeRecord> {
        self.working_set.find(employee_id)
    }

    // ── Loading ────────────────────────────────────────────────

    /// Read the stored snapshot; fall back to a demo roster when nothing is
    /// stored or the stored blob cannot be read.
    pub fn load_or_seed(&mut self) -> MindResult<()> {
        let key = self.config.store.snapshot_key.clone();
        match self.store.load_working_set(&key) {
            Ok(Some(records)) => {
                let count = records.len();
                self.install(records);
                log::info!("Loaded {count} records from snapshot '{key}'");
                self.emit(DashboardEvent::SnapshotLoaded { count })
            }
            Ok(None) => {
                self.seed_demo()?;
                Ok(())
            }
            Err(MindError::Serialization(e)) => {
                log::warn!("Snapshot '{key}' unreadable, using demo data: {e}");
                self.emit(DashboardEvent::SnapshotUnreadable { reason: e.to_string() })?;
                self.seed_demo()?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the working set with a freshly generated demo roster.
    pub fn seed_demo(&mut self) -> MindResult<usize> {
        let mut rng = self.rng_bank.for_slot(StreamSlot::Demo, 0);
        log::debug!("Generating demo roster from stream '{}'", rng.name);
        let rows = DemoRoster::generate(&mut rng);
        let records = self.ingestor.ingest(&rows, &mut rng);
        let count = records.len();
        self.working_set.replace(records);
        self.persist()?;
        log::info!("Seeded {count} demo records");
        self.emit(DashboardEvent::DemoDataGenerated { count })?;
        Ok(count)
    }

    /// Re-read the snapshot written by any context. Returns true when the
    /// working set was replaced. An unreadable snapshot keeps the current set.
    pub fn refresh_from_store(&mut self) -> MindResult<bool> {
        let key = self.config.store.snapshot_key.clone();
        match self.store.load_working_set(&key) {
            Ok(Some(records)) => {
                let count = records.len();
                self.install(records);
                log::debug!("Refreshed {count} records from snapshot");
                self.emit(DashboardEvent::SnapshotRefreshed { count })?;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(MindError::Serialization(e)) => {
                log::warn!("Error refreshing data: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Stored levels are not trusted: reclassify from the stored scores.
    fn install(&mut self, mut records: Vec<EmployeeRecord>) {
        let scorer = self.ingestor.scorer();
        for r in &mut records {
            let score = r.stress_score();
            r.set_stress_score(score, scorer);
        }
        self.working_set.replace(records);
    }

    // ── Ingest ─────────────────────────────────────────────────

    /// Parse and ingest delimited text. On any parse failure the working
    /// set is left exactly as it was.
    pub fn ingest_delimited(&mut self, text: &str) -> MindResult<usize> {
        let mut rng = self.next_ingest_rng();
        match self.ingestor.ingest_delimited(text, &mut rng) {
            Ok(records) => self.commit_ingest(records, IngestSource::Delimited),
            Err(e) => {
                log::warn!("Analysis failed: {e}");
                self.emit(DashboardEvent::IngestRejected {
                    source: IngestSource::Delimited,
                    reason: e.to_string(),
                })?;
                Err(e)
            }
        }
    }

    /// Ingest already-parsed rows (remote payloads, IPC).
    pub fn ingest_rows(&mut self, rows: &[RawRow], source: IngestSource) -> MindResult<usize> {
        let mut rng = self.next_ingest_rng();
        let records = self.ingestor.ingest(rows, &mut rng);
        self.commit_ingest(records, source)
    }

    /// Fetch rows from a remote data endpoint and ingest them. A failed
    /// fetch leaves the working set untouched and is returned to the caller.
    pub async fn ingest_remote(
        &mut self,
        client: &RemoteClient,
        url: &str,
        api_key: Option<&str>,
    ) -> MindResult<usize> {
        match client.fetch_employees(url, api_key).await {
            Ok(rows) => self.ingest_rows(&rows, IngestSource::RemoteApi),
            Err(e) => {
                log::warn!("API connection error: {e}");
                self.emit(DashboardEvent::IngestRejected {
                    source: IngestSource::RemoteApi,
                    reason: e.to_string(),
                })?;
                Err(e)
            }
        }
    }

    fn next_ingest_rng(&mut self) -> StreamRng {
        let rng = self.rng_bank.for_slot(StreamSlot::Ingest, self.ingest_draws);
        self.ingest_draws += 1;
        rng
    }

    fn commit_ingest(&mut self, records: Vec<EmployeeRecord>, source: IngestSource) -> MindResult<usize> {
        let count = records.len();
        self.working_set.replace(records);
        self.persist()?;
        let set = &self.working_set;
        let event = DashboardEvent::DataIngested {
            source,
            count,
            critical: set.count_level(StressLevel::Critical),
            warning: set.count_level(StressLevel::Warning),
            healthy: set.count_level(StressLevel::Healthy),
        };
        log::info!("Processed {count} employees ({source:?})");
        self.emit(event)?;
        Ok(count)
    }

    // ── Remote prediction ──────────────────────────────────────

    /// Overwrite scores for every prediction whose id is in the working set.
    /// Returns how many records changed.
    pub fn apply_predictions(&mut self, predictions: &[Prediction]) -> MindResult<usize> {
        let scorer = self.ingestor.scorer().clone();
        let mut matched = 0;
        for record in self.working_set.iter_mut() {
            if let Some(p) = predictions.iter().find(|p| p.employee_id == record.employee_id) {
                record.set_stress_score(p.stress_score, &scorer);
                matched += 1;
            }
        }
        if matched > 0 {
            self.persist()?;
        }
        self.emit(DashboardEvent::PredictionsApplied {
            matched,
            received: predictions.len(),
        })?;
        Ok(matched)
    }

    /// Ask the prediction endpoint for scores. Any remote failure keeps the
    /// current scores and is only logged.
    pub async fn predict_with(&mut self, client: &RemoteClient) -> MindResult<usize> {
        match client.predict(self.working_set.records()).await {
            Ok(predictions) => self.apply_predictions(&predictions),
            Err(e) if e.is_remote() => {
                log::warn!("Backend prediction unavailable, keeping local scores: {e}");
                self.emit(DashboardEvent::PredictionsSkipped { reason: e.to_string() })?;
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    // ── Optimization ───────────────────────────────────────────

    pub fn plan(&self) -> Vec<SwapProposal> {
        OptimizationPlanner::plan(self.records())
    }

    pub fn optimization_summary(&self) -> OptimizationSummary {
        OptimizationPlanner::summarize(&self.plan(), self.records())
    }

    /// Apply a swap between `staff_id` (high-stress side) and `swap_with_id`.
    /// Unknown or identical ids fail with no mutation. The notification is
    /// composed from the pre-swap records and handed to `dispatcher`.
    /// Once the records are swapped, a storage failure is logged and the
    /// swap still succeeds.
    pub fn apply_swap(
        &mut self,
        staff_id: &str,
        swap_with_id: &str,
        dispatcher: &dyn SwapDispatcher,
    ) -> MindResult<SwapOutcome> {
        let (high, low) = match self.working_set.pair_mut(staff_id, swap_with_id) {
            Ok((h, l)) => (h.clone(), l.clone()),
            Err(e) => {
                log::warn!("Swap failed: {e}");
                self.emit(DashboardEvent::SwapRejected {
                    staff_id: staff_id.to_string(),
                    swap_with_id: swap_with_id.to_string(),
                    reason: e.to_string(),
                })?;
                return Err(e);
            }
        };

        let now = chrono::Utc::now();
        let notification =
            SwapNotification::compose(&self.config.planner.notification_sender, &high, &low, now);
        let confirmation = SwapConfirmation::new(staff_id, swap_with_id, now);

        let scorer = self.ingestor.scorer().clone();
        let executor = SwapExecutor::new(&scorer, self.config.planner.swap_stress_decrement);
        let (staff, swap_with) = {
            let (h, l) = self.working_set.pair_mut(staff_id, swap_with_id)?;
            executor.apply(h, l);
            (h.clone(), l.clone())
        };

        // Records are swapped past this point.
        if let Err(e) = self.persist() {
            log::warn!("Swap applied but snapshot not saved: {e}");
        }
        let applied = DashboardEvent::SwapApplied {
            staff_id: staff_id.to_string(),
            swap_with_id: swap_with_id.to_string(),
            new_stress: staff.stress_score(),
        };
        if let Err(e) = self.emit(applied) {
            log::warn!("Swap applied but event not logged: {e}");
        }
        log::info!("{} has been notified about the swap request", notification.to);

        dispatcher.dispatch(&notification, &confirmation);

        Ok(SwapOutcome { notification, confirmation, staff, swap_with })
    }

    // ── Statistics ─────────────────────────────────────────────

    pub fn analytics(&self) -> AnalyticsCards {
        stats::analytics_cards(self.records())
    }

    pub fn ranked_by_stress(&self) -> Vec<&EmployeeRecord> {
        stats::ranked_by_stress(self.records())
    }

    pub fn distribution(&self) -> StressDistribution {
        stats::distribution(self.records())
    }

    pub fn department_stats(&self) -> Vec<DepartmentStats> {
        stats::department_stats(self.records())
    }

    pub fn home_counters(&self) -> HomeCounters {
        stats::home_counters(self.records())
    }

    pub fn weekly_trend(&mut self) -> Vec<TrendPoint> {
        let mut rng = self.rng_bank.for_slot(StreamSlot::Trend, self.trend_draws);
        self.trend_draws += 1;
        stats::weekly_trend(self.working_set.records(), &mut rng)
    }

    // ── Session flags ──────────────────────────────────────────

    /// True exactly once per session id.
    pub fn first_visit(&mut self) -> MindResult<bool> {
        if self.store.session_flag(&self.session_id, WELCOMED_FLAG)?.is_some() {
            return Ok(false);
        }
        self.store.set_session_flag(&self.session_id, WELCOMED_FLAG, "true")?;
        Ok(true)
    }

    // ── Internals ──────────────────────────────────────────────

    fn persist(&self) -> MindResult<()> {
        self.store
            .save_working_set(&self.config.store.snapshot_key, self.working_set.records())
    }

    fn emit(&mut self, event: DashboardEvent) -> MindResult<()> {
        self.event_seq += 1;
        let entry = EventLogEntry {
            id:         None,
            session_id: self.session_id.clone(),
            seq:        self.event_seq,
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(&event)?,
            created_at: now_rfc3339(),
        };
        self.store.append_event(&entry)
    }
}
