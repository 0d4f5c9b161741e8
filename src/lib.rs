pub mod config;
pub mod date_util;
pub mod error;
pub mod metrics;
pub mod model;
pub mod query;
pub mod report;
pub mod storage;
pub mod survey;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use metrics::{BreakdownItem, KpiId, KpiResult};
pub use query::period::{resolve_window, Granularity, ReportingWindow};
pub use query::source::{IndicatorSource, MemoryStore};
pub use report::IndicatorReport;
pub use storage::repository::StoreCounts;
pub use storage::Database;

use chrono::NaiveDateTime;

use storage::repository;

/// Summary of a snapshot import.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ImportReport {
    pub users: usize,
    pub equipment: usize,
    pub work_orders: usize,
    pub surveys: usize,
    /// Records stored without their missing equipment or user reference.
    pub unlinked: usize,
}

/// Main entry point for the maintenance indicator engine.
pub struct IndicatorEngine {
    db: Database,
}

impl IndicatorEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Indicators ─────────────────────────────────────────────────

    /// Compute every indicator as of `now`. The raw survey listing is
    /// included only when the caller has already decided it is privileged.
    pub async fn indicators(
        &self,
        now: NaiveDateTime,
        privileged: bool,
    ) -> Result<IndicatorReport> {
        report::build_report(&self.db, now, privileged).await
    }

    /// Compute one indicator, over `window` when given.
    pub async fn indicator(
        &self,
        kpi: KpiId,
        now: NaiveDateTime,
        window: Option<ReportingWindow>,
    ) -> Result<KpiResult> {
        report::build_kpi(&self.db, kpi, now, window).await
    }

    // ── Data loading ───────────────────────────────────────────────

    /// Load a snapshot into the store in a single transaction. Records are
    /// upserted by id, so importing the same snapshot twice is harmless.
    /// Work orders and surveys pointing at equipment or users missing from
    /// both the snapshot and the store are stored unlinked, with a warning.
    pub async fn import(&self, snapshot: MemoryStore) -> Result<ImportReport> {
        let report = self
            .db
            .writer()
            .call(move |conn| {
                let tx = conn.transaction()?;
                for user in &snapshot.users {
                    repository::upsert_user(&tx, user)?;
                }
                for equipment in &snapshot.equipment {
                    repository::upsert_equipment(&tx, equipment)?;
                }
                let mut unlinked = 0;
                for order in &snapshot.work_orders {
                    let closed = order.closed_at.is_some();
                    if closed != (order.state == model::WorkOrderState::Completed) {
                        log::warn!(
                            "Work order {} is {} but closure time is {}",
                            order.id,
                            order.state.as_str(),
                            if closed { "set" } else { "missing" }
                        );
                    }
                    let mut order = order.clone();
                    if let Some(equipment_id) = order.equipment_id {
                        if !repository::equipment_exists(&tx, equipment_id)? {
                            log::warn!(
                                "Work order {} references unknown equipment {equipment_id}; \
                                 storing it unlinked",
                                order.id
                            );
                            order.equipment_id = None;
                            unlinked += 1;
                        }
                    }
                    repository::upsert_work_order(&tx, &order)?;
                }
                for survey in &snapshot.surveys {
                    let mut survey = survey.clone();
                    if let Some(user_id) = survey.user_id {
                        if !repository::user_exists(&tx, user_id)? {
                            log::warn!(
                                "Survey {} references unknown user {user_id}; \
                                 storing it without a responder",
                                survey.id
                            );
                            survey.user_id = None;
                            unlinked += 1;
                        }
                    }
                    repository::upsert_survey_record(&tx, &survey)?;
                }
                tx.commit()?;
                Ok::<ImportReport, rusqlite::Error>(ImportReport {
                    users: snapshot.users.len(),
                    equipment: snapshot.equipment.len(),
                    work_orders: snapshot.work_orders.len(),
                    surveys: snapshot.surveys.len(),
                    unlinked,
                })
            })
            .await?;
        log::info!(
            "Imported {} users, {} equipment, {} work orders, {} surveys ({} unlinked)",
            report.users,
            report.equipment,
            report.work_orders,
            report.surveys,
            report.unlinked
        );
        Ok(report)
    }

    pub async fn status(&self) -> Result<StoreCounts> {
        self.db
            .reader()
            .call(|conn| repository::store_counts(conn))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ── Config commands ────────────────────────────────────────────

    pub async fn config_get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .reader()
            .call({
                let key = key.to_string();
                move |conn| repository::get_config(conn, &key)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn config_set(&self, key: &str, value: &str) -> Result<()> {
        config::validate_config_value(key, value)?;
        self.db
            .writer()
            .call({
                let key = key.to_string();
                let value = value.trim().to_string();
                move |conn| repository::set_config(conn, &key, &value)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn config_list(&self) -> Result<Vec<(String, String)>> {
        self.db
            .reader()
            .call(|conn| repository::list_config(conn))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
