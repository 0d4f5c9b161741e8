//! Records read by the indicator engine. The engine never mutates them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::date_util::parse_timestamp;
use crate::error::{Error, Result};

/// Work order category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkOrderKind {
    Preventive,
    General,
    Intervention,
}

impl WorkOrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderKind::Preventive => "preventive",
            WorkOrderKind::General => "general",
            WorkOrderKind::Intervention => "intervention",
        }
    }
}

impl std::str::FromStr for WorkOrderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "preventive" => Ok(WorkOrderKind::Preventive),
            "general" => Ok(WorkOrderKind::General),
            "intervention" => Ok(WorkOrderKind::Intervention),
            other => Err(Error::Other(format!("unknown work order kind: {other}"))),
        }
    }
}

/// Work order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderState {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkOrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderState::Pending => "pending",
            WorkOrderState::InProgress => "in_progress",
            WorkOrderState::Completed => "completed",
            WorkOrderState::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for WorkOrderState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(WorkOrderState::Pending),
            "in_progress" => Ok(WorkOrderState::InProgress),
            "completed" => Ok(WorkOrderState::Completed),
            "cancelled" | "canceled" => Ok(WorkOrderState::Cancelled),
            other => Err(Error::Other(format!("unknown work order state: {other}"))),
        }
    }
}

/// A work order. Timestamps are optional so that rows with missing or
/// unparseable values can still be carried and skipped per metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: i64,
    pub equipment_id: Option<i64>,
    pub kind: WorkOrderKind,
    pub state: WorkOrderState,
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub closed_at: Option<NaiveDateTime>,
}

/// A work order as text columns, the shape both the store rows and snapshot
/// files carry before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkOrder {
    pub id: i64,
    #[serde(default)]
    pub equipment_id: Option<i64>,
    pub kind: String,
    pub state: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
}

impl RawWorkOrder {
    /// Fails on an unknown kind or state. Unparseable timestamps become `None`.
    pub fn into_work_order(self) -> Result<WorkOrder> {
        Ok(WorkOrder {
            id: self.id,
            equipment_id: self.equipment_id,
            kind: self.kind.parse()?,
            state: self.state.parse()?,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            closed_at: self.closed_at.as_deref().and_then(parse_timestamp),
        })
    }
}

/// Validate raw rows, skipping the ones with an unknown kind or state.
pub fn valid_work_orders(rows: impl IntoIterator<Item = RawWorkOrder>) -> Vec<WorkOrder> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            row.into_work_order()
                .inspect_err(|e| log::warn!("Skipping work order {id}: {e}"))
                .ok()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub client: Option<String>,
    pub operational: bool,
    #[serde(default)]
    pub next_maintenance: Option<NaiveDate>,
}

/// Equipment with a scheduled maintenance, joined with the closure time of
/// its most recently closed completed preventive order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMaintenance {
    pub equipment_id: i64,
    pub next_maintenance: NaiveDate,
    pub last_preventive_closed_at: Option<NaiveDateTime>,
}

/// Total score threshold at which a survey counts as positive.
pub const POSITIVE_SCORE_THRESHOLD: u32 = 20;

/// Survey fields needed for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Survey {
    pub id: i64,
    pub responded_at: Option<NaiveDateTime>,
    pub total_score: u32,
    pub positive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Responder {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A survey as shown in the privileged listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyEntry {
    pub id: i64,
    pub responded_at: Option<NaiveDateTime>,
    pub total_score: u32,
    pub positive: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub responder: Option<Responder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A stored survey response as it appears in an imported snapshot. The
/// positivity flag is always derived from the total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub responded_at: Option<NaiveDateTime>,
    pub total_score: u32,
    #[serde(default)]
    pub comment: Option<String>,
}

impl SurveyRecord {
    pub fn positive(&self) -> bool {
        self.total_score >= POSITIVE_SCORE_THRESHOLD
    }
}
