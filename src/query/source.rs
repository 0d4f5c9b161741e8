use std::collections::HashMap;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::model::{
    valid_work_orders, Equipment, PlannedMaintenance, RawWorkOrder, Responder, Survey,
    SurveyEntry, SurveyRecord, User, WorkOrder, WorkOrderKind, WorkOrderState,
};
use crate::query::period::ReportingWindow;
use crate::storage::repository;

/// Read-only queries the indicator engine needs from a data store.
pub trait IndicatorSource {
    /// Work orders whose creation timestamp lies in `window`.
    fn work_orders_created_in(&self, window: &ReportingWindow) -> Result<Vec<WorkOrder>>;

    /// Work orders in `state` whose closure timestamp lies in `window`.
    fn work_orders_closed_in(
        &self,
        window: &ReportingWindow,
        state: WorkOrderState,
    ) -> Result<Vec<WorkOrder>>;

    /// Equipment due for maintenance in `window`, joined with its latest
    /// closed completed preventive order.
    fn maintenance_due_in(&self, window: &ReportingWindow) -> Result<Vec<PlannedMaintenance>>;

    /// Equipment count, optionally filtered by operational flag.
    fn count_equipment(&self, operational: Option<bool>) -> Result<u64>;

    /// Surveys answered in `window`, optionally filtered by positivity.
    fn surveys_in(&self, window: &ReportingWindow, positive: Option<bool>) -> Result<Vec<Survey>>;

    /// Every survey with comment and responder, most recent first.
    fn survey_entries(&self) -> Result<Vec<SurveyEntry>>;
}

impl IndicatorSource for Connection {
    fn work_orders_created_in(&self, window: &ReportingWindow) -> Result<Vec<WorkOrder>> {
        Ok(repository::list_work_orders_created_between(
            self,
            window.start,
            window.end,
        )?)
    }

    fn work_orders_closed_in(
        &self,
        window: &ReportingWindow,
        state: WorkOrderState,
    ) -> Result<Vec<WorkOrder>> {
        Ok(repository::list_work_orders_closed_between(
            self,
            window.start,
            window.end,
            state,
        )?)
    }

    fn maintenance_due_in(&self, window: &ReportingWindow) -> Result<Vec<PlannedMaintenance>> {
        Ok(repository::list_maintenance_due_between(
            self,
            window.start.date(),
            window.end.date(),
        )?)
    }

    fn count_equipment(&self, operational: Option<bool>) -> Result<u64> {
        Ok(repository::count_equipment(self, operational)?)
    }

    fn surveys_in(&self, window: &ReportingWindow, positive: Option<bool>) -> Result<Vec<Survey>> {
        Ok(repository::list_surveys_between(
            self,
            window.start,
            window.end,
            positive,
        )?)
    }

    fn survey_entries(&self) -> Result<Vec<SurveyEntry>> {
        Ok(repository::list_survey_entries(self)?)
    }
}

/// An in-memory snapshot of the back office records. Deserializes from the
/// JSON accepted by `maintkpi import`. Work orders are validated like store
/// rows: an unknown kind or state skips the order with a warning and an
/// unparseable timestamp loads as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default, deserialize_with = "deserialize_work_orders")]
    pub work_orders: Vec<WorkOrder>,
    #[serde(default)]
    pub surveys: Vec<SurveyRecord>,
}

fn deserialize_work_orders<'de, D>(deserializer: D) -> std::result::Result<Vec<WorkOrder>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Vec::<RawWorkOrder>::deserialize(deserializer)?;
    Ok(valid_work_orders(rows))
}

impl MemoryStore {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Latest closed completed preventive order per equipment, built in one
    /// pass over the work orders.
    fn latest_preventive_closures(&self) -> HashMap<i64, NaiveDateTime> {
        let mut latest: HashMap<i64, NaiveDateTime> = HashMap::new();
        for order in &self.work_orders {
            if order.kind != WorkOrderKind::Preventive || order.state != WorkOrderState::Completed {
                continue;
            }
            let (Some(equipment_id), Some(closed_at)) = (order.equipment_id, order.closed_at) else {
                continue;
            };
            latest
                .entry(equipment_id)
                .and_modify(|t| {
                    if closed_at > *t {
                        *t = closed_at;
                    }
                })
                .or_insert(closed_at);
        }
        latest
    }

    fn responder(&self, user_id: Option<i64>) -> Option<Responder> {
        let user_id = user_id?;
        self.users.iter().find(|u| u.id == user_id).map(|u| Responder {
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
        })
    }
}

impl IndicatorSource for MemoryStore {
    fn work_orders_created_in(&self, window: &ReportingWindow) -> Result<Vec<WorkOrder>> {
        Ok(self
            .work_orders
            .iter()
            .filter(|o| o.created_at.is_some_and(|t| window.contains(t)))
            .cloned()
            .collect())
    }

    fn work_orders_closed_in(
        &self,
        window: &ReportingWindow,
        state: WorkOrderState,
    ) -> Result<Vec<WorkOrder>> {
        Ok(self
            .work_orders
            .iter()
            .filter(|o| o.state == state)
            .filter(|o| o.closed_at.is_some_and(|t| window.contains(t)))
            .cloned()
            .collect())
    }

    fn maintenance_due_in(&self, window: &ReportingWindow) -> Result<Vec<PlannedMaintenance>> {
        let latest = self.latest_preventive_closures();
        Ok(self
            .equipment
            .iter()
            .filter_map(|e| {
                let next_maintenance = e.next_maintenance.filter(|d| window.contains_date(*d))?;
                Some(PlannedMaintenance {
                    equipment_id: e.id,
                    next_maintenance,
                    last_preventive_closed_at: latest.get(&e.id).copied(),
                })
            })
            .collect())
    }

    fn count_equipment(&self, operational: Option<bool>) -> Result<u64> {
        Ok(self
            .equipment
            .iter()
            .filter(|e| operational.is_none_or(|flag| e.operational == flag))
            .count() as u64)
    }

    fn surveys_in(&self, window: &ReportingWindow, positive: Option<bool>) -> Result<Vec<Survey>> {
        Ok(self
            .surveys
            .iter()
            .filter(|s| s.responded_at.is_some_and(|t| window.contains(t)))
            .filter(|s| positive.is_none_or(|flag| s.positive() == flag))
            .map(|s| Survey {
                id: s.id,
                responded_at: s.responded_at,
                total_score: s.total_score,
                positive: s.positive(),
            })
            .collect())
    }

    fn survey_entries(&self) -> Result<Vec<SurveyEntry>> {
        let mut entries: Vec<SurveyEntry> = self
            .surveys
            .iter()
            .map(|s| SurveyEntry {
                id: s.id,
                responded_at: s.responded_at,
                total_score: s.total_score,
                positive: s.positive(),
                comment: s.comment.clone(),
                responder: self.responder(s.user_id),
            })
            .collect();
        // Most recent first; undated entries sort last.
        entries.sort_by_key(|e| std::cmp::Reverse((e.responded_at, e.id)));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_util::{parse_date, parse_timestamp};

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn test_memory_store_from_json() {
        let store = MemoryStore::from_json(
            r#"{
                "users": [{"id": 1, "first_name": "Ana", "last_name": "Rojas",
                           "email": "ana@example.com"}],
                "equipment": [{"id": 10, "name": "Compressor", "operational": true,
                               "next_maintenance": "2025-05-01"}],
                "work_orders": [
                    {"id": 1, "equipment_id": 10, "kind": "preventive", "state": "completed",
                     "created_at": "2025-04-01T08:00:00", "closed_at": "2025-04-20T12:00:00"},
                    {"id": 2, "equipment_id": 10, "kind": "general", "state": "in_progress",
                     "created_at": null}
                ],
                "surveys": [{"id": 5, "user_id": 1, "responded_at": "2025-06-01T10:00:00",
                             "total_score": 21}]
            }"#,
        )
        .unwrap();

        assert_eq!(store.work_orders.len(), 2);
        assert_eq!(store.work_orders[1].created_at, None);
        assert_eq!(
            store.equipment[0].next_maintenance,
            parse_date("2025-05-01")
        );

        let entries = store.survey_entries().unwrap();
        assert!(entries[0].positive);
        assert_eq!(entries[0].responder.as_ref().unwrap().first_name, "Ana");
    }

    #[test]
    fn test_memory_store_skips_invalid_work_orders() {
        let store = MemoryStore::from_json(
            r#"{"work_orders": [
                {"id": 1, "kind": "mystery", "state": "pending", "created_at": null},
                {"id": 2, "kind": "general", "state": "archived"},
                {"id": 3, "kind": "General", "state": "in-progress",
                 "created_at": "2025-04-01 08:00:00"},
                {"id": 4, "kind": "intervention", "state": "completed",
                 "created_at": "yesterday", "closed_at": "2025-04-02T08:00:00"}
            ]}"#,
        )
        .unwrap();

        let ids: Vec<i64> = store.work_orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(store.work_orders[0].state, WorkOrderState::InProgress);
        assert_eq!(
            store.work_orders[0].created_at,
            Some(ts("2025-04-01T08:00:00"))
        );
        assert_eq!(store.work_orders[1].created_at, None);
        assert_eq!(
            store.work_orders[1].closed_at,
            Some(ts("2025-04-02T08:00:00"))
        );
    }

    #[test]
    fn test_memory_store_rejects_malformed_json() {
        let missing_id = r#"{"work_orders": [{"kind": "general"}]}"#;
        assert!(MemoryStore::from_json(missing_id).is_err());
        assert!(MemoryStore::from_json("not json").is_err());
    }

    #[test]
    fn test_latest_preventive_picks_most_recent_closure() {
        use WorkOrderKind::{General, Preventive};
        use WorkOrderState::{Cancelled, Completed};

        let order = |id, kind, state, closed: Option<&str>| WorkOrder {
            id,
            equipment_id: Some(1),
            kind,
            state,
            created_at: Some(ts("2025-01-01T00:00:00")),
            closed_at: closed.map(ts),
        };
        let store = MemoryStore {
            equipment: vec![Equipment {
                id: 1,
                name: "Lathe".into(),
                client: None,
                operational: true,
                next_maintenance: parse_date("2025-03-01"),
            }],
            work_orders: vec![
                order(1, Preventive, Completed, Some("2025-02-10T00:00:00")),
                order(2, Preventive, Completed, Some("2025-01-10T00:00:00")),
                order(3, General, Completed, Some("2025-02-28T00:00:00")),
                order(4, Preventive, Cancelled, Some("2025-02-27T00:00:00")),
            ],
            ..MemoryStore::default()
        };

        let window = ReportingWindow::semester(2025, 1).unwrap();
        let planned = store.maintenance_due_in(&window).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(
            planned[0].last_preventive_closed_at,
            Some(ts("2025-02-10T00:00:00"))
        );
    }
}
