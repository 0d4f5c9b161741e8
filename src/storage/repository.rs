use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::date_util::{format_timestamp, parse_date, parse_timestamp, DATE_FORMAT};
use crate::model::{
    valid_work_orders, Equipment, PlannedMaintenance, RawWorkOrder, Responder, Survey,
    SurveyEntry, SurveyRecord, User, WorkOrder, WorkOrderState,
};

// ── Users ──────────────────────────────────────────────────────────

pub fn upsert_user(conn: &Connection, user: &User) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO users (user_id, first_name, last_name, email)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
           first_name = excluded.first_name,
           last_name = excluded.last_name,
           email = excluded.email",
        params![user.id, user.first_name, user.last_name, user.email],
    )?;
    Ok(())
}

pub fn user_exists(conn: &Connection, user_id: i64) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT 1 FROM users WHERE user_id = ?1",
        params![user_id],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

// ── Equipment ──────────────────────────────────────────────────────

pub fn upsert_equipment(conn: &Connection, equipment: &Equipment) -> Result<(), rusqlite::Error> {
    let next_maintenance = equipment
        .next_maintenance
        .map(|d| d.format(DATE_FORMAT).to_string());
    conn.execute(
        "INSERT INTO equipment (equipment_id, name, client, operational, next_maintenance)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(equipment_id) DO UPDATE SET
           name = excluded.name,
           client = excluded.client,
           operational = excluded.operational,
           next_maintenance = excluded.next_maintenance",
        params![
            equipment.id,
            equipment.name,
            equipment.client,
            equipment.operational as i32,
            next_maintenance,
        ],
    )?;
    Ok(())
}

pub fn equipment_exists(conn: &Connection, equipment_id: i64) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT 1 FROM equipment WHERE equipment_id = ?1",
        params![equipment_id],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

/// Equipment whose next maintenance date falls in `[start, end]`, each with
/// the closure time of its most recently closed completed preventive order.
/// The latest-closure subquery narrows through `idx_work_orders_latest_preventive`
/// and orders by `datetime()`, so `T` and space separated closures sort together.
pub fn list_maintenance_due_between(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PlannedMaintenance>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT e.equipment_id, date(e.next_maintenance),
                (SELECT w.closed_at FROM work_orders w
                  WHERE w.equipment_id = e.equipment_id
                    AND w.kind = 'preventive'
                    AND w.state = 'completed'
                    AND datetime(w.closed_at) IS NOT NULL
                  ORDER BY datetime(w.closed_at) DESC
                  LIMIT 1)
         FROM equipment e
         WHERE date(e.next_maintenance) >= ?1 AND date(e.next_maintenance) <= ?2
         ORDER BY e.equipment_id",
    )?;
    let rows = stmt.query_map(
        params![
            start.format(DATE_FORMAT).to_string(),
            end.format(DATE_FORMAT).to_string()
        ],
        |row| {
            let equipment_id: i64 = row.get(0)?;
            let next_maintenance: String = row.get(1)?;
            let closed_at: Option<String> = row.get(2)?;
            Ok((equipment_id, next_maintenance, closed_at))
        },
    )?;

    let mut planned = Vec::new();
    for row in rows {
        let (equipment_id, next_maintenance, closed_at) = row?;
        let Some(next_maintenance) = parse_date(&next_maintenance) else {
            log::warn!(
                "Skipping equipment {equipment_id}: bad next maintenance date '{next_maintenance}'"
            );
            continue;
        };
        planned.push(PlannedMaintenance {
            equipment_id,
            next_maintenance,
            last_preventive_closed_at: closed_at.as_deref().and_then(parse_timestamp),
        });
    }
    Ok(planned)
}

/// Count equipment, optionally filtered by operational flag.
pub fn count_equipment(
    conn: &Connection,
    operational: Option<bool>,
) -> Result<u64, rusqlite::Error> {
    let count: i64 = match operational {
        Some(flag) => conn.query_row(
            "SELECT COUNT(*) FROM equipment WHERE operational = ?1",
            params![flag as i32],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM equipment", [], |row| row.get(0))?,
    };
    Ok(count as u64)
}

// ── Work orders ────────────────────────────────────────────────────
//
// Range filters compare through SQLite `datetime()`, which normalises the
// `T` and space separated forms `parse_timestamp` accepts.

pub fn upsert_work_order(conn: &Connection, order: &WorkOrder) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO work_orders (work_order_id, equipment_id, kind, state, created_at, closed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(work_order_id) DO UPDATE SET
           equipment_id = excluded.equipment_id,
           kind = excluded.kind,
           state = excluded.state,
           created_at = excluded.created_at,
           closed_at = excluded.closed_at",
        params![
            order.id,
            order.equipment_id,
            order.kind.as_str(),
            order.state.as_str(),
            order.created_at.map(format_timestamp),
            order.closed_at.map(format_timestamp),
        ],
    )?;
    Ok(())
}

/// Work orders created in `[start, end]`.
pub fn list_work_orders_created_between(
    conn: &Connection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<WorkOrder>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT work_order_id, equipment_id, kind, state, created_at, closed_at
         FROM work_orders
         WHERE datetime(created_at) >= datetime(?1) AND datetime(created_at) <= datetime(?2)
         ORDER BY work_order_id",
    )?;
    let rows = stmt.query_map(
        params![format_timestamp(start), format_timestamp(end)],
        work_order_from_row,
    )?;
    collect_work_orders(rows)
}

/// Work orders in `state` closed in `[start, end]`.
pub fn list_work_orders_closed_between(
    conn: &Connection,
    start: NaiveDateTime,
    end: NaiveDateTime,
    state: WorkOrderState,
) -> Result<Vec<WorkOrder>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT work_order_id, equipment_id, kind, state, created_at, closed_at
         FROM work_orders
         WHERE state = ?1
           AND datetime(closed_at) >= datetime(?2) AND datetime(closed_at) <= datetime(?3)
         ORDER BY work_order_id",
    )?;
    let rows = stmt.query_map(
        params![state.as_str(), format_timestamp(start), format_timestamp(end)],
        work_order_from_row,
    )?;
    collect_work_orders(rows)
}

fn work_order_from_row(row: &Row<'_>) -> Result<RawWorkOrder, rusqlite::Error> {
    Ok(RawWorkOrder {
        id: row.get(0)?,
        equipment_id: row.get(1)?,
        kind: row.get(2)?,
        state: row.get(3)?,
        created_at: row.get(4)?,
        closed_at: row.get(5)?,
    })
}

fn collect_work_orders(
    rows: impl Iterator<Item = Result<RawWorkOrder, rusqlite::Error>>,
) -> Result<Vec<WorkOrder>, rusqlite::Error> {
    let rows = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(valid_work_orders(rows))
}

// ── Satisfaction surveys ───────────────────────────────────────────

pub fn insert_survey(
    conn: &Connection,
    user_id: Option<i64>,
    responded_at: NaiveDateTime,
    total_score: u32,
    positive: bool,
    comment: Option<&str>,
) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT INTO satisfaction_surveys (user_id, responded_at, total_score, positive, comment)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            format_timestamp(responded_at),
            total_score,
            positive as i32,
            comment
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn upsert_survey_record(
    conn: &Connection,
    survey: &SurveyRecord,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO satisfaction_surveys
           (survey_id, user_id, responded_at, total_score, positive, comment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(survey_id) DO UPDATE SET
           user_id = excluded.user_id,
           responded_at = excluded.responded_at,
           total_score = excluded.total_score,
           positive = excluded.positive,
           comment = excluded.comment",
        params![
            survey.id,
            survey.user_id,
            survey.responded_at.map(format_timestamp),
            survey.total_score,
            survey.positive() as i32,
            survey.comment,
        ],
    )?;
    Ok(())
}

/// Surveys answered in `[start, end]`, optionally filtered by positivity.
pub fn list_surveys_between(
    conn: &Connection,
    start: NaiveDateTime,
    end: NaiveDateTime,
    positive: Option<bool>,
) -> Result<Vec<Survey>, rusqlite::Error> {
    let (sql, positive_flag) = match positive {
        Some(flag) => (
            "SELECT survey_id, responded_at, total_score, positive FROM satisfaction_surveys
             WHERE datetime(responded_at) >= datetime(?1)
               AND datetime(responded_at) <= datetime(?2)
               AND positive = ?3
             ORDER BY survey_id",
            Some(flag as i32),
        ),
        None => (
            "SELECT survey_id, responded_at, total_score, positive FROM satisfaction_surveys
             WHERE datetime(responded_at) >= datetime(?1)
               AND datetime(responded_at) <= datetime(?2)
             ORDER BY survey_id",
            None,
        ),
    };
    let mut stmt = conn.prepare(sql)?;
    stmt.raw_bind_parameter(1, format_timestamp(start))?;
    stmt.raw_bind_parameter(2, format_timestamp(end))?;
    if let Some(flag) = positive_flag {
        stmt.raw_bind_parameter(3, flag)?;
    }

    let mut surveys = Vec::new();
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let responded_at: Option<String> = row.get(1)?;
        surveys.push(Survey {
            id: row.get(0)?,
            responded_at: responded_at.as_deref().and_then(parse_timestamp),
            total_score: row.get(2)?,
            positive: row.get::<_, i32>(3)? != 0,
        });
    }
    Ok(surveys)
}

/// Every survey with its comment and responder, most recent first.
pub fn list_survey_entries(conn: &Connection) -> Result<Vec<SurveyEntry>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT s.survey_id, s.responded_at, s.total_score, s.positive, s.comment,
                u.first_name, u.last_name, u.email
         FROM satisfaction_surveys s
         LEFT JOIN users u ON u.user_id = s.user_id
         ORDER BY datetime(s.responded_at) DESC, s.survey_id DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        let responded_at: Option<String> = row.get(1)?;
        let email: Option<String> = row.get(7)?;
        let responder = match email {
            Some(email) => Some(Responder {
                first_name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                last_name: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                email,
            }),
            None => None,
        };
        Ok(SurveyEntry {
            id: row.get(0)?,
            responded_at: responded_at.as_deref().and_then(parse_timestamp),
            total_score: row.get(2)?,
            positive: row.get::<_, i32>(3)? != 0,
            comment: row.get(4)?,
            responder,
        })
    })?;
    rows.collect()
}

/// Whether `user_id` answered a survey in `[start, end]`.
pub fn has_survey_between(
    conn: &Connection,
    user_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT 1 FROM satisfaction_surveys
         WHERE user_id = ?1
           AND datetime(responded_at) >= datetime(?2)
           AND datetime(responded_at) <= datetime(?3)
         LIMIT 1",
        params![user_id, format_timestamp(start), format_timestamp(end)],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

// ── Store summary ──────────────────────────────────────────────────

/// Row counts per table, for `maintkpi status`.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StoreCounts {
    pub users: u64,
    pub equipment: u64,
    pub work_orders: u64,
    pub open_work_orders: u64,
    pub surveys: u64,
}

pub fn store_counts(conn: &Connection) -> Result<StoreCounts, rusqlite::Error> {
    let count = |sql: &str| -> Result<u64, rusqlite::Error> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as u64)
    };
    Ok(StoreCounts {
        users: count("SELECT COUNT(*) FROM users")?,
        equipment: count("SELECT COUNT(*) FROM equipment")?,
        work_orders: count("SELECT COUNT(*) FROM work_orders")?,
        open_work_orders: count(
            "SELECT COUNT(*) FROM work_orders WHERE state IN ('pending', 'in_progress')",
        )?,
        surveys: count("SELECT COUNT(*) FROM satisfaction_surveys")?,
    })
}

// ── App Config ─────────────────────────────────────────────────────

pub fn get_config(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM app_config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR REPLACE INTO app_config (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))",
        params![key, value],
    )?;
    Ok(())
}

pub fn list_config(conn: &Connection) -> Result<Vec<(String, String)>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT key, value FROM app_config ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkOrderKind::{self, General, Preventive};
    use crate::storage::Database;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn open(id: i64, equipment_id: i64, kind: WorkOrderKind, created: &str) -> WorkOrder {
        WorkOrder {
            id,
            equipment_id: Some(equipment_id),
            kind,
            state: WorkOrderState::Pending,
            created_at: Some(ts(created)),
            closed_at: None,
        }
    }

    /// Completed order on equipment 1.
    fn done(id: i64, kind: WorkOrderKind, created: &str, closed: &str) -> WorkOrder {
        WorkOrder {
            state: WorkOrderState::Completed,
            closed_at: Some(ts(closed)),
            ..open(id, 1, kind, created)
        }
    }

    fn pump(id: i64, operational: bool, next: Option<&str>) -> Equipment {
        Equipment {
            id,
            name: format!("Pump {id}"),
            client: None,
            operational,
            next_maintenance: next.map(date),
        }
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                set_config(conn, "annual_intervention_target", "50")?;
                let val = get_config(conn, "annual_intervention_target")?;
                assert_eq!(val, Some("50".to_string()));

                let missing = get_config(conn, "nonexistent")?;
                assert_eq!(missing, None);

                set_config(conn, "annual_intervention_target", "60")?;
                let all = list_config(conn)?;
                assert_eq!(
                    all,
                    vec![("annual_intervention_target".to_string(), "60".to_string())]
                );
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_work_order_range_queries() {
        let db = Database::open_memory().await.unwrap();

        let (created, closed) = db
            .writer()
            .call(|conn| {
                upsert_equipment(conn, &pump(1, true, None))?;
                for order in [
                    open(1, 1, General, "2025-01-01T00:00:00"),
                    done(2, General, "2025-03-31T23:59:59", "2025-04-02T09:00:00"),
                    done(3, General, "2025-04-01T00:00:00", "2025-04-03T09:00:00"),
                ] {
                    upsert_work_order(conn, &order)?;
                }
                // Corrupt kind is skipped rather than failing the whole listing.
                conn.execute(
                    "INSERT INTO work_orders (work_order_id, equipment_id, kind, state, created_at)
                     VALUES (4, 1, 'mystery', 'pending', '2025-02-01T00:00:00')",
                    [],
                )?;

                let created = list_work_orders_created_between(
                    conn,
                    ts("2025-01-01T00:00:00"),
                    ts("2025-03-31T23:59:59"),
                )?;
                let closed = list_work_orders_closed_between(
                    conn,
                    ts("2025-04-01T00:00:00"),
                    ts("2025-04-30T23:59:59"),
                    WorkOrderState::Completed,
                )?;
                Ok::<_, rusqlite::Error>((created, closed))
            })
            .await
            .unwrap();

        assert_eq!(created.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(closed.iter().map(|o| o.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(closed[0].closed_at, Some(ts("2025-04-02T09:00:00")));
    }

    #[tokio::test]
    async fn test_maintenance_due_joins_latest_preventive() {
        let db = Database::open_memory().await.unwrap();

        let planned = db
            .writer()
            .call(|conn| {
                upsert_equipment(conn, &pump(1, true, Some("2025-03-15")))?;
                upsert_equipment(conn, &pump(2, true, Some("2025-05-01")))?;
                upsert_equipment(conn, &pump(3, false, Some("2025-08-01")))?;
                upsert_equipment(conn, &pump(4, true, None))?;

                for order in [
                    done(1, Preventive, "2025-01-01T08:00:00", "2025-02-01T10:00:00"),
                    done(2, Preventive, "2025-02-20T08:00:00", "2025-03-20T10:00:00"),
                    // General orders never count as the latest preventive.
                    done(3, General, "2025-03-01T08:00:00", "2025-03-30T10:00:00"),
                    // Open preventive on equipment 2 has no closure.
                    open(4, 2, Preventive, "2025-04-01T08:00:00"),
                ] {
                    upsert_work_order(conn, &order)?;
                }

                list_maintenance_due_between(conn, date("2025-01-01"), date("2025-06-30"))
            })
            .await
            .unwrap();

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].equipment_id, 1);
        assert_eq!(
            planned[0].last_preventive_closed_at,
            Some(ts("2025-03-20T10:00:00"))
        );
        assert_eq!(planned[1].equipment_id, 2);
        assert_eq!(planned[1].last_preventive_closed_at, None);
    }

    #[tokio::test]
    async fn test_range_queries_accept_space_separated_timestamps() {
        let db = Database::open_memory().await.unwrap();

        let (created, closed, planned, surveys, answered) = db
            .writer()
            .call(|conn| {
                upsert_equipment(conn, &pump(1, true, Some("2025-06-10")))?;
                conn.execute_batch(
                    "INSERT INTO users (user_id, first_name, last_name, email)
                     VALUES (1, 'Ana', 'Rojas', 'ana@example.com');
                     INSERT INTO work_orders
                       (work_order_id, equipment_id, kind, state, created_at, closed_at)
                     VALUES
                       (1, 1, 'preventive', 'completed', '2025-04-01 08:00:00',
                        '2025-04-01 17:30:00'),
                       (2, 1, 'preventive', 'completed', '2025-03-01T08:00:00',
                        '2025-04-01T09:00:00'),
                       (3, 1, 'general', 'completed', '2025-06-30 23:59:59',
                        '2025-07-01 00:00:00');
                     INSERT INTO satisfaction_surveys
                       (user_id, responded_at, total_score, positive)
                     VALUES (1, '2025-01-01 00:00:00', 21, 1);",
                )?;

                let q2_start = ts("2025-04-01T00:00:00");
                let q2_end = ts("2025-06-30T23:59:59");
                let s1_start = ts("2025-01-01T00:00:00");
                Ok::<_, rusqlite::Error>((
                    list_work_orders_created_between(conn, q2_start, q2_end)?,
                    list_work_orders_closed_between(
                        conn,
                        q2_start,
                        q2_end,
                        WorkOrderState::Completed,
                    )?,
                    list_maintenance_due_between(conn, date("2025-01-01"), date("2025-06-30"))?,
                    list_surveys_between(conn, s1_start, q2_end, None)?,
                    has_survey_between(conn, 1, s1_start, q2_end)?,
                ))
            })
            .await
            .unwrap();

        // First and last second of the window are both inside.
        assert_eq!(created.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(created[0].created_at, Some(ts("2025-04-01T08:00:00")));
        // Order 3 closed one second after the window.
        assert_eq!(closed.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2]);
        // 17:30 on the same day is the latest closure even though its text
        // sorts below `2025-04-01T09:00:00`.
        assert_eq!(
            planned[0].last_preventive_closed_at,
            Some(ts("2025-04-01T17:30:00"))
        );
        assert_eq!(surveys.len(), 1);
        assert!(answered);
    }

    #[tokio::test]
    async fn test_count_equipment() {
        let db = Database::open_memory().await.unwrap();

        let (all, up, down) = db
            .writer()
            .call(|conn| {
                upsert_equipment(conn, &pump(1, true, None))?;
                upsert_equipment(conn, &pump(2, true, None))?;
                upsert_equipment(conn, &pump(3, false, None))?;
                Ok::<_, rusqlite::Error>((
                    count_equipment(conn, None)?,
                    count_equipment(conn, Some(true))?,
                    count_equipment(conn, Some(false))?,
                ))
            })
            .await
            .unwrap();

        assert_eq!((all, up, down), (3, 2, 1));
    }

    #[tokio::test]
    async fn test_survey_queries() {
        let db = Database::open_memory().await.unwrap();

        let (all, positive, entries, answered) = db
            .writer()
            .call(|conn| {
                let ana = User {
                    id: 7,
                    first_name: "Ana".into(),
                    last_name: "Rojas".into(),
                    email: "ana@example.com".into(),
                };
                upsert_user(conn, &ana)?;
                let feb = ts("2025-02-01T09:00:00");
                insert_survey(conn, Some(7), feb, 22, true, Some("great"))?;
                insert_survey(conn, None, ts("2025-03-01T09:00:00"), 12, false, None)?;
                insert_survey(conn, None, ts("2025-09-01T09:00:00"), 25, true, None)?;

                let start = ts("2025-01-01T00:00:00");
                let end = ts("2025-06-30T23:59:59");
                Ok::<_, rusqlite::Error>((
                    list_surveys_between(conn, start, end, None)?,
                    list_surveys_between(conn, start, end, Some(true))?,
                    list_survey_entries(conn)?,
                    has_survey_between(conn, 7, start, end)?,
                ))
            })
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(positive.len(), 1);
        assert_eq!(positive[0].total_score, 22);
        assert!(answered);

        // Most recent first, responder joined where known.
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].responded_at, Some(ts("2025-09-01T09:00:00")));
        assert_eq!(entries[2].comment.as_deref(), Some("great"));
        assert_eq!(
            entries[2].responder.as_ref().map(|r| r.email.as_str()),
            Some("ana@example.com")
        );
        assert!(entries[1].responder.is_none());
    }
}
