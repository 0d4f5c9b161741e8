//! Satisfaction survey scoring and submission.

use chrono::{Datelike, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::POSITIVE_SCORE_THRESHOLD;
use crate::query::period::calendar_semester;
use crate::storage::{repository, Database};

pub const ANSWER_COUNT: usize = 5;
pub const MIN_ANSWER: u8 = 1;
pub const MAX_ANSWER: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurveyScore {
    pub total: u32,
    pub positive: bool,
}

/// Score five answers on a 1-5 scale.
pub fn score_answers(answers: &[u8]) -> Result<SurveyScore> {
    if answers.len() != ANSWER_COUNT {
        return Err(Error::InvalidSurvey(format!(
            "expected {ANSWER_COUNT} answers, got {}",
            answers.len()
        )));
    }
    if let Some(bad) = answers
        .iter()
        .find(|a| !(MIN_ANSWER..=MAX_ANSWER).contains(*a))
    {
        return Err(Error::InvalidSurvey(format!(
            "answers must be between {MIN_ANSWER} and {MAX_ANSWER}, got {bad}"
        )));
    }
    let total: u32 = answers.iter().map(|&a| a as u32).sum();
    Ok(SurveyScore {
        total,
        positive: total >= POSITIVE_SCORE_THRESHOLD,
    })
}

/// Parse a comma separated answer list such as `5,4,4,5,3`.
pub fn parse_answers(s: &str) -> Result<Vec<u8>> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<u8>()
                .map_err(|_| Error::InvalidSurvey(format!("not a number: '{part}'")))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedSurvey {
    pub id: i64,
    pub user_id: i64,
    pub responded_at: NaiveDateTime,
    pub score: SurveyScore,
    pub comment: Option<String>,
}

/// Whether `user_id` already answered in the calendar semester containing `now`.
pub fn answered_this_semester(
    conn: &Connection,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<bool> {
    let semester = calendar_semester(now);
    Ok(repository::has_survey_between(
        conn,
        user_id,
        semester.start,
        semester.end,
    )?)
}

/// Record a survey for `user_id`. One response per user per calendar semester.
pub fn submit_survey_with(
    conn: &Connection,
    user_id: i64,
    answers: &[u8],
    comment: Option<&str>,
    now: NaiveDateTime,
) -> Result<SubmittedSurvey> {
    let score = score_answers(answers)?;
    if !repository::user_exists(conn, user_id)? {
        return Err(Error::NotFound(format!("user {user_id}")));
    }
    if answered_this_semester(conn, user_id, now)? {
        return Err(Error::AlreadyResponded(user_id));
    }

    let comment = comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let id = repository::insert_survey(
        conn,
        Some(user_id),
        now,
        score.total,
        score.positive,
        comment.as_deref(),
    )?;
    log::info!(
        "Recorded survey {id} for user {user_id}: score {} ({})",
        score.total,
        if score.positive { "positive" } else { "not positive" }
    );

    Ok(SubmittedSurvey {
        id,
        user_id,
        responded_at: now,
        score,
        comment,
    })
}

pub async fn submit_survey(
    db: &Database,
    user_id: i64,
    answers: Vec<u8>,
    comment: Option<String>,
    now: NaiveDateTime,
) -> Result<SubmittedSurvey> {
    db.writer()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let result = submit_survey_with(&tx, user_id, &answers, comment.as_deref(), now);
            if result.is_ok() {
                tx.commit()?;
            }
            Ok::<Result<SubmittedSurvey>, rusqlite::Error>(result)
        })
        .await?
}

/// Survey prompt state for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurveyStatus {
    pub answered: bool,
    /// The prompt is shown during the last month of a semester to users
    /// who have not answered yet.
    pub prompt_due: bool,
}

pub fn survey_status_with(
    conn: &Connection,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<SurveyStatus> {
    let answered = answered_this_semester(conn, user_id, now)?;
    let last_month_of_semester = matches!(now.month(), 6 | 12);
    Ok(SurveyStatus {
        answered,
        prompt_due: last_month_of_semester && !answered,
    })
}

pub async fn survey_status(
    db: &Database,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<SurveyStatus> {
    db.reader()
        .call(move |conn| {
            let status = survey_status_with(conn, user_id, now);
            Ok::<_, rusqlite::Error>(status)
        })
        .await?
}
