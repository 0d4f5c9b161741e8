use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::metrics::{self, KpiId, KpiResult};
use crate::model::SurveyEntry;
use crate::query::period::{resolve_window, Granularity, ReportingWindow};
use crate::query::source::IndicatorSource;
use crate::storage::Database;

/// All five indicators as of one instant, plus the raw survey listing for
/// privileged callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub generated_at: NaiveDateTime,
    pub digital_registration: KpiResult,
    pub preventive_on_time: KpiResult,
    pub survey_positivity: KpiResult,
    pub mean_resolution_days: KpiResult,
    pub operational_ratio: KpiResult,
    /// Present only when the caller was privileged.
    pub surveys: Option<Vec<SurveyEntry>>,
}

impl IndicatorReport {
    pub fn kpi(&self, id: KpiId) -> &KpiResult {
        match id {
            KpiId::DigitalRegistration => &self.digital_registration,
            KpiId::PreventiveOnTime => &self.preventive_on_time,
            KpiId::SurveyPositivity => &self.survey_positivity,
            KpiId::MeanResolutionDays => &self.mean_resolution_days,
            KpiId::OperationalRatio => &self.operational_ratio,
        }
    }

    pub fn kpis(&self) -> impl Iterator<Item = &KpiResult> {
        KpiId::ALL.into_iter().map(|id| self.kpi(id))
    }
}

/// Window granularity an indicator reports over, or `None` for
/// instantaneous indicators.
pub fn granularity_for(kpi: KpiId) -> Option<Granularity> {
    match kpi {
        KpiId::DigitalRegistration => Some(Granularity::Quarter),
        KpiId::PreventiveOnTime | KpiId::SurveyPositivity => Some(Granularity::Semester),
        KpiId::MeanResolutionDays => Some(Granularity::Month),
        KpiId::OperationalRatio => None,
    }
}

/// Compute one indicator. Uses `window` when given, otherwise the window
/// the resolver picks for `now`. Instantaneous indicators ignore both.
pub fn compute_kpi<S: IndicatorSource + ?Sized>(
    source: &S,
    config: &EngineConfig,
    kpi: KpiId,
    now: NaiveDateTime,
    window: Option<&ReportingWindow>,
) -> Result<KpiResult> {
    let Some(granularity) = granularity_for(kpi) else {
        return metrics::compute_operational_ratio(source);
    };
    let resolved;
    let window = match window {
        Some(w) => w,
        None => {
            resolved = resolve_window(granularity, now);
            &resolved
        }
    };

    match kpi {
        KpiId::DigitalRegistration => {
            metrics::compute_digital_registration(source, window, config.annual_intervention_target)
        }
        KpiId::PreventiveOnTime => metrics::compute_preventive_on_time(source, window),
        KpiId::SurveyPositivity => metrics::compute_survey_positivity(source, window),
        KpiId::MeanResolutionDays => metrics::compute_mean_resolution_days(source, window),
        KpiId::OperationalRatio => metrics::compute_operational_ratio(source),
    }
}

/// Assemble the full report from any source. A failing read aborts the
/// whole report; no partial results are returned.
pub fn assemble_report<S: IndicatorSource + ?Sized>(
    source: &S,
    config: &EngineConfig,
    now: NaiveDateTime,
    privileged: bool,
) -> Result<IndicatorReport> {
    let kpi = |id| compute_kpi(source, config, id, now, None);

    let report = IndicatorReport {
        generated_at: now,
        digital_registration: kpi(KpiId::DigitalRegistration)?,
        preventive_on_time: kpi(KpiId::PreventiveOnTime)?,
        survey_positivity: kpi(KpiId::SurveyPositivity)?,
        mean_resolution_days: kpi(KpiId::MeanResolutionDays)?,
        operational_ratio: kpi(KpiId::OperationalRatio)?,
        surveys: if privileged {
            Some(source.survey_entries()?)
        } else {
            None
        },
    };

    log::info!(
        "Assembled indicator report as of {now} (privileged: {privileged})"
    );
    Ok(report)
}

/// Build the report against the store, reading configuration from it.
pub async fn build_report(
    db: &Database,
    now: NaiveDateTime,
    privileged: bool,
) -> Result<IndicatorReport> {
    db.reader()
        .call(move |conn| {
            let result = EngineConfig::load(conn)
                .and_then(|config| assemble_report(&*conn, &config, now, privileged));
            Ok::<Result<IndicatorReport>, rusqlite::Error>(result)
        })
        .await?
}

/// Compute a single indicator against the store.
pub async fn build_kpi(
    db: &Database,
    kpi: KpiId,
    now: NaiveDateTime,
    window: Option<ReportingWindow>,
) -> Result<KpiResult> {
    db.reader()
        .call(move |conn| {
            let window = window.as_ref();
            let result = EngineConfig::load(conn)
                .and_then(|config| compute_kpi(&*conn, &config, kpi, now, window));
            Ok::<Result<KpiResult>, rusqlite::Error>(result)
        })
        .await?
}
