pub mod types;

pub use types::*;

use crate::date_util::{fractional_days, start_of_day};
use crate::error::Result;
use crate::model::{PlannedMaintenance, Survey, WorkOrder, WorkOrderState};
use crate::query::period::ReportingWindow;
use crate::query::source::IndicatorSource;

pub const LABEL_REGISTERED: &str = "Registered interventions";
pub const LABEL_ANNUAL_TARGET: &str = "Annual intervention target";
pub const LABEL_PLANNED: &str = "Planned preventives";
pub const LABEL_ON_TIME: &str = "Preventives on time";
pub const LABEL_TOTAL_SURVEYS: &str = "Total surveys";
pub const LABEL_POSITIVE_SURVEYS: &str = "Positive surveys";
pub const LABEL_CLOSED_ORDERS: &str = "Closed work orders in period";
pub const LABEL_TOTAL_EQUIPMENT: &str = "Total equipment";
pub const LABEL_OPERATIONAL_EQUIPMENT: &str = "Operational equipment";

/// `numerator / denominator * 100`, or 0 when there is nothing to divide by.
pub fn ratio_pct(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

// ── Pure calculators ───────────────────────────────────────────────

/// Work orders created in the window against the annual intervention target.
pub fn digital_registration(
    window: &ReportingWindow,
    orders: &[WorkOrder],
    annual_target: u32,
) -> KpiResult {
    let registered = orders
        .iter()
        .filter(|o| o.created_at.is_some_and(|t| window.contains(t)))
        .count() as u64;

    KpiResult {
        kpi: KpiId::DigitalRegistration,
        value: ratio_pct(registered, annual_target as u64),
        window: Some(window.clone()),
        breakdown: vec![
            BreakdownItem {
                label: LABEL_REGISTERED,
                value: registered as f64,
            },
            BreakdownItem {
                label: LABEL_ANNUAL_TARGET,
                value: annual_target as f64,
            },
        ],
    }
}

/// Equipment due in the window whose latest preventive order closed no later
/// than the scheduled date. Due dates anchor at midnight.
pub fn preventive_on_time(window: &ReportingWindow, planned: &[PlannedMaintenance]) -> KpiResult {
    let due: Vec<&PlannedMaintenance> = planned
        .iter()
        .filter(|p| window.contains_date(p.next_maintenance))
        .collect();

    let on_time = due
        .iter()
        .filter(|p| {
            p.last_preventive_closed_at
                .is_some_and(|closed| closed <= start_of_day(p.next_maintenance))
        })
        .count() as u64;
    let planned_count = due.len() as u64;

    KpiResult {
        kpi: KpiId::PreventiveOnTime,
        value: ratio_pct(on_time, planned_count),
        window: Some(window.clone()),
        breakdown: vec![
            BreakdownItem {
                label: LABEL_PLANNED,
                value: planned_count as f64,
            },
            BreakdownItem {
                label: LABEL_ON_TIME,
                value: on_time as f64,
            },
        ],
    }
}

/// Positive surveys over all surveys answered in the window.
pub fn survey_positivity(window: &ReportingWindow, surveys: &[Survey]) -> KpiResult {
    let answered: Vec<&Survey> = surveys
        .iter()
        .filter(|s| s.responded_at.is_some_and(|t| window.contains(t)))
        .collect();
    let total = answered.len() as u64;
    let positive = answered.iter().filter(|s| s.positive).count() as u64;

    KpiResult {
        kpi: KpiId::SurveyPositivity,
        value: ratio_pct(positive, total),
        window: Some(window.clone()),
        breakdown: vec![
            BreakdownItem {
                label: LABEL_TOTAL_SURVEYS,
                value: total as f64,
            },
            BreakdownItem {
                label: LABEL_POSITIVE_SURVEYS,
                value: positive as f64,
            },
        ],
    }
}

/// Days taken to resolve one order, or `None` when the order cannot count
/// toward the average. Same-day resolutions count as one full day.
pub fn resolution_days(order: &WorkOrder) -> Option<f64> {
    let (Some(created), Some(closed)) = (order.created_at, order.closed_at) else {
        log::debug!(
            "Work order {} has no creation or closure time, skipping",
            order.id
        );
        return None;
    };
    let days = fractional_days(created, closed);
    if days <= 0.0 {
        log::warn!(
            "Work order {} closed {days:.3} days after creation, skipping",
            order.id
        );
        return None;
    }
    Some(if days < 1.0 { 1.0 } else { days })
}

/// Ceiling of the mean resolution days of orders completed in the window.
pub fn mean_resolution_days(window: &ReportingWindow, orders: &[WorkOrder]) -> KpiResult {
    let closed: Vec<&WorkOrder> = orders
        .iter()
        .filter(|o| o.state == WorkOrderState::Completed)
        .filter(|o| o.closed_at.is_some_and(|t| window.contains(t)))
        .collect();

    let valid: Vec<f64> = closed.iter().filter_map(|o| resolution_days(o)).collect();
    let value = if valid.is_empty() {
        0.0
    } else {
        let avg = valid.iter().sum::<f64>() / valid.len() as f64;
        log::debug!(
            "Mean resolution over {} of {} closed orders: {avg:.3} days",
            valid.len(),
            closed.len()
        );
        avg.ceil()
    };

    KpiResult {
        kpi: KpiId::MeanResolutionDays,
        value,
        window: Some(window.clone()),
        breakdown: vec![BreakdownItem {
            label: LABEL_CLOSED_ORDERS,
            value: closed.len() as f64,
        }],
    }
}

/// Operational equipment over all equipment, right now.
pub fn operational_ratio(total: u64, operational: u64) -> KpiResult {
    KpiResult {
        kpi: KpiId::OperationalRatio,
        value: ratio_pct(operational, total),
        window: None,
        breakdown: vec![
            BreakdownItem {
                label: LABEL_TOTAL_EQUIPMENT,
                value: total as f64,
            },
            BreakdownItem {
                label: LABEL_OPERATIONAL_EQUIPMENT,
                value: operational as f64,
            },
        ],
    }
}

// ── Source-backed computations ─────────────────────────────────────

pub fn compute_digital_registration<S: IndicatorSource + ?Sized>(
    source: &S,
    window: &ReportingWindow,
    annual_target: u32,
) -> Result<KpiResult> {
    let orders = source.work_orders_created_in(window)?;
    let result = digital_registration(window, &orders, annual_target);
    log::debug!(
        "Registration {}: {} orders against target {annual_target} -> {:.1}",
        window.key,
        orders.len(),
        result.value
    );
    Ok(result)
}

pub fn compute_preventive_on_time<S: IndicatorSource + ?Sized>(
    source: &S,
    window: &ReportingWindow,
) -> Result<KpiResult> {
    let planned = source.maintenance_due_in(window)?;
    let result = preventive_on_time(window, &planned);
    log::debug!(
        "Preventive {}: {} planned -> {:.1}",
        window.key,
        planned.len(),
        result.value
    );
    Ok(result)
}

pub fn compute_survey_positivity<S: IndicatorSource + ?Sized>(
    source: &S,
    window: &ReportingWindow,
) -> Result<KpiResult> {
    let surveys = source.surveys_in(window, None)?;
    let result = survey_positivity(window, &surveys);
    log::debug!(
        "Surveys {}: {} answered -> {:.1}",
        window.key,
        surveys.len(),
        result.value
    );
    Ok(result)
}

pub fn compute_mean_resolution_days<S: IndicatorSource + ?Sized>(
    source: &S,
    window: &ReportingWindow,
) -> Result<KpiResult> {
    let orders = source.work_orders_closed_in(window, WorkOrderState::Completed)?;
    Ok(mean_resolution_days(window, &orders))
}

pub fn compute_operational_ratio<S: IndicatorSource + ?Sized>(source: &S) -> Result<KpiResult> {
    let total = source.count_equipment(None)?;
    let operational = source.count_equipment(Some(true))?;
    log::debug!("Operational: {operational} of {total} equipment");
    Ok(operational_ratio(total, operational))
}
