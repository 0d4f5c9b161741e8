use serde::Serialize;

use crate::query::period::ReportingWindow;

/// The five operational indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum KpiId {
    /// Work orders registered digitally against the annual target.
    #[value(name = "registration")]
    DigitalRegistration,
    /// Scheduled preventive maintenance closed on time.
    #[value(name = "preventive")]
    PreventiveOnTime,
    /// Share of positive satisfaction surveys.
    #[value(name = "surveys")]
    SurveyPositivity,
    /// Mean days to resolve a closed work order.
    #[value(name = "resolution")]
    MeanResolutionDays,
    /// Share of equipment currently operational.
    #[value(name = "operational")]
    OperationalRatio,
}

impl KpiId {
    pub const ALL: [KpiId; 5] = [
        KpiId::DigitalRegistration,
        KpiId::PreventiveOnTime,
        KpiId::SurveyPositivity,
        KpiId::MeanResolutionDays,
        KpiId::OperationalRatio,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            KpiId::DigitalRegistration => "Digitally registered interventions",
            KpiId::PreventiveOnTime => "Preventive maintenance on time",
            KpiId::SurveyPositivity => "Positive satisfaction surveys",
            KpiId::MeanResolutionDays => "Mean resolution time",
            KpiId::OperationalRatio => "Operational equipment",
        }
    }

    /// Unit suffix used when printing the value.
    pub fn unit(&self) -> &'static str {
        match self {
            KpiId::MeanResolutionDays => "days",
            _ => "%",
        }
    }
}

/// One supporting value behind an indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownItem {
    pub label: &'static str,
    pub value: f64,
}

/// A computed indicator: its value, the window it covers (none for
/// instantaneous indicators) and the values it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiResult {
    pub kpi: KpiId,
    pub value: f64,
    pub window: Option<ReportingWindow>,
    pub breakdown: Vec<BreakdownItem>,
}

impl KpiResult {
    /// Look up a breakdown value by label.
    pub fn breakdown_value(&self, label: &str) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|item| item.label == label)
            .map(|item| item.value)
    }
}
