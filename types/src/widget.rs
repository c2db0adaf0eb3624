use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The chart widgets a dashboard page can declare through `data-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    JoRequestorChart,
    JoApproverChart,
    JoMaintenanceTrends,
    JoAnalytics,
    MaintenanceWorkload,
    ManhoursChart,
    MachinePerformance,
    MonitoringChart,
    DcfRequestorChart,
    DcfApproverChart,
}

/// Time window requested from the backend for chart aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "3month")]
    ThreeMonths,
    #[serde(rename = "6month")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "quarter")]
    Quarter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetDescriptor {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: WidgetKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWidgetKind(pub String);

impl fmt::Display for UnknownWidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown chart widget type: {}", self.0)
    }
}

impl std::error::Error for UnknownWidgetKind {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPeriod(pub String);

impl fmt::Display for UnknownPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown period: {}", self.0)
    }
}

impl std::error::Error for UnknownPeriod {}

impl WidgetKind {
    pub const ALL: [Self; 10] = [
        Self::JoRequestorChart,
        Self::JoApproverChart,
        Self::JoMaintenanceTrends,
        Self::JoAnalytics,
        Self::MaintenanceWorkload,
        Self::ManhoursChart,
        Self::MachinePerformance,
        Self::MonitoringChart,
        Self::DcfRequestorChart,
        Self::DcfApproverChart,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JoRequestorChart => "jo-requestor-chart",
            Self::JoApproverChart => "jo-approver-chart",
            Self::JoMaintenanceTrends => "jo-maintenance-trends",
            Self::JoAnalytics => "jo-analytics",
            Self::MaintenanceWorkload => "maintenance-workload",
            Self::ManhoursChart => "manhours-chart",
            Self::MachinePerformance => "machine-performance",
            Self::MonitoringChart => "monitoring-chart",
            Self::DcfRequestorChart => "dcf-requestor-chart",
            Self::DcfApproverChart => "dcf-approver-chart",
        }
    }

    /// Period requested when the page has not selected one.
    #[must_use]
    pub const fn default_period(self) -> Period {
        match self {
            Self::MonitoringChart => Period::Month,
            _ => Period::SixMonths,
        }
    }

    /// Periods offered by the widget's period selector.
    #[must_use]
    pub const fn period_options(self) -> &'static [Period] {
        match self {
            Self::MonitoringChart => {
                &[Period::Week, Period::Month, Period::Quarter]
            }
            _ => &[Period::ThreeMonths, Period::SixMonths, Period::OneYear],
        }
    }

    #[must_use]
    pub fn supports(self, period: Period) -> bool {
        self.period_options().contains(&period)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = UnknownWidgetKind;

    /// Accepts the canonical name in any case, its dash-less form, and the
    /// short `dcf-requestor` / `dcf-approver` names older layouts still use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let kind = match compact.as_str() {
            "jorequestorchart" => Self::JoRequestorChart,
            "joapproverchart" => Self::JoApproverChart,
            "jomaintenancetrends" => Self::JoMaintenanceTrends,
            "joanalytics" => Self::JoAnalytics,
            "maintenanceworkload" => Self::MaintenanceWorkload,
            "manhourschart" => Self::ManhoursChart,
            "machineperformance" => Self::MachinePerformance,
            "monitoringchart" => Self::MonitoringChart,
            "dcfrequestorchart" | "dcfrequestor" => Self::DcfRequestorChart,
            "dcfapproverchart" | "dcfapprover" => Self::DcfApproverChart,
            _ => return Err(UnknownWidgetKind(s.to_string())),
        };

        Ok(kind)
    }
}

impl Period {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThreeMonths => "3month",
            Self::SixMonths => "6month",
            Self::OneYear => "1year",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3month" => Ok(Self::ThreeMonths),
            "6month" => Ok(Self::SixMonths),
            "1year" => Ok(Self::OneYear),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}
