use std::collections::HashMap;
use types::{Period, WidgetKind};
use url::Url;

use crate::ChartError;

/// Marker replaced by the period token in endpoint templates whose backend
/// route takes the period as a path segment.
pub const PERIOD_PLACEHOLDER: &str = "{period}";

const PERIOD_PARAM: &str = "period";

const fn default_template(kind: WidgetKind) -> &'static str {
    match kind {
        WidgetKind::JoRequestorChart => "/joborder/chart-data/{period}/",
        WidgetKind::JoApproverChart => {
            "/joborder/job-order-chart-data/{period}/"
        }
        WidgetKind::JoMaintenanceTrends => {
            "/joborder/api/get_job_order_trends/"
        }
        WidgetKind::JoAnalytics => "/joborder/analytics/",
        WidgetKind::MaintenanceWorkload => "/joborder/workload/",
        WidgetKind::ManhoursChart => "/manhours/chart-data/",
        WidgetKind::MachinePerformance => "/manhours/machine-performance/",
        WidgetKind::MonitoringChart => "/monitoring/chart-data/{period}/",
        WidgetKind::DcfRequestorChart => {
            "/dcf/api/requestor-chart-data/{period}/"
        }
        WidgetKind::DcfApproverChart => {
            "/dcf/api/approver-chart-data/{period}/"
        }
    }
}

/// Maps every widget kind to the backend endpoint serving its chart data.
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    base_url: Url,
    templates: HashMap<WidgetKind, String>,
}

impl EndpointCatalog {
    /// Templates resolve below the base URL's path, so a portal mounted
    /// under a prefix such as `/pdn` keeps that prefix.
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let templates = WidgetKind::ALL
            .into_iter()
            .map(|kind| (kind, default_template(kind).to_string()))
            .collect();

        Self {
            base_url,
            templates,
        }
    }

    /// Replace the templates of the named widget kinds.
    ///
    /// # Errors
    ///
    /// If a key does not name a known widget kind.
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<String, String>,
    ) -> Result<Self, ChartError> {
        for (name, template) in overrides {
            let kind: WidgetKind = name.parse()?;
            self.templates.insert(kind, template.clone());
        }

        Ok(self)
    }

    #[must_use]
    pub fn template(&self, kind: WidgetKind) -> &str {
        self.templates
            .get(&kind)
            .map_or_else(|| default_template(kind), String::as_str)
    }

    /// Build the request URL for a widget kind and period.
    ///
    /// # Errors
    ///
    /// If the template cannot be joined onto the base URL.
    pub fn resolve(
        &self,
        kind: WidgetKind,
        period: Period,
    ) -> Result<Url, ChartError> {
        let template = self.template(kind).trim_start_matches('/');

        if template.contains(PERIOD_PLACEHOLDER) {
            let path = template.replace(PERIOD_PLACEHOLDER, period.as_str());
            return Ok(self.base_url.join(&path)?);
        }

        Ok(with_period(self.base_url.join(template)?, period))
    }
}

/// Append `period=<token>` unless the URL already carries the period, either
/// as a `period` query key or as a path segment equal to the token.
#[must_use]
pub fn with_period(mut url: Url, period: Period) -> Url {
    let in_query = url.query_pairs().any(|(key, _)| key == PERIOD_PARAM);
    let in_path = url
        .path_segments()
        .is_some_and(|mut segments| segments.any(|s| s == period.as_str()));

    if in_query || in_path {
        return url;
    }

    url.query_pairs_mut()
        .append_pair(PERIOD_PARAM, period.as_str());
    url
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> EndpointCatalog {
        EndpointCatalog::new(Url::parse("http://portal.local:8000").unwrap())
    }

    fn period_count(url: &Url) -> usize {
        url.query_pairs().filter(|(key, _)| key == "period").count()
    }

    #[test]
    fn test_path_period_is_substituted() {
        let url = catalog()
            .resolve(WidgetKind::JoRequestorChart, Period::OneYear)
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://portal.local:8000/joborder/chart-data/1year/"
        );
        assert_eq!(period_count(&url), 0);
    }

    #[test]
    fn test_query_period_is_appended_once() {
        let url = catalog()
            .resolve(WidgetKind::ManhoursChart, Period::SixMonths)
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://portal.local:8000/manhours/chart-data/?period=6month"
        );
        assert_eq!(period_count(&url), 1);
    }

    #[test]
    fn test_existing_period_is_not_duplicated() {
        let url =
            Url::parse("http://portal.local/joborder/analytics/?period=3month")
                .unwrap();

        let url = with_period(url, Period::SixMonths);

        assert_eq!(period_count(&url), 1);
        assert_eq!(url.query(), Some("period=3month"));
    }

    #[test]
    fn test_period_joins_existing_query() {
        let url = Url::parse("http://portal.local/manhours/chart-data/?line=4")
            .unwrap();

        let url = with_period(url, Period::SixMonths);

        assert_eq!(url.query(), Some("line=4&period=6month"));
    }

    #[test]
    fn test_literal_period_in_path_is_not_repeated() {
        let overrides = HashMap::from([(
            "manhours-chart".to_string(),
            "/manhours/chart-data/1year/".to_string(),
        )]);
        let catalog = catalog().with_overrides(&overrides).unwrap();

        let url = catalog
            .resolve(WidgetKind::ManhoursChart, Period::OneYear)
            .unwrap();
        assert_eq!(url.query(), None);

        let url = catalog
            .resolve(WidgetKind::ManhoursChart, Period::ThreeMonths)
            .unwrap();
        assert_eq!(url.query(), Some("period=3month"));
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let catalog =
            EndpointCatalog::new(Url::parse("http://portal.local/pdn").unwrap());

        let url = catalog
            .resolve(WidgetKind::DcfApproverChart, Period::ThreeMonths)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://portal.local/pdn/dcf/api/approver-chart-data/3month/"
        );

        let url = catalog
            .resolve(WidgetKind::JoAnalytics, Period::SixMonths)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://portal.local/pdn/joborder/analytics/?period=6month"
        );
    }

    #[test]
    fn test_overrides_replace_templates() {
        let overrides = HashMap::from([(
            "manhours-chart".to_string(),
            "/manhours/v2/chart-data/?period=week".to_string(),
        )]);

        let catalog = catalog().with_overrides(&overrides).unwrap();
        let url = catalog
            .resolve(WidgetKind::ManhoursChart, Period::SixMonths)
            .unwrap();

        assert_eq!(url.path(), "/manhours/v2/chart-data/");
        assert_eq!(period_count(&url), 1);
    }

    #[test]
    fn test_override_for_unknown_kind_fails() {
        let overrides =
            HashMap::from([("calendar".to_string(), "/calendar/".to_string())]);

        assert!(matches!(
            catalog().with_overrides(&overrides),
            Err(ChartError::UnknownWidgetKind(_))
        ));
    }
}
