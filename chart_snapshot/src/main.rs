/**
 * Entrypoint for `chart_snapshot`.
 *
 * Loads a page manifest describing the widgets of a dashboard page, runs
 * the chart adapter against the configured backend and prints the reports
 * and the resulting page state as JSON.
 */
use chart_adapter::{
    CHART_LIBRARY_URL, Dashboard, DashboardSettings, HeadlessPage,
    PageManifest, RefreshReport,
};
use pdn_app::{AppError, ContextProvider};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
struct Config {
    base_url: String,
    page_manifest: PathBuf,
    chart_library_url: Option<String>,
    request_timeout_secs: Option<u64>,
    /// JSON object of widget kind name to endpoint template.
    endpoint_overrides_json: Option<String>,
}

struct AppContext {
    dashboard: Dashboard<HeadlessPage>,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    reports: &'a [RefreshReport],
    page: &'a HeadlessPage,
}

fn dashboard_settings(
    config: &Config,
) -> Result<DashboardSettings, serde_json::Error> {
    let mut settings = DashboardSettings::new(config.base_url.clone());

    settings.chart_library_url = config
        .chart_library_url
        .clone()
        .unwrap_or_else(|| CHART_LIBRARY_URL.to_string());

    if let Some(timeout) = config.request_timeout_secs {
        settings.request_timeout_secs = timeout;
    }

    if let Some(overrides) = &config.endpoint_overrides_json {
        settings.endpoint_overrides =
            serde_json::from_str::<HashMap<String, String>>(overrides)?;
    }

    Ok(settings)
}

impl ContextProvider<Config> for AppContext {
    async fn new(config: Config) -> Result<Self, AppError> {
        let manifest = tokio::fs::read_to_string(&config.page_manifest)
            .await
            .map_err(|e| AppError::Context(Box::new(e)))?;
        let manifest: PageManifest = serde_json::from_str(&manifest)
            .map_err(|e| AppError::Context(Box::new(e)))?;

        let settings = dashboard_settings(&config)
            .map_err(|e| AppError::Context(Box::new(e)))?;

        let page = HeadlessPage::from_manifest(&manifest);
        let dashboard = Dashboard::new(page, &settings)
            .map_err(|e| AppError::Context(Box::new(e)))?;

        Ok(Self { dashboard })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let context =
        pdn_app::create_app_context::<AppContext, Config>().await?;

    let reports = context.dashboard.initialize().await;
    info!("Refreshed {} widget(s)", reports.len());

    let page = context.dashboard.into_surface();
    let snapshot = Snapshot {
        reports: &reports,
        page: &page,
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> Config {
        Config {
            base_url: "http://portal.local".to_string(),
            page_manifest: PathBuf::from("page.json"),
            chart_library_url: None,
            request_timeout_secs: None,
            endpoint_overrides_json: None,
        }
    }

    #[test]
    fn test_defaults() {
        let settings = dashboard_settings(&config()).unwrap();

        assert_eq!(settings.chart_library_url, CHART_LIBRARY_URL);
        assert_eq!(settings.request_timeout_secs, 30);
        assert!(settings.endpoint_overrides.is_empty());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = Config {
            request_timeout_secs: Some(3),
            endpoint_overrides_json: Some(
                r#"{"manhours-chart": "/manhours/v2/chart-data/"}"#
                    .to_string(),
            ),
            ..config()
        };

        let settings = dashboard_settings(&config).unwrap();

        assert_eq!(settings.request_timeout_secs, 3);
        assert_eq!(
            settings.endpoint_overrides["manhours-chart"],
            "/manhours/v2/chart-data/"
        );
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let config = Config {
            endpoint_overrides_json: Some("[1, 2]".to_string()),
            ..config()
        };

        assert!(dashboard_settings(&config).is_err());
    }
}
