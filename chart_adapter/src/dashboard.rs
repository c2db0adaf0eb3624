use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, error, info, warn};
use types::{Period, WidgetDescriptor};
use url::Url;

use crate::{
    ChartError,
    catalog::EndpointCatalog,
    client::ChartClient,
    discover::{Discovery, discover},
    registry::{ChartRegistry, RefreshTicket, WidgetEntry},
    shape::{ChartPayload, RenderPlan},
    surface::{ChartHandle, ChartSurface, canvas_id},
};

pub const CHART_LIBRARY_URL: &str =
    "https://cdn.jsdelivr.net/npm/chart.js@3.9.1/dist/chart.min.js";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_library_url() -> String {
    CHART_LIBRARY_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    /// Origin the endpoint templates are resolved against.
    pub base_url: String,

    #[serde(default = "default_library_url")]
    pub chart_library_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Widget kind name to endpoint template.
    #[serde(default)]
    pub endpoint_overrides: HashMap<String, String>,
}

impl DashboardSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            chart_library_url: default_library_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            endpoint_overrides: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    Rendered { charts: usize, shape: &'static str },
    /// The error panel is showing `message`.
    Failed { message: String },
    /// The payload matched no known shape; nothing was drawn.
    Unrecognized,
    /// A newer refresh of the same widget started before this one finished.
    Superseded,
    /// The widget has no container on the page.
    Missing,
    /// The declared widget type is not a chart kind.
    UnknownType { widget_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub widget_id: String,
    #[serde(flatten)]
    pub outcome: RenderOutcome,
}

struct Page<S> {
    surface: S,
    registry: ChartRegistry,
}

/// Drives the chart widgets of one page.
///
/// The page state sits behind an async mutex that is never held across a
/// network request, so refreshes of different widgets (or of the same one)
/// may overlap. Each refresh takes a generation from the registry and only
/// touches the page afterwards if that generation is still current.
pub struct Dashboard<S> {
    page: Mutex<Page<S>>,
    client: ChartClient,
    catalog: EndpointCatalog,
    library_url: String,
    library: OnceCell<Result<(), String>>,
}

impl<S: ChartSurface> Dashboard<S> {
    /// # Errors
    ///
    /// If the base URL is invalid, an endpoint override names an unknown
    /// widget kind, or the HTTP client cannot be built.
    pub fn new(
        surface: S,
        settings: &DashboardSettings,
    ) -> Result<Self, ChartError> {
        let base_url = Url::parse(&settings.base_url)?;
        let catalog = EndpointCatalog::new(base_url)
            .with_overrides(&settings.endpoint_overrides)?;
        let client = ChartClient::new(Duration::from_secs(
            settings.request_timeout_secs,
        ))?;

        Ok(Self {
            page: Mutex::new(Page {
                surface,
                registry: ChartRegistry::new(),
            }),
            client,
            catalog,
            library_url: settings.chart_library_url.clone(),
            library: OnceCell::new(),
        })
    }

    /// Make sure the charting library is present, then draw every chart
    /// widget on the page.
    ///
    /// When the library cannot be loaded nothing is drawn and the report is
    /// empty.
    pub async fn initialize(&self) -> Vec<RefreshReport> {
        if self.ensure_chart_library().await.is_err() {
            return Vec::new();
        }

        self.refresh_all().await
    }

    /// Load the charting library from its CDN unless the page already has
    /// it. The load is attempted at most once; later calls return the first
    /// attempt's result.
    ///
    /// # Errors
    ///
    /// If the library had to be downloaded and the download failed.
    pub async fn ensure_chart_library(&self) -> Result<(), ChartError> {
        self.library
            .get_or_init(|| self.load_chart_library())
            .await
            .clone()
            .map_err(|reason| ChartError::LibraryLoad {
                url: self.library_url.clone(),
                reason,
            })
    }

    async fn load_chart_library(&self) -> Result<(), String> {
        if self.page.lock().await.surface.chart_library_loaded() {
            debug!("Chart library already loaded");
            return Ok(());
        }

        info!("Chart library not loaded, loading {}", self.library_url);

        match self.client.fetch_script(&self.library_url).await {
            Ok(source) if source.trim().is_empty() => {
                error!(
                    "Failed to load chart library: {} returned an empty script",
                    self.library_url
                );
                Err("empty script".to_string())
            }
            Ok(source) => {
                self.page
                    .lock()
                    .await
                    .surface
                    .inject_script(&self.library_url, &source);
                info!("Chart library loaded");
                Ok(())
            }
            Err(e) => {
                error!("Failed to load chart library: {}", e);
                Err(e.to_string())
            }
        }
    }

    /// Resolve the chart canvases on the page and start tracking the ones
    /// with a known widget kind.
    pub async fn discover(&self) -> Vec<Discovery> {
        let mut page = self.page.lock().await;
        let found = discover(&page.surface);

        for discovery in &found {
            match discovery {
                Discovery::Widget(descriptor) => {
                    page.registry.register(descriptor);
                }
                Discovery::UnknownType {
                    widget_id,
                    widget_type,
                } => {
                    warn!(
                        "Unknown chart widget type {} on {}",
                        widget_type, widget_id
                    );
                }
                Discovery::Untyped { widget_id } => {
                    debug!("Canvas {} has no widget type", widget_id);
                }
            }
        }

        found
    }

    /// Refresh every chart widget on the page, one after the other.
    ///
    /// A failing widget never stops the others. Widgets that are tracked and
    /// still have a container but whose canvas was replaced by an earlier
    /// render are refreshed too.
    pub async fn refresh_all(&self) -> Vec<RefreshReport> {
        let mut reports = Vec::new();
        let mut widget_ids = Vec::new();

        for discovery in self.discover().await {
            match discovery {
                Discovery::Widget(WidgetDescriptor { id, .. }) => {
                    widget_ids.push(id);
                }
                Discovery::UnknownType {
                    widget_id,
                    widget_type,
                } => reports.push(RefreshReport {
                    widget_id,
                    outcome: RenderOutcome::UnknownType { widget_type },
                }),
                Discovery::Untyped { .. } => {}
            }
        }

        {
            let page = self.page.lock().await;
            let mut tracked: Vec<String> = page
                .registry
                .entries()
                .map(|(id, _)| id.clone())
                .filter(|id| {
                    !widget_ids.contains(id) && page.surface.has_container(id)
                })
                .collect();
            tracked.sort();
            widget_ids.extend(tracked);
        }

        for widget_id in widget_ids {
            let outcome = match self.refresh(&widget_id).await {
                Ok(outcome) => outcome,
                Err(e) => RenderOutcome::Failed {
                    message: e.to_string(),
                },
            };
            reports.push(RefreshReport { widget_id, outcome });
        }

        reports
    }

    /// Fetch the widget's data and redraw it.
    ///
    /// # Errors
    ///
    /// If the widget was never discovered.
    pub async fn refresh(
        &self,
        widget_id: &str,
    ) -> Result<RenderOutcome, ChartError> {
        let Some(ticket) = self.begin_refresh(widget_id).await? else {
            return Ok(RenderOutcome::Missing);
        };

        let result = self.fetch(&ticket).await.and_then(|payload| {
            let decoded = ChartPayload::decode(&payload);
            let shape = decoded.shape_name();
            Ok((shape, decoded.into_plan()?))
        });

        let mut page = self.page.lock().await;
        let Page { surface, registry } = &mut *page;

        if !registry.is_current(widget_id, ticket.generation) {
            debug!(
                "Discarding stale response for {} (generation {})",
                widget_id, ticket.generation
            );
            return Ok(RenderOutcome::Superseded);
        }

        let (shape, plan) = match result {
            Ok(decoded) => decoded,
            Err(e) => {
                error!("Error fetching chart data for {}: {}", widget_id, e);
                let message = e.to_string();
                surface.show_error(widget_id, &message);
                registry.fail(widget_id, ticket.generation, message.clone());
                return Ok(RenderOutcome::Failed { message });
            }
        };

        let charts: Vec<ChartHandle> = match plan {
            RenderPlan::Single(config) => {
                surface.clear_loading(widget_id);
                vec![surface.create_chart(&canvas_id(widget_id), &config)]
            }
            RenderPlan::Dual {
                distribution,
                trend,
            } => {
                let [first, second] = surface.mount_dual_canvases(widget_id);
                vec![
                    surface.create_chart(&first, &distribution),
                    surface.create_chart(&second, &trend),
                ]
            }
            RenderPlan::Nothing => {
                warn!("Unrecognized chart data shape for {}", widget_id);
                surface.clear_loading(widget_id);
                registry.settle_empty(widget_id, ticket.generation);
                return Ok(RenderOutcome::Unrecognized);
            }
        };

        let count = charts.len();
        for handle in registry.install(widget_id, ticket.generation, charts) {
            surface.destroy_chart(handle);
        }

        info!("Rendered {} chart(s) for {} ({})", count, widget_id, shape);

        Ok(RenderOutcome::Rendered {
            charts: count,
            shape,
        })
    }

    /// Destroy the widget's live charts and show the loading state.
    ///
    /// Returns `None` when the widget has no container on the page.
    async fn begin_refresh(
        &self,
        widget_id: &str,
    ) -> Result<Option<RefreshTicket>, ChartError> {
        let mut page = self.page.lock().await;
        let Page { surface, registry } = &mut *page;

        if registry.get(widget_id).is_none() {
            return Err(ChartError::UnknownWidget(widget_id.to_string()));
        }
        if !surface.has_container(widget_id) {
            warn!("No chart container for {}", widget_id);
            return Ok(None);
        }

        let Some(ticket) = registry.begin(widget_id) else {
            return Err(ChartError::UnknownWidget(widget_id.to_string()));
        };

        for handle in &ticket.retired {
            surface.destroy_chart(*handle);
        }
        surface.show_loading(widget_id);

        Ok(Some(ticket))
    }

    async fn fetch(
        &self,
        ticket: &RefreshTicket,
    ) -> Result<serde_json::Value, ChartError> {
        let url = self.catalog.resolve(ticket.kind, ticket.period)?;
        debug!("Fetching chart data from {}", url);
        self.client.fetch_json(&url).await
    }

    /// Switch a widget to another period and redraw it.
    ///
    /// # Errors
    ///
    /// If the widget is unknown or its kind does not offer `period`.
    pub async fn set_period(
        &self,
        widget_id: &str,
        period: Period,
    ) -> Result<RenderOutcome, ChartError> {
        {
            let mut page = self.page.lock().await;
            let kind = page
                .registry
                .get(widget_id)
                .map(|entry| entry.kind)
                .ok_or_else(|| ChartError::UnknownWidget(widget_id.to_string()))?;

            if !kind.supports(period) {
                return Err(ChartError::UnsupportedPeriod { kind, period });
            }

            page.registry.set_period(widget_id, period);
        }

        self.refresh(widget_id).await
    }

    /// Stop tracking a widget and destroy its live charts. A refresh of the
    /// widget still in flight is discarded when it completes.
    ///
    /// Returns false when the widget was not tracked.
    pub async fn remove_widget(&self, widget_id: &str) -> bool {
        let mut page = self.page.lock().await;
        let Page { surface, registry } = &mut *page;

        if registry.get(widget_id).is_none() {
            return false;
        }

        let released = registry.forget(widget_id);
        debug!("Removing {} with {} chart(s)", widget_id, released.len());
        for handle in released {
            surface.destroy_chart(handle);
        }

        true
    }

    pub async fn widget(&self, widget_id: &str) -> Option<WidgetEntry> {
        self.page.lock().await.registry.get(widget_id).cloned()
    }

    /// Run `f` against the page.
    pub async fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.page.lock().await.surface)
    }

    /// Destroy every live chart and stop tracking all widgets.
    pub async fn shutdown(&self) {
        let mut page = self.page.lock().await;
        let Page { surface, registry } = &mut *page;

        let released = registry.clear();
        info!("Destroying {} chart(s)", released.len());
        for handle in released {
            surface.destroy_chart(handle);
        }
    }

    pub fn into_surface(self) -> S {
        self.page.into_inner().surface
    }
}
