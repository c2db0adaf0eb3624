//! An in-memory page for running the adapter without a browser.
//!
//! The page is described by a [`PageManifest`] and records what a browser
//! would show: the contents of every widget container, the live chart
//! instances with their configurations, destroyed instances, and the
//! scripts injected into the document head.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::surface::{
    ChartHandle, ChartSurface, WIDGET_TYPE_ATTRIBUTE, canvas_id,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageManifest {
    #[serde(default)]
    pub chart_library_loaded: bool,

    #[serde(default)]
    pub widgets: Vec<ManifestWidget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestWidget {
    pub id: String,

    /// Value of the widget element's `data-type` attribute.
    #[serde(rename = "type")]
    pub widget_type: Option<String>,

    /// Pages may declare a widget element without a chart canvas.
    #[serde(default = "default_true")]
    pub canvas: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContainerContent {
    Canvas { canvas: String },
    Loading { canvas: String },
    Error { message: String, canvas: String },
    Dual { canvases: [String; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveChart {
    pub canvas: String,
    pub config: Value,
}

#[derive(Debug, Default, Serialize)]
pub struct HeadlessPage {
    chart_library_loaded: bool,
    scripts: Vec<String>,
    attributes: BTreeMap<String, BTreeMap<String, String>>,
    containers: BTreeMap<String, ContainerContent>,
    charts: BTreeMap<ChartHandle, LiveChart>,
    destroyed: Vec<ChartHandle>,
    #[serde(skip)]
    next_handle: u64,
}

impl HeadlessPage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_manifest(manifest: &PageManifest) -> Self {
        let mut page = Self::new().with_chart_library(manifest.chart_library_loaded);

        for widget in &manifest.widgets {
            if let Some(widget_type) = &widget.widget_type {
                page.set_attribute(&widget.id, WIDGET_TYPE_ATTRIBUTE, widget_type);
            }
            if widget.canvas {
                page.containers.insert(
                    widget.id.clone(),
                    ContainerContent::Canvas {
                        canvas: canvas_id(&widget.id),
                    },
                );
            }
        }

        page
    }

    #[must_use]
    pub fn with_chart_library(mut self, loaded: bool) -> Self {
        self.chart_library_loaded = loaded;
        self
    }

    /// Add a widget element with its chart canvas.
    #[must_use]
    pub fn with_widget(mut self, widget_id: &str, widget_type: &str) -> Self {
        self.set_attribute(widget_id, WIDGET_TYPE_ATTRIBUTE, widget_type);
        self.containers.insert(
            widget_id.to_string(),
            ContainerContent::Canvas {
                canvas: canvas_id(widget_id),
            },
        );
        self
    }

    pub fn set_attribute(&mut self, element_id: &str, name: &str, value: &str) {
        self.attributes
            .entry(element_id.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    #[must_use]
    pub fn container(&self, widget_id: &str) -> Option<&ContainerContent> {
        self.containers.get(widget_id)
    }

    #[must_use]
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    #[must_use]
    pub fn destroyed(&self) -> &[ChartHandle] {
        &self.destroyed
    }

    #[must_use]
    pub fn live_chart_count(&self) -> usize {
        self.charts.len()
    }

    /// Live charts drawn on the canvas with the given id.
    #[must_use]
    pub fn charts_on(&self, canvas: &str) -> Vec<&Value> {
        self.charts
            .values()
            .filter(|chart| chart.canvas == canvas)
            .map(|chart| &chart.config)
            .collect()
    }
}

impl ChartSurface for HeadlessPage {
    fn chart_library_loaded(&self) -> bool {
        self.chart_library_loaded
    }

    fn inject_script(&mut self, url: &str, _source: &str) {
        self.scripts.push(url.to_string());
        self.chart_library_loaded = true;
    }

    fn canvas_ids(&self) -> Vec<String> {
        self.containers
            .values()
            .flat_map(|content| match content {
                ContainerContent::Canvas { canvas }
                | ContainerContent::Loading { canvas }
                | ContainerContent::Error { canvas, .. } => {
                    vec![canvas.clone()]
                }
                ContainerContent::Dual { canvases } => canvases.to_vec(),
            })
            .collect()
    }

    fn attribute(&self, element_id: &str, name: &str) -> Option<String> {
        self.attributes.get(element_id)?.get(name).cloned()
    }

    fn has_container(&self, widget_id: &str) -> bool {
        self.containers.contains_key(widget_id)
    }

    fn show_loading(&mut self, widget_id: &str) {
        if let Some(content) = self.containers.get_mut(widget_id) {
            *content = ContainerContent::Loading {
                canvas: canvas_id(widget_id),
            };
        }
    }

    fn clear_loading(&mut self, widget_id: &str) {
        if let Some(content) = self.containers.get_mut(widget_id)
            && matches!(content, ContainerContent::Loading { .. })
        {
            *content = ContainerContent::Canvas {
                canvas: canvas_id(widget_id),
            };
        }
    }

    fn show_error(&mut self, widget_id: &str, message: &str) {
        if let Some(content) = self.containers.get_mut(widget_id) {
            *content = ContainerContent::Error {
                message: message.to_string(),
                canvas: canvas_id(widget_id),
            };
        }
    }

    fn mount_dual_canvases(&mut self, widget_id: &str) -> [String; 2] {
        let canvases = [
            format!("{widget_id}-pie-chart"),
            format!("{widget_id}-trend-chart"),
        ];

        self.containers.insert(
            widget_id.to_string(),
            ContainerContent::Dual {
                canvases: canvases.clone(),
            },
        );

        canvases
    }

    fn create_chart(&mut self, canvas_id: &str, config: &Value) -> ChartHandle {
        self.next_handle += 1;
        let handle = ChartHandle(self.next_handle);

        self.charts.insert(
            handle,
            LiveChart {
                canvas: canvas_id.to_string(),
                config: config.clone(),
            },
        );

        handle
    }

    fn destroy_chart(&mut self, handle: ChartHandle) {
        if self.charts.remove(&handle).is_some() {
            self.destroyed.push(handle);
        }
    }
}
