//! Chart widgets for the portal dashboard.
//!
//! A page declares chart widgets as `{id}-chart` canvases next to an element
//! `{id}` whose `data-type` names the widget kind. [`Dashboard`] finds those
//! widgets, fetches each one's data from the backend endpoint registered for
//! its kind, works out which of the known payload shapes came back, and
//! draws the resulting chart configuration on a [`ChartSurface`].

pub mod catalog;
pub mod client;
pub mod dashboard;
pub mod discover;
mod error;
pub mod headless;
pub mod palette;
pub mod registry;
pub mod shape;
pub mod surface;

pub use catalog::EndpointCatalog;
pub use dashboard::{
    CHART_LIBRARY_URL, Dashboard, DashboardSettings, RefreshReport,
    RenderOutcome,
};
pub use error::ChartError;
pub use headless::{HeadlessPage, PageManifest};
pub use shape::{ChartPayload, RenderPlan};
pub use surface::{ChartHandle, ChartSurface};
