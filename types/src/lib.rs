//! Shared data model for the dashboard chart crates: chart configurations
//! as the charting library consumes them, and the widget kinds a page can
//! declare.

mod chart;
mod widget;

pub use chart::{ChartConfig, ChartData, ChartKind, Dataset};
pub use widget::{
    Period, UnknownPeriod, UnknownWidgetKind, WidgetDescriptor, WidgetKind,
};
