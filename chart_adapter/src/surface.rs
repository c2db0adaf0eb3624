use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Suffix marking an element as a chart canvas.
pub const CANVAS_SUFFIX: &str = "-chart";

/// Attribute carrying the widget kind on the widget's own element.
pub const WIDGET_TYPE_ATTRIBUTE: &str = "data-type";

/// Opaque reference to a chart instance owned by the charting library.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChartHandle(pub u64);

#[must_use]
pub fn canvas_id(widget_id: &str) -> String {
    format!("{widget_id}{CANVAS_SUFFIX}")
}

/// The document and charting library the adapter renders into.
///
/// A widget is addressed by its id; its container is the element wrapping
/// the `{id}-chart` canvas.
pub trait ChartSurface: Send {
    /// Whether the charting library's global entry point is defined.
    fn chart_library_loaded(&self) -> bool;

    /// Append a script element to the document head.
    fn inject_script(&mut self, url: &str, source: &str);

    /// Ids of every canvas element currently in the document.
    fn canvas_ids(&self) -> Vec<String>;

    fn attribute(&self, element_id: &str, name: &str) -> Option<String>;

    fn has_container(&self, widget_id: &str) -> bool;

    /// Replace the container contents with a loading indicator, keeping the
    /// widget's primary canvas in place.
    fn show_loading(&mut self, widget_id: &str);

    fn clear_loading(&mut self, widget_id: &str);

    /// Replace the container contents with an error panel showing `message`.
    fn show_error(&mut self, widget_id: &str, message: &str);

    /// Replace the container contents with two side-by-side canvases and
    /// return their ids, distribution first.
    fn mount_dual_canvases(&mut self, widget_id: &str) -> [String; 2];

    /// Construct a chart from a configuration in the library's JSON form.
    fn create_chart(&mut self, canvas_id: &str, config: &Value) -> ChartHandle;

    fn destroy_chart(&mut self, handle: ChartHandle);
}
