use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chart kinds understood by the charting library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Doughnut,
    PolarArea,
    Radar,
    Scatter,
    Bubble,
}

/// A chart configuration generated from backend data.
///
/// Every dataset field is loosely typed and unknown keys are kept in
/// `extra`, so series data passed in by the backend comes back out with the
/// same meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,

    pub data: ChartData,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub options: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<Value>,

    #[serde(default)]
    pub datasets: Vec<Dataset>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,

    /// Usually an array of numbers; the library also takes objects keyed
    /// by label.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartConfig {
    /// An empty configuration of the given kind with the given options.
    #[must_use]
    pub fn new(kind: ChartKind, options: Value) -> Self {
        Self {
            kind,
            data: ChartData::default(),
            options,
            extra: Map::new(),
        }
    }
}
