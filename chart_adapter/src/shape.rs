//! Decoding of backend chart payloads.
//!
//! The backend answers chart requests with several JSON layouts and no
//! discriminant field. [`ChartPayload::decode`] tries one validator per
//! layout, in a fixed order, and falls back to
//! [`ChartPayload::Unrecognized`] when none of them match.
//!
//! Configurations the backend built itself are kept as raw JSON and handed
//! to the charting library untouched. Only the layouts that have to be
//! pivoted go through the typed [`ChartConfig`] model.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use types::{ChartConfig, ChartData, ChartKind, Dataset};

use crate::palette::series_color;

const DISTRIBUTION_KEYS: [&str; 2] =
    ["status_distribution", "approval_distribution"];
const TREND_KEY: &str = "monthly_trend";
const PREBUILT_KEYS: [&str; 3] = ["type", "data", "options"];
const ROW_LABEL_KEYS: [&str; 2] = ["date", "label"];
const SERIES_LABEL_KEYS: [&str; 2] = ["categories", "labels"];

const LINE_SERIES_THRESHOLD: usize = 3;
const LINE_LABEL_THRESHOLD: usize = 10;
const LINE_TENSION: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub enum ChartPayload {
    /// A distribution chart and a trend chart, both complete configurations.
    Dual { distribution: Value, trend: Value },
    /// A complete configuration (`type`, `data` and `options`).
    Prebuilt(Value),
    /// Parallel `labels` and `datasets` arrays.
    LabeledSeries(ChartData),
    /// Records sharing keys, one of them being `date` or `label`.
    RowRecords(Vec<Map<String, Value>>),
    /// Only one half of a dual payload.
    Embedded(Value),
    /// Series name to values, labelled by `categories` or `labels`.
    KeyedSeries {
        labels: Vec<Value>,
        series: Vec<(String, Vec<Value>)>,
    },
    Unrecognized,
}

/// What the surface has to draw for one widget, as the JSON configurations
/// the charting library consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPlan {
    Single(Value),
    Dual { distribution: Value, trend: Value },
    Nothing,
}

impl ChartPayload {
    #[must_use]
    pub fn decode(value: &Value) -> Self {
        match value {
            Value::Array(items) => decode_rows(items),
            Value::Object(map) => decode_object(map),
            _ => Self::Unrecognized,
        }
    }

    #[must_use]
    pub const fn shape_name(&self) -> &'static str {
        match self {
            Self::Dual { .. } => "dual",
            Self::Prebuilt(_) => "prebuilt",
            Self::LabeledSeries(_) => "labeled-series",
            Self::RowRecords(_) => "row-records",
            Self::Embedded(_) => "embedded",
            Self::KeyedSeries { .. } => "keyed-series",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// # Errors
    ///
    /// If a generated configuration cannot be serialized.
    pub fn into_plan(self) -> Result<RenderPlan, serde_json::Error> {
        let plan = match self {
            Self::Dual {
                distribution,
                trend,
            } => RenderPlan::Dual {
                distribution,
                trend,
            },
            Self::Prebuilt(config) | Self::Embedded(config) => {
                RenderPlan::Single(config)
            }
            Self::LabeledSeries(data) => {
                RenderPlan::Single(serde_json::to_value(styled(data))?)
            }
            Self::RowRecords(rows) => RenderPlan::Single(serde_json::to_value(
                styled(pivot_rows(&rows)),
            )?),
            Self::KeyedSeries { labels, series } => RenderPlan::Single(
                serde_json::to_value(styled(pivot_series(labels, series)))?,
            ),
            Self::Unrecognized => RenderPlan::Nothing,
        };

        Ok(plan)
    }
}

/// A complete configuration names a chart kind the library knows and
/// carries `data`. Nothing else about it is checked.
fn is_chart_config(value: &Value) -> bool {
    value
        .get("type")
        .is_some_and(|kind| ChartKind::deserialize(kind).is_ok())
        && value.get("data").is_some()
}

fn decode_rows(items: &[Value]) -> ChartPayload {
    let rows: Option<Vec<Map<String, Value>>> =
        items.iter().map(|item| item.as_object().cloned()).collect();

    rows.map_or(ChartPayload::Unrecognized, ChartPayload::RowRecords)
}

fn decode_object(map: &Map<String, Value>) -> ChartPayload {
    let distribution = DISTRIBUTION_KEYS.iter().find_map(|key| map.get(*key));
    let trend = map.get(TREND_KEY);

    if let (Some(distribution), Some(trend)) = (distribution, trend)
        && is_chart_config(distribution)
        && is_chart_config(trend)
    {
        return ChartPayload::Dual {
            distribution: distribution.clone(),
            trend: trend.clone(),
        };
    }

    let whole = Value::Object(map.clone());
    if PREBUILT_KEYS.iter().all(|key| map.contains_key(*key))
        && is_chart_config(&whole)
    {
        return ChartPayload::Prebuilt(whole);
    }

    if map.get("labels").is_some_and(Value::is_array)
        && map.get("datasets").is_some_and(Value::is_array)
        && let Ok(data) = ChartData::deserialize(&whole)
    {
        return ChartPayload::LabeledSeries(data);
    }

    if let Some(config) =
        distribution.into_iter().chain(trend).find(|v| is_chart_config(v))
    {
        return ChartPayload::Embedded(config.clone());
    }

    decode_keyed_series(map)
}

fn decode_keyed_series(map: &Map<String, Value>) -> ChartPayload {
    let Some(labels) = SERIES_LABEL_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
    else {
        return ChartPayload::Unrecognized;
    };

    let series: Option<Vec<(String, Vec<Value>)>> = map
        .iter()
        .filter(|(key, _)| !SERIES_LABEL_KEYS.contains(&key.as_str()))
        .map(|(key, values)| {
            values.as_array().map(|values| (key.clone(), values.clone()))
        })
        .collect();

    match series {
        Some(series) if !series.is_empty() => ChartPayload::KeyedSeries {
            labels: labels.clone(),
            series,
        },
        _ => ChartPayload::Unrecognized,
    }
}

/// Turns `monthly_total` into `Monthly total`.
fn series_label(key: &str) -> String {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    first
        .to_uppercase()
        .chain(chars.as_str().replacen('_', " ", 1).chars())
        .collect()
}

fn series_dataset(index: usize, key: &str, data: Vec<Value>) -> Dataset {
    let color = series_color(index);

    Dataset {
        label: Some(json!(series_label(key))),
        data: Value::Array(data),
        background_color: Some(json!(color.background)),
        border_color: Some(json!(color.border)),
        border_width: Some(json!(1)),
        ..Dataset::default()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn row_label(row: &Map<String, Value>) -> Value {
    ROW_LABEL_KEYS
        .iter()
        .filter_map(|key| row.get(*key))
        .find(|value| is_truthy(value))
        .cloned()
        .unwrap_or(Value::Null)
}

fn pivot_rows(rows: &[Map<String, Value>]) -> ChartData {
    let Some(first) = rows.first() else {
        return ChartData::default();
    };

    let datasets = first
        .keys()
        .filter(|key| !ROW_LABEL_KEYS.contains(&key.as_str()))
        .enumerate()
        .map(|(index, key)| {
            let data = rows
                .iter()
                .map(|row| row.get(key).cloned().unwrap_or(Value::Null))
                .collect();
            series_dataset(index, key, data)
        })
        .collect();

    ChartData {
        labels: rows.iter().map(row_label).collect(),
        datasets,
        extra: Map::new(),
    }
}

fn pivot_series(
    labels: Vec<Value>,
    series: Vec<(String, Vec<Value>)>,
) -> ChartData {
    let datasets = series
        .into_iter()
        .enumerate()
        .map(|(index, (key, data))| series_dataset(index, &key, data))
        .collect();

    ChartData {
        labels,
        datasets,
        extra: Map::new(),
    }
}

fn default_options() -> Value {
    json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "animation": {
            "duration": 1000,
            "easing": "easeOutQuart"
        },
        "plugins": {
            "legend": {
                "position": "top"
            },
            "tooltip": {
                "mode": "index",
                "intersect": false
            }
        },
        "scales": {
            "y": {
                "beginAtZero": true,
                "ticks": {
                    "precision": 0
                }
            }
        }
    })
}

/// Wrap generated data in the default options and pick its chart kind.
fn styled(data: ChartData) -> ChartConfig {
    let mut config = ChartConfig::new(ChartKind::Bar, default_options());
    config.data = data;
    apply_kind_heuristic(&mut config);
    config
}

/// One series reads best as bars; many series or many labels as lines.
fn apply_kind_heuristic(config: &mut ChartConfig) {
    let series = config.data.datasets.len();
    let as_line = series != 1
        && (series > LINE_SERIES_THRESHOLD
            || config.data.labels.len() > LINE_LABEL_THRESHOLD);

    if !as_line {
        config.kind = ChartKind::Bar;
        return;
    }

    config.kind = ChartKind::Line;
    for dataset in &mut config.data.datasets {
        dataset.fill = Some(json!(false));
        dataset.tension = Some(json!(LINE_TENSION));
    }
}
