use thiserror::Error;
use types::{Period, UnknownWidgetKind, WidgetKind};

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to fetch chart data: {status} {reason}")]
    HttpStatus { status: u16, reason: String },
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid chart data: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    UnknownWidgetKind(#[from] UnknownWidgetKind),
    #[error("No chart widget with id {0}")]
    UnknownWidget(String),
    #[error("Period {period} is not offered by {kind} widgets")]
    UnsupportedPeriod { kind: WidgetKind, period: Period },
    #[error("Failed to load chart library from {url}: {reason}")]
    LibraryLoad { url: String, reason: String },
}
