/// Background and border color assigned to one generated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColor {
    pub background: &'static str,
    pub border: &'static str,
}

const PALETTE: [SeriesColor; 6] = [
    SeriesColor {
        background: "rgba(51, 102, 255, 0.6)",
        border: "rgba(51, 102, 255, 1)",
    },
    SeriesColor {
        background: "rgba(72, 199, 116, 0.6)",
        border: "rgba(72, 199, 116, 1)",
    },
    SeriesColor {
        background: "rgba(255, 193, 7, 0.6)",
        border: "rgba(255, 193, 7, 1)",
    },
    SeriesColor {
        background: "rgba(241, 70, 104, 0.6)",
        border: "rgba(241, 70, 104, 1)",
    },
    SeriesColor {
        background: "rgba(156, 39, 176, 0.6)",
        border: "rgba(156, 39, 176, 1)",
    },
    SeriesColor {
        background: "rgba(0, 188, 212, 0.6)",
        border: "rgba(0, 188, 212, 1)",
    },
];

/// Color for the series at `index`, cycling through the palette.
#[must_use]
pub const fn series_color(index: usize) -> SeriesColor {
    PALETTE[index % PALETTE.len()]
}
