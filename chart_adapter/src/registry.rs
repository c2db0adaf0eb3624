use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use types::{Period, WidgetDescriptor, WidgetKind};

use crate::surface::ChartHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    Idle,
    Loading,
    Rendered,
    Failed,
}

/// Everything the adapter tracks about one widget.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetEntry {
    pub kind: WidgetKind,
    pub period: Period,
    pub generation: u64,
    pub state: WidgetState,
    pub charts: Vec<ChartHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_rendered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Handed out when a refresh starts.
///
/// `retired` holds the charts that were live for the widget; they must be
/// destroyed before the new ones are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
    pub kind: WidgetKind,
    pub period: Period,
    pub retired: Vec<ChartHandle>,
}

/// Widget id to live chart handles, with a generation per widget so that a
/// response belonging to an older refresh can be recognized and dropped.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    widgets: HashMap<String, WidgetEntry>,
}

impl ChartRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a discovered widget. A widget already known with the same kind
    /// keeps its selected period and live charts.
    pub fn register(&mut self, descriptor: &WidgetDescriptor) {
        let entry = self
            .widgets
            .entry(descriptor.id.clone())
            .or_insert_with(|| WidgetEntry {
                kind: descriptor.kind,
                period: descriptor.kind.default_period(),
                generation: 0,
                state: WidgetState::Idle,
                charts: Vec::new(),
                last_rendered_at: None,
                last_error: None,
            });

        if entry.kind != descriptor.kind {
            entry.kind = descriptor.kind;
            entry.period = descriptor.kind.default_period();
        }
    }

    #[must_use]
    pub fn get(&self, widget_id: &str) -> Option<&WidgetEntry> {
        self.widgets.get(widget_id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &WidgetEntry)> {
        self.widgets.iter()
    }

    /// Returns false when the widget is unknown.
    pub fn set_period(&mut self, widget_id: &str, period: Period) -> bool {
        let Some(entry) = self.widgets.get_mut(widget_id) else {
            return false;
        };
        entry.period = period;
        true
    }

    pub fn begin(&mut self, widget_id: &str) -> Option<RefreshTicket> {
        let entry = self.widgets.get_mut(widget_id)?;

        entry.generation += 1;
        entry.state = WidgetState::Loading;
        entry.last_error = None;

        Some(RefreshTicket {
            generation: entry.generation,
            kind: entry.kind,
            period: entry.period,
            retired: std::mem::take(&mut entry.charts),
        })
    }

    #[must_use]
    pub fn is_current(&self, widget_id: &str, generation: u64) -> bool {
        self.widgets
            .get(widget_id)
            .is_some_and(|entry| entry.generation == generation)
    }

    /// Record the charts created for `generation`, returning whatever was
    /// live before so the caller can destroy it.
    pub fn install(
        &mut self,
        widget_id: &str,
        generation: u64,
        charts: Vec<ChartHandle>,
    ) -> Vec<ChartHandle> {
        let Some(entry) = self.widgets.get_mut(widget_id) else {
            return charts;
        };
        if entry.generation != generation {
            return charts;
        }

        entry.state = WidgetState::Rendered;
        entry.last_rendered_at = Some(Utc::now());
        std::mem::replace(&mut entry.charts, charts)
    }

    /// Returns false when `generation` is no longer current.
    pub fn fail(
        &mut self,
        widget_id: &str,
        generation: u64,
        message: String,
    ) -> bool {
        match self.widgets.get_mut(widget_id) {
            Some(entry) if entry.generation == generation => {
                entry.state = WidgetState::Failed;
                entry.last_error = Some(message);
                true
            }
            _ => false,
        }
    }

    /// Settle a refresh that produced no chart and no error.
    pub fn settle_empty(&mut self, widget_id: &str, generation: u64) {
        if let Some(entry) = self.widgets.get_mut(widget_id)
            && entry.generation == generation
        {
            entry.state = WidgetState::Idle;
        }
    }

    /// Stop tracking a widget, returning its live charts.
    pub fn forget(&mut self, widget_id: &str) -> Vec<ChartHandle> {
        self.widgets
            .remove(widget_id)
            .map(|entry| entry.charts)
            .unwrap_or_default()
    }

    /// Stop tracking every widget, returning all live charts.
    pub fn clear(&mut self) -> Vec<ChartHandle> {
        self.widgets
            .drain()
            .flat_map(|(_, entry)| entry.charts)
            .collect()
    }

    #[must_use]
    pub fn live_chart_count(&self) -> usize {
        self.widgets.values().map(|entry| entry.charts.len()).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry_with(id: &str, kind: WidgetKind) -> ChartRegistry {
        let mut registry = ChartRegistry::new();
        registry.register(&WidgetDescriptor {
            id: id.to_string(),
            kind,
        });
        registry
    }

    #[test]
    fn test_begin_retires_live_charts() {
        let mut registry = registry_with("jo", WidgetKind::JoRequestorChart);

        let first = registry.begin("jo").unwrap();
        assert_eq!(first.generation, 1);
        assert_eq!(first.period, Period::SixMonths);
        assert!(first.retired.is_empty());

        let replaced = registry.install("jo", 1, vec![ChartHandle(7)]);
        assert!(replaced.is_empty());

        let second = registry.begin("jo").unwrap();
        assert_eq!(second.generation, 2);
        assert_eq!(second.retired, vec![ChartHandle(7)]);
        assert_eq!(registry.get("jo").unwrap().state, WidgetState::Loading);
        assert_eq!(registry.live_chart_count(), 0);
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let mut registry = registry_with("mon", WidgetKind::MonitoringChart);

        let stale = registry.begin("mon").unwrap();
        let current = registry.begin("mon").unwrap();

        assert!(!registry.is_current("mon", stale.generation));
        assert!(registry.is_current("mon", current.generation));

        let rejected =
            registry.install("mon", stale.generation, vec![ChartHandle(1)]);
        assert_eq!(rejected, vec![ChartHandle(1)]);
        assert!(!registry.fail("mon", stale.generation, "late".to_string()));
        assert_eq!(registry.live_chart_count(), 0);
    }

    #[test]
    fn test_fail_records_message() {
        let mut registry = registry_with("dcf", WidgetKind::DcfApproverChart);
        let ticket = registry.begin("dcf").unwrap();

        assert!(registry.fail("dcf", ticket.generation, "500".to_string()));

        let entry = registry.get("dcf").unwrap();
        assert_eq!(entry.state, WidgetState::Failed);
        assert_eq!(entry.last_error.as_deref(), Some("500"));
    }

    #[test]
    fn test_reregistering_keeps_selected_period() {
        let mut registry = registry_with("jo", WidgetKind::JoApproverChart);
        assert!(registry.set_period("jo", Period::OneYear));

        registry.register(&WidgetDescriptor {
            id: "jo".to_string(),
            kind: WidgetKind::JoApproverChart,
        });
        assert_eq!(registry.get("jo").unwrap().period, Period::OneYear);

        registry.register(&WidgetDescriptor {
            id: "jo".to_string(),
            kind: WidgetKind::MonitoringChart,
        });
        assert_eq!(registry.get("jo").unwrap().period, Period::Month);
    }

    #[test]
    fn test_forget_releases_one_widget() {
        let mut registry = registry_with("mh", WidgetKind::ManhoursChart);
        let ticket = registry.begin("mh").unwrap();
        registry.install("mh", ticket.generation, vec![ChartHandle(4)]);

        assert_eq!(registry.forget("mh"), vec![ChartHandle(4)]);
        assert!(registry.forget("mh").is_empty());
        assert!(!registry.is_current("mh", ticket.generation));
    }

    #[test]
    fn test_clear_returns_every_live_chart() {
        let mut registry = registry_with("a", WidgetKind::ManhoursChart);
        registry.register(&WidgetDescriptor {
            id: "b".to_string(),
            kind: WidgetKind::DcfRequestorChart,
        });
        let a = registry.begin("a").unwrap();
        let b = registry.begin("b").unwrap();
        registry.install("a", a.generation, vec![ChartHandle(1)]);
        registry.install("b", b.generation, vec![ChartHandle(2), ChartHandle(3)]);

        let mut released = registry.clear();
        released.sort_by_key(|handle| handle.0);

        assert_eq!(released, vec![ChartHandle(1), ChartHandle(2), ChartHandle(3)]);
        assert!(registry.get("a").is_none());
        assert!(!registry.set_period("a", Period::OneYear));
    }
}
