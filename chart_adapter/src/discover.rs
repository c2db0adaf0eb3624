use types::{WidgetDescriptor, WidgetKind};

use crate::surface::{CANVAS_SUFFIX, ChartSurface, WIDGET_TYPE_ATTRIBUTE};

/// What a chart canvas on the page resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    Widget(WidgetDescriptor),
    UnknownType {
        widget_id: String,
        widget_type: String,
    },
    /// The canvas has no widget element declaring a type.
    Untyped { widget_id: String },
}

/// Find every chart canvas on the page and resolve its widget kind.
pub fn discover<S: ChartSurface + ?Sized>(surface: &S) -> Vec<Discovery> {
    surface
        .canvas_ids()
        .iter()
        .filter_map(|canvas| canvas.strip_suffix(CANVAS_SUFFIX))
        .filter(|widget_id| !widget_id.is_empty())
        .map(|widget_id| {
            let Some(widget_type) =
                surface.attribute(widget_id, WIDGET_TYPE_ATTRIBUTE)
            else {
                return Discovery::Untyped {
                    widget_id: widget_id.to_string(),
                };
            };

            match widget_type.parse::<WidgetKind>() {
                Ok(kind) => Discovery::Widget(WidgetDescriptor {
                    id: widget_id.to_string(),
                    kind,
                }),
                Err(_) => Discovery::UnknownType {
                    widget_id: widget_id.to_string(),
                    widget_type,
                },
            }
        })
        .collect()
}
