use serde_json::{Value, json};

use crate::symbology::{CirclePaint, LinePaint, Paint};

/// A style layer drawing one source.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub paint: Paint,
}

impl LayerSpec {
    pub fn circle(id: impl Into<String>, source: impl Into<String>, paint: CirclePaint) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            paint: Paint::Circle(paint),
        }
    }

    pub fn line(id: impl Into<String>, source: impl Into<String>, paint: LinePaint) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            paint: Paint::Line(paint),
        }
    }

    /// Style-spec JSON for hosts that take layer definitions verbatim.
    pub fn to_style_value(&self) -> Value {
        let paint = match &self.paint {
            Paint::Circle(p) => json!({ "circle-radius": p.radius, "circle-color": p.color }),
            Paint::Line(p) => json!({ "line-width": p.width, "line-color": p.color }),
        };
        json!({
            "id": self.id,
            "type": self.paint.layer_type(),
            "source": self.source,
            "layout": {},
            "paint": paint,
        })
    }
}
