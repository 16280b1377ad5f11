use serde::{Deserialize, Serialize};

/// Paint for point markers rendered as circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CirclePaint {
    /// Radius in screen pixels.
    pub radius: f64,
    /// Any CSS color the host renderer understands.
    pub color: String,
}

impl CirclePaint {
    pub fn new(radius: f64, color: impl Into<String>) -> Self {
        Self {
            radius,
            color: color.into(),
        }
    }
}

impl Default for CirclePaint {
    fn default() -> Self {
        Self::new(5.0, "red")
    }
}

/// Paint for polylines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinePaint {
    /// Stroke width in screen pixels.
    pub width: f64,
    pub color: String,
}

impl LinePaint {
    pub fn new(width: f64, color: impl Into<String>) -> Self {
        Self {
            width,
            color: color.into(),
        }
    }
}

impl Default for LinePaint {
    fn default() -> Self {
        Self::new(2.0, "red")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Circle(CirclePaint),
    Line(LinePaint),
}

impl Paint {
    /// Style-spec layer `type` for this paint.
    pub fn layer_type(&self) -> &'static str {
        match self {
            Paint::Circle(_) => "circle",
            Paint::Line(_) => "line",
        }
    }
}
