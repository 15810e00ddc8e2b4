use crate::transition::{Ease, Timing};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 120.0,
            bottom: 20.0,
            left: 120.0,
        }
    }
}

/// Renderer settings. Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Outer width of the drawing surface, margins included.
    pub viewport_width: f64,
    /// Outer height of the drawing surface, margins included.
    pub viewport_height: f64,
    pub margin: Margin,
    pub duration_ms: f64,
    pub ease: Ease,
    /// Horizontal padding between a label and its box edge.
    pub padding: f64,
    /// Corner radius of node boxes.
    pub radius: f64,
    pub node_height: f64,
    pub font_size: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 960.0,
            viewport_height: 800.0,
            margin: Margin::default(),
            duration_ms: 750.0,
            ease: Ease::CubicInOut,
            padding: 10.0,
            radius: 10.0,
            node_height: 50.0,
            font_size: 20.0,
        }
    }
}

impl RenderConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("viewportWidth", self.viewport_width),
            ("viewportHeight", self.viewport_height),
            ("durationMs", self.duration_ms),
            ("padding", self.padding),
            ("radius", self.radius),
            ("nodeHeight", self.node_height),
            ("fontSize", self.font_size),
            ("margin.top", self.margin.top),
            ("margin.right", self.margin.right),
            ("margin.bottom", self.margin.bottom),
            ("margin.left", self.margin.left),
        ];
        for (field, value) in finite {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("{field} must be a non-negative number, got {value}"),
                });
            }
        }
        if self.font_size == 0.0 {
            return Err(Error::InvalidConfig {
                message: "fontSize must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            duration: self.duration_ms,
            ease: self.ease,
        }
    }
}

/// The drawing area left once margins are taken out of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Surface {
    pub fn from_config(config: &RenderConfig) -> Self {
        let m = config.margin;
        Self {
            width: (config.viewport_width - m.left - m.right).max(0.0),
            height: (config.viewport_height - m.top - m.bottom).max(0.0),
            margin: m,
        }
    }

    pub fn outer_width(&self) -> f64 {
        self.width + self.margin.left + self.margin.right
    }

    pub fn outer_height(&self) -> f64 {
        self.height + self.margin.top + self.margin.bottom
    }
}
