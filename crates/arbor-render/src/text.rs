use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 20.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Stands in for the browser's text bounding box when sizing node boxes.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Fixed-advance measurer: every character is `char_width_factor` em wide.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(1.0);
        let mut line_count = 0usize;
        let mut max_chars = 0usize;
        for line in text.split('\n') {
            line_count += 1;
            max_chars = max_chars.max(line.chars().count());
        }

        TextMetrics {
            width: max_chars as f64 * font_size * char_width_factor,
            height: line_count as f64 * font_size * line_height_factor,
            line_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_measurer_scales_with_font_size() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle::default();
        let metrics = m.measure("ROOT", &style);
        assert_eq!(metrics.width, 48.0);
        assert_eq!(metrics.height, 24.0);
        assert_eq!(metrics.line_count, 1);
    }

    #[test]
    fn widest_line_wins() {
        let m = DeterministicTextMeasurer {
            char_width_factor: 1.0,
            line_height_factor: 1.0,
        };
        let style = TextStyle {
            font_size: 10.0,
            ..Default::default()
        };
        let metrics = m.measure("ab\nabcd", &style);
        assert_eq!(metrics.width, 40.0);
        assert_eq!(metrics.line_count, 2);
    }
}
