//! Gallery grid sizing.
//!
//! The grid gets enough fixed-width cells to span the tab strip above it,
//! bounded below by a usability floor and above by a density ceiling.

use crate::config::LayoutConfig;

/// Resolved grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Number of columns
    pub columns: usize,
    /// Width of one cell (pixels)
    pub cell_width: f32,
}

impl GridLayout {
    /// Lay out a grid for an available width.
    pub fn compute(available_width: f32, config: &LayoutConfig) -> Self {
        Self {
            columns: grid_columns(available_width, config),
            cell_width: config.cell_width,
        }
    }

    /// Total width of the grid (pixels).
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_width
    }

    /// CSS `grid-template-columns` value.
    pub fn template_columns(&self) -> String {
        format!("repeat({}, {}px)", self.columns, self.cell_width)
    }
}

/// Number of columns needed to cover `available_width`, clamped to the
/// configured range. A partial cell rounds up.
///
/// Widths that are not finite or a non-positive cell width yield the minimum.
pub fn grid_columns(available_width: f32, config: &LayoutConfig) -> usize {
    let min = config.min_columns.max(1);
    let max = config.max_columns.max(min);

    if !available_width.is_finite() || config.cell_width <= 0.0 {
        return min;
    }

    let needed = (available_width / config.cell_width).ceil().max(0.0) as usize;
    needed.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_follow_width() {
        let config = LayoutConfig::default();
        // 88px cells
        assert_eq!(grid_columns(88.0 * 6.0, &config), 6);
        assert_eq!(grid_columns(88.0 * 6.0 + 1.0, &config), 7);
        assert_eq!(grid_columns(88.0 * 6.0 + 87.0, &config), 7);
    }

    #[test]
    fn test_grid_covers_tab_strip() {
        let config = LayoutConfig::default();
        for width in [352.5_f32, 400.0, 530.0, 700.0, 879.0] {
            let layout = GridLayout::compute(width, &config);
            assert!(
                layout.width() >= width,
                "{}px grid under {}px of tabs",
                layout.width(),
                width
            );
        }
        assert_eq!(grid_columns(400.0, &config), 5);
    }

    #[test]
    fn test_columns_clamped() {
        let config = LayoutConfig::default();
        assert_eq!(grid_columns(0.0, &config), 4);
        assert_eq!(grid_columns(100.0, &config), 4);
        assert_eq!(grid_columns(10_000.0, &config), 10);
        assert_eq!(grid_columns(f32::NAN, &config), 4);
    }

    #[test]
    fn test_degenerate_config() {
        let config = LayoutConfig {
            cell_width: 0.0,
            min_columns: 6,
            max_columns: 2,
            ..LayoutConfig::default()
        };
        assert_eq!(grid_columns(500.0, &config), 6);

        let inverted = LayoutConfig {
            min_columns: 6,
            max_columns: 2,
            ..LayoutConfig::default()
        };
        assert_eq!(grid_columns(10_000.0, &inverted), 6);
    }

    #[test]
    fn test_grid_layout() {
        let layout = GridLayout::compute(88.0 * 5.0, &LayoutConfig::default());
        assert_eq!(layout.columns, 5);
        assert_eq!(layout.width(), 440.0);
        assert_eq!(layout.template_columns(), "repeat(5, 88px)");
    }
}
