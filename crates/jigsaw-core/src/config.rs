use crate::PuzzleError;
use serde::{Deserialize, Serialize};

/// How pieces are arranged on screen, fixed at puzzle-creation time.
///
/// The mode is an explicit tag threaded through placement and completion
/// calls; it is never inferred from which fields a piece happens to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Deterministic layout: pieces occupy fixed grid cells in array order
    /// and are rearranged via the legacy swap interaction. Rendered at
    /// exact 1:1 source-pixel size so automated tests get reproducible
    /// dimensions.
    Grid,
    /// Gameplay layout: pieces carry independent positions and rotations
    /// and are rearranged by dragging and rotating.
    FreePositioning,
}

/// The on-screen area pieces are placed within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Immutable configuration snapshot taken when a puzzle is created.
///
/// Changing any of these afterwards means constructing a new
/// [`PuzzleInstance`](crate::PuzzleInstance) and discarding the old one;
/// there is no in-place re-grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub rows: u32,
    pub cols: u32,
    /// User-facing piece scale; 100.0 is the natural viewport-fit size.
    pub scale_percent: f64,
    pub layout_mode: LayoutMode,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            scale_percent: 100.0,
            layout_mode: LayoutMode::FreePositioning,
        }
    }
}

impl PuzzleConfig {
    /// Validate the snapshot before any piece state is created.
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(PuzzleError::InvalidConfig {
                reason: format!("grid must be at least 1x1, got {}x{}", self.rows, self.cols),
            });
        }
        if self.scale_percent <= 0.0 {
            return Err(PuzzleError::InvalidConfig {
                reason: format!("scale must be positive, got {}%", self.scale_percent),
            });
        }
        Ok(())
    }

    /// Multiplier applied on top of the viewport-fit scale.
    pub fn scale_factor(&self) -> f64 {
        self.scale_percent / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PuzzleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_grid_rejected() {
        let config = PuzzleConfig {
            rows: 0,
            ..PuzzleConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(crate::PuzzleError::InvalidConfig { .. })
        ));

        let config = PuzzleConfig {
            cols: 0,
            ..PuzzleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        let config = PuzzleConfig {
            scale_percent: 0.0,
            ..PuzzleConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PuzzleConfig {
            scale_percent: -50.0,
            ..PuzzleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = PuzzleConfig {
            rows: 4,
            cols: 5,
            scale_percent: 75.0,
            layout_mode: LayoutMode::Grid,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: PuzzleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
