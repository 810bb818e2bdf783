//! Public types and constants for the visualization module.

/// How the daily series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    /// Plain line.
    Line,
    /// Line with the area down to zero filled (the dashboard's default look).
    #[default]
    Area,
}

/// Chart size used when the caller does not pick one.
pub const DEFAULT_CHART_SIZE: (u32, u32) = (1000, 600);

/// Map canvas size used when the caller does not pick one.
pub const DEFAULT_MAP_SIZE: (u32, u32) = (1200, 700);

/// Graticule spacing in degrees.
pub const GRATICULE_STEP_DEG: f64 = 30.0;
