//! Run bookkeeping and the final one-line report.

use serde::{Deserialize, Serialize};

/// Nearest-food distance reported when no food remains anywhere on the
/// lattice. Large enough to dominate any reachable lattice distance.
pub const NO_FOOD_DISTANCE: f64 = 1.0e6;

/// Mutable state of a single run. Created at run start and finalized
/// exactly once, by starvation or by step-budget exhaustion.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunState {
    pub step: u64,
    pub terminated: bool,
    pub start: (f64, f64),
    pub end: Option<(f64, f64)>,
    pub nearest_food_distance: Option<f64>,
}

impl RunState {
    pub fn new(start: (f64, f64)) -> Self {
        Self {
            step: 0,
            terminated: false,
            start,
            end: None,
            nearest_food_distance: None,
        }
    }

    /// Marks the run terminated, capturing the end position and nearest
    /// remaining food distance. Later calls are ignored.
    pub fn terminate(&mut self, end: (f64, f64), nearest_food_distance: f64) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.end = Some(end);
        self.nearest_food_distance = Some(nearest_food_distance);
    }
}

/// Final report of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub livelihood: f64,
    pub nearest_food_distance: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl RunSummary {
    /// One line: elapsed steps, final livelihood, negative nearest-food
    /// distance. Smaller magnitude of the negative distance means closer to
    /// food, so downstream optimizers can minimize the line as-is.
    pub fn report_line(&self) -> String {
        format!(
            "{},{},{}",
            self.steps,
            self.livelihood,
            -self.nearest_food_distance
        )
    }
}

/// Euclidean distance, optionally corrected for wrap-around topology.
pub fn distance(a: (f64, f64), b: (f64, f64), torus: bool, extents: (f64, f64)) -> f64 {
    let mut dx = (a.0 - b.0).abs();
    let mut dy = (a.1 - b.1).abs();
    if torus {
        dx = dx.min(extents.0 - dx);
        dy = dy.min(extents.1 - dy);
    }
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `from` to the nearest of `foods`, or [`NO_FOOD_DISTANCE`]
/// when no food remains.
pub fn nearest_food_distance(
    foods: &[(f64, f64)],
    from: (f64, f64),
    torus: bool,
    extents: (f64, f64),
) -> f64 {
    foods
        .iter()
        .map(|&food| distance(from, food, torus, extents))
        .fold(NO_FOOD_DISTANCE, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminate_finalizes_once() {
        let mut state = RunState::new((1.0, 2.0));
        state.terminate((5.0, 5.0), 10.0);
        state.terminate((9.0, 9.0), 99.0);
        assert_eq!(state.end, Some((5.0, 5.0)));
        assert_eq!(state.nearest_food_distance, Some(10.0));
    }

    #[test]
    fn test_report_line_negates_distance() {
        let summary = RunSummary {
            steps: 120,
            livelihood: 3.5,
            nearest_food_distance: 17.0,
            start: (0.0, 0.0),
            end: (4.0, 4.0),
        };
        assert_eq!(summary.report_line(), "120,3.5,-17");
    }

    #[test]
    fn test_distance_wraps_on_torus() {
        let extents = (200.0, 200.0);
        let d = distance((1.0, 100.0), (199.0, 100.0), true, extents);
        assert!((d - 2.0).abs() < 1e-9);
        let d = distance((1.0, 100.0), (199.0, 100.0), false, extents);
        assert!((d - 198.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_food_picks_minimum() {
        let foods = [(10.0, 0.0), (3.0, 4.0), (100.0, 100.0)];
        let d = nearest_food_distance(&foods, (0.0, 0.0), false, (200.0, 200.0));
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_food_returns_sentinel() {
        let d = nearest_food_distance(&[], (0.0, 0.0), true, (200.0, 200.0));
        assert_eq!(d, NO_FOOD_DISTANCE);
    }
}
