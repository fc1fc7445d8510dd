//! Coarse scalar attractant field coupling food positions to the agent's
//! sensed gradient.
//!
//! The field lives at `1/resolution_divisor` of the lattice resolution.
//! Each step it receives a point injection per live food source, runs
//! `resolution_divisor` diffusion passes and one multiplicative decay pass.

use serde::{Deserialize, Serialize};

use crate::model::config::ForagingConfig;

/// 2D non-negative scalar grid with point injection, discrete diffusion and
/// global decay.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChemicalField {
    cells: Vec<f64>,
    #[serde(skip)]
    scratch: Vec<f64>,
    pub width: u32,
    pub height: u32,
    /// Lattice-to-field downsampling factor.
    pub resolution_divisor: u32,
    pub torus: bool,
    diffusion_rate: f64,
    secretion_rate: f64,
    decay_factor: f64,
    passes_per_step: u32,
}

impl ChemicalField {
    /// Builds the field from a validated configuration.
    pub fn from_config(config: &ForagingConfig) -> Self {
        let divisor = config.chemokine_res;
        let width = config.field_size[0] / divisor;
        let height = config.field_size[1] / divisor;
        let rate = if config.foraging.scale_diffusion_with_divisor {
            config.conf.diffusion_rate / f64::from(divisor * divisor)
        } else {
            config.conf.diffusion_rate
        };
        Self {
            cells: vec![0.0; (width * height) as usize],
            scratch: vec![0.0; (width * height) as usize],
            width,
            height,
            resolution_divisor: divisor,
            torus: config.torus(),
            diffusion_rate: rate,
            secretion_rate: config.conf.secretion_rate,
            decay_factor: config.conf.decay_factor,
            passes_per_step: divisor,
        }
    }

    #[inline(always)]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Maps a full-resolution coordinate to a field cell, clamped into the
    /// field extents. Out-of-bounds positions are clamped rather than
    /// rejected so a wandering centroid never loses its secretion.
    fn scale(&self, x: f64, y: f64) -> (u32, u32) {
        let d = f64::from(self.resolution_divisor);
        let fx = (x / d).floor().max(0.0) as u32;
        let fy = (y / d).floor().max(0.0) as u32;
        (fx.min(self.width - 1), fy.min(self.height - 1))
    }

    /// Adds `amount` to the field cell nearest the full-resolution position.
    pub fn inject(&mut self, position: (f64, f64), amount: f64) {
        let (fx, fy) = self.scale(position.0, position.1);
        let idx = self.index(fx, fy);
        self.cells[idx] += amount;
    }

    /// One discrete diffusion pass. Each cell exchanges value with its von
    /// Neumann neighbors; on a bounded field edge cells simply have fewer
    /// neighbors, so total mass is conserved under both topologies.
    pub fn diffuse(&mut self, rate: f64) {
        let (w, h) = (self.width as i64, self.height as i64);
        for y in 0..h {
            for x in 0..w {
                let here = self.cells[(y * w + x) as usize];
                let mut acc = 0.0;
                let mut n = 0.0;
                for (dx, dy) in [(-1i64, 0i64), (1, 0), (0, -1), (0, 1)] {
                    let (mut nx, mut ny) = (x + dx, y + dy);
                    if self.torus {
                        nx = nx.rem_euclid(w);
                        ny = ny.rem_euclid(h);
                    } else if nx < 0 || nx >= w || ny < 0 || ny >= h {
                        continue;
                    }
                    acc += self.cells[(ny * w + nx) as usize];
                    n += 1.0;
                }
                self.scratch[(y * w + x) as usize] = here + rate * (acc - n * here);
            }
        }
        std::mem::swap(&mut self.cells, &mut self.scratch);
    }

    /// Multiplies every cell by `factor`.
    pub fn decay(&mut self, factor: f64) {
        for cell in &mut self.cells {
            *cell *= factor;
        }
    }

    /// Per-step protocol: secrete at every live food position, then diffuse
    /// `resolution_divisor` times and decay once.
    pub fn advance(&mut self, food_positions: &[(f64, f64)]) {
        for &pos in food_positions {
            self.inject(pos, self.secretion_rate);
        }
        for _ in 0..self.passes_per_step {
            self.diffuse(self.diffusion_rate);
        }
        self.decay(self.decay_factor);
    }

    /// Field value at a field-resolution cell.
    pub fn value_at(&self, x: u32, y: u32) -> f64 {
        let ix = x.min(self.width - 1);
        let iy = y.min(self.height - 1);
        self.cells[self.index(ix, iy)]
    }

    /// Field value under a full-resolution lattice position. This is what
    /// the lattice engine samples when biasing agent movement.
    pub fn value_at_world(&self, x: f64, y: f64) -> f64 {
        let (fx, fy) = self.scale(x, y);
        self.cells[self.index(fx, fy)]
    }

    pub fn total_mass(&self) -> f64 {
        self.cells.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(torus: bool) -> ChemicalField {
        let mut config = ForagingConfig::default();
        config.field_size = [50, 50];
        config.chemokine_res = 5;
        config.conf.torus = [torus, torus];
        ChemicalField::from_config(&config)
    }

    #[test]
    fn test_inject_scales_by_divisor() {
        let mut f = field(true);
        f.inject((23.0, 7.0), 5.0);
        // 23/5 = 4, 7/5 = 1
        assert_eq!(f.value_at(4, 1), 5.0);
        assert_eq!(f.total_mass(), 5.0);
    }

    #[test]
    fn test_inject_out_of_bounds_clamps() {
        let mut f = field(false);
        f.inject((1000.0, -3.0), 2.0);
        assert_eq!(f.value_at(9, 0), 2.0);
    }

    #[test]
    fn test_diffuse_conserves_mass_torus() {
        let mut f = field(true);
        f.inject((25.0, 25.0), 10.0);
        for _ in 0..20 {
            f.diffuse(0.1);
        }
        assert!((f.total_mass() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_diffuse_conserves_mass_bounded() {
        let mut f = field(false);
        f.inject((0.0, 0.0), 10.0);
        for _ in 0..20 {
            f.diffuse(0.1);
        }
        assert!((f.total_mass() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_diffuse_spreads_to_neighbors() {
        let mut f = field(true);
        f.inject((25.0, 25.0), 10.0);
        f.diffuse(0.1);
        assert!(f.value_at(5, 5) < 10.0);
        assert!(f.value_at(4, 5) > 0.0);
        assert!(f.value_at(6, 5) > 0.0);
        assert!(f.value_at(5, 4) > 0.0);
        assert!(f.value_at(5, 6) > 0.0);
    }

    #[test]
    fn test_diffuse_wraps_on_torus() {
        let mut f = field(true);
        f.inject((0.0, 25.0), 10.0);
        f.diffuse(0.1);
        // Left neighbor of column 0 wraps to the last column.
        assert!(f.value_at(f.width - 1, 5) > 0.0);
    }

    #[test]
    fn test_decay_is_non_increasing() {
        let mut f = field(true);
        f.inject((25.0, 25.0), 10.0);
        let before = f.total_mass();
        f.decay(0.99);
        assert!(f.total_mass() < before);
        assert!((f.total_mass() - before * 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_advance_runs_full_protocol() {
        let mut f = field(true);
        f.advance(&[(25.0, 25.0), (10.0, 10.0)]);
        // Two injections of SECR=5, then one decay at 0.99.
        assert!((f.total_mass() - 10.0 * 0.99).abs() < 1e-9);
        assert!(f.value_at_world(25.0, 25.0) > 0.0);
    }

    #[test]
    fn test_values_stay_non_negative() {
        let mut f = field(false);
        f.inject((25.0, 25.0), 100.0);
        for _ in 0..50 {
            f.advance(&[]);
        }
        for y in 0..f.height {
            for x in 0..f.width {
                assert!(f.value_at(x, y) >= 0.0);
            }
        }
    }
}
