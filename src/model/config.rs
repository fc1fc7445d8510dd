//! Run configuration: one explicit schema with every field defaulted.
//!
//! Parameter files are partial JSON documents overlaid onto the defaults,
//! matching the layout of the evolution harness's generated files
//! (`{"conf": {"LAMBDA_CH": [...], "seed": 1}}` and friends). Every field
//! carries a serde default, so a file may override any subset of the schema.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::food::{RespawnOffset, RespawnPlacement};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Which side initiates the consumption scan.
///
/// `MainInitiated` is the canonical policy: each main agent scans its own
/// neighborhood for food. `FoodInitiated` is the legacy variant in which
/// each food entity scans for an adjacent main agent; with a single main
/// agent the two are equivalent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionScan {
    #[default]
    MainInitiated,
    FoodInitiated,
}

/// Lattice-level parameters. Field names mirror the original parameter
/// files, so evolved parameter sets load unchanged. The per-kind constraint
/// arrays (`J`, `V`, `P`, `LAMBDA_*`) are forwarded to the lattice engine;
/// index 0 is always the background kind.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LatticeConf {
    pub torus: [bool; 2],
    pub seed: u64,
    #[serde(rename = "T")]
    pub temperature: f64,
    #[serde(rename = "D")]
    pub diffusion_rate: f64,
    #[serde(rename = "SECR")]
    pub secretion_rate: f64,
    #[serde(rename = "DECAY")]
    pub decay_factor: f64,
    #[serde(rename = "LAMBDA_CH")]
    pub lambda_ch: Vec<f64>,
    #[serde(rename = "J")]
    pub adhesion: Vec<Vec<f64>>,
    #[serde(rename = "LAMBDA_V")]
    pub lambda_v: Vec<f64>,
    #[serde(rename = "V")]
    pub volume: Vec<f64>,
    #[serde(rename = "LAMBDA_P")]
    pub lambda_p: Vec<f64>,
    #[serde(rename = "P")]
    pub perimeter: Vec<f64>,
    #[serde(rename = "LAMBDA_ACT")]
    pub lambda_act: Vec<f64>,
    #[serde(rename = "MAX_ACT")]
    pub max_act: Vec<f64>,
}

impl Default for LatticeConf {
    fn default() -> Self {
        Self {
            torus: [true, true],
            seed: 1,
            temperature: 10.0,
            diffusion_rate: 0.1,
            secretion_rate: 5.0,
            decay_factor: 0.99,
            lambda_ch: vec![0.0, 0.0, 500.0],
            adhesion: vec![
                vec![0.0, 100.0, 10.0],
                vec![100.0, 10.0, -1.0],
                vec![10.0, -1.0, 0.0],
            ],
            lambda_v: vec![0.0, 1000.0, 5.0],
            volume: vec![0.0, 10.0, 500.0],
            lambda_p: vec![0.0, 1.0, 2.0],
            perimeter: vec![0.0, 5.0, 260.0],
            lambda_act: vec![0.0, 0.0, 300.0],
            max_act: vec![0.0, 0.0, 30.0],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimSettings {
    /// Entities to seed per non-background kind: `[food, main]`.
    #[serde(rename = "NRCELLS")]
    pub nr_cells: [usize; 2],
    #[serde(rename = "BURNIN")]
    pub burnin: u64,
    #[serde(rename = "RUNTIME")]
    pub runtime: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            nr_cells: [10, 1],
            burnin: 0,
            runtime: 1000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LivelihoodConf {
    pub initial: f64,
    pub max: f64,
    /// Constant amount subtracted from livelihood each step.
    pub step_decay: f64,
    /// Livelihood gained per consumed food entity.
    pub food_reward: f64,
}

impl Default for LivelihoodConf {
    fn default() -> Self {
        Self {
            initial: 100.0,
            max: 200.0,
            step_decay: 0.5,
            food_reward: 50.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RespawnConf {
    pub enabled: bool,
    pub offset: RespawnOffset,
    pub placement: RespawnPlacement,
}

impl Default for RespawnConf {
    fn default() -> Self {
        Self {
            enabled: true,
            offset: RespawnOffset::Uniform {
                lower: 20,
                upper: 200,
            },
            placement: RespawnPlacement::Origin,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ForagingSettings {
    pub livelihood: LivelihoodConf,
    pub respawn: RespawnConf,
    pub scan: ConsumptionScan,
    /// Divide the diffusion coefficient by the squared resolution divisor,
    /// keeping the effective diffusion length comparable on coarse fields.
    pub scale_diffusion_with_divisor: bool,
}

/// Complete run configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ForagingConfig {
    pub field_size: [u32; 2],
    /// The chemical field is this many times coarser than the lattice.
    pub chemokine_res: u32,
    pub conf: LatticeConf,
    pub simsettings: SimSettings,
    pub foraging: ForagingSettings,
}

impl Default for ForagingConfig {
    fn default() -> Self {
        Self {
            field_size: [200, 200],
            chemokine_res: 5,
            conf: LatticeConf::default(),
            simsettings: SimSettings::default(),
            foraging: ForagingSettings::default(),
        }
    }
}

impl ForagingConfig {
    /// Loads a partial JSON overlay onto the defaults and validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn torus(&self) -> bool {
        self.conf.torus[0] && self.conf.torus[1]
    }

    /// Rejects malformed or out-of-range parameters before the run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_size[0] == 0 || self.field_size[1] == 0 {
            return Err(invalid("field_size", "extents must be positive"));
        }
        if self.chemokine_res == 0 {
            return Err(invalid("chemokine_res", "divisor must be positive"));
        }
        if self.field_size[0] % self.chemokine_res != 0
            || self.field_size[1] % self.chemokine_res != 0
        {
            return Err(invalid(
                "chemokine_res",
                format!("must divide field_size {:?} evenly", self.field_size),
            ));
        }

        let c = &self.conf;
        if !c.diffusion_rate.is_finite() || !(0.0..=0.25).contains(&c.diffusion_rate) {
            return Err(invalid(
                "conf.D",
                "diffusion coefficient must lie in [0, 0.25] for a stable pass",
            ));
        }
        if !c.secretion_rate.is_finite() || c.secretion_rate < 0.0 {
            return Err(invalid("conf.SECR", "secretion rate must be non-negative"));
        }
        if !c.decay_factor.is_finite() || c.decay_factor <= 0.0 || c.decay_factor > 1.0 {
            return Err(invalid("conf.DECAY", "decay factor must lie in (0, 1]"));
        }
        if !c.temperature.is_finite() || c.temperature <= 0.0 {
            return Err(invalid("conf.T", "temperature must be positive"));
        }
        if c.lambda_ch.iter().any(|v| !v.is_finite()) {
            return Err(invalid("conf.LAMBDA_CH", "entries must be finite"));
        }

        let l = &self.foraging.livelihood;
        for (field, value) in [
            ("foraging.livelihood.initial", l.initial),
            ("foraging.livelihood.max", l.max),
            ("foraging.livelihood.step_decay", l.step_decay),
            ("foraging.livelihood.food_reward", l.food_reward),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a non-negative finite number"));
            }
        }
        if l.max <= 0.0 {
            return Err(invalid("foraging.livelihood.max", "must be positive"));
        }
        if l.initial > l.max {
            return Err(invalid(
                "foraging.livelihood.initial",
                "must not exceed the maximum",
            ));
        }

        if let RespawnOffset::Uniform { lower, upper } = self.foraging.respawn.offset {
            if lower > upper {
                return Err(invalid(
                    "foraging.respawn.offset",
                    format!("uniform bounds are inverted: [{lower}, {upper}]"),
                ));
            }
        }

        if self.simsettings.runtime == 0 {
            return Err(invalid(
                "simsettings.RUNTIME",
                "step budget must be positive",
            ));
        }
        if self.simsettings.nr_cells[1] == 0 {
            return Err(invalid("simsettings.NRCELLS", "at least one main agent"));
        }

        Ok(())
    }
}
