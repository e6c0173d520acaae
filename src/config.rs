//! Tunable constants of the prediction engine.
//!
//! The defaults reproduce the empirically tuned values the engine was calibrated with. They can be
//! overridden from a JSON file (see [`crate::file::FromJsonFile`]), but any change should be treated
//! as a model change rather than a cosmetic one.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::confidence::Factor;
use strum::EnumCount;

pub const VALID_WINDOWS: RangeInclusive<u32> = 30..=720;
pub const WINDOW_STEP: u32 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("velocity window {0}s must be in the range 30..=720 in steps of 30s")]
    Window(u32),

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} bounds are inverted: {lower} > {upper}")]
    InvertedBounds {
        name: &'static str,
        lower: f64,
        upper: f64,
    },

    #[error("confidence weight for {factor} must be finite and non-negative, got {weight}")]
    Weight { factor: Factor, weight: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub velocity: VelocityConfig,
    pub prediction: PredictionConfig,
    pub confidence: ConfidenceConfig,
}
impl Config {
    pub fn with_window(mut self, window: u32) -> Self {
        self.velocity.window = window;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.velocity.validate()?;
        self.prediction.validate()?;
        self.confidence.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            velocity: VelocityConfig::default(),
            prediction: PredictionConfig::default(),
            confidence: ConfidenceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyWeights {
    pub scoring_frequency: f64,
    pub event_density: f64,
    pub shooting_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityConfig {
    /// Requested look-back window, in seconds.
    pub window: u32,
    /// The effective window is never shorter than this.
    pub min_window: u32,
    /// Windows whose scoring span is shorter than this fall back to the overall rate.
    pub min_span: u32,
    /// Width of the buckets used to measure scoring frequency.
    pub sub_period: u32,
    pub default_scoring_frequency: f64,
    pub default_event_density: f64,
    pub default_shooting_efficiency: f64,
    /// Efficiency at the anchor make rate.
    pub efficiency_base: f64,
    pub efficiency_anchor: f64,
    pub efficiency_slope: f64,
    pub efficiency_bounds: (f64, f64),
    /// A turnover counts as this fraction of a missed shot.
    pub turnover_miss_weight: f64,
    pub frequency_weights: FrequencyWeights,
    /// `pace = pace_floor + (1 - pace_floor) * combined_frequency`
    pub pace_floor: f64,
    /// Total velocity is kept within these multiples of the overall rate.
    pub rate_multiples: (f64, f64),
}
impl VelocityConfig {
    pub fn effective_window(&self) -> u32 {
        u32::max(self.window, self.min_window)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_WINDOWS.contains(&self.window) || self.window % WINDOW_STEP != 0 {
            return Err(ConfigError::Window(self.window));
        }
        require_positive("sub-period", self.sub_period as f64)?;
        require_ordered("shooting efficiency", self.efficiency_bounds)?;
        require_ordered("velocity rate multiples", self.rate_multiples)?;
        Ok(())
    }
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            window: 120,
            min_window: 180,
            min_span: 60,
            sub_period: 15,
            default_scoring_frequency: 0.5,
            default_event_density: 0.1,
            default_shooting_efficiency: 0.5,
            efficiency_base: 0.2,
            efficiency_anchor: 0.35,
            efficiency_slope: 2.67,
            efficiency_bounds: (0.15, 1.0),
            turnover_miss_weight: 0.5,
            frequency_weights: FrequencyWeights {
                scoring_frequency: 0.4,
                event_density: 0.15,
                shooting_efficiency: 0.45,
            },
            pace_floor: 0.5,
            rate_multiples: (0.5, 2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Weight of the windowed velocity; the overall rate receives the remainder.
    pub velocity_weight: f64,
    /// Historical blending only starts after this fraction of the game.
    pub historical_min_progress: f64,
    pub historical_weight_scale: f64,
    pub historical_weight_bounds: (f64, f64),
    /// Relative divergence of the current pace from the historical average beyond which the
    /// historical weight is discounted.
    pub pace_divergence: f64,
    pub divergence_discount: f64,
    pub total_bounds: (u32, u32),
}
impl PredictionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_ordered("historical weight", self.historical_weight_bounds)?;
        require_ordered(
            "predicted total",
            (self.total_bounds.0 as f64, self.total_bounds.1 as f64),
        )?;
        Ok(())
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            velocity_weight: 0.7,
            historical_min_progress: 0.1,
            historical_weight_scale: 0.3,
            historical_weight_bounds: (0.05, 0.25),
            pace_divergence: 0.2,
            divergence_discount: 0.5,
            total_bounds: (150, 350),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Indexed by [`Factor`] ordinal. These intentionally sum to more than one.
    pub weights: [f64; Factor::COUNT],
    pub bounds: (f64, f64),
    pub max_threshold_confidence: f64,
    /// Series shorter than this carry no confidence estimate.
    pub min_points: usize,
    /// Number of points at which the data factor saturates.
    pub full_data_points: usize,
}
impl ConfidenceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        use strum::IntoEnumIterator;
        for factor in Factor::iter() {
            let weight = self.weights[usize::from(factor.clone())];
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Weight { factor, weight });
            }
        }
        require_ordered("base confidence", self.bounds)?;
        require_positive("full data points", self.full_data_points as f64)?;
        Ok(())
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            weights: [0.20, 0.25, 0.20, 0.15, 0.20, 0.12, 0.08],
            bounds: (30.0, 95.0),
            max_threshold_confidence: 99.0,
            min_points: 5,
            full_data_points: 30,
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn require_ordered(name: &'static str, (lower, upper): (f64, f64)) -> Result<(), ConfigError> {
    if lower <= upper {
        Ok(())
    } else {
        Err(ConfigError::InvertedBounds { name, lower, upper })
    }
}
