//! Heuristic trust scores for a prediction, and an expected-value appraisal of a bet on the final
//! total.
//!
//! The base confidence is a weighted sum of seven factors, each roughly in `[0, 1]`, scaled to a
//! percentage. The weights deliberately sum to more than one, so strong inputs saturate the upper
//! bound. None of the outputs are calibrated probabilities.

use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum::EnumCount;
use strum_macros::{Display, EnumCount, EnumIter};
use thiserror::Error;
use tracing::debug;

use crate::config::ConfidenceConfig;
use crate::history::CombinedHistoricalTotal;
use crate::series::GamePoint;
use crate::stats::{clamp, round_1dp, round_2dp, SliceExt};
use crate::timeline::GAME_SECONDS;

const STABILITY_FLOOR: f64 = 0.3;
const ERROR_FLOOR: f64 = 0.4;
const ERROR_SENSITIVITY: f64 = 0.3;
const TIME_FLOOR: f64 = 0.5;
const TIME_SENSITIVITY: f64 = 0.3;
const QUARTER_BASE: f64 = 0.7;
const QUARTER_STEP: f64 = 0.1;
const QUARTER_CAP: f64 = 1.1;
/// Stand-in for the final total before any points are scored.
const FALLBACK_FINAL_TOTAL: f64 = 100.0;
/// Spread assumed when every error in the series is zero.
const FALLBACK_SPREAD: f64 = 10.0;
/// Distance beyond the quoted lines over which the betting factor decays, in points.
const LINE_DECAY_DISTANCE: f64 = 30.0;
/// Distance from a lone quoted line at which alignment reaches zero, in points.
const LINE_ALIGNMENT_DISTANCE: f64 = 50.0;
/// Step between successive rungs of the confidence ladder, in points.
const LADDER_STEP: u32 = 2;
const LADDER_RUNGS: u32 = 10;

/// Factors of the base confidence, in the order of their weights.
#[derive(Debug, Clone, PartialEq, Ordinal, EnumCount, EnumIter, Display, Serialize, Deserialize)]
pub enum Factor {
    Data,
    Stability,
    Error,
    Time,
    Quarter,
    Betting,
    Historical,
}

impl From<Factor> for usize {
    fn from(factor: Factor) -> Self {
        factor.ordinal()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingQuote {
    pub line: f64,
    /// Market confidence in the line, as a percentage.
    pub confidence_pct: f64,
}
impl BettingQuote {
    fn confidence(&self) -> f64 {
        self.confidence_pct / 100.0
    }
}

/// One quoted line, or a lower and an upper line between which confidence is interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingQuotes {
    pub primary: BettingQuote,
    pub upper: Option<BettingQuote>,
}
impl BettingQuotes {
    pub fn single(line: f64, confidence_pct: f64) -> Self {
        Self {
            primary: BettingQuote {
                line,
                confidence_pct,
            },
            upper: None,
        }
    }

    pub fn with_upper(mut self, line: f64, confidence_pct: f64) -> Self {
        self.upper = Some(BettingQuote {
            line,
            confidence_pct,
        });
        self
    }

    /// Each quoted line must be finite and non-negative, and each confidence a percentage.
    pub fn validate(&self) -> Result<(), BettingError> {
        for quote in std::iter::once(&self.primary).chain(&self.upper) {
            if !quote.line.is_finite() || quote.line < 0.0 {
                return Err(BettingError::InvalidLine(quote.line));
            }
            if !(0.0..=100.0).contains(&quote.confidence_pct) {
                return Err(BettingError::InvalidQuoteConfidence(quote.confidence_pct));
            }
        }
        Ok(())
    }

    /// How well `predicted` agrees with the market.
    pub fn factor(&self, predicted: f64) -> f64 {
        let low = &self.primary;
        let Some(high) = &self.upper else {
            let alignment = f64::max(0.0, 1.0 - (predicted - low.line).abs() / LINE_ALIGNMENT_DISTANCE);
            return 0.7 + alignment * 0.3 * low.confidence();
        };

        if predicted >= low.line && predicted <= high.line {
            let range = high.line - low.line;
            if range > 0.0 {
                let position = (predicted - low.line) / range;
                let interpolated = low.confidence() - (low.confidence() - high.confidence()) * position;
                0.7 + interpolated * 0.3
            } else {
                1.0
            }
        } else if predicted < low.line {
            let decay = f64::min(1.0, (low.line - predicted) / LINE_DECAY_DISTANCE);
            0.6 + low.confidence() * 0.4 * (1.0 - decay * 0.5)
        } else {
            let decay = f64::min(1.0, (predicted - high.line) / LINE_DECAY_DISTANCE);
            0.5 + high.confidence() * 0.5 * (1.0 - decay)
        }
    }
}

/// Agreement of `predicted` with the teams' combined historical total.
pub fn historical_factor(predicted: f64, historical: Option<&CombinedHistoricalTotal>) -> f64 {
    match historical {
        None => 1.0,
        Some(historical) => {
            let difference = (predicted - historical.avg).abs();
            if difference < historical.std_dev {
                1.05
            } else if difference < 2.0 * historical.std_dev {
                0.95
            } else {
                0.85
            }
        }
    }
}

/// Spread of the per-point prediction errors across the whole series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorSpread {
    pub mean: f64,
    pub std_dev: f64,
}
impl ErrorSpread {
    pub fn of(points: &[GamePoint]) -> Self {
        let errors: Vec<_> = points.iter().map(|point| point.error as f64).collect();
        Self {
            mean: errors.mean().unwrap_or_default(),
            std_dev: errors.std_dev().unwrap_or_default(),
        }
    }

    /// The spread used to scale distances below the prediction.
    fn scale(&self) -> f64 {
        if self.std_dev > 0.0 {
            self.std_dev
        } else if self.mean > 0.0 {
            self.mean * 0.5
        } else {
            FALLBACK_SPREAD
        }
    }
}

/// Confidence in the predictions of a computed series.
pub struct Confidence<'a> {
    points: &'a [GamePoint],
    spread: ErrorSpread,
    final_total: u32,
    quotes: Option<&'a BettingQuotes>,
    historical: Option<&'a CombinedHistoricalTotal>,
    config: &'a ConfidenceConfig,
}
impl<'a> Confidence<'a> {
    pub fn new(
        points: &'a [GamePoint],
        quotes: Option<&'a BettingQuotes>,
        historical: Option<&'a CombinedHistoricalTotal>,
        config: &'a ConfidenceConfig,
    ) -> Self {
        Self {
            points,
            spread: ErrorSpread::of(points),
            final_total: points.last().map(|point| point.event.total()).unwrap_or_default(),
            quotes,
            historical,
            config,
        }
    }

    pub fn spread(&self) -> &ErrorSpread {
        &self.spread
    }

    /// The individual factors at `index`, in [`Factor`] order. `None` if the series is too short
    /// or `index` is out of range.
    pub fn factors(&self, index: usize) -> Option<[f64; Factor::COUNT]> {
        if self.points.len() < self.config.min_points {
            return None;
        }
        let point = self.points.get(index)?;
        let predicted = point.prediction.total as f64;
        let final_total = if self.final_total > 0 {
            self.final_total as f64
        } else {
            FALLBACK_FINAL_TOTAL
        };
        let mean_error = if self.spread.mean > 0.0 {
            self.spread.mean
        } else {
            1.0
        };

        let mut factors = [0.0; Factor::COUNT];
        factors[usize::from(Factor::Data)] =
            f64::min(1.0, self.points.len() as f64 / self.config.full_data_points as f64);
        factors[usize::from(Factor::Stability)] =
            f64::max(STABILITY_FLOOR, 1.0 - self.spread.std_dev / final_total);
        factors[usize::from(Factor::Error)] = f64::max(
            ERROR_FLOOR,
            1.0 - (point.error as f64 / mean_error - 1.0) * ERROR_SENSITIVITY,
        );
        factors[usize::from(Factor::Time)] = f64::max(
            TIME_FLOOR,
            1.0 - point.event.remaining() as f64 / GAME_SECONDS as f64 * TIME_SENSITIVITY,
        );
        factors[usize::from(Factor::Quarter)] =
            f64::min(QUARTER_CAP, QUARTER_BASE + point.event.quarter as f64 * QUARTER_STEP);
        factors[usize::from(Factor::Betting)] = self
            .quotes
            .map(|quotes| quotes.factor(predicted))
            .unwrap_or(1.0);
        factors[usize::from(Factor::Historical)] = historical_factor(predicted, self.historical);
        Some(factors)
    }

    /// The base confidence at `index`, as a percentage within the configured bounds.
    pub fn base(&self, index: usize) -> Option<f64> {
        let factors = self.factors(index)?;
        let weighted = factors
            .iter()
            .zip(self.config.weights.iter())
            .map(|(factor, weight)| factor * weight)
            .sum::<f64>();
        let (min, max) = self.config.bounds;
        Some(clamp(weighted * 100.0, min, max))
    }

    /// Confidence, as a percentage, that the final total will reach at least `target`. A series
    /// too short for a base confidence is lifted from a base of zero.
    pub fn at_threshold(&self, index: usize, target: f64) -> f64 {
        let Some(point) = self.points.get(index) else {
            return 0.0;
        };
        let base = self.base(index).unwrap_or_default();
        let points_below = point.prediction.total as f64 - target;
        if points_below <= 0.0 {
            return base * 0.5;
        }

        let base = base / 100.0;
        let z = points_below / self.spread.scale();
        let lift = if z <= 1.0 {
            z * 0.3
        } else if z <= 2.0 {
            0.3 + (z - 1.0) * 0.4
        } else {
            0.9
        };
        clamp(
            (base + (1.0 - base) * lift) * 100.0,
            0.0,
            self.config.max_threshold_confidence,
        )
    }

    /// Confidence at successively lower targets beneath the prediction at `index`.
    pub fn ladder(&self, index: usize) -> Vec<LadderRung> {
        let Some(point) = self.points.get(index) else {
            return vec![];
        };
        (1..=LADDER_RUNGS)
            .map(|rung| {
                let points_down = rung * LADDER_STEP;
                let target = point.prediction.total.saturating_sub(points_down);
                LadderRung {
                    points_down,
                    target,
                    confidence: self.at_threshold(index, target as f64).round() as u32,
                }
            })
            .collect()
    }

    /// Appraises `slip` against the prediction at `index`. `Ok(None)` when `index` is out of range.
    pub fn analyse_bet(
        &self,
        index: usize,
        slip: &BettingSlip,
    ) -> Result<Option<BettingAnalysis>, BettingError> {
        slip.validate()?;
        if index >= self.points.len() {
            debug!("no betting analysis: index {index} beyond {} points", self.points.len());
            return Ok(None);
        }
        let confidence = self.at_threshold(index, slip.target);
        Ok(Some(BettingAnalysis::evaluate(slip, confidence)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderRung {
    pub points_down: u32,
    pub target: u32,
    pub confidence: u32,
}

#[derive(Debug, Error, PartialEq)]
pub enum BettingError {
    #[error("cost to win one unit must lie strictly between 0 and 1, got {0}")]
    InvalidCost(f64),

    #[error("target score must be a non-negative number, got {0}")]
    InvalidTarget(f64),

    #[error("quoted line must be a non-negative number, got {0}")]
    InvalidLine(f64),

    #[error("quote confidence must be a percentage, got {0}")]
    InvalidQuoteConfidence(f64),
}

/// A wager that the final total reaches `target`, staking `cost` to return one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingSlip {
    pub target: f64,
    pub cost: f64,
}
impl BettingSlip {
    pub fn validate(&self) -> Result<(), BettingError> {
        if !self.target.is_finite() || self.target < 0.0 {
            return Err(BettingError::InvalidTarget(self.target));
        }
        if !(self.cost > 0.0 && self.cost < 1.0) {
            return Err(BettingError::InvalidCost(self.cost));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Favorable,
    Unfavorable,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingAnalysis {
    pub target: f64,
    pub cost: f64,
    /// Rounded to a whole percentage.
    pub confidence: u32,
    /// The cost read as a percentage, to one decimal place.
    pub implied_probability: f64,
    /// Per unit returned, to two decimal places.
    pub expected_value: f64,
    pub recommendation: Recommendation,
}
impl BettingAnalysis {
    /// `confidence` is a percentage.
    pub fn evaluate(slip: &BettingSlip, confidence: f64) -> Self {
        let implied_probability = slip.cost * 100.0;
        let expected_value = confidence / 100.0 - slip.cost;
        let recommendation = if confidence > implied_probability {
            Recommendation::Favorable
        } else if confidence < implied_probability {
            Recommendation::Unfavorable
        } else {
            Recommendation::Neutral
        };
        Self {
            target: slip.target,
            cost: slip.cost,
            confidence: confidence.round() as u32,
            implied_probability: round_1dp(implied_probability),
            expected_value: round_2dp(expected_value),
            recommendation,
        }
    }
}

#[cfg(test)]
mod tests;
