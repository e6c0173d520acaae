//! Final-score projection from the estimated velocity, the overall pace and, optionally, the
//! teams' historical average.

use serde::{Deserialize, Serialize};

use crate::config::PredictionConfig;
use crate::stats::clamp;
use crate::timeline::ScoreEvent;
use crate::velocity::Velocity;

/// Half-width of the displayed prediction range.
pub const RANGE_MARGIN: u32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub total: u32,
    pub home: u32,
    pub away: u32,
}
impl Prediction {
    /// The range shown around the predicted total, kept within the configured total bounds.
    pub fn range(&self, config: &PredictionConfig) -> (u32, u32) {
        let (min, max) = config.total_bounds;
        (
            u32::max(min, self.total.saturating_sub(RANGE_MARGIN)),
            u32::min(max, self.total + RANGE_MARGIN),
        )
    }
}

/// Projects the final score at `event`.
///
/// At tip-off there is no pace to extrapolate from, so the current score is carried forward
/// (subject to the total bounds). `historical_avg` is only blended in once enough of the game has
/// been played.
pub fn predict(
    event: &ScoreEvent,
    velocity: &Velocity,
    historical_avg: Option<f64>,
    config: &PredictionConfig,
) -> Prediction {
    let current_total = event.total();
    if event.elapsed == 0 {
        return Prediction {
            total: bound_total(current_total as f64, current_total, config),
            home: event.home,
            away: event.away,
        };
    }

    let overall = Velocity::overall(event);
    let blend = |windowed: f64, overall: f64| {
        config.velocity_weight * windowed + (1.0 - config.velocity_weight) * overall
    };
    let weighted = Velocity {
        total: blend(velocity.total, overall.total),
        home: blend(velocity.home, overall.home),
        away: blend(velocity.away, overall.away),
    };

    let remaining = event.remaining() as f64;
    let extrapolate = |current: u32, rate: f64| (current as f64 + rate * remaining).round();
    let mut total = extrapolate(current_total, weighted.total);
    let mut home = extrapolate(event.home, weighted.home);
    let mut away = extrapolate(event.away, weighted.away);

    let progress = event.progress();
    if let Some(historical_avg) = historical_avg.filter(|&avg| avg > 0.0) {
        if progress > config.historical_min_progress {
            total = blend_historical(total, current_total, progress, historical_avg, config);
        }
    }

    total = f64::max(total, current_total as f64);
    home = f64::max(home, event.home as f64);
    away = f64::max(away, event.away as f64);

    if weighted.total == 0.0 && progress > 0.0 {
        total = (current_total as f64 / progress).round();
        home = (event.home as f64 / progress).round();
        away = (event.away as f64 / progress).round();
    }

    Prediction {
        total: bound_total(total, current_total, config),
        home: home as u32,
        away: away as u32,
    }
}

fn blend_historical(
    predicted: f64,
    current_total: u32,
    progress: f64,
    historical_avg: f64,
    config: &PredictionConfig,
) -> f64 {
    let projection = current_total as f64 / progress;
    let pace_diff = (projection - historical_avg).abs() / historical_avg;
    let (min_weight, max_weight) = config.historical_weight_bounds;
    let mut weight = clamp(
        (1.0 - progress) * config.historical_weight_scale,
        min_weight,
        max_weight,
    );
    if pace_diff > config.pace_divergence {
        weight *= config.divergence_discount;
    }
    (predicted * (1.0 - weight) + historical_avg * weight).round()
}

fn bound_total(total: f64, current_total: u32, config: &PredictionConfig) -> u32 {
    let (min, max) = config.total_bounds;
    let min = u32::max(current_total, min);
    clamp(total, min as f64, max as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PredictionConfig {
        PredictionConfig::default()
    }

    #[test]
    fn tip_off_is_bounded_below() {
        let event = ScoreEvent::new(0, 0, 0);
        let prediction = predict(&event, &Velocity::default(), None, &config());
        assert_eq!(
            Prediction {
                total: 150,
                home: 0,
                away: 0
            },
            prediction
        );
    }

    #[test]
    fn overall_rate_extrapolated() {
        let event = ScoreEvent::new(700, 30, 28);
        let velocity = Velocity::overall(&event);
        let prediction = predict(&event, &velocity, None, &config());
        assert_eq!(
            Prediction {
                total: 239,
                home: 123,
                away: 115
            },
            prediction
        );
    }

    #[test]
    fn historical_average_blended() {
        let event = ScoreEvent::new(700, 30, 28);
        let velocity = Velocity::overall(&event);
        let prediction = predict(&event, &velocity, Some(220.0), &config());
        assert_eq!(235, prediction.total);
        assert_eq!(123, prediction.home);
        assert_eq!(115, prediction.away);
    }

    #[test]
    fn divergent_history_discounted() {
        // projection of 238.6 is more than 20% above 180, so the weight of 0.227 is halved
        let event = ScoreEvent::new(700, 30, 28);
        let velocity = Velocity::overall(&event);
        let prediction = predict(&event, &velocity, Some(180.0), &config());
        assert_eq!(232, prediction.total);
    }

    #[test]
    fn history_ignored_early() {
        let event = ScoreEvent::new(240, 8, 6);
        let velocity = Velocity::overall(&event);
        let without = predict(&event, &velocity, None, &config());
        let with = predict(&event, &velocity, Some(180.0), &config());
        assert_eq!(without, with);
        assert_eq!(168, with.total);
    }

    #[test]
    fn zero_history_ignored() {
        let event = ScoreEvent::new(700, 30, 28);
        let velocity = Velocity::overall(&event);
        assert_eq!(239, predict(&event, &velocity, Some(0.0), &config()).total);
    }

    #[test]
    fn scoreless_game_extrapolates_proportionally() {
        let event = ScoreEvent::new(60, 0, 0);
        let prediction = predict(&event, &Velocity::default(), None, &config());
        assert_eq!(
            Prediction {
                total: 150,
                home: 0,
                away: 0
            },
            prediction
        );
    }

    #[test]
    fn never_below_current_score() {
        let event = ScoreEvent::new(2820, 150, 140);
        let prediction = predict(&event, &Velocity::default(), None, &config());
        assert!(prediction.total >= 290);
        assert!(prediction.home >= 150);
        assert!(prediction.away >= 140);
    }

    #[test]
    fn bounded_above() {
        let event = ScoreEvent::new(720, 60, 60);
        let velocity = Velocity {
            total: 1.0,
            home: 0.5,
            away: 0.5,
        };
        let prediction = predict(&event, &velocity, None, &config());
        assert_eq!(350, prediction.total);
        assert!(prediction.home > 350 / 2);
    }

    #[test]
    fn display_range() {
        let range = |total| Prediction { total, ..Default::default() }.range(&config());
        assert_eq!((215, 255), range(235));
        assert_eq!((150, 180), range(160));
        assert_eq!((320, 350), range(340));
    }
}
