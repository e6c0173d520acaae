//! Windowed estimation of scoring rates.
//!
//! The raw rate over the look-back window is dampened by a pace factor built from how often the
//! window's sub-periods saw scoring and how efficiently shots were converted, then kept within a
//! band around the game's overall rate. All rates are in points per second.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::VelocityConfig;
use crate::stats::clamp;
use crate::timeline::ScoreEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub total: f64,
    pub home: f64,
    pub away: f64,
}
impl Velocity {
    /// The average rates since tip-off. `event` must not be at zero elapsed time.
    pub fn overall(event: &ScoreEvent) -> Self {
        let elapsed = event.elapsed as f64;
        Self {
            total: event.total() as f64 / elapsed,
            home: event.home as f64 / elapsed,
            away: event.away as f64 / elapsed,
        }
    }

    /// Total rate in points per minute.
    pub fn per_minute(&self) -> f64 {
        self.total * 60.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Miss,
    Make,
    Turnover,
}
impl PlayOutcome {
    pub fn classify(play: &str) -> Option<Self> {
        let play = play.to_lowercase();
        if play.contains("misses")
            || play.contains("miss ")
            || play.contains(" missed")
            || (play.contains("miss") && !play.contains("makes"))
        {
            Some(PlayOutcome::Miss)
        } else if play.contains("makes") || play.contains("make ") {
            Some(PlayOutcome::Make)
        } else if play.contains("turnover") || play.contains("turn over") {
            Some(PlayOutcome::Turnover)
        } else {
            None
        }
    }
}

/// Activity observed across the sub-periods of a window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowActivity {
    pub periods: u32,
    pub scoring_periods: u32,
    pub events: usize,
    pub made_shots: f64,
    pub missed_shots: f64,
}
impl WindowActivity {
    /// Buckets `window` into sub-periods starting at its first event and spanning `span` seconds.
    pub fn observe(window: &[ScoreEvent], span: u32, config: &VelocityConfig) -> Self {
        let mut activity = WindowActivity {
            periods: span / config.sub_period,
            ..Default::default()
        };
        let Some(oldest) = window.first() else {
            return activity;
        };
        for period in 0..activity.periods {
            let start = oldest.elapsed + period * config.sub_period;
            let end = start + config.sub_period;
            let in_period: Vec<_> = window
                .iter()
                .filter(|event| (start..end).contains(&event.elapsed))
                .collect();
            activity.events += in_period.len();

            for event in &in_period {
                match event.play.as_deref().and_then(PlayOutcome::classify) {
                    Some(PlayOutcome::Miss) => activity.missed_shots += 1.0,
                    Some(PlayOutcome::Make) => activity.made_shots += 1.0,
                    Some(PlayOutcome::Turnover) => activity.missed_shots += config.turnover_miss_weight,
                    None => {}
                }
            }

            if in_period.windows(2).any(|pair| pair[0].total() != pair[1].total()) {
                activity.scoring_periods += 1;
            }
        }
        activity
    }

    pub fn scoring_frequency(&self, config: &VelocityConfig) -> f64 {
        if self.periods > 0 {
            self.scoring_periods as f64 / self.periods as f64
        } else {
            config.default_scoring_frequency
        }
    }

    pub fn event_density(&self, config: &VelocityConfig) -> f64 {
        if self.events > 0 {
            self.scoring_periods as f64 / self.events as f64
        } else {
            config.default_event_density
        }
    }

    pub fn shooting_efficiency(&self, config: &VelocityConfig) -> f64 {
        let attempts = self.made_shots + self.missed_shots;
        if attempts > 0.0 {
            let make_rate = self.made_shots / attempts;
            let (min, max) = config.efficiency_bounds;
            clamp(
                config.efficiency_base + (make_rate - config.efficiency_anchor) * config.efficiency_slope,
                min,
                max,
            )
        } else {
            config.default_shooting_efficiency
        }
    }

    /// Multiplier in `[pace_floor, 1]` (for frequencies in `[0, 1]`) applied to the raw window rate.
    pub fn pace_factor(&self, config: &VelocityConfig) -> f64 {
        let weights = &config.frequency_weights;
        let combined = weights.scoring_frequency * self.scoring_frequency(config)
            + weights.event_density * self.event_density(config)
            + weights.shooting_efficiency * self.shooting_efficiency(config);
        config.pace_floor + (1.0 - config.pace_floor) * combined
    }
}

/// Estimates the scoring velocity at `index` from the events preceding it. `events` must be
/// normalised (see [`crate::parse::normalise`]).
pub fn estimate(events: &[ScoreEvent], index: usize, config: &VelocityConfig) -> Velocity {
    if index == 0 || index >= events.len() || events[index].elapsed == 0 {
        return Velocity::default();
    }
    let current = &events[index];
    let overall = Velocity::overall(current);

    let window_start = current.elapsed.saturating_sub(config.effective_window());
    let preceding = &events[..=index];
    let window = &preceding[preceding.partition_point(|event| event.elapsed < window_start)..];
    if window.len() < 2 {
        return overall;
    }

    let oldest = &window[0];
    let newest = window
        .iter()
        .rev()
        .find(|event| !event.same_score(oldest))
        .unwrap_or(&window[window.len() - 1]);
    let span = newest.elapsed - oldest.elapsed;
    if span < config.min_span {
        return overall;
    }

    let activity = WindowActivity::observe(window, span, config);
    let pace = activity.pace_factor(config);
    trace!("window {}..={}s: {activity:?}, pace: {pace:.3}", oldest.elapsed, current.elapsed);

    let rate = |newest: u32, oldest: u32| (newest as f64 - oldest as f64) / span as f64 * pace;
    let (min_multiple, max_multiple) = config.rate_multiples;
    let max_rate = overall.total * max_multiple;
    Velocity {
        total: clamp(
            rate(newest.total(), oldest.total()),
            overall.total * min_multiple,
            max_rate,
        ),
        home: clamp(rate(newest.home, oldest.home), 0.0, max_rate),
        away: clamp(rate(newest.away, oldest.away), 0.0, max_rate),
    }
}
