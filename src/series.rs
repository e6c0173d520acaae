//! Full recomputation of the derived series from raw inputs.
//!
//! [`compute_series`] is a pure function of its arguments: every call parses, normalises and
//! predicts from scratch and returns a complete snapshot. Nothing is cached between calls, so
//! separate games may be computed concurrently.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use crate::confidence::{BettingAnalysis, BettingError, BettingQuotes, BettingSlip, Confidence};
use crate::history::{CombinedHistoricalTotal, TeamHistoricalStats};
use crate::parse::{self, InputKind, ParseError};
use crate::predict::{predict, Prediction};
use crate::stats::SliceExt;
use crate::timeline::{ScoreEvent, QUARTERS};
use crate::velocity::{self, Velocity};

/// The shape in which the game timeline was supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineInput {
    /// Up to four per-quarter blocks.
    Quarters([Option<String>; QUARTERS as usize]),
    Combined(String),
    CsvFile(String),
    /// Already-structured events, which are still normalised.
    Events(Vec<ScoreEvent>),
}
impl TimelineInput {
    pub fn parse(&self) -> Result<Vec<ScoreEvent>, ParseError> {
        match self {
            TimelineInput::Quarters(blocks) => parse::parse_quarters(blocks),
            TimelineInput::Combined(text) => parse::parse_combined(text),
            TimelineInput::CsvFile(text) => parse::parse_csv_file(text),
            TimelineInput::Events(events) if events.is_empty() => Err(ParseError::EmptyInput {
                kind: InputKind::Events,
            }),
            TimelineInput::Events(events) => Ok(parse::normalise(events.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawInputs {
    pub timeline: TimelineInput,
    pub home_history: Option<String>,
    pub away_history: Option<String>,
    pub quotes: Option<BettingQuotes>,
    pub slip: Option<BettingSlip>,
}
impl RawInputs {
    pub fn new(timeline: TimelineInput) -> Self {
        Self {
            timeline,
            home_history: None,
            away_history: None,
            quotes: None,
            slip: None,
        }
    }
}

/// A score event annotated with its velocity, prediction and retrospective error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePoint {
    pub event: ScoreEvent,
    pub velocity: Velocity,
    pub prediction: Prediction,
    /// Distance of the predicted total from the final observed total.
    pub error: u32,
}
impl GamePoint {
    /// Accuracy of the predicted total as a percentage of `final_total`.
    pub fn accuracy(&self, final_total: u32) -> Option<f64> {
        if final_total == 0 {
            None
        } else {
            Some(100.0 - self.error as f64 / final_total as f64 * 100.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub final_total: u32,
    pub mean_error: f64,
    pub avg_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub points: Vec<GamePoint>,
    pub home_history: Option<TeamHistoricalStats>,
    pub away_history: Option<TeamHistoricalStats>,
    pub historical_total: Option<CombinedHistoricalTotal>,
    pub quotes: Option<BettingQuotes>,
    pub slip: Option<BettingSlip>,
}
impl DerivedSeries {
    /// The total at the last observed event; zero for an empty series.
    pub fn final_total(&self) -> u32 {
        self.points.last().map(|point| point.event.total()).unwrap_or_default()
    }

    pub fn accuracy(&self) -> Option<AccuracySummary> {
        let final_total = self.final_total();
        if final_total == 0 {
            return None;
        }
        let errors: Vec<_> = self.points.iter().map(|point| point.error as f64).collect();
        let mean_error = errors.mean()?;
        Some(AccuracySummary {
            final_total,
            mean_error,
            avg_accuracy: 100.0 - mean_error / final_total as f64 * 100.0,
        })
    }

    pub fn confidence<'a>(&'a self, config: &'a Config) -> Confidence<'a> {
        Confidence::new(
            &self.points,
            self.quotes.as_ref(),
            self.historical_total.as_ref(),
            &config.confidence,
        )
    }

    /// Appraises the supplied betting slip, if any, against the prediction at `index`.
    pub fn betting_analysis(
        &self,
        index: usize,
        config: &Config,
    ) -> Result<Option<BettingAnalysis>, BettingError> {
        match &self.slip {
            None => Ok(None),
            Some(slip) => self.confidence(config).analyse_bet(index, slip),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid betting input: {0}")]
    Betting(#[from] BettingError),
}

/// Computes derived series under a validated [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct Forecaster {
    config: Config,
}
impl Forecaster {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validates the betting inputs, then parses and predicts the timeline.
    pub fn compute(&self, inputs: &RawInputs) -> Result<DerivedSeries, SeriesError> {
        if let Some(quotes) = &inputs.quotes {
            quotes.validate()?;
        }
        if let Some(slip) = &inputs.slip {
            slip.validate()?;
        }
        let events = inputs.timeline.parse()?;
        let home_history = inputs.home_history.as_deref().and_then(TeamHistoricalStats::parse);
        let away_history = inputs.away_history.as_deref().and_then(TeamHistoricalStats::parse);
        let historical_total = match (&home_history, &away_history) {
            (Some(home), Some(away)) => Some(CombinedHistoricalTotal::combine(home, away)),
            _ => None,
        };

        let points = self.derive_points(&events, historical_total.as_ref().map(|total| total.avg));
        info!(
            "computed {} points over {}s, final total {}",
            points.len(),
            events.last().map(|event| event.elapsed).unwrap_or_default(),
            events.last().map(ScoreEvent::total).unwrap_or_default()
        );
        Ok(DerivedSeries {
            points,
            home_history,
            away_history,
            historical_total,
            quotes: inputs.quotes.clone(),
            slip: inputs.slip.clone(),
        })
    }

    /// Annotates every event of a normalised sequence with its velocity and prediction. Errors
    /// are measured against the last event's total.
    pub fn derive_points(&self, events: &[ScoreEvent], historical_avg: Option<f64>) -> Vec<GamePoint> {
        let final_total = events.last().map(ScoreEvent::total).unwrap_or_default();
        events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let velocity = velocity::estimate(events, index, &self.config.velocity);
                let prediction = predict(event, &velocity, historical_avg, &self.config.prediction);
                debug!(
                    "{}s {}-{}: velocity {:.2}/min, predicted {}",
                    event.elapsed,
                    event.home,
                    event.away,
                    velocity.per_minute(),
                    prediction.total
                );
                GamePoint {
                    event: event.clone(),
                    velocity,
                    error: prediction.total.abs_diff(final_total),
                    prediction,
                }
            })
            .collect()
    }
}

impl TryFrom<Config> for Forecaster {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self { config })
    }
}

/// Parses, normalises and predicts from `inputs`, returning a complete new snapshot.
pub fn compute_series(inputs: &RawInputs, config: &Config) -> Result<DerivedSeries, SeriesError> {
    Forecaster::try_from(config.clone())?.compute(inputs)
}
