//! Per-team scoring history, parsed from free-text schedule and result listings.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats::{round_1dp, SliceExt};

static RESULT_CELL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[WL]\d+-\d+").unwrap());
static RESULT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([WL])(\d+)-(\d+)").unwrap());
static THREE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{3})\b").unwrap());
static WIDE_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

/// Team scores read from a `W131-124`/`L119-111` result are kept within this range.
const RESULT_SCORES: std::ops::RangeInclusive<u32> = 70..=200;
/// Scores read from bare numbers are kept within this range.
const BARE_SCORES: std::ops::RangeInclusive<u32> = 80..=200;
const RECENT_GAMES: usize = 5;

/// Extracts the team's own scores from a schedule listing, most recent game first.
///
/// Each line is searched for a result such as `W131-124` (the team scored the first number) or
/// `L119-111` (the team scored the second). Lines without a result contribute their first
/// plausible three-digit number instead. Should no line yield anything, the whole input is read as a
/// plain list of numbers.
pub fn parse_scores(text: &str) -> Vec<u32> {
    let mut scores = vec![];
    for line in text.trim().lines().map(str::trim).filter(|line| !line.is_empty()) {
        if is_header(line) {
            continue;
        }

        if let Some(result) = find_result(line) {
            if let Some(score) = team_score(result).filter(|score| RESULT_SCORES.contains(score)) {
                scores.push(score);
            }
            continue;
        }

        let bare = THREE_DIGITS
            .captures_iter(line)
            .filter_map(|captures| captures[1].parse::<u32>().ok())
            .find(|score| BARE_SCORES.contains(score));
        if let Some(score) = bare {
            scores.push(score);
        }
    }

    if scores.is_empty() {
        scores = SEPARATOR_RUN
            .split(text.trim())
            .filter_map(|token| token.parse::<u32>().ok())
            .filter(|score| BARE_SCORES.contains(score))
            .collect();
    }
    debug!("parsed {} historical scores", scores.len());
    scores
}

fn is_header(line: &str) -> bool {
    let upper = line.to_uppercase();
    upper.contains("DATE") && (upper.contains("OPPONENT") || upper.contains("RESULT"))
}

fn find_result(line: &str) -> Option<&str> {
    let mut cells = line.split('\t').collect::<Vec<_>>();
    if cells.len() < 3 {
        cells = WIDE_GAP.split(line).collect();
    }
    cells
        .into_iter()
        .map(str::trim)
        .find(|cell| RESULT_CELL.is_match(cell))
        .or_else(|| RESULT.find(line).map(|found| found.as_str()))
}

fn team_score(result: &str) -> Option<u32> {
    let captures = RESULT.captures(result)?;
    let index = if &captures[1] == "W" { 2 } else { 3 };
    captures[index].parse().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamHistoricalStats {
    /// Most recent first.
    pub scores: Vec<u32>,
    pub count: usize,
    pub avg: f64,
    pub median: f64,
    pub min: u32,
    pub max: u32,
    pub std_dev: f64,
    pub recent_avg: f64,
    pub previous_avg: f64,
    pub trend: f64,
}
impl TeamHistoricalStats {
    /// Summarises a list of scores, most recent first. Returns `None` for an empty list.
    pub fn from_scores(scores: Vec<u32>) -> Option<Self> {
        let values: Vec<_> = scores.iter().map(|&score| score as f64).collect();
        let avg = values.mean()?;
        let median = values.median()?;
        let std_dev = values.std_dev()?;
        let min = *scores.iter().min()?;
        let max = *scores.iter().max()?;
        let recent = &values[..usize::min(RECENT_GAMES, values.len())];
        let recent_avg = recent.mean().unwrap_or(avg);
        let previous = &values[recent.len()..usize::min(2 * RECENT_GAMES, values.len())];
        let previous_avg = previous.mean().unwrap_or(avg);
        Some(Self {
            count: scores.len(),
            scores,
            avg: round_1dp(avg),
            median: round_1dp(median),
            min,
            max,
            std_dev: round_1dp(std_dev),
            recent_avg: round_1dp(recent_avg),
            previous_avg: round_1dp(previous_avg),
            trend: round_1dp(recent_avg - previous_avg),
        })
    }

    pub fn parse(text: &str) -> Option<Self> {
        Self::from_scores(parse_scores(text))
    }
}

/// Expected combined total of both teams, assuming independent scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedHistoricalTotal {
    pub avg: f64,
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
}
impl CombinedHistoricalTotal {
    pub fn combine(home: &TeamHistoricalStats, away: &TeamHistoricalStats) -> Self {
        Self {
            avg: round_1dp(home.avg + away.avg),
            std_dev: round_1dp(f64::sqrt(home.std_dev.powi(2) + away.std_dev.powi(2))),
            min: home.min + away.min,
            max: home.max + away.max,
        }
    }
}
