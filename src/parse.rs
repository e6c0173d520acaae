//! Normalisation of pasted or uploaded play-by-play text into an ordered sequence of score events.
//!
//! Three input shapes are understood:
//!
//! * four independent per-quarter blocks, where the clock column is the time remaining in that quarter;
//! * a single combined block spanning several quarters, where quarter boundaries are inferred from
//!   marker lines or from the clock resetting;
//! * a CSV-like file with `time,home,away[,...]` columns, where `time` is the elapsed game clock.
//!
//! Parsing is lenient: rows that cannot be understood are dropped without complaint. Only an input
//! that yields no rows at all is reported as an error.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use strum_macros::Display;
use thiserror::Error;
use tracing::{debug, trace};

use crate::timeline::{ScoreEvent, GAME_SECONDS, MAX_SCORE, QUARTERS, QUARTER_SECONDS};

static QUARTER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([1-4])(st|nd|rd|th)?").unwrap());
static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

/// A clock reading at or above this many minutes following one below [`ROLLOVER_BELOW`] seconds
/// starts a new quarter.
const ROLLOVER_MINUTES: u32 = 11;
const ROLLOVER_BELOW: u32 = 10 * 60;

/// No clock, whether remaining in a quarter or elapsed in the game, reads beyond regulation.
const MAX_CLOCK_MINUTES: u32 = GAME_SECONDS / 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InputKind {
    #[strum(serialize = "quarter-by-quarter")]
    Quarters,
    #[strum(serialize = "combined")]
    Combined,
    #[strum(serialize = "CSV file")]
    CsvFile,
    #[strum(serialize = "structured")]
    Events,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no score events could be read from the {kind} input")]
    EmptyInput { kind: InputKind },
}

/// Converts a quarter clock reading into seconds elapsed since tip-off.
///
/// Accepts `MM:SS` or a bare decimal such as `58.5`, both read as the time *remaining* in a
/// 12-minute quarter. Fractional readings are rounded to the nearest second. Returns `None` for
/// end-of-period rows and anything unparseable.
pub fn parse_time(raw: &str, quarter: u8) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || raw.to_lowercase().contains("end") {
        return None;
    }
    let remaining = if raw.contains(':') {
        let (minutes, seconds) = parse_clock(raw)?;
        (minutes * 60 + seconds) as f64
    } else if raw.contains('.') {
        raw.parse::<f64>().ok().filter(|secs| secs.is_finite())?
    } else {
        return None;
    };
    let quarter_seconds = QUARTER_SECONDS as f64;
    if !(0.0..=quarter_seconds).contains(&remaining) || !(1..=QUARTERS).contains(&quarter) {
        return None;
    }
    let elapsed = (quarter as u32 - 1) * QUARTER_SECONDS + (quarter_seconds - remaining).round() as u32;
    Some(elapsed)
}

fn parse_clock(raw: &str) -> Option<(u32, u32)> {
    let (minutes, seconds) = raw.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;
    if minutes <= MAX_CLOCK_MINUTES && seconds < 60 {
        Some((minutes, seconds))
    } else {
        None
    }
}

/// Splits a row into trimmed, non-empty cells: on tabs, else commas, else any run of commas and
/// whitespace.
fn split_cells(line: &str) -> Vec<&str> {
    fn nonempty<'a>(cells: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        cells.map(str::trim).filter(|cell| !cell.is_empty()).collect()
    }

    let cells = nonempty(line.split('\t'));
    if cells.len() >= 3 {
        return cells;
    }
    let cells = nonempty(line.split(','));
    if cells.len() >= 3 {
        return cells;
    }
    nonempty(SEPARATOR_RUN.split(line))
}

fn parse_score(cell: &str) -> Option<u32> {
    cell.parse().ok().filter(|&score| score <= MAX_SCORE)
}

fn is_header(line: &str) -> bool {
    let upper = line.to_uppercase();
    upper.contains("TIME") && upper.contains("PLAY")
}

fn is_marker(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("end of") || lower.contains("quarter")
}

/// Parses one play-by-play row, taking the last two numeric cells as the home and away scores and
/// anything between the clock and the scores as the play description.
pub fn parse_row(line: &str, quarter: u8) -> Option<ScoreEvent> {
    let cells = split_cells(line);
    if cells.len() < 3 {
        return None;
    }
    let elapsed = parse_time(cells[0], quarter)?;
    let (home, away, play) = if cells.len() >= 4 {
        let home = parse_score(cells[cells.len() - 2])?;
        let away = parse_score(cells[cells.len() - 1])?;
        (home, away, cells[1..cells.len() - 2].join(" "))
    } else {
        let numbers: Vec<u32> = cells[1..]
            .iter()
            .filter_map(|cell| parse_score(cell))
            .collect();
        if numbers.len() < 2 {
            return None;
        }
        (numbers[numbers.len() - 2], numbers[numbers.len() - 1], String::new())
    };
    let event = ScoreEvent::new(elapsed, home, away).with_quarter(quarter);
    Some(if play.is_empty() {
        event
    } else {
        event.with_play(play)
    })
}

fn parse_block(text: &str, quarter: u8, events: &mut Vec<ScoreEvent>) {
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if is_header(line) || is_marker(line) {
            continue;
        }
        match parse_row(line, quarter) {
            Some(event) => events.push(event),
            None => trace!("dropped Q{quarter} row '{line}'"),
        }
    }
}

/// Parses up to four independent per-quarter blocks. Block `n` holds quarter `n + 1`.
pub fn parse_quarters<S: AsRef<str>>(blocks: &[Option<S>]) -> Result<Vec<ScoreEvent>, ParseError> {
    let mut events = vec![];
    for (index, block) in blocks.iter().take(QUARTERS as usize).enumerate() {
        if let Some(block) = block {
            parse_block(block.as_ref(), index as u8 + 1, &mut events);
        }
    }
    finalise(events, InputKind::Quarters)
}

/// Parses a single block spanning several quarters.
pub fn parse_combined(text: &str) -> Result<Vec<ScoreEvent>, ParseError> {
    let mut events = vec![];
    let mut quarter = 1;
    let mut last_clock: Option<u32> = None;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if is_header(line) {
            continue;
        }
        if is_marker(line) {
            if let Some(marked) = marked_quarter(line) {
                quarter = marked;
                last_clock = None;
            }
            continue;
        }

        let cells = split_cells(line);
        if let Some(clock) = cells.first().filter(|cell| !cell.contains('.')) {
            if let Some((minutes, seconds)) = parse_clock(clock) {
                if minutes >= ROLLOVER_MINUTES && last_clock.is_some_and(|last| last < ROLLOVER_BELOW) {
                    quarter = u8::min(quarter + 1, QUARTERS);
                    debug!("clock reset to {clock}, inferred start of Q{quarter}");
                }
                last_clock = Some(minutes * 60 + seconds);
            }
        }

        match parse_row(line, quarter) {
            Some(event) => events.push(event),
            None => trace!("dropped row '{line}'"),
        }
    }
    finalise(events, InputKind::Combined)
}

/// The quarter in play after a marker line. "End of" markers close the named quarter.
fn marked_quarter(line: &str) -> Option<u8> {
    let captures = QUARTER_MARKER.captures(line)?;
    let named: u8 = captures[1].parse().ok()?;
    if line.to_lowercase().contains("end of") {
        Some(u8::min(named + 1, QUARTERS))
    } else {
        Some(named)
    }
}

/// Parses a CSV-like file of `time,home,away[,...]` rows, with an optional header line. The time
/// column is the elapsed game clock, either `M:SS` or seconds.
pub fn parse_csv_file(text: &str) -> Result<Vec<ScoreEvent>, ParseError> {
    let mut lines = text.trim().lines().peekable();
    if lines
        .peek()
        .is_some_and(|first| first.to_lowercase().contains("time"))
    {
        lines.next();
    }

    let mut events = vec![];
    for line in lines {
        let cells: Vec<_> = SEPARATOR_RUN
            .split(line.trim())
            .filter(|cell| !cell.is_empty())
            .collect();
        if cells.len() < 3 {
            continue;
        }
        let parsed = parse_elapsed(cells[0])
            .zip(parse_score(cells[1]))
            .zip(parse_score(cells[2]));
        match parsed {
            Some(((elapsed, home), away)) => events.push(ScoreEvent::new(elapsed, home, away)),
            None => trace!("dropped CSV row '{line}'"),
        }
    }
    finalise(events, InputKind::CsvFile)
}

fn parse_elapsed(raw: &str) -> Option<u32> {
    let elapsed = match parse_clock(raw) {
        Some((minutes, seconds)) => minutes * 60 + seconds,
        None => {
            let seconds = raw.parse::<f64>().ok()?;
            if !seconds.is_finite() || seconds < 0.0 {
                return None;
            }
            seconds.round() as u32
        }
    };
    if elapsed <= GAME_SECONDS {
        Some(elapsed)
    } else {
        None
    }
}

/// Collapses events sharing a timestamp (the last one parsed wins), orders them by elapsed time
/// and drops any event whose score regresses against its predecessor.
pub fn normalise(events: Vec<ScoreEvent>) -> Vec<ScoreEvent> {
    let parsed = events.len();
    let mut by_elapsed = FxHashMap::with_capacity_and_hasher(parsed, Default::default());
    for event in events {
        by_elapsed.insert(event.elapsed, event);
    }
    let mut unique: Vec<_> = by_elapsed.into_values().collect();
    unique.sort_by_key(|event| event.elapsed);

    let mut ordered: Vec<ScoreEvent> = Vec::with_capacity(unique.len());
    for event in unique {
        match ordered.last() {
            Some(prev) if event.home < prev.home || event.away < prev.away => {
                debug!(
                    "dropped regressing score {}-{} at {}s (previous {}-{})",
                    event.home, event.away, event.elapsed, prev.home, prev.away
                );
            }
            _ => ordered.push(event),
        }
    }
    debug!("normalised {parsed} parsed rows into {} events", ordered.len());
    ordered
}

fn finalise(events: Vec<ScoreEvent>, kind: InputKind) -> Result<Vec<ScoreEvent>, ParseError> {
    if events.is_empty() {
        return Err(ParseError::EmptyInput { kind });
    }
    Ok(normalise(events))
}
