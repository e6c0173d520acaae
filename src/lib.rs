//! Live extrapolation of basketball final scores from play-by-play timelines.
//!
//! Raw timeline text is normalised into score events, a windowed scoring velocity is estimated
//! at each event, and a final-score prediction is derived from it, optionally blended with the
//! teams' historical averages. Heuristic confidence and betting appraisals are layered on top.

pub mod config;
pub mod confidence;
pub mod csv;
pub mod file;
pub mod history;
pub mod parse;
pub mod predict;
pub mod print;
pub mod sample;
pub mod series;
pub mod stats;
pub mod team;
pub mod timeline;
pub mod velocity;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
