//! A recorded first quarter, Cavaliers (home) against Bulls (away), December 17, 2024.

use crate::timeline::{ScoreEvent, QUARTER_SECONDS};

pub const TITLE: &str = "Bulls vs Cavaliers Q1 (Dec 17, 2024)";
pub const HOME_TEAM: &str = "Cleveland Cavaliers";
pub const AWAY_TEAM: &str = "Chicago Bulls";

/// `(elapsed, home, away)`
const TIMELINE: [(u32, u32, u32); 29] = [
    (0, 0, 0),
    (43, 2, 0),
    (59, 2, 2),
    (72, 4, 2),
    (109, 4, 4),
    (121, 6, 4),
    (136, 9, 4),
    (151, 9, 6),
    (165, 12, 6),
    (183, 12, 8),
    (188, 15, 8),
    (202, 15, 11),
    (219, 17, 11),
    (246, 20, 11),
    (255, 20, 13),
    (270, 20, 16),
    (294, 23, 16),
    (360, 26, 16),
    (396, 28, 16),
    (405, 28, 18),
    (448, 28, 21),
    (515, 28, 24),
    (545, 28, 26),
    (575, 30, 26),
    (605, 30, 28),
    (636, 32, 28),
    (656, 32, 31),
    (688, 32, 33),
    (701, 34, 33),
];

pub fn events() -> Vec<ScoreEvent> {
    TIMELINE
        .iter()
        .map(|&(elapsed, home, away)| ScoreEvent::new(elapsed, home, away))
        .collect()
}

/// The same quarter as a pasted play-by-play block, with the clock counting down.
pub fn play_by_play() -> String {
    let mut text = String::from("TIME\tPLAY\tCLE\tCHI\n");
    for &(elapsed, home, away) in TIMELINE.iter().rev() {
        let remaining = QUARTER_SECONDS - elapsed;
        text.push_str(&format!(
            "{}:{:02}\tscore change\t{home}\t{away}\n",
            remaining / 60,
            remaining % 60
        ));
    }
    text
}
