//! Detection of a team's name from a pasted schedule listing. Display-only; nothing in the
//! prediction pipeline depends on it.

use std::sync::LazyLock;

use regex::Regex;

const SCANNED_LINES: usize = 10;

static SCHEDULE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(.+?)\s+Schedule").unwrap());
static TITLE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(More\s+)?(NBA\s+)?(Teams\s+)?").unwrap());
static SEASON_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\d{4}-\d{2}$").unwrap());
static FRANCHISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(Houston|Boston|Chicago|Cleveland|Dallas|Denver|Detroit|Golden State|Indiana|LA|",
        r"Los Angeles|Memphis|Miami|Milwaukee|Minnesota|New Orleans|New York|Oklahoma City|Orlando|",
        r"Philadelphia|Phoenix|Portland|Sacramento|San Antonio|Toronto|Utah|Washington|Atlanta|",
        r"Brooklyn|Charlotte)\s+",
        r"(Rockets|Celtics|Bulls|Cavaliers|Mavericks|Nuggets|Pistons|Warriors|Pacers|Clippers|Lakers|",
        r"Grizzlies|Heat|Bucks|Timberwolves|Pelicans|Knicks|Thunder|Magic|76ers|Suns|Trail Blazers|",
        r"Kings|Spurs|Raptors|Jazz|Wizards|Hawks|Nets|Hornets)"
    ))
    .unwrap()
});

/// Looks for a `"<name> Schedule"` title, or failing that a known city and nickname, in the first
/// few lines of `text`.
pub fn detect_team_name(text: &str) -> Option<String> {
    for line in text.trim().lines().take(SCANNED_LINES).map(str::trim) {
        if let Some(captures) = SCHEDULE_TITLE.captures(line) {
            let name = TITLE_PREFIX.replace(captures[1].trim(), "");
            let name = SEASON_SUFFIX.replace(name.trim(), "");
            let name = name.trim();
            if !name.is_empty() {
                return Some(name.to_owned());
            }
        }

        if let Some(found) = FRANCHISE.find(line) {
            return Some(found.as_str().trim().to_owned());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_title() {
        assert_eq!(
            Some("Houston Rockets".to_owned()),
            detect_team_name("Houston Rockets Schedule 2025-26\nDATE\tOPPONENT")
        );
        assert_eq!(
            Some("Chicago Bulls".to_owned()),
            detect_team_name("More NBA Teams Chicago Bulls Schedule")
        );
    }

    #[test]
    fn franchise_anywhere_in_line() {
        assert_eq!(
            Some("Cleveland Cavaliers".to_owned()),
            detect_team_name("\n\nRoster | Cleveland Cavaliers | Stats")
        );
    }

    #[test]
    fn nothing_found() {
        assert_eq!(None, detect_team_name(""));
        assert_eq!(None, detect_team_name("W131-124\nL119-111"));
    }

    #[test]
    fn only_first_lines_scanned() {
        let mut text = "filler\n".repeat(SCANNED_LINES);
        text.push_str("Boston Celtics");
        assert_eq!(None, detect_team_name(&text));
    }
}
