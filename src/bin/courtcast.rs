use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use courtcast::config::Config;
use courtcast::confidence::{BettingQuotes, BettingSlip};
use courtcast::csv::{export, CsvWriter};
use courtcast::file::{read_text, FromJsonFile};
use courtcast::print::{
    tabulate_betting, tabulate_factors, tabulate_history, tabulate_ladder, tabulate_series,
};
use courtcast::sample;
use courtcast::series::{Forecaster, RawInputs, TimelineInput};
use courtcast::team::detect_team_name;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// first-quarter play-by-play
    #[clap(long)]
    q1: Option<PathBuf>,

    /// second-quarter play-by-play
    #[clap(long)]
    q2: Option<PathBuf>,

    /// third-quarter play-by-play
    #[clap(long)]
    q3: Option<PathBuf>,

    /// fourth-quarter play-by-play
    #[clap(long)]
    q4: Option<PathBuf>,

    /// play-by-play spanning several quarters
    #[clap(short = 'c', long)]
    combined: Option<PathBuf>,

    /// CSV file of elapsed time, home and away scores
    #[clap(short = 'f', long)]
    csv: Option<PathBuf>,

    /// use the built-in sample game
    #[clap(short = 's', long)]
    sample: bool,

    /// home team schedule and results
    #[clap(long)]
    home_history: Option<PathBuf>,

    /// away team schedule and results
    #[clap(long)]
    away_history: Option<PathBuf>,

    /// velocity window in seconds
    #[clap(short = 'w', long)]
    window: Option<u32>,

    /// over/under line
    #[clap(long)]
    line: Option<f64>,

    /// market confidence in the over/under line, in percent
    #[clap(long)]
    line_confidence: Option<f64>,

    /// upper over/under line
    #[clap(long)]
    high_line: Option<f64>,

    /// market confidence in the upper line, in percent
    #[clap(long)]
    high_confidence: Option<f64>,

    /// target total to bet on
    #[clap(short = 't', long)]
    target: Option<f64>,

    /// cost to win one unit
    #[clap(long)]
    cost: Option<f64>,

    /// index of the event to assess (defaults to the last)
    #[clap(long)]
    at: Option<usize>,

    /// JSON config overriding the tuned defaults
    #[clap(long)]
    config: Option<PathBuf>,

    /// write the derived series to a CSV file
    #[clap(short = 'o', long)]
    export: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        let quarters = [&self.q1, &self.q2, &self.q3, &self.q4]
            .iter()
            .any(|quarter| quarter.is_some());
        let sources = [quarters, self.combined.is_some(), self.csv.is_some(), self.sample];
        if sources.iter().filter(|&&source| source).count() != 1 {
            bail!("exactly one of the quarter files, -c, -f or -s must be specified");
        }
        if self.line.is_some() != self.line_confidence.is_some() {
            bail!("--line and --line-confidence must be specified together");
        }
        if self.high_line.is_some() != self.high_confidence.is_some() {
            bail!("--high-line and --high-confidence must be specified together");
        }
        if self.high_line.is_some() && self.line.is_none() {
            bail!("--high-line requires --line");
        }
        for confidence in [self.line_confidence, self.high_confidence].into_iter().flatten() {
            if !(0.0..=100.0).contains(&confidence) {
                bail!("line confidence must be a percentage, got {confidence}");
            }
        }
        if self.target.is_some() != self.cost.is_some() {
            bail!("--target and --cost must be specified together");
        }
        Ok(())
    }

    fn timeline(&self) -> anyhow::Result<TimelineInput> {
        if self.sample {
            return Ok(TimelineInput::Events(sample::events()));
        }
        if let Some(path) = &self.combined {
            return Ok(TimelineInput::Combined(required_text(path)?));
        }
        if let Some(path) = &self.csv {
            return Ok(TimelineInput::CsvFile(required_text(path)?));
        }
        let mut blocks: [Option<String>; 4] = Default::default();
        for (block, path) in blocks.iter_mut().zip([&self.q1, &self.q2, &self.q3, &self.q4]) {
            if let Some(path) = path {
                *block = read_text(path)?;
            }
        }
        Ok(TimelineInput::Quarters(blocks))
    }

    fn quotes(&self) -> Option<BettingQuotes> {
        let quotes = BettingQuotes::single(self.line?, self.line_confidence?);
        Some(match self.high_line.zip(self.high_confidence) {
            Some((line, confidence)) => quotes.with_upper(line, confidence),
            None => quotes,
        })
    }

    fn slip(&self) -> Option<BettingSlip> {
        Some(BettingSlip {
            target: self.target?,
            cost: self.cost?,
        })
    }
}

fn required_text(path: &Path) -> anyhow::Result<String> {
    read_text(path)?.ok_or_else(|| anyhow!("{} is empty", path.display()))
}

fn optional_text(path: &Option<PathBuf>) -> anyhow::Result<Option<String>> {
    match path {
        None => Ok(None),
        Some(path) => Ok(read_text(path)?),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut config = match &args.config {
        None => Config::default(),
        Some(path) => Config::from_json_file(path)?,
    };
    if let Some(window) = args.window {
        config = config.with_window(window);
    }
    let forecaster = Forecaster::try_from(config)?;
    let config = forecaster.config();

    let inputs = RawInputs {
        timeline: args.timeline()?,
        home_history: optional_text(&args.home_history)?,
        away_history: optional_text(&args.away_history)?,
        quotes: args.quotes(),
        slip: args.slip(),
    };
    let series = forecaster.compute(&inputs)?;
    let final_total = series.final_total();

    let (home_team, away_team) = if args.sample {
        (sample::HOME_TEAM.to_string(), sample::AWAY_TEAM.to_string())
    } else {
        let detect = |text: &Option<String>, fallback: &str| {
            text.as_deref()
                .and_then(detect_team_name)
                .unwrap_or_else(|| fallback.to_string())
        };
        (
            detect(&inputs.home_history, "Home"),
            detect(&inputs.away_history, "Away"),
        )
    };
    if args.sample {
        info!("sample: {}", sample::TITLE);
    }
    info!(
        "{home_team} vs {away_team}, {} events:\n{}",
        series.points.len(),
        Console::default().render(&tabulate_series(&series.points, final_total))
    );

    let teams: Vec<_> = [
        (home_team.as_str(), series.home_history.as_ref()),
        (away_team.as_str(), series.away_history.as_ref()),
    ]
    .into_iter()
    .filter_map(|(name, stats)| stats.map(|stats| (name, stats)))
    .collect();
    if !teams.is_empty() {
        info!(
            "historical scoring:\n{}",
            Console::default().render(&tabulate_history(&teams, series.historical_total.as_ref()))
        );
    }

    match series.accuracy() {
        Some(accuracy) => info!(
            "final total: {}, mean error: {:.1}, average accuracy: {:.1}%",
            accuracy.final_total, accuracy.mean_error, accuracy.avg_accuracy
        ),
        None => info!("no accuracy summary: final total is zero"),
    }

    let last = series.points.len() - 1;
    let index = args.at.unwrap_or(last);
    let Some(point) = series.points.get(index) else {
        return Err(anyhow!("event index {index} out of range 0..={last}").into());
    };
    let (low, high) = point.prediction.range(&config.prediction);
    info!(
        "at {}s ({}-{}): predicted total {} (range {low}-{high}), home {}, away {}",
        point.event.elapsed,
        point.event.home,
        point.event.away,
        point.prediction.total,
        point.prediction.home,
        point.prediction.away
    );

    let confidence = series.confidence(config);
    match (confidence.factors(index), confidence.base(index)) {
        (Some(factors), Some(base)) => info!(
            "base confidence: {base:.0}%\n{}",
            Console::default().render(&tabulate_factors(&factors, &config.confidence.weights))
        ),
        _ => warn!(
            "no base confidence: at least {} events are needed",
            config.confidence.min_points
        ),
    }
    info!(
        "confidence ladder:\n{}",
        Console::default().render(&tabulate_ladder(&confidence.ladder(index)))
    );

    if let Some(analysis) = series.betting_analysis(index, config)? {
        info!(
            "betting analysis:\n{}",
            Console::default().render(&tabulate_betting(&analysis))
        );
    }

    if let Some(path) = &args.export {
        let mut writer = CsvWriter::create(path)?;
        export(&mut writer, &series.points)?;
        info!("exported {} rows to {}", series.points.len(), path.display());
    }
    Ok(())
}
