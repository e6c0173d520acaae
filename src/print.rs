use stanza::style::HAlign::Left;
use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};
use strum::IntoEnumIterator;

use crate::confidence::{BettingAnalysis, Factor, LadderRung};
use crate::history::{CombinedHistoricalTotal, TeamHistoricalStats};
use crate::series::GamePoint;
use crate::timeline::GameClock;

pub fn tabulate_series(points: &[GamePoint], final_total: u32) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![
                Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
                Col::new(Styles::default().with(MinWidth(3)).with(HAlign::Centred)),
            ];
            for _ in 0..3 {
                cols.push(Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Right)));
            }
            cols.push(Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(8))
                    .with(HAlign::Right),
            ));
            for _ in 0..5 {
                cols.push(Col::new(Styles::default().with(MinWidth(7)).with(HAlign::Right)));
            }
            cols
        })
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Time".into(),
                "Q".into(),
                "Home".into(),
                "Away".into(),
                "Total".into(),
                "Pts/min".into(),
                "Pred".into(),
                "Home".into(),
                "Away".into(),
                "Error".into(),
                "Acc %".into(),
            ],
        ));
    for point in points {
        let accuracy = point
            .accuracy(final_total)
            .map(|accuracy| format!("{accuracy:.1}"))
            .unwrap_or_else(|| "-".into());
        table.push_row(Row::new(
            Styles::default(),
            vec![
                GameClock(point.event.elapsed).to_string().into(),
                format!("Q{}", point.event.quarter).into(),
                point.event.home.to_string().into(),
                point.event.away.to_string().into(),
                point.event.total().to_string().into(),
                format!("{:.2}", point.velocity.per_minute()).into(),
                point.prediction.total.to_string().into(),
                point.prediction.home.to_string().into(),
                point.prediction.away.to_string().into(),
                point.error.to_string().into(),
                accuracy.into(),
            ],
        ));
    }
    table
}

pub fn tabulate_history(
    teams: &[(&str, &TeamHistoricalStats)],
    combined: Option<&CombinedHistoricalTotal>,
) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(Styles::default().with(MinWidth(10)).with(Left))];
            for _ in 0..teams.len() {
                cols.push(Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)));
            }
            if combined.is_some() {
                cols.push(Col::new(
                    Styles::default()
                        .with(Separator(true))
                        .with(MinWidth(10))
                        .with(HAlign::Right),
                ));
            }
            cols
        })
        .with_row({
            let mut header_cells = vec!["".into()];
            for (name, _) in teams {
                header_cells.push(name.to_string().into());
            }
            if combined.is_some() {
                header_cells.push("Combined".into());
            }
            Row::new(Styles::default().with(Header(true)), header_cells)
        });

    type Extract = fn(&TeamHistoricalStats) -> String;
    let rows: [(&str, Extract, Option<String>); 9] = [
        ("Games", |stats| stats.count.to_string(), None),
        ("Average", |stats| format!("{:.1}", stats.avg), combined.map(|total| format!("{:.1}", total.avg))),
        ("Median", |stats| format!("{:.1}", stats.median), None),
        ("Min", |stats| stats.min.to_string(), combined.map(|total| total.min.to_string())),
        ("Max", |stats| stats.max.to_string(), combined.map(|total| total.max.to_string())),
        ("Std dev", |stats| format!("{:.1}", stats.std_dev), combined.map(|total| format!("{:.1}", total.std_dev))),
        ("Last 5", |stats| format!("{:.1}", stats.recent_avg), None),
        ("Previous 5", |stats| format!("{:.1}", stats.previous_avg), None),
        ("Trend", |stats| format!("{:+.1}", stats.trend), None),
    ];
    for (label, extract, combined_value) in rows {
        let mut row_cells = vec![label.into()];
        for (_, stats) in teams {
            row_cells.push(extract(stats).into());
        }
        if combined.is_some() {
            row_cells.push(combined_value.unwrap_or_default().into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

pub fn tabulate_factors(factors: &[f64], weights: &[f64]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(Left)),
            Col::new(Styles::default().with(MinWidth(7)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(7)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Factor".into(), "Value".into(), "Weight".into()],
        ));
    for factor in Factor::iter() {
        let ordinal = usize::from(factor.clone());
        table.push_row(Row::new(
            Styles::default(),
            vec![
                factor.to_string().into(),
                format!("{:.3}", factors[ordinal]).into(),
                format!("{:.2}", weights[ordinal]).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_ladder(ladder: &[LadderRung]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Below".into(), "Target".into(), "Confidence".into()],
        ));
    for rung in ladder {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("-{}", rung.points_down).into(),
                format!("{}+", rung.target).into(),
                format!("{}%", rung.confidence).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_betting(analysis: &BettingAnalysis) -> Table {
    let mut table = Table::default().with_cols(vec![
        Col::new(Styles::default().with(MinWidth(20)).with(Left)),
        Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
    ]);
    let rows: [(&str, String); 6] = [
        ("Target score", format!("{}+", analysis.target)),
        ("Cost to win 1", format!("{:.2}", analysis.cost)),
        ("Confidence", format!("{}%", analysis.confidence)),
        ("Implied probability", format!("{:.1}%", analysis.implied_probability)),
        ("Expected value", format!("{:+.2}", analysis.expected_value)),
        ("Recommendation", analysis.recommendation.to_string()),
    ];
    for (label, value) in rows {
        table.push_row(Row::new(Styles::default(), vec![label.into(), value.into()]));
    }
    table
}
