use assert_float_eq::*;

use super::*;
use crate::predict::Prediction;
use crate::timeline::ScoreEvent;
use crate::velocity::Velocity;

const EPSILON: f64 = 1e-9;

fn point(elapsed: u32, home: u32, away: u32, predicted: u32, error: u32) -> GamePoint {
    GamePoint {
        event: ScoreEvent::new(elapsed, home, away),
        velocity: Velocity::default(),
        prediction: Prediction {
            total: predicted,
            home: predicted / 2,
            away: predicted / 2,
        },
        error,
    }
}

/// Five points in the first quarter; the last is a 200-point total, against which the errors are
/// measured.
fn five_points() -> Vec<GamePoint> {
    vec![
        point(120, 10, 8, 230, 30),
        point(240, 20, 18, 220, 20),
        point(360, 30, 28, 210, 10),
        point(480, 40, 38, 200, 0),
        point(600, 100, 100, 240, 40),
    ]
}

/// Base confidence at the last of [`five_points`], as a fraction.
fn five_points_base() -> f64 {
    0.20 * (5.0 / 30.0)
        + 0.25 * (1.0 - f64::sqrt(200.0) / 200.0)
        + 0.20 * 0.7
        + 0.15 * (1.0 - 2280.0 / 2880.0 * 0.3)
        + 0.20 * 0.8
        + 0.12
        + 0.08
}

#[test]
fn factor_ordinals() {
    assert_eq!(7, Factor::COUNT);
    assert_eq!(0, usize::from(Factor::Data));
    assert_eq!(5, usize::from(Factor::Betting));
    assert_eq!(6, usize::from(Factor::Historical));
}

#[test]
fn error_spread() {
    let spread = ErrorSpread::of(&five_points());
    assert_eq!(20.0, spread.mean);
    assert_float_absolute_eq!(f64::sqrt(200.0), spread.std_dev, EPSILON);
    assert_eq!(ErrorSpread::default(), ErrorSpread::of(&[]));
}

#[test]
fn spread_scale_fallbacks() {
    let spread = ErrorSpread {
        mean: 8.0,
        std_dev: 0.0,
    };
    assert_eq!(4.0, spread.scale());
    assert_eq!(FALLBACK_SPREAD, ErrorSpread::default().scale());
}

#[test]
fn factors_at_last_point() {
    let points = five_points();
    let config = ConfidenceConfig::default();
    let confidence = Confidence::new(&points, None, None, &config);
    let factors = confidence.factors(4).unwrap();
    crate::testing::assert_slice_f64_relative(
        &[
            5.0 / 30.0,
            1.0 - f64::sqrt(200.0) / 200.0,
            0.7,
            1.0 - 2280.0 / 2880.0 * 0.3,
            0.8,
            1.0,
            1.0,
        ],
        &factors,
        EPSILON,
    );
    assert_eq!(None, confidence.factors(5));
}

#[test]
fn base_confidence() {
    let points = five_points();
    let config = ConfidenceConfig::default();
    let confidence = Confidence::new(&points, None, None, &config);
    assert_float_absolute_eq!(five_points_base() * 100.0, confidence.base(4).unwrap(), EPSILON);
}

#[test]
fn short_series_lifts_from_zero_base() {
    let points = &five_points()[..4];
    let config = ConfidenceConfig::default();
    let confidence = Confidence::new(points, None, None, &config);
    assert_eq!(None, confidence.factors(3));
    assert_eq!(None, confidence.base(3));

    let scale = f64::sqrt(125.0);
    assert_float_absolute_eq!(scale, confidence.spread().std_dev, EPSILON);
    assert_eq!(0.0, confidence.at_threshold(3, 200.0));
    assert_eq!(0.0, confidence.at_threshold(3, 210.0));
    assert_float_absolute_eq!(5.0 / scale * 0.3 * 100.0, confidence.at_threshold(3, 195.0), EPSILON);
    assert_float_absolute_eq!(
        (0.3 + (15.0 / scale - 1.0) * 0.4) * 100.0,
        confidence.at_threshold(3, 185.0),
        EPSILON
    );
    assert_float_absolute_eq!(90.0, confidence.at_threshold(3, 150.0), EPSILON);
    assert_eq!(0.0, confidence.at_threshold(4, 150.0));

    let slip = BettingSlip {
        target: 150.0,
        cost: 0.5,
    };
    let analysis = confidence.analyse_bet(3, &slip).unwrap().unwrap();
    assert_eq!(90, analysis.confidence);
    assert_eq!(0.4, analysis.expected_value);
    assert_eq!(Recommendation::Favorable, analysis.recommendation);
    assert_eq!(Ok(None), confidence.analyse_bet(4, &slip));
}

#[test]
fn base_confidence_saturates() {
    let points: Vec<_> = (1..=30)
        .map(|index| point(index * 96, index * 4, index * 3, 210, 0))
        .collect();
    let config = ConfidenceConfig::default();
    let confidence = Confidence::new(&points, None, None, &config);
    assert_eq!(Some(95.0), confidence.base(29));
}

#[test]
fn base_confidence_floor() {
    let points = five_points();
    let config = ConfidenceConfig {
        weights: [0.0; Factor::COUNT],
        ..ConfidenceConfig::default()
    };
    let confidence = Confidence::new(&points, None, None, &config);
    assert_eq!(Some(30.0), confidence.base(4));
}

#[test]
fn threshold_bands() {
    let points = five_points();
    let config = ConfidenceConfig::default();
    let confidence = Confidence::new(&points, None, None, &config);
    let base = five_points_base();
    let spread = f64::sqrt(200.0);

    // above the prediction
    assert_float_absolute_eq!(base * 50.0, confidence.at_threshold(4, 260.0), EPSILON);
    assert_float_absolute_eq!(base * 50.0, confidence.at_threshold(4, 240.0), EPSILON);

    // within one spread
    let z = 10.0 / spread;
    let expected = (base + (1.0 - base) * z * 0.3) * 100.0;
    assert_float_absolute_eq!(expected, confidence.at_threshold(4, 230.0), EPSILON);

    // between one and two spreads
    let z = 20.0 / spread;
    let expected = (base + (1.0 - base) * (0.3 + (z - 1.0) * 0.4)) * 100.0;
    assert_float_absolute_eq!(expected, confidence.at_threshold(4, 220.0), EPSILON);

    // beyond two spreads
    let expected = (base + (1.0 - base) * 0.9) * 100.0;
    assert_float_absolute_eq!(expected, confidence.at_threshold(4, 200.0), EPSILON);
}

#[test]
fn threshold_capped() {
    let points: Vec<_> = (1..=30)
        .map(|index| point(index * 96, index * 4, index * 3, 210, 0))
        .collect();
    let config = ConfidenceConfig::default();
    let confidence = Confidence::new(&points, None, None, &config);
    assert_eq!(99.0, confidence.at_threshold(29, 100.0));
}

#[test]
fn ladder() {
    let points = five_points();
    let config = ConfidenceConfig::default();
    let confidence = Confidence::new(&points, None, None, &config);
    let ladder = confidence.ladder(4);
    assert_eq!(10, ladder.len());
    assert_eq!(
        LadderRung {
            points_down: 2,
            target: 238,
            confidence: 89
        },
        ladder[0]
    );
    assert_eq!(
        LadderRung {
            points_down: 10,
            target: 230,
            confidence: 91
        },
        ladder[4]
    );
    assert_eq!(
        LadderRung {
            points_down: 20,
            target: 220,
            confidence: 94
        },
        ladder[9]
    );
    assert!(ladder.windows(2).all(|pair| pair[0].confidence <= pair[1].confidence));
    assert!(confidence.ladder(10).is_empty());
}

#[test]
fn single_quote_factor() {
    let quotes = BettingQuotes::single(220.0, 80.0);
    assert_float_absolute_eq!(0.7 + 0.8 * 0.3 * 0.8, quotes.factor(230.0), EPSILON);
    assert_float_absolute_eq!(0.7 + 0.8 * 0.3 * 0.8, quotes.factor(210.0), EPSILON);
    assert_float_absolute_eq!(0.7, quotes.factor(300.0), EPSILON);
}

#[test]
fn two_quote_factor() {
    let quotes = BettingQuotes::single(220.0, 80.0).with_upper(240.0, 40.0);
    assert_float_absolute_eq!(0.7 + 0.6 * 0.3, quotes.factor(230.0), EPSILON);
    assert_float_absolute_eq!(0.7 + 0.8 * 0.3, quotes.factor(220.0), EPSILON);
    assert_float_absolute_eq!(0.7 + 0.4 * 0.3, quotes.factor(240.0), EPSILON);
    assert_float_absolute_eq!(
        0.6 + 0.8 * 0.4 * (1.0 - 20.0 / 30.0 * 0.5),
        quotes.factor(200.0),
        EPSILON
    );
    assert_float_absolute_eq!(0.6 + 0.8 * 0.4 * 0.5, quotes.factor(100.0), EPSILON);
    assert_float_absolute_eq!(0.5 + 0.4 * 0.5 * 0.5, quotes.factor(255.0), EPSILON);
    assert_float_absolute_eq!(0.5, quotes.factor(300.0), EPSILON);
}

#[test]
fn invalid_quotes() {
    assert_eq!(Ok(()), BettingQuotes::single(220.0, 0.0).with_upper(240.0, 100.0).validate());
    assert_eq!(
        Err(BettingError::InvalidQuoteConfidence(120.0)),
        BettingQuotes::single(220.0, 120.0).validate()
    );
    assert_eq!(
        Err(BettingError::InvalidQuoteConfidence(-5.0)),
        BettingQuotes::single(220.0, 80.0).with_upper(240.0, -5.0).validate()
    );
    assert_eq!(Err(BettingError::InvalidLine(-1.0)), BettingQuotes::single(-1.0, 80.0).validate());
    assert!(BettingQuotes::single(f64::INFINITY, 80.0).validate().is_err());
    assert!(BettingQuotes::single(220.0, f64::NAN).validate().is_err());
}

#[test]
fn coincident_quotes_are_neutral() {
    let quotes = BettingQuotes::single(220.0, 80.0).with_upper(220.0, 40.0);
    assert_eq!(1.0, quotes.factor(220.0));
}

#[test]
fn quotes_feed_base_confidence() {
    let points = five_points();
    let config = ConfidenceConfig::default();
    let quotes = BettingQuotes::single(240.0, 50.0);
    let confidence = Confidence::new(&points, Some(&quotes), None, &config);
    let factors = confidence.factors(4).unwrap();
    assert_float_absolute_eq!(0.85, factors[usize::from(Factor::Betting)], EPSILON);
    let expected = (five_points_base() - 0.12 * 0.15) * 100.0;
    assert_float_absolute_eq!(expected, confidence.base(4).unwrap(), EPSILON);
}

#[test]
fn historical_alignment() {
    let historical = CombinedHistoricalTotal {
        avg: 220.0,
        std_dev: 10.0,
        min: 190,
        max: 250,
    };
    assert_eq!(1.0, historical_factor(300.0, None));
    assert_eq!(1.05, historical_factor(225.0, Some(&historical)));
    assert_eq!(0.95, historical_factor(210.0, Some(&historical)));
    assert_eq!(0.85, historical_factor(245.0, Some(&historical)));

    let exact = CombinedHistoricalTotal {
        std_dev: 0.0,
        ..historical
    };
    assert_eq!(0.85, historical_factor(220.0, Some(&exact)));
}

#[test]
fn favorable_bet() {
    let slip = BettingSlip {
        target: 230.0,
        cost: 0.6,
    };
    let analysis = BettingAnalysis::evaluate(&slip, 70.0);
    assert_eq!(
        BettingAnalysis {
            target: 230.0,
            cost: 0.6,
            confidence: 70,
            implied_probability: 60.0,
            expected_value: 0.1,
            recommendation: Recommendation::Favorable,
        },
        analysis
    );
}

#[test]
fn unfavorable_and_neutral_bets() {
    let analysis = BettingAnalysis::evaluate(&BettingSlip { target: 200.0, cost: 0.9 }, 70.4);
    assert_eq!(Recommendation::Unfavorable, analysis.recommendation);
    assert_eq!(70, analysis.confidence);
    assert_eq!(-0.2, analysis.expected_value);

    let analysis = BettingAnalysis::evaluate(&BettingSlip { target: 200.0, cost: 0.5 }, 50.0);
    assert_eq!(Recommendation::Neutral, analysis.recommendation);
    assert_eq!(0.0, analysis.expected_value);
    assert_eq!("neutral", analysis.recommendation.to_string());
}

#[test]
fn invalid_slips() {
    let slip = |target, cost| BettingSlip { target, cost };
    assert_eq!(Err(BettingError::InvalidCost(0.0)), slip(200.0, 0.0).validate());
    assert_eq!(Err(BettingError::InvalidCost(1.0)), slip(200.0, 1.0).validate());
    assert_eq!(Err(BettingError::InvalidCost(-0.5)), slip(200.0, -0.5).validate());
    assert_eq!(Err(BettingError::InvalidTarget(-1.0)), slip(-1.0, 0.5).validate());
    assert!(slip(f64::NAN, 0.5).validate().is_err());
    assert!(slip(200.0, f64::NAN).validate().is_err());
    assert_eq!(Ok(()), slip(200.0, 0.95).validate());
}

#[test]
fn analyse_bet_at_point() {
    let points = five_points();
    let config = ConfidenceConfig::default();
    let confidence = Confidence::new(&points, None, None, &config);
    let slip = BettingSlip {
        target: 200.0,
        cost: 0.6,
    };
    let analysis = confidence.analyse_bet(4, &slip).unwrap().unwrap();
    assert_eq!(99, analysis.confidence);
    assert_eq!(Recommendation::Favorable, analysis.recommendation);
    assert_eq!(0.39, analysis.expected_value);

    let slip = BettingSlip { target: 200.0, cost: 1.5 };
    assert_eq!(Err(BettingError::InvalidCost(1.5)), confidence.analyse_bet(4, &slip));
}
