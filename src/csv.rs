//! CSV export of a derived series.

use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::series::GamePoint;
use crate::timeline::GameClock;

pub const EXPORT_HEADER: [&str; 7] = [
    "time",
    "home",
    "away",
    "total",
    "predictedTotal",
    "velocity",
    "error",
];

pub struct CsvWriter<W: Write> {
    writer: W,
}
impl CsvWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}
impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn append<R>(&mut self, record: R) -> Result<(), io::Error>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut first = true;
        for datum in record.into_iter() {
            if first {
                first = false;
            } else {
                self.writer.write_all(b",")?;
            }
            self.writer.write_all(datum.as_ref().as_bytes())?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// One export row: the clock as `M:SS` and the velocity in points per minute to two decimals.
pub fn export_record(point: &GamePoint) -> [String; 7] {
    [
        GameClock(point.event.elapsed).to_string(),
        point.event.home.to_string(),
        point.event.away.to_string(),
        point.event.total().to_string(),
        point.prediction.total.to_string(),
        format!("{:.2}", point.velocity.per_minute()),
        point.error.to_string(),
    ]
}

/// Writes the header followed by one row per point.
pub fn export<W: Write>(writer: &mut CsvWriter<W>, points: &[GamePoint]) -> Result<(), io::Error> {
    writer.append(EXPORT_HEADER)?;
    for point in points {
        writer.append(export_record(point))?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::Prediction;
    use crate::timeline::ScoreEvent;
    use crate::velocity::Velocity;

    #[test]
    fn export_rows() {
        let points = vec![
            GamePoint {
                event: ScoreEvent::new(0, 0, 0),
                velocity: Velocity::default(),
                prediction: Prediction {
                    total: 150,
                    home: 0,
                    away: 0,
                },
                error: 92,
            },
            GamePoint {
                event: ScoreEvent::new(700, 30, 28),
                velocity: Velocity {
                    total: 58.0 / 700.0,
                    home: 30.0 / 700.0,
                    away: 28.0 / 700.0,
                },
                prediction: Prediction {
                    total: 239,
                    home: 123,
                    away: 115,
                },
                error: 181,
            },
        ];
        let mut writer = CsvWriter::new(vec![]);
        export(&mut writer, &points).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            "time,home,away,total,predictedTotal,velocity,error\n\
             0:00,0,0,0,150,0.00,92\n\
             11:40,30,28,58,239,4.97,181\n",
            text
        );
    }

    #[test]
    fn export_reimports_as_csv_file() {
        let series = crate::series::compute_series(
            &crate::series::RawInputs::new(crate::series::TimelineInput::Events(
                crate::sample::events(),
            )),
            &crate::config::Config::default(),
        )
        .unwrap();
        let mut writer = CsvWriter::new(vec![]);
        export(&mut writer, &series.points).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let events = crate::parse::parse_csv_file(&text).unwrap();
        assert_eq!(crate::sample::events(), events);
    }

    #[test]
    fn append_joins_with_commas() {
        let mut writer = CsvWriter::new(vec![]);
        writer.append(["a", "b"]).unwrap();
        writer.append(Vec::<String>::new()).unwrap();
        assert_eq!(b"a,b\n\n".to_vec(), writer.into_inner());
    }
}
