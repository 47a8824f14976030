//! CSV report writing.
//!
//! One win-rate table per (color, scope) pair, eight in total, plus the
//! optional eight move-probability tables. Rows arrive pre-sorted by move
//! key from the aggregator. Move keys contain commas, so the Move field is
//! quoted RFC-4180 style, which is what a stock CSV reader expects.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use amazons_core::Side;
use amazons_stats::{ProbabilityRow, Scope, StatsAggregator, WinRateRow};

use crate::error::WorkerError;

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn write_win_rate_csv(path: &Path, rows: &[WinRateRow]) -> Result<(), WorkerError> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    writeln!(out, "Move,Count,TotalGames,WinRate")?;
    for row in rows {
        writeln!(
            out,
            "{},{},{},{}",
            csv_field(&row.key),
            row.count,
            row.total_games,
            row.win_rate
        )?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_probability_csv(path: &Path, rows: &[ProbabilityRow]) -> Result<(), WorkerError> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    writeln!(out, "Move,Probability")?;
    for row in rows {
        writeln!(out, "{},{}", csv_field(&row.key), row.probability)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the full report set into the output directory and return how many
/// files were produced.
pub fn write_reports(
    out_dir: &Path,
    stats: &StatsAggregator,
    with_probabilities: bool,
) -> Result<usize, WorkerError> {
    fs::create_dir_all(out_dir)?;
    let mut written = 0usize;

    for color in [Side::Black, Side::White] {
        for scope in Scope::ALL {
            let rows = stats.win_rates(color, scope);
            let path = out_dir.join(format!(
                "{}_chess_win_rate{}.csv",
                color.name(),
                scope.suffix()
            ));
            write_win_rate_csv(&path, &rows)?;
            info!(file = %path.display(), rows = rows.len(), "Wrote win-rate report");
            written += 1;

            if with_probabilities {
                let rows = stats.move_probabilities(color, scope);
                let path = out_dir.join(format!(
                    "{}_chess_moves{}.csv",
                    color.name(),
                    scope.suffix()
                ));
                write_probability_csv(&path, &rows)?;
                info!(file = %path.display(), rows = rows.len(), "Wrote probability report");
                written += 1;
            }
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quotes_commas() {
        assert_eq!(csv_field("0,2,1,3,1,4"), "\"0,2,1,3,1,4\"");
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_win_rate_csv_shape() {
        let rows = vec![WinRateRow {
            key: "0,2,1,3,1,4".to_string(),
            count: 3,
            total_games: 5,
            win_rate: 0.6,
        }];
        let path = std::env::temp_dir().join(format!(
            "amazons-report-test-{}.csv",
            std::process::id()
        ));
        write_win_rate_csv(&path, &rows).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(
            written,
            "Move,Count,TotalGames,WinRate\n\"0,2,1,3,1,4\",3,5,0.6\n"
        );
    }
}
