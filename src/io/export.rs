//! CSV export for projected cost series and chart views.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::sim::TeaRun;
use crate::sim::aggregate::{ChartData, cumulative};

/// Column header for the long-format per-case export.
const HEADER: &str = "case,step,time_years,month,price_per_kwh,activity,capital,it_energy,\
                      cooling_energy,maintenance,total,consumption,cumulative_total";

/// File name used when no export path is given, e.g. `tea_for_Texas.csv`.
///
/// Characters that are awkward in file names become `_`.
pub fn default_export_path(region: &str) -> PathBuf {
    let safe: String = region
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    PathBuf::from(format!("tea_for_{safe}.csv"))
}

/// Exports a run to a CSV file at the given path.
///
/// Writes a header row followed by one row per case and step, cases in run
/// order. Produces identical bytes for identical runs.
///
/// # Arguments
///
/// * `run` - Completed TEA run
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(run: &TeaRun, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(run, buf)
}

/// Writes a run as long-format CSV to any writer.
///
/// # Arguments
///
/// * `run` - Completed TEA run
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(run: &TeaRun, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER.split(',').map(str::trim))?;

    let steps_per_year = run.config.granularity.steps_per_year() as f64;
    for s in &run.series {
        let running_total = cumulative(&s.total);
        for i in 0..s.len() {
            wtr.write_record(&[
                s.name.clone(),
                i.to_string(),
                format!("{:.6}", i as f64 / steps_per_year),
                run.aligned.months[i].to_string(),
                format!("{:.6}", run.aligned.price[i]),
                format!("{:.6}", run.aligned.activity[i]),
                format!("{:.4}", s.capital[i]),
                format!("{:.4}", s.it_energy[i]),
                format!("{:.4}", s.cooling_energy[i]),
                format!("{:.4}", s.maintenance[i]),
                format!("{:.4}", s.total[i]),
                format!("{:.4}", s.consumption[i]),
                format!("{:.4}", running_total[i]),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Exports one chart view to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_chart_csv(chart: &ChartData, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_chart_csv(chart, io::BufWriter::new(file))
}

/// Writes a chart view in wide format: one row per step, one column per
/// curve.
///
/// Columns are `time_years`, `price`, the optional present-value price,
/// `total: <case>` per case, then the view's own curves. Stack layers are
/// named `<case>: <layer>`.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_chart_csv(chart: &ChartData, writer: impl Write) -> io::Result<()> {
    let mut columns: Vec<(String, &[f64])> = vec![("price".to_string(), chart.price.as_slice())];
    if let Some(pv) = &chart.price_present_value {
        columns.push(("price_present_value".to_string(), pv.as_slice()));
    }
    for t in &chart.totals {
        columns.push((format!("total: {}", t.label), t.values.as_slice()));
    }
    for s in &chart.secondary {
        columns.push((s.label.clone(), s.values.as_slice()));
    }
    for stack in &chart.stacks {
        for layer in &stack.layers {
            columns.push((format!("{}: {}", stack.case, layer.label), layer.values.as_slice()));
        }
    }

    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(
        std::iter::once("time_years").chain(columns.iter().map(|(name, _)| name.as_str())),
    )?;
    for (i, t) in chart.time_years.iter().enumerate() {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(format!("{t:.6}"));
        row.extend(columns.iter().map(|(_, values)| format!("{:.4}", values[i])));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{flat_run, two_case_run};
    use crate::sim::aggregate::SecondaryView;
    use crate::sim::types::DiscountMode;

    fn csv_string(run: &TeaRun) -> String {
        let mut buf = Vec::new();
        write_csv(run, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_matches_schema() {
        let output = csv_string(&flat_run());
        let first_line = output.lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "case,step,time_years,month,price_per_kwh,activity,capital,it_energy,\
             cooling_energy,maintenance,total,consumption,cumulative_total"
        );
    }

    #[test]
    fn row_count_is_cases_times_steps() {
        let output = csv_string(&two_case_run());
        // 1 header + 2 cases x 36 months
        assert_eq!(output.lines().count(), 1 + 2 * 36);
    }

    #[test]
    fn deterministic_output() {
        let run = two_case_run();
        assert_eq!(csv_string(&run), csv_string(&run));
    }

    #[test]
    fn rows_parse_and_cumulate() {
        let run = flat_run();
        let output = csv_string(&run);
        let mut rdr = csv::ReaderBuilder::new().from_reader(output.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.len(), 13);

        let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 36);
        assert_eq!(&rows[0][0], "Only");
        assert_eq!(&rows[0][3], "Jan 2020");
        assert_eq!(&rows[12][2], "1.000000");
        let last_total: f64 = rows[35][12].parse().unwrap();
        let expected: f64 = run.series[0].total.iter().sum();
        assert!((last_total - expected).abs() < 1e-3);
    }

    #[test]
    fn default_path_is_named_after_region() {
        assert_eq!(default_export_path("Texas"), PathBuf::from("tea_for_Texas.csv"));
        assert_eq!(
            default_export_path("New York"),
            PathBuf::from("tea_for_New_York.csv")
        );
    }

    #[test]
    fn chart_csv_has_one_column_per_curve() {
        let run = two_case_run();
        let chart = ChartData::build(&run, SecondaryView::CoolingCosts);
        let mut buf = Vec::new();
        write_chart_csv(&chart, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let header = output.lines().next().unwrap();
        assert_eq!(
            header,
            "time_years,price,total: Evaporative,total: Classic,\
             Evaporative - Cooling,Classic - Cooling"
        );
        assert_eq!(output.lines().count(), 37);
    }

    #[test]
    fn chart_csv_includes_present_value_and_stack_layers() {
        let mut run = flat_run();
        run.config.discounting = DiscountMode::Present;
        run.config.interest_rate_pct = 7.0;
        let chart = ChartData::build(&run, SecondaryView::StackplotWithoutIt);
        let mut buf = Vec::new();
        write_chart_csv(&chart, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let header = output.lines().next().unwrap();
        assert!(header.contains("price_present_value"));
        assert!(header.contains("Only: Cooling"));
        assert!(!header.contains("Only: IT"));
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let run = flat_run();
        export_csv(&run, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, csv_string(&run));
    }
}
