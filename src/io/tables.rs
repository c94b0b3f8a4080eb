//! Loading of the electricity-price and activity-hours source tables.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthLabel;
use crate::error::TeaError;

/// Banner lines preceding the header row in an EIA retail-price download.
pub const DEFAULT_PRICE_HEADER_ROWS: usize = 4;

const MONTH_COLUMN: &str = "Month";
const PRICE_COLUMN_SUFFIX: &str = "cents per kilowatthour";
const HOURS_COLUMN: &str = "hours";

/// Customer sector of a retail price column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sector {
    /// Average over all sectors.
    AllSectors,
    /// Residential customers.
    Residential,
    /// Commercial customers.
    Commercial,
    /// Industrial customers.
    #[default]
    Industrial,
    /// Transportation customers.
    Transportation,
    /// Anything else.
    Other,
}

impl Sector {
    /// All sectors in table order.
    pub const ALL: [Sector; 6] = [
        Sector::AllSectors,
        Sector::Residential,
        Sector::Commercial,
        Sector::Industrial,
        Sector::Transportation,
        Sector::Other,
    ];

    /// Name as it appears in price-table column headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::AllSectors => "all sectors",
            Sector::Residential => "residential",
            Sector::Commercial => "commercial",
            Sector::Industrial => "industrial",
            Sector::Transportation => "transportation",
            Sector::Other => "other",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = TeaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Sector::ALL
            .into_iter()
            .find(|sector| sector.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TeaError::LookupError {
                kind: "sector".into(),
                key: s.to_string(),
                available: Sector::ALL.iter().map(|x| x.as_str().to_string()).collect(),
            })
    }
}

impl TryFrom<String> for Sector {
    type Error = TeaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sector> for String {
    fn from(value: Sector) -> Self {
        value.as_str().to_string()
    }
}

/// Column header for a region/sector pair.
pub fn price_column_name(region: &str, sector: Sector) -> String {
    format!("{region} {sector} {PRICE_COLUMN_SUFFIX}")
}

/// Monthly retail electricity prices, one column per region and sector.
///
/// Values are kept in the table's unit (cents per kWh) and in file order.
/// Cells that are empty or not numeric (EIA uses `--` and `NM`) load as
/// `None`; they only become an error if a run needs them.
#[derive(Debug, Clone)]
pub struct PriceTable {
    months: Vec<MonthLabel>,
    columns: IndexMap<String, Vec<Option<f64>>>,
}

impl PriceTable {
    /// Reads a price table, skipping `header_rows` banner lines first.
    ///
    /// # Errors
    ///
    /// Returns `Input` if the file cannot be read or parsed as CSV, and
    /// `MalformedTable` if the `Month` column is absent or a month label
    /// cannot be parsed.
    pub fn from_csv_file(path: &Path, header_rows: usize) -> Result<Self, TeaError> {
        let content = read_to_string(path)?;
        let table = Self::from_csv_str(&content, header_rows).map_err(|e| match e {
            TeaError::Input { message, .. } => TeaError::Input {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        debug!(
            "loaded price table {} ({} months, {} columns)",
            path.display(),
            table.months.len(),
            table.columns.len()
        );
        Ok(table)
    }

    /// Parses a price table from CSV text, skipping `header_rows` lines.
    ///
    /// # Errors
    ///
    /// See [`PriceTable::from_csv_file`].
    pub fn from_csv_str(content: &str, header_rows: usize) -> Result<Self, TeaError> {
        let body = skip_lines(content, header_rows);
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let headers = rdr.headers().map_err(csv_error)?.clone();
        let month_idx = headers
            .iter()
            .position(|h| h == MONTH_COLUMN)
            .ok_or_else(|| {
                TeaError::malformed("price", format!("missing \"{MONTH_COLUMN}\" column"))
            })?;

        let mut months = Vec::new();
        let mut columns: IndexMap<String, Vec<Option<f64>>> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != month_idx)
            .map(|(_, h)| (h.to_string(), Vec::new()))
            .collect();

        for (row, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let label = record.get(month_idx).unwrap_or_default();
            let month = label.parse::<MonthLabel>().map_err(|_| {
                TeaError::malformed(
                    "price",
                    format!("row {}: unrecognised month \"{label}\"", row + 1),
                )
            })?;
            months.push(month);

            let cells = record
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != month_idx)
                .map(|(_, cell)| cell);
            for (values, cell) in columns.values_mut().zip(cells.chain(std::iter::repeat(""))) {
                values.push(cell.parse::<f64>().ok().filter(|v| v.is_finite()));
            }
        }

        Ok(Self { months, columns })
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Regions with at least one price column, in header order.
    pub fn regions(&self) -> Vec<String> {
        let suffix = format!(" {PRICE_COLUMN_SUFFIX}");
        let mut regions: Vec<String> = Vec::new();
        for name in self.columns.keys() {
            let Some(stem) = name.strip_suffix(&suffix) else {
                continue;
            };
            let region = Sector::ALL
                .iter()
                .find_map(|s| stem.strip_suffix(&format!(" {s}")));
            if let Some(region) = region {
                if !regions.iter().any(|r| r == region) {
                    regions.push(region.to_string());
                }
            }
        }
        regions
    }

    /// Price history for one region and sector, in file order.
    ///
    /// Repeated months keep their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if no column matches the region/sector pair.
    pub fn series(
        &self,
        region: &str,
        sector: Sector,
    ) -> Result<Vec<(MonthLabel, Option<f64>)>, TeaError> {
        let column = price_column_name(region, sector);
        let values = self.columns.get(&column).ok_or_else(|| {
            let regions = self.regions();
            if regions.iter().any(|r| r == region) {
                TeaError::LookupError {
                    kind: "sector".into(),
                    key: format!("{sector} (region {region})"),
                    available: Vec::new(),
                }
            } else {
                TeaError::LookupError {
                    kind: "region".into(),
                    key: region.to_string(),
                    available: regions,
                }
            }
        })?;

        let mut seen = Vec::with_capacity(self.months.len());
        let mut out = Vec::with_capacity(self.months.len());
        for (month, value) in self.months.iter().zip(values) {
            if seen.contains(month) {
                continue;
            }
            seen.push(*month);
            out.push((*month, *value));
        }
        Ok(out)
    }
}

/// Activity fraction per day or per month, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityTable {
    hours: Vec<f64>,
}

impl ActivityTable {
    /// Builds a table from in-memory values, checking each lies in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a value outside `[0, 1]`.
    pub fn new(hours: Vec<f64>) -> Result<Self, TeaError> {
        if let Some((i, v)) = hours
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(TeaError::invalid(
                format!("activity.hours[{i}]"),
                format!("must be in [0, 1], got {v}"),
            ));
        }
        Ok(Self { hours })
    }

    /// Reads the `hours` column of a CSV file.
    ///
    /// # Errors
    ///
    /// Returns `Input` for unreadable files, `MalformedTable` for a missing
    /// column or non-numeric cell, and `InvalidParameter` for values outside
    /// `[0, 1]`.
    pub fn from_csv_file(path: &Path) -> Result<Self, TeaError> {
        let content = read_to_string(path)?;
        let table = Self::from_csv_str(&content).map_err(|e| match e {
            TeaError::Input { message, .. } => TeaError::Input {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        debug!("loaded activity table {} ({} rows)", path.display(), table.len());
        Ok(table)
    }

    /// Parses the `hours` column from CSV text.
    ///
    /// # Errors
    ///
    /// See [`ActivityTable::from_csv_file`].
    pub fn from_csv_str(content: &str) -> Result<Self, TeaError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(csv_error)?.clone();
        let idx = headers
            .iter()
            .position(|h| h == HOURS_COLUMN)
            .ok_or_else(|| {
                TeaError::malformed("activity", format!("missing \"{HOURS_COLUMN}\" column"))
            })?;

        let mut hours = Vec::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let cell = record.get(idx).unwrap_or_default();
            let value = cell.parse::<f64>().map_err(|_| {
                TeaError::malformed(
                    "activity",
                    format!("row {}: \"{cell}\" is not a number", row + 1),
                )
            })?;
            hours.push(value);
        }
        Self::new(hours)
    }

    /// Activity values in file order.
    pub fn hours(&self) -> &[f64] {
        &self.hours
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.hours.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

fn read_to_string(path: &Path) -> Result<String, TeaError> {
    fs::read_to_string(path).map_err(|e| TeaError::Input {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn csv_error(e: csv::Error) -> TeaError {
    TeaError::Input {
        path: "<csv>".into(),
        message: e.to_string(),
    }
}

fn skip_lines(content: &str, n: usize) -> &str {
    let mut rest = content;
    for _ in 0..n {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}
