//! Design rule table loading.
//!
//! Rules are read from a CSV table with a header row. Columns are found by
//! header name, so column order does not matter and either the English or
//! the Indonesian header can be used. The whole table is parsed before
//! anything is published: one bad row fails the load.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bedah_gang_design_models::{DesignRule, Surface};
use bedah_gang_snapshot::Snapshot;
use csv::StringRecord;

use crate::DesignError;

/// The decision matrix shipped with the crate.
const EMBEDDED_RULES: &str = include_str!("../rules/design_rules.csv");

const WIDTH: (&str, &[&str]) = ("width", &["width", "lebar"]);
const SURFACE: (&str, &[&str]) = ("surface", &["surface", "permukaan"]);
const DRAINAGE: (&str, &[&str]) = ("drainage", &["drainage", "drainase"]);
const HIGH_FLOOD_RISK: (&str, &[&str]) = (
    "high_flood_risk",
    &["high_flood_risk", "risiko_tinggi", "risk"],
);
const ACTIVITY: (&str, &[&str]) = ("activity", &["activity", "activity_flag", "aktivitas"]);
const DESIGN_MODULE: (&str, &[&str]) = ("design_module", &["design_module", "module", "modul"]);

/// Where a [`RuleTable`] reads its rows from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// The matrix embedded at compile time.
    Embedded,
    /// A CSV file on disk.
    File(PathBuf),
}

impl RuleSource {
    /// Reads and parses every rule from this source.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError`] if the source cannot be read or any row is
    /// malformed.
    pub fn read(&self) -> Result<RuleSet, DesignError> {
        match self {
            Self::Embedded => parse_rules(EMBEDDED_RULES.as_bytes()),
            Self::File(path) => {
                let file = std::fs::File::open(path)?;
                parse_rules(file)
            }
        }
    }
}

impl std::fmt::Display for RuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedded => f.write_str("embedded rule matrix"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A non-empty, ordered collection of design rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<DesignRule>,
}

impl RuleSet {
    /// Wraps `rules`, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::DataFormat`] if `rules` is empty.
    pub fn new(rules: Vec<DesignRule>) -> Result<Self, DesignError> {
        if rules.is_empty() {
            return Err(format_error(0, "", "rule table has no rows".to_string()));
        }
        Ok(Self { rules })
    }

    /// The first rule in table order.
    #[must_use]
    pub fn first(&self) -> &DesignRule {
        &self.rules[0]
    }

    /// The rules as a slice, in table order.
    #[must_use]
    pub fn as_slice(&self) -> &[DesignRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always `false`; a rule set holds at least one rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates the rules in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, DesignRule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a DesignRule;
    type IntoIter = std::slice::Iter<'a, DesignRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The loaded design rules, in table order.
///
/// Rows are read once on [`RuleTable::load`] and served from memory until
/// [`RuleTable::reload`] replaces them wholesale.
#[derive(Debug)]
pub struct RuleTable {
    source: RuleSource,
    rules: Snapshot<RuleSet>,
}

impl RuleTable {
    /// Loads the rules from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError`] if the source cannot be read, any row is
    /// malformed, or the table has no rows.
    pub fn load(source: RuleSource) -> Result<Self, DesignError> {
        let rules = source.read()?;
        log::info!("Loaded {} design rules from {source}", rules.len());
        Ok(Self {
            source,
            rules: Snapshot::new(rules),
        })
    }

    /// Loads the embedded decision matrix.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError`] if the embedded matrix fails to parse.
    pub fn embedded() -> Result<Self, DesignError> {
        Self::load(RuleSource::Embedded)
    }

    /// Loads rules from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError`] if the file cannot be loaded.
    pub fn from_path(path: &Path) -> Result<Self, DesignError> {
        Self::load(RuleSource::File(path.to_path_buf()))
    }

    /// Where the rules are loaded from.
    #[must_use]
    pub const fn source(&self) -> &RuleSource {
        &self.source
    }

    /// The current rules, in table order.
    #[must_use]
    pub fn rules(&self) -> Arc<RuleSet> {
        self.rules.load()
    }

    /// Re-reads the source and replaces the rules.
    ///
    /// Returns the number of rules now loaded.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError`] if the source cannot be loaded. The previous
    /// rules are kept in that case.
    pub fn reload(&self) -> Result<usize, DesignError> {
        match self.rules.try_refresh(|| self.source.read()) {
            Ok(rules) => {
                log::info!("Reloaded {} design rules from {}", rules.len(), self.source);
                Ok(rules.len())
            }
            Err(e) => {
                log::warn!(
                    "Failed to reload design rules from {}, keeping previous table: {e}",
                    self.source
                );
                Err(e)
            }
        }
    }
}

/// Parses design rules from CSV.
///
/// # Errors
///
/// Returns [`DesignError::DataFormat`] if a required column is missing, a
/// cell is empty or fails to parse, or there are no data rows, and
/// [`DesignError::Csv`] if the CSV itself cannot be read.
pub fn parse_rules<R: Read>(reader: R) -> Result<RuleSet, DesignError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::locate(csv_reader.headers()?)?;

    let mut rules = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rules.push(columns.parse_row(row, &record)?);
    }

    RuleSet::new(rules)
}

/// Column positions of each required field.
struct Columns {
    width: usize,
    surface: usize,
    drainage: usize,
    high_flood_risk: usize,
    activity: usize,
    design_module: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, DesignError> {
        Ok(Self {
            width: find_column(headers, WIDTH)?,
            surface: find_column(headers, SURFACE)?,
            drainage: find_column(headers, DRAINAGE)?,
            high_flood_risk: find_column(headers, HIGH_FLOOD_RISK)?,
            activity: find_column(headers, ACTIVITY)?,
            design_module: find_column(headers, DESIGN_MODULE)?,
        })
    }

    fn parse_row(&self, row: usize, record: &StringRecord) -> Result<DesignRule, DesignError> {
        let width_raw = cell(row, record, self.width, WIDTH.0)?;
        let width = width_raw
            .parse::<f64>()
            .ok()
            .filter(|w| w.is_finite() && *w > 0.0)
            .ok_or_else(|| {
                format_error(
                    row,
                    WIDTH.0,
                    format!("'{width_raw}' is not a positive number"),
                )
            })?;

        let surface_raw = cell(row, record, self.surface, SURFACE.0)?;
        let surface = surface_raw.parse::<Surface>().map_err(|_| {
            format_error(
                row,
                SURFACE.0,
                format!("'{surface_raw}' is not a known surface"),
            )
        })?;

        let drainage = bool_cell(row, record, self.drainage, DRAINAGE.0)?;
        let high_flood_risk = bool_cell(row, record, self.high_flood_risk, HIGH_FLOOD_RISK.0)?;
        let activity_flag = bool_cell(row, record, self.activity, ACTIVITY.0)?;

        let module_raw = cell(row, record, self.design_module, DESIGN_MODULE.0)?;
        let design_module = module_raw
            .parse::<u32>()
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| {
                format_error(
                    row,
                    DESIGN_MODULE.0,
                    format!("'{module_raw}' is not a positive integer"),
                )
            })?;

        Ok(DesignRule {
            width,
            surface,
            drainage,
            high_flood_risk,
            activity_flag,
            design_module,
        })
    }
}

fn find_column(
    headers: &StringRecord,
    (field, aliases): (&str, &[&str]),
) -> Result<usize, DesignError> {
    headers
        .iter()
        .position(|h| {
            let h = h.trim().to_lowercase();
            aliases.contains(&h.as_str())
        })
        .ok_or_else(|| format_error(0, field, "missing column".to_string()))
}

fn cell<'a>(
    row: usize,
    record: &'a StringRecord,
    column: usize,
    field: &str,
) -> Result<&'a str, DesignError> {
    record
        .get(column)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format_error(row, field, "missing value".to_string()))
}

fn bool_cell(
    row: usize,
    record: &StringRecord,
    column: usize,
    field: &str,
) -> Result<bool, DesignError> {
    let raw = cell(row, record, column, field)?;
    parse_bool(raw)
        .ok_or_else(|| format_error(row, field, format!("'{raw}' is not a boolean")))
}

/// Parses the boolean spellings used in survey tables.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "ya" | "ada" | "high" | "tinggi" => Some(true),
        "false" | "0" | "no" | "n" | "tidak" | "tidak ada" | "low" | "rendah" => Some(false),
        _ => None,
    }
}

fn format_error(row: usize, field: &str, message: String) -> DesignError {
    DesignError::DataFormat {
        row,
        field: field.to_string(),
        message,
    }
}
