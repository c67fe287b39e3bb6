use std::fmt;

use log::warn;

use super::error::{CatalogError, Result};
use crate::config::CoercionPolicy;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded source table
// ---------------------------------------------------------------------------

/// A loosely-typed cell as it comes out of a CSV, JSON or Parquet source.
/// Only lives until the table is validated into typed records.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a real number. Text is trimmed and parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(_) | CellValue::Null => None,
        }
    }

    /// Interpret the cell as an integer. Integral floats (`600.0`) are
    /// accepted, since pandas widens integer columns to float after a merge.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) => integral(*v),
            CellValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            CellValue::Bool(_) | CellValue::Null => None,
        }
    }

    /// Interpret the cell as non-empty text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) if s.trim().is_empty() => None,
            CellValue::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }
}

fn integral(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// RawTable – a whole source, before validation
// ---------------------------------------------------------------------------

/// A resolved column: its name and its position in the source header.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub index: usize,
}

/// Header plus rows of cells, in source order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Human-readable origin (file path or caller-supplied label).
    pub source_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(source_name: impl Into<String>, headers: Vec<String>) -> Self {
        RawTable {
            source_name: source_name.into(),
            headers: headers.into_iter().map(normalize_header).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve every required column, failing with a schema error that names
    /// all of the missing ones at once.
    ///
    /// A source with neither a header nor rows (an empty JSON array, a
    /// zero-byte CSV) has nothing to validate and resolves trivially.
    pub fn require<const N: usize>(&self, names: [&'static str; N]) -> Result<[Column; N]> {
        let vacant = self.headers.is_empty() && self.rows.is_empty();
        let mut missing = Vec::new();
        let columns = names.map(|name| {
            match self.headers.iter().position(|h| h == name) {
                Some(index) => Column { name, index },
                None => {
                    if !vacant {
                        missing.push(name);
                    }
                    Column { name, index: 0 }
                }
            }
        });
        if !missing.is_empty() {
            return Err(CatalogError::schema(
                &self.source_name,
                format!("missing required column(s): {}", missing.join(", ")),
            ));
        }
        Ok(columns)
    }

    /// Iterate rows as typed field readers (row numbers are 1-based).
    pub fn readers(&self, policy: CoercionPolicy) -> impl Iterator<Item = FieldReader<'_>> {
        self.rows.iter().enumerate().map(move |(i, cells)| FieldReader {
            row_no: i + 1,
            cells,
            policy,
        })
    }
}

fn normalize_header(h: String) -> String {
    h.trim_start_matches('\u{feff}').trim().to_string()
}

// ---------------------------------------------------------------------------
// FieldReader – typed access to one row
// ---------------------------------------------------------------------------

static NULL_CELL: CellValue = CellValue::Null;

/// Typed view of one raw row. Identity fields are never coerced; counts and
/// coordinates follow the configured [`CoercionPolicy`].
pub struct FieldReader<'a> {
    pub row_no: usize,
    cells: &'a [CellValue],
    policy: CoercionPolicy,
}

impl<'a> FieldReader<'a> {
    fn cell(&self, col: Column) -> &'a CellValue {
        self.cells.get(col.index).unwrap_or(&NULL_CELL)
    }

    fn malformed(&self, col: Column, message: &str) -> CatalogError {
        CatalogError::malformed(self.row_no, col.name, self.cell(col).to_string(), message)
    }

    pub fn text(&self, col: Column) -> Result<String> {
        self.cell(col)
            .as_text()
            .ok_or_else(|| self.malformed(col, "expected non-empty text"))
    }

    pub fn integer(&self, col: Column) -> Result<i64> {
        self.cell(col)
            .as_i64()
            .ok_or_else(|| self.malformed(col, "expected an integer"))
    }

    /// A non-negative tally. Coerced to 0 when the policy allows it.
    pub fn count(&self, col: Column) -> Result<u64> {
        match self.cell(col).as_i64() {
            Some(n) if n >= 0 => Ok(n as u64),
            _ => match self.policy {
                CoercionPolicy::Strict => {
                    Err(self.malformed(col, "expected a non-negative integer count"))
                }
                CoercionPolicy::Coerce => {
                    warn!(
                        "row {}: coercing {} '{}' to 0",
                        self.row_no,
                        col.name,
                        self.cell(col)
                    );
                    Ok(0)
                }
            },
        }
    }

    /// A finite coordinate. Under coercion a bad value yields `None`.
    pub fn coordinate(&self, col: Column) -> Result<Option<f64>> {
        match self.cell(col).as_f64() {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => match self.policy {
                CoercionPolicy::Strict => Err(self.malformed(col, "expected a finite number")),
                CoercionPolicy::Coerce => {
                    warn!(
                        "row {}: dropping non-numeric {} '{}'",
                        self.row_no,
                        col.name,
                        self.cell(col)
                    );
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        let mut t = RawTable::new("test", headers.iter().map(|h| h.to_string()).collect());
        t.rows = rows;
        t
    }

    #[test]
    fn integral_floats_read_as_integers() {
        assert_eq!(CellValue::String("600.0".into()).as_i64(), Some(600));
        assert_eq!(CellValue::Float(12.0).as_i64(), Some(12));
        assert_eq!(CellValue::String("600.5".into()).as_i64(), None);
        assert_eq!(CellValue::Null.as_i64(), None);
    }

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(CellValue::String("  ".into()).as_text(), None);
        assert_eq!(CellValue::Integer(3).as_text().as_deref(), Some("3"));
    }

    #[test]
    fn require_reports_every_missing_column() {
        let t = table(&["a", "b"], vec![]);
        let err = t.require(["a", "c", "d"]).unwrap_err();
        match err {
            CatalogError::Schema { message, .. } => {
                assert!(message.contains("c, d"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn headers_are_trimmed_and_bom_stripped() {
        let t = table(&["\u{feff}gene_name", " x "], vec![]);
        let [g, x] = t.require(["gene_name", "x"]).unwrap();
        assert_eq!((g.index, x.index), (0, 1));
    }

    #[test]
    fn count_coercion_follows_policy() {
        let t = table(&["Count"], vec![vec![CellValue::String("n/a".into())]]);
        let [count] = t.require(["Count"]).unwrap();

        let strict = t.readers(CoercionPolicy::Strict).next().unwrap();
        assert!(matches!(
            strict.count(count),
            Err(CatalogError::MalformedRow { row: 1, .. })
        ));

        let lenient = t.readers(CoercionPolicy::Coerce).next().unwrap();
        assert_eq!(lenient.count(count).unwrap(), 0);
    }

    #[test]
    fn non_finite_coordinates_are_rejected_or_dropped() {
        let t = table(&["x"], vec![vec![CellValue::Float(f64::NAN)]]);
        let [x] = t.require(["x"]).unwrap();
        assert!(t.readers(CoercionPolicy::Strict).next().unwrap().coordinate(x).is_err());
        assert_eq!(
            t.readers(CoercionPolicy::Coerce).next().unwrap().coordinate(x).unwrap(),
            None
        );
    }
}
