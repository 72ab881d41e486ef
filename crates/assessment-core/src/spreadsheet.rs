//! Spreadsheet decoding and per-row parsing.
//!
//! Workbooks are decoded with `calamine` into [`SheetRow`]s of [`CellValue`]s.
//! [`parse_row`] turns one row into a candidate assessment. Cell types are
//! coerced leniently: bad numbers become `0.0` and bad dates become today, so
//! the only row-level faults are values that cannot be held in an integer
//! column. Anything else that is wrong with a row is caught by validation.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::error::{SpreadsheetError, ValidationError};
use crate::model::NewAssessment;

/// Number of columns read from each row.
pub const COLUMN_COUNT: usize = 6;

/// Column headers in the fixed import order.
pub const COLUMNS: [&str; COLUMN_COUNT] = [
    "studentName",
    "assessmentDate",
    "disciplineScore",
    "skillCompletionRate",
    "tasksCompleted",
    "totalTasks",
];

const TEXT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    /// A formula cell with its cached numeric result, if any.
    Formula {
        expression: String,
        cached: Option<f64>,
    },
    /// An error value such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// Coerce to text. Numbers are truncated to integers; formulas yield
    /// their expression.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format!("{}", n.trunc() as i64),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format(TEXT_DATE_FORMAT).to_string(),
            CellValue::Formula { expression, .. } => expression.clone(),
            CellValue::Empty | CellValue::Error(_) => String::new(),
        }
    }

    /// Coerce to a number, falling back to `0.0`.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse().unwrap_or(0.0),
            CellValue::Formula { cached, .. } => cached.unwrap_or(0.0),
            CellValue::Date(d) => date_to_serial(*d),
            CellValue::Empty | CellValue::Bool(_) | CellValue::Error(_) => 0.0,
        }
    }

    /// Coerce to a date, falling back to `today`.
    ///
    /// Numbers are read as Excel serial dates; text must be `YYYY-MM-DD`.
    pub fn as_date(&self, today: NaiveDate) -> NaiveDate {
        let parsed = match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Number(n) => serial_to_date(*n),
            CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), TEXT_DATE_FORMAT).ok(),
            _ => None,
        };
        parsed.unwrap_or(today)
    }

    /// The numeric payload of a plain number cell.
    fn numeric(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(n) => CellValue::Number(*n),
            Data::Int(n) => CellValue::Number(*n as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ndt) => CellValue::Date(ndt.date()),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => s
                .get(..10)
                .and_then(|d| NaiveDate::parse_from_str(d, TEXT_DATE_FORMAT).ok())
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(format!("#{e:?}")),
        }
    }
}

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    excel_epoch().checked_add_signed(Duration::days(serial.floor() as i64))
}

fn date_to_serial(date: NaiveDate) -> f64 {
    (date - excel_epoch()).num_days() as f64
}

/// One physical spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 0-based physical row index; row 0 is the header.
    pub index: u32,
    pub cells: Vec<CellValue>,
}

impl SheetRow {
    pub fn new(index: u32, cells: Vec<CellValue>) -> Self {
        Self { index, cells }
    }

    /// 1-based row number as shown by spreadsheet software.
    pub fn number(&self) -> usize {
        self.index as usize + 1
    }
}

/// Why a single row was not imported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    /// An integer column held a value that is not representable as `i32`.
    #[error("column {column} holds {value}, which is not a whole number in range")]
    NotAnInteger { column: &'static str, value: f64 },

    /// The parsed candidate failed field validation.
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),
}

fn to_int(value: f64, column: &'static str) -> Result<i32, RowError> {
    if !value.is_finite() || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(RowError::NotAnInteger { column, value });
    }
    Ok(value.trunc() as i32)
}

/// Parse one row into a candidate.
///
/// Returns `Ok(None)` for rows whose name is blank, which are spacer rows and
/// skipped silently. Missing trailing cells read as empty.
pub fn parse_row(cells: &[CellValue], today: NaiveDate) -> Result<Option<NewAssessment>, RowError> {
    let empty = CellValue::Empty;
    let cell = |i: usize| cells.get(i).unwrap_or(&empty);

    let student_name = cell(0).as_text();
    if student_name.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(NewAssessment {
        student_name: student_name.trim().to_string(),
        assessment_date: Some(cell(1).as_date(today)),
        discipline_score: to_int(cell(2).as_number(), COLUMNS[2])?,
        skill_completion_rate: cell(3).as_number(),
        tasks_completed: to_int(cell(4).as_number(), COLUMNS[4])?,
        total_tasks: to_int(cell(5).as_number(), COLUMNS[5])?,
    }))
}

/// Decode the first sheet of an `.xlsx`/`.xls` workbook.
///
/// Every physical row between the first and last used row is returned,
/// including the header row, with exactly [`COLUMN_COUNT`] cells starting at
/// column A. Formula cells carry both the expression and the cached value.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<SheetRow>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SpreadsheetError::Open(e.to_string()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SpreadsheetError::NoSheets)?;

    let values = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SpreadsheetError::Sheet {
            sheet: sheet.clone(),
            message: e.to_string(),
        })?;

    let formulas = match workbook.worksheet_formula(&sheet) {
        Ok(range) => Some(range),
        Err(e) => {
            tracing::debug!("no formulas read from sheet '{}': {}", sheet, e);
            None
        }
    };

    let Some((first, last)) = row_span(&values, formulas.as_ref()) else {
        return Ok(Vec::new());
    };

    let rows = (first..=last)
        .map(|row| {
            let cells = (0..COLUMN_COUNT as u32)
                .map(|col| cell_at(&values, formulas.as_ref(), (row, col)))
                .collect();
            SheetRow::new(row, cells)
        })
        .collect();

    Ok(rows)
}

fn row_span(values: &Range<Data>, formulas: Option<&Range<String>>) -> Option<(u32, u32)> {
    let value_span = values.start().zip(values.end()).map(|(s, e)| (s.0, e.0));
    let formula_span = formulas
        .and_then(|f| f.start().zip(f.end()))
        .map(|(s, e)| (s.0, e.0));

    match (value_span, formula_span) {
        (Some(a), Some(b)) => Some((a.0.min(b.0), a.1.max(b.1))),
        (a, b) => a.or(b),
    }
}

fn cell_at(values: &Range<Data>, formulas: Option<&Range<String>>, pos: (u32, u32)) -> CellValue {
    let value = values
        .get_value(pos)
        .map(CellValue::from)
        .unwrap_or(CellValue::Empty);

    match formulas
        .and_then(|f| f.get_value(pos))
        .filter(|expr| !expr.is_empty())
    {
        Some(expression) => CellValue::Formula {
            expression: expression.clone(),
            cached: value.numeric(),
        },
        None => value,
    }
}
