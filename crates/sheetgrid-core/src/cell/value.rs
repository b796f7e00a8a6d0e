//! Cell value types

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::ERROR_PREFIX;

/// Classification of a cell's displayed content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum DataType {
    Text,
    Number,
    Date,
    Boolean,
    Formula,
    Error,
}

impl DataType {
    /// Get the wire name (`TEXT`, `NUMBER`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "TEXT",
            DataType::Number => "NUMBER",
            DataType::Date => "DATE",
            DataType::Boolean => "BOOLEAN",
            DataType::Formula => "FORMULA",
            DataType::Error => "ERROR",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(DataType::Text),
            "NUMBER" => Ok(DataType::Number),
            "DATE" => Ok(DataType::Date),
            "BOOLEAN" => Ok(DataType::Boolean),
            "FORMULA" => Ok(DataType::Formula),
            "ERROR" => Ok(DataType::Error),
            _ => Err(Error::UnknownDataType(s.to_string())),
        }
    }
}

/// The computed result of a formula cell
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaOutcome {
    /// Numeric result, kept as its display text
    Number(String),
    /// Any other non-error result (text, boolean, empty)
    Text(String),
    /// Error sentinel or evaluation failure, as displayed (e.g. `#ERROR: ...`, `#DIV/0!`)
    Error(String),
}

impl FormulaOutcome {
    /// The string rendered for this outcome
    pub fn display(&self) -> &str {
        match self {
            FormulaOutcome::Number(s) | FormulaOutcome::Text(s) | FormulaOutcome::Error(s) => s,
        }
    }

    /// Data type of a formula cell holding this outcome
    pub fn data_type(&self) -> DataType {
        match self {
            FormulaOutcome::Number(_) => DataType::Number,
            FormulaOutcome::Text(_) => DataType::Formula,
            FormulaOutcome::Error(_) => DataType::Error,
        }
    }
}

/// The classified payload of a cell
///
/// Non-formula variants hold the text exactly as entered; it is both the raw
/// value and the display value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value
    #[default]
    Empty,

    /// Free text (includes validated emails and URLs)
    Text(String),

    /// Finite number, display keeps the original text
    Number(String),

    /// `YYYY-MM-DD` or `MM/DD/YYYY`
    Date(String),

    /// `true` / `false` in any case
    Boolean(String),

    /// `=...` expression with its last computed outcome
    Formula {
        formula: String,
        outcome: FormulaOutcome,
    },

    /// Input that failed validation; display is the `#ERROR: <reason>` text
    Invalid {
        input: Option<String>,
        display: String,
    },

    /// Fetched cell whose raw value and display differ, kept exactly as sent
    Fetched {
        raw: Option<String>,
        display: String,
        data_type: DataType,
    },
}

impl CellValue {
    /// Create a validation failure for `input` with the given reason
    pub fn invalid(input: impl Into<String>, reason: &str) -> Self {
        CellValue::Invalid {
            input: Some(input.into()),
            display: error_display(reason),
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell contains a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    /// The raw entered value
    pub fn raw(&self) -> Option<&str> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) | CellValue::Number(s) | CellValue::Date(s) | CellValue::Boolean(s) => {
                Some(s)
            }
            CellValue::Formula { formula, .. } => Some(formula),
            CellValue::Invalid { input, .. } => input.as_deref(),
            CellValue::Fetched { raw, .. } => raw.as_deref(),
        }
    }

    /// The rendered string
    pub fn display(&self) -> &str {
        match self {
            CellValue::Empty => "",
            CellValue::Text(s) | CellValue::Number(s) | CellValue::Date(s) | CellValue::Boolean(s) => {
                s
            }
            CellValue::Formula { outcome, .. } => outcome.display(),
            CellValue::Invalid { display, .. } | CellValue::Fetched { display, .. } => display,
        }
    }

    /// The formula text, if formula-typed
    pub fn formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula { formula, .. } => Some(formula),
            _ => None,
        }
    }

    /// The data type classification
    pub fn data_type(&self) -> DataType {
        match self {
            CellValue::Empty | CellValue::Text(_) => DataType::Text,
            CellValue::Number(_) => DataType::Number,
            CellValue::Date(_) => DataType::Date,
            CellValue::Boolean(_) => DataType::Boolean,
            CellValue::Formula { outcome, .. } => outcome.data_type(),
            CellValue::Invalid { .. } => DataType::Error,
            CellValue::Fetched { data_type, .. } => *data_type,
        }
    }

    /// Text behind a value of the given type: the raw value of a fetched
    /// cell, else the stored text
    fn typed_text(&self, data_type: DataType) -> Option<&str> {
        match (self, data_type) {
            (CellValue::Number(s), DataType::Number)
            | (CellValue::Date(s), DataType::Date)
            | (CellValue::Boolean(s), DataType::Boolean) => Some(s.trim()),
            (CellValue::Fetched { raw, data_type: ty, .. }, _) if *ty == data_type => {
                raw.as_deref().map(str::trim)
            }
            _ => None,
        }
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        let text = match self {
            CellValue::Formula {
                outcome: FormulaOutcome::Number(s),
                ..
            } => s.trim(),
            _ => self.typed_text(DataType::Number)?,
        };
        text.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self.typed_text(DataType::Boolean)?.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Try to get the value as a calendar date
    pub fn as_date(&self) -> Option<NaiveDate> {
        let s = self.typed_text(DataType::Date)?;
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
            .ok()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// Format an error message the way error cells render it
pub fn error_display(reason: &str) -> String {
    format!("{}: {}", ERROR_PREFIX, reason)
}

/// A single grid cell: classified value plus per-cell flags
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    /// The cell's value
    pub value: CellValue,
    /// Editing disabled
    pub locked: bool,
    /// Optional annotation, opaque to the editor
    pub comment: Option<String>,
}

impl Cell {
    /// The empty default every unknown coordinate reads as
    pub const EMPTY: Cell = Cell {
        value: CellValue::Empty,
        locked: false,
        comment: None,
    };

    /// Create an unlocked cell with no comment
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            locked: false,
            comment: None,
        }
    }

    /// Set the locked flag
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Attach a comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Raw user-entered value
    pub fn value(&self) -> Option<&str> {
        self.value.raw()
    }

    /// The string ultimately rendered
    pub fn display_value(&self) -> &str {
        self.value.display()
    }

    /// Original `=...` expression when formula-typed
    pub fn formula(&self) -> Option<&str> {
        self.value.formula()
    }

    /// Data type classification
    pub fn data_type(&self) -> DataType {
        self.value.data_type()
    }

    /// Text an edit should start from: the formula if any, else the raw value
    pub fn edit_text(&self) -> &str {
        self.formula().or_else(|| self.value()).unwrap_or("")
    }

    /// Text copied to the clipboard: display value, falling back to the raw value
    pub fn copy_text(&self) -> &str {
        let display = self.display_value();
        if display.is_empty() {
            self.value().unwrap_or("")
        } else {
            display
        }
    }

    /// Check if this is the empty default
    pub fn is_empty(&self) -> bool {
        *self == Cell::EMPTY
    }
}
