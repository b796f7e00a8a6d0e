//! Cell records as returned by a range fetch
//!
//! A record is the flat wire shape of a cell. Coordinates absent from a
//! response are empty cells and are never returned.

use crate::cell::{Cell, CellValue, DataType, FormulaOutcome};

/// One fetched cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CellRecord {
    pub row_index: u32,
    pub column_index: u16,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub display_value: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub formula: Option<String>,
    #[cfg_attr(feature = "serde", serde(default = "default_data_type"))]
    pub data_type: DataType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_locked: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub comment: Option<String>,
}

#[cfg(feature = "serde")]
fn default_data_type() -> DataType {
    DataType::Text
}

impl CellRecord {
    /// Build the record for a stored cell
    pub fn from_cell(row: u32, col: u16, cell: &Cell) -> Self {
        Self {
            row_index: row,
            column_index: col,
            value: cell.value().map(str::to_string),
            display_value: Some(cell.display_value().to_string()),
            formula: cell.formula().map(str::to_string),
            data_type: cell.data_type(),
            is_locked: cell.locked,
            comment: cell.comment.clone(),
        }
    }

    /// Coordinates of this record
    pub fn position(&self) -> (u32, u16) {
        (self.row_index, self.column_index)
    }

    /// Convert into a store cell, keeping the record's raw value, display
    /// value and data type
    pub fn into_cell(self) -> Cell {
        let display = self
            .display_value
            .clone()
            .or_else(|| self.value.clone())
            .unwrap_or_default();

        let formula = self
            .formula
            .filter(|f| !f.is_empty())
            .or_else(|| match self.data_type {
                DataType::Formula => self.value.clone().filter(|v| v.starts_with('=')),
                _ => None,
            });

        let value = match (formula, self.data_type) {
            (Some(formula), DataType::Number) => CellValue::Formula {
                formula,
                outcome: FormulaOutcome::Number(display),
            },
            (Some(formula), DataType::Error) => CellValue::Formula {
                formula,
                outcome: FormulaOutcome::Error(display),
            },
            (Some(formula), _) => CellValue::Formula {
                formula,
                outcome: FormulaOutcome::Text(display),
            },
            (None, DataType::Error) => CellValue::Invalid {
                input: self.value,
                display,
            },
            (None, data_type) if self.value.as_deref().is_some_and(|v| v != display) => {
                CellValue::Fetched {
                    raw: self.value,
                    display,
                    data_type,
                }
            }
            (None, DataType::Number) => CellValue::Number(display),
            (None, DataType::Date) => CellValue::Date(display),
            (None, DataType::Boolean) => CellValue::Boolean(display),
            (None, DataType::Formula) => CellValue::Fetched {
                raw: self.value,
                display,
                data_type: DataType::Formula,
            },
            (None, DataType::Text) => {
                if display.is_empty() && self.value.is_none() {
                    CellValue::Empty
                } else {
                    CellValue::Text(display)
                }
            }
        };

        Cell {
            value,
            locked: self.is_locked,
            comment: self.comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(data_type: DataType) -> CellRecord {
        CellRecord {
            row_index: 3,
            column_index: 1,
            value: None,
            display_value: None,
            formula: None,
            data_type,
            is_locked: false,
            comment: None,
        }
    }

    #[test]
    fn test_plain_record_keeps_display_and_type() {
        let rec = CellRecord {
            value: Some("12.50".into()),
            display_value: Some("12.50".into()),
            ..record(DataType::Number)
        };
        let cell = rec.into_cell();
        assert_eq!(cell.display_value(), "12.50");
        assert_eq!(cell.data_type(), DataType::Number);
    }

    #[test]
    fn test_formula_record() {
        let rec = CellRecord {
            value: Some("=A1+B1".into()),
            display_value: Some("7".into()),
            formula: Some("=A1+B1".into()),
            ..record(DataType::Number)
        };
        let cell = rec.into_cell();
        assert_eq!(cell.formula(), Some("=A1+B1"));
        assert_eq!(cell.display_value(), "7");
        assert_eq!(cell.data_type(), DataType::Number);

        let rec = CellRecord {
            value: Some("=UPPER(A1)".into()),
            display_value: Some("HI".into()),
            ..record(DataType::Formula)
        };
        let cell = rec.into_cell();
        assert_eq!(cell.formula(), Some("=UPPER(A1)"));
        assert_eq!(cell.data_type(), DataType::Formula);
    }

    #[test]
    fn test_formatted_record_keeps_raw_value() {
        let rec = CellRecord {
            value: Some("1000".into()),
            display_value: Some("1,000".into()),
            ..record(DataType::Number)
        };
        let cell = rec.clone().into_cell();
        assert_eq!(cell.value(), Some("1000"));
        assert_eq!(cell.display_value(), "1,000");
        assert_eq!(cell.data_type(), DataType::Number);
        assert_eq!(cell.edit_text(), "1000");
        assert_eq!(cell.value.as_number(), Some(1000.0));

        let back = CellRecord::from_cell(3, 1, &cell);
        assert_eq!(back, rec);
    }

    #[test]
    fn test_formula_typed_record_without_expression() {
        let rec = CellRecord {
            value: Some("SUM(A1:A3)".into()),
            display_value: Some("6".into()),
            ..record(DataType::Formula)
        };
        let cell = rec.into_cell();
        assert_eq!(cell.formula(), None);
        assert_eq!(cell.value(), Some("SUM(A1:A3)"));
        assert_eq!(cell.display_value(), "6");
        assert_eq!(cell.data_type(), DataType::Formula);
    }

    #[test]
    fn test_error_record() {
        let rec = CellRecord {
            value: Some("x@".into()),
            display_value: Some("#ERROR: Invalid email format".into()),
            ..record(DataType::Error)
        };
        let cell = rec.into_cell();
        assert_eq!(cell.value(), Some("x@"));
        assert_eq!(cell.display_value(), "#ERROR: Invalid email format");
        assert_eq!(cell.data_type(), DataType::Error);
    }

    #[test]
    fn test_empty_record_is_empty_cell() {
        let rec = CellRecord {
            is_locked: true,
            comment: Some("frozen".into()),
            ..record(DataType::Text)
        };
        let cell = rec.into_cell();
        assert!(cell.value.is_empty());
        assert!(cell.locked);
        assert_eq!(cell.comment.as_deref(), Some("frozen"));
    }

    #[test]
    fn test_from_cell_round_trip() {
        let cell = Cell::new(CellValue::Date("2024-01-31".into())).with_locked(true);
        let rec = CellRecord::from_cell(4, 2, &cell);
        assert_eq!(rec.position(), (4, 2));
        assert_eq!(rec.data_type, DataType::Date);
        assert_eq!(rec.into_cell(), cell);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "rowIndex": 0,
            "columnIndex": 2,
            "value": "true",
            "displayValue": "true",
            "formula": null,
            "dataType": "BOOLEAN",
            "isLocked": false,
            "comment": null
        }"#;
        let rec: CellRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.position(), (0, 2));
        assert_eq!(rec.data_type, DataType::Boolean);
    }
}
