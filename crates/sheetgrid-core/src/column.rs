//! Column types

use crate::cell::column_name;

/// Default column width in pixels
pub const DEFAULT_COLUMN_WIDTH: f64 = 100.0;

/// Default number of columns in a new grid (A..Z)
pub const DEFAULT_COLUMN_COUNT: u16 = 26;

/// Semantic column type
///
/// Advisory only: input in any column is classified from its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
    Email,
    Url,
}

/// Column metadata
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Column {
    /// Column index (0-based, positional)
    pub index: u16,
    /// Display width in pixels
    pub width: f64,
    /// Advisory semantic type
    pub column_type: ColumnType,
    /// Column is shown
    pub visible: bool,
    /// Cells in this column cannot be edited
    pub locked: bool,
}

impl Column {
    /// Create a new column with default settings
    pub fn new(index: u16) -> Self {
        Self {
            index,
            width: DEFAULT_COLUMN_WIDTH,
            column_type: ColumnType::Text,
            visible: true,
            locked: false,
        }
    }

    /// Set width
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Set visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set lock flag
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Set the advisory type
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Spreadsheet letter name (A, B, ..., AA, ...)
    pub fn name(&self) -> String {
        column_name(self.index as u32)
    }

    /// Width the column occupies on screen (0 when hidden)
    pub fn effective_width(&self) -> f64 {
        if self.visible {
            self.width.max(0.0)
        } else {
            0.0
        }
    }
}

impl Default for Column {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Ordered, flat sequence of columns
///
/// Index is positional: `columns()[i].index == i` is maintained on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnModel {
    columns: Vec<Column>,
}

impl ColumnModel {
    /// Build a model from descriptors, renumbering indices positionally
    pub fn new(columns: Vec<Column>) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, mut c)| {
                c.index = i as u16;
                c
            })
            .collect();
        Self { columns }
    }

    /// `count` visible, unlocked columns of the same width
    pub fn with_default_columns(count: u16, width: f64) -> Self {
        Self {
            columns: (0..count).map(|i| Column::new(i).with_width(width)).collect(),
        }
    }

    /// Number of columns
    pub fn len(&self) -> u16 {
        self.columns.len() as u16
    }

    /// Check if the model has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get a column by index
    pub fn get(&self, index: u16) -> Option<&Column> {
        self.columns.get(index as usize)
    }

    /// Get a column mutably
    pub fn get_mut(&mut self, index: u16) -> Option<&mut Column> {
        self.columns.get_mut(index as usize)
    }

    /// All columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// On-screen widths in column order (hidden columns are 0)
    pub fn widths(&self) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().map(Column::effective_width)
    }

    /// Total on-screen width
    pub fn total_width(&self) -> f64 {
        self.widths().sum()
    }

    /// Whether cells in the column are locked
    pub fn is_locked(&self, index: u16) -> bool {
        self.get(index).map_or(false, |c| c.locked)
    }
}

impl Default for ColumnModel {
    fn default() -> Self {
        Self::with_default_columns(DEFAULT_COLUMN_COUNT, DEFAULT_COLUMN_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model() {
        let model = ColumnModel::default();
        assert_eq!(model.len(), 26);
        assert_eq!(model.get(0).unwrap().name(), "A");
        assert_eq!(model.get(25).unwrap().name(), "Z");
        assert_eq!(model.total_width(), 2600.0);
    }

    #[test]
    fn test_indices_are_positional() {
        let model = ColumnModel::new(vec![Column::new(7), Column::new(3).with_width(40.0)]);
        assert_eq!(model.get(0).unwrap().index, 0);
        assert_eq!(model.get(1).unwrap().index, 1);
        assert_eq!(model.get(1).unwrap().width, 40.0);
    }

    #[test]
    fn test_hidden_columns_have_no_width() {
        let mut model = ColumnModel::with_default_columns(3, 50.0);
        model.get_mut(1).unwrap().visible = false;
        assert_eq!(model.widths().collect::<Vec<_>>(), vec![50.0, 0.0, 50.0]);
        assert_eq!(model.total_width(), 100.0);
    }

    #[test]
    fn test_locked_column() {
        let model = ColumnModel::new(vec![Column::new(0), Column::new(1).with_locked(true)]);
        assert!(!model.is_locked(0));
        assert!(model.is_locked(1));
        assert!(!model.is_locked(9));
    }
}
