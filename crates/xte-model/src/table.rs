use std::collections::BTreeMap;

/// One cell of the flat model. `Missing` is a true null and is distinct from
/// an empty string: a guide element that was present but empty imports as
/// `Text("")`, an element that never appeared imports as `Missing`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Missing,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            CellValue::Missing => None,
        }
    }

    /// Trimmed value, `None` when missing or blank. This is the presence test
    /// used by the sparse XML encoding.
    pub fn trimmed(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            CellValue::Missing => None,
        }
    }
}

/// One flat record: column header → cell. Columns a record does not carry are
/// treated as `Missing` by all consumers.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub cells: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Trimmed, non-blank cell text for `column`.
    pub fn trimmed(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(CellValue::trimmed)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }
}

/// Ordered flat table: the column list fixes the tabular layout, records hold
/// the data. Records may carry a subset of the columns.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Append another table, merging its column list in place (new columns go
    /// after the existing ones, preserving first-seen order).
    pub fn extend(&mut self, other: RecordTable) {
        for column in other.columns {
            if !self.has_column(&column) {
                self.columns.push(column);
            }
        }
        self.records.extend(other.records);
    }
}
