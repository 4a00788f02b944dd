use std::collections::HashMap;

/// A column of a delimited table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Whether values in this column are extracted for translation
    pub localizable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, localizable: bool) -> Self {
        Column {
            name: name.into(),
            localizable,
        }
    }
}

/// One row of a table: column name to value, in column order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `values` with `columns`, filling missing values with empty strings and
    /// dropping values beyond the last column
    pub fn from_values(columns: &[Column], values: Vec<String>) -> Self {
        let mut values = values.into_iter();
        let fields = columns
            .iter()
            .map(|column| (column.name.clone(), values.next().unwrap_or_default()))
            .collect();
        Record { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(column, _)| column == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Ordered columns and records of a delimited file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<Column>,
    records: Vec<Record>,
    key: Option<String>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Table {
            columns,
            records: Vec::new(),
            key: None,
        }
    }

    /// Use `key` instead of the first column to match records when merging
    pub fn with_key(mut self, key: Option<String>) -> Self {
        self.key = key;
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Name of the column records are matched by
    pub fn key_column(&self) -> Option<&str> {
        self.key
            .as_deref()
            .or_else(|| self.columns.first().map(|column| column.name.as_str()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Merge `other` into this table.
    ///
    /// Columns missing here are appended in the order `other` has them. Records
    /// are matched by key value, where each table reads the value from its own
    /// key column. A non-empty value from `other` replaces the value here, an
    /// empty one never does, and `other`'s key column is not copied. Records
    /// without a match are appended.
    pub fn merge(&mut self, other: &Table) {
        for column in &other.columns {
            if !self.has_column(&column.name) {
                self.columns.push(column.clone());
            }
        }

        let own_key = self.key_column().map(str::to_string);
        let other_key = other.key_column();
        let mut by_key: HashMap<String, usize> = HashMap::new();
        if let Some(key) = &own_key {
            for (slot, record) in self.records.iter().enumerate() {
                match record.get(key) {
                    Some(value) if !value.is_empty() => {
                        by_key.entry(value.to_string()).or_insert(slot);
                    }
                    _ => {}
                }
            }
        }

        for record in &other.records {
            let key_value = other_key
                .and_then(|key| record.get(key))
                .filter(|value| !value.is_empty());
            match key_value.and_then(|value| by_key.get(value)) {
                Some(&slot) => {
                    let target = &mut self.records[slot];
                    for (name, value) in record.iter() {
                        if !value.is_empty() && Some(name) != other_key {
                            target.set(name, value);
                        }
                    }
                }
                None => {
                    if let Some(value) = key_value {
                        by_key.insert(value.to_string(), self.records.len());
                    }
                    self.records.push(record.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<Column> {
        names.iter().map(|name| Column::new(*name, true)).collect()
    }

    fn record(columns: &[Column], values: &[&str]) -> Record {
        Record::from_values(columns, values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_record_fill_and_truncate() {
        let cols = columns(&["id", "name", "description"]);
        let short = record(&cols, &["1"]);
        assert_eq!(short.get("name"), Some(""));
        assert_eq!(short.len(), 3);

        let long = record(&cols, &["1", "a", "b", "extra"]);
        assert_eq!(long.len(), 3);
        assert_eq!(long.get("description"), Some("b"));
        assert_eq!(long.get("extra"), None);
    }

    #[test]
    fn test_key_column_defaults_to_first() {
        let table = Table::new(columns(&["id", "name"]));
        assert_eq!(table.key_column(), Some("id"));
        let table = table.with_key(Some("name".to_string()));
        assert_eq!(table.key_column(), Some("name"));
        assert_eq!(Table::default().key_column(), None);
    }

    #[test]
    fn test_merge_precedence() {
        let cols = columns(&["id", "name", "description"]);
        let mut base = Table::new(cols.clone());
        base.push(record(&cols, &["1", "Apple", "A red fruit"]));
        base.push(record(&cols, &["2", "Pear", "A green fruit"]));

        let other_cols = columns(&["id", "description", "color"]);
        let mut other = Table::new(other_cols.clone());
        other.push(record(&other_cols, &["1", "", "red"]));
        other.push(record(&other_cols, &["2", "Pear-shaped", ""]));
        other.push(record(&other_cols, &["3", "Plum", "purple"]));

        base.merge(&other);

        let names: Vec<&str> = base.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "description", "color"]);
        assert_eq!(base.records().len(), 3);

        let apple = &base.records()[0];
        assert_eq!(apple.get("description"), Some("A red fruit"));
        assert_eq!(apple.get("color"), Some("red"));

        let pear = &base.records()[1];
        assert_eq!(pear.get("description"), Some("Pear-shaped"));
        assert_eq!(pear.get("name"), Some("Pear"));

        let plum = &base.records()[2];
        assert_eq!(plum.get("id"), Some("3"));
        assert_eq!(plum.get("name"), None);
    }

    #[test]
    fn test_merge_records_without_key_are_appended() {
        let cols = columns(&["id", "name"]);
        let mut base = Table::new(cols.clone());
        base.push(record(&cols, &["", "Nameless"]));
        let mut other = Table::new(cols.clone());
        other.push(record(&cols, &["", "Another"]));

        base.merge(&other);
        assert_eq!(base.records().len(), 2);
        assert_eq!(base.records()[0].get("name"), Some("Nameless"));
    }

    #[test]
    fn test_merge_duplicate_keys_in_other() {
        let cols = columns(&["id", "name"]);
        let mut base = Table::new(cols.clone());
        let mut other = Table::new(cols.clone());
        other.push(record(&cols, &["7", "first"]));
        other.push(record(&cols, &["7", "second"]));

        base.merge(&other);
        assert_eq!(base.records().len(), 1);
        assert_eq!(base.records()[0].get("name"), Some("second"));
    }

    #[test]
    fn test_merge_uses_each_tables_key() {
        let cols = columns(&["id", "name"]);
        let mut base = Table::new(cols.clone()).with_key(Some("id".to_string()));
        base.push(record(&cols, &["1", "Apple"]));

        let other_cols = columns(&["name", "code", "color"]);
        let mut other = Table::new(other_cols.clone()).with_key(Some("code".to_string()));
        other.push(record(&other_cols, &["Apfel", "1", "red"]));
        other.push(record(&other_cols, &["Birne", "2", "green"]));

        base.merge(&other);

        assert_eq!(base.records().len(), 2);
        let apple = &base.records()[0];
        assert_eq!(apple.get("id"), Some("1"));
        assert_eq!(apple.get("name"), Some("Apfel"));
        assert_eq!(apple.get("color"), Some("red"));
        assert_eq!(apple.get("code"), None);
        assert_eq!(base.records()[1].get("code"), Some("2"));
    }
}
