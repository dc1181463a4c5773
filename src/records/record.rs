use std::{collections::HashMap, fmt, ops::Index};

use crate::{
    RowsetError,
    core::types::Value,
    export::{Dataset, ExportFormat},
};

/// A single row returned by a query.
///
/// A record is an immutable ordered mapping from field name to value.
/// Values are addressable by position or by name. Duplicate field names are
/// permitted in storage (a query is free to select the same column twice);
/// by-name lookup on a duplicated name fails with
/// [`RowsetError::AmbiguousField`] rather than guessing.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    field_names: Vec<String>,
    values: Vec<Value>,
}

impl Record {
    /// Creates a record from parallel field-name and value sequences.
    ///
    /// # Panics
    ///
    /// Panics if the two sequences differ in length.
    pub fn new(field_names: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            field_names.len(),
            values.len(),
            "field names and values must have the same length"
        );
        Self {
            field_names,
            values,
        }
    }

    /// Returns the ordered field names, duplicates included.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Returns the ordered values, positionally paired with the names.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Gets the value at the given position.
    pub fn get_by_index(&self, index: usize) -> Result<&Value, RowsetError> {
        self.values.get(index).ok_or(RowsetError::IndexOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    /// Gets the value paired with the given field name.
    ///
    /// Fails with [`RowsetError::FieldNotFound`] when no field matches and
    /// with [`RowsetError::AmbiguousField`] when more than one does.
    pub fn get_by_name(&self, name: &str) -> Result<&Value, RowsetError> {
        let mut positions = self
            .field_names
            .iter()
            .enumerate()
            .filter(|(_, field)| field.as_str() == name)
            .map(|(i, _)| i);

        let Some(first) = positions.next() else {
            return Err(RowsetError::FieldNotFound(name.to_string()));
        };
        if positions.next().is_some() {
            return Err(RowsetError::AmbiguousField(name.to_string()));
        }
        Ok(&self.values[first])
    }

    /// Fallback lookup: `None` when the field is missing *or* ambiguous.
    ///
    /// Collapsing both failure modes into one fallback path is deliberate
    /// and long-standing behavior; callers that need to distinguish a
    /// duplicated field from a missing one use [`Record::get_by_name`] and
    /// match on the error. Chain `unwrap_or` for a default value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_by_name(name).ok()
    }

    /// Builds a name-to-value map. Duplicate field names collapse to a
    /// single key, last write wins.
    pub fn as_map(&self) -> HashMap<String, Value> {
        self.field_names
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }

    /// Builds a name-to-value association list preserving field order.
    ///
    /// A mapping cannot hold duplicate keys, so a duplicated field keeps
    /// its first position and takes its last value — a lossy conversion
    /// when duplicates exist.
    pub fn as_ordered_map(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = Vec::with_capacity(self.field_names.len());
        for (name, value) in self.field_names.iter().zip(&self.values) {
            match entries.iter_mut().find(|(existing, _)| existing == name) {
                Some(entry) => entry.1 = value.clone(),
                None => entries.push((name.clone(), value.clone())),
            }
        }
        entries
    }

    /// Builds a single-row tabular dataset: header = field names, one data
    /// row = values.
    pub fn dataset(&self) -> Dataset {
        let mut data = Dataset::with_headers(self.field_names.clone());
        data.append(self.values.clone());
        data
    }

    /// Serializes this record as a single-row dataset.
    pub fn export(&self, format: ExportFormat) -> Result<String, RowsetError> {
        self.dataset().export(format)
    }
}

/// Positional sugar over [`Record::get_by_index`].
///
/// Panics on an out-of-range index, like slice indexing.
impl Index<usize> for Record {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        match self.get_by_index(index) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Named sugar over [`Record::get_by_name`].
///
/// Panics on a missing or ambiguous field, like map indexing.
impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        match self.get_by_name(name) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl fmt::Display for Record {
    /// Renders as `<Record {json object}>` — the single-row JSON
    /// serialization with the surrounding array delimiters stripped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.dataset().to_json().map_err(|_| fmt::Error)?;
        write!(f, "<Record {}>", &json[1..json.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new(
            vec!["id".to_string(), "name".to_string()],
            vec![Value::Integer(1), Value::Text("Test".to_string())],
        )
    }

    #[test]
    fn test_field_names_and_values() {
        let record = sample();
        assert_eq!(record.field_names(), ["id", "name"]);
        assert_eq!(
            record.values(),
            [Value::Integer(1), Value::Text("Test".to_string())]
        );
        assert_eq!(record[0], Value::Integer(1));
        assert_eq!(record[1], Value::Text("Test".to_string()));
        assert_eq!(record["id"], Value::Integer(1));
        assert_eq!(record["name"], Value::Text("Test".to_string()));
    }

    #[test]
    fn test_get_with_default() {
        let record = sample();
        assert_eq!(record.get("id"), Some(&Value::Integer(1)));
        assert_eq!(
            record.get("missing").cloned().unwrap_or(Value::Integer(42)),
            Value::Integer(42)
        );
    }

    #[test]
    fn test_by_name_matches_by_position() {
        let record = sample();
        for (position, name) in record.field_names().iter().enumerate() {
            assert_eq!(
                record.get_by_name(name).unwrap(),
                record.get_by_index(position).unwrap()
            );
        }
    }

    #[test]
    fn test_missing_field() {
        let record = sample();
        assert!(matches!(
            record.get_by_name("missing"),
            Err(RowsetError::FieldNotFound(name)) if name == "missing"
        ));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_duplicate_field_is_ambiguous() {
        let record = Record::new(
            vec!["id".to_string(), "id".to_string()],
            vec![Value::Integer(1), Value::Integer(2)],
        );
        assert!(matches!(
            record.get_by_name("id"),
            Err(RowsetError::AmbiguousField(name)) if name == "id"
        ));
        // The fallback accessor treats ambiguity like absence.
        assert_eq!(
            record.get("id").cloned().unwrap_or(Value::Integer(42)),
            Value::Integer(42)
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let record = sample();
        assert!(matches!(
            record.get_by_index(2),
            Err(RowsetError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    #[should_panic(expected = "record contains no 'missing' field")]
    fn test_index_sugar_panics_on_missing() {
        let _ = &sample()["missing"];
    }

    #[test]
    fn test_as_map() {
        let map = sample().as_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["id"], Value::Integer(1));
        assert_eq!(map["name"], Value::Text("Test".to_string()));
    }

    #[test]
    fn test_as_ordered_map_preserves_order() {
        let entries = sample().as_ordered_map();
        assert_eq!(entries[0].0, "id");
        assert_eq!(entries[1].0, "name");
    }

    #[test]
    fn test_as_ordered_map_duplicate_last_wins() {
        let record = Record::new(
            vec!["id".to_string(), "id".to_string()],
            vec![Value::Integer(1), Value::Integer(2)],
        );
        assert_eq!(
            record.as_ordered_map(),
            vec![("id".to_string(), Value::Integer(2))]
        );
    }

    #[test]
    fn test_export_json() {
        let json = sample().export(ExportFormat::Json).unwrap();
        assert_eq!(json, r#"[{"id":1,"name":"Test"}]"#);
    }

    #[test]
    fn test_display() {
        let rendered = sample().to_string();
        assert_eq!(rendered, r#"<Record {"id":1,"name":"Test"}>"#);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mismatched_lengths_panic() {
        Record::new(vec!["id".to_string()], vec![]);
    }
}
