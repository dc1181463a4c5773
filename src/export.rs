use strum::EnumString;

use crate::{RowsetError, core::types::Value};

/// Serialization formats understood by [`Dataset::export`].
///
/// Format names parse case-insensitively, so `"json"`, `"JSON"` and
/// `"Json"` all resolve to [`ExportFormat::Json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Options for CSV serialization.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field separator. Defaults to `,`.
    pub delimiter: char,

    /// When enabled, fields containing the delimiter, a quote, or a
    /// newline are wrapped in double quotes with inner quotes doubled.
    pub quoting: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quoting: true,
        }
    }
}

/// A small tabular dataset: a header row plus zero or more data rows.
///
/// This is the hand-off point between records and serialized output.
/// [`crate::Record`] and [`crate::RecordCollection`] build one of these and
/// delegate the actual formatting to it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Creates an empty dataset with no headers and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dataset with the given header row.
    pub fn with_headers(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Appends a data row.
    ///
    /// # Panics
    ///
    /// Panics if the row width does not match the header width.
    pub fn append(&mut self, row: Vec<Value>) {
        assert_eq!(
            row.len(),
            self.headers.len(),
            "row width must match header width"
        );
        self.rows.push(row);
    }

    /// Serializes the dataset in the requested format with default options.
    pub fn export(&self, format: ExportFormat) -> Result<String, RowsetError> {
        match format {
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => self.to_csv(&CsvOptions::default()),
        }
    }

    /// Serializes as a JSON array with one object per row, keys in header
    /// order. Duplicate headers collapse to a single key, last write wins.
    pub fn to_json(&self) -> Result<String, RowsetError> {
        let mut objects = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut object = serde_json::Map::new();
            for (header, value) in self.headers.iter().zip(row) {
                object.insert(header.clone(), serde_json::to_value(value)?);
            }
            objects.push(serde_json::Value::Object(object));
        }
        Ok(serde_json::Value::Array(objects).to_string())
    }

    /// Serializes as CSV: a header line, then one line per row, each
    /// terminated by `\n`. An entirely empty dataset serializes to the
    /// empty string.
    pub fn to_csv(&self, options: &CsvOptions) -> Result<String, RowsetError> {
        let mut out = String::new();
        if self.headers.is_empty() && self.rows.is_empty() {
            return Ok(out);
        }

        write_csv_line(&mut out, self.headers.iter(), options);
        for row in &self.rows {
            write_csv_line(&mut out, row.iter().map(csv_field), options);
        }
        Ok(out)
    }
}

/// Renders a single value for CSV output. NULL becomes the empty field.
fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Text(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_csv_line<S: AsRef<str>>(
    out: &mut String,
    fields: impl Iterator<Item = S>,
    options: &CsvOptions,
) {
    for (i, field) in fields.enumerate() {
        let field = field.as_ref();
        if i > 0 {
            out.push(options.delimiter);
        }
        let needs_quotes = options.quoting
            && (field.contains(options.delimiter)
                || field.contains('"')
                || field.contains('\n'));
        if needs_quotes {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
