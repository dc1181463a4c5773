use std::{collections::HashMap, fmt};

use miette::Result;

use crate::{
    RowsetError,
    core::types::Value,
    export::{Dataset, ExportFormat},
    records::{
        record::Record,
        source::{EmptySource, IterSource, RowSource},
    },
};

/// The rows produced by a query, buffered as they are consumed.
///
/// Wraps a one-shot [`RowSource`] and presents it as an addressable,
/// re-scannable sequence. Rows are pulled from the source only when an
/// access requires them and are buffered forever after, so the source is
/// consumed at most once and already-seen rows replay for free.
///
/// # Consumption model
///
/// Every operation shares one cursor into the source: indexing pulls until
/// the buffer covers the requested position, iteration replays the buffer
/// from the start and then continues pulling, and the aggregate operations
/// ([`RecordCollection::all`], [`RecordCollection::one`],
/// [`RecordCollection::export`]) drain the source completely. Abandoning an
/// iterator mid-stream leaves the buffer and the source exactly where the
/// last pull left them; the next access resumes from there. Once the
/// source reports completion the collection drops it, releasing whatever
/// resource (e.g. an open cursor) it held.
///
/// [`RecordCollection::len`] counts only the rows pulled so far; it
/// under-reports the total until the source is exhausted.
pub struct RecordCollection {
    source: Box<dyn RowSource>,
    rows: Vec<Record>,
    exhausted: bool,
}

impl RecordCollection {
    /// Creates a collection over a fresh producer, taking ownership of it.
    pub fn new(source: impl RowSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            rows: Vec::new(),
            exhausted: false,
        }
    }

    /// Creates a collection over an already-materialized set of rows.
    ///
    /// The rows still stream through the normal pull path, so a fresh
    /// collection reports `len() == 0` until accessed.
    pub fn from_rows(rows: Vec<Record>) -> Self {
        Self::new(IterSource::new(rows.into_iter()))
    }

    /// Draws one row from the source into the buffer.
    ///
    /// Returns `Ok(true)` when a row was appended and `Ok(false)` once the
    /// source is exhausted. A producer error propagates unchanged; the
    /// buffer keeps its partial progress and `exhausted` stays false.
    fn pull(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        match self.source.next_row()? {
            Some(record) => {
                self.rows.push(record);
                Ok(true)
            }
            None => {
                self.exhausted = true;
                // Drop the producer now that it has nothing left, releasing
                // whatever resource it held.
                self.source = Box::new(EmptySource);
                Ok(false)
            }
        }
    }

    fn materialize_to(&mut self, count: usize) -> Result<()> {
        while self.rows.len() < count {
            if !self.pull()? {
                break;
            }
        }
        Ok(())
    }

    fn materialize_all(&mut self) -> Result<()> {
        while self.pull()? {}
        Ok(())
    }

    /// Iterates the collection from the beginning.
    ///
    /// The iterator replays the buffered prefix first, then pulls fresh
    /// rows from the source as needed, yielding any producer error in
    /// place.
    pub fn iter(&mut self) -> Records<'_> {
        Records {
            collection: self,
            cursor: 0,
        }
    }

    /// Gets the record at the given position, pulling rows as needed.
    ///
    /// Fails with [`RowsetError::IndexOutOfRange`] when the source is
    /// exhausted before reaching the position.
    pub fn get(&mut self, index: usize) -> Result<&Record> {
        self.materialize_to(index + 1)?;
        let len = self.rows.len();
        self.rows
            .get(index)
            .ok_or_else(|| RowsetError::IndexOutOfRange { index, len }.into())
    }

    /// Returns a new collection over a copy of `buffer[start..stop]`.
    ///
    /// Pulls until the buffer covers `stop`, or to exhaustion when `stop`
    /// is `None`. Both bounds clamp to the rows actually produced. The
    /// returned collection replays its own copy of the rows and is fully
    /// decoupled from this one's live source.
    pub fn slice(&mut self, start: usize, stop: Option<usize>) -> Result<RecordCollection> {
        match stop {
            Some(stop) => self.materialize_to(stop)?,
            None => self.materialize_all()?,
        }
        let end = stop.map_or(self.rows.len(), |stop| stop.min(self.rows.len()));
        let start = start.min(end);
        Ok(Self::from_rows(self.rows[start..end].to_vec()))
    }

    /// The number of rows pulled so far.
    ///
    /// This under-reports the total row count until the source is
    /// exhausted.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows have been pulled yet; carries the same caveat as
    /// [`RecordCollection::len`].
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True once the source has reported completion; irreversible.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Drains the source and returns all rows in order.
    pub fn all(&mut self) -> Result<Vec<Record>> {
        self.materialize_all()?;
        Ok(self.rows.clone())
    }

    /// Drains the source and returns each row as a name-to-value map.
    pub fn all_as_maps(&mut self) -> Result<Vec<HashMap<String, Value>>> {
        self.materialize_all()?;
        Ok(self.rows.iter().map(Record::as_map).collect())
    }

    /// The first row, or `None` on an empty sequence. Chain `unwrap_or`
    /// for a default.
    pub fn first(&mut self) -> Result<Option<Record>> {
        self.materialize_to(1)?;
        Ok(self.rows.first().cloned())
    }

    /// Exactly one row: `None` on zero rows, the row on exactly one, and
    /// [`RowsetError::MultipleRows`] on more.
    pub fn one(&mut self) -> Result<Option<Record>> {
        self.materialize_all()?;
        match self.rows.as_slice() {
            [] => Ok(None),
            [record] => Ok(Some(record.clone())),
            _ => Err(RowsetError::MultipleRows.into()),
        }
    }

    /// The first value of the first row, or `None` when there is no first
    /// row (or it has no values).
    pub fn scalar(&mut self) -> Result<Option<Value>> {
        Ok(self
            .first()?
            .and_then(|record| record.values().first().cloned()))
    }

    /// Drains the source into a tabular dataset.
    ///
    /// An empty sequence produces an empty dataset; otherwise the header
    /// comes from the first row's field names and each row contributes its
    /// values.
    pub fn dataset(&mut self) -> Result<Dataset> {
        self.materialize_all()?;
        let Some(first) = self.rows.first() else {
            return Ok(Dataset::new());
        };
        let mut data = Dataset::with_headers(first.field_names().to_vec());
        for record in &self.rows {
            data.append(record.values().to_vec());
        }
        Ok(data)
    }

    /// Drains the source and serializes all rows in the requested format.
    pub fn export(&mut self, format: ExportFormat) -> Result<String> {
        Ok(self.dataset()?.export(format)?)
    }
}

impl fmt::Debug for RecordCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<RecordCollection size={} exhausted={}>",
            self.rows.len(),
            self.exhausted
        )
    }
}

/// Iterator over a [`RecordCollection`], created by
/// [`RecordCollection::iter`].
pub struct Records<'a> {
    collection: &'a mut RecordCollection,
    cursor: usize,
}

impl Iterator for Records<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.collection.rows.len() {
            match self.collection.pull() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
        let record = self.collection.rows[self.cursor].clone();
        self.cursor += 1;
        Some(Ok(record))
    }
}

impl<'a> IntoIterator for &'a mut RecordCollection {
    type Item = Result<Record>;
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Records<'a> {
        self.iter()
    }
}
