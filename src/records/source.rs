use miette::Result;

use crate::records::record::Record;

/// A single-consumer, pull-one-at-a-time producer of rows.
///
/// This is the boundary between the collection types and whatever executes
/// statements: a driver's cursor implements this by converting each raw row
/// into a [`Record`]. The contract is pull-based and one-shot:
///
/// - `Ok(Some(record))` yields the next row,
/// - `Ok(None)` signals natural completion (not an error, and permanent),
/// - `Err(_)` is an opaque producer failure; callers propagate it unchanged
///   and may pull again if the producer supports it.
///
/// Ownership of the underlying resource (e.g. an open cursor) transfers to
/// whoever holds the source; [`crate::RecordCollection`] takes it at
/// construction and drops it once the source reports completion.
pub trait RowSource {
    /// Pulls the next row from the producer.
    fn next_row(&mut self) -> Result<Option<Record>>;
}

/// A producer with no rows; always reports completion.
pub struct EmptySource;

impl RowSource for EmptySource {
    fn next_row(&mut self) -> Result<Option<Record>> {
        Ok(None)
    }
}

/// Adapts any infallible iterator of records into a [`RowSource`].
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Record>,
{
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I> RowSource for IterSource<I>
where
    I: Iterator<Item = Record>,
{
    fn next_row(&mut self) -> Result<Option<Record>> {
        Ok(self.iter.next())
    }
}
