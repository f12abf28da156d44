/// A table column: its 1-based ordinal within the table and its header name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    /// Ordinal from the table's left boundary, starting at 1
    pub id: usize,
    /// Column name (from header row or table definition)
    pub name: String,
}

impl Column {
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Column { id, name: name.into() }
    }

    /// 0-based distance from the table's left boundary.
    pub(crate) fn offset(&self) -> usize {
        self.id.saturating_sub(1)
    }
}
