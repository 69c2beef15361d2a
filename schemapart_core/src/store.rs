use crate::error::StoreError;

/// One schemapart row as far as the migration cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub content: Vec<u8>,
    pub metadata: Vec<u8>,
}

/// Source and sink of records.
///
/// The driver needs only two things from the backing table: every row in a
/// stable order, and a point update of both blob fields by id.
pub trait RowStore {
    /// All records, ordered by id.
    fn load_all(&mut self) -> Result<Vec<Record>, StoreError>;

    fn update(&mut self, id: i64, content: &[u8], metadata: &[u8]) -> Result<(), StoreError>;
}

/// In-memory row store. Rows are kept sorted by id.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Vec<Record>,
    writes: usize,
}

impl MemoryStore {
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.id);
        Self { records, writes: 0 }
    }

    pub fn get(&self, id: i64) -> Option<&Record> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|idx| &self.records[idx])
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of successful `update` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl RowStore for MemoryStore {
    fn load_all(&mut self) -> Result<Vec<Record>, StoreError> {
        Ok(self.records.clone())
    }

    fn update(&mut self, id: i64, content: &[u8], metadata: &[u8]) -> Result<(), StoreError> {
        let idx = self
            .records
            .binary_search_by_key(&id, |r| r.id)
            .map_err(|_| StoreError::new("update", format!("no record with id {id}")))?;
        let record = &mut self.records[idx];
        record.content = content.to_vec();
        record.metadata = metadata.to_vec();
        self.writes += 1;
        Ok(())
    }
}
