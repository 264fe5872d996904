use crate::common::Document;
use crate::datastore::Callback;

/// Input of `insert`: delivers the whole batch at once.
pub trait RecordSource: Send {
    fn all(&mut self, callback: Callback<Vec<Document>>);
}

/// A [RecordSource] over records already in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    records: Vec<Document>,
}

impl VecSource {
    pub fn new(records: Vec<Document>) -> Self {
        VecSource { records }
    }
}

impl From<Vec<Document>> for VecSource {
    fn from(records: Vec<Document>) -> Self {
        VecSource::new(records)
    }
}

impl RecordSource for VecSource {
    fn all(&mut self, callback: Callback<Vec<Document>>) {
        callback(Ok(std::mem::take(&mut self.records)))
    }
}
