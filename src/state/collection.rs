use crate::model::EpisodeRecord;
use std::collections::HashMap;

/// The accumulated episode records, unique by source URL
///
/// Appending a record for a URL that is already present replaces the old
/// record wholesale, keeping its position in the collection.
#[derive(Debug, Clone, Default)]
pub struct EpisodeCollection {
    records: Vec<EpisodeRecord>,
    index: HashMap<String, usize>,
}

impl EpisodeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from stored records, collapsing duplicate URLs
    /// (the last occurrence wins)
    pub fn from_records(records: Vec<EpisodeRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            collection.upsert(record);
        }
        collection
    }

    /// Adds a record, returning true if it replaced one with the same URL
    pub fn upsert(&mut self, record: EpisodeRecord) -> bool {
        match self.index.get(&record.url) {
            Some(&position) => {
                self.records[position] = record;
                true
            }
            None => {
                self.index.insert(record.url.clone(), self.records.len());
                self.records.push(record);
                false
            }
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&EpisodeRecord> {
        self.index.get(url).map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
