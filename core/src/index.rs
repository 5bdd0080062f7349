use crate::tokenizer::Analyzer;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Document identifier. Dense, starting at 1, in training order.
pub type DocId = u64;

/// SHA-1 digest of a document's raw bytes, used only for deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 20]);

impl ContentHash {
    pub fn of(content: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(content);
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DocRecord {
    pub doc_id: DocId,
    pub name: String,
    pub content_hash: ContentHash,
    pub term_freq: HashMap<String, u64>,
    /// Number of indexed terms after normalization.
    pub doc_length: u64,
}

/// Everything the corpus knows, guarded as one unit by [`Corpus`].
#[derive(Debug, Default)]
pub struct CorpusState {
    hash_to_doc: HashMap<ContentHash, DocId>,
    postings: HashMap<String, BTreeSet<DocId>>,
    document_frequency: HashMap<String, u64>,
    total_term_count: u64,
    /// `docs[i]` has doc id `i + 1`.
    docs: Vec<DocRecord>,
}

impl CorpusState {
    pub fn document_count(&self) -> u64 { self.docs.len() as u64 }

    pub fn total_term_count(&self) -> u64 { self.total_term_count }

    pub fn vocabulary_size(&self) -> usize { self.postings.len() }

    /// Mean document length, or `None` for an empty corpus.
    pub fn average_doc_length(&self) -> Option<f64> {
        match self.document_count() {
            0 => None,
            n => Some(self.total_term_count as f64 / n as f64),
        }
    }

    pub fn postings(&self, term: &str) -> Option<&BTreeSet<DocId>> { self.postings.get(term) }

    /// Indexed vocabulary, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ { self.postings.keys().map(String::as_str) }

    pub fn document_frequency(&self, term: &str) -> u64 {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    pub fn doc(&self, doc_id: DocId) -> Option<&DocRecord> {
        let idx = doc_id.checked_sub(1)?;
        self.docs.get(usize::try_from(idx).ok()?)
    }

    pub fn docs(&self) -> &[DocRecord] { &self.docs }

    pub fn doc_for_hash(&self, hash: &ContentHash) -> Option<DocId> {
        self.hash_to_doc.get(hash).copied()
    }

    fn insert(&mut self, name: String, content_hash: ContentHash, terms: Vec<String>) -> DocId {
        let doc_id = self.document_count() + 1;
        let doc_length = terms.len() as u64;
        let mut term_freq: HashMap<String, u64> = HashMap::new();
        for term in terms {
            *term_freq.entry(term).or_insert(0) += 1;
        }
        for term in term_freq.keys() {
            self.postings.entry(term.clone()).or_default().insert(doc_id);
            *self.document_frequency.entry(term.clone()).or_insert(0) += 1;
        }
        self.total_term_count += doc_length;
        self.hash_to_doc.insert(content_hash, doc_id);
        self.docs.push(DocRecord { doc_id, name, content_hash, term_freq, doc_length });
        doc_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainStatus {
    Trained,
    AlreadyTrained,
    TrainingNotRequired,
}

impl TrainStatus {
    pub fn message(self) -> &'static str {
        match self {
            TrainStatus::Trained => "document successfully trained.",
            TrainStatus::AlreadyTrained => "document is already trained.",
            TrainStatus::TrainingNotRequired => {
                "this document does not need to be trained, as it contains no useful information."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainOutcome {
    /// `None` when the document was not indexed.
    pub doc_id: Option<DocId>,
    pub doc_name: String,
    pub status: TrainStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub document_count: u64,
    pub total_term_count: u64,
    pub vocabulary_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocSummary {
    pub doc_id: DocId,
    pub doc_name: String,
    pub doc_length: u64,
    pub distinct_terms: usize,
}

/// Shared, thread-safe document index.
///
/// Training takes the write lock once per batch; readers take the read lock and
/// always see whole documents.
#[derive(Debug, Default)]
pub struct Corpus {
    analyzer: Analyzer,
    state: RwLock<CorpusState>,
}

impl Corpus {
    pub fn new() -> Self { Self::default() }

    pub fn with_analyzer(analyzer: Analyzer) -> Self {
        Self { analyzer, state: RwLock::new(CorpusState::default()) }
    }

    pub fn analyzer(&self) -> &Analyzer { &self.analyzer }

    /// Index a batch of `(name, raw bytes)` pairs. One outcome per entry, in input order.
    pub fn train<I, N, C>(&self, batch: I) -> Vec<TrainOutcome>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: AsRef<[u8]>,
    {
        // Hash and analyze before taking the lock.
        let prepared: Vec<(String, ContentHash, Vec<String>)> = batch
            .into_iter()
            .map(|(name, content)| {
                let content = content.as_ref();
                let terms = self.analyzer.analyze(&String::from_utf8_lossy(content));
                (name.into(), ContentHash::of(content), terms)
            })
            .collect();

        let mut state = self.state.write();
        prepared
            .into_iter()
            .map(|(doc_name, hash, terms)| {
                if let Some(doc_id) = state.doc_for_hash(&hash) {
                    tracing::debug!(doc_id, doc_name = %doc_name, %hash, "document already trained");
                    return TrainOutcome { doc_id: Some(doc_id), doc_name, status: TrainStatus::AlreadyTrained };
                }
                if terms.is_empty() {
                    tracing::debug!(doc_name = %doc_name, "document has no indexable terms");
                    return TrainOutcome { doc_id: None, doc_name, status: TrainStatus::TrainingNotRequired };
                }
                let doc_id = state.insert(doc_name.clone(), hash, terms);
                tracing::info!(doc_id, doc_name = %doc_name, "document trained");
                TrainOutcome { doc_id: Some(doc_id), doc_name, status: TrainStatus::Trained }
            })
            .collect()
    }

    /// Shared read access to the whole state. Hold it only as long as needed.
    pub fn read(&self) -> RwLockReadGuard<'_, CorpusState> { self.state.read() }

    pub fn stats(&self) -> CorpusStats {
        let state = self.state.read();
        CorpusStats {
            document_count: state.document_count(),
            total_term_count: state.total_term_count(),
            vocabulary_size: state.vocabulary_size(),
        }
    }

    pub fn doc_name(&self, doc_id: DocId) -> Option<String> {
        self.state.read().doc(doc_id).map(|d| d.name.clone())
    }

    pub fn document(&self, doc_id: DocId) -> Option<DocSummary> {
        self.state.read().doc(doc_id).map(|d| DocSummary {
            doc_id: d.doc_id,
            doc_name: d.name.clone(),
            doc_length: d.doc_length,
            distinct_terms: d.term_freq.len(),
        })
    }
}
