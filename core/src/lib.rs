//! In-memory document indexing and ranking.
//!
//! Documents are trained into a [`Corpus`], deduplicated by content hash, and
//! ranked against free-text queries with BM25 or TF-IDF cosine similarity.

pub mod index;
pub mod ranker;
pub mod scoring;
pub mod tokenizer;

pub use index::{ContentHash, Corpus, CorpusState, CorpusStats, DocId, DocRecord, DocSummary, TrainOutcome, TrainStatus};
pub use ranker::{rank, RankedDoc, TOP_K};
pub use scoring::{Bm25, Scorer, Strategy, TfIdfCosine};
pub use tokenizer::Analyzer;
