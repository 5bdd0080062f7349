use crate::index::{Corpus, DocId};
use crate::scoring::{Scorer, Strategy};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Maximum number of documents returned for a query.
pub const TOP_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDoc {
    pub doc_id: DocId,
    pub doc_name: String,
    pub score: f64,
}

/// Order by descending score, then ascending doc id, and keep the first `k`.
pub fn top_k(scores: HashMap<DocId, f64>, k: usize) -> Vec<(DocId, f64)> {
    let mut scored: Vec<(DocId, f64)> = scores.into_iter().collect();
    scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
    scored.truncate(k);
    scored
}

/// Rank the corpus against free text.
///
/// Scoring and name lookup happen under one read lock so the result reflects a
/// single consistent corpus state.
pub fn rank(corpus: &Corpus, query: &str, strategy: Strategy) -> Vec<RankedDoc> {
    let terms = corpus.analyzer().analyze(query);
    if terms.is_empty() {
        return Vec::new();
    }
    let state = corpus.read();
    let scores = strategy.score(&terms, &state);
    let total_hits = scores.len();
    let ranked: Vec<RankedDoc> = top_k(scores, TOP_K)
        .into_iter()
        .filter_map(|(doc_id, score)| {
            state.doc(doc_id).map(|doc| RankedDoc { doc_id, doc_name: doc.name.clone(), score })
        })
        .collect();
    tracing::debug!(%strategy, terms = terms.len(), total_hits, returned = ranked.len(), "ranked query");
    ranked
}
