//! Relevance scoring over a corpus snapshot.
//!
//! Both strategies take an already-normalized query term sequence and return a
//! sparse `doc id -> score` map. Documents sharing no term with the query are
//! never present in the map.

use crate::index::{CorpusState, DocId, DocRecord};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// BM25 term-frequency saturation.
pub const BM25_K1: f64 = 1.2;
/// BM25 document-length normalization strength.
pub const BM25_B: f64 = 0.75;

pub trait Scorer {
    fn score(&self, query_terms: &[String], corpus: &CorpusState) -> HashMap<DocId, f64>;
}

/// Okapi BM25 with fixed `k1` and `b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bm25;

impl Bm25 {
    pub fn idf(n: f64, df: f64) -> f64 {
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn term_score(idf: f64, tf: f64, doc_len: f64, avg_doc_len: f64) -> f64 {
        let norm = 1.0 - BM25_B + BM25_B * (doc_len / avg_doc_len);
        idf * (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * norm)
    }
}

impl Scorer for Bm25 {
    fn score(&self, query_terms: &[String], corpus: &CorpusState) -> HashMap<DocId, f64> {
        let mut scores = HashMap::new();
        let Some(avg_doc_len) = corpus.average_doc_length() else {
            return scores;
        };
        let n = corpus.document_count() as f64;

        // Repeated query terms contribute once per occurrence.
        for term in query_terms {
            let Some(postings) = corpus.postings(term) else { continue };
            let idf = Self::idf(n, corpus.document_frequency(term) as f64);
            for &doc_id in postings {
                let Some(doc) = corpus.doc(doc_id) else { continue };
                let tf = doc.term_freq.get(term).copied().unwrap_or(0) as f64;
                let s = Self::term_score(idf, tf, doc.doc_length as f64, avg_doc_len);
                *scores.entry(doc_id).or_insert(0.0) += s;
            }
        }
        scores
    }
}

/// TF-IDF weights compared by cosine similarity.
///
/// Term weight is `freq * ln((1 + N) / (1 + df))`. Frequency is deliberately
/// not divided by document length.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfCosine;

impl TfIdfCosine {
    pub fn weight(freq: u64, df: u64, n: u64) -> f64 {
        let tf = freq as f64 / 1.0;
        let idf = ((1 + n) as f64 / (1 + df) as f64).ln();
        tf * idf
    }

    fn doc_weights(doc: &DocRecord, corpus: &CorpusState) -> HashMap<String, f64> {
        let n = corpus.document_count();
        doc.term_freq
            .iter()
            .map(|(term, &freq)| (term.clone(), Self::weight(freq, corpus.document_frequency(term), n)))
            .collect()
    }

    fn query_weights(query_terms: &[String], corpus: &CorpusState) -> HashMap<String, f64> {
        let mut freqs: HashMap<&str, u64> = HashMap::new();
        for term in query_terms {
            *freqs.entry(term.as_str()).or_insert(0) += 1;
        }
        let n = corpus.document_count();
        freqs
            .into_iter()
            .map(|(term, freq)| (term.to_string(), Self::weight(freq, corpus.document_frequency(term), n)))
            .collect()
    }
}

fn norm(weights: &HashMap<String, f64>) -> f64 {
    weights.values().map(|w| w * w).sum::<f64>().sqrt()
}

/// Cosine of two sparse vectors; only shared terms reach the dot product.
pub fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, wa)| large.get(term).map(|wb| wa * wb))
        .sum();
    let denom = norm(a) * norm(b);
    if denom == 0.0 { 0.0 } else { dot / denom }
}

impl Scorer for TfIdfCosine {
    fn score(&self, query_terms: &[String], corpus: &CorpusState) -> HashMap<DocId, f64> {
        let mut scores = HashMap::new();
        if corpus.document_count() == 0 {
            return scores;
        }
        let query = Self::query_weights(query_terms, corpus);
        if norm(&query) == 0.0 {
            return scores;
        }

        let candidates: BTreeSet<DocId> = query_terms
            .iter()
            .filter_map(|t| corpus.postings(t))
            .flatten()
            .copied()
            .collect();
        for doc_id in candidates {
            let Some(doc) = corpus.doc(doc_id) else { continue };
            let weights = Self::doc_weights(doc, corpus);
            if norm(&weights) == 0.0 {
                continue;
            }
            scores.insert(doc_id, cosine(&query, &weights));
        }
        scores
    }
}

/// Ranking strategy, selectable at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Bm25,
    TfIdf,
}

impl Scorer for Strategy {
    fn score(&self, query_terms: &[String], corpus: &CorpusState) -> HashMap<DocId, f64> {
        match self {
            Strategy::Bm25 => Bm25.score(query_terms, corpus),
            Strategy::TfIdf => TfIdfCosine.score(query_terms, corpus),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bm25" => Ok(Strategy::Bm25),
            "tfidf" | "tf-idf" | "cosine" => Ok(Strategy::TfIdf),
            other => Err(format!("unknown ranking strategy `{other}` (expected bm25 or tfidf)")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Bm25 => "bm25",
            Strategy::TfIdf => "tfidf",
        })
    }
}
