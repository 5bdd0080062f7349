use criterion::{criterion_group, criterion_main, Criterion};
use docsearch_core::{rank, Analyzer, Corpus, Strategy};

const WORDS: &[&str] = &[
    "index", "search", "ranking", "document", "running", "systems", "memory", "query", "engine",
    "term", "frequency", "inverse", "posting", "corpus", "stemmed", "tokens", "the", "and", "of",
];

fn synthetic_doc(seed: usize, len: usize) -> String {
    let mut words: Vec<&str> = (0..len).map(|i| WORDS[(seed * 31 + i * 7) % WORDS.len()]).collect();
    let marker = format!("unique{seed}");
    words.push(&marker);
    words.join(" ")
}

fn build_corpus(docs: usize) -> Corpus {
    let corpus = Corpus::new();
    corpus.train((0..docs).map(|i| (format!("doc{i}"), synthetic_doc(i, 200))));
    corpus
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = Analyzer::new();
    let text = synthetic_doc(7, 5_000);
    c.bench_function("analyze_5k_tokens", |b| b.iter(|| analyzer.analyze(&text)));
}

fn bench_rank(c: &mut Criterion) {
    let corpus = build_corpus(2_000);
    c.bench_function("rank_bm25_2k_docs", |b| b.iter(|| rank(&corpus, "ranking engine memory", Strategy::Bm25)));
    c.bench_function("rank_tfidf_2k_docs", |b| b.iter(|| rank(&corpus, "ranking engine memory", Strategy::TfIdf)));
}

criterion_group!(benches, bench_analyze, bench_rank);
criterion_main!(benches);
