use docsearch_core::{rank, Analyzer, Corpus, CorpusState, DocId, Strategy, TrainStatus, TOP_K};
use std::sync::Arc;
use std::thread;

/// Every aggregate statistic, in a comparable order.
fn fingerprint(state: &CorpusState) -> (u64, u64, Vec<(String, Vec<DocId>, u64)>) {
    let mut vocab: Vec<(String, Vec<DocId>, u64)> = state
        .terms()
        .map(|t| {
            let docs: Vec<DocId> = state.postings(t).map(|p| p.iter().copied().collect()).unwrap_or_default();
            (t.to_string(), docs, state.document_frequency(t))
        })
        .collect();
    vocab.sort();
    (state.document_count(), state.total_term_count(), vocab)
}

#[test]
fn retraining_identical_bytes_changes_nothing() {
    let corpus = Corpus::new();
    let first = corpus.train(vec![("a.txt", "the quick brown fox"), ("b.txt", "lazy dogs sleeping")]);
    let before = fingerprint(&corpus.read());

    let second = corpus.train(vec![("renamed.txt", "the quick brown fox")]);
    assert_eq!(second[0].status, TrainStatus::AlreadyTrained);
    assert_eq!(second[0].doc_id, first[0].doc_id);
    assert_eq!(second[0].doc_name, "renamed.txt");
    assert_eq!(fingerprint(&corpus.read()), before);
}

#[test]
fn same_bytes_under_two_names() {
    let corpus = Corpus::new();
    let a = corpus.train(vec![("one", b"shared content".to_vec())]);
    let b = corpus.train(vec![("two", b"shared content".to_vec())]);
    assert_eq!(a[0].status, TrainStatus::Trained);
    assert_eq!(b[0].status, TrainStatus::AlreadyTrained);
    assert_eq!(a[0].doc_id, b[0].doc_id);
}

#[test]
fn stopword_only_document_is_never_indexed() {
    let corpus = Corpus::new();
    let out = corpus.train(vec![("stop.txt", "the a an")]);
    assert_eq!(out[0].status, TrainStatus::TrainingNotRequired);
    assert_eq!(out[0].doc_id, None);
    assert_eq!(corpus.stats().document_count, 0);

    corpus.train(vec![("real.txt", "the cat")]);
    let ranked = rank(&corpus, "the cat", Strategy::Bm25);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].doc_name, "real.txt");
    assert_eq!(ranked[0].doc_id, 1);
}

#[test]
fn ids_are_sequential_across_batches() {
    let corpus = Corpus::new();
    let mut ids = Vec::new();
    for batch in [vec!["alpha", "beta", "the"], vec!["gamma", "alpha"], vec!["delta"]] {
        let named: Vec<(String, &str)> = batch.iter().map(|c| (format!("{c}.txt"), *c)).collect();
        ids.extend(
            corpus
                .train(named)
                .into_iter()
                .filter(|o| o.status == TrainStatus::Trained)
                .filter_map(|o| o.doc_id),
        );
    }
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(corpus.stats().document_count, 4);
}

#[test]
fn shared_term_scenario_ranks_both_in_id_order() {
    let corpus = Corpus::new();
    corpus.train(vec![("doc1", "cat sat mat")]);
    corpus.train(vec![("doc2", "dog sat log")]);

    let ranked = rank(&corpus, "sat", Strategy::Bm25);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].doc_name, "doc1");
    assert_eq!(ranked[1].doc_name, "doc2");
    assert!(ranked[0].score > 0.0);
    assert_eq!(ranked[0].score, ranked[1].score);
}

#[test]
fn tfidf_strategy_ranks_through_the_same_pipeline() {
    let corpus = Corpus::new();
    corpus.train(vec![("runner", "running fast"), ("walker", "walking slow"), ("other", "swimming pool")]);
    let ranked = rank(&corpus, "runs", Strategy::TfIdf);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].doc_name, "runner");
}

#[test]
fn query_stemming_matches_document_stemming() {
    let corpus = Corpus::new();
    corpus.train(vec![("doc", "the runner was running")]);
    assert_eq!(rank(&corpus, "run", Strategy::Bm25).len(), 1);
    assert_eq!(rank(&corpus, "runs", Strategy::Bm25).len(), 1);
}

#[test]
fn ranking_is_deterministic_and_capped() {
    let corpus = Corpus::new();
    let docs: Vec<(String, String)> = (0..30).map(|i| (format!("d{i}"), format!("common filler{i}"))).collect();
    corpus.train(docs);

    let first = rank(&corpus, "common", Strategy::Bm25);
    let second = rank(&corpus, "common", Strategy::Bm25);
    assert_eq!(first, second);
    assert_eq!(first.len(), TOP_K);
    let ids: Vec<DocId> = first.iter().map(|r| r.doc_id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[test]
fn custom_stopwords_apply_to_queries_too() {
    let corpus = Corpus::with_analyzer(Analyzer::with_extra_stopwords(["acme"]));
    let out = corpus.train(vec![("brand", "acme acme"), ("product", "acme widget")]);
    assert_eq!(out[0].status, TrainStatus::TrainingNotRequired);
    assert!(rank(&corpus, "acme", Strategy::Bm25).is_empty());
    assert_eq!(rank(&corpus, "acme widget", Strategy::Bm25).len(), 1);
}

#[test]
fn invalid_utf8_is_indexed_lossily() {
    let corpus = Corpus::new();
    let out = corpus.train(vec![("bin", vec![0x66, 0x6f, 0x6f, 0x20, 0xff, 0xfe])]);
    assert_eq!(out[0].status, TrainStatus::Trained);
    assert_eq!(rank(&corpus, "foo", Strategy::Bm25).len(), 1);
}

#[test]
fn concurrent_training_keeps_ids_dense() {
    let corpus = Arc::new(Corpus::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let corpus = Arc::clone(&corpus);
            thread::spawn(move || {
                let batch: Vec<(String, String)> =
                    (0..25).map(|i| (format!("t{t}-{i}"), format!("thread{t} item{i} common"))).collect();
                corpus.train(batch)
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let corpus = Arc::clone(&corpus);
            thread::spawn(move || {
                for _ in 0..50 {
                    let state = corpus.read();
                    let sum: u64 = state.docs().iter().map(|d| d.doc_length).sum();
                    assert_eq!(sum, state.total_term_count());
                    drop(state);
                    let _ = rank(&corpus, "common", Strategy::Bm25);
                }
            })
        })
        .collect();

    let mut ids: Vec<DocId> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .filter_map(|o| o.doc_id)
        .collect();
    for r in readers {
        r.join().unwrap();
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=200).collect::<Vec<_>>());

    let state = corpus.read();
    assert_eq!(state.document_frequency("common"), 200);
    for (i, doc) in state.docs().iter().enumerate() {
        assert_eq!(doc.doc_id, i as DocId + 1);
    }
}
