use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Split text on whitespace. No punctuation stripping and no case folding.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

pub fn stem(token: &str) -> String { STEMMER.stem(token).into_owned() }

/// Stopword filter plus English stemmer, applied identically to documents and queries.
///
/// The default instance uses the built-in stopword list. Extra stopwords are
/// matched case-sensitively, exactly as supplied.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    extra_stopwords: HashSet<String>,
}

impl Analyzer {
    pub fn new() -> Self { Self::default() }

    pub fn with_extra_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { extra_stopwords: words.into_iter().map(Into::into).collect() }
    }

    fn discards(&self, token: &str) -> bool {
        is_stopword(token) || self.extra_stopwords.contains(token)
    }

    /// Drop stopwords and stem the rest. Order and duplicates are preserved.
    pub fn normalize<'a, I>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tokens
            .into_iter()
            .filter(|token| !self.discards(token))
            .map(stem)
            .collect()
    }

    /// Tokenize then normalize.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.normalize(tokenize(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_whitespace() {
        assert_eq!(tokenize("  cat\tsat\n\nmat  "), vec!["cat", "sat", "mat"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\r\n").is_empty());
    }

    #[test]
    fn keeps_punctuation_and_case() {
        assert_eq!(tokenize("Hello, World!"), vec!["Hello,", "World!"]);
    }

    #[test]
    fn stems_morphological_variants() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.analyze("running runs run"), vec!["run", "run", "run"]);
    }

    #[test]
    fn drops_stopwords_case_sensitively() {
        let analyzer = Analyzer::new();
        assert!(analyzer.analyze("the a an").is_empty());
        // "The" is not in the lowercase list.
        assert_eq!(analyzer.analyze("The cat").len(), 2);
    }

    #[test]
    fn extra_stopwords_extend_the_default_list() {
        let analyzer = Analyzer::with_extra_stopwords(["lorem", "ipsum"]);
        assert_eq!(analyzer.analyze("lorem ipsum the dolor"), vec![stem("dolor")]);
    }
}
