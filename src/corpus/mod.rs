//! Verse reference data.
//!
//! A corpus is loaded once and never mutated. Verse indices are assigned from
//! array position, so every sura's verses run 1..=n without gaps.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HifzError, HifzResult};

const SAMPLE_CORPUS: &str = include_str!("../../assets/sample-corpus.json");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verse {
    pub sura_index: u32,
    /// 1-based within the sura.
    pub verse_index: usize,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sura {
    pub index: u32,
    pub name: Option<String>,
    verses: Vec<Verse>,
}

impl Sura {
    pub fn new<S: Into<String>>(index: u32, name: Option<String>, verses: Vec<S>) -> Self {
        let verses = verses
            .into_iter()
            .enumerate()
            .map(|(i, text)| Verse {
                sura_index: index,
                verse_index: i + 1,
                text: text.into(),
            })
            .collect();
        Self {
            index,
            name,
            verses,
        }
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    pub fn verse_count(&self) -> usize {
        self.verses.len()
    }

    /// Verses `start..=end`, clipped to the sura.
    pub fn span(&self, start: usize, end: usize) -> &[Verse] {
        let lo = start.max(1) - 1;
        let hi = end.min(self.verses.len());
        if lo >= hi {
            return &[];
        }
        &self.verses[lo..hi]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corpus {
    suras: Vec<Sura>,
}

/// On-disk JSON shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorpusFile {
    pub suras: Vec<SuraFile>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuraFile {
    pub index: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub verses: Vec<String>,
}

impl Corpus {
    /// Rejects an empty corpus, duplicate sura indices and suras without verses.
    pub fn new(suras: Vec<Sura>) -> HifzResult<Self> {
        if suras.is_empty() {
            return Err(HifzError::InvalidCorpus("corpus has no suras".to_string()));
        }
        let mut seen = HashSet::new();
        for sura in &suras {
            if !seen.insert(sura.index) {
                return Err(HifzError::InvalidCorpus(format!(
                    "duplicate sura index {}",
                    sura.index
                )));
            }
            if sura.verses.is_empty() {
                return Err(HifzError::InvalidCorpus(format!(
                    "sura {} has no verses",
                    sura.index
                )));
            }
        }
        Ok(Self { suras })
    }

    pub fn from_json_str(json: &str) -> HifzResult<Self> {
        let file: CorpusFile = serde_json::from_str(json)?;
        Self::new(
            file.suras
                .into_iter()
                .map(|s| Sura::new(s.index, s.name, s.verses))
                .collect(),
        )
    }

    pub fn load(path: &Path) -> HifzResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Al-Fatiha and Al-Ikhlas, bundled with the binary.
    pub fn sample() -> HifzResult<Self> {
        Self::from_json_str(SAMPLE_CORPUS)
    }

    pub fn suras(&self) -> &[Sura] {
        &self.suras
    }

    pub fn sura(&self, index: u32) -> Option<&Sura> {
        self.suras.iter().find(|s| s.index == index)
    }

    pub fn is_last_sura(&self, index: u32) -> bool {
        self.suras.last().is_some_and(|s| s.index == index)
    }

    pub fn total_verses(&self) -> usize {
        self.suras.iter().map(Sura::verse_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_corpus_loads() {
        let corpus = Corpus::sample().unwrap();
        assert_eq!(corpus.suras().len(), 2);
        assert_eq!(corpus.sura(1).unwrap().verse_count(), 7);
        assert_eq!(corpus.sura(112).unwrap().verse_count(), 4);
        assert_eq!(corpus.total_verses(), 11);
        assert!(corpus.is_last_sura(112));
        assert!(!corpus.is_last_sura(1));
    }

    #[test]
    fn test_verse_indices_are_contiguous_from_one() {
        let corpus = Corpus::sample().unwrap();
        for sura in corpus.suras() {
            for (i, verse) in sura.verses().iter().enumerate() {
                assert_eq!(verse.verse_index, i + 1);
                assert_eq!(verse.sura_index, sura.index);
            }
        }
    }

    #[test]
    fn test_span_clips_to_sura() {
        let sura = Sura::new(1, None, vec!["a", "b", "c"]);
        assert_eq!(sura.span(2, 10).len(), 2);
        assert_eq!(sura.span(0, 1).len(), 1);
        assert!(sura.span(4, 5).is_empty());
    }

    #[test]
    fn test_rejects_duplicate_sura_index() {
        let err = Corpus::new(vec![
            Sura::new(1, None, vec!["a"]),
            Sura::new(1, None, vec!["b"]),
        ])
        .unwrap_err();
        assert!(matches!(err, HifzError::InvalidCorpus(_)));
    }

    #[test]
    fn test_rejects_empty_sura_and_empty_corpus() {
        assert!(Corpus::new(Vec::new()).is_err());
        assert!(Corpus::new(vec![Sura::new(2, None, Vec::<String>::new())]).is_err());
    }

    #[test]
    fn test_name_is_optional_in_json() {
        let corpus = Corpus::from_json_str(r#"{"suras":[{"index":3,"verses":["الم"]}]}"#).unwrap();
        assert_eq!(corpus.sura(3).unwrap().name, None);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = Corpus::from_json_str("{\"suras\": 7}").unwrap_err();
        assert!(matches!(err, HifzError::Json(_)));
    }
}
