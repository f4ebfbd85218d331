//! Filename and extension based language detection
//!
//! Only exact filenames and extensions are consulted; there is no shebang,
//! modeline or content classifier.

mod languages;

pub use languages::LANGUAGES;

use std::collections::HashMap;

/// Label used when no language matches
pub const DEFAULT_LANGUAGE: &str = "Text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageKind {
    Programming,
    Markup,
    Data,
    Prose,
}

/// One entry of the language table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub name: &'static str,
    pub kind: LanguageKind,
    /// Extensions including the leading dot
    pub extensions: &'static [&'static str],
    /// Exact file names
    pub filenames: &'static [&'static str],
}

/// Lookup tables built once from a language table
pub struct LanguageClassifier {
    languages: Vec<Language>,
    by_extension: HashMap<&'static str, Vec<usize>>,
    by_filename: HashMap<&'static str, Vec<usize>>,
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new(LANGUAGES)
    }
}

impl LanguageClassifier {
    pub fn new(languages: &[Language]) -> Self {
        let mut by_extension: HashMap<&'static str, Vec<usize>> = HashMap::new();
        let mut by_filename: HashMap<&'static str, Vec<usize>> = HashMap::new();

        for (idx, lang) in languages.iter().enumerate() {
            for ext in lang.extensions {
                by_extension.entry(*ext).or_default().push(idx);
            }
            for filename in lang.filenames {
                by_filename.entry(*filename).or_default().push(idx);
            }
        }

        Self {
            languages: languages.to_vec(),
            by_extension,
            by_filename,
        }
    }

    pub fn by_filename(&self, path: &str) -> Vec<&Language> {
        self.lookup(&self.by_filename, base_name(path))
    }

    pub fn by_extension(&self, path: &str) -> Vec<&Language> {
        self.lookup(&self.by_extension, extension(path))
    }

    /// An unambiguous filename match wins, otherwise the extension decides
    /// (restricted to the filename matches when there were several).
    pub fn detect(&self, path: &str) -> Option<&Language> {
        let by_filename = self.by_filename(path);
        if by_filename.len() == 1 {
            return Some(by_filename[0]);
        }

        let mut by_extension = self.by_extension(path);
        if by_filename.len() > 1 {
            by_extension.retain(|lang| by_filename.contains(lang));
        }

        by_extension.first().copied()
    }

    /// Language name, or [`DEFAULT_LANGUAGE`]
    pub fn language_name(&self, path: &str) -> &'static str {
        self.detect(path).map(|lang| lang.name).unwrap_or(DEFAULT_LANGUAGE)
    }

    fn lookup(&self, index: &HashMap<&'static str, Vec<usize>>, key: &str) -> Vec<&Language> {
        index
            .get(key)
            .map(|ids| ids.iter().map(|&idx| &self.languages[idx]).collect())
            .unwrap_or_default()
    }
}

/// Last `/`-separated component
fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Extension of the last component, including the dot
fn extension(path: &str) -> &str {
    let name = match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    };
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}
