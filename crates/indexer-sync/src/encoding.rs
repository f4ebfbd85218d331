//! Best-effort conversion of repository bytes to UTF-8 text

use encoding_rs::{Encoding, BIG5, EUC_KR, GB18030, SHIFT_JIS, UTF_8};
use std::borrow::Cow;

/// Reasons a conversion produced no text; always recovered by the caller
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Couldn't guess charset")]
    NoCandidate,

    #[error("Failed to convert from {0} to UTF-8")]
    Unconvertible(&'static str),
}

/// Guesses the charset of a byte buffer
pub trait CharsetDetector: Send + Sync {
    /// Candidate encodings, most likely first
    fn guess(&self, bytes: &[u8]) -> Vec<&'static Encoding>;
}

/// Legacy double-byte encodings whose decoders reject malformed input
fn strict_multibyte() -> [&'static Encoding; 4] {
    [GB18030, SHIFT_JIS, EUC_KR, BIG5]
}

/// Statistical detection through `chardetng`
///
/// Candidates, in order:
/// 1. UTF-8 when the input is valid UTF-8
/// 2. the `chardetng` guess, when it can be trusted
/// 3. the strict double-byte encodings
/// 4. the `chardetng` guess
///
/// A single-byte guess decodes anything, so it only goes ahead of the
/// double-byte encodings when some run of non-ASCII bytes has an odd length.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChardetngDetector;

impl CharsetDetector for ChardetngDetector {
    fn guess(&self, bytes: &[u8]) -> Vec<&'static Encoding> {
        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(bytes, true);
        let (guessed, confident) = detector.guess_assess(None, true);

        let mut candidates = Vec::with_capacity(6);
        let mut push = |encoding: &'static Encoding| {
            if !candidates.contains(&encoding) {
                candidates.push(encoding);
            }
        };

        // chardetng can still prefer a legacy encoding for short valid UTF-8
        if std::str::from_utf8(bytes).is_ok() {
            push(UTF_8);
        }
        if confident && (!guessed.is_single_byte() || !high_bytes_paired(bytes)) {
            push(guessed);
        }
        for encoding in strict_multibyte() {
            push(encoding);
        }
        push(guessed);

        candidates
    }
}

/// Whether every run of non-ASCII bytes has an even length
fn high_bytes_paired(bytes: &[u8]) -> bool {
    bytes.split(u8::is_ascii).all(|run| run.len() % 2 == 0)
}

/// Fixed candidate list, regardless of input
#[derive(Debug, Clone, Default)]
pub struct FixedDetector(pub Vec<&'static Encoding>);

impl CharsetDetector for FixedDetector {
    fn guess(&self, _bytes: &[u8]) -> Vec<&'static Encoding> {
        self.0.clone()
    }
}

/// Converts content and metadata of unknown charset to UTF-8
pub struct CharsetNormalizer {
    detector: Box<dyn CharsetDetector>,
}

impl Default for CharsetNormalizer {
    fn default() -> Self {
        Self::new(Box::new(ChardetngDetector))
    }
}

impl CharsetNormalizer {
    pub fn new(detector: Box<dyn CharsetDetector>) -> Self {
        Self { detector }
    }

    /// Decodes with the first candidate that converts without errors
    pub fn try_normalize<'b>(&self, bytes: &'b [u8]) -> Result<Cow<'b, str>, EncodingError> {
        if bytes.is_empty() {
            return Ok(Cow::Borrowed(""));
        }

        let candidates = self.detector.guess(bytes);
        let first = candidates.first().ok_or(EncodingError::NoCandidate)?;

        for encoding in &candidates {
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
                return Ok(text);
            }
        }

        Err(EncodingError::Unconvertible(first.name()))
    }

    /// Never fails: falls back to the input, with invalid sequences replaced
    pub fn normalize_bytes(&self, bytes: &[u8]) -> String {
        match self.try_normalize(bytes) {
            Ok(text) => text.into_owned(),
            Err(e) => {
                log::warn!("{}; passing content through", e);
                String::from_utf8_lossy(bytes).into_owned()
            }
        }
    }

    pub fn normalize_str(&self, s: &str) -> String {
        self.normalize_bytes(s.as_bytes())
    }
}
