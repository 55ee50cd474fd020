//! Strict text decoding for archive entries.

use chardetng::EncodingDetector;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid UTF-8 at byte {valid_up_to} (content looks like {guessed_encoding})")]
pub struct DecodeError {
    /// Length of the longest valid UTF-8 prefix
    pub valid_up_to: usize,

    /// Best guess at the real encoding, for the warning message
    pub guessed_encoding: &'static str,
}

/// Decode `bytes` as UTF-8 without replacement characters.
///
/// A leading byte-order mark is kept as U+FEFF rather than stripped.
pub fn decode_utf8_strict(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Some(text) = encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
    {
        return Ok(text.into_owned());
    }

    let valid_up_to = match std::str::from_utf8(bytes) {
        Ok(_) => bytes.len(),
        Err(err) => err.valid_up_to(),
    };

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guessed_encoding = detector.guess(None, false).name();

    Err(DecodeError { valid_up_to, guessed_encoding })
}
