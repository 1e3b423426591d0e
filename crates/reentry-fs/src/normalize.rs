//! Content normalization and hashing for dirty detection
//!
//! Two bodies that differ only by EOL style or a trailing newline are
//! treated as identical everywhere "did this change" is asked, so both
//! equality and hashing operate on the normalized form.

use sha2::{Digest, Sha256};

/// Normalize text for comparison: CRLF becomes LF and a trailing newline
/// is appended if missing.
pub fn normalize(text: &str) -> String {
    let mut normalized = text.replace("\r\n", "\n");
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

/// Compare two bodies under normalization.
pub fn text_eq(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Compute the hex-encoded SHA-256 hash of the normalized text.
///
/// Agrees with [`text_eq`]: bodies that compare equal hash identically.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_converts_crlf_and_appends_newline() {
        assert_eq!(normalize("a\r\nb"), "a\nb\n");
        assert_eq!(normalize("a\nb\n"), "a\nb\n");
        assert_eq!(normalize(""), "\n");
    }

    #[test]
    fn eol_style_does_not_affect_equality() {
        assert!(text_eq("line one\r\nline two\r\n", "line one\nline two"));
        assert!(!text_eq("line one", "line two"));
    }

    #[test]
    fn hash_known_value() {
        assert_eq!(
            content_hash("hello world"),
            "a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447"
        );
    }

    #[test]
    fn hash_agrees_with_equality() {
        let a = "status: ready\r\n";
        let b = "status: ready";
        assert!(text_eq(a, b));
        assert_eq!(content_hash(a), content_hash(b));
    }

    #[test]
    fn different_content_different_hash() {
        assert_ne!(content_hash("aaa"), content_hash("bbb"));
    }
}
