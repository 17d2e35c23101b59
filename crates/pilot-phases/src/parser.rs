//! Structured-block extraction from raw completion text
//!
//! Model responses wrap their JSON payload in prose, code fences, or
//! both. The parser scans for balanced top-level `{...}` blocks
//! (string- and escape-aware), decodes each candidate against the
//! expected schema, and returns the first that validates. No valid
//! block is an explicit failure; there is no silent empty default.

use serde::de::DeserializeOwned;

/// No usable structured block in a response
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    /// The text contained no balanced JSON object at all
    #[error("response contains no JSON block")]
    NoBlock,

    /// Blocks were found but none decoded against the expected schema
    #[error("none of {candidates} JSON block(s) matched the schema: {last_error}")]
    SchemaMismatch {
        candidates: usize,
        /// Decode error from the last candidate tried
        last_error: String,
    },
}

/// Decode the first well-formed JSON block in `raw` as a `T`
///
/// Fail-closed: schema violations (unknown enum variants, out-of-range
/// bounded scores, missing fields) reject the candidate rather than
/// defaulting it.
pub fn extract_first<T: DeserializeOwned>(raw: &str) -> Result<T, ParseFailure> {
    let mut candidates = 0usize;
    let mut last_error = None;

    for block in JsonBlocks::new(raw) {
        candidates += 1;
        match serde_json::from_str::<T>(block) {
            Ok(value) => return Ok(value),
            Err(err) => last_error = Some(err.to_string()),
        }
    }

    match last_error {
        None => Err(ParseFailure::NoBlock),
        Some(last_error) => Err(ParseFailure::SchemaMismatch {
            candidates,
            last_error,
        }),
    }
}

/// Iterator over balanced top-level `{...}` slices of a string
struct JsonBlocks<'a> {
    raw: &'a str,
    pos: usize,
}

impl<'a> JsonBlocks<'a> {
    fn new(raw: &'a str) -> Self {
        Self { raw, pos: 0 }
    }
}

impl<'a> Iterator for JsonBlocks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.raw.as_bytes();
        while self.pos < bytes.len() {
            if bytes[self.pos] != b'{' {
                self.pos += 1;
                continue;
            }
            let start = self.pos;
            let mut depth = 0usize;
            let mut in_string = false;
            let mut escaped = false;
            let mut i = start;
            while i < bytes.len() {
                let b = bytes[i];
                if in_string {
                    if escaped {
                        escaped = false;
                    } else if b == b'\\' {
                        escaped = true;
                    } else if b == b'"' {
                        in_string = false;
                    }
                } else {
                    match b {
                        b'"' => in_string = true,
                        b'{' => depth += 1,
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                self.pos = i + 1;
                                return Some(&self.raw[start..=i]);
                            }
                        }
                        _ => {}
                    }
                }
                i += 1;
            }
            // Unbalanced from here to the end; skip the opening brace
            self.pos = start + 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        ok: bool,
        score: u8,
    }

    #[test]
    fn decodes_block_wrapped_in_prose_and_fences() {
        let raw = "Here is my answer:\n```json\n{\"ok\": true, \"score\": 7}\n```\nHope that helps!";
        let v: Verdict = extract_first(raw).unwrap();
        assert_eq!(v, Verdict { ok: true, score: 7 });
    }

    #[test]
    fn first_valid_block_wins() {
        let raw = r#"{"unrelated": 1} {"ok": false, "score": 3} {"ok": true, "score": 9}"#;
        let v: Verdict = extract_first(raw).unwrap();
        assert_eq!(v.score, 3);
    }

    #[test]
    fn nested_and_string_braces_stay_balanced() {
        let raw = r#"{"ok": true, "score": 2, "extra": {"note": "a } in \" a string"}}"#;
        let v: Verdict = extract_first(raw).unwrap();
        assert_eq!(v.score, 2);
    }

    #[test]
    fn no_block_is_explicit_failure() {
        let err = extract_first::<Verdict>("just words, no json").unwrap_err();
        assert!(matches!(err, ParseFailure::NoBlock));
    }

    #[test]
    fn schema_mismatch_reports_candidate_count() {
        let err = extract_first::<Verdict>(r#"{"a":1} {"b":2}"#).unwrap_err();
        match err {
            ParseFailure::SchemaMismatch { candidates, .. } => assert_eq!(candidates, 2),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn unbalanced_block_does_not_hide_later_valid_one() {
        let raw = r#"{"broken": {"ok": true, "score": 5}"#;
        // The outer block never closes; the scanner resumes inside it
        let v: Verdict = extract_first(raw).unwrap();
        assert_eq!(v.score, 5);
    }

    proptest::proptest! {
        #[test]
        fn never_panics_on_arbitrary_text(raw in ".*") {
            let _ = extract_first::<serde_json::Value>(&raw);
        }

        #[test]
        fn valid_json_embedded_anywhere_is_found(prefix in "[^{}]*", suffix in "[^{}]*") {
            let raw = format!("{prefix}{{\"ok\": true, \"score\": 4}}{suffix}");
            let v: Verdict = extract_first(&raw).unwrap();
            proptest::prop_assert_eq!(v.score, 4);
        }
    }
}
