//! Whole-word scanning over raw script bytes.
//!
//! Scripts are treated as opaque bytes: no tokenizer, no string or comment
//! awareness. A word is "present" when it is bounded on both sides by the
//! start/end of the text or by a byte that is not ASCII alphanumeric.

/// Returns true when `word` occurs in `haystack` as a whole word.
///
/// Every raw occurrence is visited, so `"breakpoint break"` still finds the
/// second, bounded `break`. Empty inputs never match.
#[must_use]
pub fn contains_word(haystack: &[u8], word: &[u8]) -> bool {
    find_word(haystack, word).is_some()
}

/// Byte offset of the first whole-word occurrence of `word`.
#[must_use]
pub fn find_word(haystack: &[u8], word: &[u8]) -> Option<usize> {
    if word.is_empty() || haystack.is_empty() {
        return None;
    }

    let mut from = 0;
    while let Some(offset) = find_bytes(&haystack[from..], word) {
        let start = from + offset;
        let end = start + word.len();

        let bounded_left = start == 0 || !haystack[start - 1].is_ascii_alphanumeric();
        let bounded_right = end == haystack.len() || !haystack[end].is_ascii_alphanumeric();
        if bounded_left && bounded_right {
            return Some(start);
        }

        from = start + 1;
    }

    None
}

/// Replace every raw occurrence of `from` with `to`, ignoring word boundaries.
///
/// Occurrences are consumed left to right without overlap. An empty `from`
/// returns the input unchanged.
#[must_use]
pub fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(offset) = find_bytes(rest, from) {
        out.extend_from_slice(&rest[..offset]);
        out.extend_from_slice(to);
        rest = &rest[offset + from.len()..];
    }
    out.extend_from_slice(rest);
    out
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Verdict of [`KeywordGate::check`] for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The target keyword is not present as a whole word.
    NoTarget,
    /// A stop-word vetoes the rewrite.
    StopWord(String),
    /// The file may be rewritten.
    Rewrite,
}

/// Loop and block keywords whose bodies give `break` a meaning other than
/// "leave the script".
pub const DEFAULT_STOP_WORDS: [&str; 6] = ["for", "while", "repeat", "do", "switch", "with"];

/// Gate-to-touch plus gate-to-skip for a keyword rewrite.
///
/// The rewrite itself is a raw substring replacement; it is only safe because
/// the whole file was first certified free of every stop-word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGate {
    pub target: String,
    pub replacement: String,
    pub stop_words: Vec<String>,
}

impl Default for KeywordGate {
    /// The `break` to `exit` rewrite.
    fn default() -> Self {
        Self {
            target: "break".into(),
            replacement: "exit".into(),
            stop_words: DEFAULT_STOP_WORDS.map(String::from).to_vec(),
        }
    }
}

impl KeywordGate {
    #[must_use]
    pub fn check(&self, data: &[u8]) -> GateDecision {
        if !contains_word(data, self.target.as_bytes()) {
            return GateDecision::NoTarget;
        }

        self.stop_words
            .iter()
            .find(|word| contains_word(data, word.as_bytes()))
            .map_or(GateDecision::Rewrite, |word| {
                GateDecision::StopWord(word.clone())
            })
    }

    /// Apply the gate and, when it passes, the rewrite.
    #[must_use]
    pub fn apply(&self, data: &[u8]) -> (GateDecision, Option<Vec<u8>>) {
        let decision = self.check(data);
        let rewritten = matches!(decision, GateDecision::Rewrite).then(|| {
            replace_all(
                data,
                self.target.as_bytes(),
                self.replacement.as_bytes(),
            )
        });
        (decision, rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> KeywordGate {
        KeywordGate::default()
    }

    #[test]
    fn empty_inputs_never_match() {
        assert!(!contains_word(b"", b"break"));
        assert!(!contains_word(b"break", b""));
        assert!(!contains_word(b"", b""));
    }

    #[test]
    fn punctuation_bounds_a_word() {
        assert!(contains_word(b"break;", b"break"));
        assert!(contains_word(b"a break b", b"break"));
        assert!(contains_word(b"(break)", b"break"));
        assert!(contains_word(b"break", b"break"));
    }

    #[test]
    fn substrings_are_not_words() {
        assert!(!contains_word(b"breakpoint", b"break"));
        assert!(!contains_word(b"nobreak", b"break"));
        assert!(!contains_word(b"break2", b"break"));
    }

    #[test]
    fn later_bounded_hit_is_found_after_unbounded_one() {
        assert!(contains_word(b"breakpoint; break;", b"break"));
        assert_eq!(find_word(b"breakpoint; break;", b"break"), Some(12));
    }

    #[test]
    fn overlapping_candidates_are_all_visited() {
        // "dodo do": the first two raw hits are glued to letters.
        assert_eq!(find_word(b"dodo do", b"do"), Some(5));
    }

    #[test]
    fn underscore_is_a_boundary() {
        assert!(contains_word(b"my_break", b"break"));
    }

    #[test]
    fn replace_all_ignores_boundaries() {
        assert_eq!(
            replace_all(b"break; breakpoint", b"break", b"exit"),
            b"exit; exitpoint".to_vec()
        );
        assert_eq!(replace_all(b"abc", b"", b"x"), b"abc".to_vec());
        assert_eq!(replace_all(b"aaa", b"aa", b"b"), b"ba".to_vec());
    }

    #[test]
    fn gate_skips_files_without_target() {
        assert_eq!(gate().check(b"x = breakpoint;"), GateDecision::NoTarget);
    }

    #[test]
    fn gate_vetoes_on_stop_word() {
        let data = b"switch (a) { case 1: break; }";
        assert_eq!(gate().check(data), GateDecision::StopWord("switch".into()));
        let (_, rewritten) = gate().apply(data);
        assert!(rewritten.is_none());
    }

    #[test]
    fn stop_word_inside_identifier_does_not_veto() {
        let data = b"if (doors > 0) break;";
        let (decision, rewritten) = gate().apply(data);
        assert_eq!(decision, GateDecision::Rewrite);
        assert_eq!(rewritten.as_deref(), Some(&b"if (doors > 0) exit;"[..]));
    }
}
