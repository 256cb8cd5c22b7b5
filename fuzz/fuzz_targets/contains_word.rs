#![no_main]

use gmfix_core::scan::{KeywordGate, find_word, replace_all};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let at = usize::from(split).min(rest.len());
    let (word, text) = rest.split_at(at);

    if let Some(start) = find_word(text, word) {
        let end = start + word.len();
        assert_eq!(&text[start..end], word);
        assert!(start == 0 || !text[start - 1].is_ascii_alphanumeric());
        assert!(end == text.len() || !text[end].is_ascii_alphanumeric());
    }

    let _ = replace_all(text, word, b"exit");
    let _ = KeywordGate::default().apply(text);
});
