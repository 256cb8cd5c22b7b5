use gmfix_core::scan::{GateDecision, KeywordGate, contains_word, find_word, replace_all};
use gmfix_core::xml::{XmlText, element_text, replace_element_text};
use proptest::prelude::*;

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn script() -> impl Strategy<Value = String> {
    "[ -~\n\t]{0,80}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    #[test]
    fn empty_inputs_never_match(text in script(), w in word()) {
        prop_assert!(!contains_word(text.as_bytes(), b""));
        prop_assert!(!contains_word(b"", w.as_bytes()));
    }

    #[test]
    fn found_word_is_bounded(text in script(), w in word()) {
        if let Some(at) = find_word(text.as_bytes(), w.as_bytes()) {
            let bytes = text.as_bytes();
            let end = at + w.len();
            prop_assert_eq!(&bytes[at..end], w.as_bytes());
            prop_assert!(at == 0 || !bytes[at - 1].is_ascii_alphanumeric());
            prop_assert!(end == bytes.len() || !bytes[end].is_ascii_alphanumeric());
        }
    }

    #[test]
    fn separated_word_is_always_found(prefix in script(), suffix in script(), w in word()) {
        let text = format!("{prefix};{w}({suffix}");
        prop_assert!(contains_word(text.as_bytes(), w.as_bytes()));
    }

    #[test]
    fn glued_word_is_never_found(w in word()) {
        let text = format!("x{w}y");
        prop_assert!(!contains_word(text.as_bytes(), w.as_bytes()));
    }

    #[test]
    fn replacing_with_itself_is_identity(text in script(), from in word()) {
        prop_assert_eq!(
            replace_all(text.as_bytes(), from.as_bytes(), from.as_bytes()),
            text.as_bytes().to_vec()
        );
    }

    #[test]
    fn rewritten_files_never_held_a_stop_word(text in script()) {
        let gate = KeywordGate::default();
        let (decision, rewritten) = gate.apply(text.as_bytes());
        match decision {
            GateDecision::Rewrite => {
                prop_assert!(rewritten.is_some());
                for stop in &gate.stop_words {
                    prop_assert!(!contains_word(text.as_bytes(), stop.as_bytes()));
                }
            }
            GateDecision::NoTarget | GateDecision::StopWord(_) => prop_assert!(rewritten.is_none()),
        }
    }

    #[test]
    fn element_content_survives_splice(code in "[ -~\r\n\t]{0,60}") {
        let source = "<object><action><string>old</string></action></object>";
        let xml = XmlText::new(source);
        let doc = xml.parse().expect("parse");
        let node = doc.descendants().find(|n| n.has_tag_name("string")).expect("slot");
        let edit = replace_element_text(xml.body(), node, &code).expect("edit");
        let output = xml.apply(vec![edit]);

        let reparsed = roxmltree::Document::parse(&output).expect("reparse");
        let slot = reparsed.descendants().find(|n| n.has_tag_name("string")).expect("slot");
        prop_assert_eq!(element_text(slot), code);
    }
}
