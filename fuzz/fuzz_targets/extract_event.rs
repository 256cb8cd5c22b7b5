#![no_main]

use gmfix_core::event::{ActionFormat, extract_event, transplant_events};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for format in [ActionFormat::Split, ActionFormat::Project] {
        let _ = extract_event(text, format);
    }

    // Transplanting a document's own codes back into it must be a no-op.
    if let Ok(record) = extract_event(text, ActionFormat::Project) {
        let object = format!("<object><events>{text}</events></object>");
        if let Ok(result) = transplant_events(&object, &[record]) {
            assert!(result.output.is_none());
        }
    }
});
