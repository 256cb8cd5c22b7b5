#![no_main]

use gmfix_core::MatchOutcome;
use gmfix_core::room::{extract_room, transplant_room};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(room) = extract_room(text) else {
        return;
    };
    let Ok(result) = transplant_room(text, &room) else {
        return;
    };

    // Every instance pairs with itself and already holds its own code. Only
    // the room code can differ, when both <creationCode> and <code> exist.
    assert!(result.length_mismatch.is_none());
    assert!(
        result
            .outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, MatchOutcome::Matched { .. }))
    );
    assert!(result.fields_changed <= 1);
});
