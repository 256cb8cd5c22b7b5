use tracing::{debug, warn};

use crate::error::ParseFailure;
use crate::event::{ActionFormat, EventKey, LegacyEventRecord, map_category};
use crate::outcome::MatchOutcome;
use crate::xml::{XmlText, child_element, child_elements, element_text, replace_element_text};

/// Result of transplanting exported events into one object document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventTransplant {
    /// Rewritten document, present only when a slot value changed.
    pub output: Option<String>,
    /// One outcome per destination event, in document order.
    pub outcomes: Vec<(EventKey, MatchOutcome)>,
    /// Source records that no destination event consumed.
    pub unmatched: Vec<EventKey>,
    /// Number of slots whose value actually changed.
    pub slots_changed: usize,
}

/// Copy exported codes into the code slots of a project-format object.
///
/// Each `<event>` under `<object><events>` is keyed by its mapped category,
/// `enumb` and `ename`, and paired with the first record carrying the same
/// key. Slot `i` receives `codes[i]` for the overlapping prefix; a count
/// difference is reported but the assigned slots are kept. Records can be
/// paired with more than one destination event.
///
/// # Errors
///
/// - [`ParseFailure::Malformed`] if the destination is not well-formed XML.
/// - [`ParseFailure::MissingRoot`] if its root is not `<object>`.
pub fn transplant_events(
    destination: &str,
    records: &[LegacyEventRecord],
) -> Result<EventTransplant, ParseFailure> {
    let xml = XmlText::new(destination);
    let doc = xml.parse()?;
    let root = doc.root_element();

    if root.tag_name().name() != "object" {
        return Err(ParseFailure::MissingRoot {
            expected: "object",
            found: root.tag_name().name().to_string(),
        });
    }

    let mut result = EventTransplant::default();
    let mut consumed = vec![false; records.len()];
    let mut edits = Vec::new();

    let events = child_element(root, "events")
        .into_iter()
        .flat_map(|events| child_elements(events, "event"));

    for event in events {
        let (raw_type, id, qualifier) = ActionFormat::Project.raw_key(event);

        let Some(tag) = map_category(raw_type) else {
            result.outcomes.push((
                EventKey::new(raw_type, id, qualifier),
                MatchOutcome::Unmapped {
                    raw_type: raw_type.to_string(),
                },
            ));
            continue;
        };

        let key = EventKey::new(tag.as_str(), id, qualifier);
        let Some(index) = records.iter().position(|record| record.key == key) else {
            result.outcomes.push((key, MatchOutcome::NotFound));
            continue;
        };
        consumed[index] = true;
        let record = &records[index];

        let slots: Vec<_> = ActionFormat::Project.code_slots(event).collect();
        let mut written = 0;
        for (slot, code) in slots.iter().zip(&record.codes) {
            if element_text(*slot) == *code {
                written += 1;
                continue;
            }
            match replace_element_text(xml.body(), *slot, code) {
                Some(edit) => {
                    edits.push(edit);
                    written += 1;
                    result.slots_changed += 1;
                }
                None => warn!(%key, "could not locate content of code slot"),
            }
        }

        let outcome = if written == record.codes.len() && written == slots.len() {
            MatchOutcome::Matched { written }
        } else {
            MatchOutcome::CountMismatch {
                expected: record.codes.len(),
                actual: slots.len(),
            }
        };
        debug!(%key, ?outcome, "matched event");
        result.outcomes.push((key, outcome));
    }

    result.unmatched = records
        .iter()
        .zip(&consumed)
        .filter(|(_, consumed)| !**consumed)
        .map(|(record, _)| record.key.clone())
        .collect();

    if !edits.is_empty() {
        result.output = Some(xml.apply(edits));
    }
    Ok(result)
}
