use roxmltree::Node;
use tracing::{debug, warn};

use crate::error::ParseFailure;
use crate::outcome::MatchOutcome;
use crate::room::{Instance, LegacyRoom, instance_nodes, read_instance, room_root};
use crate::xml::{
    TextEdit, XmlText, child_element, element_text, insert_attribute, replace_attribute_value,
    replace_element_text,
};

/// What happened to the room-level creation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomCodeOutcome {
    /// Source and destination already agree.
    Unchanged,
    /// Destination code was overwritten.
    Updated,
    /// The export carries no room code.
    NoSource,
    /// The destination room has no `<code>` element to write into.
    MissingField,
}

/// Result of transplanting an exported room into one project room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTransplant {
    /// Rewritten document, present only when something changed.
    pub output: Option<String>,
    /// One outcome per paired index, in order.
    pub outcomes: Vec<(usize, MatchOutcome)>,
    /// `(source, destination)` instance counts when they differ.
    pub length_mismatch: Option<(usize, usize)>,
    pub room_code: RoomCodeOutcome,
    /// Number of instance codes plus room code that actually changed.
    pub fields_changed: usize,
}

/// Destination instance with the location of its code field.
struct PlacedInstance<'a, 'input> {
    node: Node<'a, 'input>,
    instance: Instance,
}

/// Copy exported creation codes into a project-format room.
///
/// Instances are paired by index only: `destination[i]` is compared with
/// `source.instances[i]` by object name and position. A matching pair gets the
/// source code; a differing pair is reported as [`MatchOutcome::KeyMismatch`]
/// (expecting the destination instance, finding the source one) and left
/// alone. Only the common prefix is visited when the lists differ in
/// length. The room code is overwritten whenever the export has one.
///
/// # Errors
///
/// - [`ParseFailure::Malformed`] if the destination is not well-formed XML.
/// - [`ParseFailure::MissingRoot`] if its root is not `<room>`.
/// - [`ParseFailure::InvalidNumber`] if a destination position is not an integer.
pub fn transplant_room(
    destination: &str,
    source: &LegacyRoom,
) -> Result<RoomTransplant, ParseFailure> {
    let xml = XmlText::new(destination);
    let doc = xml.parse()?;
    let root = room_root(&doc)?;

    let placed = instance_nodes(root)
        .map(|node| {
            read_instance(node).map(|instance| PlacedInstance { node, instance })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut edits = Vec::new();
    let mut fields_changed = 0;

    let room_code = match &source.creation_code {
        None => RoomCodeOutcome::NoSource,
        Some(code) => match child_element(root, "code") {
            None => RoomCodeOutcome::MissingField,
            Some(field) if element_text(field) == *code => RoomCodeOutcome::Unchanged,
            Some(field) => match replace_element_text(xml.body(), field, code) {
                Some(edit) => {
                    edits.push(edit);
                    fields_changed += 1;
                    RoomCodeOutcome::Updated
                }
                None => {
                    warn!("could not locate content of room code element");
                    RoomCodeOutcome::MissingField
                }
            },
        },
    };

    let length_mismatch =
        (placed.len() != source.instances.len()).then_some((source.instances.len(), placed.len()));

    let mut outcomes = Vec::with_capacity(placed.len().min(source.instances.len()));
    for (index, (dest, src)) in placed.iter().zip(&source.instances).enumerate() {
        if !dest.instance.same_identity(src) {
            outcomes.push((
                index,
                MatchOutcome::KeyMismatch {
                    expected: dest.instance.identity(),
                    found: src.identity(),
                },
            ));
            continue;
        }

        let outcome = if dest.instance.creation_code == src.creation_code {
            MatchOutcome::Matched { written: 1 }
        } else {
            let edit = code_edit(xml.body(), dest.node, &src.creation_code);
            if edit.is_some() {
                fields_changed += 1;
            } else {
                warn!(index, "could not locate code field of instance");
            }
            write_outcome(edit, &mut edits)
        };
        outcomes.push((index, outcome));
    }

    debug!(
        instances = placed.len(),
        fields_changed, "transplanted room instances"
    );

    Ok(RoomTransplant {
        output: (!edits.is_empty()).then(|| xml.apply(edits)),
        outcomes,
        length_mismatch,
        room_code,
        fields_changed,
    })
}

/// Outcome of writing one instance code. An unlocatable field counts as a
/// destination with no slot for the source code.
fn write_outcome(edit: Option<TextEdit>, edits: &mut Vec<TextEdit>) -> MatchOutcome {
    match edit {
        Some(edit) => {
            edits.push(edit);
            MatchOutcome::Matched { written: 1 }
        }
        None => MatchOutcome::CountMismatch {
            expected: 1,
            actual: 0,
        },
    }
}

/// Edit writing `code` into an instance's code field, in whichever shape the
/// instance uses. A missing field is added as a `code` attribute.
fn code_edit(source: &str, node: Node<'_, '_>, code: &str) -> Option<TextEdit> {
    if let Some(attr) = node.attributes().find(|attr| attr.name() == "code") {
        return replace_attribute_value(source, &attr, code);
    }
    if let Some(element) = child_element(node, "creationCode") {
        return replace_element_text(source, element, code);
    }
    insert_attribute(source, node, "code", code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::InstanceId;

    fn instance(object_name: &str, x: i64, y: i64, code: &str) -> Instance {
        Instance {
            object_name: object_name.into(),
            x,
            y,
            creation_code: code.into(),
        }
    }

    fn project_room(code: &str, instances: &[(&str, i64, i64, &str)]) -> String {
        let mut out = format!(
            "<?xml version=\"1.0\"?>\n<room>\n  <caption></caption>\n  <code>{code}</code>\n  <instances>\n"
        );
        for (name, x, y, code) in instances {
            out.push_str(&format!(
                "    <instance objName=\"{name}\" x=\"{x}\" y=\"{y}\" name=\"inst_{name}\" locked=\"0\" code=\"{code}\" scaleX=\"1\" scaleY=\"1\"/>\n"
            ));
        }
        out.push_str("  </instances>\n</room>\n");
        out
    }

    fn codes(document: &str) -> Vec<String> {
        let doc = roxmltree::Document::parse(document).expect("reparse");
        doc.descendants()
            .filter(|n| n.has_tag_name("instance"))
            .map(|n| n.attribute("code").unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn matching_instances_receive_source_code() {
        let dest = project_room("", &[("obj_a", 0, 0, ""), ("obj_b", 5, 5, "old")]);
        let source = LegacyRoom {
            creation_code: Some(String::new()),
            instances: vec![instance("obj_a", 0, 0, "a();"), instance("obj_b", 5, 5, "b();")],
        };
        let result = transplant_room(&dest, &source).expect("transplant");

        assert_eq!(result.length_mismatch, None);
        assert_eq!(result.room_code, RoomCodeOutcome::Unchanged);
        assert_eq!(result.fields_changed, 2);
        assert_eq!(codes(&result.output.expect("written")), ["a();", "b();"]);
    }

    #[test]
    fn pairing_is_positional_only() {
        let dest = project_room("", &[("A", 0, 0, ""), ("B", 5, 5, "")]);
        let source = LegacyRoom {
            creation_code: None,
            instances: vec![instance("B", 5, 5, "b();"), instance("A", 0, 0, "a();")],
        };
        let result = transplant_room(&dest, &source).expect("transplant");

        assert_eq!(
            result.outcomes,
            [
                (
                    0,
                    MatchOutcome::KeyMismatch {
                        expected: InstanceId::new("A", 0, 0),
                        found: InstanceId::new("B", 5, 5),
                    }
                ),
                (
                    1,
                    MatchOutcome::KeyMismatch {
                        expected: InstanceId::new("B", 5, 5),
                        found: InstanceId::new("A", 0, 0),
                    }
                ),
            ]
        );
        assert!(result.output.is_none());
        assert_eq!(result.room_code, RoomCodeOutcome::NoSource);
    }

    #[test]
    fn length_difference_visits_common_prefix() {
        let dest = project_room("", &[("A", 0, 0, ""), ("B", 1, 1, ""), ("C", 2, 2, "")]);
        let source = LegacyRoom {
            creation_code: None,
            instances: vec![instance("A", 0, 0, "a();")],
        };
        let result = transplant_room(&dest, &source).expect("transplant");
        assert_eq!(result.length_mismatch, Some((1, 3)));
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(codes(&result.output.expect("written")), ["a();", "", ""]);
    }

    #[test]
    fn room_code_is_overwritten() {
        let dest = project_room("old_init();", &[]);
        let source = LegacyRoom {
            creation_code: Some("new_init();\nmusic_play();".into()),
            instances: vec![],
        };
        let result = transplant_room(&dest, &source).expect("transplant");
        assert_eq!(result.room_code, RoomCodeOutcome::Updated);
        let output = result.output.expect("written");
        assert!(output.contains("<code>new_init();\nmusic_play();</code>"));
    }

    #[test]
    fn missing_room_code_element_is_reported() {
        let source = LegacyRoom {
            creation_code: Some("x();".into()),
            instances: vec![],
        };
        let result = transplant_room("<room><instances/></room>", &source).expect("transplant");
        assert_eq!(result.room_code, RoomCodeOutcome::MissingField);
        assert!(result.output.is_none());
    }

    #[test]
    fn missing_code_attribute_is_added() {
        let dest = r#"<room><code/><instances><instance objName="A" x="0" y="0"/></instances></room>"#;
        let source = LegacyRoom {
            creation_code: None,
            instances: vec![instance("A", 0, 0, "hi();")],
        };
        let result = transplant_room(dest, &source).expect("transplant");
        assert_eq!(
            result.output.as_deref(),
            Some(
                r#"<room><code/><instances><instance objName="A" x="0" y="0" code="hi();"/></instances></room>"#
            )
        );
    }

    #[test]
    fn multi_line_instance_code_survives_attribute_escaping() {
        let dest = project_room("", &[("A", 0, 0, "")]);
        let source = LegacyRoom {
            creation_code: None,
            instances: vec![instance("A", 0, 0, "a = \"x\";\r\nb = 2;")],
        };
        let result = transplant_room(&dest, &source).expect("transplant");
        assert_eq!(
            codes(&result.output.expect("written")),
            ["a = \"x\";\r\nb = 2;"]
        );
    }

    #[test]
    fn identical_room_is_not_rewritten() {
        let dest = project_room("init();", &[("A", 0, 0, "a();")]);
        let source = LegacyRoom {
            creation_code: Some("init();".into()),
            instances: vec![instance("A", 0, 0, "a();")],
        };
        let result = transplant_room(&dest, &source).expect("transplant");
        assert!(result.output.is_none());
        assert_eq!(result.outcomes, [(0, MatchOutcome::Matched { written: 1 })]);
    }

    #[test]
    fn unlocatable_code_field_still_yields_an_outcome() {
        let mut edits = Vec::new();
        assert_eq!(
            write_outcome(None, &mut edits),
            MatchOutcome::CountMismatch {
                expected: 1,
                actual: 0
            }
        );
        assert!(edits.is_empty());

        let edit = TextEdit {
            range: 0..0,
            replacement: String::new(),
        };
        assert_eq!(
            write_outcome(Some(edit), &mut edits),
            MatchOutcome::Matched { written: 1 }
        );
        assert_eq!(edits.len(), 1);
    }
}
