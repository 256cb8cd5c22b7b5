use tracing::debug;

use crate::error::ParseFailure;
use crate::event::{ActionFormat, LegacyEventRecord};
use crate::xml::{XmlText, element_text};

/// Parse one per-event document into a [`LegacyEventRecord`].
///
/// Key attributes are copied verbatim; codes are collected from every action
/// whose kind matches the sentinel of `format`, in document order.
///
/// # Errors
///
/// - [`ParseFailure::Malformed`] if the text is not well-formed XML.
/// - [`ParseFailure::MissingRoot`] if the root element is not `<event>`.
/// - [`ParseFailure::UnmappedCategory`] for a project-format event with an
///   unknown category.
pub fn extract_event(text: &str, format: ActionFormat) -> Result<LegacyEventRecord, ParseFailure> {
    let xml = XmlText::new(text);
    let doc = xml.parse()?;
    let root = doc.root_element();

    if root.tag_name().name() != "event" {
        return Err(ParseFailure::MissingRoot {
            expected: "event",
            found: root.tag_name().name().to_string(),
        });
    }

    let key = format.event_key(root)?;
    let codes: Vec<String> = format.code_slots(root).map(element_text).collect();
    debug!(%key, codes = codes.len(), "extracted event");

    Ok(LegacyEventRecord { key, codes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKey;

    const COLLISION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<event category="COLLISION" id="0" with="obj_wall">
  <actions>
    <action>
      <kind>CODE</kind>
      <arguments>
        <argument kind="STRING">hspeed = 0;
vspeed = 0;</argument>
      </arguments>
    </action>
    <action>
      <kind>NORMAL</kind>
      <arguments><argument kind="STRING">ignored</argument></arguments>
    </action>
    <action>
      <kind>CODE</kind>
      <arguments><argument kind="STRING">if (a &lt; b) instance_destroy();</argument></arguments>
    </action>
  </actions>
</event>"#;

    #[test]
    fn split_event_collects_code_actions_in_order() {
        let record = extract_event(COLLISION, ActionFormat::Split).expect("extract");
        assert_eq!(record.key, EventKey::new("COLLISION", "0", "obj_wall"));
        assert_eq!(
            record.codes,
            ["hspeed = 0;\nvspeed = 0;", "if (a < b) instance_destroy();"]
        );
    }

    #[test]
    fn attributes_are_not_coerced() {
        let record = extract_event(
            r#"<event category="ALARM" id="007"/>"#,
            ActionFormat::Split,
        )
        .expect("extract");
        assert_eq!(record.key, EventKey::new("ALARM", "007", ""));
        assert!(record.codes.is_empty());
    }

    #[test]
    fn project_sentinel_differs_from_split_sentinel() {
        let text = r#"<event eventtype="3" enumb="0">
            <action><kind>7</kind><arguments><argument><kind>1</kind><string>step();</string></argument></arguments></action>
            <action><kind>CODE</kind><arguments><argument>nope</argument></arguments></action>
        </event>"#;

        let project = extract_event(text, ActionFormat::Project).expect("project");
        assert_eq!(project.key, EventKey::new("STEP", "0", ""));
        assert_eq!(project.codes, ["step();"]);
    }

    #[test]
    fn wrong_root_is_reported() {
        let err = extract_event("<object/>", ActionFormat::Split).expect_err("root");
        assert_eq!(
            err,
            ParseFailure::MissingRoot {
                expected: "event",
                found: "object".into()
            }
        );
    }

    #[test]
    fn malformed_document_is_reported() {
        let err = extract_event("<event category=\"STEP\">", ActionFormat::Split)
            .expect_err("malformed");
        assert!(matches!(err, ParseFailure::Malformed(_)));
    }
}
