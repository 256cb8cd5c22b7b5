//! Object events: category mapping, identity keys, and code-action slots.
//!
//! The split export names an event by tag (`category="STEP"`), the project
//! format by number (`eventtype="3"`). Both are normalized to an [`EventKey`]
//! holding the tag string before any comparison happens.

pub mod extract;
pub mod transplant;

use roxmltree::Node;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseFailure;
use crate::xml::{child_element, child_elements, child_text};

pub use extract::extract_event;
pub use transplant::{EventTransplant, transplant_events};

/// Event-type tags shared by both project generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    Create,
    Destroy,
    Alarm,
    Step,
    Collision,
    Keyboard,
    Other,
    Draw,
    KeyPress,
    KeyRelease,
}

/// Error returned when parsing an unknown event tag string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventTag {
    pub raw: String,
}

impl fmt::Display for UnknownEventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event tag '{}': expected one of CREATE, DESTROY, ALARM, STEP, \
             COLLISION, KEYBOARD, OTHER, DRAW, KEYPRESS, KEYRELEASE",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventTag {}

impl EventTag {
    pub const ALL: [Self; 10] = [
        Self::Create,
        Self::Destroy,
        Self::Alarm,
        Self::Step,
        Self::Collision,
        Self::Keyboard,
        Self::Other,
        Self::Draw,
        Self::KeyPress,
        Self::KeyRelease,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Destroy => "DESTROY",
            Self::Alarm => "ALARM",
            Self::Step => "STEP",
            Self::Collision => "COLLISION",
            Self::Keyboard => "KEYBOARD",
            Self::Other => "OTHER",
            Self::Draw => "DRAW",
            Self::KeyPress => "KEYPRESS",
            Self::KeyRelease => "KEYRELEASE",
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventTag {
    type Err = UnknownEventTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownEventTag { raw: s.to_string() })
    }
}

/// Map a numeric event category to its tag.
///
/// Category `6` is reserved in the legacy format and has no tag; so does
/// anything outside `0..=10`.
#[must_use]
pub fn map_category(raw: &str) -> Option<EventTag> {
    match raw {
        "0" => Some(EventTag::Create),
        "1" => Some(EventTag::Destroy),
        "2" => Some(EventTag::Alarm),
        "3" => Some(EventTag::Step),
        "4" => Some(EventTag::Collision),
        "5" => Some(EventTag::Keyboard),
        "7" => Some(EventTag::Other),
        "8" => Some(EventTag::Draw),
        "9" => Some(EventTag::KeyPress),
        "10" => Some(EventTag::KeyRelease),
        _ => None,
    }
}

/// Identity of one logical event: `(type tag, id, qualifier)`.
///
/// Compared by exact string equality; numbers are never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub event_type: String,
    pub id: String,
    pub qualifier: String,
}

impl EventKey {
    pub fn new(
        event_type: impl Into<String>,
        id: impl Into<String>,
        qualifier: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            id: id.into(),
            qualifier: qualifier.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.event_type, self.id)?;
        if !self.qualifier.is_empty() {
            write!(f, "/{}", self.qualifier)?;
        }
        Ok(())
    }
}

/// Codes of one exported event, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEventRecord {
    pub key: EventKey,
    pub codes: Vec<String>,
}

/// Which document family an event comes from.
///
/// The families disagree on attribute names and on the literal that marks an
/// action as a code action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFormat {
    /// Per-event documents written by the splitting tool.
    Split,
    /// Project-format object documents (`*.object.gmx`).
    Project,
}

impl ActionFormat {
    /// Text of an action's `kind` child that marks it as code.
    #[must_use]
    pub const fn code_sentinel(self) -> &'static str {
        match self {
            Self::Split => "CODE",
            Self::Project => "7",
        }
    }

    const fn key_attributes(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Split => ("category", "id", "with"),
            Self::Project => ("eventtype", "enumb", "ename"),
        }
    }

    /// Raw `(type, id, qualifier)` attribute values of an event element.
    /// Missing attributes read as empty strings.
    #[must_use]
    pub fn raw_key<'a>(self, event: Node<'a, '_>) -> (&'a str, &'a str, &'a str) {
        let (type_attr, id_attr, qualifier_attr) = self.key_attributes();
        (
            event.attribute(type_attr).unwrap_or_default(),
            event.attribute(id_attr).unwrap_or_default(),
            event.attribute(qualifier_attr).unwrap_or_default(),
        )
    }

    /// Typed key of an event element.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure::UnmappedCategory`] when a project-format event
    /// carries a category with no tag.
    pub fn event_key(self, event: Node<'_, '_>) -> Result<EventKey, ParseFailure> {
        let (raw_type, id, qualifier) = self.raw_key(event);
        let event_type = match self {
            Self::Split => raw_type.to_string(),
            Self::Project => map_category(raw_type)
                .ok_or_else(|| ParseFailure::UnmappedCategory(raw_type.to_string()))?
                .as_str()
                .to_string(),
        };
        Ok(EventKey::new(event_type, id, qualifier))
    }

    /// Code slots below `event`, in document order.
    ///
    /// A slot is the element holding the code string of an action whose kind
    /// equals [`Self::code_sentinel`]. Code actions without an argument have
    /// no slot, nor do project-format arguments without a `string` child.
    pub fn code_slots<'a, 'input: 'a>(
        self,
        event: Node<'a, 'input>,
    ) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
        event
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == "action")
            .filter(move |action| {
                child_text(*action, "kind").is_some_and(|kind| kind.trim() == self.code_sentinel())
            })
            .filter_map(move |action| code_node(self, action))
    }
}

/// Element holding an action's code: the first argument's `string` child.
/// Split documents may also carry the code as the argument's own text.
fn code_node<'a, 'input>(
    format: ActionFormat,
    action: Node<'a, 'input>,
) -> Option<Node<'a, 'input>> {
    let arguments = child_element(action, "arguments")?;
    let argument = child_elements(arguments, "argument").next()?;
    match (child_element(argument, "string"), format) {
        (Some(string), _) => Some(string),
        (None, ActionFormat::Split) if !argument.children().any(|n| n.is_element()) => {
            Some(argument)
        }
        (None, _) => None,
    }
}
