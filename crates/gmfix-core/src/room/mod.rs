//! Rooms: instance identity, the exported room record, and instance parsing.
//!
//! Two shapes are understood for an instance. The split export nests its
//! fields as elements:
//!
//! ```xml
//! <instance>
//!   <object>obj_door</object>
//!   <position x="64" y="128"/>
//!   <creationCode>target = rm_cave;</creationCode>
//! </instance>
//! ```
//!
//! Project-format rooms flatten them into attributes:
//!
//! ```xml
//! <instance objName="obj_door" x="64" y="128" name="inst_1A2B" code="target = rm_cave;"/>
//! ```

pub mod transplant;

use roxmltree::Node;
use std::fmt;

use crate::error::ParseFailure;
use crate::xml::{XmlText, child_element, child_elements, child_text};

pub use transplant::{RoomCodeOutcome, RoomTransplant, transplant_room};

/// Identity of a room instance for matching purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId {
    pub object_name: String,
    pub x: i64,
    pub y: i64,
}

impl InstanceId {
    pub fn new(object_name: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            object_name: object_name.into(),
            x,
            y,
        }
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({},{})", self.object_name, self.x, self.y)
    }
}

/// One placed instance. `creation_code` is the transplanted payload and is
/// not part of the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub object_name: String,
    pub x: i64,
    pub y: i64,
    pub creation_code: String,
}

impl Instance {
    #[must_use]
    pub fn identity(&self) -> InstanceId {
        InstanceId::new(self.object_name.clone(), self.x, self.y)
    }

    /// True when both instances have the same object name and position.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.object_name == other.object_name && self.x == other.x && self.y == other.y
    }
}

/// Room exported by the splitting tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyRoom {
    /// Room creation code; `None` when the export has no such field.
    pub creation_code: Option<String>,
    /// Instances in export order.
    pub instances: Vec<Instance>,
}

/// Parse an exported room document.
///
/// # Errors
///
/// - [`ParseFailure::Malformed`] if the text is not well-formed XML.
/// - [`ParseFailure::MissingRoot`] if the root element is not `<room>`.
/// - [`ParseFailure::InvalidNumber`] if an instance position is not an integer.
pub fn extract_room(text: &str) -> Result<LegacyRoom, ParseFailure> {
    let xml = XmlText::new(text);
    let doc = xml.parse()?;
    let root = room_root(&doc)?;

    let creation_code = child_text(root, "creationCode").or_else(|| child_text(root, "code"));
    let instances = instance_nodes(root)
        .map(read_instance)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LegacyRoom {
        creation_code,
        instances,
    })
}

pub(crate) fn room_root<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
) -> Result<Node<'a, 'input>, ParseFailure> {
    let root = doc.root_element();
    if root.tag_name().name() == "room" {
        Ok(root)
    } else {
        Err(ParseFailure::MissingRoot {
            expected: "room",
            found: root.tag_name().name().to_string(),
        })
    }
}

pub(crate) fn instance_nodes<'a, 'input: 'a>(
    room: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    child_element(room, "instances")
        .into_iter()
        .flat_map(|instances| child_elements(instances, "instance"))
}

/// Read an instance in either the element or the attribute shape.
pub(crate) fn read_instance(node: Node<'_, '_>) -> Result<Instance, ParseFailure> {
    let object_name = node
        .attribute("objName")
        .map(str::to_owned)
        .or_else(|| child_text(node, "object"))
        .unwrap_or_default();
    let position = child_element(node, "position");
    let creation_code = node
        .attribute("code")
        .map(str::to_owned)
        .or_else(|| child_text(node, "creationCode"))
        .unwrap_or_default();

    Ok(Instance {
        object_name,
        x: coordinate(node, position, "x")?,
        y: coordinate(node, position, "y")?,
        creation_code,
    })
}

fn coordinate(
    node: Node<'_, '_>,
    position: Option<Node<'_, '_>>,
    axis: &'static str,
) -> Result<i64, ParseFailure> {
    let raw = node
        .attribute(axis)
        .or_else(|| position.and_then(|position| position.attribute(axis)))
        .unwrap_or_default();
    raw.trim()
        .parse()
        .map_err(|_| ParseFailure::InvalidNumber {
            field: axis,
            value: raw.to_string(),
        })
}
