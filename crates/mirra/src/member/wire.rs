use serde::{Deserialize, Serialize};
use serde_json::Value;

// -----------------------------------------------------------------------------
// Member

/// The reserved `typeName` that marks a node as a reference into the document
/// rather than a value.
pub const REFERENCE_TOKEN: &str = "$ref";

/// One node of the serialized intermediate tree.
///
/// A member is either a leaf (scalar `value`), a branch (`fields` and
/// `props`), a collection (`items`, index-named children), or a reference
/// marker (`type_name == "$ref"` and `value` holding a document path such as
/// `"#/child/parent"`). A branch never carries a direct `value` and vice
/// versa, the marker being the one exception.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Canonical type identity, absent when the reader should infer it from
    /// the declared type at that position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Member>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Member>,

    /// Ordered element members for enumerables, named by index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Member>,
}

impl Member {
    /// A bare node carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A leaf node with a scalar payload.
    pub fn leaf(name: Option<String>, type_name: Option<String>, value: Value) -> Self {
        Self {
            name,
            type_name,
            value: Some(value),
            ..Self::default()
        }
    }

    /// A reference marker pointing at `path` (e.g. `"#/items/2"`).
    pub fn reference(name: Option<String>, path: impl Into<String>) -> Self {
        Self {
            name,
            type_name: Some(REFERENCE_TOKEN.to_owned()),
            value: Some(Value::String(path.into())),
            ..Self::default()
        }
    }

    /// Whether this node is a reference marker.
    pub fn is_reference(&self) -> bool {
        self.type_name.as_deref() == Some(REFERENCE_TOKEN)
    }

    /// The marker's target path, if this node is one.
    pub fn reference_path(&self) -> Option<&str> {
        if self.is_reference() {
            self.value.as_ref()?.as_str()
        } else {
            None
        }
    }

    /// Whether the node carries no payload and no children. An explicit JSON
    /// `null` value does not count as empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.fields.is_empty()
            && self.props.is_empty()
            && self.items.is_empty()
    }

    /// Looks up a direct child by name, fields before props.
    pub fn child(&self, name: &str) -> Option<&Member> {
        self.fields
            .iter()
            .chain(&self.props)
            .find(|m| m.name.as_deref() == Some(name))
    }
}

// -----------------------------------------------------------------------------
// Tests
