use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named formatting attributes carried by an op.
///
/// A `null` value inside a retain removes the attribute when composed.
pub type Attributes = Map<String, Value>;

/// Build an [`Attributes`] map from a JSON object literal.
///
/// Non-object values produce an empty map.
pub fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}

/// Well-known embed kinds
pub mod kinds {
    pub const CHAPTER: &str = "chapter";
    pub const VERSE: &str = "verse";
    pub const BLANK: &str = "blank";
    pub const NOTE_THREAD: &str = "note-thread-embed";
}

/// Well-known attribute names
pub mod attr {
    pub const SEGMENT: &str = "segment";
    pub const PARA_CONTENTS: &str = "para-contents";
    pub const PARA: &str = "para";
    pub const INITIAL: &str = "initial";
    pub const EMBED_ID: &str = "embedid";
    pub const HIGHLIGHT_SEGMENT: &str = "highlight-segment";
    pub const HIGHLIGHT_PARA: &str = "highlight-para";
}

#[derive(Debug, thiserror::Error)]
#[error("embed object must have exactly one key, found {0}")]
pub struct MalformedEmbed(pub usize);

/// An embedded object occupying a single position, serialized as `{ kind: data }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Embed {
    pub kind: String,
    pub data: Value,
}

impl Embed {
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    pub fn chapter(number: &str) -> Self {
        Self::new(
            kinds::CHAPTER,
            serde_json::json!({ "number": number, "style": "c" }),
        )
    }

    pub fn verse(number: &str) -> Self {
        Self::new(
            kinds::VERSE,
            serde_json::json!({ "number": number, "style": "v" }),
        )
    }

    pub fn blank() -> Self {
        Self::new(kinds::BLANK, Value::Bool(true))
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// The `number` field of a chapter or verse marker, as text.
    pub fn number(&self) -> Option<String> {
        match self.data.get("number")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl TryFrom<Map<String, Value>> for Embed {
    type Error = MalformedEmbed;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(MalformedEmbed(map.len()));
        }
        let (kind, data) = map.into_iter().next().ok_or(MalformedEmbed(0))?;
        Ok(Self { kind, data })
    }
}

impl From<Embed> for Map<String, Value> {
    fn from(embed: Embed) -> Self {
        let mut map = Map::new();
        map.insert(embed.kind, embed.data);
        map
    }
}

/// What an insert op puts into the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsertValue {
    Text(String),
    Embed(Embed),
}

impl InsertValue {
    pub fn len(&self) -> usize {
        match self {
            InsertValue::Text(text) => text.chars().count(),
            InsertValue::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InsertValue::Text(text) => Some(text),
            InsertValue::Embed(_) => None,
        }
    }

    pub fn as_embed(&self) -> Option<&Embed> {
        match self {
            InsertValue::Text(_) => None,
            InsertValue::Embed(embed) => Some(embed),
        }
    }
}

/// A single delta operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Op {
    Insert {
        insert: InsertValue,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        attributes: Attributes,
    },
    Retain {
        retain: usize,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        attributes: Attributes,
    },
    Delete {
        delete: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Insert,
    Retain,
    Delete,
}

impl Op {
    pub fn text(text: impl Into<String>, attributes: Option<Attributes>) -> Self {
        Op::Insert {
            insert: InsertValue::Text(text.into()),
            attributes: attributes.unwrap_or_default(),
        }
    }

    pub fn embed(embed: Embed, attributes: Option<Attributes>) -> Self {
        Op::Insert {
            insert: InsertValue::Embed(embed),
            attributes: attributes.unwrap_or_default(),
        }
    }

    pub fn retain(len: usize, attributes: Option<Attributes>) -> Self {
        Op::Retain {
            retain: len,
            attributes: attributes.unwrap_or_default(),
        }
    }

    pub fn delete(len: usize) -> Self {
        Op::Delete { delete: len }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Op::Insert { .. } => OpKind::Insert,
            Op::Retain { .. } => OpKind::Retain,
            Op::Delete { .. } => OpKind::Delete,
        }
    }

    /// Length of the op in document positions (embeds count as one)
    pub fn len(&self) -> usize {
        match self {
            Op::Insert { insert, .. } => insert.len(),
            Op::Retain { retain, .. } => *retain,
            Op::Delete { delete } => *delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Op::Insert { attributes, .. } | Op::Retain { attributes, .. } => Some(attributes),
            Op::Delete { .. } => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes().and_then(|attrs| attrs.get(name))
    }

    pub fn insert_value(&self) -> Option<&InsertValue> {
        match self {
            Op::Insert { insert, .. } => Some(insert),
            _ => None,
        }
    }

    pub fn embed_value(&self) -> Option<&Embed> {
        self.insert_value().and_then(InsertValue::as_embed)
    }

    pub fn is_embed(&self, kind: &str) -> bool {
        self.embed_value().is_some_and(|embed| embed.is(kind))
    }
}
