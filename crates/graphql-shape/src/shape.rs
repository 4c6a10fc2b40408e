//! The shape tree: a value-shaped description of a GraphQL selection.
//!
//! A [`Shape`] plays both sides of an operation. The writer in
//! [`crate::query`] walks it read-only to emit the selection set; the decoder
//! behind [`crate::decode_response`] populates it in place from the response.
//! Declaring the result shape *is* writing the query.

/// One node of a query shape.
///
/// Leaf nodes start at their zero value and are overwritten by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A record with named, ordered fields.
    Record(Record),
    /// Externally ordered `(key, shape)` entries.
    Pairs(Pairs),
    /// A homogeneous list.
    Seq(Seq),
    /// A nullable wrapper.
    Optional(Optional),
    /// GraphQL `Int`.
    Int(i64),
    /// GraphQL `Float`.
    Float(f64),
    /// GraphQL `Boolean`.
    Boolean(bool),
    /// GraphQL `String`; also receives enum values and custom leaf scalars
    /// that arrive as JSON strings.
    String(String),
    /// GraphQL `ID`.
    Id(String),
    /// An opaque custom-scalar subtree, captured as compact raw JSON text.
    Raw(String),
}

impl Shape {
    /// An `Int` leaf at its zero value.
    pub fn int() -> Self {
        Shape::Int(0)
    }

    /// A `Float` leaf at its zero value.
    pub fn float() -> Self {
        Shape::Float(0.0)
    }

    /// A `Boolean` leaf at its zero value.
    pub fn boolean() -> Self {
        Shape::Boolean(false)
    }

    /// A `String` leaf at its zero value.
    pub fn string() -> Self {
        Shape::String(String::new())
    }

    /// An `ID` leaf at its zero value.
    pub fn id() -> Self {
        Shape::Id(String::new())
    }

    /// An empty raw-capture leaf for opaque custom scalars.
    pub fn raw() -> Self {
        Shape::Raw(String::new())
    }

    /// A list whose elements select like `prototype`.
    pub fn seq(prototype: Shape) -> Self {
        Shape::Seq(Seq::new(prototype))
    }

    /// A nullable wrapper around `prototype`, initially absent.
    pub fn optional(prototype: Shape) -> Self {
        Shape::Optional(Optional::new(prototype))
    }

    /// The record behind this node, if it is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Shape::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The ordered pairs behind this node, if it is one.
    pub fn as_pairs(&self) -> Option<&Pairs> {
        match self {
            Shape::Pairs(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// The list behind this node, if it is one.
    pub fn as_seq(&self) -> Option<&Seq> {
        match self {
            Shape::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    /// The nullable wrapper behind this node, if it is one.
    pub fn as_optional(&self) -> Option<&Optional> {
        match self {
            Shape::Optional(optional) => Some(optional),
            _ => None,
        }
    }

    /// The decoded integer, if this is an `Int` leaf.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Shape::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The decoded float, if this is a `Float` leaf.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Shape::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// The decoded boolean, if this is a `Boolean` leaf.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Shape::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// The decoded text, if this is a `String` or `ID` leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Shape::String(value) | Shape::Id(value) => Some(value),
            _ => None,
        }
    }

    /// The captured raw JSON text, if this is a raw-capture leaf.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Shape::Raw(value) => Some(value),
            _ => None,
        }
    }

    /// Resets every decoded value in the subtree to its zero state.
    pub(crate) fn clear(&mut self) {
        match self {
            Shape::Record(record) => {
                for field in &mut record.fields {
                    field.shape.clear();
                }
            }
            Shape::Pairs(pairs) => {
                for (_, shape) in &mut pairs.entries {
                    shape.clear();
                }
            }
            Shape::Seq(seq) => {
                seq.elements = None;
                seq.prototype.clear();
            }
            Shape::Optional(optional) => {
                optional.present = false;
                optional.prototype.clear();
            }
            Shape::Int(value) => *value = 0,
            Shape::Float(value) => *value = 0.0,
            Shape::Boolean(value) => *value = false,
            Shape::String(value) | Shape::Id(value) | Shape::Raw(value) => value.clear(),
        }
    }
}

/// A record shape: named fields in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub(crate) fields: Vec<Field>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// The fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The shape of the first field with this declared name.
    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.shape)
    }
}

/// A record field: a declared MixedCaps name, optional tags, and a sub-shape.
///
/// With an empty or missing `graphql` tag the selection key is the
/// lowerCamelCase derivation of the declared name. A nonempty tag is emitted
/// verbatim and may carry arguments, an alias, an inline fragment
/// (`... on Type`), or the sentinel `-` to omit the field from the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) graphql: Option<String>,
    pub(crate) json: Option<String>,
    pub(crate) scalar: bool,
    pub(crate) inline: bool,
    pub(crate) shape: Shape,
}

impl Field {
    /// Create a field with a declared name.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            graphql: None,
            json: None,
            scalar: false,
            inline: false,
            shape,
        }
    }

    /// An anonymous embedded record whose fields are spliced into the
    /// enclosing selection set.
    pub fn embedded(shape: Shape) -> Self {
        Self {
            name: String::new(),
            graphql: None,
            json: None,
            scalar: false,
            inline: true,
            shape,
        }
    }

    /// Set the `graphql` tag: verbatim selection syntax, or `-` to omit the
    /// field. An empty tag is the same as no tag at all: the selection key
    /// falls back to the derived name, on both the query and decode sides.
    /// Tag interiors are never reformatted.
    pub fn graphql(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        self.graphql = if tag.is_empty() { None } else { Some(tag) };
    }

    /// Set the `json` tag, overriding the key the decoder matches.
    pub fn json(&mut self, key: impl Into<String>) {
        self.json = Some(key.into());
    }

    /// Mark the field as an opaque custom scalar: selected with no
    /// sub-selection, decoded as raw bytes without descent.
    pub fn scalar(&mut self) {
        self.scalar = true;
    }

    /// The declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's sub-shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The `graphql` tag, if set.
    pub fn graphql_tag(&self) -> Option<&str> {
        self.graphql.as_deref()
    }

    /// Whether this field is an anonymous embedded record.
    pub fn is_embedded(&self) -> bool {
        self.inline
    }

    /// Whether this field is tagged as an opaque custom scalar.
    pub fn is_scalar(&self) -> bool {
        self.scalar
    }

    /// Whether the `graphql` tag is an inline fragment (`... on Type`).
    pub(crate) fn is_fragment(&self) -> bool {
        self.graphql
            .as_deref()
            .is_some_and(|tag| tag.trim_start().starts_with("..."))
    }

    /// Decode-side key resolution.
    ///
    /// A `graphql` tag decides alone: its name part (alias prefix, arguments
    /// stripped) must equal the key, and fragments never match by name.
    /// Untagged fields match their `json` tag or their declared name,
    /// case-insensitively (which subsumes the lowerCamelCase derivation).
    pub(crate) fn matches_key(&self, key: &str) -> bool {
        if self.inline {
            return false;
        }
        match self.graphql.as_deref() {
            Some("-") => false,
            Some(tag) => selection_key_name(tag).map_or(false, |name| name == key),
            None => {
                self.json.as_deref() == Some(key) || self.name.eq_ignore_ascii_case(key)
            }
        }
    }

    /// Whether a JSON key belongs to this omitted (`graphql:"-"`) field.
    pub(crate) fn omits_key(&self, key: &str) -> bool {
        self.graphql.as_deref() == Some("-")
            && (self.json.as_deref() == Some(key) || self.name.eq_ignore_ascii_case(key))
    }
}

/// The response key named by a selection entry: the alias prefix with
/// arguments stripped. `update0:update(name:$name0)` names `update0`;
/// fragments name nothing.
pub(crate) fn selection_key_name(entry: &str) -> Option<&str> {
    let entry = entry.trim();
    if entry.starts_with("...") {
        return None;
    }
    let entry = match entry.find('(') {
        Some(i) => &entry[..i],
        None => entry,
    };
    let entry = match entry.find(':') {
        Some(i) => &entry[..i],
        None => entry,
    };
    Some(entry.trim())
}

/// Externally ordered `(key, shape)` pairs.
///
/// Keys are emitted verbatim, so an entry may carry an alias and arguments
/// (`"update0:update(name:$name0)"`) or an inline-fragment marker
/// (`"... on Type"`). Entry order is both the emission order and the decode
/// order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pairs {
    pub(crate) entries: Vec<(String, Shape)>,
}

impl Pairs {
    /// Create an empty pair list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn entry(&mut self, key: impl Into<String>, shape: Shape) {
        self.entries.push((key.into(), shape));
    }

    /// The entries in order.
    pub fn entries(&self) -> &[(String, Shape)] {
        &self.entries
    }

    /// The shape of the first entry with this exact key.
    pub fn get(&self, key: &str) -> Option<&Shape> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, shape)| shape)
    }
}

/// A homogeneous list shape.
///
/// `prototype` describes how one element selects; decoded elements are clones
/// of it. `elements` stays `None` until the decoder sees an array, and
/// returns to `None` when it sees `null`, mirroring a nil list.
#[derive(Debug, Clone, PartialEq)]
pub struct Seq {
    pub(crate) prototype: Box<Shape>,
    pub(crate) elements: Option<Vec<Shape>>,
}

impl Seq {
    /// A list whose elements select like `prototype`.
    pub fn new(prototype: Shape) -> Self {
        Self {
            prototype: Box::new(prototype),
            elements: None,
        }
    }

    /// A list already holding decoded elements, for building expected trees.
    pub fn of(prototype: Shape, elements: Vec<Shape>) -> Self {
        Self {
            prototype: Box::new(prototype),
            elements: Some(elements),
        }
    }

    /// The element prototype.
    pub fn prototype(&self) -> &Shape {
        &self.prototype
    }

    /// Decoded elements; `None` when the list was null or never decoded.
    pub fn elements(&self) -> Option<&[Shape]> {
        self.elements.as_deref()
    }
}

/// A nullable wrapper shape with present/absent semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct Optional {
    pub(crate) prototype: Box<Shape>,
    pub(crate) present: bool,
}

impl Optional {
    /// An absent optional around `prototype`.
    pub fn new(prototype: Shape) -> Self {
        Self {
            prototype: Box::new(prototype),
            present: false,
        }
    }

    /// An optional already holding a value, for building expected trees.
    pub fn some(value: Shape) -> Self {
        Self {
            prototype: Box::new(value),
            present: true,
        }
    }

    /// The wrapped prototype, decoded or not.
    pub fn prototype(&self) -> &Shape {
        &self.prototype
    }

    /// Whether a value is present.
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// The decoded value, when present.
    pub fn value(&self) -> Option<&Shape> {
        self.present.then_some(&*self.prototype)
    }
}
