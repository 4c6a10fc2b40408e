//! GraphQL-aware JSON decoding into a shape tree.
//!
//! The decoder keeps a set of parallel destination stacks. Most of the time
//! there is exactly one; every inline-fragment (`... on Type`) or embedded
//! record discovered at an object boundary adds another, because GraphQL
//! merges fragment sub-objects into the same JSON level. A stack entry is a
//! path from the root shape to the destination node, so one JSON key can fan
//! its value out to several places at once.

use crate::error::DecodeError;
use crate::json::{Token, Tokens};
use crate::shape::{selection_key_name, Shape};

/// Populates `shape` in place from the `data` portion of a GraphQL response.
///
/// The shape drives decoding: object keys resolve against record fields and
/// pair entries, fragment destinations receive keys merged at their level,
/// and `scalar:"true"` / raw destinations capture whole subtrees without
/// descent. Trailing input after the top-level value is an error.
pub fn decode_response(data: &[u8], shape: &mut Shape) -> Result<(), DecodeError> {
    let input = std::str::from_utf8(data).map_err(|_| DecodeError::InvalidUtf8)?;
    let mut tokens = Tokens::new(input);
    if let Shape::Raw(raw) = shape {
        *raw = tokens.capture_value()?;
        return tokens.trailing();
    }
    let mut decoder = Decoder {
        tokens,
        root: shape,
        frames: Vec::new(),
        stacks: vec![vec![Some(Vec::new())]],
    };
    decoder.run()?;
    decoder.tokens.trailing()
}

/// One navigation step of a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Into a record field by index.
    Field(usize),
    /// Into a pair entry by index.
    Pair(usize),
    /// Into a decoded sequence element by index.
    Elem(usize),
    /// Through a nullable wrapper.
    Inner,
}

type Path = Vec<Step>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Object,
    Array,
}

/// What to do with the value that follows an object key.
enum KeyPlan {
    /// Push one destination (or hole) per stack and decode the value into
    /// every match.
    Descend(Vec<Option<Path>>),
    /// Capture the raw subtree into every matched destination.
    Capture(Vec<Option<Path>>),
    /// The key belongs to an omitted (`graphql:"-"`) field; discard.
    Skip,
}

struct Decoder<'i, 's> {
    tokens: Tokens<'i>,
    root: &'s mut Shape,
    frames: Vec<Delim>,
    stacks: Vec<Vec<Option<Path>>>,
}

impl Decoder<'_, '_> {
    /// Decodes a single JSON value. The loop invariant is that the top of
    /// every stack is where the next JSON value lands.
    fn run(&mut self) -> Result<(), DecodeError> {
        while !self.stacks.is_empty() {
            let mut token = self.tokens.token()?;

            if self.frames.last() == Some(&Delim::Object) && token != Token::EndObject {
                let key = match token {
                    Token::Str(key) => key,
                    _ => return Err(DecodeError::NonStringKey),
                };
                match self.resolve_key(&key)? {
                    KeyPlan::Descend(destinations) => {
                        for (stack, destination) in
                            self.stacks.iter_mut().zip(destinations)
                        {
                            stack.push(destination);
                        }
                    }
                    KeyPlan::Capture(destinations) => {
                        let raw = self.tokens.capture_value()?;
                        self.assign_raw(&key, &destinations, &raw)?;
                        continue;
                    }
                    KeyPlan::Skip => {
                        self.tokens.skip_value()?;
                        continue;
                    }
                }
                token = self.tokens.token()?;
            }

            if self.frames.last() == Some(&Delim::Array) && token != Token::EndArray {
                self.push_array_elements();
            }

            match token {
                Token::BeginObject => {
                    self.frames.push(Delim::Object);
                    self.deref_tops();
                    self.expand_fragments();
                }
                Token::BeginArray => {
                    self.frames.push(Delim::Array);
                    self.deref_tops();
                    self.reset_sequences()?;
                }
                Token::EndObject | Token::EndArray => {
                    self.pop_all();
                    self.frames.pop();
                }
                value => {
                    self.assign_value(&value)?;
                    self.pop_all();
                }
            }
        }
        Ok(())
    }

    /// Resolves a JSON key against every stack top.
    fn resolve_key(&self, key: &str) -> Result<KeyPlan, DecodeError> {
        let mut destinations = Vec::with_capacity(self.stacks.len());
        let mut any_match = false;
        let mut capture = false;
        let mut omitted = false;
        for stack in &self.stacks {
            let destination = match stack.last() {
                Some(Some(path)) => {
                    match find_destination(&*self.root, path, key, &mut omitted) {
                        Some((path, wants_raw)) => {
                            any_match = true;
                            capture |= wants_raw;
                            Some(path)
                        }
                        None => None,
                    }
                }
                _ => None,
            };
            destinations.push(destination);
        }
        if !any_match {
            if omitted {
                return Ok(KeyPlan::Skip);
            }
            return Err(DecodeError::UnknownField {
                key: key.to_owned(),
                places: self.stacks.len(),
            });
        }
        Ok(if capture {
            KeyPlan::Capture(destinations)
        } else {
            KeyPlan::Descend(destinations)
        })
    }

    /// Marks nullable stack tops present and steps inside them, the way the
    /// original allocated nil pointers on object begin.
    fn deref_tops(&mut self) {
        for stack in &mut self.stacks {
            let Some(Some(path)) = stack.last_mut() else {
                continue;
            };
            while let Shape::Optional(optional) = resolve_mut(&mut *self.root, path) {
                optional.present = true;
                path.push(Step::Inner);
            }
        }
    }

    /// Discovers fragment and embedded destinations reachable from the
    /// current stack tops, recursively, and gives each its own stack.
    fn expand_fragments(&mut self) {
        let mut frontier: Vec<Path> = self
            .stacks
            .iter()
            .filter_map(|stack| stack.last().cloned().flatten())
            .collect();
        while let Some(path) = frontier.pop() {
            let mut shape = resolve(&*self.root, &path);
            let mut base = path;
            while let Shape::Optional(optional) = shape {
                shape = optional.prototype();
                base.push(Step::Inner);
            }
            match shape {
                Shape::Record(record) => {
                    for (i, field) in record.fields().iter().enumerate() {
                        let fragment = field.is_fragment()
                            || (field.is_embedded() && field.graphql_tag().is_none());
                        if fragment {
                            let mut sub = base.clone();
                            sub.push(Step::Field(i));
                            self.stacks.push(vec![Some(sub.clone())]);
                            frontier.push(sub);
                        }
                    }
                }
                Shape::Pairs(pairs) => {
                    for (i, (entry_key, _)) in pairs.entries().iter().enumerate() {
                        if entry_key.trim_start().starts_with("...") {
                            let mut sub = base.clone();
                            sub.push(Step::Pair(i));
                            self.stacks.push(vec![Some(sub.clone())]);
                            frontier.push(sub);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// On array begin: the initial value of every destination sequence is
    /// discarded, not appended to.
    fn reset_sequences(&mut self) -> Result<(), DecodeError> {
        for stack in &mut self.stacks {
            let Some(Some(path)) = stack.last_mut() else {
                continue;
            };
            let is_seq = match resolve_mut(&mut *self.root, path) {
                Shape::Seq(seq) => {
                    seq.elements = Some(Vec::new());
                    true
                }
                _ => false,
            };
            if !is_seq {
                let shape = resolve(&*self.root, path);
                return Err(DecodeError::TypeMismatch {
                    field: display_name(&*self.root, path),
                    found: "array",
                    expected: kind_name(shape),
                });
            }
        }
        Ok(())
    }

    /// Before each array element: append a prototype clone to every sequence
    /// top and point the stacks at it.
    fn push_array_elements(&mut self) {
        for stack in &mut self.stacks {
            let destination = match stack.last() {
                Some(Some(path)) => match resolve_mut(&mut *self.root, path) {
                    Shape::Seq(seq) => {
                        let element = (*seq.prototype).clone();
                        let elements = seq.elements.get_or_insert_with(Vec::new);
                        elements.push(element);
                        let mut sub = path.clone();
                        sub.push(Step::Elem(elements.len() - 1));
                        Some(sub)
                    }
                    _ => None,
                },
                _ => None,
            };
            stack.push(destination);
        }
    }

    /// Writes one scalar token into every matched destination.
    fn assign_value(&mut self, token: &Token<'_>) -> Result<(), DecodeError> {
        for stack in &self.stacks {
            let Some(Some(path)) = stack.last() else {
                continue;
            };
            write_value(&mut *self.root, path, token)?;
        }
        Ok(())
    }

    /// Writes captured raw JSON text into every matched destination.
    fn assign_raw(
        &mut self,
        key: &str,
        destinations: &[Option<Path>],
        raw: &str,
    ) -> Result<(), DecodeError> {
        for path in destinations.iter().flatten() {
            let dest = peel_present(resolve_mut(&mut *self.root, path));
            match dest {
                Shape::Raw(value) => *value = raw.to_owned(),
                other => {
                    return Err(DecodeError::TypeMismatch {
                        field: key.to_owned(),
                        found: "raw scalar",
                        expected: kind_name(&*other),
                    })
                }
            }
        }
        Ok(())
    }

    /// Pops every stack, dropping the ones that empty out.
    fn pop_all(&mut self) {
        for stack in &mut self.stacks {
            stack.pop();
        }
        self.stacks.retain(|stack| !stack.is_empty());
    }
}

/// Resolves a destination for `key` under one stack top: nullable wrappers
/// are looked through, records match by field, pairs by entry key. Returns
/// the destination path and whether it wants a raw capture.
fn find_destination(
    root: &Shape,
    top: &[Step],
    key: &str,
    omitted: &mut bool,
) -> Option<(Path, bool)> {
    let mut path = top.to_vec();
    let mut shape = resolve(root, top);
    while let Shape::Optional(optional) = shape {
        shape = optional.prototype();
        path.push(Step::Inner);
    }
    match shape {
        Shape::Record(record) => {
            for (i, field) in record.fields().iter().enumerate() {
                if field.matches_key(key) {
                    path.push(Step::Field(i));
                    let wants_raw = field.is_scalar() || is_raw_dest(field.shape());
                    return Some((path, wants_raw));
                }
                if field.omits_key(key) {
                    *omitted = true;
                }
            }
            None
        }
        Shape::Pairs(pairs) => {
            for (i, (entry_key, entry_shape)) in pairs.entries().iter().enumerate() {
                if selection_key_name(entry_key) == Some(key) {
                    path.push(Step::Pair(i));
                    return Some((path, is_raw_dest(entry_shape)));
                }
            }
            None
        }
        _ => None,
    }
}

fn is_raw_dest(shape: &Shape) -> bool {
    match shape {
        Shape::Raw(_) => true,
        Shape::Optional(optional) => is_raw_dest(optional.prototype()),
        _ => false,
    }
}

fn resolve<'s>(root: &'s Shape, path: &[Step]) -> &'s Shape {
    let mut current = root;
    for step in path {
        current = match (step, current) {
            (Step::Field(i), Shape::Record(record)) => &record.fields[*i].shape,
            (Step::Pair(i), Shape::Pairs(pairs)) => &pairs.entries[*i].1,
            (Step::Elem(i), Shape::Seq(seq)) => match &seq.elements {
                Some(elements) => &elements[*i],
                None => unreachable!("element path into an undecoded sequence"),
            },
            (Step::Inner, Shape::Optional(optional)) => &optional.prototype,
            _ => unreachable!("destination path diverged from the shape tree"),
        };
    }
    current
}

fn resolve_mut<'s>(root: &'s mut Shape, path: &[Step]) -> &'s mut Shape {
    let mut current = root;
    for step in path {
        current = match (step, current) {
            (Step::Field(i), Shape::Record(record)) => &mut record.fields[*i].shape,
            (Step::Pair(i), Shape::Pairs(pairs)) => &mut pairs.entries[*i].1,
            (Step::Elem(i), Shape::Seq(seq)) => match &mut seq.elements {
                Some(elements) => &mut elements[*i],
                None => unreachable!("element path into an undecoded sequence"),
            },
            (Step::Inner, Shape::Optional(optional)) => {
                optional.present = true;
                &mut *optional.prototype
            }
            _ => unreachable!("destination path diverged from the shape tree"),
        };
    }
    current
}

fn write_value(root: &mut Shape, path: &[Step], token: &Token<'_>) -> Result<(), DecodeError> {
    let dest = resolve_mut(&mut *root, path);
    if *token == Token::Null {
        write_null(dest);
        return Ok(());
    }
    let dest = peel_present(dest);
    let mismatch = match (token, dest) {
        (Token::Str(text), Shape::String(value) | Shape::Id(value)) => {
            *value = text.clone();
            None
        }
        (Token::Number(raw), Shape::Int(value)) => match raw.parse() {
            Ok(number) => {
                *value = number;
                None
            }
            Err(_) => Some(("number", "Int")),
        },
        (Token::Number(raw), Shape::Float(value)) => match raw.parse() {
            Ok(number) => {
                *value = number;
                None
            }
            Err(_) => Some(("number", "Float")),
        },
        (Token::Boolean(flag), Shape::Boolean(value)) => {
            *value = *flag;
            None
        }
        (token, dest) => Some((token_kind(token), kind_name(&*dest))),
    };
    match mismatch {
        None => Ok(()),
        Some((found, expected)) => Err(DecodeError::TypeMismatch {
            field: display_name(&*root, path),
            found,
            expected,
        }),
    }
}

/// Steps through nullable wrappers, marking each one present.
fn peel_present(shape: &mut Shape) -> &mut Shape {
    match shape {
        Shape::Optional(optional) => {
            optional.present = true;
            peel_present(&mut optional.prototype)
        }
        other => other,
    }
}

/// Null into a nullable destination means absent; into a sequence, a nil
/// list; into a leaf, its zero value; records and pairs are left untouched.
fn write_null(dest: &mut Shape) {
    match dest {
        Shape::Optional(optional) => {
            optional.present = false;
            optional.prototype.clear();
        }
        Shape::Seq(seq) => seq.elements = None,
        Shape::Record(_) | Shape::Pairs(_) => {}
        leaf => leaf.clear(),
    }
}

/// The declared name of the last named node on a path, for error messages.
fn display_name(root: &Shape, path: &[Step]) -> String {
    let mut current = root;
    let mut name = String::new();
    for step in path {
        match (step, current) {
            (Step::Field(i), Shape::Record(record)) => {
                name = record.fields[*i].name().to_owned();
                current = &record.fields[*i].shape;
            }
            (Step::Pair(i), Shape::Pairs(pairs)) => {
                name = pairs.entries[*i].0.clone();
                current = &pairs.entries[*i].1;
            }
            (Step::Elem(i), Shape::Seq(seq)) => {
                current = match &seq.elements {
                    Some(elements) => &elements[*i],
                    None => &seq.prototype,
                };
            }
            (Step::Inner, Shape::Optional(optional)) => current = &optional.prototype,
            _ => return name,
        }
    }
    name
}

fn kind_name(shape: &Shape) -> &'static str {
    match shape {
        Shape::Record(_) => "record",
        Shape::Pairs(_) => "ordered pairs",
        Shape::Seq(_) => "list",
        Shape::Optional(_) => "optional",
        Shape::Int(_) => "Int",
        Shape::Float(_) => "Float",
        Shape::Boolean(_) => "Boolean",
        Shape::String(_) => "String",
        Shape::Id(_) => "ID",
        Shape::Raw(_) => "raw scalar",
    }
}

fn token_kind(token: &Token<'_>) -> &'static str {
    match token {
        Token::Str(_) => "string",
        Token::Number(_) => "number",
        Token::Boolean(_) => "boolean",
        Token::Null => "null",
        Token::BeginObject | Token::EndObject => "object",
        Token::BeginArray | Token::EndArray => "array",
    }
}
