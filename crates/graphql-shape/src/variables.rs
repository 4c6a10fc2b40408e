//! Variable bindings and GraphQL type inference.
//!
//! A [`Variable`] pairs a GraphQL type expression with the JSON payload a
//! transport will send. Built-in Rust values convert with `From` (non-null by
//! rule); [`Variable::nullable`] drops the outer `!`; list and null bindings
//! carry an explicit [`Type`] where nothing can be read off a value; user
//! types declare their own name through [`GraphqlTypeName`].

use crate::error::ConstructError;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A GraphQL type expression, as printed in a variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A nullable named type: `Int`.
    Named(String),
    /// A non-null named type: `Int!`.
    NonNullNamed(String),
    /// A nullable list: `[Int!]`.
    List(Box<Type>),
    /// A non-null list: `[Int!]!`.
    NonNullList(Box<Type>),
}

impl Type {
    /// A nullable named type.
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    /// Wrap this type in a nullable list.
    pub fn list(self) -> Self {
        Type::List(Box::new(self))
    }

    /// Add the non-null marker.
    pub fn non_null(self) -> Self {
        match self {
            Type::Named(name) | Type::NonNullNamed(name) => Type::NonNullNamed(name),
            Type::List(item) | Type::NonNullList(item) => Type::NonNullList(item),
        }
    }

    /// Drop the non-null marker.
    pub fn nullable(self) -> Self {
        match self {
            Type::Named(name) | Type::NonNullNamed(name) => Type::Named(name),
            Type::List(item) | Type::NonNullList(item) => Type::List(item),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::NonNullNamed(name) => write!(f, "{name}!"),
            Type::List(item) => write!(f, "[{item}]"),
            Type::NonNullList(item) => write!(f, "[{item}]!"),
        }
    }
}

/// Capability for user types that declare their own GraphQL type name
/// (custom scalars, enums, input objects).
pub trait GraphqlTypeName {
    /// The GraphQL type name for values of this type, e.g. `"uuid"` or
    /// `"AddReactionInput"`.
    fn graphql_type_name() -> String;
}

/// A GraphQL `ID` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Id(pub String);

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id(value.to_owned())
    }
}

/// A single variable binding: a GraphQL type plus its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    ty: Type,
    value: serde_json::Value,
}

impl Variable {
    /// A binding with an explicit type and payload.
    pub fn new(ty: Type, value: serde_json::Value) -> Self {
        Self { ty, value }
    }

    /// A null binding carrying its declared type.
    pub fn null(ty: Type) -> Self {
        Self {
            ty,
            value: serde_json::Value::Null,
        }
    }

    /// A list binding with an explicit item type, required when the item type
    /// cannot be read off the items (empty lists, custom-typed items,
    /// nullable items). The list itself is non-null until
    /// [`Variable::nullable`].
    pub fn list_of(item: Type, items: impl IntoIterator<Item = Variable>) -> Self {
        let values = items.into_iter().map(|item| item.value).collect();
        Self {
            ty: item.list().non_null(),
            value: serde_json::Value::Array(values),
        }
    }

    /// A value of a type that declares its own GraphQL name.
    pub fn custom<T>(value: &T) -> Result<Self, ConstructError>
    where
        T: GraphqlTypeName + Serialize,
    {
        let value = serde_json::to_value(value)
            .map_err(|err| ConstructError::Serialize(err.to_string()))?;
        Ok(Self {
            ty: Type::named(T::graphql_type_name()).non_null(),
            value,
        })
    }

    /// Drop the outer non-null marker, making the binding nullable.
    pub fn nullable(mut self) -> Self {
        self.ty = self.ty.nullable();
        self
    }

    /// The inferred GraphQL type.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The JSON payload a transport sends for this binding.
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }
}

macro_rules! builtin_variable {
    ($($from:ty => $name:literal),+ $(,)?) => {
        $(
            impl From<$from> for Variable {
                fn from(value: $from) -> Self {
                    Variable {
                        ty: Type::NonNullNamed($name.to_owned()),
                        value: serde_json::Value::from(value),
                    }
                }
            }

            impl From<Vec<$from>> for Variable {
                fn from(items: Vec<$from>) -> Self {
                    Variable::list_of(
                        Type::named($name).non_null(),
                        items.into_iter().map(Variable::from),
                    )
                }
            }
        )+
    };
}

builtin_variable! {
    i8 => "Int",
    i16 => "Int",
    i32 => "Int",
    i64 => "Int",
    u8 => "Int",
    u16 => "Int",
    u32 => "Int",
    u64 => "Int",
    f32 => "Float",
    f64 => "Float",
    bool => "Boolean",
    &str => "String",
    String => "String",
}

impl From<Id> for Variable {
    fn from(value: Id) -> Self {
        Variable {
            ty: Type::NonNullNamed("ID".to_owned()),
            value: serde_json::Value::String(value.0),
        }
    }
}

impl From<Vec<Id>> for Variable {
    fn from(items: Vec<Id>) -> Self {
        Variable::list_of(
            Type::named("ID").non_null(),
            items.into_iter().map(Variable::from),
        )
    }
}

/// Insertion-ordered variable bindings, emitted sorted by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variables {
    bindings: IndexMap<String, Variable>,
}

impl Variables {
    /// Create an empty binding map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a binding.
    pub fn insert(&mut self, name: impl Into<String>, variable: impl Into<Variable>) {
        self.bindings.insert(name.into(), variable.into());
    }

    /// Whether no bindings exist.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Look up a binding by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.bindings.get(name)
    }

    /// The declaration header tokens: `$name:Type` concatenated with no
    /// separators, names sorted ASCII-ascending.
    pub fn header(&self) -> Result<String, ConstructError> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        let mut out = String::new();
        for name in names {
            if !valid_name(name) {
                return Err(ConstructError::InvalidVariableName { name: name.into() });
            }
            out.push('$');
            out.push_str(name);
            out.push(':');
            out.push_str(&self.bindings[name].ty.to_string());
        }
        Ok(out)
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bindings.len()))?;
        for (name, variable) in &self.bindings {
            map.serialize_entry(name, &variable.value)?;
        }
        map.end()
    }
}

pub(crate) fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn type_display() {
        assert_eq!(Type::named("Int").to_string(), "Int");
        assert_eq!(Type::named("Int").non_null().to_string(), "Int!");
        assert_eq!(Type::named("ID").non_null().list().to_string(), "[ID!]");
        assert_eq!(
            Type::named("ID").non_null().list().non_null().to_string(),
            "[ID!]!"
        );
        assert_eq!(
            Type::named("uuid").list().non_null().to_string(),
            "[uuid]!"
        );
    }

    #[test]
    fn header_is_sorted_and_unseparated() {
        let mut variables = Variables::new();
        variables.insert("b", "text");
        variables.insert("a", 123);
        assert_eq!(variables.header().unwrap(), "$a:Int!$b:String!");
    }

    #[test]
    fn invalid_variable_name() {
        let mut variables = Variables::new();
        variables.insert("1bad", 1);
        assert_eq!(
            variables.header(),
            Err(ConstructError::InvalidVariableName {
                name: "1bad".into()
            })
        );
    }

    #[test]
    fn payload_serialization_keeps_insertion_order() {
        let mut variables = Variables::new();
        variables.insert("login", "octocat");
        variables.insert("first", 3);
        let json = serde_json::to_string(&variables).unwrap();
        assert_eq!(json, r#"{"login":"octocat","first":3}"#);
    }
}
