//! Operation construction: derive a GraphQL operation string from a shape.

use crate::error::ConstructError;
use crate::ident;
use crate::shape::{Pairs, Record, Shape};
use crate::variables::{self, Variables};

/// An option applied to an operation at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOption {
    /// Operation name, inserted between the keyword and the variable header.
    OperationName(String),
    /// Operation directive in its printed form (`@cached`,
    /// `@cached(ttl: 60)`), appended after the variable header.
    OperationDirective(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    fn keyword(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

/// Constructs a `query` operation string from a shape.
///
/// An anonymous query with no variables and no directives is the bare
/// selection set, keyword omitted.
pub fn construct_query(
    shape: &Shape,
    variables: Option<&Variables>,
    options: &[QueryOption],
) -> Result<String, ConstructError> {
    construct(OperationKind::Query, shape, variables, options)
}

/// Constructs a `mutation` operation string from a shape.
pub fn construct_mutation(
    shape: &Shape,
    variables: Option<&Variables>,
    options: &[QueryOption],
) -> Result<String, ConstructError> {
    construct(OperationKind::Mutation, shape, variables, options)
}

/// Constructs a `subscription` operation string from a shape.
pub fn construct_subscription(
    shape: &Shape,
    variables: Option<&Variables>,
    options: &[QueryOption],
) -> Result<String, ConstructError> {
    construct(OperationKind::Subscription, shape, variables, options)
}

fn construct(
    kind: OperationKind,
    shape: &Shape,
    variables: Option<&Variables>,
    options: &[QueryOption],
) -> Result<String, ConstructError> {
    let mut selection = String::new();
    write_selection(&mut selection, shape, false)?;

    let mut name = "";
    let mut directives: Vec<&str> = Vec::new();
    for option in options {
        match option {
            QueryOption::OperationName(n) => name = n.as_str(),
            QueryOption::OperationDirective(d) => directives.push(d.as_str()),
        }
    }
    // Directives carry a trailing space so a following selection set stays
    // separated: `query GetRepository @cached {…}`.
    let directives = if directives.is_empty() {
        String::new()
    } else {
        format!(" {} ", directives.join(" "))
    };

    let header = match variables {
        Some(variables) if !variables.is_empty() => Some(variables.header()?),
        _ => None,
    };

    Ok(match header {
        Some(header) => format!(
            "{} {}({}){}{}",
            kind.keyword(),
            name,
            header,
            directives,
            selection
        ),
        None if kind == OperationKind::Query && name.is_empty() && directives.is_empty() => {
            selection
        }
        None => {
            let mut out = String::from(kind.keyword());
            if !name.is_empty() {
                out.push(' ');
                out.push_str(name);
            }
            out.push_str(&directives);
            out.push_str(&selection);
            out
        }
    })
}

/// Emits the selection set for one shape node. With `inline` set, a record's
/// fields are spliced into the surrounding braces instead of opening new
/// ones.
fn write_selection(out: &mut String, shape: &Shape, inline: bool) -> Result<(), ConstructError> {
    match shape {
        Shape::Record(record) => write_record(out, record, inline),
        Shape::Pairs(pairs) => write_pairs(out, pairs, inline),
        Shape::Seq(seq) => write_selection(out, seq.prototype(), inline),
        Shape::Optional(optional) => write_selection(out, optional.prototype(), inline),
        // Leaves select by name alone.
        _ => Ok(()),
    }
}

fn write_record(out: &mut String, record: &Record, inline: bool) -> Result<(), ConstructError> {
    if !inline {
        out.push('{');
    }
    let mut first = true;
    for field in record.fields() {
        if field.graphql_tag() == Some("-") {
            continue;
        }
        if !first {
            out.push(',');
        }
        first = false;

        if field.is_embedded() && field.graphql_tag().is_none() {
            write_selection(out, field.shape(), true)?;
            continue;
        }
        match field.graphql_tag() {
            Some(tag) => out.push_str(tag),
            None => out.push_str(&derived_name(field.name())?),
        }
        if field.is_scalar() {
            // Opaque custom scalar: name only, never a sub-selection.
            continue;
        }
        write_selection(out, field.shape(), false)?;
    }
    if !inline {
        out.push('}');
    }
    Ok(())
}

fn write_pairs(out: &mut String, pairs: &Pairs, inline: bool) -> Result<(), ConstructError> {
    if !inline {
        out.push('{');
    }
    for (key, shape) in pairs.entries() {
        out.push_str(key);
        write_selection(out, shape, false)?;
    }
    if !inline {
        out.push('}');
    }
    Ok(())
}

fn derived_name(name: &str) -> Result<String, ConstructError> {
    if !variables::valid_name(name) {
        return Err(ConstructError::InvalidFieldName { name: name.into() });
    }
    Ok(ident::lower_camel_case(name))
}
