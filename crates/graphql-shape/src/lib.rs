#![doc = include_str!("../README.md")]

mod decode;
mod error;
mod ident;
mod json;
mod query;
mod response;
mod shape;
mod variables;

pub use crate::decode::decode_response;
pub use crate::error::{ConstructError, DecodeError};
pub use crate::query::{
    construct_mutation, construct_query, construct_subscription, QueryOption,
};
pub use crate::response::{
    ErrorLocation, GraphQLError, PathSegment, Request, Response,
};
pub use crate::shape::{Field, Optional, Pairs, Record, Seq, Shape};
pub use crate::variables::{GraphqlTypeName, Id, Type, Variable, Variables};
