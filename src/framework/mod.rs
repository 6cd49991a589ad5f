//! Provider framework
//!
//! - [`diag`] - Diagnostics returned by every lifecycle call
//! - [`schema`] - Attribute and block declarations, validation and planning
//! - [`validators`] - Attribute validators and duration parsing
//! - [`resource`] - Resource and data-source traits

pub mod diag;
pub mod resource;
pub mod schema;
pub mod validators;

pub use diag::{Diagnostic, Diagnostics, Severity};
pub use resource::{
    decode, encode, full_type_name, DataSource, DataSourceFactory, DiagResult, Resource,
    ResourceFactory,
};
pub use schema::{Attribute, AttributeType, Block, Plan, PlanModifier, Schema};
pub use validators::{format_duration, parse_duration, Validator};
