//! Data model for relational schema normalization.

pub mod dependency;
pub mod error;
pub mod normal_form;
pub mod relation;

pub use dependency::{FunctionalDependency, braced, same_attribute_set};
pub use error::{Result, SchemaError};
pub use normal_form::NormalForm;
pub use relation::{Attribute, Relation, Tuple};
