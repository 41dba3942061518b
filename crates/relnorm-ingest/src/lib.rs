//! Schema text ingestion and output: the line-oriented parser, the
//! serializer, and CSV sample loading.

pub mod error;
pub mod parser;
pub mod samples;
pub mod writer;

pub use error::{IngestError, Result};
pub use parser::{RelationBlock, parse_blocks, parse_dependency, parse_schema, read_schema};
pub use samples::read_samples;
pub use writer::{render_relation, render_schema, write_schema};
