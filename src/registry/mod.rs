//! Registry assembly and output.
//!
//! `builder` turns discovered services into [`Template`] records, `schema`
//! checks the envelope shape against the bundled JSON Schema, and `output`
//! confines and performs the single write of the run.

pub mod builder;
pub mod model;
pub mod output;
pub mod schema;

pub use builder::{build_registry, build_template, raw_url};
pub use model::{Registry, Template};
pub use output::{resolve_output_path, write_registry};
pub use schema::validate_registry_shape;
