//! # sift-query
//!
//! Client-side filter expressions for a remote object search engine.
//!
//! This crate provides:
//! - Fluent builders that start at a property, a reference chain, the object
//!   identifier, or a metadata timestamp
//! - Validation of operators and values at construction time
//! - Boolean composition with `all_of`, `any_of`, `not` and the `&`, `|`, `!`
//!   operators
//! - A compiler that lowers a finished predicate tree into the engine's
//!   nested wire message
//!
//! ## Building Filters
//!
//! ```rust
//! use sift_query::{all_of, property, reference};
//!
//! # fn main() -> sift_query::FilterResult<()> {
//! let filter = all_of([
//!     property("name").equal("Alice")?,
//!     property("title").length().greater_than(3)?,
//!     reference("friends").count().less_than(10)?,
//! ])?;
//!
//! assert_eq!(filter.leaf_count(), 3);
//! assert_eq!(
//!     filter.to_string(),
//!     r#"(name = "Alice" AND len(title) > 3 AND count(friends) < 10)"#
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Compiling
//!
//! ```rust
//! use sift_query::{compile, property};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let wire = compile(&property("age").greater_than_or_equal(18)?);
//!
//! assert_eq!(
//!     wire.to_json_value()?,
//!     json!({
//!         "operator": "GREATER_THAN_EQUAL",
//!         "target": { "property": "age" },
//!         "valueInt": 18
//!     })
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every error is raised while building; compiling never fails. See
//! [`FilterError`] for the error kinds and their codes.
//!
//! ## Configuration
//!
//! Encoding and debug settings can be read from a `sift.toml` file with
//! [`SiftConfig`], which hands out a configured [`Filters`] factory and
//! [`Compiler`].

pub mod builder;
pub mod compiler;
pub mod config;
pub mod error;
pub mod logging;
pub mod operator;
pub mod predicate;
pub mod target;
pub mod value;
pub mod wire;

pub use builder::{
    CountBuilder, Filters, IdBuilder, LeafBuilder, LengthBuilder, PropertyBuilder,
    ReferenceBuilder, TimestampBuilder, creation_time, id, property, reference, update_time,
};
pub use compiler::{Compiler, compile, compile_target};
pub use config::{ConfigError, ConfigResult, SiftConfig};
pub use error::{FilterError, FilterResult};
pub use operator::Operator;
pub use predicate::{Combinator, Leaf, Predicate, all_of, any_of, not};
pub use target::{Target, TargetKind};
pub use value::{EncodedValue, GeoRange, TimestampPrecision, Value, ValueEncoder, ValueKind};
pub use wire::{WireFilter, WireOperator, WireTarget};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{
        Filters, LeafBuilder, creation_time, id, property, reference, update_time,
    };
    pub use crate::compiler::{Compiler, compile};
    pub use crate::error::{FilterError, FilterResult};
    pub use crate::operator::Operator;
    pub use crate::predicate::{Predicate, all_of, any_of, not};
    pub use crate::value::{GeoRange, Value};
    pub use crate::wire::WireFilter;
}
