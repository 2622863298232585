//! # Sift
//!
//! Type-checked filter expressions for a remote object search engine.
//!
//! Sift provides:
//! - Fluent builders for property, reference, identifier, and timestamp filters
//! - Construction-time validation of operators and values
//! - Boolean composition with `&`, `|`, and `!`
//! - Compilation to the engine's nested wire message
//!
//! ## Quick Start
//!
//! ```rust
//! use sift::prelude::*;
//!
//! # fn main() -> sift::FilterResult<()> {
//! let filter = property("name").equal("Alice")?
//!     & reference("wrote").in_collection("Article").property("title").like("Rust*")?
//!     & !id().equal("a1b2c3d4-e5f6-4711-8899-aabbccddeeff")?;
//!
//! let wire = compile(&filter);
//! assert_eq!(wire.filters.len(), 2);
//! # Ok(())
//! # }
//! ```

/// Re-export of the core crate.
pub mod query {
    pub use sift_query::*;
}

pub use sift_query::{
    Compiler, ConfigError, Filters, FilterError, FilterResult, Operator, Predicate, SiftConfig,
    Value, WireFilter, all_of, any_of, compile, creation_time, id, logging, not, property,
    reference, update_time,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sift_query::prelude::*;
    pub use sift_query::SiftConfig;
}
