//! FINCACHE Core - Operation Vocabulary and Shared Types
//!
//! Pure data types shared by the cache layer: the named GraphQL operations
//! recognized by the finance application, the argument-map type with its
//! canonical serialization, and the store error taxonomy. No business logic
//! lives here.

pub mod args;
pub mod error;
pub mod operation;

pub use args::{canonical_json, canonicalize, ArgMap};
pub use error::{StoreError, StoreResult};
pub use operation::{MutationOp, QueryOp};
