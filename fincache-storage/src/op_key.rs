//! User-scoped cache keys for operation results.
//!
//! The key insight is that `OperationKey`'s private constructor makes
//! user-unscoped cache access UNCOMPILABLE. You cannot construct a key
//! without explicitly providing a user id.

use fincache_core::{canonical_json, ArgMap};

/// Namespace prefix for all operation-result keys.
pub const KEY_NAMESPACE: &str = "gql";

/// Separator between key segments.
const SEPARATOR: char = ':';

/// A cache key scoped to a specific user.
///
/// # Text Format
///
/// The key renders to `gql:<userId>:<operationName>[:<canonical args JSON>]`.
/// The argument suffix is omitted entirely when the argument map is empty,
/// so no-argument operations always map to the same key. Argument JSON is
/// canonical (object keys sorted at every nesting level): two reads with the
/// same operation and semantically equal arguments render the same key
/// regardless of insertion order.
///
/// User ids are the opaque identifiers of authenticated principals (UUIDs in
/// practice) and are expected not to contain the `:` separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    /// Private inner data - cannot be constructed externally
    inner: OpKeyInner,
}

/// Private inner struct - prevents external construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OpKeyInner {
    user_id: String,
    operation: String,
    args_json: Option<String>,
}

impl OperationKey {
    /// Create a new user-scoped operation key.
    ///
    /// This is the ONLY way to construct an `OperationKey`, ensuring that
    /// all cache operations are user-isolated by construction.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The authenticated principal this key belongs to
    /// * `operation` - The named read operation
    /// * `args` - The operation arguments (canonicalized before rendering)
    pub fn new(user_id: &str, operation: &str, args: &ArgMap) -> Self {
        let args_json = if args.is_empty() {
            None
        } else {
            Some(canonical_json(args))
        };
        Self {
            inner: OpKeyInner {
                user_id: user_id.to_string(),
                operation: operation.to_string(),
                args_json,
            },
        }
    }

    /// Get the user id this key is scoped to.
    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    /// Get the operation name for this key.
    pub fn operation(&self) -> &str {
        &self.inner.operation
    }

    /// Whether this key carries an argument suffix.
    pub fn has_args(&self) -> bool {
        self.inner.args_json.is_some()
    }

    /// Render this key to its store representation.
    pub fn render(&self) -> String {
        match &self.inner.args_json {
            Some(json) => format!(
                "{KEY_NAMESPACE}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{json}",
                self.inner.user_id, self.inner.operation
            ),
            None => format!(
                "{KEY_NAMESPACE}{SEPARATOR}{}{SEPARATOR}{}",
                self.inner.user_id, self.inner.operation
            ),
        }
    }

    /// Prefix shared by every key for one (user, operation) group.
    ///
    /// Invalidation purges the exact prefix key (the no-argument variant)
    /// plus every key starting with the prefix followed by the separator
    /// (every argument variant). Matching on the separator keeps operations
    /// that share a textual prefix apart.
    pub fn group_prefix(user_id: &str, operation: &str) -> String {
        format!("{KEY_NAMESPACE}{SEPARATOR}{user_id}{SEPARATOR}{operation}")
    }
}
