//! # nametree
//!
//! Immutable hierarchical **names** and a small in-memory **node tree** built
//! on top of them.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use nametree::{Name, Tree};
//!
//! // Names are values: every "mutation" returns a new Name.
//! let name = Name::new(["a.b", "c"], '.')?;
//! assert_eq!(name.as_string(), "a.b.c");
//! assert_eq!(name.as_data_string(), r"a\.b.c");
//! assert_eq!(Name::parse(&name.as_data_string(), '.')?, name);
//!
//! // Trees hand out handles; nodes register with their parent on creation.
//! let mut tree = Tree::new();
//! let docs = tree.create_directory("docs", tree.root())?;
//! let readme = tree.create_file("README", docs)?;
//! assert_eq!(tree.full_name(readme)?.as_string(), "docs/README");
//! # Ok::<(), nametree::ContractError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Name`] | Immutable sequence of components with a delimiter |
//! | [`Tree`] | Arena of root, directory and file nodes |
//! | [`NodeId`] / [`DirectoryId`] | Stable handles into a [`Tree`] |
//! | [`ContractError`] | Contract violation with cause chaining |
//! | [`Invariant`] | Types whose class invariant can be checked |
//!
//! ---
//!
//! ## Data Strings
//!
//! [`Name::as_data_string`] is the only representation meant for storage or
//! transmission. Inside each component every delimiter and every
//! [`ESCAPE_CHARACTER`] is prefixed with the escape character, so
//! [`Name::parse`] recovers the exact components:
//!
//! ```text
//! ["a.b", "c\\d"]  ──as_data_string──▶  a\.b.c\\d  ──parse──▶  ["a.b", "c\\d"]
//! ```
//!
//! ---
//!
//! ## Contracts
//!
//! Every operation checks its preconditions first, then computes a tentative
//! result, checks the postcondition, and re-checks invariants. Failures map
//! onto [`ContractError`]:
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | `IllegalArgument` | a precondition fails (nothing was touched) |
//! | `InvalidState` | a class invariant is broken |
//! | `MethodFailed` | a postcondition fails (the change was rolled back) |
//! | `ServiceFailure` | a lower layer failed; the cause is attached |
//!
//! The checks themselves live in [`contract`] and can be reused.
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`Name`] is immutable and `Send + Sync`; share it freely. [`Tree`]
//! mutations take `&mut self`, so concurrent writers need one lock around
//! the whole tree.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Name`] (as its data string), [`NodeId`], [`DirectoryId`], [`NodeKind`], [`ErrorKind`] |
//!
//! ---
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: `debug`
//! for tree changes, `trace` for name derivations, `warn` for rollbacks and
//! injected faults. Install any logger to see them.

// Public modules
pub mod contract;

// Private modules
mod error;
mod escape;
mod name;
mod tree;
mod types;

#[cfg(test)]
mod proptests;

// Public re-exports - error types
pub use error::{ContractError, ErrorKind};

// Public re-exports - contracts
pub use contract::Invariant;

// Public re-exports - core types
pub use types::{DEFAULT_DELIMITER, DirectoryId, ESCAPE_CHARACTER, NodeId, NodeKind, PATH_DELIMITER};

// Public re-exports - names
pub use escape::{escape_component, split_data_string, unescape_component};
pub use name::{Name, delimiter_from_str};

// Public re-exports - tree
pub use tree::Tree;
