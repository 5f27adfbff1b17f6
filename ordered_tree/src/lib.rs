//! An ordered key/value tree with parent links and no self-balancing.
//!
//! Keys that compare equal are kept side by side: a duplicate always goes to
//! the right subtree of the equal node that is already in the tree.

#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

mod error;
mod traversal;
mod tree;

pub use error::{InvalidArgument, TreeError};
pub use traversal::Traversal;
pub use tree::OrderedTree;
