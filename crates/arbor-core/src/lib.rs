#![forbid(unsafe_code)]

//! Tree model used by `arbor-render`.
//!
//! A [`Tree`] owns its nodes in an arena and addresses them by [`NodeId`]. Nodes are looked up
//! by name with a breadth-first search (first match wins), which is also how insertion finds a
//! parent and how removal finds its target.

pub mod data;
pub mod error;
pub mod geom;
pub mod link;
pub mod tree;

pub use data::TreeData;
pub use error::{Error, Result};
pub use geom::Point;
pub use link::LinkKey;
pub use tree::{NodeId, Tree, TreeNode};
