//! In-memory traced graph implementing the native capability traits.
//!
//! A [`TracedGraph`] is a validated snapshot of a scripted graph: a value table plus a tree
//! of nodes and blocks that reference values by [`ValueId`](crate::ir::ValueId). It can be
//! loaded from a JSON dump or assembled with [`GraphBuilder`], and decoded through
//! [`TracedGraph::root`].

mod builder;
mod graph;

pub use builder::*;
pub use graph::*;
