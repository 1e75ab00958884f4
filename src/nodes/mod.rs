//! The compile-time composition tree: the node base, the link capability
//! contracts and one module per concrete node-kind family.

pub mod governance;
pub mod graph;
pub mod kinds;
pub mod links;
pub mod managed_object;
pub mod node;
pub mod office;
pub mod section;
pub mod supplier;
pub mod team;
