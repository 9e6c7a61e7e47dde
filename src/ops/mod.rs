pub mod graph;
pub mod layout;
pub mod search;
pub mod store;
pub mod tree;
