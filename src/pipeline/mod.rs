pub mod builder;
pub mod graph;
