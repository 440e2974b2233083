//! Optional consumers that draw a tree through its public accessors.

#[cfg(feature = "graphviz")]
pub mod graphviz;

#[cfg(feature = "imagegen")]
pub mod image;
