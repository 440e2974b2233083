//! Integer geometry primitives: point tuples and the axis-aligned
//! bounding rectangles the tree is built from.

use thiserror::Error;

mod bounds;
mod tuple;

#[cfg(test)]
mod tests;

pub use bounds::{Bounds, IntoBounds};
pub use tuple::{IntoTuple, Tuple};

#[derive(Error, Debug, PartialEq)]
pub enum GeometryError {
    #[error("operands have unmatched dimensions {0} and {1}")]
    UnmatchedDimensions(usize, usize),
}

pub(crate) fn check_dimensions_match(left: usize, right: usize) -> Result<(), GeometryError> {
    if left != right {
        return Err(GeometryError::UnmatchedDimensions(left, right));
    }

    Ok(())
}
