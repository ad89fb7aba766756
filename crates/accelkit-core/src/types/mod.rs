//! Index-space value types: dimensions, indices, vectors and work divisions.

pub mod dim;
pub mod idx;
pub mod vec;
pub mod workdiv;

pub use dim::{Dim1, Dim2, Dim3, DimInt, Dimension};
pub use idx::Index;
pub use vec::Vector;
pub use workdiv::{is_valid_work_div, valid_work_div, WorkDivMembers};
