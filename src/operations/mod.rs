pub mod array;
pub mod grid;
pub mod offset;
pub mod reconcile;
