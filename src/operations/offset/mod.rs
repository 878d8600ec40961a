mod inward_setback;
mod outward_setback;

pub use inward_setback::{InwardSetback, MITER_LIMIT};
pub use outward_setback::OutwardSetback;
