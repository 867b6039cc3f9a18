//! Value objects - immutable types that represent domain concepts

mod ids;
mod timestamp;

pub use ids::{DocumentId, IdentityId};
pub use timestamp::{now_millis, truncate_to_millis};
