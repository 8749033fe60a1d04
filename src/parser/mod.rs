//! Turning provider responses into the service's own types.

pub mod listing;
pub mod normalize;
