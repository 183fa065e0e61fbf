//! Controller layer: page events, reducer state transitions, and effect orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;
