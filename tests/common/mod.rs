mod assertions;
mod harness;

// Re-export
pub use assertions::*;
pub use harness::{DeliveryHarness, HoverHarness};
