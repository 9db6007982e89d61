//! Utility types shared by the sampling engine.

pub mod cancel;
pub mod random;

pub use cancel::{AbortFlag, NeverAbort};
pub use random::Random;
