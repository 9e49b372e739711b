pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{assert_points, assert_round};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
