//! Tools to support the integration tests.

pub mod logging;
pub mod test_tools;
