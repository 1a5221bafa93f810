pub mod cache;
pub mod chart;
pub mod dedup;
pub mod directory;
pub mod extractor;
pub mod orchestrator;
pub mod reply;
pub mod resolver;
pub mod sources;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
