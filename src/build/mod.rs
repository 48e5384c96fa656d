/// Image database build module
///
/// This module handles turning reference image libraries into databases:
/// - Orchestrating one build over all libraries (processor.rs)
/// - Running per-image luminance conversions concurrently (jobs.rs)
/// - Reading and writing the binary database format (database.rs)

pub mod database;
pub mod jobs;
pub mod processor;
