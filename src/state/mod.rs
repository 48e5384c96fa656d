/// Build state module
///
/// This module handles the data the build reads and persists:
/// - Library and reference image data structures (data.rs)
/// - The per-library modification cache kept between runs (cache.rs)

pub mod cache;
pub mod data;
