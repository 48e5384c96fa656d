/// Image database build processor
///
/// Drives one build over every reference image library in a project:
/// - Load and prune the library cache
/// - Skip libraries whose cached timestamp is current
/// - Validate, convert and write the stale ones, one library at a time
/// - Persist the cache, even when a library fails

use std::fs;
use std::path::Path;

use super::database;
use super::jobs::ConversionPool;
use crate::asset::{import, AssetPipeline};
use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::progress::BuildProgress;
use crate::state::cache::LibraryCache;
use crate::state::data::ImageLibrary;

/// Libraries larger than this still build but may track poorly
pub const MAX_RECOMMENDED_IMAGES: usize = 25;

/// What a build did, by library id
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Libraries whose database was (re)written
    pub written: Vec<String>,
    /// Libraries found up to date
    pub skipped: Vec<String>,
    /// Cache entries dropped for libraries that no longer exist
    pub pruned: usize,
}

/// Build the image tracking databases for every library in the project
///
/// Validation errors abort the whole build. The cache is saved and the
/// progress surface cleared whether or not the build succeeds.
pub fn build_image_tracking_assets<P: AssetPipeline + ?Sized>(
    pipeline: &P,
    config: &BuildConfig,
    progress: &mut dyn BuildProgress,
) -> Result<BuildSummary> {
    fs::create_dir_all(&config.output_dir)?;

    let libraries = pipeline.libraries()?;
    let known: Vec<&str> = libraries.iter().map(|library| library.id.as_str()).collect();

    let mut cache = LibraryCache::load(&config.cache_path);
    let pruned = cache.prune(&known);
    if pruned > 0 {
        log::info!("🧹 Pruned {} cache entries for removed libraries", pruned);
    }

    let mut summary = BuildSummary {
        pruned,
        ..Default::default()
    };

    let outcome = ConversionPool::new()
        .map_err(BuildError::from)
        .and_then(|pool| {
            process_libraries(pipeline, config, &libraries, &mut cache, &pool, progress, &mut summary)
        });

    let saved = cache.save(&config.cache_path);
    progress.clear();

    outcome?;
    saved?;

    log::info!(
        "✅ Image databases: {} written, {} up to date",
        summary.written.len(),
        summary.skipped.len()
    );
    Ok(summary)
}

fn process_libraries<P: AssetPipeline + ?Sized>(
    pipeline: &P,
    config: &BuildConfig,
    libraries: &[ImageLibrary],
    cache: &mut LibraryCache,
    pool: &ConversionPool,
    progress: &mut dyn BuildProgress,
    summary: &mut BuildSummary,
) -> Result<()> {
    let total = libraries.len();

    for (index, library) in libraries.iter().enumerate() {
        let timestamp = pipeline.library_timestamp(library)?;
        let output = config.database_path(&library.id);
        let stale = cache.needs_rebuild(&library.id, timestamp);

        progress.report(&library.name, &library.id, (index + 1) as f32 / total as f32);

        if !stale {
            log::debug!("'{}' is up to date", library.name);
            summary.skipped.push(library.id.clone());
            continue;
        }

        if let Err(e) = build_library(pipeline, library, &output, pool) {
            // Never record a library as built when its database was not written
            cache.invalidate(&library.id);
            return Err(e);
        }
        summary.written.push(library.id.clone());
    }

    Ok(())
}

/// Validate every image of a library, naming the first offender
pub fn validate_library<P: AssetPipeline + ?Sized>(pipeline: &P, library: &ImageLibrary) -> Result<()> {
    for image in &library.images {
        image.validate().map_err(|reason| BuildError::InvalidImage {
            library: library.name.clone(),
            texture: pipeline.texture_name(&image.texture),
            reason,
        })?;
    }
    Ok(())
}

fn build_library<P: AssetPipeline + ?Sized>(
    pipeline: &P,
    library: &ImageLibrary,
    output: &Path,
    pool: &ConversionPool,
) -> Result<()> {
    if library.len() > MAX_RECOMMENDED_IMAGES {
        log::warn!(
            "⚠️  Image Library '{}' has an image count of '{}' which is larger than the suggested number of images that can be tracked at once. This library could suffer performance issues.",
            library.name,
            library.len()
        );
    }

    validate_library(pipeline, library)?;

    let mut batch = pool.batch(library.len());
    for image in &library.images {
        let name = pipeline.texture_name(&image.texture);
        let state = pipeline.texture_state(&image.texture)?;

        let raw = if state.is_convertible() {
            pipeline.raw_texture_data(&image.texture)?
        } else {
            // Nothing may still be converting while the pipeline reimports
            batch.settle()?;
            log::info!(
                "Reimporting '{}' for conversion (format {}, readable: {}, mips: {})",
                name,
                state.format,
                state.readable,
                state.mip_count
            );
            import::read_with_override(pipeline, &image.texture)?
        };

        batch.submit(name, raw);
    }

    let images = batch.join()?;
    database::write_database_file(output, &images)?;

    log::info!(
        "📦 Wrote {} images for '{}' to {}",
        images.len(),
        library.name,
        output.display()
    );
    Ok(())
}
