/// Per-image conversion jobs
///
/// Each image of a library is converted on the runtime's blocking pool.
/// Results land in a slot matching the submission index, so the writer sees
/// them in library order whatever order the jobs finish in.

use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

use crate::color::{self, ConversionError, ConvertedImage, RawTexture};
use crate::error::{BuildError, Result};

/// Worker pool shared by every library of one build
pub struct ConversionPool {
    runtime: Runtime,
}

impl ConversionPool {
    pub fn new() -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread()
            .thread_name("imgdb-convert")
            .build()?;
        Ok(Self { runtime })
    }

    /// Start an empty batch for one library
    pub fn batch(&self, capacity: usize) -> ConversionBatch<'_> {
        ConversionBatch {
            pool: self,
            pending: Vec::with_capacity(capacity),
            finished: Vec::with_capacity(capacity),
        }
    }
}

struct PendingConversion {
    slot: usize,
    texture: String,
    handle: JoinHandle<std::result::Result<ConvertedImage, ConversionError>>,
}

/// Conversions submitted for one library
///
/// Dropping a batch early releases every buffer it owns; jobs already
/// running finish on the pool and their output is discarded.
pub struct ConversionBatch<'p> {
    pool: &'p ConversionPool,
    pending: Vec<PendingConversion>,
    finished: Vec<Option<ConvertedImage>>,
}

impl ConversionBatch<'_> {
    /// Hand a texture's pixels to a worker; the slot is the submission order
    pub fn submit(&mut self, texture: String, raw: RawTexture) {
        let slot = self.finished.len();
        self.finished.push(None);

        let handle = self
            .pool
            .runtime
            .spawn_blocking(move || color::to_luminance(&raw));
        self.pending.push(PendingConversion { slot, texture, handle });
    }

    /// Number of jobs not yet waited on
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Block until every submitted job has finished
    pub fn settle(&mut self) -> Result<()> {
        for job in std::mem::take(&mut self.pending) {
            let converted = self
                .pool
                .runtime
                .block_on(job.handle)?
                .map_err(|source| BuildError::Conversion {
                    texture: job.texture,
                    source,
                })?;
            self.finished[job.slot] = Some(converted);
        }
        Ok(())
    }

    /// Wait for all jobs and return the images in submission order
    pub fn join(mut self) -> Result<Vec<ConvertedImage>> {
        self.settle()?;
        Ok(self.finished.into_iter().flatten().collect())
    }
}
