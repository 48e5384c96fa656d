use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;

use imgdb_builder::progress::PROGRESS_TITLE;
use imgdb_builder::{build_image_tracking_assets, BuildConfig, BuildProgress, BuildSummary, ProjectAssets};

/// Resolution of the progress bar (fractions are mapped onto this many steps)
const PROGRESS_STEPS: u64 = 1000;

/// Terminal progress bar for the build
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(PROGRESS_STEPS);
        let style = ProgressStyle::default_bar()
            .template("{prefix} [{bar:30}] {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        bar.set_prefix(PROGRESS_TITLE);
        Self { bar }
    }
}

impl BuildProgress for BarProgress {
    fn report(&mut self, library: &str, asset_id: &str, fraction: f32) {
        self.bar.set_message(format!("{}: {}", library, asset_id));
        self.bar
            .set_position((fraction.clamp(0.0, 1.0) * PROGRESS_STEPS as f32) as u64);
    }

    fn clear(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn run(root: PathBuf) -> Result<BuildSummary, imgdb_builder::BuildError> {
    let config = BuildConfig::load(root)?;
    let project = ProjectAssets::new(config.project_root.clone());
    let mut progress = BarProgress::new();

    log::info!("🔍 Scanning project: {}", config.project_root.display());
    build_image_tracking_assets(&project, &config, &mut progress)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Single optional argument: the project directory
    let root = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    match run(root) {
        Ok(summary) => {
            log::debug!("Build summary: {:?}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("❌ Image database build failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
