//! Progress reporting for database builds

/// Title shown by progress surfaces
pub const PROGRESS_TITLE: &str = "Building Image Tracking Libraries";

/// Receives build progress; the CLI draws a bar, embedders can forward it
pub trait BuildProgress {
    /// `fraction` is libraries checked so far over all libraries
    fn report(&mut self, library: &str, asset_id: &str, fraction: f32);

    /// Called once when the build ends, successfully or not
    fn clear(&mut self);
}

/// Records every report
#[cfg(test)]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordedProgress {
    pub reports: Vec<(String, f32)>,
    pub cleared: bool,
}

#[cfg(test)]
impl BuildProgress for RecordedProgress {
    fn report(&mut self, library: &str, _asset_id: &str, fraction: f32) {
        self.reports.push((library.to_string(), fraction));
    }

    fn clear(&mut self) {
        self.cleared = true;
    }
}
