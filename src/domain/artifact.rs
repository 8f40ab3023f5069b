use std::path::PathBuf;

/// Derives `<name>_<position>.pdf`. Spaces and path separators become `_`.
pub fn pdf_file_name(name: &str, position: &str) -> String {
    format!("{}_{}.pdf", sanitize(name), sanitize(position))
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub record_name: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Outcome of one harvest run.
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub found: usize,
    pub downloaded: Vec<DownloadedArtifact>,
    /// Records without a usable retrieval trigger.
    pub skipped: usize,
    pub failed: usize,
}
