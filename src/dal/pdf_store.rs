use std::path::{Path, PathBuf};

/// Writes `bytes` to `output_dir/file_name`, creating the directory if needed.
/// An existing file with the same name is overwritten.
pub async fn save_pdf(
    output_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, std::io::Error> {
    tokio::fs::create_dir_all(output_dir).await?;

    let path = output_dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;

    Ok(path)
}
