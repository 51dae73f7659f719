//! Resolve command-line paths into the list of images to upload

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Expand directories into the images they contain.
///
/// Anything that is not a directory is kept as named, even if it does not
/// exist; reading it later reports the failure against that image.
/// Directory contents are filtered by extension and sorted by path.
pub fn collect_image_paths(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for root in roots {
        if root.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(root) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::warn!(dir = %root.display(), error = %err, "skipping entry");
                        continue;
                    }
                };
                if entry.file_type().is_file() && is_image(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            if found.is_empty() {
                tracing::warn!(dir = %root.display(), "no images found");
            }
            paths.extend(found);
        } else {
            paths.push(root.clone());
        }
    }

    paths
}
