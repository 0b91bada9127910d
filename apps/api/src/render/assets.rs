//! Asset locator: resolves logical image names to files on disk.
//!
//! Layout under the assets root:
//! ```text
//! animals/<difficulty>/*.png   cartoon shown beside the worksheet title
//! stars/star-<n>.png           decorative stars in the right margin
//! ```
//! A missing file is not an error; the worksheet is drawn without it.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::drill::difficulty::Difficulty;
use crate::drill::question::NumberSource;

pub trait AssetLocator: Send + Sync {
    /// Picks one cartoon for `difficulty` using `source`.
    fn cartoon(&self, difficulty: Difficulty, source: &mut dyn NumberSource) -> Option<PathBuf>;

    /// Path of star image `number`, if present.
    fn star(&self, number: u8) -> Option<PathBuf>;
}

/// Reads assets from a directory tree.
#[derive(Debug, Clone)]
pub struct DirAssetLocator {
    root: PathBuf,
}

impl DirAssetLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirAssetLocator { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLocator for DirAssetLocator {
    fn cartoon(&self, difficulty: Difficulty, source: &mut dyn NumberSource) -> Option<PathBuf> {
        let dir = self.root.join("animals").join(difficulty.slug());
        let mut images = match list_images(&dir) {
            Ok(images) => images,
            Err(e) => {
                warn!("Cannot read cartoon directory {}: {e}", dir.display());
                return None;
            }
        };
        if images.is_empty() {
            debug!("No cartoons found in {}", dir.display());
            return None;
        }
        // Directory order is platform-dependent; sort so a seeded source is reproducible.
        images.sort();
        let last = images.len() as i64 - 1;
        let pick = source.next_in_range(0, last) as usize;
        let selected = images.swap_remove(pick);
        debug!("Selected cartoon {}", selected.display());
        Some(selected)
    }

    fn star(&self, number: u8) -> Option<PathBuf> {
        let path = self
            .root
            .join("stars")
            .join(format!("star-{number}.png"));
        path.is_file().then_some(path)
    }
}

fn list_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            images.push(path);
        }
    }
    Ok(images)
}

/// Locator that never finds anything. Used when no assets are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetLocator for NoAssets {
    fn cartoon(&self, _difficulty: Difficulty, _source: &mut dyn NumberSource) -> Option<PathBuf> {
        None
    }

    fn star(&self, _number: u8) -> Option<PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::question::RngSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"not really a png").unwrap();
    }

    #[test]
    fn test_cartoon_picked_from_difficulty_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("animals/easy/cat.png"));
        touch(&dir.path().join("animals/easy/dog.PNG"));
        touch(&dir.path().join("animals/easy/notes.txt"));
        touch(&dir.path().join("animals/hard/owl.png"));

        let locator = DirAssetLocator::new(dir.path());
        let mut source = RngSource(StdRng::seed_from_u64(5));
        for _ in 0..20 {
            let picked = locator.cartoon(Difficulty::Easy, &mut source).unwrap();
            assert!(picked.starts_with(dir.path().join("animals/easy")));
            assert_ne!(picked.extension().unwrap(), "txt");
        }
    }

    #[test]
    fn test_missing_cartoon_directory_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let locator = DirAssetLocator::new(dir.path());
        let mut source = RngSource(StdRng::seed_from_u64(5));
        assert_eq!(locator.cartoon(Difficulty::Medium, &mut source), None);
    }

    #[test]
    fn test_star_lookup() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("stars/star-8.png"));
        let locator = DirAssetLocator::new(dir.path());
        assert_eq!(
            locator.star(8),
            Some(dir.path().join("stars").join("star-8.png"))
        );
        assert_eq!(locator.star(9), None);
    }
}
