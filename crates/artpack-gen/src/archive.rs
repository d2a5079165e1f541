//! Art pack export
//!
//! Bundles every generated image into a zip laid out by category, and writes
//! single images under their download name.

use crate::state::AssetSnapshot;
use artpack_core::{ArtpackError, AssetSpec, GeneratedImage, Result};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default file name for the exported pack
pub const ARCHIVE_FILE_NAME: &str = "bubble_shooter_art_pack.zip";

fn collapse_whitespace(name: &str, sep: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(sep)
        .to_lowercase()
}

/// Path of an asset inside the archive: `<category>/<name>.png`
pub fn archive_path(spec: &AssetSpec) -> String {
    format!(
        "{}/{}.png",
        spec.category.display_name(),
        collapse_whitespace(&spec.name, "_")
    )
}

/// File name used when saving one asset on its own
pub fn download_file_name(name: &str) -> String {
    format!("{}.png", collapse_whitespace(name, "-"))
}

fn zip_err(e: zip::result::ZipError) -> ArtpackError {
    ArtpackError::ArchiveError(e.to_string())
}

/// Build the pack archive in memory. Returns `None` when no asset has an image.
pub fn export_archive(snapshot: &[AssetSnapshot]) -> Result<Option<Vec<u8>>> {
    let with_images: Vec<(&AssetSpec, &GeneratedImage)> = snapshot
        .iter()
        .filter_map(|a| a.state.image.as_ref().map(|img| (&a.spec, img)))
        .collect();
    if with_images.is_empty() {
        return Ok(None);
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();

    for (spec, image) in with_images {
        let bytes = image.decode()?;
        let mut path = archive_path(spec);
        if !used.insert(path.clone()) {
            // Two assets normalized to the same name; keep both
            path = format!("{}_{}.png", path.trim_end_matches(".png"), spec.id);
            used.insert(path.clone());
        }
        writer.start_file(path.as_str(), options).map_err(zip_err)?;
        writer.write_all(&bytes)?;
        tracing::debug!(id = %spec.id, %path, bytes = bytes.len(), "added to archive");
    }

    let cursor = writer.finish().map_err(zip_err)?;
    Ok(Some(cursor.into_inner()))
}

/// Write the pack to `path`. Returns the number of entries, 0 if nothing was written.
pub fn write_archive(path: &Path, snapshot: &[AssetSnapshot]) -> Result<usize> {
    let Some(bytes) = export_archive(snapshot)? else {
        return Ok(0);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;

    let entries = snapshot.iter().filter(|a| a.has_image()).count();
    tracing::info!(path = %path.display(), entries, "archive written");
    Ok(entries)
}

/// Save one image into `dir` under its download name
pub fn write_single(dir: &Path, spec: &AssetSpec, image: &GeneratedImage) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(download_file_name(&spec.name));
    std::fs::write(&path, image.decode()?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AssetState;
    use artpack_core::Catalog;
    use std::io::Read;

    fn snapshot_with(images: &[(&str, &str)]) -> Vec<AssetSnapshot> {
        Catalog::builtin()
            .iter()
            .map(|spec| {
                let image = images
                    .iter()
                    .find(|(id, _)| *id == spec.id)
                    .map(|(_, bytes)| GeneratedImage::from_bytes("image/png", bytes.as_bytes()));
                AssetSnapshot {
                    spec: spec.clone(),
                    state: AssetState {
                        image,
                        is_loading: false,
                    },
                }
            })
            .collect()
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("artpack_archive_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(download_file_name("Red Bubble"), "red-bubble.png");
        assert_eq!(download_file_name("  Main   Game\tBackground "), "main-game-background.png");

        let spec = Catalog::builtin().get("fx-pop").unwrap().clone();
        assert_eq!(archive_path(&spec), "Effects & FX/bubble_pop_fx.png");
    }

    #[test]
    fn test_empty_export_is_none() {
        assert_eq!(export_archive(&snapshot_with(&[])).unwrap(), None);
        assert_eq!(export_archive(&[]).unwrap(), None);
    }

    #[test]
    fn test_two_entry_archive() {
        let snapshot = snapshot_with(&[("b-red", "red-png"), ("bg-main", "bg-png")]);
        let bytes = export_archive(&snapshot).unwrap().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["Backgrounds/main_game_background.png", "Normal Bubbles/red_bubble.png"]
        );

        let mut content = Vec::new();
        archive
            .by_name("Normal Bubbles/red_bubble.png")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"red-png");
    }

    #[test]
    fn test_duplicate_names_kept_apart() {
        let mut snapshot = snapshot_with(&[("b-red", "one"), ("b-blue", "two")]);
        for asset in snapshot.iter_mut() {
            if asset.spec.id == "b-blue" {
                asset.spec.name = "Red Bubble".to_string();
            }
        }
        let bytes = export_archive(&snapshot).unwrap().unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_invalid_image_data_is_error() {
        let mut snapshot = snapshot_with(&[]);
        snapshot[0].state.image = Some(GeneratedImage::new("image/png", "not base64!!"));
        assert!(export_archive(&snapshot).is_err());
    }

    #[test]
    fn test_write_archive_and_single() {
        let dir = temp_dir();
        let snapshot = snapshot_with(&[("b-red", "red-png")]);

        let zip_path = dir.join("out").join(ARCHIVE_FILE_NAME);
        assert_eq!(write_archive(&zip_path, &snapshot).unwrap(), 1);
        assert!(zip_path.exists());

        let empty_path = dir.join("empty.zip");
        assert_eq!(write_archive(&empty_path, &snapshot_with(&[])).unwrap(), 0);
        assert!(!empty_path.exists());

        let red = snapshot.iter().find(|a| a.spec.id == "b-red").unwrap();
        let written = write_single(&dir, &red.spec, red.state.image.as_ref().unwrap()).unwrap();
        assert_eq!(written.file_name().unwrap(), "red-bubble.png");
        assert_eq!(std::fs::read(&written).unwrap(), b"red-png");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
