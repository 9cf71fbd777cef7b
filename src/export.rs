//! Export of enhanced frames to files and archives
//!
//! Single-file export writes one encoded image; archive export packages every
//! item into one zip with deterministic entry names. Archive export is
//! all-or-nothing: a failure for any item aborts the whole operation and no
//! partial archive is produced.

use crate::config::DEFAULT_JPEG_QUALITY;
use crate::error::{Result, StudioError};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use log::info;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Encoded output formats for export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Lossless PNG with alpha
    Png,
    /// JPEG; alpha is dropped
    Jpeg,
}

impl ExportFormat {
    /// File extension for this format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// One frame headed for an archive
#[derive(Debug, Clone)]
pub struct ExportItem {
    /// Encoded into the archive entry
    pub image: DynamicImage,
    /// Angle label used to derive the entry name
    pub label: String,
}

/// Encode an image to bytes in the given format
///
/// # Errors
/// Returns `Export` when the buffer cannot be serialized.
pub fn encode(image: &DynamicImage, format: ExportFormat, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(StudioError::export("cannot encode a zero-dimension image"));
    }
    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => {
            image
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| StudioError::export(format!("PNG encoding failed: {e}")))?;
        },
        ExportFormat::Jpeg => {
            // JPEG has no alpha; flatten first
            let rgb = image.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| StudioError::export(format!("JPEG encoding failed: {e}")))?;
        },
    }
    Ok(bytes)
}

/// Write one encoded frame to `path`
///
/// # Errors
/// `Export` for serialization failures, `DeviceIo` for filesystem failures.
pub fn export_one<P: AsRef<Path>>(
    image: &DynamicImage,
    path: P,
    format: ExportFormat,
    quality: u8,
) -> Result<()> {
    let bytes = encode(image, format, quality)?;
    std::fs::write(path.as_ref(), bytes)?;
    info!("exported {}", path.as_ref().display());
    Ok(())
}

/// Deterministic archive entry name for an item
///
/// Index is 1-based; the label is lower-cased with whitespace runs replaced by
/// hyphens.
#[must_use]
pub fn entry_name(index: usize, label: &str) -> String {
    let slug = label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}.jpg", index + 1, slug)
}

/// Build a zip archive of every item, in memory
///
/// Entries live under a `{session_name}/` folder. Any item failure aborts the
/// whole operation; no bytes are returned on error.
///
/// # Errors
/// Returns `Export` when any item cannot be serialized or the archive cannot
/// be assembled.
pub fn export_archive(items: &[ExportItem], session_name: &str, quality: u8) -> Result<Vec<u8>> {
    if items.is_empty() {
        return Err(StudioError::export("nothing to archive"));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (index, item) in items.iter().enumerate() {
        let encoded = encode(&item.image, ExportFormat::Jpeg, quality)?;
        let name = format!("{session_name}/{}", entry_name(index, &item.label));
        writer
            .start_file(name, options)
            .map_err(|e| StudioError::export(format!("failed to start archive entry: {e}")))?;
        writer
            .write_all(&encoded)
            .map_err(|e| StudioError::export(format!("failed to write archive entry: {e}")))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| StudioError::export(format!("failed to finalize archive: {e}")))?;
    Ok(cursor.into_inner())
}

/// Write a zip archive of every item to `path`
///
/// The file is created only after the whole archive was assembled, so a
/// failing item never leaves a partial archive behind.
///
/// # Errors
/// `Export` for serialization/archival failures, `DeviceIo` for filesystem
/// failures.
pub fn export_all<P: AsRef<Path>>(items: &[ExportItem], session_name: &str, path: P) -> Result<()> {
    let bytes = export_archive(items, session_name, DEFAULT_JPEG_QUALITY)?;
    std::fs::write(path.as_ref(), bytes)?;
    info!(
        "exported {} items to {}",
        items.len(),
        path.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::io::Read;
    use zip::ZipArchive;

    fn frame(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([80, 90, 100, 255])))
    }

    #[test]
    fn entry_names_are_deterministic() {
        assert_eq!(entry_name(0, "Front 3 4 Left"), "1-front-3-4-left.jpg");
        assert_eq!(entry_name(2, "Rear"), "3-rear.jpg");
        assert_eq!(entry_name(1, "  Side   View "), "2-side-view.jpg");
    }

    #[test]
    fn encode_png_round_trips() {
        let bytes = encode(&frame(8, 8), ExportFormat::Png, 100).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn export_one_writes_a_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.jpg");
        export_one(&frame(16, 16), &path, ExportFormat::Jpeg, 92).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 16);
    }

    #[test]
    fn archive_contains_one_entry_per_item_in_order() {
        let items = vec![
            ExportItem {
                image: frame(8, 8),
                label: "Front Left".to_string(),
            },
            ExportItem {
                image: frame(8, 8),
                label: "Rear".to_string(),
            },
        ];
        let bytes = export_archive(&items, "summer-shoot", 92).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), "summer-shoot/1-front-left.jpg");
        assert_eq!(archive.by_index(1).unwrap().name(), "summer-shoot/2-rear.jpg");
    }

    #[test]
    fn archive_entries_decode_back_to_images() {
        let items = vec![ExportItem {
            image: frame(12, 10),
            label: "Side".to_string(),
        }];
        let bytes = export_archive(&items, "s", 92).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_index(0).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 10));
    }

    #[test]
    fn empty_archive_is_an_export_error() {
        let err = export_archive(&[], "s", 92).unwrap_err();
        assert!(matches!(err, StudioError::Export(_)));
    }

    #[test]
    fn failing_item_aborts_the_whole_archive() {
        // A zero-dimension image cannot be encoded as JPEG
        let items = vec![
            ExportItem {
                image: frame(8, 8),
                label: "Good".to_string(),
            },
            ExportItem {
                image: DynamicImage::ImageRgba8(RgbaImage::new(0, 0)),
                label: "Bad".to_string(),
            },
        ];
        let err = export_archive(&items, "s", 92).unwrap_err();
        assert!(matches!(err, StudioError::Export(_)));
    }

    #[test]
    fn export_all_writes_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.zip");
        let items = vec![ExportItem {
            image: DynamicImage::ImageRgba8(RgbaImage::new(0, 0)),
            label: "Bad".to_string(),
        }];
        assert!(export_all(&items, "s", &path).is_err());
        assert!(!path.exists());
    }
}
