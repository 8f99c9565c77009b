//! Cover textures: where they live on disk and how they become RGBA texels.
//!
//! Covers are stored as `{root}/{year}_{month}.jpg`. Every loaded image is
//! resized to one fixed texel size so the renderer can keep all covers in a
//! single texture array. A missing or unreadable cover is replaced by a flat
//! placeholder face instead of failing the scene.

use coverring_common::CoverKey;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Texel size of every cover: magazine proportions (1 : 1.6 with padding).
pub const COVER_WIDTH: u32 = 256;
pub const COVER_HEIGHT: u32 = 400;

/// Errors from cover loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("cover not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded cover texels, tightly packed RGBA8.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub key: CoverKey,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    /// True when the texels are a generated stand-in.
    pub placeholder: bool,
}

impl CoverImage {
    /// Flat face with a darker frame, tinted from the cover's year and month.
    pub fn placeholder(key: CoverKey, width: u32, height: u32) -> Self {
        let fill = placeholder_color(key);
        let frame = fill.map(|c| c / 2);
        let border = (width.min(height) / 32).max(1);

        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let edge = x < border
                    || y < border
                    || x >= width.saturating_sub(border)
                    || y >= height.saturating_sub(border);
                let [r, g, b] = if edge { frame } else { fill };
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }

        Self {
            key,
            width,
            height,
            rgba,
            placeholder: true,
        }
    }
}

fn placeholder_color(key: CoverKey) -> [u8; 3] {
    let r = 70 + (key.month * 29 % 150) as u8;
    let g = 70 + (key.year.wrapping_mul(37) % 150) as u8;
    let b = 160u8.saturating_sub((key.month * 7) as u8);
    [r, g, b]
}

/// Resolves and decodes cover images under one directory.
#[derive(Debug, Clone)]
pub struct CoverCatalog {
    root: PathBuf,
    width: u32,
    height: u32,
}

impl CoverCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            width: COVER_WIDTH,
            height: COVER_HEIGHT,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: CoverKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    pub fn exists(&self, key: CoverKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Keys among `keys` with no image on disk, in input order.
    pub fn missing(&self, keys: impl IntoIterator<Item = CoverKey>) -> Vec<CoverKey> {
        keys.into_iter().filter(|k| !self.exists(*k)).collect()
    }

    /// Decode one cover and resize it to the catalogue's texel size.
    pub fn load(&self, key: CoverKey) -> Result<CoverImage, AssetError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(AssetError::NotFound(path));
        }
        let img = image::open(&path).map_err(|source| AssetError::Decode {
            path: path.clone(),
            source,
        })?;
        let rgba = img
            .resize_exact(self.width, self.height, FilterType::Triangle)
            .to_rgba8()
            .into_raw();
        tracing::trace!("loaded cover {}", path.display());

        Ok(CoverImage {
            key,
            width: self.width,
            height: self.height,
            rgba,
            placeholder: false,
        })
    }

    /// Like `load`, but falls back to a placeholder face on any error.
    pub fn load_or_placeholder(&self, key: CoverKey) -> CoverImage {
        match self.load(key) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("{e}; using placeholder for {key}");
                CoverImage::placeholder(key, self.width, self.height)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_key_format() {
        let catalog = CoverCatalog::new("/covers");
        assert_eq!(
            catalog.path_for(CoverKey::new(1994, 1)),
            PathBuf::from("/covers/1994_01.jpg")
        );
    }

    #[test]
    fn missing_cover_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = CoverCatalog::new(dir.path());
        let err = catalog.load(CoverKey::new(1994, 2)).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn loads_and_resizes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let key = CoverKey::new(1995, 6);
        image::RgbImage::from_pixel(40, 64, image::Rgb([200, 10, 10]))
            .save(dir.path().join(key.file_name()))
            .unwrap();

        let catalog = CoverCatalog::new(dir.path());
        assert!(catalog.exists(key));
        let cover = catalog.load(key).unwrap();
        assert!(!cover.placeholder);
        assert_eq!((cover.width, cover.height), (COVER_WIDTH, COVER_HEIGHT));
        assert_eq!(cover.rgba.len(), (COVER_WIDTH * COVER_HEIGHT * 4) as usize);
        // JPEG is lossy; the red channel still dominates.
        assert!(cover.rgba[0] > 150 && cover.rgba[1] < 80);
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let key = CoverKey::new(1996, 3);
        std::fs::write(dir.path().join(key.file_name()), b"not a jpeg").unwrap();
        let catalog = CoverCatalog::new(dir.path());
        assert!(matches!(
            catalog.load(key).unwrap_err(),
            AssetError::Decode { .. }
        ));
    }

    #[test]
    fn fallback_is_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = CoverCatalog::new(dir.path());
        let cover = catalog.load_or_placeholder(CoverKey::new(1994, 1));
        assert!(cover.placeholder);
        assert_eq!((cover.width, cover.height), (COVER_WIDTH, COVER_HEIGHT));
    }

    #[test]
    fn placeholders_are_deterministic_and_distinct() {
        let a = CoverImage::placeholder(CoverKey::new(1994, 1), 4, 4);
        let b = CoverImage::placeholder(CoverKey::new(1994, 1), 4, 4);
        let c = CoverImage::placeholder(CoverKey::new(1994, 2), 4, 4);
        assert_eq!(a.rgba, b.rgba);
        assert_ne!(a.rgba, c.rgba);
        assert!(a.rgba.chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn missing_lists_absent_keys() {
        let dir = tempfile::tempdir().unwrap();
        let present = CoverKey::new(1994, 1);
        std::fs::write(dir.path().join(present.file_name()), b"x").unwrap();
        let catalog = CoverCatalog::new(dir.path());
        let missing = catalog.missing([present, CoverKey::new(1994, 2)]);
        assert_eq!(missing, vec![CoverKey::new(1994, 2)]);
    }
}
