use std::path::Path;

use image::RgbaImage;

/// Decodes an image file into RGBA pixels, or `None` when nothing could be
/// decoded.
pub trait ImageLoader {
    fn load_image(&self, path: &Path) -> Option<RgbaImage>;
}

/// Reads images from the file system with the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageLoader;

impl ImageLoader for FsImageLoader {
    fn load_image(&self, path: &Path) -> Option<RgbaImage> {
        match image::open(path) {
            Ok(image) => Some(image.to_rgba8()),
            Err(e) => {
                log::warn!("Could not decode {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_no_image() {
        assert!(FsImageLoader.load_image(Path::new("does/not/exist.png")).is_none());
    }

    #[test]
    fn decodes_png_to_rgba() {
        let path = std::env::temp_dir().join(format!("orrery-{}.png", std::process::id()));
        RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let image = FsImageLoader.load_image(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }
}
