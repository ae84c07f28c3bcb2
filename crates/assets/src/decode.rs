use crate::AssetError;
use moonfield_common::TextureImage;
use std::path::Path;

/// Largest texture side every wgpu adapter accepts with default limits.
pub const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Read and decode an image file into RGBA8. The format is guessed from the
/// file contents, not the extension.
pub fn decode_texture(path: impl AsRef<Path>) -> Result<TextureImage, AssetError> {
    decode_texture_within(path, u32::MAX)
}

/// Like [`decode_texture`], but images with a side longer than
/// `max_dimension` are scaled down to fit, keeping their aspect ratio.
pub fn decode_texture_within(
    path: impl AsRef<Path>,
    max_dimension: u32,
) -> Result<TextureImage, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = (decoded.width(), decoded.height());
    let (fit_w, fit_h) = fitted_size(width, height, max_dimension);
    let decoded = if (fit_w, fit_h) != (width, height) {
        tracing::warn!(
            path = %path.display(),
            width,
            height,
            max_dimension,
            "texture exceeds maximum size, scaling to {fit_w}x{fit_h}"
        );
        decoded.resize_exact(fit_w, fit_h, image::imageops::FilterType::Triangle)
    } else {
        decoded
    };
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    TextureImage::new(width, height, rgba.into_raw()).ok_or_else(|| AssetError::Empty {
        path: path.to_path_buf(),
    })
}

/// Size that fits `width` x `height` inside a `max` square, scaled uniformly.
/// Sizes already inside are returned unchanged; no side drops below 1.
pub fn fitted_size(width: u32, height: u32, max: u32) -> (u32, u32) {
    let max = max.max(1);
    let longest = width.max(height);
    if longest <= max {
        return (width, height);
    }
    let scale = max as f64 / longest as f64;
    let fit = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, max);
    (fit(width), fit(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moon.png");
        image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let img = decode_texture(&path).unwrap();
        assert_eq!((img.width, img.height), (4, 2));
        assert_eq!(&img.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn content_wins_over_extension() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("a.png");
        image::RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 4]))
            .save(&png)
            .unwrap();
        let jpg = dir.path().join("space.jpg");
        std::fs::copy(&png, &jpg).unwrap();

        assert_eq!(decode_texture(&jpg).unwrap().pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_texture(dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("nope.jpg"));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(
            decode_texture(&path),
            Err(AssetError::Decode { .. })
        ));
    }

    #[test]
    fn fitted_size_keeps_small_images() {
        assert_eq!(fitted_size(2048, 1024, 8192), (2048, 1024));
        assert_eq!(fitted_size(8192, 8192, 8192), (8192, 8192));
    }

    #[test]
    fn fitted_size_scales_long_side_to_limit() {
        assert_eq!(fitted_size(9000, 2, 8192), (8192, 2));
        assert_eq!(fitted_size(16384, 8192, 8192), (8192, 4096));
        assert_eq!(fitted_size(2, 20000, 100), (1, 100));
    }

    #[test]
    fn oversized_image_is_scaled_on_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("space.jpg");
        image::RgbImage::from_pixel(9000, 2, image::Rgb([1, 2, 3]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();

        let img = decode_texture_within(&path, DEFAULT_MAX_DIMENSION).unwrap();
        assert_eq!((img.width, img.height), (8192, 2));
        assert_eq!(img.pixels.len(), 8192 * 2 * 4);

        let full = decode_texture(&path).unwrap();
        assert_eq!(full.width, 9000);
    }
}
