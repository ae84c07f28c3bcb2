/// A decoded image in tightly packed RGBA8, first row at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Returns `None` when the pixel buffer does not match the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width * height * 4) as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-texel image of the given color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(TextureImage::new(2, 2, vec![0; 15]).is_none());
        assert!(TextureImage::new(0, 2, vec![]).is_none());
        assert!(TextureImage::new(2, 2, vec![0; 16]).is_some());
    }

    #[test]
    fn solid_is_one_texel() {
        let img = TextureImage::solid([1, 2, 3, 4]);
        assert_eq!((img.width, img.height), (1, 1));
        assert_eq!(img.bytes_per_row(), 4);
    }
}
