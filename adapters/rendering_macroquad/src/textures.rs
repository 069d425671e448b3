use std::{collections::HashMap, fs, io::ErrorKind};

use bastion_core::{
    render::{TextureHandle, TextureService},
    ResourceError,
};
use macroquad::texture::{FilterMode, Texture2D};

/// Decoded RGBA pixels ready for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DecodedImage {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) pixels: Vec<u8>,
}

/// Decodes PNG or BMP bytes into RGBA pixels.
pub(crate) fn decode(path: &str, bytes: &[u8]) -> Result<DecodedImage, ResourceError> {
    let unreadable = |reason: String| ResourceError::Unreadable {
        path: path.to_owned(),
        reason,
    };

    let image = image::load_from_memory(bytes)
        .map_err(|error| unreadable(format!("failed to decode image: {error}")))?
        .to_rgba8();
    let width = u16::try_from(image.width())
        .map_err(|_| unreadable(format!("width {} too large", image.width())))?;
    let height = u16::try_from(image.height())
        .map_err(|_| unreadable(format!("height {} too large", image.height())))?;

    Ok(DecodedImage {
        width,
        height,
        pixels: image.into_raw(),
    })
}

fn read(path: &str) -> Result<Vec<u8>, ResourceError> {
    fs::read(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => ResourceError::Missing {
            path: path.to_owned(),
        },
        _ => ResourceError::Unreadable {
            path: path.to_owned(),
            reason: error.to_string(),
        },
    })
}

/// GPU textures keyed by the handles given out to the simulation.
#[derive(Debug, Default)]
pub(crate) struct TextureStore {
    next: u32,
    textures: HashMap<TextureHandle, Texture2D>,
}

impl TextureStore {
    pub(crate) fn get(&self, handle: TextureHandle) -> Option<Texture2D> {
        self.textures.get(&handle).copied()
    }

    pub(crate) fn release_all(&mut self) {
        for (_, texture) in self.textures.drain() {
            texture.delete();
        }
    }
}

impl TextureService for TextureStore {
    fn load(&mut self, path: &str) -> Result<TextureHandle, ResourceError> {
        let bytes = read(path)?;
        let decoded = decode(path, &bytes)?;
        let texture = Texture2D::from_rgba8(decoded.width, decoded.height, &decoded.pixels);
        texture.set_filter(FilterMode::Nearest);

        let handle = TextureHandle::new(self.next);
        self.next += 1;
        let _ = self.textures.insert(handle, texture);
        log::debug!("Loaded {path} as texture {}", handle.get());
        Ok(handle)
    }

    fn release(&mut self, handle: TextureHandle) {
        if let Some(texture) = self.textures.remove(&handle) {
            texture.delete();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::decode;
    use bastion_core::ResourceError;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, format).expect("encode test image");
        bytes.into_inner()
    }

    #[test]
    fn decodes_png_and_bmp() {
        for format in [ImageFormat::Png, ImageFormat::Bmp] {
            let decoded = decode("tile", &encoded(format)).expect("decodes");
            assert_eq!((decoded.width, decoded.height), (3, 2));
            assert_eq!(decoded.pixels.len(), 3 * 2 * 4);
            assert_eq!(&decoded.pixels[..3], &[255, 0, 0]);
        }
    }

    #[test]
    fn garbage_is_unreadable() {
        let error = decode("assets/water.png", b"not an image").expect_err("rejects garbage");
        assert!(matches!(
            error,
            ResourceError::Unreadable { ref path, .. } if path == "assets/water.png"
        ));
    }
}
