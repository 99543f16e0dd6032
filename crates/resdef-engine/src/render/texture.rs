use super::backend::{RenderBackend, TextureData, TextureId};

/// An uploaded 2D texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    id:      Option<TextureId>,
    width:   u32,
    height:  u32,
    mipmaps: bool,
}

impl Texture {
    /// Decodes an encoded image (PNG, JPEG, BMP, TGA) to RGBA8.
    pub fn decode(bytes: &[u8], mipmaps: bool) -> Result<TextureData, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(TextureData { width, height, mipmaps, pixels: rgba.into_raw() })
    }

    pub fn upload(backend: &mut dyn RenderBackend, data: &TextureData) -> Result<Self, String> {
        let id = backend.upload_texture(data)?;
        Ok(Self { id: Some(id), width: data.width, height: data.height, mipmaps: data.mipmaps })
    }

    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_mipmaps(&self) -> bool {
        self.mipmaps
    }

    pub fn unload(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(id) = self.id.take() {
            backend.delete_texture(id);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::HeadlessBackend;
    use std::io::Cursor;

    /// A `w`×`h` PNG filled with one colour.
    pub(crate) fn png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 128, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let data = Texture::decode(&png(3, 2), true).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.pixels.len(), 3 * 2 * 4);
        assert_eq!(&data.pixels[..4], &[255, 0, 128, 255]);
        assert!(data.mipmaps);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Texture::decode(b"not an image", false).is_err());
    }

    #[test]
    fn upload_and_unload() {
        let mut gl = HeadlessBackend::new();
        let data = Texture::decode(&png(4, 4), false).unwrap();
        let mut tex = Texture::upload(&mut gl, &data).unwrap();
        assert_eq!(tex.size(), (4, 4));
        assert_eq!(gl.live_textures(), 1);
        tex.unload(&mut gl);
        assert_eq!(gl.live_textures(), 0);
    }
}
