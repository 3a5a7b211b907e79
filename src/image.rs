use std::path::Path;

use anyhow::{ensure, Context, Result};

/// A decoded image kept as raw interleaved bytes, 3 or 4 channels.
///
/// Asset decode failures are fatal at construction time; there is no
/// placeholder policy.
pub struct Image {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<u8>,
}

impl Image {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("could not load image {}", path.display()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let (channels, data) = match decoded {
            image::DynamicImage::ImageRgb8(img) => (3, img.into_raw()),
            image::DynamicImage::ImageRgba8(img) => (4, img.into_raw()),
            other => (4, other.to_rgba8().into_raw()),
        };

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// A 1x1 solid-color image, used for plain-color textures.
    pub fn solid(r: f32, g: f32, b: f32) -> Self {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        Self {
            width: 1,
            height: 1,
            channels: 3,
            data: vec![to_byte(r), to_byte(g), to_byte(b)],
        }
    }

    pub fn from_raw(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(
            data.len() as u32 == width * height * channels,
            "raw image size mismatch: {}x{}x{} vs {} bytes",
            width,
            height,
            channels,
            data.len()
        );
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// One pixel's channel bytes.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels as usize;
        let start = ((y * self.width + x) * self.channels) as usize;
        &self.data[start..start + c]
    }

    /// Copies the `w`x`h` rectangle at (`x`, `y`) into a new image, row
    /// order preserved: the extracted pixel (0,0) is the source pixel
    /// (`x`, `y`).
    pub fn sub_image(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Image> {
        ensure!(
            x + w <= self.width && y + h <= self.height,
            "sub-image {}x{} at ({}, {}) exceeds {}x{} source",
            w,
            h,
            x,
            y,
            self.width,
            self.height
        );

        let c = self.channels as usize;
        let mut data = Vec::with_capacity((w * h) as usize * c);
        for row in 0..h {
            let start = (((y + row) * self.width + x) * self.channels) as usize;
            data.extend_from_slice(&self.data[start..start + w as usize * c]);
        }

        Image::from_raw(w, h, self.channels, data)
    }

    /// Slices a 4x3 cross atlas into the six cube faces, ordered
    /// +X, -X, -Y, +Y, +Z, -Z. Sub-image size is (W/4)x(H/3); the face
    /// offsets follow the cross layout with top/bottom swapped to match the
    /// atlas orientation.
    pub fn cube_faces(&self) -> Result<[Image; 6]> {
        let w = self.width / 4;
        let h = self.height / 3;
        ensure!(
            w > 0 && h > 0,
            "atlas {}x{} too small for a 4x3 cross",
            self.width,
            self.height
        );

        let xs = [2 * w, 0, w, w, w, 3 * w];
        let ys = [h, h, 2 * h, 0, h, h];

        Ok([
            self.sub_image(xs[0], ys[0], w, h)?,
            self.sub_image(xs[1], ys[1], w, h)?,
            self.sub_image(xs[2], ys[2], w, h)?,
            self.sub_image(xs[3], ys[3], w, h)?,
            self.sub_image(xs[4], ys[4], w, h)?,
            self.sub_image(xs[5], ys[5], w, h)?,
        ])
    }

    /// The same bytes expanded to RGBA, for upload paths that require four
    /// channels.
    pub fn to_rgba(&self) -> Vec<u8> {
        match self.channels {
            4 => self.data.clone(),
            3 => {
                let mut out = Vec::with_capacity((self.width * self.height * 4) as usize);
                for px in self.data.chunks_exact(3) {
                    out.extend_from_slice(px);
                    out.push(0xff);
                }
                out
            }
            _ => unreachable!("images are stored as 3 or 4 channels"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a test atlas where every pixel encodes its own coordinates,
    /// so any slicing mistake is visible.
    fn coordinate_atlas(width: u32, height: u32) -> Image {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0]);
            }
        }
        Image::from_raw(width, height, 3, data).unwrap()
    }

    #[test]
    fn sub_image_origin_matches_source_offset() {
        let atlas = coordinate_atlas(16, 12);
        let sub = atlas.sub_image(5, 7, 4, 3).unwrap();
        assert_eq!(sub.pixel(0, 0), &[5, 7, 0]);
        assert_eq!(sub.pixel(3, 2), &[8, 9, 0]);
    }

    #[test]
    fn sub_image_out_of_bounds_is_rejected() {
        let atlas = coordinate_atlas(16, 12);
        assert!(atlas.sub_image(14, 0, 4, 3).is_err());
    }

    #[test]
    fn cube_faces_follow_the_cross_layout() {
        let atlas = coordinate_atlas(16, 12); // faces are 4x4
        let faces = atlas.cube_faces().unwrap();

        let expected = [(8, 4), (0, 4), (4, 8), (4, 0), (4, 4), (12, 4)];
        for (face, (x, y)) in faces.iter().zip(expected) {
            assert_eq!(face.width(), 4);
            assert_eq!(face.height(), 4);
            assert_eq!(face.pixel(0, 0), &[x, y, 0]);
        }
    }

    #[test]
    fn solid_is_a_single_pixel() {
        let img = Image::solid(1.0, 0.5, 0.0);
        assert_eq!((img.width(), img.height()), (1, 1));
        assert_eq!(img.pixel(0, 0), &[255, 127, 0]);
    }

    #[test]
    fn to_rgba_expands_three_channels() {
        let img = Image::solid(0.0, 0.0, 1.0);
        assert_eq!(img.to_rgba(), vec![0, 0, 255, 255]);
    }
}
