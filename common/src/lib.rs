#[macro_use]
extern crate tracing;

use rkyv::{Archive, Deserialize, Serialize};

pub mod colormap;
pub mod model;
pub mod pattern;
pub mod wire;

pub use colormap::Colormap;
pub use model::{FacePixels, ModelError, ZomeModel};
pub use pattern::{FacesPattern, PatternConfig, PatternError};

#[derive(Archive, Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const OFF: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<&ArchivedRgba> for Rgba {
    fn from(pixel: &ArchivedRgba) -> Self {
        Self::new(pixel.r, pixel.g, pixel.b, pixel.a)
    }
}

#[derive(Archive, Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub index: u64,
    // one entry per pixel index of the model
    pub pixels: Vec<Rgba>,
}
