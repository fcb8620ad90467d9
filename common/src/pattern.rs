use crate::{
    Frame, Rgba,
    colormap::{self, Colormap},
    model::{FacePixels, ZomeModel},
};
use rand::{SeedableRng, rngs::StdRng};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternConfig {
    /// Frames between colormap switches.
    pub update_interval: u32,
    /// Size of the randomly drawn colormap pool.
    pub num_colormaps: usize,
    /// Fixes the colormap pool; drawn from entropy when unset.
    pub seed: Option<u64>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            update_interval: 100,
            num_colormaps: 20,
            seed: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("the faces pattern needs at least one colormap")]
    EmptyPalette,

    #[error("the colormap update interval must be non-zero")]
    ZeroInterval,
}

/// Infinite stream of frames. Each call to `next` renders one frame.
#[derive(Clone, Debug)]
pub struct FacesPattern {
    num_pixels: usize,
    faces: Vec<FacePixels>,
    palette: Vec<Colormap>,
    update_interval: u32,
    cursor: usize,
    frame_id: u64,
}

impl FacesPattern {
    pub fn new(model: &ZomeModel, config: PatternConfig) -> Result<Self, PatternError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let palette = colormap::choose_palette(&mut rng, config.num_colormaps);

        Self::with_palette(model, palette, config.update_interval)
    }

    pub fn with_palette(
        model: &ZomeModel,
        palette: Vec<Colormap>,
        update_interval: u32,
    ) -> Result<Self, PatternError> {
        if palette.is_empty() {
            return Err(PatternError::EmptyPalette);
        }
        if update_interval == 0 {
            return Err(PatternError::ZeroInterval);
        }

        Ok(Self {
            num_pixels: model.num_pixels(),
            faces: model.face_pixels().to_vec(),
            palette,
            update_interval,
            cursor: 0,
            frame_id: 0,
        })
    }

    #[inline]
    pub fn palette(&self) -> &[Colormap] {
        &self.palette
    }

    /// Colormap the next frame will be rendered with.
    #[inline]
    pub fn active_colormap(&self) -> &Colormap {
        &self.palette[self.cursor]
    }

    fn advance_colormap(&mut self) {
        if self.frame_id != 0 && self.frame_id % u64::from(self.update_interval) == 0 {
            self.cursor = (self.cursor + 1) % self.palette.len();
            debug!(
                frame_id = self.frame_id,
                colormap = self.palette[self.cursor].name(),
                "switching colormap"
            );
        }
    }

    /// Renders frame `index` without touching the stream position.
    pub fn render_frame(&self, index: u64) -> Frame {
        let pass = index / u64::from(self.update_interval);
        let cursor = (pass % self.palette.len() as u64) as usize;

        Frame {
            index,
            pixels: self.render(&self.palette[cursor]),
        }
    }

    fn render(&self, colormap: &Colormap) -> Vec<Rgba> {
        let mut pixels = vec![Rgba::OFF; self.num_pixels];

        for face in &self.faces {
            for ((inside, outside), color) in face.pairs().zip(colormap.sample_even(face.len())) {
                pixels[inside] = color;
                pixels[outside] = color;
            }
        }

        pixels
    }
}

impl Iterator for FacesPattern {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance_colormap();

        let frame = Frame {
            index: self.frame_id,
            pixels: self.render(self.active_colormap()),
        };
        self.frame_id += 1;

        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
