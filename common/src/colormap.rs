use crate::Rgba;
use rand::{Rng, seq::SliceRandom};
use std::borrow::Cow;

const REVERSED_SUFFIX: &str = "_r";

// Evenly spaced RGB control points, from 0.0 to 1.0. These are coarse
// approximations of the matplotlib maps of the same name: endpoints match,
// midpoints drift by a few levels.
const BUILTIN: &[(&str, &[[u8; 3]])] = &[
    (
        "viridis",
        &[[68, 1, 84], [59, 82, 139], [33, 145, 140], [94, 201, 98], [253, 231, 37]],
    ),
    (
        "plasma",
        &[[13, 8, 135], [126, 3, 168], [204, 71, 120], [248, 149, 64], [240, 249, 33]],
    ),
    (
        "inferno",
        &[[0, 0, 4], [87, 16, 110], [188, 55, 84], [249, 142, 9], [252, 255, 164]],
    ),
    (
        "magma",
        &[[0, 0, 4], [81, 18, 124], [183, 55, 121], [252, 137, 97], [252, 253, 191]],
    ),
    (
        "cividis",
        &[[0, 34, 78], [62, 77, 108], [124, 123, 120], [188, 175, 111], [254, 232, 56]],
    ),
    (
        "turbo",
        &[
            [48, 18, 59],
            [70, 134, 251],
            [27, 229, 181],
            [164, 252, 60],
            [251, 185, 56],
            [122, 4, 3],
        ],
    ),
    ("gray", &[[0, 0, 0], [255, 255, 255]]),
    ("greys", &[[255, 255, 255], [0, 0, 0]]),
    ("hot", &[[0, 0, 0], [230, 0, 0], [255, 210, 0], [255, 255, 255]]),
    ("cool", &[[0, 255, 255], [255, 0, 255]]),
    ("spring", &[[255, 0, 255], [255, 255, 0]]),
    ("summer", &[[0, 128, 102], [255, 255, 102]]),
    ("autumn", &[[255, 0, 0], [255, 255, 0]]),
    ("winter", &[[0, 0, 255], [0, 255, 128]]),
    ("bone", &[[0, 0, 0], [84, 84, 116], [167, 199, 199], [255, 255, 255]]),
    ("copper", &[[0, 0, 0], [255, 199, 127]]),
    ("pink", &[[30, 0, 0], [190, 135, 135], [230, 230, 180], [255, 255, 255]]),
    (
        "jet",
        &[
            [0, 0, 128],
            [0, 60, 255],
            [0, 220, 255],
            [120, 255, 120],
            [255, 220, 0],
            [255, 60, 0],
            [128, 0, 0],
        ],
    ),
    (
        "hsv",
        &[
            [255, 0, 0],
            [255, 255, 0],
            [0, 255, 0],
            [0, 255, 255],
            [0, 0, 255],
            [255, 0, 255],
            [255, 0, 0],
        ],
    ),
    (
        "rainbow",
        &[[128, 0, 255], [26, 150, 243], [128, 254, 179], [230, 150, 80], [255, 0, 0]],
    ),
    ("coolwarm", &[[59, 76, 192], [221, 221, 221], [180, 4, 38]]),
    (
        "twilight",
        &[[226, 217, 226], [100, 140, 190], [48, 20, 55], [180, 80, 70], [226, 217, 226]],
    ),
    ("ocean", &[[0, 128, 0], [0, 0, 85], [0, 128, 170], [255, 255, 255]]),
    (
        "terrain",
        &[
            [51, 51, 153],
            [0, 153, 255],
            [0, 204, 102],
            [255, 255, 153],
            [128, 92, 84],
            [255, 255, 255],
        ],
    ),
    (
        "spectral",
        &[
            [158, 1, 66],
            [244, 109, 67],
            [254, 224, 139],
            [230, 245, 152],
            [102, 194, 165],
            [94, 79, 162],
        ],
    ),
    (
        "seismic",
        &[[0, 0, 77], [0, 0, 255], [255, 255, 255], [255, 0, 0], [128, 0, 0]],
    ),
];

/// Continuous map from `[0, 1]` to an opaque color, linear between stops.
///
/// The built-in maps only approximate their matplotlib namesakes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Colormap {
    name: Cow<'static, str>,
    stops: Cow<'static, [[u8; 3]]>,
}

impl Colormap {
    pub fn constant(name: impl Into<Cow<'static, str>>, rgb: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            stops: Cow::Owned(vec![rgb]),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reversed(&self) -> Self {
        let name = match self.name.strip_suffix(REVERSED_SUFFIX) {
            Some(base) => base.to_owned(),
            None => format!("{}{REVERSED_SUFFIX}", self.name),
        };
        let stops = self.stops.iter().rev().copied().collect::<Vec<_>>();

        Self {
            name: Cow::Owned(name),
            stops: Cow::Owned(stops),
        }
    }

    /// Color at `t`; values outside `[0, 1]` are clamped.
    pub fn sample(&self, t: f32) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let last = self.stops.len() - 1;
        let position = t * last as f32;
        let lower = (position.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let frac = position - lower as f32;

        let [r, g, b] = lerp(self.stops[lower], self.stops[upper], frac);
        Rgba::new(r, g, b, u8::MAX)
    }

    /// `n` samples at evenly spaced points from 0 to 1, both inclusive.
    pub fn sample_even(&self, n: usize) -> impl ExactSizeIterator<Item = Rgba> + '_ {
        let last = n.saturating_sub(1).max(1) as f32;
        (0..n).map(move |idx| self.sample(idx as f32 / last))
    }
}

#[inline]
fn lerp(from: [u8; 3], to: [u8; 3], frac: f32) -> [u8; 3] {
    // truncates, same as scaling a normalized sample by 255 and casting
    let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * frac) as u8;
    [
        channel(from[0], to[0]),
        channel(from[1], to[1]),
        channel(from[2], to[2]),
    ]
}

/// Every built-in colormap name, each followed by its reversed variant.
pub fn names() -> impl Iterator<Item = Cow<'static, str>> {
    BUILTIN.iter().flat_map(|(name, _)| {
        [
            Cow::Borrowed(*name),
            Cow::Owned(format!("{name}{REVERSED_SUFFIX}")),
        ]
    })
}

pub fn get(name: &str) -> Option<Colormap> {
    let (base, reversed) = match name.strip_suffix(REVERSED_SUFFIX) {
        Some(base) => (base, true),
        None => (name, false),
    };

    let (name, stops) = BUILTIN.iter().find(|(builtin, _)| *builtin == base)?;
    let colormap = Colormap {
        name: Cow::Borrowed(*name),
        stops: Cow::Borrowed(*stops),
    };

    Some(if reversed {
        colormap.reversed()
    } else {
        colormap
    })
}

/// Draws `count` colormaps from the built-in library, with replacement.
pub fn choose_palette<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Colormap> {
    let names = names().collect::<Vec<_>>();

    (0..count)
        .filter_map(|_| names.choose(&mut *rng))
        .filter_map(|name| get(name))
        .collect()
}
