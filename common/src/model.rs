use itertools::Itertools;
use serde::Deserialize;
use std::{fs, io, path::Path};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model file")]
    Io(#[from] io::Error),

    #[error("failed to parse model")]
    Parse(#[from] serde_json::Error),

    #[error("face {face} references unknown edge {edge} (model has {num_edges} edges)")]
    UnknownEdge {
        face: usize,
        edge: usize,
        num_edges: usize,
    },

    #[error("face {face} has {inside} inside edges but {outside} outside edges")]
    EdgeCountMismatch {
        face: usize,
        inside: usize,
        outside: usize,
    },

    #[error("face {face} has {inside} inside pixels but {outside} outside pixels")]
    PixelCountMismatch {
        face: usize,
        inside: usize,
        outside: usize,
    },

    #[error("edge {edge} uses pixel {pixel}, but the model only has {num_pixels} pixels")]
    PixelOutOfRange {
        edge: usize,
        pixel: usize,
        num_pixels: usize,
    },
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    pixels: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct RawFace {
    inside_edges: Vec<usize>,
    outside_edges: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    #[serde(default)]
    num_pixels: Option<usize>,
    edges: Vec<RawEdge>,
    #[serde(default)]
    faces: Vec<RawFace>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Face {
    pub inside_edges: Vec<usize>,
    pub outside_edges: Vec<usize>,
}

/// Pixel indices of one face, inside and outside, paired by position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacePixels {
    pub inside: Vec<usize>,
    pub outside: Vec<usize>,
}

impl FacePixels {
    #[inline]
    pub fn len(&self) -> usize {
        self.inside.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inside.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.inside.iter().copied().zip_eq(self.outside.iter().copied())
    }
}

/// Immutable model of the zome, validated on construction.
#[derive(Clone, Debug)]
pub struct ZomeModel {
    num_pixels: usize,
    edges: Vec<Vec<usize>>,
    faces: Vec<Face>,
    face_pixels: Vec<FacePixels>,
}

impl ZomeModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading zome model");

        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let raw: RawModel = serde_json::from_str(raw)?;
        let edges = raw.edges.into_iter().map(|edge| edge.pixels).collect();
        let faces = raw
            .faces
            .into_iter()
            .map(|face| Face {
                inside_edges: face.inside_edges,
                outside_edges: face.outside_edges,
            })
            .collect();

        Self::new(raw.num_pixels, edges, faces)
    }

    /// Builds a model from edge pixel lists and faces.
    ///
    /// When `num_pixels` is `None` it is derived from the highest pixel index.
    pub fn new(
        num_pixels: Option<usize>,
        edges: Vec<Vec<usize>>,
        faces: Vec<Face>,
    ) -> Result<Self, ModelError> {
        let derived = edges
            .iter()
            .flatten()
            .max()
            .map_or(0, |highest| highest + 1);
        let num_pixels = num_pixels.unwrap_or(derived);

        for (edge, pixels) in edges.iter().enumerate() {
            if let Some(&pixel) = pixels.iter().find(|&&pixel| pixel >= num_pixels) {
                return Err(ModelError::PixelOutOfRange {
                    edge,
                    pixel,
                    num_pixels,
                });
            }
        }

        let face_pixels = faces
            .iter()
            .enumerate()
            .map(|(face_id, face)| resolve_face(&edges, face_id, face))
            .try_collect()?;

        Ok(Self {
            num_pixels,
            edges,
            faces,
            face_pixels,
        })
    }

    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.num_pixels
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn edge_pixels(&self, edge: usize) -> Option<&[usize]> {
        self.edges.get(edge).map(Vec::as_slice)
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Inside and outside pixel lists of every face, in model order.
    #[inline]
    pub fn face_pixels(&self) -> &[FacePixels] {
        &self.face_pixels
    }
}

fn resolve_face(
    edges: &[Vec<usize>],
    face_id: usize,
    face: &Face,
) -> Result<FacePixels, ModelError> {
    if face.inside_edges.len() != face.outside_edges.len() {
        return Err(ModelError::EdgeCountMismatch {
            face: face_id,
            inside: face.inside_edges.len(),
            outside: face.outside_edges.len(),
        });
    }

    let lookup = |edge: usize| {
        edges.get(edge).map(Vec::as_slice).ok_or(ModelError::UnknownEdge {
            face: face_id,
            edge,
            num_edges: edges.len(),
        })
    };

    let mut inside = Vec::new();
    let mut outside = Vec::new();
    for (&inside_edge, &outside_edge) in face.inside_edges.iter().zip(&face.outside_edges) {
        inside.extend_from_slice(lookup(inside_edge)?);
        outside.extend_from_slice(lookup(outside_edge)?);
    }

    if inside.len() != outside.len() {
        return Err(ModelError::PixelCountMismatch {
            face: face_id,
            inside: inside.len(),
            outside: outside.len(),
        });
    }

    Ok(FacePixels { inside, outside })
}

#[cfg(test)]
mod tests {
    use super::{Face, ModelError, ZomeModel};
    use std::io::Write;

    const TWO_FACES: &str = r#"{
        "edges": [
            { "pixels": [0, 1] },
            { "pixels": [2] },
            { "pixels": [3, 4] },
            { "pixels": [5], "start_node": 3, "end_node": 4 },
            { "pixels": [6, 7, 8] },
            { "pixels": [9, 10, 11] }
        ],
        "faces": [
            { "inside_edges": [0, 1], "outside_edges": [2, 3] },
            { "inside_edges": [4], "outside_edges": [5] }
        ]
    }"#;

    #[test]
    fn derives_pixel_count() {
        let model = ZomeModel::from_json(TWO_FACES).unwrap();
        assert_eq!(model.num_pixels(), 12);
        assert_eq!(model.num_edges(), 6);
        assert_eq!(model.edge_pixels(4), Some(&[6, 7, 8][..]));
        assert_eq!(model.edge_pixels(6), None);
    }

    #[test]
    fn explicit_pixel_count_wins() {
        let raw = r#"{ "num_pixels": 300, "edges": [ { "pixels": [0, 1] } ] }"#;
        let model = ZomeModel::from_json(raw).unwrap();
        assert_eq!(model.num_pixels(), 300);
        assert!(model.faces().is_empty());
    }

    #[test]
    fn concatenates_face_edges_in_order() {
        let model = ZomeModel::from_json(TWO_FACES).unwrap();
        let faces = model.face_pixels();

        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].inside, vec![0, 1, 2]);
        assert_eq!(faces[0].outside, vec![3, 4, 5]);
        assert_eq!(
            faces[1].pairs().collect::<Vec<_>>(),
            vec![(6, 9), (7, 10), (8, 11)]
        );
    }

    #[test]
    fn empty_face_is_allowed() {
        let raw = r#"{
            "edges": [ { "pixels": [] }, { "pixels": [] } ],
            "faces": [ { "inside_edges": [0], "outside_edges": [1] } ]
        }"#;
        let model = ZomeModel::from_json(raw).unwrap();
        assert_eq!(model.num_pixels(), 0);
        assert!(model.face_pixels()[0].is_empty());
    }

    #[test]
    fn rejects_pixel_count_mismatch() {
        let edges = vec![vec![0, 1, 2], vec![3, 4]];
        let faces = vec![Face {
            inside_edges: vec![0],
            outside_edges: vec![1],
        }];

        let error = ZomeModel::new(None, edges, faces).unwrap_err();
        assert!(matches!(
            error,
            ModelError::PixelCountMismatch {
                face: 0,
                inside: 3,
                outside: 2
            }
        ));
    }

    #[test]
    fn rejects_edge_count_mismatch() {
        let edges = vec![vec![0], vec![1], vec![2]];
        let faces = vec![Face {
            inside_edges: vec![0, 1],
            outside_edges: vec![2],
        }];

        let error = ZomeModel::new(None, edges, faces).unwrap_err();
        assert!(matches!(error, ModelError::EdgeCountMismatch { face: 0, .. }));
    }

    #[test]
    fn rejects_unknown_edge() {
        let raw = r#"{
            "edges": [ { "pixels": [0] } ],
            "faces": [ { "inside_edges": [0], "outside_edges": [7] } ]
        }"#;

        let error = ZomeModel::from_json(raw).unwrap_err();
        assert!(matches!(
            error,
            ModelError::UnknownEdge {
                face: 0,
                edge: 7,
                num_edges: 1
            }
        ));
    }

    #[test]
    fn rejects_pixel_outside_declared_count() {
        let raw = r#"{ "num_pixels": 2, "edges": [ { "pixels": [0, 1, 2] } ] }"#;

        let error = ZomeModel::from_json(raw).unwrap_err();
        assert!(matches!(
            error,
            ModelError::PixelOutOfRange {
                edge: 0,
                pixel: 2,
                num_pixels: 2
            }
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let error = ZomeModel::from_json("{ \"edges\": 12 }").unwrap_err();
        assert!(matches!(error, ModelError::Parse(..)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_FACES.as_bytes()).unwrap();

        let model = ZomeModel::load(file.path()).unwrap();
        assert_eq!(model.num_pixels(), 12);
        assert_eq!(model.faces().len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = ZomeModel::load(dir.path().join("zome_model.json")).unwrap_err();
        assert!(matches!(error, ModelError::Io(..)));
    }
}
