//! Wavefront OBJ loading
//!
//! Only the subset needed for textured triangle meshes: `v`, `vt` and
//! triangular `f` records. Everything else is ignored.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::rasterizer::{TexCoord, Vec3};
use crate::scene::{Face, MeshData};

/// Load mesh data from an OBJ file
pub fn load_obj<P: AsRef<Path>>(path: P) -> EngineResult<MeshData> {
    let contents = fs::read_to_string(path)?;
    parse_obj(&contents)
}

/// Parse OBJ text. Coordinates that fail to parse become NaN; index
/// range checks happen when the `Mesh` is built.
pub fn parse_obj(text: &str) -> EngineResult<MeshData> {
    let mut data = MeshData::default();

    for (n, raw) in text.lines().enumerate() {
        let line = n + 1;
        let mut fields = raw.split_whitespace();
        match fields.next() {
            Some("v") => {
                let [x, y, z] = coords(&mut fields);
                data.verts.push(Vec3::new(x, y, z));
            }
            Some("vt") => {
                let [u, v, _] = coords(&mut fields);
                data.uvs.push(TexCoord::new(u, v));
            }
            Some("f") => {
                let corners: Vec<&str> = fields.collect();
                if corners.len() != 3 {
                    warn!("OBJ line {}: skipping face with {} vertices", line, corners.len());
                    continue;
                }
                data.faces.push(parse_face(&corners, line)?);
            }
            _ => {}
        }
    }

    debug!(
        "Parsed OBJ: {} vertices, {} uvs, {} faces",
        data.verts.len(),
        data.uvs.len(),
        data.faces.len()
    );
    Ok(data)
}

fn coords<'a>(fields: &mut impl Iterator<Item = &'a str>) -> [f64; 3] {
    [(); 3].map(|_| {
        fields
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(f64::NAN)
    })
}

/// `a b c` or `a/ta b/tb c/tc` (a trailing `/n` normal index is ignored)
fn parse_face(corners: &[&str], line: usize) -> EngineResult<Face> {
    let mut p = [0; 3];
    let mut t = [0; 3];
    let mut with_uvs = 0;

    for (i, corner) in corners.iter().enumerate() {
        let mut parts = corner.split('/');
        p[i] = index(parts.next().unwrap_or(""), line)?;
        if let Some(ti) = parts.next().filter(|s| !s.is_empty()) {
            t[i] = index(ti, line)?;
            with_uvs += 1;
        }
    }

    match with_uvs {
        0 => Ok(Face::new(p)),
        3 => Ok(Face::with_uvs(p, t)),
        _ => Err(EngineError::Obj {
            line,
            message: "face mixes corners with and without texture indices".to_string(),
        }),
    }
}

/// 1-based OBJ index to 0-based
fn index(s: &str, line: usize) -> EngineResult<usize> {
    match s.parse::<usize>() {
        Ok(i) if i > 0 => Ok(i - 1),
        _ => Err(EngineError::Obj { line, message: format!("bad index '{}'", s) }),
    }
}
