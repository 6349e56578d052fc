//! OBJ file loader for 3D models

use super::mesh::Vertex;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

/// OBJ parsing failures
#[derive(Error, Debug)]
pub enum ObjError {
    /// Underlying read failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A number or index could not be parsed
    #[error("Parse error on line {line}: {reason}")]
    ParseError {
        /// 1-based line number
        line: usize,
        /// What could not be parsed
        reason: String,
    },
    /// Structurally invalid file
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Minimal Wavefront OBJ reader (positions, normals, uvs, polygon faces)
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file into flat vertex and index buffers
    pub fn load_obj(path: impl AsRef<Path>) -> Result<(Vec<Vertex>, Vec<u32>), ObjError> {
        let file = std::fs::File::open(path)?;
        Self::parse(std::io::BufReader::new(file))
    }

    /// Parse OBJ text from any buffered reader
    pub fn parse(reader: impl BufRead) -> Result<(Vec<Vertex>, Vec<u32>), ObjError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<[f32; 2]> = Vec::new();
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = line_index + 1;
            let parts: Vec<&str> = line.split_whitespace().collect();
            let Some((&keyword, args)) = parts.split_first() else {
                continue;
            };

            match keyword {
                "v" => positions.push(parse_floats::<3>(args, line_number, "vertex")?),
                "vn" => normals.push(parse_floats::<3>(args, line_number, "normal")?),
                "vt" => tex_coords.push(parse_floats::<2>(args, line_number, "tex coord")?),
                "f" => {
                    if args.len() < 3 {
                        return Err(ObjError::ParseError {
                            line: line_number,
                            reason: "face needs at least three vertices".to_string(),
                        });
                    }

                    let first = vertices.len() as u32;
                    for corner in args {
                        let mut refs = corner.split('/');
                        let position = resolve(refs.next(), positions.len(), line_number)?
                            .map(|i| positions[i])
                            .ok_or_else(|| ObjError::ParseError {
                                line: line_number,
                                reason: "face corner without position".to_string(),
                            })?;
                        let tex_coord = resolve(refs.next(), tex_coords.len(), line_number)?
                            .map_or([0.0, 0.0], |i| tex_coords[i]);
                        let normal = resolve(refs.next(), normals.len(), line_number)?
                            .map_or([0.0, 0.0, 1.0], |i| normals[i]);
                        vertices.push(Vertex {
                            position,
                            normal,
                            tex_coord,
                        });
                    }

                    // Fan triangulation
                    for i in 1..(args.len() as u32 - 1) {
                        indices.extend_from_slice(&[first, first + i, first + i + 1]);
                    }
                }
                _ => {
                    // Groups, smoothing, material libraries: not needed here
                }
            }
        }

        if vertices.is_empty() {
            return Err(ObjError::InvalidFormat("No faces found in OBJ file".to_string()));
        }

        Ok((vertices, indices))
    }
}

fn parse_floats<const N: usize>(args: &[&str], line: usize, what: &str) -> Result<[f32; N], ObjError> {
    if args.len() < N {
        return Err(ObjError::ParseError {
            line,
            reason: format!("{what} needs {N} components"),
        });
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(args) {
        *slot = token.parse().map_err(|_| ObjError::ParseError {
            line,
            reason: format!("invalid {what} component '{token}'"),
        })?;
    }
    Ok(out)
}

/// Resolve a 1-based (or negative, relative) OBJ index against `len` entries
fn resolve(token: Option<&str>, len: usize, line: usize) -> Result<Option<usize>, ObjError> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let raw: i64 = token.parse().map_err(|_| ObjError::ParseError {
        line,
        reason: format!("invalid index '{token}'"),
    })?;
    let index = if raw < 0 { len as i64 + raw } else { raw - 1 };
    if index < 0 || index >= len as i64 {
        return Err(ObjError::ParseError {
            line,
            reason: format!("index {raw} out of range"),
        });
    }
    Ok(Some(index as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let (vertices, indices) = ObjLoader::parse(QUAD.as_bytes()).unwrap();
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(vertices[2].tex_coord, [1.0, 1.0]);
        assert_eq!(vertices[2].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let (vertices, indices) = ObjLoader::parse(text.as_bytes()).unwrap();
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let text = "v 0 0 0\nf 1 2 3\n";
        assert!(matches!(
            ObjLoader::parse(text.as_bytes()),
            Err(ObjError::ParseError { line: 2, .. })
        ));
    }

    #[test]
    fn test_empty_file_is_invalid() {
        assert!(matches!(
            ObjLoader::parse("# nothing\n".as_bytes()),
            Err(ObjError::InvalidFormat(_))
        ));
    }
}
