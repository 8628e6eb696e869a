//! Wavefront OBJ export of the pore surface.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::engine::error::EngineError;
use crate::engine::path::MolecularPath;

/// A named face group.
#[derive(Debug, Clone)]
pub struct WavefrontObjGroup {
    pub name: String,
    /// Triangles as 1-based vertex indices, as OBJ counts them.
    pub faces: Vec<[usize; 3]>,
}

/// A mesh object with vertices, per-vertex normals, and face groups.
#[derive(Debug, Clone)]
pub struct WavefrontObjObject {
    pub name: String,
    pub vertices: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub groups: Vec<WavefrontObjGroup>,
}

/// Triangulates the pore surface of a molecular path.
///
/// Rings of vertices are placed around centre-line samples at the local pore
/// radius; consecutive rings are stitched into triangle strips. The ring
/// frames are parallel-transported along the centre line so the tube does
/// not twist.
#[derive(Debug, Clone)]
pub struct PoreSurfaceBuilder {
    /// Arc-length spacing between rings (nm).
    pub ring_spacing: f64,
    /// Number of vertices per ring.
    pub segments: usize,
}

impl Default for PoreSurfaceBuilder {
    fn default() -> Self {
        Self {
            ring_spacing: 0.05,
            segments: 24,
        }
    }
}

impl PoreSurfaceBuilder {
    pub fn build(&self, path: &MolecularPath) -> WavefrontObjObject {
        let num_rings = ((path.length() / self.ring_spacing).ceil() as usize).max(2) + 1;
        let step = path.length() / (num_rings - 1) as f64;

        let mut vertices = Vec::with_capacity(num_rings * self.segments);
        let mut normals = Vec::with_capacity(num_rings * self.segments);

        let curve = path.centre_line();
        let (_, mut normal, _) = curve.frame(path.s_lo());

        for ring in 0..num_rings {
            let s = path.s_lo() + ring as f64 * step;
            let tangent = curve.tangent(s);

            // parallel transport of the previous ring's normal
            let projected = normal - normal.dot(&tangent) * tangent;
            normal = if projected.norm() > 1e-10 {
                projected.normalize()
            } else {
                curve.frame(s).1
            };
            let binormal = tangent.cross(&normal);

            let centre = curve.evaluate(s);
            let radius = path.radius(s).max(0.0);
            for seg in 0..self.segments {
                let theta = 2.0 * std::f64::consts::PI * seg as f64 / self.segments as f64;
                let radial = theta.cos() * normal + theta.sin() * binormal;
                vertices.push(centre + radius * radial);
                normals.push(radial);
            }
        }

        let mut faces = Vec::with_capacity(2 * (num_rings - 1) * self.segments);
        let index = |ring: usize, seg: usize| ring * self.segments + (seg % self.segments) + 1;
        for ring in 0..num_rings - 1 {
            for seg in 0..self.segments {
                let a = index(ring, seg);
                let b = index(ring, seg + 1);
                let c = index(ring + 1, seg + 1);
                let d = index(ring + 1, seg);
                faces.push([a, b, c]);
                faces.push([a, c, d]);
            }
        }

        WavefrontObjObject {
            name: "pore_surface".to_string(),
            vertices,
            normals,
            groups: vec![WavefrontObjGroup {
                name: "pore_surface".to_string(),
                faces,
            }],
        }
    }
}

/// Writes a mesh object in Wavefront OBJ format.
pub fn write_obj(path: &Path, object: &WavefrontObjObject) -> Result<(), EngineError> {
    let as_io_err = |e: std::io::Error| EngineError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    };

    let file = File::create(path).map_err(as_io_err)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# produced by permeon").map_err(as_io_err)?;
    writeln!(writer, "o {}", object.name).map_err(as_io_err)?;
    writeln!(writer).map_err(as_io_err)?;
    for v in &object.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z).map_err(as_io_err)?;
    }
    for n in &object.normals {
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z).map_err(as_io_err)?;
    }
    for group in &object.groups {
        writeln!(writer).map_err(as_io_err)?;
        writeln!(writer, "g {}", group.name).map_err(as_io_err)?;
        for face in &group.faces {
            writeln!(
                writer,
                "f {}//{} {}//{} {}//{}",
                face[0], face[0], face[1], face[1], face[2], face[2]
            )
            .map_err(as_io_err)?;
        }
    }
    writer.flush().map_err(as_io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pathfinding::ProbeSample;
    use tempfile::tempdir;

    fn straight_path() -> MolecularPath {
        let samples: Vec<ProbeSample> = (0..8)
            .map(|k| ProbeSample {
                centre: Point3::new(0.0, 0.0, k as f64),
                radius: 0.5,
                s: 0.0,
            })
            .collect();
        MolecularPath::new(&samples).unwrap()
    }

    #[test]
    fn surface_vertices_sit_at_the_pore_radius() {
        let path = straight_path();
        let builder = PoreSurfaceBuilder {
            ring_spacing: 0.5,
            segments: 8,
        };
        let mesh = builder.build(&path);
        assert_eq!(mesh.vertices.len(), mesh.normals.len());
        for v in &mesh.vertices {
            let radial = (v.x * v.x + v.y * v.y).sqrt();
            assert!((radial - 0.5).abs() < 1e-6, "radial distance {radial}");
        }
    }

    #[test]
    fn face_indices_stay_within_the_vertex_count() {
        let path = straight_path();
        let mesh = PoreSurfaceBuilder::default().build(&path);
        let num_vertices = mesh.vertices.len();
        for face in &mesh.groups[0].faces {
            for &idx in face {
                assert!(idx >= 1 && idx <= num_vertices);
            }
        }
        // a closed tube has two triangles per quad
        assert_eq!(mesh.groups[0].faces.len() % 2, 0);
    }

    #[test]
    fn obj_file_has_vertices_normals_and_faces() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("pore.obj");
        let path = straight_path();
        let mesh = PoreSurfaceBuilder {
            ring_spacing: 1.0,
            segments: 6,
        }
        .build(&path);
        write_obj(&out, &mesh).unwrap();

        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.starts_with("# produced by permeon"));
        assert!(content.contains("\ng pore_surface\n"));
        let n_v = content.lines().filter(|l| l.starts_with("v ")).count();
        let n_vn = content.lines().filter(|l| l.starts_with("vn ")).count();
        let n_f = content.lines().filter(|l| l.starts_with("f ")).count();
        assert_eq!(n_v, mesh.vertices.len());
        assert_eq!(n_vn, mesh.normals.len());
        assert_eq!(n_f, mesh.groups[0].faces.len());
    }
}
