//! Parametric geometry: torus and UV sphere.
//!
//! Geometry values record the parameters they were built from; vertex data
//! is generated on demand with [`Geometry::build`].

use bytemuck::{Pod, Zeroable};
use serde::Serialize;
use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};

/// Interleaved vertex: position, normal, uv, tangent (w = handedness).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 4],
}

/// Generated vertex and triangle index data.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unique, non-degenerate triangle edges as a line list.
    pub fn edge_indices(&self) -> Vec<u32> {
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let pa = self.vertices[a as usize].position;
                let pb = self.vertices[b as usize].position;
                if pa == pb {
                    continue;
                }
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }
}

/// Torus around the Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TorusGeometry {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    pub arc: f32,
}

impl TorusGeometry {
    pub fn new(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self {
            radius,
            tube,
            radial_segments: radial_segments.max(2),
            tubular_segments: tubular_segments.max(3),
            arc: TAU,
        }
    }

    fn build(&self) -> MeshData {
        let radial = self.radial_segments;
        let tubular = self.tubular_segments;
        let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);

        for j in 0..=radial {
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * self.arc;
                let v = j as f32 / radial as f32 * TAU;

                let ring = self.radius + self.tube * v.cos();
                let position = [ring * u.cos(), ring * u.sin(), self.tube * v.sin()];
                let center = [self.radius * u.cos(), self.radius * u.sin(), 0.0];
                let normal = normalize([
                    position[0] - center[0],
                    position[1] - center[1],
                    position[2] - center[2],
                ]);

                vertices.push(Vertex {
                    position,
                    normal,
                    uv: [i as f32 / tubular as f32, j as f32 / radial as f32],
                    tangent: [-u.sin(), u.cos(), 0.0, 1.0],
                });
            }
        }

        let stride = tubular + 1;
        let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        MeshData { vertices, indices }
    }
}

/// UV sphere with poles on the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        }
    }

    fn build(&self) -> MeshData {
        let width = self.width_segments;
        let height = self.height_segments;
        let mut vertices = Vec::with_capacity(((width + 1) * (height + 1)) as usize);

        for iy in 0..=height {
            let v = iy as f32 / height as f32;
            // Shift pole uvs to the middle of their segment.
            let u_offset = if iy == 0 {
                0.5 / width as f32
            } else if iy == height {
                -0.5 / width as f32
            } else {
                0.0
            };

            for ix in 0..=width {
                let u = ix as f32 / width as f32;
                let phi = u * TAU;
                let theta = v * PI;

                let position = [
                    -self.radius * phi.cos() * theta.sin(),
                    self.radius * theta.cos(),
                    self.radius * phi.sin() * theta.sin(),
                ];
                let normal = normalize([
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                ]);

                vertices.push(Vertex {
                    position,
                    normal,
                    uv: [u + u_offset, 1.0 - v],
                    tangent: [phi.sin(), 0.0, phi.cos(), 1.0],
                });
            }
        }

        let stride = width + 1;
        let mut indices = Vec::new();
        for iy in 0..height {
            for ix in 0..width {
                let a = iy * stride + ix + 1;
                let b = iy * stride + ix;
                let c = (iy + 1) * stride + ix;
                let d = (iy + 1) * stride + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        MeshData { vertices, indices }
    }
}

/// Geometry attached to a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Torus(TorusGeometry),
    Sphere(SphereGeometry),
}

impl Geometry {
    /// Generate vertex and index data.
    pub fn build(&self) -> MeshData {
        match self {
            Geometry::Torus(torus) => torus.build(),
            Geometry::Sphere(sphere) => sphere.build(),
        }
    }

    /// Stable key identifying geometries that generate identical data.
    pub fn cache_key(&self) -> String {
        match self {
            Geometry::Torus(t) => format!(
                "torus:{:08x}:{:08x}:{}:{}:{:08x}",
                t.radius.to_bits(),
                t.tube.to_bits(),
                t.radial_segments,
                t.tubular_segments,
                t.arc.to_bits()
            ),
            Geometry::Sphere(s) => format!(
                "sphere:{:08x}:{}:{}",
                s.radius.to_bits(),
                s.width_segments,
                s.height_segments
            ),
        }
    }

    pub fn as_torus(&self) -> Option<&TorusGeometry> {
        match self {
            Geometry::Torus(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_sphere(&self) -> Option<&SphereGeometry> {
        match self {
            Geometry::Sphere(s) => Some(s),
            _ => None,
        }
    }
}

impl From<TorusGeometry> for Geometry {
    fn from(value: TorusGeometry) -> Self {
        Geometry::Torus(value)
    }
}

impl From<SphereGeometry> for Geometry {
    fn from(value: SphereGeometry) -> Self {
        Geometry::Sphere(value)
    }
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= f32::EPSILON {
        return [0.0, 1.0, 0.0];
    }
    [v[0] / len, v[1] / len, v[2] / len]
}
