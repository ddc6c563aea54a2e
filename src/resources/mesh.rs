//! Mesh data, procedural generators, and tangent-frame computation

use crate::backend::types::Vertex;
use glam::{Vec2, Vec3, Vec4};

/// A mesh with vertex and index data
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data as bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Compute per-vertex tangents from positions and UVs. Tangents are
    /// accumulated per triangle, Gram-Schmidt orthogonalized against the
    /// normal, and the w component records bitangent handedness. Returns
    /// false for meshes without complete triangles.
    pub fn compute_tangent_frame(&mut self) -> bool {
        if self.indices.len() < 3 || self.vertices.is_empty() {
            return false;
        }

        let mut tangents = vec![Vec3::ZERO; self.vertices.len()];
        let mut bitangents = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let (v0, v1, v2) = (self.vertices[i0], self.vertices[i1], self.vertices[i2]);

            let e1 = v1.position - v0.position;
            let e2 = v2.position - v0.position;
            let duv1 = v1.uv - v0.uv;
            let duv2 = v2.uv - v0.uv;

            let det = duv1.x * duv2.y - duv2.x * duv1.y;
            if det.abs() < 1e-8 {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (e1 * duv2.y - e2 * duv1.y) * r;
            let bitangent = (e2 * duv1.x - e1 * duv2.x) * r;

            for &i in &[i0, i1, i2] {
                tangents[i] += tangent;
                bitangents[i] += bitangent;
            }
        }

        for (i, vertex) in self.vertices.iter_mut().enumerate() {
            let n = vertex.normal;
            let t = tangents[i];
            let orthogonal = (t - n * n.dot(t)).normalize_or_zero();
            let t = if orthogonal.length_squared() > 0.0 {
                orthogonal
            } else {
                // Degenerate UVs; pick any vector orthogonal to the normal
                let fallback = n.cross(Vec3::Y);
                if fallback.length_squared() > 1e-6 {
                    fallback.normalize()
                } else {
                    Vec3::X
                }
            };
            let handedness = if n.cross(t).dot(bitangents[i]) < 0.0 {
                -1.0
            } else {
                1.0
            };
            vertex.tangent = t.extend(handedness);
        }

        true
    }

    /// Axis-aligned cube centered at the origin with the given edge length
    pub fn cube(size: f32) -> Self {
        let mut mesh = Mesh::new("cube");
        let h = size * 0.5;

        let faces = [
            // Front
            (Vec3::Z, [
                (Vec3::new(-h, -h, h), Vec2::new(0.0, 1.0)),
                (Vec3::new(h, -h, h), Vec2::new(1.0, 1.0)),
                (Vec3::new(h, h, h), Vec2::new(1.0, 0.0)),
                (Vec3::new(-h, h, h), Vec2::new(0.0, 0.0)),
            ]),
            // Back
            (-Vec3::Z, [
                (Vec3::new(h, -h, -h), Vec2::new(0.0, 1.0)),
                (Vec3::new(-h, -h, -h), Vec2::new(1.0, 1.0)),
                (Vec3::new(-h, h, -h), Vec2::new(1.0, 0.0)),
                (Vec3::new(h, h, -h), Vec2::new(0.0, 0.0)),
            ]),
            // Right
            (Vec3::X, [
                (Vec3::new(h, -h, h), Vec2::new(0.0, 1.0)),
                (Vec3::new(h, -h, -h), Vec2::new(1.0, 1.0)),
                (Vec3::new(h, h, -h), Vec2::new(1.0, 0.0)),
                (Vec3::new(h, h, h), Vec2::new(0.0, 0.0)),
            ]),
            // Left
            (-Vec3::X, [
                (Vec3::new(-h, -h, -h), Vec2::new(0.0, 1.0)),
                (Vec3::new(-h, -h, h), Vec2::new(1.0, 1.0)),
                (Vec3::new(-h, h, h), Vec2::new(1.0, 0.0)),
                (Vec3::new(-h, h, -h), Vec2::new(0.0, 0.0)),
            ]),
            // Top
            (Vec3::Y, [
                (Vec3::new(-h, h, h), Vec2::new(0.0, 1.0)),
                (Vec3::new(h, h, h), Vec2::new(1.0, 1.0)),
                (Vec3::new(h, h, -h), Vec2::new(1.0, 0.0)),
                (Vec3::new(-h, h, -h), Vec2::new(0.0, 0.0)),
            ]),
            // Bottom
            (-Vec3::Y, [
                (Vec3::new(-h, -h, -h), Vec2::new(0.0, 1.0)),
                (Vec3::new(h, -h, -h), Vec2::new(1.0, 1.0)),
                (Vec3::new(h, -h, h), Vec2::new(1.0, 0.0)),
                (Vec3::new(-h, -h, h), Vec2::new(0.0, 0.0)),
            ]),
        ];

        for (normal, corners) in faces {
            let base = mesh.vertices.len() as u32;
            for (position, uv) in corners {
                mesh.vertices.push(Vertex {
                    position,
                    normal,
                    uv,
                    tangent: Vec4::ZERO,
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh.compute_tangent_frame();
        mesh
    }

    /// Flat plane in the XZ plane facing +Y, with UVs tiled `uv_tiles`
    /// times across the surface
    pub fn plane(extent: f32, uv_tiles: f32) -> Self {
        let mut mesh = Mesh::new("plane");
        let h = extent * 0.5;

        let corners = [
            (Vec3::new(-h, 0.0, -h), Vec2::new(0.0, 0.0)),
            (Vec3::new(-h, 0.0, h), Vec2::new(0.0, uv_tiles)),
            (Vec3::new(h, 0.0, h), Vec2::new(uv_tiles, uv_tiles)),
            (Vec3::new(h, 0.0, -h), Vec2::new(uv_tiles, 0.0)),
        ];
        for (position, uv) in corners {
            mesh.vertices.push(Vertex {
                position,
                normal: Vec3::Y,
                uv,
                tangent: Vec4::ZERO,
            });
        }
        mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);

        mesh.compute_tangent_frame();
        mesh
    }
}
