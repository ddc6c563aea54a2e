//! Mesh generators and tangent-frame computation

use glam::{Vec2, Vec3, Vec4};
use prepass_renderer::backend::types::Vertex;
use prepass_renderer::resources::Mesh;

#[test]
fn cube_has_24_vertices_and_12_triangles() {
    let cube = Mesh::cube(1.0);
    assert_eq!(cube.vertex_count(), 24);
    assert_eq!(cube.triangle_count(), 12);
    assert_eq!(cube.index_count(), 36);
}

#[test]
fn generated_tangents_are_unit_length_and_orthogonal_to_normals() {
    for mesh in [Mesh::cube(2.0), Mesh::plane(10.0, 4.0)] {
        for vertex in &mesh.vertices {
            let tangent = Vec3::new(vertex.tangent.x, vertex.tangent.y, vertex.tangent.z);
            assert!(
                (tangent.length() - 1.0).abs() < 1e-4,
                "non-unit tangent in {}",
                mesh.name
            );
            assert!(
                tangent.dot(vertex.normal).abs() < 1e-4,
                "tangent not orthogonal to normal in {}",
                mesh.name
            );
            assert!(vertex.tangent.w == 1.0 || vertex.tangent.w == -1.0);
        }
    }
}

#[test]
fn tangent_frame_follows_uv_direction() {
    // A single triangle whose U axis runs along +X
    let mut mesh = Mesh::new("triangle");
    mesh.vertices = vec![
        Vertex {
            position: Vec3::ZERO,
            normal: Vec3::Z,
            uv: Vec2::new(0.0, 0.0),
            tangent: Vec4::ZERO,
        },
        Vertex {
            position: Vec3::X,
            normal: Vec3::Z,
            uv: Vec2::new(1.0, 0.0),
            tangent: Vec4::ZERO,
        },
        Vertex {
            position: Vec3::Y,
            normal: Vec3::Z,
            uv: Vec2::new(0.0, 1.0),
            tangent: Vec4::ZERO,
        },
    ];
    mesh.indices = vec![0, 1, 2];

    assert!(mesh.compute_tangent_frame());
    for vertex in &mesh.vertices {
        let tangent = Vec3::new(vertex.tangent.x, vertex.tangent.y, vertex.tangent.z);
        assert!((tangent - Vec3::X).length() < 1e-5);
    }
}

#[test]
fn tangent_frame_rejects_incomplete_meshes() {
    let mut empty = Mesh::new("empty");
    assert!(!empty.compute_tangent_frame());

    empty.vertices.push(Vertex {
        position: Vec3::ZERO,
        normal: Vec3::Z,
        uv: Vec2::ZERO,
        tangent: Vec4::ZERO,
    });
    empty.indices = vec![0, 0];
    assert!(!empty.compute_tangent_frame());
}

#[test]
fn vertex_bytes_cover_every_vertex() {
    let plane = Mesh::plane(4.0, 1.0);
    assert_eq!(
        plane.vertex_bytes().len(),
        plane.vertex_count() * std::mem::size_of::<Vertex>()
    );
    assert_eq!(plane.index_bytes().len(), plane.index_count() * 4);
}
