// Sphere tessellation and the panorama direction mapping.

mod common;

use common::approx;
use pano_core::geometry::{build, panorama_direction, sphere_point};
use pano_core::*;

#[test]
fn default_sphere_counts() {
    let mesh = build(DEFAULT_WIDTH_SEGMENTS, DEFAULT_HEIGHT_SEGMENTS).unwrap();
    assert_eq!(mesh.vertex_count(), 65 * 33);
    assert_eq!(mesh.tex_coords.len(), mesh.vertex_count());
    // pole rows contribute one triangle per segment
    assert_eq!(mesh.triangle_count(), 2 * 64 * 31);
    assert_eq!(mesh.indices.len() % 3, 0);
}

#[test]
fn small_sphere_counts() {
    let mesh = build(8, 4).unwrap();
    assert_eq!(mesh.vertex_count(), 9 * 5);
    assert_eq!(mesh.triangle_count(), 2 * 8 * 3);
}

#[test]
fn zero_segments_are_rejected() {
    assert!(matches!(
        build(0, 16),
        Err(ViewerError::InvalidSegments { width: 0, height: 16 })
    ));
    assert!(matches!(
        build(16, 0),
        Err(ViewerError::InvalidSegments { .. })
    ));
    assert_eq!(
        build(0, 0).unwrap_err().class(),
        ErrorClass::FatalToFeature
    );
}

#[test]
fn vertices_lie_on_the_unit_sphere_with_normalized_uvs() {
    let mesh = build(24, 12).unwrap();
    for (p, uv) in mesh.positions.iter().zip(&mesh.tex_coords) {
        let len = glam::Vec3::from_array(*p).length();
        assert!(approx(len, 1.0, 1e-5), "len {len}");
        assert!((0.0..=1.0).contains(&uv[0]));
        assert!((0.0..=1.0).contains(&uv[1]));
    }
    let max = mesh.vertex_count() as u32;
    assert!(mesh.indices.iter().all(|&i| i < max));
}

#[test]
fn seam_column_duplicates_the_first() {
    let mesh = build(16, 8).unwrap();
    let cols = 17;
    for row in 0..9 {
        let first = glam::Vec3::from_array(mesh.positions[row * cols]);
        let last = glam::Vec3::from_array(mesh.positions[row * cols + 16]);
        assert!(first.distance(last) < 1e-5);
        assert_eq!(mesh.tex_coords[row * cols][0], 0.0);
        assert_eq!(mesh.tex_coords[row * cols + 16][0], 1.0);
    }
}

#[test]
fn poles_and_equator() {
    let north = sphere_point(0.3, 0.0);
    assert!(approx(north.y, 1.0, 1e-6));
    let south = sphere_point(0.7, 1.0);
    assert!(approx(south.y, -1.0, 1e-6));

    let eq = sphere_point(0.5, 0.5);
    assert!(approx(eq.x, 1.0, 1e-5));
    assert!(approx(eq.y, 0.0, 1e-5));
}

#[test]
fn panorama_centre_faces_negative_x_inside_the_sphere() {
    let d = panorama_direction(0.5, 0.5);
    assert!(approx(d.x, -1.0, 1e-5), "{d:?}");
    assert!(approx(d.y, 0.0, 1e-5));
    assert!(approx(d.z, 0.0, 1e-5));

    // three quarters across sits straight ahead of the default camera
    let ahead = panorama_direction(0.75, 0.5);
    assert!(approx(ahead.z, -1.0, 1e-5), "{ahead:?}");
}

#[test]
fn interleaved_matches_attribute_arrays() {
    let mesh = build(6, 3).unwrap();
    let verts = mesh.interleaved();
    assert_eq!(verts.len(), mesh.vertex_count());
    assert_eq!(verts[5].position, mesh.positions[5]);
    assert_eq!(verts[5].uv, mesh.tex_coords[5]);
    assert_eq!(
        std::mem::size_of::<SphereVertex>(),
        5 * std::mem::size_of::<f32>()
    );
}
