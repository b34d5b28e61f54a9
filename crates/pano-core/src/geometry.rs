//! UV-sphere tessellation for the panorama surface.

use crate::constants::INTERIOR_MIRROR;
use crate::error::{Result, ViewerError};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn interleaved(&self) -> Vec<SphereVertex> {
        self.positions
            .iter()
            .zip(&self.tex_coords)
            .map(|(p, uv)| SphereVertex {
                position: *p,
                uv: *uv,
            })
            .collect()
    }
}

/// Point on the unit sphere for longitude fraction `u` and colatitude
/// fraction `v`, as seen from outside the sphere.
#[inline]
pub fn sphere_point(u: f32, v: f32) -> Vec3 {
    let theta = u * TAU;
    let phi = v * PI;
    Vec3::new(-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin())
}

/// Direction from the sphere centre to where the panorama texel `(u, v)`
/// is painted once the sphere is mirrored for interior viewing.
#[inline]
pub fn panorama_direction(u: f32, v: f32) -> Vec3 {
    sphere_point(u, v) * INTERIOR_MIRROR
}

/// Unit-radius UV sphere with seams at the poles.
///
/// Rows run from the north pole (`v = 0`) to the south pole; each row has
/// `width_segments + 1` vertices so the longitude seam gets its own `u = 1`
/// column and the texture wraps without a visible stitch. Pole rows emit a
/// single triangle per segment instead of a degenerate quad.
pub fn build(width_segments: u32, height_segments: u32) -> Result<Mesh> {
    if width_segments == 0 || height_segments == 0 {
        return Err(ViewerError::InvalidSegments {
            width: width_segments,
            height: height_segments,
        });
    }
    let cols = (width_segments + 1) as usize;
    let rows = (height_segments + 1) as usize;
    let mut positions = Vec::with_capacity(cols * rows);
    let mut tex_coords = Vec::with_capacity(cols * rows);

    for iy in 0..rows {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..cols {
            let u = ix as f32 / width_segments as f32;
            positions.push(sphere_point(u, v).to_array());
            tex_coords.push([u, 1.0 - v]);
        }
    }

    let mut indices = Vec::with_capacity(width_segments as usize * height_segments as usize * 6);
    let at = |ix: u32, iy: u32| iy * (width_segments + 1) + ix;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = at(ix + 1, iy);
            let b = at(ix, iy);
            let c = at(ix, iy + 1);
            let d = at(ix + 1, iy + 1);
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Ok(Mesh {
        positions,
        tex_coords,
        indices,
    })
}
