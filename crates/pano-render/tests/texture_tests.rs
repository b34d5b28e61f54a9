// CPU-side pieces of the renderer: decoding and the sphere transform.

use glam::Vec4;
use pano_core::geometry::sphere_point;
use pano_core::{CameraState, ErrorClass, ViewerError};
use pano_render::*;
use std::io::Cursor;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decodes_png_to_rgba() {
    let pano = decode_panorama(&png(8, 4), 4096).unwrap();
    assert_eq!((pano.width, pano.height), (8, 4));
    assert_eq!(pano.rgba.len(), 8 * 4 * 4);
    // pixel (3, 2)
    let i = (2 * 8 + 3) * 4;
    assert_eq!(&pano.rgba[i..i + 4], &[3, 2, 128, 255]);
}

#[test]
fn oversized_panoramas_are_downscaled_keeping_aspect() {
    let pano = decode_panorama(&png(64, 32), 16).unwrap();
    assert_eq!((pano.width, pano.height), (16, 8));
    assert_eq!(pano.rgba.len(), 16 * 8 * 4);
}

#[test]
fn garbage_bytes_are_a_recoverable_texture_error() {
    let err = decode_panorama(b"definitely not an image", 4096).unwrap_err();
    assert!(matches!(err, RenderError::Decode(_)));
    let viewer_err: ViewerError = err.into();
    assert!(matches!(viewer_err, ViewerError::TextureLoad(_)));
    assert_eq!(viewer_err.class(), ErrorClass::RecoverableAsset);
}

#[test]
fn init_failures_are_fatal() {
    let viewer_err: ViewerError = RenderError::NoAdapter.into();
    assert_eq!(viewer_err.class(), ErrorClass::FatalToFeature);
    assert!(viewer_err.to_string().starts_with("could not start 3D viewer"));
}

fn project(camera: &CameraState, u: f32, v: f32) -> Vec4 {
    let p = sphere_point(u, v);
    let clip = model_view_projection(camera, 16.0 / 9.0) * p.extend(1.0);
    clip / clip.w
}

#[test]
fn image_centre_row_reads_left_to_right_from_inside() {
    let camera = CameraState::new(75.0);
    let ahead = project(&camera, 0.75, 0.5);
    assert!(ahead.x.abs() < 1e-4 && ahead.y.abs() < 1e-4, "{ahead:?}");

    // a little further along the image is to the right, not mirrored
    let right = project(&camera, 0.8, 0.5);
    assert!(right.x > 0.0, "{right:?}");
    let left = project(&camera, 0.7, 0.5);
    assert!(left.x < 0.0, "{left:?}");

    // top of the image is up
    let up = project(&camera, 0.75, 0.4);
    assert!(up.y > 0.0, "{up:?}");
}

#[test]
fn shader_declares_both_entry_points() {
    assert!(PANORAMA_WGSL.contains("fn vs_main"));
    assert!(PANORAMA_WGSL.contains("fn fs_main"));
}
