//! Scene files and off-thread panorama decoding.

use crate::UserEvent;
use anyhow::Context;
use pano_core::SceneDescriptor;
use pano_render::{decode_panorama, PanoramaImage};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::thread;
use winit::event_loop::EventLoopProxy;

/// A scene file holds one descriptor or an ordered list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum SceneFile {
    One(SceneDescriptor),
    Many(Vec<SceneDescriptor>),
}

pub fn read_scenes(path: &Path) -> anyhow::Result<Vec<SceneDescriptor>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let scenes = match serde_json::from_str::<SceneFile>(&json)
        .with_context(|| format!("parsing {}", path.display()))?
    {
        SceneFile::One(s) => vec![s],
        SceneFile::Many(list) => list,
    };
    anyhow::ensure!(!scenes.is_empty(), "{} lists no scenes", path.display());
    Ok(scenes)
}

/// Image references are file paths relative to the scene file.
pub fn resolve_image(base_dir: &Path, image_url: &str) -> Result<PathBuf, String> {
    if image_url.starts_with("http://") || image_url.starts_with("https://") {
        return Err(format!("remote image {} is not supported natively", image_url));
    }
    let path = Path::new(image_url.strip_prefix("file://").unwrap_or(image_url));
    Ok(if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    })
}

fn load(path: &Path, max_dimension: u32) -> Result<PanoramaImage, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let image = decode_panorama(&bytes, max_dimension).map_err(|e| e.to_string())?;
    log::info!(
        "[scene] decoded {} ({}x{})",
        path.display(),
        image.width,
        image.height
    );
    Ok(image)
}

/// Decodes on a worker; the result comes back as [`UserEvent::Texture`].
pub fn spawn_decode(
    proxy: EventLoopProxy<UserEvent>,
    path: PathBuf,
    generation: u64,
    max_dimension: u32,
) {
    let fallback = proxy.clone();
    let spawned = thread::Builder::new()
        .name("pano-decode".into())
        .spawn(move || {
            let result = load(&path, max_dimension);
            _ = proxy.send_event(UserEvent::Texture { generation, result });
        });
    if let Err(e) = spawned {
        _ = fallback.send_event(UserEvent::Texture {
            generation,
            result: Err(format!("could not start decoder: {}", e)),
        });
    }
}
