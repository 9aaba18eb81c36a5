#![allow(clippy::missing_errors_doc)]

//! TOML scene descriptions standing in for a host world.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use blast_fishing_core::Aabb;
use blast_fishing_scene::Scene;
use glam::Vec3;
use serde::Deserialize;

const SUPPORTED_SCENE_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct SceneManifest {
    version: u32,
    #[serde(default)]
    volumes: Vec<VolumeEntry>,
}

/// One tagged axis-aligned box of the scene.
#[derive(Debug, Deserialize)]
struct VolumeEntry {
    tag: String,
    min: [f32; 3],
    max: [f32; 3],
}

/// Reads and parses the scene description at `path`.
pub(crate) fn load_scene(path: &Path) -> Result<Scene> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene description at {}", path.display()))?;
    let scene = parse_scene(&contents)?;
    log::info!(
        "scene_file: loaded {} volumes from {}",
        scene.volume_count(),
        path.display()
    );
    Ok(scene)
}

fn parse_scene(contents: &str) -> Result<Scene> {
    let manifest: SceneManifest =
        toml::from_str(contents).context("failed to parse scene toml contents")?;
    if manifest.version != SUPPORTED_SCENE_VERSION {
        bail!(
            "unsupported scene version {}; expected {SUPPORTED_SCENE_VERSION}",
            manifest.version
        );
    }

    let mut scene = Scene::new();
    for entry in &manifest.volumes {
        let Some(tag) = scene.register_tag(&entry.tag) else {
            bail!("scene defines too many distinct surface tags (limit 32)");
        };
        let _ = scene.add_volume(
            tag,
            Aabb::from_corners(Vec3::from_array(entry.min), Vec3::from_array(entry.max)),
        );
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POND: &str = r#"
version = 1

[[volumes]]
tag = "Water"
min = [-10.0, -3.0, -10.0]
max = [10.0, 0.0, 10.0]

[[volumes]]
tag = "Ground"
min = [-12.0, -5.0, -12.0]
max = [12.0, -3.0, 12.0]
"#;

    #[test]
    fn parses_a_tagged_box_scene() {
        let scene = parse_scene(POND).expect("pond scene parses");
        assert_eq!(scene.volume_count(), 2);
    }

    #[test]
    fn loads_a_scene_description_from_disk() {
        let path = std::env::temp_dir()
            .join(format!("blast_fishing_scene_{}.toml", std::process::id()));
        fs::write(&path, POND).expect("scene written");

        let scene = load_scene(&path).expect("pond scene loads");
        assert_eq!(scene.volume_count(), 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_unsupported_versions() {
        let error = parse_scene("version = 9\n").expect_err("version 9 is unsupported");
        assert!(error.to_string().contains("unsupported scene version 9"));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_scene("version = \"one\"").is_err());
        assert!(parse_scene("[[volumes]]\ntag = 3\n").is_err());
    }

    #[test]
    fn accepts_an_empty_scene() {
        let scene = parse_scene("version = 1\n").expect("empty scene parses");
        assert_eq!(scene.volume_count(), 0);
    }

    #[test]
    fn rejects_more_tags_than_the_mask_can_hold() {
        let mut document = String::from("version = 1\n");
        for index in 0..33 {
            document.push_str(&format!("[[volumes]]\ntag = \"Layer{index}\"\n"));
            document.push_str("min = [0.0, 0.0, 0.0]\nmax = [1.0, 1.0, 1.0]\n");
        }

        let error = parse_scene(&document).expect_err("33 tags exceed the mask");
        assert!(error.to_string().contains("too many distinct surface tags"));
    }
}
