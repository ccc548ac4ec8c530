//! Bundled assets: verdict animations (held in memory) and static images
//! served from the assets directory.

use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::models::ClassLabel;
use crate::views::label_style;

const HUMAN_ANIMATION_FILE: &str = "animation-human.json";
const AI_ANIMATION_FILE: &str = "animation-ai.json";

/// Lottie animation definitions, one per verdict
#[derive(Debug, Clone)]
pub struct Animations {
    // Indexed like `ClassLabel::BY_INDEX`
    by_label: [serde_json::Value; 2],
}

impl Animations {
    pub fn new(ai: serde_json::Value, human: serde_json::Value) -> Self {
        Self {
            by_label: [ai, human],
        }
    }

    /// Read both definitions once at startup
    pub fn load(assets_dir: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(
            read_json(&assets_dir.join(AI_ANIMATION_FILE))?,
            read_json(&assets_dir.join(HUMAN_ANIMATION_FILE))?,
        ))
    }

    pub fn for_label(&self, label: ClassLabel) -> &serde_json::Value {
        &self.by_label[label.index()]
    }

    /// Look up by the animation name used in `/animations/{name}.json`
    pub fn by_name(&self, name: &str) -> Option<&serde_json::Value> {
        ClassLabel::BY_INDEX
            .into_iter()
            .find(|&label| label_style(label).animation == name)
            .map(|label| self.for_label(label))
    }
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading animation {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing animation {}", path.display()))
}

pub fn content_type_for(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".json") {
        "application/json"
    } else if lower.ends_with(".svg") {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    }
}

/// Resolve `path` inside `root`, rejecting anything that escapes it
pub fn resolve_asset(root: &Path, path: &str) -> Option<PathBuf> {
    if path.is_empty() || path.contains("..") || path.contains('\0') || path.starts_with('/') {
        return None;
    }

    let canonical = root.join(path).canonicalize().ok()?;
    let root = root.canonicalize().ok()?;
    canonical.starts_with(&root).then_some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn animations_are_found_by_style_name() {
        let animations = Animations::new(json!({"nm": "ai"}), json!({"nm": "human"}));
        assert_eq!(animations.by_name("ai"), Some(&json!({"nm": "ai"})));
        assert_eq!(animations.by_name("human"), Some(&json!({"nm": "human"})));
        assert_eq!(animations.by_name("robot"), None);
    }

    #[test]
    fn missing_animation_files_fail_to_load() {
        let dir = std::env::temp_dir().join(format!("aidetect-missing-{}", uuid::Uuid::new_v4()));
        assert!(Animations::load(&dir).is_err());
    }

    #[test]
    fn traversal_is_rejected() {
        let root = std::env::temp_dir();
        assert_eq!(resolve_asset(&root, "../etc/passwd"), None);
        assert_eq!(resolve_asset(&root, "/etc/passwd"), None);
        assert_eq!(resolve_asset(&root, ""), None);
    }

    #[test]
    fn existing_asset_resolves() {
        let dir = std::env::temp_dir().join(format!("aidetect-assets-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("profile.jpg"), b"jpeg").unwrap();

        let resolved = resolve_asset(&dir, "profile.jpg").expect("asset resolves");
        assert!(resolved.ends_with("profile.jpg"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("sample-ai.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("animation-ai.json"), "application/json");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
    }
}
