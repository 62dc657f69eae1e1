//! Asset type model and `--type` filtering.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The Unity object categories this tool knows how to export.
///
/// Spellings match Unity's class names; anything else in a bundle is
/// ignored the way the original tool ignored unlisted types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Texture2D,
    TextAsset,
    Mesh,
    AudioClip,
    Shader,
    MonoBehaviour,
    AnimationClip,
    Material,
    Sprite,
    Font,
    VideoClip,
}

impl AssetKind {
    /// Every supported kind, in display order.
    pub const ALL: [AssetKind; 11] = [
        AssetKind::Texture2D,
        AssetKind::TextAsset,
        AssetKind::Mesh,
        AssetKind::AudioClip,
        AssetKind::Shader,
        AssetKind::MonoBehaviour,
        AssetKind::AnimationClip,
        AssetKind::Material,
        AssetKind::Sprite,
        AssetKind::Font,
        AssetKind::VideoClip,
    ];

    /// Canonical Unity class name.
    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Texture2D => "Texture2D",
            AssetKind::TextAsset => "TextAsset",
            AssetKind::Mesh => "Mesh",
            AssetKind::AudioClip => "AudioClip",
            AssetKind::Shader => "Shader",
            AssetKind::MonoBehaviour => "MonoBehaviour",
            AssetKind::AnimationClip => "AnimationClip",
            AssetKind::Material => "Material",
            AssetKind::Sprite => "Sprite",
            AssetKind::Font => "Font",
            AssetKind::VideoClip => "VideoClip",
        }
    }

    /// Per-type output subfolder used by `extract`.
    pub fn subfolder(self) -> &'static str {
        self.name()
    }

    /// Subfolder name used by the classic `unpack` layout.
    pub fn classic_subfolder(self) -> &'static str {
        match self {
            AssetKind::Texture2D => "Textures",
            AssetKind::TextAsset => "TextAssets",
            other => other.name(),
        }
    }

    /// Whether edited files of this kind can be pushed back into a bundle.
    pub fn supports_reimport(self) -> bool {
        matches!(
            self,
            AssetKind::Texture2D | AssetKind::TextAsset | AssetKind::Mesh
        )
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown asset type '{input}' (expected 'all' or one of: {expected})")]
pub struct ParseKindError {
    pub input: String,
    expected: String,
}

impl ParseKindError {
    fn new(input: &str) -> Self {
        let expected = AssetKind::ALL
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ");
        ParseKindError {
            input: input.to_string(),
            expected,
        }
    }
}

impl FromStr for AssetKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetKind::ALL
            .iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ParseKindError::new(s))
    }
}

/// Asset type selection built from repeated `--type` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Only(BTreeSet<AssetKind>),
}

impl TypeFilter {
    /// Parse CLI values. An empty list or any `all` entry selects
    /// everything.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self, ParseKindError> {
        if values.is_empty() {
            return Ok(TypeFilter::All);
        }

        let mut kinds = BTreeSet::new();
        for value in values {
            let value = value.as_ref();
            if value.eq_ignore_ascii_case("all") {
                return Ok(TypeFilter::All);
            }
            kinds.insert(value.parse::<AssetKind>()?);
        }
        Ok(TypeFilter::Only(kinds))
    }

    pub fn matches(&self, kind: AssetKind) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(kinds) => kinds.contains(&kind),
        }
    }

    /// Restrict the selection to kinds that can be re-imported.
    pub fn matches_reimport(&self, kind: AssetKind) -> bool {
        kind.supports_reimport() && self.matches(kind)
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("all"),
            TypeFilter::Only(kinds) => {
                let names: Vec<_> = kinds.iter().map(|k| k.name()).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_case_insensitive() {
        assert_eq!("texture2d".parse::<AssetKind>(), Ok(AssetKind::Texture2D));
        assert_eq!("TextAsset".parse::<AssetKind>(), Ok(AssetKind::TextAsset));
        assert_eq!("MESH".parse::<AssetKind>(), Ok(AssetKind::Mesh));
    }

    #[test]
    fn test_parse_kind_unknown() {
        let err = "Texture3D".parse::<AssetKind>().unwrap_err();
        assert_eq!(err.input, "Texture3D");
        assert!(err.to_string().contains("Texture2D"));
    }

    #[test]
    fn test_filter_all_variants() {
        assert_eq!(TypeFilter::parse::<&str>(&[]).unwrap(), TypeFilter::All);
        assert_eq!(TypeFilter::parse(&["all"]).unwrap(), TypeFilter::All);
        // "all" wins even when mixed with concrete types
        assert_eq!(
            TypeFilter::parse(&["Texture2D", "all"]).unwrap(),
            TypeFilter::All
        );
    }

    #[test]
    fn test_filter_only() {
        let filter = TypeFilter::parse(&["Texture2D", "Mesh"]).unwrap();
        assert!(filter.matches(AssetKind::Texture2D));
        assert!(filter.matches(AssetKind::Mesh));
        assert!(!filter.matches(AssetKind::TextAsset));
    }

    #[test]
    fn test_filter_rejects_unknown() {
        assert!(TypeFilter::parse(&["Texture2D", "bogus"]).is_err());
    }

    #[test]
    fn test_reimport_support() {
        assert!(AssetKind::Texture2D.supports_reimport());
        assert!(AssetKind::TextAsset.supports_reimport());
        assert!(AssetKind::Mesh.supports_reimport());
        assert!(!AssetKind::Sprite.supports_reimport());
        assert!(!AssetKind::Shader.supports_reimport());

        let filter = TypeFilter::All;
        assert!(filter.matches_reimport(AssetKind::Mesh));
        assert!(!filter.matches_reimport(AssetKind::AudioClip));
    }

    #[test]
    fn test_classic_subfolders() {
        assert_eq!(AssetKind::Texture2D.classic_subfolder(), "Textures");
        assert_eq!(AssetKind::TextAsset.classic_subfolder(), "TextAssets");
        assert_eq!(AssetKind::Mesh.classic_subfolder(), "Mesh");
    }
}
