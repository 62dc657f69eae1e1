//! `unity_rs` backed bundle engine.
//!
//! The only module allowed to touch the `unity_rs` API. The engine is
//! strictly a reader: container parsing, object decoding, and typetree
//! dumps come from it, while replacements are encoded here and spliced
//! into the original bytes by [`crate::unityfs`] at pack time. That
//! split means only kinds with an encodable payload layout (currently
//! TextAsset) can be re-imported; everything else reports
//! [`BundleError::UnsupportedEncode`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use base64::Engine as _;
use serde_json::Value;
use unity_rs::classes::{Sprite, TextAsset, Texture2D};
use unity_rs::{ClassID, Env};

use crate::bundle::{
    AssetPayload, AssetRecord, AssetReplacement, Bundle, BundleError, Compression,
};
use crate::kind::AssetKind;
use crate::unityfs;

pub struct UnityBundle {
    env: Env,
    raw: Vec<u8>,
    records: Vec<AssetRecord>,
    replacements: BTreeMap<i64, Vec<u8>>,
    unity_version: Option<String>,
}

impl std::fmt::Debug for UnityBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnityBundle")
            .field("raw", &self.raw.len())
            .field("records", &self.records)
            .field("replacements", &self.replacements.keys())
            .field("unity_version", &self.unity_version)
            .finish_non_exhaustive()
    }
}

impl UnityBundle {
    /// Open a bundle file.
    pub fn open(path: &Path, fallback_version: Option<&str>) -> Result<Self, BundleError> {
        let data = fs::read(path)?;
        Self::from_slice(&data, fallback_version)
    }

    /// Load a bundle from raw bytes.
    pub fn from_slice(data: &[u8], fallback_version: Option<&str>) -> Result<Self, BundleError> {
        let mut env = Env::new();
        env.load_from_slice(data)
            .map_err(|e| BundleError::Parse(e.to_string()))?;

        let mut records = Vec::new();
        for obj in env.objects() {
            let Some(kind) = kind_of(obj.class()) else {
                continue;
            };
            // Typed readers for the classes that have them, typetree
            // lookup otherwise; a nameless object is not an error.
            let name = match kind {
                AssetKind::Texture2D => obj.read::<Texture2D>().ok().map(|t| t.name),
                AssetKind::Sprite => obj.read::<Sprite>().ok().map(|s| s.name),
                AssetKind::TextAsset => obj.read::<TextAsset>().ok().map(|t| t.name),
                _ => obj
                    .read_type_tree()
                    .ok()
                    .and_then(|tree| tree_string(&tree, &["name", "m_Name", "m_ClassName"])),
            };
            records.push(AssetRecord {
                path_id: obj.info.path_id,
                kind,
                name: name.filter(|n| !n.trim().is_empty()),
            });
        }

        Ok(UnityBundle {
            env,
            raw: data.to_vec(),
            records,
            replacements: BTreeMap::new(),
            unity_version: fallback_version.map(str::to_string),
        })
    }

    fn record(&self, path_id: i64) -> Result<&AssetRecord, BundleError> {
        self.records
            .iter()
            .find(|r| r.path_id == path_id)
            .ok_or(BundleError::MissingAsset { path_id })
    }
}

impl Bundle for UnityBundle {
    fn assets(&self) -> &[AssetRecord] {
        &self.records
    }

    fn payload(&mut self, path_id: i64) -> Result<AssetPayload, BundleError> {
        let kind = self.record(path_id)?.kind;
        let Some(obj) = self
            .env
            .objects()
            .into_iter()
            .find(|o| o.info.path_id == path_id)
        else {
            return Err(BundleError::MissingAsset { path_id });
        };

        match kind {
            AssetKind::Texture2D => {
                let mut tex: Texture2D = obj.read().map_err(BundleError::engine)?;
                let img = tex.decode_image().map_err(BundleError::engine)?.to_rgba8();
                Ok(AssetPayload::Image(img))
            }
            AssetKind::Sprite => {
                let mut sprite: Sprite = obj.read().map_err(BundleError::engine)?;
                let img = sprite
                    .decode_image()
                    .map_err(BundleError::engine)?
                    .to_rgba8();
                Ok(AssetPayload::Image(img))
            }
            AssetKind::TextAsset => {
                let text: TextAsset = obj.read().map_err(BundleError::engine)?;
                Ok(AssetPayload::Text(text.script))
            }
            AssetKind::Shader => {
                let tree = obj.read_type_tree().map_err(BundleError::engine)?;
                match tree_string(&tree, &["m_Script", "script"]) {
                    Some(script) => Ok(AssetPayload::Text(script.into_bytes())),
                    None => Ok(AssetPayload::TypeTree(tree_value(tree))),
                }
            }
            AssetKind::AudioClip | AssetKind::Font | AssetKind::VideoClip => {
                let (field, extension) = match kind {
                    AssetKind::AudioClip => ("m_AudioData", "wav"),
                    AssetKind::Font => ("m_FontData", "ttf"),
                    _ => ("m_VideoData", "mp4"),
                };
                let tree = obj.read_type_tree().map_err(BundleError::engine)?;
                match tree_bytes(&tree, field) {
                    Some(data) if !data.is_empty() => Ok(AssetPayload::Binary { data, extension }),
                    _ => Err(BundleError::NoPayload { kind, path_id }),
                }
            }
            AssetKind::Mesh
            | AssetKind::MonoBehaviour
            | AssetKind::AnimationClip
            | AssetKind::Material => {
                let tree = obj.read_type_tree().map_err(BundleError::engine)?;
                Ok(AssetPayload::TypeTree(tree_value(tree)))
            }
        }
    }

    fn replace(
        &mut self,
        path_id: i64,
        replacement: AssetReplacement,
    ) -> Result<(), BundleError> {
        let record = self.record(path_id)?;
        let kind = record.kind;
        if !kind.supports_reimport() {
            return Err(BundleError::UnsupportedReplace { kind });
        }
        match (kind, replacement) {
            (AssetKind::TextAsset, AssetReplacement::Text(content)) => {
                let name = record.name.clone().unwrap_or_default();
                self.replacements
                    .insert(path_id, unityfs::encode_text_asset(&name, &content));
                Ok(())
            }
            (AssetKind::TextAsset, _) => Err(BundleError::Engine(
                "TextAsset replacement requires text content".into(),
            )),
            (kind, _) => Err(BundleError::UnsupportedEncode { kind }),
        }
    }

    fn supports_replacement(&self, kind: AssetKind) -> bool {
        kind == AssetKind::TextAsset
    }

    fn pack(&mut self, compression: Compression) -> Result<Vec<u8>, BundleError> {
        unityfs::repack_archive(&self.raw, &self.replacements, compression)
    }

    fn unity_version(&self) -> Option<&str> {
        self.unity_version.as_deref()
    }
}

fn kind_of(class: ClassID) -> Option<AssetKind> {
    match class {
        ClassID::Texture2D => Some(AssetKind::Texture2D),
        ClassID::TextAsset => Some(AssetKind::TextAsset),
        ClassID::Mesh => Some(AssetKind::Mesh),
        ClassID::AudioClip => Some(AssetKind::AudioClip),
        ClassID::Shader => Some(AssetKind::Shader),
        ClassID::MonoBehaviour => Some(AssetKind::MonoBehaviour),
        ClassID::AnimationClip => Some(AssetKind::AnimationClip),
        ClassID::Material => Some(AssetKind::Material),
        ClassID::Sprite => Some(AssetKind::Sprite),
        ClassID::Font => Some(AssetKind::Font),
        ClassID::VideoClip => Some(AssetKind::VideoClip),
        _ => None,
    }
}

fn tree_value(tree: HashMap<String, Value>) -> Value {
    Value::Object(tree.into_iter().collect())
}

/// First non-empty string among `fields` in a typetree dump.
fn tree_string(tree: &HashMap<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|f| tree.get(*f))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .find(|s| !s.is_empty())
}

/// Decode a typetree byte field: either an array of numbers or a
/// base64-encoded string, depending on how the engine dumped it.
fn tree_bytes(tree: &HashMap<String, Value>, field: &str) -> Option<Vec<u8>> {
    match tree.get(field)? {
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_u64().map(|n| n as u8))
            .collect::<Option<Vec<u8>>>(),
        Value::String(s) => base64::engine::general_purpose::STANDARD
            .decode(s)
            .ok()
            .or_else(|| Some(s.clone().into_bytes())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> HashMap<String, Value> {
        value.as_object().unwrap().clone().into_iter().collect()
    }

    fn bundle_with(records: Vec<AssetRecord>) -> UnityBundle {
        UnityBundle {
            env: Env::new(),
            raw: Vec::new(),
            records,
            replacements: BTreeMap::new(),
            unity_version: None,
        }
    }

    #[test]
    fn test_tree_string_lookup_order() {
        let dump = tree(json!({"m_Name": "hero", "name": ""}));
        assert_eq!(
            tree_string(&dump, &["name", "m_Name"]),
            Some("hero".to_string())
        );
        assert_eq!(tree_string(&tree(json!({})), &["m_Name"]), None);
    }

    #[test]
    fn test_tree_bytes_from_array_and_base64() {
        let dump = tree(json!({"m_AudioData": [82, 73, 70, 70]}));
        assert_eq!(tree_bytes(&dump, "m_AudioData"), Some(b"RIFF".to_vec()));

        let dump = tree(json!({"m_FontData": "UklGRg=="}));
        assert_eq!(tree_bytes(&dump, "m_FontData"), Some(b"RIFF".to_vec()));

        assert_eq!(tree_bytes(&tree(json!({"x": 1})), "m_AudioData"), None);
    }

    #[test]
    fn test_replace_queues_text_asset_payload() {
        let mut bundle = bundle_with(vec![AssetRecord {
            path_id: 9,
            kind: AssetKind::TextAsset,
            name: Some("notes".to_string()),
        }]);

        bundle
            .replace(9, AssetReplacement::Text(b"hello".to_vec()))
            .unwrap();
        assert_eq!(
            bundle.replacements.get(&9),
            Some(&unityfs::encode_text_asset("notes", b"hello"))
        );
    }

    #[test]
    fn test_replace_rejects_kinds_without_an_encoder() {
        let mut bundle = bundle_with(vec![
            AssetRecord {
                path_id: 1,
                kind: AssetKind::Texture2D,
                name: Some("icon".to_string()),
            },
            AssetRecord {
                path_id: 2,
                kind: AssetKind::Sprite,
                name: None,
            },
        ]);

        let err = bundle
            .replace(1, AssetReplacement::Image(image::RgbaImage::new(1, 1)))
            .unwrap_err();
        assert!(matches!(
            err,
            BundleError::UnsupportedEncode {
                kind: AssetKind::Texture2D
            }
        ));

        let err = bundle
            .replace(2, AssetReplacement::Text(Vec::new()))
            .unwrap_err();
        assert!(matches!(
            err,
            BundleError::UnsupportedReplace {
                kind: AssetKind::Sprite
            }
        ));

        assert!(!bundle.supports_replacement(AssetKind::Texture2D));
        assert!(bundle.supports_replacement(AssetKind::TextAsset));
    }

    #[test]
    fn test_parse_error_on_garbage() {
        let err = UnityBundle::from_slice(b"not a bundle", None).unwrap_err();
        assert!(matches!(err, BundleError::Parse(_)));
    }
}
