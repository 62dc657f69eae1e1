//! Bundle integrity checks.

use std::fmt;

use crate::bundle::{AssetPayload, AssetRecord, Bundle, BundleError};
use crate::kind::AssetKind;

/// One problem found by [`verify_bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    UnnamedTexture { path_id: i64 },
    EmptyTexture { name: String },
    EmptyTextAsset { name: String },
    Unreadable { kind: AssetKind, name: String, message: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::UnnamedTexture { path_id } => {
                write!(f, "Unnamed texture (ID: {})", path_id)
            }
            Issue::EmptyTexture { name } => write!(f, "Empty texture: {}", name),
            Issue::EmptyTextAsset { name } => write!(f, "Empty text asset: {}", name),
            Issue::Unreadable {
                kind,
                name,
                message,
            } => write!(f, "Unreadable {}: {} ({})", kind, name, message),
        }
    }
}

/// Check every Texture2D and TextAsset in the bundle.
///
/// An empty result means the bundle passes.
pub fn verify_bundle(
    bundle: &mut dyn Bundle,
    mut on_asset: impl FnMut(&AssetRecord),
) -> Result<Vec<Issue>, BundleError> {
    let records: Vec<AssetRecord> = bundle.assets().to_vec();
    let mut issues = Vec::new();

    for record in records {
        on_asset(&record);
        if !matches!(record.kind, AssetKind::Texture2D | AssetKind::TextAsset) {
            continue;
        }

        let label = record
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| record.path_id.to_string());

        if record.kind == AssetKind::Texture2D && record.name.as_deref().unwrap_or("").is_empty()
        {
            issues.push(Issue::UnnamedTexture {
                path_id: record.path_id,
            });
        }

        match bundle.payload(record.path_id) {
            Ok(AssetPayload::Image(img)) if record.kind == AssetKind::Texture2D => {
                if img.width() == 0 || img.height() == 0 {
                    issues.push(Issue::EmptyTexture { name: label });
                }
            }
            Ok(AssetPayload::Text(content)) if record.kind == AssetKind::TextAsset => {
                if content.is_empty() {
                    issues.push(Issue::EmptyTextAsset { name: label });
                }
            }
            Ok(_) => {}
            Err(err) => match record.kind {
                AssetKind::Texture2D => issues.push(Issue::EmptyTexture { name: label }),
                AssetKind::TextAsset => issues.push(Issue::Unreadable {
                    kind: record.kind,
                    name: label,
                    message: err.to_string(),
                }),
                _ => unreachable!("only texture and text kinds are checked"),
            },
        }
    }

    Ok(issues)
}
