//! In-memory `Bundle` implementation for handler tests.

use std::collections::{BTreeSet, HashMap};

use image::RgbaImage;

use crate::bundle::{
    AssetPayload, AssetRecord, AssetReplacement, Bundle, BundleError, Compression,
};
use crate::kind::AssetKind;

/// Fake engine: fixed records, canned payloads, and a record of every
/// mutation the handlers asked for.
#[derive(Default)]
pub struct FakeBundle {
    records: Vec<AssetRecord>,
    payloads: HashMap<i64, AssetPayload>,
    pub replaced: Vec<(i64, AssetReplacement)>,
    pub pack_calls: Vec<Compression>,
    pub packed_bytes: Vec<u8>,
    unreplaceable: BTreeSet<AssetKind>,
}

impl FakeBundle {
    pub fn new() -> Self {
        FakeBundle {
            packed_bytes: b"PACKED".to_vec(),
            ..FakeBundle::default()
        }
    }

    pub fn with_asset(
        mut self,
        path_id: i64,
        kind: AssetKind,
        name: Option<&str>,
        payload: Option<AssetPayload>,
    ) -> Self {
        self.records.push(AssetRecord {
            path_id,
            kind,
            name: name.map(str::to_string),
        });
        if let Some(payload) = payload {
            self.payloads.insert(path_id, payload);
        }
        self
    }

    /// Mark a kind as one this engine cannot re-encode.
    pub fn without_replacement(mut self, kind: AssetKind) -> Self {
        self.unreplaceable.insert(kind);
        self
    }

    /// Solid-color test image.
    pub fn image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
    }
}

impl Bundle for FakeBundle {
    fn assets(&self) -> &[AssetRecord] {
        &self.records
    }

    fn payload(&mut self, path_id: i64) -> Result<AssetPayload, BundleError> {
        let record = self
            .records
            .iter()
            .find(|r| r.path_id == path_id)
            .ok_or(BundleError::MissingAsset { path_id })?;
        self.payloads
            .get(&path_id)
            .cloned()
            .ok_or(BundleError::NoPayload {
                kind: record.kind,
                path_id,
            })
    }

    fn replace(
        &mut self,
        path_id: i64,
        replacement: AssetReplacement,
    ) -> Result<(), BundleError> {
        let record = self
            .records
            .iter()
            .find(|r| r.path_id == path_id)
            .ok_or(BundleError::MissingAsset { path_id })?;
        if self.unreplaceable.contains(&record.kind) {
            return Err(BundleError::UnsupportedEncode { kind: record.kind });
        }
        self.replaced.push((path_id, replacement));
        Ok(())
    }

    fn supports_replacement(&self, kind: AssetKind) -> bool {
        kind.supports_reimport() && !self.unreplaceable.contains(&kind)
    }

    fn pack(&mut self, compression: Compression) -> Result<Vec<u8>, BundleError> {
        self.pack_calls.push(compression);
        Ok(self.packed_bytes.clone())
    }

    fn unity_version(&self) -> Option<&str> {
        None
    }
}
