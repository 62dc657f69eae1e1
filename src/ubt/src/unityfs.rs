//! UnityFS archive re-writer.
//!
//! The read/decode side of the tool goes through `unity_rs`, which has no
//! serialization support. Repacking therefore works at the container
//! level: parse the UnityFS envelope from the original bytes, splice new
//! payload bytes over the edited objects inside the serialized file, fix
//! the object table and size fields, and re-emit the archive with the
//! requested block compression. Object payloads themselves are treated as
//! opaque except for the kinds this module can encode (see
//! [`encode_text_asset`]).
//!
//! Supported envelopes: UnityFS versions 6 and 7, serialized file
//! versions 17 through 22, little-endian, LZ4/uncompressed blocks. LZMA
//! archives and big-endian files are rejected with a clear error rather
//! than guessed at.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::bundle::{BundleError, Compression};

const COMPRESSION_MASK: u32 = 0x3f;
const HAS_DIRECTORY_INFO: u32 = 0x40;
const BLOCKS_INFO_AT_END: u32 = 0x80;
const BLOCKS_INFO_PADDED: u32 = 0x200;

const COMPRESSION_NONE: u32 = 0;
const COMPRESSION_LZMA: u32 = 1;
const COMPRESSION_LZ4: u32 = 2;
const COMPRESSION_LZ4HC: u32 = 3;

/// One entry from the archive's node directory.
#[derive(Debug, Clone)]
pub struct Node {
    pub flags: u32,
    pub path: String,
}

/// A parsed UnityFS archive: header fields plus each node's
/// decompressed bytes.
#[derive(Debug)]
pub struct Archive {
    version: u32,
    unity_web_version: String,
    unity_revision: String,
    nodes: Vec<Node>,
    node_data: Vec<Vec<u8>>,
}

impl Archive {
    pub fn parse(data: &[u8]) -> Result<Archive, BundleError> {
        let mut r = Cursor::new(data);

        let signature = read_cstring(&mut r)?;
        if signature != "UnityFS" {
            return Err(BundleError::Parse(format!(
                "not a UnityFS archive (signature '{signature}')"
            )));
        }
        let version = r.read_u32::<BigEndian>()?;
        if !(6..=7).contains(&version) {
            return Err(BundleError::Parse(format!(
                "unsupported UnityFS version {version}"
            )));
        }
        let unity_web_version = read_cstring(&mut r)?;
        let unity_revision = read_cstring(&mut r)?;
        let _size = r.read_i64::<BigEndian>()?;
        let compressed_info_size = r.read_u32::<BigEndian>()? as usize;
        let uncompressed_info_size = r.read_u32::<BigEndian>()? as usize;
        let flags = r.read_u32::<BigEndian>()?;
        if version >= 7 {
            align_stream(&mut r, 16)?;
        }

        let info_bytes = if flags & BLOCKS_INFO_AT_END != 0 {
            if compressed_info_size > data.len() {
                return Err(BundleError::Parse(
                    "blocks info extends past end of archive".into(),
                ));
            }
            data[data.len() - compressed_info_size..].to_vec()
        } else {
            let mut buf = vec![0u8; compressed_info_size];
            r.read_exact(&mut buf)?;
            buf
        };
        let info = decompress(&info_bytes, flags & COMPRESSION_MASK, uncompressed_info_size)?;

        let mut ir = Cursor::new(info.as_slice());
        let mut hash = [0u8; 16];
        ir.read_exact(&mut hash)?;
        let block_count = ir.read_u32::<BigEndian>()? as usize;
        let mut blocks = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            let uncompressed = ir.read_u32::<BigEndian>()? as usize;
            let compressed = ir.read_u32::<BigEndian>()? as usize;
            let block_flags = ir.read_u16::<BigEndian>()?;
            blocks.push((uncompressed, compressed, block_flags));
        }
        let node_count = ir.read_u32::<BigEndian>()? as usize;
        let mut directory = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            let offset = ir.read_i64::<BigEndian>()?;
            let size = ir.read_i64::<BigEndian>()?;
            let node_flags = ir.read_u32::<BigEndian>()?;
            let path = read_cstring(&mut ir)?;
            directory.push((offset as usize, size as usize, node_flags, path));
        }

        if version >= 7 && flags & BLOCKS_INFO_PADDED != 0 {
            align_stream(&mut r, 16)?;
        }

        let total: usize = blocks.iter().map(|b| b.0).sum();
        let mut region = Vec::with_capacity(total);
        for (uncompressed, compressed, block_flags) in blocks {
            let mut buf = vec![0u8; compressed];
            r.read_exact(&mut buf)?;
            let block = decompress(&buf, u32::from(block_flags) & COMPRESSION_MASK, uncompressed)?;
            region.extend_from_slice(&block);
        }

        let mut nodes = Vec::with_capacity(directory.len());
        let mut node_data = Vec::with_capacity(directory.len());
        for (offset, size, node_flags, path) in directory {
            let end = offset
                .checked_add(size)
                .filter(|end| *end <= region.len())
                .ok_or_else(|| {
                    BundleError::Parse(format!("node '{path}' extends past end of archive"))
                })?;
            nodes.push(Node {
                flags: node_flags,
                path,
            });
            node_data.push(region[offset..end].to_vec());
        }

        Ok(Archive {
            version,
            unity_web_version,
            unity_revision,
            nodes,
            node_data,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_data(&self, index: usize) -> &[u8] {
        &self.node_data[index]
    }

    pub fn set_node_data(&mut self, index: usize, data: Vec<u8>) {
        self.node_data[index] = data;
    }

    /// Index of the serialized file node (the first node that is not a
    /// resource stream).
    pub fn serialized_node(&self) -> Result<usize, BundleError> {
        self.nodes
            .iter()
            .position(|n| !n.path.ends_with(".resS") && !n.path.ends_with(".resource"))
            .ok_or_else(|| BundleError::Parse("archive has no serialized file node".into()))
    }

    /// Serialize the archive with the given block compression. Blocks
    /// info is written uncompressed, before the data region.
    pub fn write(&self, compression: Compression) -> Result<Vec<u8>, BundleError> {
        let mut region = Vec::new();
        let mut directory = Vec::with_capacity(self.nodes.len());
        for data in &self.node_data {
            while region.len() % 16 != 0 {
                region.push(0);
            }
            directory.push((region.len() as i64, data.len() as i64));
            region.extend_from_slice(data);
        }

        let (block_flags, block) = match compression {
            Compression::None => (COMPRESSION_NONE as u16, region.clone()),
            Compression::Lz4 => (COMPRESSION_LZ4 as u16, lz4_flex::block::compress(&region)),
        };

        let mut info = Vec::new();
        info.extend_from_slice(&[0u8; 16]);
        info.extend_from_slice(&1u32.to_be_bytes());
        info.extend_from_slice(&(region.len() as u32).to_be_bytes());
        info.extend_from_slice(&(block.len() as u32).to_be_bytes());
        info.extend_from_slice(&block_flags.to_be_bytes());
        info.extend_from_slice(&(self.nodes.len() as u32).to_be_bytes());
        for (node, (offset, size)) in self.nodes.iter().zip(&directory) {
            info.extend_from_slice(&offset.to_be_bytes());
            info.extend_from_slice(&size.to_be_bytes());
            info.extend_from_slice(&node.flags.to_be_bytes());
            info.extend_from_slice(node.path.as_bytes());
            info.push(0);
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"UnityFS\0");
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(self.unity_web_version.as_bytes());
        out.push(0);
        out.extend_from_slice(self.unity_revision.as_bytes());
        out.push(0);
        let size_field = out.len();
        out.extend_from_slice(&0i64.to_be_bytes());
        out.extend_from_slice(&(info.len() as u32).to_be_bytes());
        out.extend_from_slice(&(info.len() as u32).to_be_bytes());
        out.extend_from_slice(&HAS_DIRECTORY_INFO.to_be_bytes());
        if self.version >= 7 {
            while out.len() % 16 != 0 {
                out.push(0);
            }
        }
        out.extend_from_slice(&info);
        out.extend_from_slice(&block);

        let total = out.len() as i64;
        out[size_field..size_field + 8].copy_from_slice(&total.to_be_bytes());
        Ok(out)
    }
}

/// Replace object payloads inside a serialized file.
///
/// The metadata section is kept byte-identical apart from the fixed-size
/// `byte_start` / `byte_size` fields of each object entry; the data
/// region is re-laid-out with the standard 8-byte object alignment.
pub fn patch_serialized(
    data: &[u8],
    replacements: &BTreeMap<i64, Vec<u8>>,
) -> Result<Vec<u8>, BundleError> {
    let mut r = Cursor::new(data);

    let _legacy_metadata_size = r.read_u32::<BigEndian>()?;
    let legacy_file_size = r.read_u32::<BigEndian>()? as usize;
    let version = r.read_u32::<BigEndian>()?;
    let legacy_data_offset = r.read_u32::<BigEndian>()? as usize;
    if !(17..=22).contains(&version) {
        return Err(BundleError::Parse(format!(
            "serialized file version {version} is not supported for repacking"
        )));
    }
    let endianness = r.read_u8()?;
    r.seek(SeekFrom::Current(3))?;
    if endianness != 0 {
        return Err(BundleError::Parse(
            "big-endian serialized files are not supported for repacking".into(),
        ));
    }

    let (data_offset, file_size_field, file_size) = if version >= 22 {
        let _metadata_size = r.read_u32::<BigEndian>()?;
        let file_size_field = r.position() as usize;
        let file_size = r.read_i64::<BigEndian>()? as usize;
        let data_offset = r.read_i64::<BigEndian>()? as usize;
        let _unknown = r.read_i64::<BigEndian>()?;
        (data_offset, file_size_field, file_size)
    } else {
        (legacy_data_offset, 4, legacy_file_size)
    };
    if data_offset > data.len() || file_size > data.len() {
        return Err(BundleError::Parse(
            "serialized file header sizes are inconsistent".into(),
        ));
    }

    // Metadata proper is little-endian from here on.
    let _unity_version = read_cstring(&mut r)?;
    let _target_platform = r.read_u32::<LittleEndian>()?;
    let type_tree_enabled = r.read_u8()? != 0;
    let type_count = r.read_u32::<LittleEndian>()? as usize;
    for _ in 0..type_count {
        skip_type(&mut r, version, type_tree_enabled)?;
    }

    struct Entry {
        path_id: i64,
        byte_start: usize,
        byte_size: usize,
        start_field: usize,
        size_field: usize,
    }

    let object_count = r.read_u32::<LittleEndian>()? as usize;
    let mut entries = Vec::with_capacity(object_count);
    for _ in 0..object_count {
        align_stream(&mut r, 4)?;
        let path_id = r.read_i64::<LittleEndian>()?;
        let start_field = r.position() as usize;
        let byte_start = if version >= 22 {
            r.read_i64::<LittleEndian>()? as usize
        } else {
            r.read_u32::<LittleEndian>()? as usize
        };
        let size_field = r.position() as usize;
        let byte_size = r.read_u32::<LittleEndian>()? as usize;
        let _type_index = r.read_i32::<LittleEndian>()?;
        if data_offset + byte_start + byte_size > data.len() {
            return Err(BundleError::Parse(format!(
                "object {path_id} extends past end of serialized file"
            )));
        }
        entries.push(Entry {
            path_id,
            byte_start,
            byte_size,
            start_field,
            size_field,
        });
    }

    for path_id in replacements.keys() {
        if !entries.iter().any(|e| e.path_id == *path_id) {
            return Err(BundleError::MissingAsset { path_id: *path_id });
        }
    }

    let mut out = data[..data_offset].to_vec();
    let mut region = Vec::new();
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| entries[i].byte_start);
    for index in order {
        let entry = &entries[index];
        while region.len() % 8 != 0 {
            region.push(0);
        }
        let new_start = region.len();
        match replacements.get(&entry.path_id) {
            Some(payload) => region.extend_from_slice(payload),
            None => {
                let start = data_offset + entry.byte_start;
                region.extend_from_slice(&data[start..start + entry.byte_size]);
            }
        }
        let new_size = region.len() - new_start;
        if version >= 22 {
            patch_i64_le(&mut out, entry.start_field, new_start as i64);
        } else {
            patch_u32_le(&mut out, entry.start_field, new_start as u32);
        }
        patch_u32_le(&mut out, entry.size_field, new_size as u32);
    }

    let total = data_offset + region.len();
    if version >= 22 {
        patch_i64_be(&mut out, file_size_field, total as i64);
    } else {
        patch_u32_be(&mut out, file_size_field, total as u32);
    }
    out.extend_from_slice(&region);
    Ok(out)
}

/// Build a TextAsset payload (`m_Name` + `m_Script`, 2017+ layout).
pub fn encode_text_asset(name: &str, script: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + name.len() + script.len());
    out.extend_from_slice(&(name.len() as u32).to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    while out.len() % 4 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&(script.len() as u32).to_le_bytes());
    out.extend_from_slice(script);
    out
}

/// Splice `replacements` (path_id to payload bytes) into a bundle and
/// re-emit it with the requested compression.
pub fn repack_archive(
    raw: &[u8],
    replacements: &BTreeMap<i64, Vec<u8>>,
    compression: Compression,
) -> Result<Vec<u8>, BundleError> {
    let mut archive = Archive::parse(raw)?;
    if !replacements.is_empty() {
        let index = archive.serialized_node()?;
        let patched = patch_serialized(archive.node_data(index), replacements)?;
        archive.set_node_data(index, patched);
    }
    archive.write(compression)
}

fn skip_type(
    r: &mut Cursor<&[u8]>,
    version: u32,
    type_tree_enabled: bool,
) -> Result<(), BundleError> {
    let class_id = r.read_i32::<LittleEndian>()?;
    let _is_stripped = r.read_u8()?;
    let _script_type_index = r.read_i16::<LittleEndian>()?;
    if class_id == 114 {
        r.seek(SeekFrom::Current(16))?;
    }
    r.seek(SeekFrom::Current(16))?;
    if type_tree_enabled {
        let node_count = r.read_u32::<LittleEndian>()? as i64;
        let string_buffer_size = r.read_u32::<LittleEndian>()? as i64;
        let node_size = if version >= 19 { 32 } else { 24 };
        r.seek(SeekFrom::Current(node_count * node_size + string_buffer_size))?;
        if version >= 21 {
            let dependency_count = r.read_u32::<LittleEndian>()? as i64;
            r.seek(SeekFrom::Current(dependency_count * 4))?;
        }
    }
    Ok(())
}

fn decompress(data: &[u8], mode: u32, uncompressed_size: usize) -> Result<Vec<u8>, BundleError> {
    match mode {
        COMPRESSION_NONE => Ok(data.to_vec()),
        COMPRESSION_LZ4 | COMPRESSION_LZ4HC => {
            lz4_flex::block::decompress(data, uncompressed_size)
                .map_err(|e| BundleError::Parse(format!("LZ4 block decompression failed: {e}")))
        }
        COMPRESSION_LZMA => Err(BundleError::Parse(
            "LZMA-compressed archives are not supported for repacking".into(),
        )),
        other => Err(BundleError::Parse(format!(
            "unknown block compression mode {other}"
        ))),
    }
}

fn read_cstring<T: AsRef<[u8]>>(r: &mut Cursor<T>) -> Result<String, BundleError> {
    let mut bytes = Vec::new();
    loop {
        let byte = r.read_u8()?;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
    }
    String::from_utf8(bytes).map_err(|_| BundleError::Parse("invalid string in archive".into()))
}

fn align_stream<T: AsRef<[u8]>>(r: &mut Cursor<T>, alignment: u64) -> Result<(), BundleError> {
    let position = r.position();
    let padding = (alignment - position % alignment) % alignment;
    r.seek(SeekFrom::Current(padding as i64))?;
    Ok(())
}

fn patch_u32_le(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn patch_i64_le(buf: &mut [u8], at: usize, value: i64) {
    buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

fn patch_u32_be(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
}

fn patch_i64_be(buf: &mut [u8], at: usize, value: i64) {
    buf[at..at + 8].copy_from_slice(&value.to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal version-17 serialized file with two TextAsset-shaped
    // objects and type trees disabled.
    fn serialized_fixture(payloads: &[(i64, &[u8])]) -> Vec<u8> {
        let mut metadata = Vec::new();
        metadata.extend_from_slice(b"2017.4.40f1\0");
        metadata.extend_from_slice(&5u32.to_le_bytes()); // target platform
        metadata.push(0); // type trees disabled
        metadata.extend_from_slice(&1u32.to_le_bytes()); // one type
        metadata.extend_from_slice(&49i32.to_le_bytes()); // TextAsset
        metadata.push(0); // not stripped
        metadata.extend_from_slice(&(-1i16).to_le_bytes());
        metadata.extend_from_slice(&[0u8; 16]); // old type hash

        let header_size = 20; // 4 x u32 + endianness + reserved
        let mut region = Vec::new();
        let mut table = Vec::new();
        for (path_id, payload) in payloads {
            while region.len() % 8 != 0 {
                region.push(0);
            }
            table.push((*path_id, region.len() as u32, payload.len() as u32));
            region.extend_from_slice(payload);
        }

        metadata.extend_from_slice(&(payloads.len() as u32).to_le_bytes());
        for (path_id, start, size) in table {
            while (header_size + metadata.len()) % 4 != 0 {
                metadata.push(0);
            }
            metadata.extend_from_slice(&path_id.to_le_bytes());
            metadata.extend_from_slice(&start.to_le_bytes());
            metadata.extend_from_slice(&size.to_le_bytes());
            metadata.extend_from_slice(&0i32.to_le_bytes()); // type index
        }

        let mut data_offset = header_size + metadata.len();
        while data_offset % 16 != 0 {
            data_offset += 1;
        }
        let file_size = data_offset + region.len();

        let mut out = Vec::new();
        out.extend_from_slice(&(metadata.len() as u32).to_be_bytes());
        out.extend_from_slice(&(file_size as u32).to_be_bytes());
        out.extend_from_slice(&17u32.to_be_bytes());
        out.extend_from_slice(&(data_offset as u32).to_be_bytes());
        out.push(0); // little-endian
        out.extend_from_slice(&[0u8; 3]);
        out.extend_from_slice(&metadata);
        out.resize(data_offset, 0);
        out.extend_from_slice(&region);
        out
    }

    fn archive_fixture(serialized: &[u8]) -> Vec<u8> {
        let archive = Archive {
            version: 6,
            unity_web_version: "5.x.x".to_string(),
            unity_revision: "2017.4.40f1".to_string(),
            nodes: vec![Node {
                flags: 4,
                path: "CAB-test".to_string(),
            }],
            node_data: vec![serialized.to_vec()],
        };
        archive.write(Compression::None).unwrap()
    }

    #[test]
    fn test_text_asset_payload_layout() {
        let payload = encode_text_asset("notes", b"hello");
        // 5-byte name padded to 8, then length-prefixed script
        assert_eq!(&payload[0..4], &5u32.to_le_bytes());
        assert_eq!(&payload[4..9], b"notes");
        assert_eq!(&payload[9..12], &[0, 0, 0]);
        assert_eq!(&payload[12..16], &5u32.to_le_bytes());
        assert_eq!(&payload[16..], b"hello");
    }

    #[test]
    fn test_patch_replaces_payload_and_fixes_table() {
        let original = serialized_fixture(&[(101, b"first!"), (202, b"second payload")]);
        let mut replacements = BTreeMap::new();
        replacements.insert(101i64, b"a much longer replacement payload".to_vec());

        let patched = patch_serialized(&original, &replacements).unwrap();

        // The patched file still parses, table entries now describe the
        // new layout, and the untouched object survives verbatim.
        let reparsed = patch_serialized(&patched, &BTreeMap::new()).unwrap();
        assert_eq!(reparsed, patched);
        assert!(patched
            .windows(b"a much longer replacement payload".len())
            .any(|w| w == b"a much longer replacement payload"));
        assert!(patched
            .windows(b"second payload".len())
            .any(|w| w == b"second payload"));
        assert!(!patched.windows(6).any(|w| w == b"first!"));

        // file_size header field (big-endian u32 at offset 4) matches.
        let file_size = u32::from_be_bytes(patched[4..8].try_into().unwrap()) as usize;
        assert_eq!(file_size, patched.len());
    }

    #[test]
    fn test_patch_unknown_path_id() {
        let original = serialized_fixture(&[(101, b"first!")]);
        let mut replacements = BTreeMap::new();
        replacements.insert(999i64, b"x".to_vec());
        let err = patch_serialized(&original, &replacements).unwrap_err();
        assert!(matches!(err, BundleError::MissingAsset { path_id: 999 }));
    }

    #[test]
    fn test_patch_rejects_unknown_serialized_version() {
        let mut original = serialized_fixture(&[(101, b"first!")]);
        original[8..12].copy_from_slice(&9u32.to_be_bytes());
        let err = patch_serialized(&original, &BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("version 9"));
    }

    #[test]
    fn test_archive_round_trip_uncompressed() {
        let serialized = serialized_fixture(&[(7, b"payload")]);
        let raw = archive_fixture(&serialized);

        let archive = Archive::parse(&raw).unwrap();
        assert_eq!(archive.nodes().len(), 1);
        assert_eq!(archive.nodes()[0].path, "CAB-test");
        assert_eq!(archive.node_data(0), serialized.as_slice());
    }

    #[test]
    fn test_archive_round_trip_lz4() {
        let serialized = serialized_fixture(&[(7, b"payload payload payload payload")]);
        let archive = Archive {
            version: 6,
            unity_web_version: "5.x.x".to_string(),
            unity_revision: "2017.4.40f1".to_string(),
            nodes: vec![Node {
                flags: 4,
                path: "CAB-test".to_string(),
            }],
            node_data: vec![serialized.clone()],
        };
        let raw = archive.write(Compression::Lz4).unwrap();
        let reparsed = Archive::parse(&raw).unwrap();
        assert_eq!(reparsed.node_data(0), serialized.as_slice());
    }

    #[test]
    fn test_repack_archive_end_to_end() {
        let serialized = serialized_fixture(&[(11, b"old text"), (12, b"keep me")]);
        let raw = archive_fixture(&serialized);

        let mut replacements = BTreeMap::new();
        replacements.insert(11i64, encode_text_asset("notes", b"new text"));
        let repacked = repack_archive(&raw, &replacements, Compression::Lz4).unwrap();

        let archive = Archive::parse(&repacked).unwrap();
        let node = archive.node_data(0);
        assert!(node.windows(8).any(|w| w == b"new text"));
        assert!(node.windows(7).any(|w| w == b"keep me"));
        assert!(!node.windows(8).any(|w| w == b"old text"));
    }

    #[test]
    fn test_serialized_node_skips_resource_streams() {
        let archive = Archive {
            version: 6,
            unity_web_version: "5.x.x".to_string(),
            unity_revision: "2017.4.40f1".to_string(),
            nodes: vec![
                Node {
                    flags: 0,
                    path: "CAB-test.resS".to_string(),
                },
                Node {
                    flags: 4,
                    path: "CAB-test".to_string(),
                },
            ],
            node_data: vec![vec![1, 2, 3], vec![4, 5, 6]],
        };
        assert_eq!(archive.serialized_node().unwrap(), 1);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let err = Archive::parse(b"UnityWeb\0junk").unwrap_err();
        assert!(err.to_string().contains("UnityWeb"));
    }

    #[test]
    fn test_rejects_lzma_blocks() {
        let serialized = serialized_fixture(&[(7, b"payload")]);
        let mut raw = archive_fixture(&serialized);
        // Flip the header compression bits to LZMA.
        let flags_at = raw
            .windows(4)
            .position(|w| w == HAS_DIRECTORY_INFO.to_be_bytes())
            .unwrap();
        raw[flags_at..flags_at + 4]
            .copy_from_slice(&(HAS_DIRECTORY_INFO | COMPRESSION_LZMA).to_be_bytes());
        let err = Archive::parse(&raw).unwrap_err();
        assert!(err.to_string().contains("LZMA"));
    }
}
