#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use gpto_core::{CollisionPolicy, OrganizeOptions};

pub fn write(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

pub fn set_mtime(path: &Path, unix_seconds: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(unix_seconds, 0)).unwrap();
}

pub fn options(input: &Path, output: &Path) -> OrganizeOptions {
    OrganizeOptions {
        input_root: input.to_path_buf(),
        output_root: output.to_path_buf(),
        collision: CollisionPolicy::Skip,
    }
}

/// Every file under `root`, relative and with `/` separators, sorted.
pub fn tree(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    out.sort();
    out
}

pub fn mtime(path: &PathBuf) -> i64 {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap()).unix_seconds()
}

pub const DATE_TIME: u16 = 0x0132;
pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const DATE_TIME_DIGITIZED: u16 = 0x9004;

fn ifd(entries: &[(u16, &str)], extra: Option<(u16, u32)>, offset: u32) -> Vec<u8> {
    let count = entries.len() + extra.map_or(0, |_| 1);
    let mut data_at = offset + 2 + 12 * count as u32 + 4;
    let mut table = Vec::new();
    let mut data = Vec::new();
    table.extend_from_slice(&(count as u16).to_le_bytes());
    for (tag, value) in entries {
        let mut ascii = value.as_bytes().to_vec();
        ascii.push(0);
        table.extend_from_slice(&tag.to_le_bytes());
        table.extend_from_slice(&2u16.to_le_bytes());
        table.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
        if ascii.len() <= 4 {
            ascii.resize(4, 0);
            table.extend_from_slice(&ascii);
        } else {
            table.extend_from_slice(&data_at.to_le_bytes());
            data_at += ascii.len() as u32;
            data.extend_from_slice(&ascii);
        }
    }
    if let Some((tag, pointer)) = extra {
        table.extend_from_slice(&tag.to_le_bytes());
        table.extend_from_slice(&4u16.to_le_bytes());
        table.extend_from_slice(&1u32.to_le_bytes());
        table.extend_from_slice(&pointer.to_le_bytes());
    }
    table.extend_from_slice(&0u32.to_le_bytes());
    table.extend_from_slice(&data);
    table
}

/// Minimal JPEG whose only content is an EXIF APP1 segment with ASCII tags
/// in IFD0 and in the Exif sub-IFD. Tags within each list must ascend.
pub fn jpeg_with_exif(ifd0: &[(u16, &str)], exif_ifd: &[(u16, &str)]) -> Vec<u8> {
    let mut tiff = b"II\x2a\x00".to_vec();
    tiff.extend_from_slice(&8u32.to_le_bytes());
    if exif_ifd.is_empty() {
        tiff.extend(ifd(ifd0, None, 8));
    } else {
        let ifd0_len = ifd(ifd0, Some((0x8769, 0)), 8).len() as u32;
        let exif_at = 8 + ifd0_len;
        tiff.extend(ifd(ifd0, Some((0x8769, exif_at)), 8));
        tiff.extend(ifd(exif_ifd, None, exif_at));
    }

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&app1);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// Minimal JPEG carrying a single EXIF DateTimeOriginal tag.
pub fn jpeg_with_date_time_original(value: &str) -> Vec<u8> {
    jpeg_with_exif(&[], &[(DATE_TIME_ORIGINAL, value)])
}
