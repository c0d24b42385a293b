//! File type detection: magic numbers first, file extension as a fallback.

use std::path::Path;

use anyhow::Result;
use infer::{Infer, MatcherType};
use mime_guess::MimeGuess;

/// What kind of file a browser entry is.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileCategory {
    Directory,
    Audio,
    Image,
    Video,
    Other,
}

impl FileCategory {
    pub fn is_playable(self) -> bool {
        self == FileCategory::Audio
    }
}

/// Sniff the content of `path`, falling back to its extension.
pub fn detect_category(path: &Path) -> Result<FileCategory> {
    if let Some(kind) = Infer::new().get_from_path(path)? {
        return Ok(match kind.matcher_type() {
            MatcherType::Audio => FileCategory::Audio,
            MatcherType::Image => FileCategory::Image,
            MatcherType::Video => FileCategory::Video,
            _ => FileCategory::Other,
        });
    }
    Ok(category_from_extension(path))
}

fn category_from_extension(path: &Path) -> FileCategory {
    let mime = MimeGuess::from_path(path).first_or_octet_stream();
    match mime.type_().as_str() {
        "audio" => FileCategory::Audio,
        "image" => FileCategory::Image,
        "video" => FileCategory::Video,
        _ => FileCategory::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn extension_decides_when_content_is_unknown() {
        assert_eq!(category_from_extension(Path::new("a.flac")), FileCategory::Audio);
        assert_eq!(category_from_extension(Path::new("a.png")), FileCategory::Image);
        assert_eq!(category_from_extension(Path::new("notes")), FileCategory::Other);
    }

    #[test]
    fn magic_number_beats_extension() {
        let dir = std::env::temp_dir().join(format!("amberbars-detect-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cover.txt");
        fs::write(&path, b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();

        assert_eq!(detect_category(&path).unwrap(), FileCategory::Image);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(detect_category(Path::new("/no/such/file.mp3")).is_err());
    }
}
