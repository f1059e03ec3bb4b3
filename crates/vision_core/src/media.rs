use std::path::Path;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "avi", "mov", "mkv"];

/// How a dataset file is processed, decided by its (case-insensitive) extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            return MediaKind::Unsupported;
        };
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Unsupported
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, MediaKind::Unsupported)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Unsupported => "unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension_case_insensitively() {
        assert_eq!(MediaKind::from_path(Path::new("a/A_0000.JPG")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("b.webp")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("c.Mkv")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("d.gif")), MediaKind::Unsupported);
        assert_eq!(MediaKind::from_path(Path::new("noext")), MediaKind::Unsupported);
    }
}
