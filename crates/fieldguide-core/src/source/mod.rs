//! Image sources: freshly captured photos and gallery picks.
//!
//! Both origins normalize to the same [`ImageReference`], so the
//! classification path is written once. No image content is validated here;
//! unreadable data fails loudly later in the inference service.

pub mod gallery;

pub use gallery::{Gallery, GalleryEntry};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where an image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrigin {
    Capture,
    ExternalPick,
}

/// Immutable locator of the photo to classify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    path: PathBuf,
    origin: ImageOrigin,
}

impl ImageReference {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Opaque handle returned by an image picker: a plain path or a `file://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHandle(String);

impl ContentHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve the handle to a filesystem path.
    pub fn resolve(&self) -> PathBuf {
        match self.0.strip_prefix("file://") {
            Some(rest) => {
                let rest = rest.strip_prefix("localhost").unwrap_or(rest);
                let decoded = percent_decode(rest);
                PathBuf::from(strip_drive_slash(&decoded))
            }
            None => PathBuf::from(&self.0),
        }
    }
}

/// `/C:/Users/...` from a Windows file URI becomes `C:/Users/...`.
fn strip_drive_slash(path: &str) -> &str {
    let bytes = path.as_bytes();
    let is_drive = bytes.len() >= 3
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b':'
        && bytes.get(3).map_or(true, |&b| b == b'/' || b == b'\\');
    if is_drive {
        &path[1..]
    } else {
        path
    }
}

impl From<&Path> for ContentHandle {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

/// Normalizes both image origins into an [`ImageReference`].
pub struct ImageSourceRouter;

impl ImageSourceRouter {
    /// A photo the capture session just wrote to `path`.
    pub fn from_capture(path: impl Into<PathBuf>) -> ImageReference {
        ImageReference {
            path: path.into(),
            origin: ImageOrigin::Capture,
        }
    }

    /// An image the user picked from the gallery.
    pub fn from_external_pick(handle: &ContentHandle) -> ImageReference {
        ImageReference {
            path: handle.resolve(),
            origin: ImageOrigin::ExternalPick,
        }
    }
}

/// Decode `%XX` escapes in a URI path; malformed escapes are kept verbatim.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(b) = decoded {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_origins_share_one_type() {
        let captured = ImageSourceRouter::from_capture("/tmp/buff.jpg");
        let picked = ImageSourceRouter::from_external_pick(&ContentHandle::new("/tmp/buff.jpg"));

        assert_eq!(captured.path(), picked.path());
        assert_eq!(captured.origin(), ImageOrigin::Capture);
        assert_eq!(picked.origin(), ImageOrigin::ExternalPick);
    }

    #[test]
    fn test_file_uri_resolves_to_path() {
        let handle = ContentHandle::new("file:///home/me/Pictures/great%20tit.jpg");
        assert_eq!(
            handle.resolve(),
            PathBuf::from("/home/me/Pictures/great tit.jpg")
        );

        let handle = ContentHandle::new("file://localhost/tmp/owl.png");
        assert_eq!(handle.resolve(), PathBuf::from("/tmp/owl.png"));
    }

    #[test]
    fn test_windows_file_uri_drops_leading_slash() {
        let handle = ContentHandle::new("file:///C:/Users/me/My%20Birds/owl.jpg");
        assert_eq!(handle.resolve(), PathBuf::from("C:/Users/me/My Birds/owl.jpg"));

        let handle = ContentHandle::new("file:///d:/");
        assert_eq!(handle.resolve(), PathBuf::from("d:/"));

        // Only a drive letter qualifies.
        let handle = ContentHandle::new("file:///ab:/x");
        assert_eq!(handle.resolve(), PathBuf::from("/ab:/x"));
    }

    #[test]
    fn test_malformed_escape_kept() {
        assert_eq!(percent_decode("a%zzb%2"), "a%zzb%2");
        assert_eq!(percent_decode("100%25"), "100%");
    }

    #[test]
    fn test_no_validation_on_pick() {
        let reference = ImageSourceRouter::from_external_pick(&ContentHandle::new("not-an-image.txt"));
        assert_eq!(reference.path(), Path::new("not-an-image.txt"));
    }
}
