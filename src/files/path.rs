use std::fmt;
use std::path::{Path, PathBuf};

/// A request path after lexical normalization.
///
/// Holds only plain segments: no empty, `.` or `..` segments survive, so
/// joining it under a root can never climb above that root. Symbolic links
/// below the root are followed by the filesystem as usual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
    trailing_slash: bool,
}

impl RequestPath {
    /// Builds the normalized path for a raw request URI.
    ///
    /// Query and fragment are dropped, a missing leading `/` is implied, and
    /// `.`/`..` segments are resolved without touching the filesystem. `..`
    /// at the top stays at the top. No URI at all means `/`.
    pub fn from_uri(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::root();
        };

        let path = match raw.find(['?', '#']) {
            Some(pos) => &raw[..pos],
            None => raw,
        };

        let mut segments: Vec<String> = Vec::new();
        let mut trailing_slash = false;

        for segment in path.split('/') {
            // A path ending in "/", "/." or "/.." names a directory.
            trailing_slash = matches!(segment, "" | "." | "..");
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                _ => segments.push(segment.to_string()),
            }
        }

        Self {
            trailing_slash: trailing_slash && !segments.is_empty(),
            segments,
        }
    }

    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            trailing_slash: false,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment, or `""` for the root and directory-style paths.
    pub fn file_name(&self) -> &str {
        if self.trailing_slash {
            return "";
        }
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The filesystem location of this path under `root`.
    pub fn under(&self, root: &Path) -> PathBuf {
        let mut full = root.to_path_buf();
        for segment in &self.segments {
            full.push(segment);
        }
        if self.trailing_slash {
            // Pushing an empty component appends the separator.
            full.push("");
        }
        full
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        f.write_str(&self.segments.join("/"))?;
        if self.trailing_slash {
            f.write_str("/")?;
        }
        Ok(())
    }
}
