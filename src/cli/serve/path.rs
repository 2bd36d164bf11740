//! Request target parsing and URL to filesystem path resolution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use url::Url;

static BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("http://localhost/").unwrap());

/// Decoded path segments and query pairs of a request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Target {
    /// Parse a raw request target such as `/icons/My%20Folder?mode=dark`.
    ///
    /// Empty segments are dropped, so trailing slashes do not matter.
    pub fn parse(raw: &str) -> Option<Self> {
        let url = BASE.join(raw).ok()?;
        let segments = url
            .path_segments()?
            .filter(|s| !s.is_empty())
            .map(|s| {
                percent_decode_str(s)
                    .decode_utf8()
                    .map(Cow::into_owned)
                    .ok()
            })
            .collect::<Option<Vec<_>>>()?;
        let query = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Some(Self { segments, query })
    }

    /// First value of a query parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn segments(&self) -> Vec<&str> {
        self.segments.iter().map(String::as_str).collect()
    }
}

/// Resolve URL segments below `serve_root` to an existing file.
pub fn resolve_path(segments: &[&str], serve_root: &Path) -> Option<PathBuf> {
    // Reject paths with suspicious patterns early
    if segments
        .iter()
        .any(|s| s.contains("..") || s.contains(['\\', '\0']))
    {
        return None;
    }

    let local = segments
        .iter()
        .fold(serve_root.to_path_buf(), |path, s| path.join(s));

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    canonical.is_file().then_some(canonical)
}
