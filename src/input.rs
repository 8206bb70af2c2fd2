use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

/// Where one batch item comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Local(PathBuf),
    Remote(Url),
}

impl Source {
    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Remote(_))
    }

    /// Marker label: the path as given, or the normalized URL (lowercased
    /// host, percent-encoded, `/` path for a bare host).
    pub fn label(&self) -> String {
        match self {
            Source::Local(path) => path.to_string_lossy().to_string(),
            Source::Remote(url) => url.to_string(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Split a comma-delimited list of paths and URLs.
pub fn parse_identifiers(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `http(s)` scheme and a host made of word characters, `-`, `.` and `:`.
pub fn is_valid_url(text: &str) -> bool {
    let url = match Url::parse(text) {
        Ok(url) => url,
        Err(_) => return false,
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => host
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '[' | ']')),
        _ => false,
    }
}

/// Resolve an identifier to a fetchable source, or `None` when it is neither
/// a valid URL nor an existing file.
pub fn classify(identifier: &str) -> Option<Source> {
    if is_valid_url(identifier) {
        return Url::parse(identifier).ok().map(Source::Remote);
    }
    let path = Path::new(identifier);
    if path.is_file() {
        Some(Source::Local(path.to_path_buf()))
    } else {
        None
    }
}

/// Classify a batch, keeping input order. Returns the sources and the
/// identifiers that could not be classified.
pub fn classify_all<I, S>(identifiers: I) -> (Vec<Source>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sources = Vec::new();
    let mut invalid = Vec::new();
    for identifier in identifiers {
        let identifier = identifier.as_ref();
        match classify(identifier) {
            Some(source) => sources.push(source),
            None => {
                log::warn!("Invalid URL or file path: {}", identifier);
                invalid.push(identifier.to_string());
            }
        }
    }
    (sources, invalid)
}
