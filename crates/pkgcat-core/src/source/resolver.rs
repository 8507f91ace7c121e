//! Source resolver implementation.

use url::Url;

use crate::error::{PackageError, Result};
use crate::git::GitSpec;

use super::spec::{FileSpec, HttpSpec, Source};

/// Resolves source URIs into typed sources.
///
/// Schemes are checked here, so an unsupported protocol is reported when the
/// configuration is read rather than when a fetch is attempted.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceResolver;

impl SourceResolver {
    /// Resolve a single URI.
    ///
    /// Handles:
    /// - `file:///path` -> Source::File
    /// - `http://...` or `https://...` -> Source::Http
    /// - `git://...` -> Source::Git
    pub fn parse(uri: &str) -> Result<Source> {
        let url = Url::parse(uri).map_err(|_| PackageError::UnsupportedScheme {
            uri: uri.to_string(),
        })?;

        match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|_| PackageError::InvalidSource {
                    uri: uri.to_string(),
                    detail: "file URI does not name a local path".to_string(),
                })?;
                Ok(Source::File(FileSpec::new(uri, path)))
            }
            "http" | "https" => Ok(Source::Http(HttpSpec::new(uri))),
            "git" => Ok(Source::Git(GitSpec::new(uri))),
            _ => Err(PackageError::UnsupportedScheme {
                uri: uri.to_string(),
            }),
        }
    }

    /// Resolve every URI, collecting failures instead of stopping at the first.
    ///
    /// Returns the parsed sources in input order together with one error per
    /// rejected URI.
    pub fn parse_all<I, S>(uris: I) -> (Vec<Source>, Vec<PackageError>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sources = Vec::new();
        let mut errors = Vec::new();
        for uri in uris {
            match Self::parse(uri.as_ref()) {
                Ok(source) => sources.push(source),
                Err(err) => errors.push(err),
            }
        }
        (sources, errors)
    }
}
