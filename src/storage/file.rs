//! File access for document locations
//!
//! Locations are URIs. Only `file://` URIs and plain paths are supported by
//! [`LocalFileAccess`]; other transports can be plugged in through
//! [`FileAccess`].

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use fs2::FileExt;
use url::Url;

/// Reads the bytes behind a location URI
pub trait FileAccess: Send + Sync {
    fn read(&self, uri: &str) -> io::Result<Vec<u8>>;
}

/// Reads from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAccess;

impl FileAccess for LocalFileAccess {
    fn read(&self, uri: &str) -> io::Result<Vec<u8>> {
        let path = uri_to_path(uri)?;
        let mut file = File::open(&path)?;

        // Shared lock so a concurrent writer cannot hand us half a document
        file.lock_shared()?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Converts a `file:` URI or plain path into a filesystem path
///
/// URIs are parsed with [`url::Url`], so percent escapes are decoded and
/// `localhost` counts as the local machine. A URI naming another host is
/// rejected; anything not starting with `file:` is taken as a plain path.
pub fn uri_to_path(uri: &str) -> io::Result<PathBuf> {
    let is_file_uri = uri
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("file:"));
    if !is_file_uri {
        return Ok(PathBuf::from(uri));
    }

    let url = Url::parse(uri).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid URI '{}': {}", uri, e))
    })?;
    url.to_file_path().map_err(|()| {
        let location = match url.host_str() {
            Some(host) => format!("host '{}'", host),
            None => "an unsupported location".to_string(),
        };
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("URI '{}' points to {}, not a local file", uri, location),
        )
    })
}
