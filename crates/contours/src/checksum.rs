//! Checksum: a BLAKE3 digest of a written artifact, truncated to 128 bits
//! (32 hex chars), logged so a dataset can be verified later.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Files are hashed in chunks of this many bytes.
const CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    pub fn from_data(data: &[u8]) -> Self {
        Self::from_hasher(blake3::Hasher::new().update(data))
    }

    /// Hash everything `reader` yields, one chunk at a time.
    pub fn from_reader<R: Read>(reader: R) -> io::Result<Self> {
        let mut hasher = blake3::Hasher::new();
        io::copy(&mut BufReader::with_capacity(CHUNK_SIZE, reader), &mut hasher)?;
        Ok(Self::from_hasher(&hasher))
    }

    pub fn of_file(path: &Path) -> io::Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    fn from_hasher(hasher: &blake3::Hasher) -> Self {
        let hash = hasher.finalize();
        Self(hex::encode(&hash.as_bytes()[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
