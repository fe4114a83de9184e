/// Content fingerprints for duplicate detection.
///
/// Files are streamed through MD5 in fixed-size blocks so memory use stays
/// flat no matter how large the file is.
use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Size of each read fed into the digest (64 KiB).
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// A 128-bit digest of a file's full content.
///
/// Two files with equal fingerprints are treated as content-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Creates a fingerprint from raw digest bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the digest as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes the fingerprint of everything readable from `reader`.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<Fingerprint> {
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; HASH_BLOCK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Fingerprint(hasher.finalize().into()))
}

/// Computes the fingerprint of the file at `path`.
///
/// Fails when the file cannot be opened or a read fails part way through
/// (permission denied, file removed during the scan, device error).
///
/// # Examples
///
/// ```no_run
/// use tidykit::hasher::hash_file;
/// use std::path::Path;
///
/// let fingerprint = hash_file(Path::new("/path/to/file.bin")).unwrap();
/// println!("{}", fingerprint);
/// ```
pub fn hash_file(path: &Path) -> io::Result<Fingerprint> {
    let file = File::open(path)?;
    hash_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_known_digest() {
        let fp = hash_reader("abc".as_bytes()).unwrap();
        assert_eq!(fp.to_hex(), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_empty_input() {
        let fp = hash_reader(io::empty()).unwrap();
        assert_eq!(fp.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_identical_files_share_fingerprint() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let a = temp_dir.path().join("a.bin");
        let b = temp_dir.path().join("b.bin");
        let c = temp_dir.path().join("c.bin");
        fs::write(&a, "same").unwrap();
        fs::write(&b, "same").unwrap();
        fs::write(&c, "different").unwrap();

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
        assert_ne!(hash_file(&a).unwrap(), hash_file(&c).unwrap());
    }

    #[test]
    fn test_content_spanning_several_blocks() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("big.bin");
        let data: Vec<u8> = (0..HASH_BLOCK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        assert_eq!(hash_file(&path).unwrap(), hash_reader(data.as_slice()).unwrap());
    }

    #[test]
    fn test_missing_file_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = hash_file(&temp_dir.path().join("gone.bin"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
