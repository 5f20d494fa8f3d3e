//! BLAKE3 content signatures for verifying file identity
//!
//! Every mutating operation against a stacks tree re-verifies the signature
//! of the file it is about to touch before acting.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A BLAKE3 content signature (32 bytes)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature([u8; 32]);

impl Signature {
    /// Create a new Signature from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the signature as a byte slice
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        const HEX_CHARS: &[u8] = b"0123456789abcdef";
        let mut hex = String::with_capacity(64);
        for &byte in &self.0 {
            hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
            hex.push(HEX_CHARS[(byte & 0xf) as usize] as char);
        }
        hex
    }

    /// Parse from hex string
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != 64 {
            anyhow::bail!(
                "Invalid hex length: expected 64 characters, got {}",
                hex.len()
            );
        }

        let mut bytes = [0u8; 32];
        for i in 0..32 {
            let high = hex_char_to_nibble(hex.as_bytes()[i * 2])?;
            let low = hex_char_to_nibble(hex.as_bytes()[i * 2 + 1])?;
            bytes[i] = (high << 4) | low;
        }
        Ok(Self(bytes))
    }
}

/// Helper function to convert a hex character to a nibble
fn hex_char_to_nibble(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => anyhow::bail!("Invalid hex character: {}", c as char),
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for Signature {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.to_hex()
    }
}

/// Compute the signature of a byte slice
pub fn signature_of_bytes(data: &[u8]) -> Signature {
    let hash = blake3::hash(data);
    Signature::from_bytes(*hash.as_bytes())
}

/// Compute the signature of a file (streaming for large files)
pub fn signature_of_file(path: &Path) -> Result<Signature> {
    use std::fs::File;
    use std::io::{BufReader, Read};

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = blake3::Hasher::new();

    let mut buffer = [0u8; 8192]; // 8KB buffer
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = hasher.finalize();
    Ok(Signature::from_bytes(*hash.as_bytes()))
}

/// Compute the signature of a file using memory-mapped I/O (for files > 4MB)
pub fn signature_of_file_mmap(path: &Path) -> Result<Signature> {
    use memmap2::Mmap;
    use std::fs::File;

    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let hash = blake3::hash(&mmap);
    Ok(Signature::from_bytes(*hash.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_signature_consistency() {
        let data = b"hello world";
        let sig1 = signature_of_bytes(data);
        let sig2 = signature_of_bytes(data);
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_hex_encoding_roundtrip() {
        let original = Signature::from_bytes([42; 32]);
        let hex = original.to_hex();
        let decoded = Signature::from_hex(&hex).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_hex_encoding_lowercase() {
        let pattern = [0xde, 0xad, 0xbe, 0xef];
        let mut bytes = [0u8; 32];
        for (i, &byte) in pattern.iter().cycle().take(32).enumerate() {
            bytes[i] = byte;
        }
        let sig = Signature::from_bytes(bytes);
        let hex = sig.to_hex();
        assert!(hex.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(hex.len(), 64);
    }

    #[test]
    fn test_hex_decoding_invalid_length() {
        assert!(Signature::from_hex("abc").is_err());
        assert!(Signature::from_hex("").is_err());
        assert!(Signature::from_hex(&"a".repeat(63)).is_err());
    }

    #[test]
    fn test_hex_decoding_invalid_chars() {
        let invalid = "g".repeat(64);
        assert!(Signature::from_hex(&invalid).is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let sig = signature_of_bytes(b"content");
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, format!("\"{}\"", sig.to_hex()));

        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn test_signature_of_file() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let file_path = temp_dir.path().join("test.txt");

        let data = b"test file content";
        std::fs::write(&file_path, data)?;

        let sig_from_file = signature_of_file(&file_path)?;
        let sig_from_bytes = signature_of_bytes(data);

        assert_eq!(sig_from_file, sig_from_bytes);
        Ok(())
    }

    #[test]
    fn test_signature_of_file_mmap() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let file_path = temp_dir.path().join("test.txt");

        let data = b"test file content for mmap";
        std::fs::write(&file_path, data)?;

        let sig_mmap = signature_of_file_mmap(&file_path)?;
        let sig_bytes = signature_of_bytes(data);

        assert_eq!(sig_mmap, sig_bytes);
        Ok(())
    }

    #[test]
    fn test_signature_large_file() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let file_path = temp_dir.path().join("large.bin");

        // Create a 5MB file
        let mut file = std::fs::File::create(&file_path)?;
        let chunk = vec![0xAB; 1024 * 1024]; // 1MB chunk
        for _ in 0..5 {
            file.write_all(&chunk)?;
        }
        drop(file);

        // Both methods should produce same signature
        let sig_streaming = signature_of_file(&file_path)?;
        let sig_mmap = signature_of_file_mmap(&file_path)?;

        assert_eq!(sig_streaming, sig_mmap);
        Ok(())
    }

    #[test]
    fn test_different_data_different_signature() {
        let sig1 = signature_of_bytes(b"hello");
        let sig2 = signature_of_bytes(b"world");
        assert_ne!(sig1, sig2);
    }
}
