//! Stream header
//!
//! Wire layout:
//!
//! ```text
//! [len: u32 big-endian][ephemeral public key: CBOR, len bytes][iv: 16 bytes]
//! ```

use std::io::{Read, Write};

use tracing::warn;

use super::BLOCK_LEN;
use crate::{
    config::MAX_HEADER_LEN,
    error::{CryptoError, Result},
    keys::PublicKey,
};

/// Everything in front of the ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Sender's one-time public key, in the recipient's group
    pub ephemeral: PublicKey,
    /// CBC initialization vector
    pub iv: [u8; BLOCK_LEN],
}

impl StreamHeader {
    /// Write the header
    ///
    /// # Errors
    ///
    /// - `HeaderTooBig`: the encoded key exceeds `max_len` (capped at
    ///   [`MAX_HEADER_LEN`])
    /// - `Io`: the writer failed
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W, max_len: u32) -> Result<()> {
        let encoded = self.ephemeral.to_bytes()?;
        let max = max_len.min(MAX_HEADER_LEN);
        let len = u32::try_from(encoded.len()).unwrap_or(u32::MAX);
        if len > max {
            return Err(CryptoError::HeaderTooBig { len, max });
        }

        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&encoded)?;
        writer.write_all(&self.iv)?;
        Ok(())
    }

    /// Read a header, consuming exactly its bytes from `reader`
    ///
    /// # Errors
    ///
    /// - `HeaderTooBig`: the length prefix exceeds `max_len` (capped at
    ///   [`MAX_HEADER_LEN`])
    /// - `Encoding`: the key bytes are not a valid encoding
    /// - `Io`: the reader failed or ended early
    ///
    /// # Security
    ///
    /// The length prefix is checked before the key buffer is allocated, so a
    /// hostile prefix cannot force a large allocation.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, max_len: u32) -> Result<Self> {
        let mut prefix = [0u8; 4];
        reader.read_exact(&mut prefix)?;

        let len = u32::from_be_bytes(prefix);
        let max = max_len.min(MAX_HEADER_LEN);
        if len > max {
            warn!(len, max, "rejecting oversized stream header");
            return Err(CryptoError::HeaderTooBig { len, max });
        }

        let mut encoded = vec![0u8; len as usize];
        reader.read_exact(&mut encoded)?;

        let mut iv = [0u8; BLOCK_LEN];
        reader.read_exact(&mut iv)?;

        let ephemeral = PublicKey::from_bytes(&encoded)?;
        Ok(Self { ephemeral, iv })
    }
}
