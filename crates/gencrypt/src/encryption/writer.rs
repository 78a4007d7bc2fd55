use std::{
    fmt,
    io::{self, Write},
};

use cbc::cipher::{BlockEncryptMut, KeyIvInit, generic_array::GenericArray};
use tracing::trace;
use twofish::Twofish;
use zeroize::Zeroizing;

use super::BLOCK_LEN;
use crate::kdf::SYMMETRIC_KEY_LEN;

/// Encrypting half of a hybrid stream
///
/// Buffers at most one partial block of plaintext. Call
/// [`Encryptor::finish`] to pad and write the final block; dropping the
/// encryptor instead leaves the stream without its final block, which the
/// decryptor reports as truncated.
///
/// After any write error the stream is unusable.
pub struct Encryptor<W: Write> {
    inner: W,
    cipher: cbc::Encryptor<Twofish>,
    pending: Zeroizing<Vec<u8>>,
    plaintext_len: u64,
}

impl<W: Write> Encryptor<W> {
    pub(super) fn new(inner: W, key: &[u8; SYMMETRIC_KEY_LEN], iv: &[u8; BLOCK_LEN]) -> Self {
        let cipher = cbc::Encryptor::<Twofish>::new(
            GenericArray::from_slice(key),
            GenericArray::from_slice(iv),
        );
        Self {
            inner,
            cipher,
            pending: Zeroizing::new(Vec::with_capacity(BLOCK_LEN)),
            plaintext_len: 0,
        }
    }

    /// Pad, write the final block, flush, and hand back the destination
    pub fn finish(mut self) -> io::Result<W> {
        let pad = BLOCK_LEN - self.pending.len() % BLOCK_LEN;
        // pad is 1..=16, always fits a byte
        let padded_len = self.pending.len() + pad;
        self.pending.resize(padded_len, pad as u8);
        self.encrypt_pending()?;
        self.inner.flush()?;

        trace!(plaintext_len = self.plaintext_len, "finished encryption stream");
        Ok(self.inner)
    }

    /// Encrypt and write every whole block in `pending`
    fn encrypt_pending(&mut self) -> io::Result<()> {
        let full = self.pending.len() - self.pending.len() % BLOCK_LEN;
        if full == 0 {
            return Ok(());
        }

        for block in self.pending[..full].chunks_exact_mut(BLOCK_LEN) {
            self.cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        self.inner.write_all(&self.pending[..full])?;
        self.pending.drain(..full);
        Ok(())
    }
}

impl<W: Write> fmt::Debug for Encryptor<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encryptor")
            .field("cipher", &"[REDACTED]")
            .field("pending_len", &self.pending.len())
            .field("plaintext_len", &self.plaintext_len)
            .finish_non_exhaustive()
    }
}

impl<W: Write> Write for Encryptor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.plaintext_len += buf.len() as u64;
        self.encrypt_pending()?;
        Ok(buf.len())
    }

    /// Flushes the destination; a trailing partial block stays buffered
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
