use std::{
    fmt,
    io::{self, Read},
};

use cbc::cipher::{BlockDecryptMut, KeyIvInit, generic_array::GenericArray};
use tracing::{trace, warn};
use twofish::Twofish;
use zeroize::Zeroizing;

use super::BLOCK_LEN;
use crate::kdf::SYMMETRIC_KEY_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Source still has ciphertext; the last decrypted block is held back
    /// because it may carry padding
    Accumulating,
    /// Source exhausted and padding removed; only buffered plaintext remains
    Draining,
    /// A previous read failed
    Failed(io::ErrorKind),
}

/// Decrypting half of a hybrid stream
///
/// Reads ciphertext in chunks and yields plaintext. The final block is only
/// released once the source reports end of stream and its padding checks
/// out.
pub struct Decryptor<R: Read> {
    inner: R,
    cipher: cbc::Decryptor<Twofish>,
    state: State,
    chunk: Vec<u8>,
    ciphertext: Vec<u8>,
    held: Option<Zeroizing<[u8; BLOCK_LEN]>>,
    plaintext: Zeroizing<Vec<u8>>,
    offset: usize,
}

impl<R: Read> fmt::Debug for Decryptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decryptor")
            .field("cipher", &"[REDACTED]")
            .field("state", &self.state)
            .field("buffered", &self.plaintext.len().saturating_sub(self.offset))
            .finish_non_exhaustive()
    }
}

impl<R: Read> Decryptor<R> {
    pub(super) fn new(
        inner: R,
        key: &[u8; SYMMETRIC_KEY_LEN],
        iv: &[u8; BLOCK_LEN],
        chunk_size: usize,
    ) -> Self {
        let cipher = cbc::Decryptor::<Twofish>::new(
            GenericArray::from_slice(key),
            GenericArray::from_slice(iv),
        );
        Self {
            inner,
            cipher,
            state: State::Accumulating,
            chunk: vec![0u8; chunk_size],
            ciphertext: Vec::with_capacity(chunk_size + BLOCK_LEN),
            held: None,
            plaintext: Zeroizing::new(Vec::with_capacity(chunk_size + BLOCK_LEN)),
            offset: 0,
        }
    }

    /// Hand back the ciphertext source
    ///
    /// Plaintext that was decrypted but not yet read is discarded.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Pull one chunk from the source and decrypt what it completes
    fn refill(&mut self) -> io::Result<()> {
        self.plaintext.clear();
        self.offset = 0;

        let n = loop {
            match self.inner.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
                Err(e) => return Err(e),
            }
        };
        if n == 0 {
            return self.finish_stream();
        }

        self.ciphertext.extend_from_slice(&self.chunk[..n]);
        let full = self.ciphertext.len() - self.ciphertext.len() % BLOCK_LEN;
        if full == 0 {
            return Ok(());
        }

        for block in self.ciphertext[..full].chunks_exact_mut(BLOCK_LEN) {
            self.cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }

        if let Some(held) = self.held.take() {
            self.plaintext.extend_from_slice(held.as_slice());
        }
        let (body, last) = self.ciphertext[..full].split_at(full - BLOCK_LEN);
        self.plaintext.extend_from_slice(body);

        let mut block = Zeroizing::new([0u8; BLOCK_LEN]);
        block.copy_from_slice(last);
        self.held = Some(block);

        // wipe decrypted bytes before they are shifted out
        self.ciphertext[..full].fill(0);
        self.ciphertext.drain(..full);
        Ok(())
    }

    /// Source is exhausted: strip the padding from the held block
    fn finish_stream(&mut self) -> io::Result<()> {
        if !self.ciphertext.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "ciphertext ends inside a block",
            ));
        }
        let Some(block) = self.held.take() else {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream has no final block"));
        };

        let pad = usize::from(block[BLOCK_LEN - 1]);
        if pad == 0 || pad > BLOCK_LEN {
            warn!(pad, "invalid padding on final block");
            return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid padding"));
        }

        self.plaintext.extend_from_slice(&block[..BLOCK_LEN - pad]);
        self.state = State::Draining;
        trace!("decryption stream reached end of ciphertext");
        Ok(())
    }
}

impl<R: Read> Read for Decryptor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.offset < self.plaintext.len() {
                let n = buf.len().min(self.plaintext.len() - self.offset);
                buf[..n].copy_from_slice(&self.plaintext[self.offset..self.offset + n]);
                self.offset += n;
                return Ok(n);
            }

            match self.state {
                State::Accumulating => {
                    if let Err(e) = self.refill() {
                        self.state = State::Failed(e.kind());
                        return Err(e);
                    }
                },
                State::Draining => return Ok(0),
                State::Failed(kind) => {
                    return Err(io::Error::new(kind, "decryption stream already failed"));
                },
            }
        }
    }
}
