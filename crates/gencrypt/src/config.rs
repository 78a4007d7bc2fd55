//! Stream tuning knobs

/// Hard upper bound on the encoded stream header, in bytes
pub const MAX_HEADER_LEN: u32 = 1 << 20;

/// Default size of a single read from the ciphertext source
pub const DEFAULT_READ_CHUNK: usize = 4096;

/// Configuration for encryption and decryption streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Bytes requested from the ciphertext source per refill; zero means the
    /// default
    pub read_chunk_size: usize,
    /// Largest header the decryptor will accept
    ///
    /// Can only tighten [`MAX_HEADER_LEN`], never loosen it.
    pub max_header_len: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { read_chunk_size: DEFAULT_READ_CHUNK, max_header_len: MAX_HEADER_LEN }
    }
}

impl StreamConfig {
    /// Header bound actually enforced
    pub fn effective_max_header_len(&self) -> u32 {
        self.max_header_len.min(MAX_HEADER_LEN)
    }

    /// Read size actually used
    pub fn effective_read_chunk_size(&self) -> usize {
        if self.read_chunk_size == 0 { DEFAULT_READ_CHUNK } else { self.read_chunk_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_limit_cannot_be_loosened() {
        let config = StreamConfig { max_header_len: u32::MAX, ..Default::default() };
        assert_eq!(config.effective_max_header_len(), MAX_HEADER_LEN);

        let config = StreamConfig { max_header_len: 512, ..Default::default() };
        assert_eq!(config.effective_max_header_len(), 512);
    }

    #[test]
    fn zero_chunk_size_falls_back_to_default() {
        let config = StreamConfig { read_chunk_size: 0, ..Default::default() };
        assert_eq!(config.effective_read_chunk_size(), DEFAULT_READ_CHUNK);
    }
}
