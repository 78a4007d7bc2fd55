//! Fuzz target for the decryption stream
//!
//! Feeds hostile ciphertext to a decryptor holding a fixed P-256 key.
//!
//! # Strategy
//!
//! - Raw bytes as the whole stream (length prefix, header, body)
//! - Valid streams with single-byte corruption at arbitrary offsets
//! - Valid streams truncated at arbitrary offsets
//! - Arbitrary read chunk sizes and header limits
//!
//! # Invariants
//!
//! - Never panics, never allocates more than the header bound for a header
//! - Uncorrupted streams decrypt to the original plaintext
//! - Truncation inside the body is always an error
//! - A failed stream keeps failing

#![no_main]

use std::io::{Read, Write};

use arbitrary::Arbitrary;
use gencrypt::{
    decrypt_with_config, encrypt, generate_key_pair, NamedGroup, PrivateKey, PublicKey,
    StreamConfig,
};
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Clone, Arbitrary)]
struct StreamScenario {
    /// How the ciphertext is produced
    source: Source,
    /// Decryptor read size
    read_chunk_size: u16,
    /// Header limit handed to the decryptor
    max_header_len: u32,
    /// Caller buffer size
    read_buf: u8,
}

#[derive(Debug, Clone, Arbitrary)]
enum Source {
    /// Completely attacker-controlled bytes
    Raw(Vec<u8>),
    /// Valid stream, untouched
    Valid { plaintext: Vec<u8>, seed: u64 },
    /// Valid stream with one byte XORed
    Corrupt { plaintext: Vec<u8>, seed: u64, offset: u16, mask: u8 },
    /// Valid stream cut short
    Truncated { plaintext: Vec<u8>, seed: u64, keep: u16 },
}

fn key_pair() -> (PublicKey, PrivateKey) {
    let mut rng = ChaCha20Rng::seed_from_u64(0);
    let Ok(pair) = generate_key_pair(&NamedGroup::FipsP256.id(), &mut rng) else {
        unreachable!("P-256 is always supported");
    };
    pair
}

fn seal(public: &PublicKey, plaintext: &[u8], seed: u64) -> Vec<u8> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut encryptor = encrypt(public, &mut rng, Vec::new()).unwrap();
    encryptor.write_all(plaintext).unwrap();
    encryptor.finish().unwrap()
}

fuzz_target!(|scenario: StreamScenario| {
    let (public, private) = key_pair();

    let (ciphertext, expected, body_truncated) = match &scenario.source {
        Source::Raw(bytes) => (bytes.clone(), None, false),
        Source::Valid { plaintext, seed } => {
            (seal(&public, plaintext, *seed), Some(plaintext.clone()), false)
        },
        Source::Corrupt { plaintext, seed, offset, mask } => {
            let mut bytes = seal(&public, plaintext, *seed);
            let index = usize::from(*offset) % bytes.len();
            bytes[index] ^= mask;
            let expected = (*mask == 0).then(|| plaintext.clone());
            (bytes, expected, false)
        },
        Source::Truncated { plaintext, seed, keep } => {
            let mut bytes = seal(&public, plaintext, *seed);
            let keep = usize::from(*keep) % bytes.len();
            let header_len = bytes.len() - (plaintext.len() / 16 + 1) * 16;
            let cut_in_body = keep > header_len && (keep - header_len) % 16 != 0;
            bytes.truncate(keep);
            (bytes, None, cut_in_body)
        },
    };

    let config = StreamConfig {
        read_chunk_size: usize::from(scenario.read_chunk_size),
        max_header_len: scenario.max_header_len,
    };
    let Ok(mut decryptor) = decrypt_with_config(&private, ciphertext.as_slice(), &config) else {
        return;
    };

    let mut buf = vec![0u8; usize::from(scenario.read_buf).max(1)];
    let mut plaintext = Vec::new();
    let outcome = loop {
        match decryptor.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => plaintext.extend_from_slice(&buf[..n]),
            Err(e) => break Err(e),
        }
    };

    if outcome.is_err() {
        assert!(decryptor.read(&mut buf).is_err(), "failed stream must keep failing");
    }
    if body_truncated {
        assert!(outcome.is_err(), "body truncated mid-block must fail");
    }
    if let Some(expected) = expected {
        assert!(outcome.is_ok());
        assert_eq!(plaintext, expected);
    }
});
