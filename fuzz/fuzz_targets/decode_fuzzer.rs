//! Fuzz target for key and signature decoding
//!
//! Decodes attacker-supplied keys and signatures and pushes them through
//! validation, encryption and verification.
//!
//! # Strategy
//!
//! - Raw CBOR bytes as public keys and signatures
//! - Structured keys with arbitrary group tags and coordinates
//! - Structured signatures with arbitrary response and challenge
//!
//! # Invariants
//!
//! - Decoding, validation and group dispatch never panic
//! - A key that fails validation is never accepted for encryption
//! - Forged signatures never verify against a fixed honest key

#![no_main]

use arbitrary::Arbitrary;
use gencrypt::{
    encrypt, generate_key_pair, verify_message, CryptoError, NamedGroup, ObjectId, PublicKey,
    Signature,
};
use libfuzzer_sys::fuzz_target;
use num_bigint::{BigInt, BigUint};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Clone, Arbitrary)]
enum DecodeScenario {
    /// Raw bytes decoded as a public key
    RawKey(Vec<u8>),
    /// Raw bytes decoded as a signature
    RawSignature(Vec<u8>),
    /// Structured public key
    Key { tag: Vec<u32>, x: Vec<u8>, y: Vec<u8> },
    /// Structured signature against an honest P-256 key
    Forgery { sig: Vec<u8>, hash: Vec<u8>, message: Vec<u8> },
}

fn exercise_key(key: &PublicKey) {
    let valid = key.validate();
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let sealed = encrypt(key, &mut rng, Vec::new());

    if matches!(valid, Err(CryptoError::InvalidKey { .. }) | Err(CryptoError::InvalidGroup { .. })) {
        assert!(sealed.is_err(), "encryption accepted a key that fails validation");
    }
}

fuzz_target!(|scenario: DecodeScenario| {
    match scenario {
        DecodeScenario::RawKey(bytes) => {
            if let Ok(key) = PublicKey::from_bytes(&bytes) {
                exercise_key(&key);
            }
        },
        DecodeScenario::RawSignature(bytes) => {
            let _ = Signature::from_bytes(&bytes);
        },
        DecodeScenario::Key { tag, x, y } => {
            let key = PublicKey {
                group: ObjectId::new(tag),
                x: BigUint::from_bytes_be(&x),
                y: BigUint::from_bytes_be(&y),
                z: Vec::new(),
            };
            exercise_key(&key);
        },
        DecodeScenario::Forgery { sig, hash, message } => {
            let mut rng = ChaCha20Rng::seed_from_u64(2);
            let Ok((public, _)) = generate_key_pair(&NamedGroup::FipsP256.id(), &mut rng) else {
                unreachable!("P-256 is always supported");
            };
            let forged = Signature { sig: BigInt::from_signed_bytes_be(&sig), hash };
            assert!(!verify_message(&public, &forged, &message).unwrap());
        },
    }
});
