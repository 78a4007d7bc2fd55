//! gencrypt: one key pair for hybrid encryption and signatures
//!
//! A key pair lives in one algebraic group: an RFC 3526 MODP group or an
//! elliptic curve. The same pair encrypts streams (ephemeral Diffie-Hellman
//! into Twofish-256-CBC) and signs messages (Schnorr with a keyed BLAKE2b
//! challenge). Callers supply the RNG; nothing here reads ambient entropy.
//!
//! # Hybrid Stream
//!
//! ```text
//! recipient public key Y          ephemeral secret t
//!        │                               │
//!        └──────────► t·Y ◄──────────────┘
//!                      │
//!                      ▼
//!             BLAKE2b-256 → Twofish key
//!                      │
//!                      ▼
//! [len][ephemeral T][iv][CBC blocks ... padded final block]
//! ```
//!
//! # Signatures
//!
//! ```text
//! k = nonce            K = k·G              e = BLAKE2b-512-MAC(K, message)
//! sig = k - x·e        verify: BLAKE2b-512-MAC(sig·G + e·Y, message) == e
//! ```
//!
//! # Security
//!
//! Confidentiality only:
//! - Streams carry no authentication tag; a modified ciphertext decrypts to
//!   modified plaintext or fails padding
//! - Sign the plaintext (or the ciphertext) when integrity matters
//!
//! Input validation:
//! - Peer and public keys are checked for group membership before use
//! - Stream headers are length-bounded before any allocation
//! - Signature comparison is constant time

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
pub mod config;
pub mod encryption;
pub mod error;
pub mod group;
mod kdf;
pub mod keys;
mod random;
pub mod signature;

pub use config::{MAX_HEADER_LEN, StreamConfig};
pub use encryption::{
    BLOCK_LEN, Decryptor, Encryptor, StreamHeader, decrypt, decrypt_with_config, encrypt,
    encrypt_with_config,
};
pub use error::{CryptoError, Result};
pub use group::{Backend, Family, NamedGroup, ObjectId, Registry};
pub use keys::{PrivateKey, PublicKey, generate_key_pair};
pub use signature::{Signature, Signer, Verifier, sign, sign_message, verify, verify_message};
