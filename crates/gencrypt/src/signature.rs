//! Schnorr-style signatures with a keyed hash
//!
//! Signing draws a nonce `k`, computes the commitment `K = k·G` (or `g^k`),
//! and keys BLAKE2b-512 with the fixed-width bytes of `K`. The message is
//! streamed into that MAC; its output is the challenge `e`, and the
//! response is `sig = k - x·e`.
//!
//! Verification recomputes `K' = sig·G + e·Y`, which equals `K` for a valid
//! signature, and compares the recomputed MAC with `e` in constant time.
//!
//! The nonce is drawn from `[x·2^512, 2·x·2^512)`. Since `e < 2^512`, the
//! response is always positive.

use std::{
    fmt,
    io::{self, Write},
};

use blake2::{Blake2bMac512, digest::Mac};
use num_bigint::{BigInt, BigUint};
use num_traits::{CheckedSub, Zero};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use crate::{
    codec,
    error::{CryptoError, Result},
    group::{Backend, Registry, SecretInt, reduce_signed},
    kdf,
    keys::{PrivateKey, PublicKey},
    random,
};

/// Bit shift applied to the secret to form the nonce range
const NONCE_SHIFT: u32 = 512;

/// A signature: response `sig` and challenge `hash`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Response `k - x·e`
    #[serde(with = "codec::bigint")]
    pub sig: BigInt,
    /// Challenge, the 64-byte keyed hash of the message
    #[serde(with = "serde_bytes")]
    pub hash: Vec<u8>,
}

impl Signature {
    /// CBOR encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::to_cbor(self)
    }

    /// Decode a signature produced by [`Signature::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::from_cbor(bytes)
    }
}

/// Message sink that produces a [`Signature`]
///
/// The nonce and the copy of the secret are wiped when the signer is
/// dropped.
pub struct Signer {
    mac: Blake2bMac512,
    nonce: SecretInt,
    secret: SecretInt,
}

/// Start signing with `key`
///
/// Write the message into the returned [`Signer`], then call
/// [`Signer::sign`].
///
/// # Errors
///
/// - `InvalidGroup`: the key's group has no backend
/// - `InvalidKey`: the secret is zero
/// - `Random`: the RNG failed
pub fn sign<R: RngCore + CryptoRng>(key: &PrivateKey, rng: &mut R) -> Result<Signer> {
    let backend = Registry::global().resolve(&key.group);
    if matches!(backend, Backend::Unsupported) {
        return Err(CryptoError::invalid_group(&key.group));
    }
    if key.secret.is_zero() {
        return Err(CryptoError::invalid_key("zero secret cannot sign"));
    }

    let offset = SecretInt::new(&key.secret << NONCE_SHIFT);
    let nonce = SecretInt::new(random::below(rng, &offset)? + &*offset);

    let commitment = match backend {
        Backend::Modular(modp) => {
            kdf::element_bytes(&modp.public_from_secret(&nonce), modp.element_len())
        },
        Backend::Curve(curve) => {
            kdf::point_bytes(&curve.scalar_base_mult(&nonce), curve.field_len())
        },
        Backend::Unsupported => return Err(CryptoError::invalid_group(&key.group)),
    };

    debug!(group = %key.group, "started signature");
    Ok(Signer {
        mac: kdf::keyed_hasher(&commitment),
        nonce,
        secret: SecretInt::new(key.secret.clone()),
    })
}

impl Signer {
    /// Finish the message and produce the signature
    pub fn sign(self) -> Signature {
        let hash = Zeroizing::new(self.mac.finalize().into_bytes().to_vec());
        let challenge = BigUint::from_bytes_be(&hash);
        let product = SecretInt::new(&*self.secret * &challenge);
        // k >= x·2^512 > x·e since e < 2^512
        let Some(response) = self.nonce.checked_sub(&*product) else {
            unreachable!("nonce exceeds x·e");
        };
        Signature { sig: BigInt::from(response), hash: hash.to_vec() }
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("nonce", &"[REDACTED]").finish_non_exhaustive()
    }
}

impl Write for Signer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Mac::update(&mut self.mac, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Message sink that checks a [`Signature`]
pub struct Verifier {
    mac: Blake2bMac512,
    expected: Vec<u8>,
}

/// Start verifying `signature` against `key`
///
/// Write the message into the returned [`Verifier`], then call
/// [`Verifier::verify`]. A malformed signature is not an error here; it
/// simply fails verification.
///
/// # Errors
///
/// - `InvalidGroup`: the key's group has no backend
/// - `InvalidKey`: the public key is not a valid non-trivial group element
pub fn verify(key: &PublicKey, signature: &Signature) -> Result<Verifier> {
    let challenge = BigUint::from_bytes_be(&signature.hash);

    let commitment = match Registry::global().resolve(&key.group) {
        Backend::Modular(modp) => {
            modp.check_element(&key.x)?;
            let (generator, modulus) = modp.params();
            let gs = modp.exp_signed(generator, &signature.sig);
            let ye = modp.exp(&key.x, &challenge);
            kdf::element_bytes(&((gs * ye) % modulus), modp.element_len())
        },
        Backend::Curve(curve) => {
            let public = key.point();
            curve.check_point(&public)?;
            let gs = curve.scalar_base_mult(&reduce_signed(&signature.sig, curve.order()));
            let ye = curve.scalar_mult(&public, &challenge)?;
            kdf::point_bytes(&curve.add(&gs, &ye)?, curve.field_len())
        },
        Backend::Unsupported => return Err(CryptoError::invalid_group(&key.group)),
    };

    Ok(Verifier { mac: kdf::keyed_hasher(&commitment), expected: signature.hash.clone() })
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier").field("expected_len", &self.expected.len()).finish_non_exhaustive()
    }
}

impl Verifier {
    /// Finish the message and check the signature
    pub fn verify(self) -> bool {
        let computed = self.mac.finalize().into_bytes();
        computed.as_slice().ct_eq(&self.expected).into()
    }
}

impl Write for Verifier {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Mac::update(&mut self.mac, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sign an in-memory message
pub fn sign_message<R: RngCore + CryptoRng>(
    key: &PrivateKey,
    rng: &mut R,
    message: &[u8],
) -> Result<Signature> {
    let mut signer = sign(key, rng)?;
    signer.write_all(message)?;
    Ok(signer.sign())
}

/// Verify an in-memory message
pub fn verify_message(key: &PublicKey, signature: &Signature, message: &[u8]) -> Result<bool> {
    let mut verifier = verify(key, signature)?;
    verifier.write_all(message)?;
    Ok(verifier.verify())
}
