//! Key pairs
//!
//! A key pair lives in exactly one group, named by its [`ObjectId`]. The
//! same pair serves hybrid encryption and signatures.
//!
//! For MODP groups the public value is `x = g^secret mod p` and `y` is zero.
//! For curves `(x, y)` is the affine point `secret·G`. In both cases `z` is
//! empty; it is reserved for point-compression metadata.

use std::fmt;

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use crate::{
    codec,
    error::{CryptoError, Result},
    group::{Backend, ObjectId, Point, Registry, wipe},
};

/// Public half of a key pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    /// Group the key lives in
    pub group: ObjectId,
    /// MODP public value, or affine x of the curve point
    #[serde(with = "codec::biguint")]
    pub x: BigUint,
    /// Affine y of the curve point, zero for MODP
    #[serde(with = "codec::biguint")]
    pub y: BigUint,
    /// Reserved for point-compression metadata, always empty
    #[serde(with = "serde_bytes")]
    pub z: Vec<u8>,
}

/// Secret half of a key pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKey {
    /// Group the key lives in
    pub group: ObjectId,
    /// Secret exponent or scalar
    #[serde(with = "codec::biguint")]
    pub secret: BigUint,
}

/// Generate a key pair in `group`
///
/// The returned keys carry `group` verbatim.
///
/// # Errors
///
/// - `InvalidGroup`: the tag has no backend
/// - `Random`: the RNG failed
pub fn generate_key_pair<R: RngCore + CryptoRng>(
    group: &ObjectId,
    rng: &mut R,
) -> Result<(PublicKey, PrivateKey)> {
    let (secret, public) = match Registry::global().resolve(group) {
        Backend::Modular(modp) => {
            let (secret, x) = modp.fresh_secret_and_public(rng)?;
            (secret, PublicKey::modp(group, x))
        },
        Backend::Curve(curve) => {
            let (secret, point) = curve.fresh_scalar_and_point(rng)?;
            (secret, PublicKey::curve(group, point))
        },
        Backend::Unsupported => return Err(CryptoError::invalid_group(group)),
    };

    debug!(%group, "generated key pair");
    Ok((public, PrivateKey { group: group.clone(), secret }))
}

impl PublicKey {
    pub(crate) fn modp(group: &ObjectId, x: BigUint) -> Self {
        Self { group: group.clone(), x, y: BigUint::ZERO, z: Vec::new() }
    }

    pub(crate) fn curve(group: &ObjectId, point: Point) -> Self {
        Self { group: group.clone(), x: point.x, y: point.y, z: Vec::new() }
    }

    /// The key as a curve point
    pub fn point(&self) -> Point {
        Point { x: self.x.clone(), y: self.y.clone() }
    }

    /// Check that the key is a valid non-trivial element of its group
    ///
    /// # Errors
    ///
    /// - `InvalidGroup`: the tag has no backend
    /// - `InvalidKey`: the value is out of range or off the curve
    pub fn validate(&self) -> Result<()> {
        match Registry::global().resolve(&self.group) {
            Backend::Modular(modp) => modp.check_element(&self.x),
            Backend::Curve(curve) => curve.check_point(&self.point()),
            Backend::Unsupported => Err(CryptoError::invalid_group(&self.group)),
        }
    }

    /// CBOR encoding, the same one used in stream headers
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::to_cbor(self)
    }

    /// Decode a key produced by [`PublicKey::to_bytes`]
    ///
    /// Only the structure is checked; call [`PublicKey::validate`] before
    /// trusting the value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::from_cbor(bytes)
    }
}

impl PrivateKey {
    /// Recompute the public key
    ///
    /// Returns `None` if the group has no backend.
    pub fn public_key(&self) -> Option<PublicKey> {
        match Registry::global().resolve(&self.group) {
            Backend::Modular(modp) => {
                Some(PublicKey::modp(&self.group, modp.public_from_secret(&self.secret)))
            },
            Backend::Curve(curve) => {
                Some(PublicKey::curve(&self.group, curve.scalar_base_mult(&self.secret)))
            },
            Backend::Unsupported => None,
        }
    }

    /// CBOR encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        codec::to_cbor(self)
    }

    /// Decode a key produced by [`PrivateKey::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::from_cbor(bytes)
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        wipe(&mut self.secret);
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("group", &self.group)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
