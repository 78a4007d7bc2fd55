//! Turning group elements into key material
//!
//! Shared group elements are serialized at a fixed width and hashed with
//! BLAKE2b, either into a 256-bit cipher key or into the key of a
//! BLAKE2b-512 MAC for signatures.

use blake2::{
    Blake2b, Blake2b512, Blake2bMac512,
    digest::{Digest, Mac, consts::U32, generic_array::GenericArray},
};
use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::group::{Point, write_padded};

/// Length of the symmetric cipher key in bytes
pub(crate) const SYMMETRIC_KEY_LEN: usize = 32;

/// Longest MAC key accepted as is; longer material is hashed down
pub(crate) const MAX_MAC_KEY_LEN: usize = 64;

/// Big-endian bytes of `value`, left-padded to `width`
pub(crate) fn element_bytes(value: &BigUint, width: usize) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(vec![0u8; width]);
    if write_padded(value, &mut out) { out } else { Zeroizing::new(value.to_bytes_be()) }
}

/// `x || y`, each coordinate left-padded to `width`
pub(crate) fn point_bytes(point: &Point, width: usize) -> Zeroizing<Vec<u8>> {
    let mut out = element_bytes(&point.x, width);
    out.extend_from_slice(&element_bytes(&point.y, width));
    out
}

/// Cipher key for the hybrid stream: BLAKE2b-256 of the shared bytes
pub(crate) fn symmetric_key(shared: &[u8]) -> Zeroizing<[u8; SYMMETRIC_KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; SYMMETRIC_KEY_LEN]);
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(shared);
    hasher.finalize_into(GenericArray::from_mut_slice(&mut key[..]));
    key
}

/// Keyed BLAKE2b-512 over the signature key material `K`
///
/// `K` longer than 64 bytes is replaced by its BLAKE2b-512 digest.
pub(crate) fn keyed_hasher(material: &[u8]) -> Blake2bMac512 {
    let mut digest = Zeroizing::new([0u8; MAX_MAC_KEY_LEN]);
    let key = if material.len() > MAX_MAC_KEY_LEN {
        digest.copy_from_slice(&Blake2b512::digest(material));
        digest.as_slice()
    } else {
        material
    };

    let Ok(mac) = <Blake2bMac512 as Mac>::new_from_slice(key) else {
        unreachable!("MAC key is at most 64 bytes");
    };
    mac
}
