//! Algebraic group dispatch
//!
//! Every key carries an [`ObjectId`] naming the group it lives in. The
//! [`Registry`] maps that tag to the arithmetic that implements it: a
//! multiplicative group modulo a safe prime ([`ModpGroup`]) or an elliptic
//! curve ([`CurveBackend`]). Tags the registry cannot serve resolve to
//! [`Backend::Unsupported`], and callers turn that into
//! [`CryptoError::InvalidGroup`](crate::CryptoError::InvalidGroup).
//!
//! Resolution is total and allocation free. The table itself is built once.

pub mod curve;
pub mod modp;

use std::{fmt, ops::Deref, sync::LazyLock};

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

pub use self::{
    curve::{CurveBackend, Point},
    modp::ModpGroup,
};

/// Group identifier: `[family, size, variant?]`
///
/// Two identifiers are equal when they have the same length and the same
/// elements in order. Extra trailing elements are kept verbatim.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Vec<u32>);

impl ObjectId {
    /// Create an identifier from its raw elements
    pub fn new(elements: Vec<u32>) -> Self {
        Self(elements)
    }

    /// Raw elements of the identifier
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Family named by the first element, if recognised
    pub fn family(&self) -> Option<Family> {
        self.0.first().copied().and_then(Family::from_tag)
    }
}

impl From<&[u32]> for ObjectId {
    fn from(elements: &[u32]) -> Self {
        Self(elements.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for ObjectId {
    fn from(elements: [u32; N]) -> Self {
        Self(elements.to_vec())
    }
}

impl From<NamedGroup> for ObjectId {
    fn from(group: NamedGroup) -> Self {
        group.id()
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.0).finish()
    }
}

/// Group family, the first element of an [`ObjectId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// RFC 3526 MODP groups, second element is the RFC group number
    Modp,
    /// NIST FIPS 186 prime curves, second element is the bit size
    EcFips,
    /// SEC 2 Koblitz curves, second element is the bit size
    EcKoblitz,
    /// Brainpool curves, `[4, size, 1 = r1 | 2 = t1]`
    EcBrainpool,
    /// Reserved, never resolves
    Complex,
}

impl Family {
    /// Decode the first element of a group tag
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Modp),
            2 => Some(Self::EcFips),
            3 => Some(Self::EcKoblitz),
            4 => Some(Self::EcBrainpool),
            5 => Some(Self::Complex),
            _ => None,
        }
    }

    /// Wire value of this family
    pub fn tag(self) -> u32 {
        match self {
            Self::Modp => 1,
            Self::EcFips => 2,
            Self::EcKoblitz => 3,
            Self::EcBrainpool => 4,
            Self::Complex => 5,
        }
    }
}

/// Catalog of group tags with a well-known meaning
///
/// Not every entry has arithmetic behind it; see [`NamedGroup::is_supported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum NamedGroup {
    Modp1536,
    Modp2048,
    Modp3072,
    Modp4096,
    Modp6144,
    Modp8192,
    FipsP224,
    FipsP256,
    FipsP384,
    FipsP521,
    KoblitzS160,
    KoblitzS192,
    KoblitzS224,
    KoblitzS256,
    BrainpoolP160r1,
    BrainpoolP160t1,
    BrainpoolP192r1,
    BrainpoolP192t1,
    BrainpoolP224r1,
    BrainpoolP224t1,
    BrainpoolP256r1,
    BrainpoolP256t1,
    BrainpoolP320r1,
    BrainpoolP320t1,
    BrainpoolP384r1,
    BrainpoolP384t1,
    BrainpoolP512r1,
    BrainpoolP512t1,
    Complex2048,
    Complex4096,
    Complex8192,
}

impl NamedGroup {
    /// Every catalog entry
    pub const ALL: [Self; 31] = [
        Self::Modp1536,
        Self::Modp2048,
        Self::Modp3072,
        Self::Modp4096,
        Self::Modp6144,
        Self::Modp8192,
        Self::FipsP224,
        Self::FipsP256,
        Self::FipsP384,
        Self::FipsP521,
        Self::KoblitzS160,
        Self::KoblitzS192,
        Self::KoblitzS224,
        Self::KoblitzS256,
        Self::BrainpoolP160r1,
        Self::BrainpoolP160t1,
        Self::BrainpoolP192r1,
        Self::BrainpoolP192t1,
        Self::BrainpoolP224r1,
        Self::BrainpoolP224t1,
        Self::BrainpoolP256r1,
        Self::BrainpoolP256t1,
        Self::BrainpoolP320r1,
        Self::BrainpoolP320t1,
        Self::BrainpoolP384r1,
        Self::BrainpoolP384t1,
        Self::BrainpoolP512r1,
        Self::BrainpoolP512t1,
        Self::Complex2048,
        Self::Complex4096,
        Self::Complex8192,
    ];

    /// Wire identifier of this group
    pub fn id(self) -> ObjectId {
        ObjectId(self.elements().to_vec())
    }

    fn elements(self) -> &'static [u32] {
        match self {
            Self::Modp1536 => &[1, 5],
            Self::Modp2048 => &[1, 14],
            Self::Modp3072 => &[1, 15],
            Self::Modp4096 => &[1, 16],
            Self::Modp6144 => &[1, 17],
            Self::Modp8192 => &[1, 18],
            Self::FipsP224 => &[2, 224],
            Self::FipsP256 => &[2, 256],
            Self::FipsP384 => &[2, 384],
            Self::FipsP521 => &[2, 521],
            Self::KoblitzS160 => &[3, 160],
            Self::KoblitzS192 => &[3, 192],
            Self::KoblitzS224 => &[3, 224],
            Self::KoblitzS256 => &[3, 256],
            Self::BrainpoolP160r1 => &[4, 160, 1],
            Self::BrainpoolP160t1 => &[4, 160, 2],
            Self::BrainpoolP192r1 => &[4, 192, 1],
            Self::BrainpoolP192t1 => &[4, 192, 2],
            Self::BrainpoolP224r1 => &[4, 224, 1],
            Self::BrainpoolP224t1 => &[4, 224, 2],
            Self::BrainpoolP256r1 => &[4, 256, 1],
            Self::BrainpoolP256t1 => &[4, 256, 2],
            Self::BrainpoolP320r1 => &[4, 320, 1],
            Self::BrainpoolP320t1 => &[4, 320, 2],
            Self::BrainpoolP384r1 => &[4, 384, 1],
            Self::BrainpoolP384t1 => &[4, 384, 2],
            Self::BrainpoolP512r1 => &[4, 512, 1],
            Self::BrainpoolP512t1 => &[4, 512, 2],
            Self::Complex2048 => &[5, 1],
            Self::Complex4096 => &[5, 2],
            Self::Complex8192 => &[5, 3],
        }
    }

    /// Catalog entry with exactly this identifier
    pub fn from_id(id: &ObjectId) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.elements() == id.as_slice())
    }

    /// Whether the global registry has arithmetic for this group
    pub fn is_supported(self) -> bool {
        !matches!(Registry::global().resolve(&self.id()), Backend::Unsupported)
    }
}

/// Arithmetic behind a group tag
#[derive(Clone, Copy)]
pub enum Backend<'a> {
    /// Multiplicative group modulo a safe prime
    Modular(&'a ModpGroup),
    /// Elliptic curve group
    Curve(&'a dyn CurveBackend),
    /// No arithmetic available for the tag
    Unsupported,
}

impl fmt::Debug for Backend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modular(group) => f.debug_tuple("Modular").field(&group.id()).finish(),
            Self::Curve(curve) => f.debug_tuple("Curve").field(&curve.name()).finish(),
            Self::Unsupported => f.write_str("Unsupported"),
        }
    }
}

/// Immutable table of every group with arithmetic behind it
pub struct Registry {
    modp: Vec<ModpGroup>,
    p224: curve::NistP224,
    p256: curve::NistP256,
    p384: curve::NistP384,
    p521: curve::NistP521,
    secp256k1: curve::Secp256k1,
    brainpool_p256r1: curve::BrainpoolP256r1,
    brainpool_p256t1: curve::BrainpoolP256t1,
    brainpool_p384r1: curve::BrainpoolP384r1,
    brainpool_p384t1: curve::BrainpoolP384t1,
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

impl Registry {
    /// Build a fresh table
    pub fn new() -> Self {
        Self {
            modp: modp::rfc3526_groups(),
            p224: curve::NistP224::new(),
            p256: curve::NistP256::new(),
            p384: curve::NistP384::new(),
            p521: curve::NistP521::new(),
            secp256k1: curve::Secp256k1::new(),
            brainpool_p256r1: curve::BrainpoolP256r1::new(),
            brainpool_p256t1: curve::BrainpoolP256t1::new(),
            brainpool_p384r1: curve::BrainpoolP384r1::new(),
            brainpool_p384t1: curve::BrainpoolP384t1::new(),
        }
    }

    /// Process-wide table, built on first use
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Map a group tag to its arithmetic
    ///
    /// Total: malformed or unknown tags yield [`Backend::Unsupported`].
    pub fn resolve(&self, id: &ObjectId) -> Backend<'_> {
        let (Some(&family), Some(&size)) = (id.0.first(), id.0.get(1)) else {
            return Backend::Unsupported;
        };

        match Family::from_tag(family) {
            Some(Family::Modp) => self
                .modp
                .iter()
                .find(|group| group.rfc_number() == size)
                .map_or(Backend::Unsupported, Backend::Modular),
            Some(Family::EcFips) => match size {
                224 => Backend::Curve(&self.p224),
                256 => Backend::Curve(&self.p256),
                384 => Backend::Curve(&self.p384),
                521 => Backend::Curve(&self.p521),
                _ => Backend::Unsupported,
            },
            Some(Family::EcKoblitz) => match size {
                256 => Backend::Curve(&self.secp256k1),
                _ => Backend::Unsupported,
            },
            Some(Family::EcBrainpool) => match (size, id.0.get(2)) {
                (256, Some(1)) => Backend::Curve(&self.brainpool_p256r1),
                (256, Some(2)) => Backend::Curve(&self.brainpool_p256t1),
                (384, Some(1)) => Backend::Curve(&self.brainpool_p384r1),
                (384, Some(2)) => Backend::Curve(&self.brainpool_p384t1),
                // no arithmetic provider for the other Brainpool sizes
                _ => Backend::Unsupported,
            },
            // nor for the small Koblitz curves or the complex family
            Some(Family::Complex) | None => Backend::Unsupported,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("modp_groups", &self.modp.len()).finish_non_exhaustive()
    }
}

/// Resolve a tag against the global registry
pub fn resolve(id: &ObjectId) -> Backend<'static> {
    Registry::global().resolve(id)
}

/// Reduce a signed integer into `[0, modulus)`
pub(crate) fn reduce_signed(value: &BigInt, modulus: &BigUint) -> BigUint {
    let reduced = value.magnitude() % modulus;
    if value.sign() == Sign::Minus && !reduced.is_zero() { modulus - reduced } else { reduced }
}

/// Write `value` big-endian into `out`, left-padded with zeros
///
/// Returns false if the value does not fit.
pub(crate) fn write_padded(value: &BigUint, out: &mut [u8]) -> bool {
    if value.is_zero() {
        out.fill(0);
        return true;
    }

    let bytes = Zeroizing::new(value.to_bytes_be());
    let Some(offset) = out.len().checked_sub(bytes.len()) else {
        return false;
    };
    out[..offset].fill(0);
    out[offset..].copy_from_slice(&bytes);
    true
}

/// Clear every digit of `value` in place, leaving zero
///
/// Bits are cleared from the bottom up so the digit buffer is only released
/// once it holds nothing but zeros. Spare capacity left over from earlier
/// arithmetic is out of reach.
pub(crate) fn wipe(value: &mut BigUint) {
    for bit in 0..value.bits() {
        value.set_bit(bit, false);
    }
}

/// Secret integer that is wiped when dropped
pub(crate) struct SecretInt(BigUint);

impl SecretInt {
    pub(crate) fn new(value: BigUint) -> Self {
        Self(value)
    }
}

impl Deref for SecretInt {
    type Target = BigUint;

    fn deref(&self) -> &BigUint {
        &self.0
    }
}

impl Zeroize for SecretInt {
    fn zeroize(&mut self) {
        wipe(&mut self.0);
    }
}

impl Drop for SecretInt {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unsupported(id: &[u32]) -> bool {
        matches!(resolve(&ObjectId::from(id)), Backend::Unsupported)
    }

    #[test]
    fn malformed_tags_are_unsupported() {
        assert!(is_unsupported(&[]));
        assert!(is_unsupported(&[1]));
        assert!(is_unsupported(&[2]));
        assert!(is_unsupported(&[0, 256]));
        assert!(is_unsupported(&[6, 256]));
        assert!(is_unsupported(&[u32::MAX, u32::MAX]));
    }

    #[test]
    fn unknown_sizes_are_unsupported() {
        assert!(is_unsupported(&[1, 2]));
        assert!(is_unsupported(&[1, 19]));
        assert!(is_unsupported(&[2, 255]));
        assert!(is_unsupported(&[3, 384]));
    }

    #[test]
    fn complex_groups_never_resolve() {
        for variant in 1..=3 {
            assert!(is_unsupported(&[5, variant]));
        }
    }

    #[test]
    fn brainpool_needs_a_known_variant() {
        assert!(is_unsupported(&[4, 256]));
        assert!(is_unsupported(&[4, 256, 0]));
        assert!(is_unsupported(&[4, 256, 3]));
        assert!(is_unsupported(&[4, 384, 3]));
        assert!(is_unsupported(&[4, 160, 1]));
        assert!(is_unsupported(&[4, 512, 2]));

        let Backend::Curve(r1) = resolve(&NamedGroup::BrainpoolP256r1.id()) else {
            panic!("brainpoolP256r1 should resolve");
        };
        let Backend::Curve(t1) = resolve(&NamedGroup::BrainpoolP256t1.id()) else {
            panic!("brainpoolP256t1 should resolve");
        };
        assert_eq!(r1.name(), "brainpoolP256r1");
        assert_eq!(t1.name(), "brainpoolP256t1");
    }

    #[test]
    fn modp_groups_resolve_by_rfc_number() {
        for rfc in [5, 14, 15, 16, 17, 18] {
            let Backend::Modular(group) = resolve(&ObjectId::from([1, rfc])) else {
                panic!("modp group {rfc} should resolve");
            };
            assert_eq!(group.rfc_number(), rfc);
        }
    }

    #[test]
    fn curves_resolve_by_size() {
        let cases: [(&[u32], usize); 9] = [
            (&[2, 224], 28),
            (&[2, 256], 32),
            (&[2, 384], 48),
            (&[2, 521], 66),
            (&[3, 256], 32),
            (&[4, 256, 1], 32),
            (&[4, 256, 2], 32),
            (&[4, 384, 1], 48),
            (&[4, 384, 2], 48),
        ];
        for (tag, field_len) in cases {
            let Backend::Curve(curve) = resolve(&ObjectId::from(tag)) else {
                panic!("{tag:?} should resolve to a curve");
            };
            assert_eq!(curve.field_len(), field_len);
        }
    }

    #[test]
    fn catalog_round_trips_through_ids() {
        for group in NamedGroup::ALL {
            assert_eq!(NamedGroup::from_id(&group.id()), Some(group));
        }
        assert_eq!(NamedGroup::from_id(&ObjectId::from([2, 256, 0])), None);
    }

    #[test]
    fn supported_catalog_entries() {
        let supported: Vec<_> =
            NamedGroup::ALL.into_iter().filter(|group| group.is_supported()).collect();
        assert_eq!(
            supported,
            vec![
                NamedGroup::Modp1536,
                NamedGroup::Modp2048,
                NamedGroup::Modp3072,
                NamedGroup::Modp4096,
                NamedGroup::Modp6144,
                NamedGroup::Modp8192,
                NamedGroup::FipsP224,
                NamedGroup::FipsP256,
                NamedGroup::FipsP384,
                NamedGroup::FipsP521,
                NamedGroup::KoblitzS256,
                NamedGroup::BrainpoolP256r1,
                NamedGroup::BrainpoolP256t1,
                NamedGroup::BrainpoolP384r1,
                NamedGroup::BrainpoolP384t1,
            ]
        );
    }

    #[test]
    fn object_id_display() {
        assert_eq!(NamedGroup::BrainpoolP320t1.id().to_string(), "[4, 320, 2]");
        assert_eq!(ObjectId::new(Vec::new()).to_string(), "[]");
    }

    #[test]
    fn reduce_signed_wraps_negatives() {
        let modulus = BigUint::from(7u32);
        assert_eq!(reduce_signed(&BigInt::from(-1), &modulus), BigUint::from(6u32));
        assert_eq!(reduce_signed(&BigInt::from(-14), &modulus), BigUint::ZERO);
        assert_eq!(reduce_signed(&BigInt::from(23), &modulus), BigUint::from(2u32));
    }

    #[test]
    fn write_padded_left_pads() {
        let mut out = [0xffu8; 4];
        assert!(write_padded(&BigUint::from(0x0102u32), &mut out));
        assert_eq!(out, [0, 0, 1, 2]);

        assert!(write_padded(&BigUint::ZERO, &mut out));
        assert_eq!(out, [0; 4]);

        let mut short = [0u8; 1];
        assert!(!write_padded(&BigUint::from(0x0102u32), &mut short));
    }

    #[test]
    fn wipe_clears_every_digit() {
        let mut value = (BigUint::from(1u32) << 700u32) - 12345u32;
        wipe(&mut value);
        assert!(value.is_zero());

        let mut zero = BigUint::ZERO;
        wipe(&mut zero);
        assert!(zero.is_zero());

        let mut secret = SecretInt::new(BigUint::from(0xdead_beef_u32) << 90u32);
        assert_eq!(secret.bits(), 122);
        secret.zeroize();
        assert!(secret.is_zero());
    }

    #[test]
    fn family_tags_round_trip() {
        for tag in 1..=5 {
            let family = Family::from_tag(tag).unwrap();
            assert_eq!(family.tag(), tag);
        }
        assert_eq!(Family::from_tag(0), None);
    }
}
