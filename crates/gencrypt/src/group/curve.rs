//! Elliptic-curve groups backed by the RustCrypto curve crates
//!
//! Points cross the crate boundary as affine `(x, y)` integers so keys stay
//! independent of any one curve implementation. Every point coming from
//! outside is decoded through SEC1 and rejected if it is not on the curve.

use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;

use super::write_padded;
use crate::{
    error::{CryptoError, Result},
    random,
};

/// Affine point, with the identity encoded as `(0, 0)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    /// Affine x coordinate
    pub x: BigUint,
    /// Affine y coordinate
    pub y: BigUint,
}

impl Point {
    /// The point at infinity
    pub fn identity() -> Self {
        Self { x: BigUint::ZERO, y: BigUint::ZERO }
    }

    /// Whether this is the point at infinity
    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }
}

/// Arithmetic on one elliptic curve
///
/// Scalars of any size are accepted and reduced modulo the group order.
pub trait CurveBackend: Send + Sync {
    /// Curve name, for logs
    fn name(&self) -> &'static str;

    /// Width of a coordinate in bytes
    fn field_len(&self) -> usize;

    /// Order `n` of the base point
    fn order(&self) -> &BigUint;

    /// Draw a scalar in `[1, n)` and its public point
    fn fresh_scalar_and_point(&self, rng: &mut dyn RngCore) -> Result<(BigUint, Point)> {
        let scalar = random::below(rng, &(self.order() - 1u32))? + 1u32;
        let point = self.scalar_base_mult(&scalar);
        Ok((scalar, point))
    }

    /// `k·G`
    fn scalar_base_mult(&self, k: &BigUint) -> Point;

    /// `k·P`
    ///
    /// # Errors
    ///
    /// - `InvalidKey`: `point` is not on the curve
    fn scalar_mult(&self, point: &Point, k: &BigUint) -> Result<Point>;

    /// `P + Q`
    ///
    /// # Errors
    ///
    /// - `InvalidKey`: either operand is not on the curve
    fn add(&self, p: &Point, q: &Point) -> Result<Point>;

    /// Accept `point` only if it lies on the curve and is not the identity
    fn check_point(&self, point: &Point) -> Result<()>;
}

macro_rules! curve_backend {
    (@impl $(#[$meta:meta])* $backend:ident, $name:literal, $field_len:literal,
        curve = $($curve:ident)::+,
        ec = $($ec:ident)::+,
        sec1 = $sec1_point:ident, $from_sec1:ident :: $from_fn:ident, $to_sec1:ident :: $to_fn:ident
    ) => {
        $(#[$meta])*
        pub struct $backend {
            order: BigUint,
        }

        impl $backend {
            pub(crate) fn new() -> Self {
                let max = -<$($curve)::+::Scalar as $($ec)::+::ff::Field>::ONE;
                let repr = <$($curve)::+::Scalar as $($ec)::+::ff::PrimeField>::to_repr(&max);
                let order = BigUint::from_bytes_be(AsRef::<[u8]>::as_ref(&repr)) + 1u32;
                Self { order }
            }

            fn scalar(&self, k: &BigUint) -> $($curve)::+::Scalar {
                let reduced = k % &self.order;
                let mut repr =
                    <<$($curve)::+::Scalar as $($ec)::+::ff::PrimeField>::Repr as Default>::default();
                if !write_padded(&reduced, AsMut::<[u8]>::as_mut(&mut repr)) {
                    unreachable!("reduced scalar fits the field width");
                }
                let Some(scalar) = Option::from(
                    <$($curve)::+::Scalar as $($ec)::+::ff::PrimeField>::from_repr(repr),
                ) else {
                    unreachable!("reduced scalar is below the group order");
                };
                scalar
            }

            fn decode(&self, point: &Point) -> Result<$($curve)::+::ProjectivePoint> {
                if point.is_identity() {
                    return Ok($($curve)::+::ProjectivePoint::IDENTITY);
                }

                let mut x = $($curve)::+::FieldBytes::default();
                let mut y = $($curve)::+::FieldBytes::default();
                if !write_padded(&point.x, &mut x) || !write_padded(&point.y, &mut y) {
                    return Err(CryptoError::invalid_key(concat!(
                        "coordinate too large for ",
                        $name
                    )));
                }

                let encoded = $($curve)::+::$sec1_point::from_affine_coordinates(&x, &y, false);
                let affine: Option<$($curve)::+::AffinePoint> = Option::from(
                    <$($curve)::+::AffinePoint as $($ec)::+::sec1::$from_sec1<_>>::$from_fn(
                        &encoded,
                    ),
                );
                affine
                    .map($($curve)::+::ProjectivePoint::from)
                    .ok_or_else(|| CryptoError::invalid_key(concat!("point not on ", $name)))
            }

            fn encode(point: $($curve)::+::ProjectivePoint) -> Point {
                let encoded = <$($curve)::+::AffinePoint as $($ec)::+::sec1::$to_sec1<_>>::$to_fn(
                    &point.to_affine(),
                    false,
                );
                match (encoded.x(), encoded.y()) {
                    (Some(x), Some(y)) => {
                        Point { x: BigUint::from_bytes_be(x), y: BigUint::from_bytes_be(y) }
                    },
                    _ => Point::identity(),
                }
            }
        }

        impl CurveBackend for $backend {
            fn name(&self) -> &'static str {
                $name
            }

            fn field_len(&self) -> usize {
                $field_len
            }

            fn order(&self) -> &BigUint {
                &self.order
            }

            fn scalar_base_mult(&self, k: &BigUint) -> Point {
                Self::encode($($curve)::+::ProjectivePoint::GENERATOR * self.scalar(k))
            }

            fn scalar_mult(&self, point: &Point, k: &BigUint) -> Result<Point> {
                let point = self.decode(point)?;
                Ok(Self::encode(point * self.scalar(k)))
            }

            fn add(&self, p: &Point, q: &Point) -> Result<Point> {
                Ok(Self::encode(self.decode(p)? + self.decode(q)?))
            }

            fn check_point(&self, point: &Point) -> Result<()> {
                if point.is_identity() {
                    return Err(CryptoError::invalid_key(concat!("identity on ", $name)));
                }
                self.decode(point).map(|_| ())
            }
        }
    };

    // elliptic-curve 0.13 crates
    ($(#[$meta:meta])* $backend:ident, $krate:ident, $name:literal, $field_len:literal) => {
        curve_backend!(@impl $(#[$meta])* $backend, $name, $field_len,
            curve = $krate,
            ec = elliptic_curve,
            sec1 = EncodedPoint, FromEncodedPoint::from_encoded_point,
                ToEncodedPoint::to_encoded_point
        );
    };

    // elliptic-curve 0.14 crates, one module per curve variant
    ($(#[$meta:meta])* $backend:ident, $krate:ident :: $variant:ident, $name:literal, $field_len:literal) => {
        curve_backend!(@impl $(#[$meta])* $backend, $name, $field_len,
            curve = $krate::$variant,
            ec = $krate::elliptic_curve,
            sec1 = Sec1Point, FromSec1Point::from_sec1_point, ToSec1Point::to_sec1_point
        );
    };
}

curve_backend!(
    /// NIST P-224
    NistP224, p224, "P-224", 28
);
curve_backend!(
    /// NIST P-256
    NistP256, p256, "P-256", 32
);
curve_backend!(
    /// NIST P-384
    NistP384, p384, "P-384", 48
);
curve_backend!(
    /// NIST P-521
    NistP521, p521, "P-521", 66
);
curve_backend!(
    /// SEC 2 secp256k1
    Secp256k1, k256, "secp256k1", 32
);
curve_backend!(
    /// brainpoolP256r1
    BrainpoolP256r1, bp256::r1, "brainpoolP256r1", 32
);
curve_backend!(
    /// brainpoolP256t1
    BrainpoolP256t1, bp256::t1, "brainpoolP256t1", 32
);
curve_backend!(
    /// brainpoolP384r1
    BrainpoolP384r1, bp384::r1, "brainpoolP384r1", 48
);
curve_backend!(
    /// brainpoolP384t1
    BrainpoolP384t1, bp384::t1, "brainpoolP384t1", 48
);
