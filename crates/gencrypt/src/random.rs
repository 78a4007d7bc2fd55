//! Uniform sampling of big integers from a caller-supplied RNG

use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

/// Sample uniformly from `[0, bound)`
///
/// Draws just enough bytes to cover `bound - 1`, masks the excess bits of the
/// top byte and retries until the candidate falls below the bound, so at
/// most half of the draws are rejected.
///
/// # Errors
///
/// - `InvalidKey`: `bound` is zero, the range is empty
/// - `Random`: the RNG failed
pub(crate) fn below<R: RngCore + ?Sized>(rng: &mut R, bound: &BigUint) -> Result<BigUint> {
    if bound.is_zero() {
        return Err(CryptoError::invalid_key("empty sampling range"));
    }

    let max = bound - 1u32;
    let bits = max.bits();
    if bits == 0 {
        return Ok(BigUint::ZERO);
    }

    let len = bits.div_ceil(8) as usize;
    let mask = match bits % 8 {
        0 => 0xff,
        excess => (1u8 << excess) - 1,
    };

    let mut buf = Zeroizing::new(vec![0u8; len]);
    loop {
        rng.try_fill_bytes(&mut buf)?;
        buf[0] &= mask;

        let candidate = BigUint::from_bytes_be(&buf);
        if candidate < *bound {
            return Ok(candidate);
        }
    }
}
