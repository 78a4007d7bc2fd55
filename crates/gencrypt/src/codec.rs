//! CBOR encoding of keys, signatures and stream headers
//!
//! Big integers are carried as CBOR byte strings: magnitudes big-endian,
//! signed values in big-endian two's complement.

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{CryptoError, Result};

/// Encode a value as CBOR
pub(crate) fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| CryptoError::Encoding { reason: e.to_string() })?;
    Ok(bytes)
}

/// Decode a CBOR value that must span all of `bytes`
pub(crate) fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut reader = bytes;
    let value = ciborium::from_reader(&mut reader)
        .map_err(|e| CryptoError::Encoding { reason: e.to_string() })?;
    if !reader.is_empty() {
        return Err(CryptoError::Encoding {
            reason: format!("{} trailing bytes after value", reader.len()),
        });
    }
    Ok(value)
}

/// `#[serde(with)]` adapter for [`num_bigint::BigUint`]
pub(crate) mod biguint {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_bytes::ByteBuf;

    pub(crate) fn serialize<S: Serializer>(
        value: &BigUint,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serde_bytes::serialize(&value.to_bytes_be(), serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BigUint, D::Error> {
        let bytes = ByteBuf::deserialize(deserializer)?;
        Ok(BigUint::from_bytes_be(&bytes))
    }
}

/// `#[serde(with)]` adapter for [`num_bigint::BigInt`]
pub(crate) mod bigint {
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_bytes::ByteBuf;

    pub(crate) fn serialize<S: Serializer>(
        value: &BigInt,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serde_bytes::serialize(&value.to_signed_bytes_be(), serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BigInt, D::Error> {
        let bytes = ByteBuf::deserialize(deserializer)?;
        Ok(BigInt::from_signed_bytes_be(&bytes))
    }
}
