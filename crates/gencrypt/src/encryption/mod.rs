//! Hybrid encryption
//!
//! The sender draws an ephemeral key pair in the recipient's group, combines
//! it with the recipient's public key into a shared element, and hashes that
//! element into a Twofish-256 key. The plaintext is then streamed through
//! Twofish in CBC mode behind a [`StreamHeader`] that carries the ephemeral
//! public key and the IV.
//!
//! The final block is padded with `n` copies of the byte `n`, `1 <= n <= 16`,
//! so a stream always ends with at least one block.

mod header;
mod reader;
mod writer;

use std::io::{Read, Write};

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};
use zeroize::Zeroizing;

pub use self::{header::StreamHeader, reader::Decryptor, writer::Encryptor};
use crate::{
    config::StreamConfig,
    error::{CryptoError, Result},
    group::{Backend, ObjectId, Registry, SecretInt, wipe},
    kdf,
    keys::{PrivateKey, PublicKey},
};

/// Cipher block and IV size in bytes
pub const BLOCK_LEN: usize = 16;

/// Start an encrypted stream to `recipient`
///
/// Writes the stream header to `writer` immediately. Plaintext written to
/// the returned [`Encryptor`] is encrypted as whole blocks become available;
/// [`Encryptor::finish`] writes the padded final block.
///
/// # Errors
///
/// - `InvalidGroup`: the recipient's group has no backend
/// - `InvalidKey`: the recipient key is not a valid group element
/// - `Random`: the RNG failed
/// - `Io`: writing the header failed
pub fn encrypt<W: Write, R: RngCore + CryptoRng>(
    recipient: &PublicKey,
    rng: &mut R,
    writer: W,
) -> Result<Encryptor<W>> {
    encrypt_with_config(recipient, rng, writer, &StreamConfig::default())
}

/// [`encrypt`] with an explicit configuration
///
/// The header is checked against the configured header bound so the
/// stream is never larger than a matching decryptor accepts.
pub fn encrypt_with_config<W: Write, R: RngCore + CryptoRng>(
    recipient: &PublicKey,
    rng: &mut R,
    mut writer: W,
    config: &StreamConfig,
) -> Result<Encryptor<W>> {
    recipient.validate()?;
    let group = &recipient.group;
    let backend = Registry::global().resolve(group);

    let (ephemeral, ephemeral_secret) = match backend {
        Backend::Modular(modp) => {
            let (secret, x) = modp.fresh_secret_and_public(rng)?;
            (PublicKey::modp(group, x), SecretInt::new(secret))
        },
        Backend::Curve(curve) => {
            let (secret, point) = curve.fresh_scalar_and_point(rng)?;
            (PublicKey::curve(group, point), SecretInt::new(secret))
        },
        Backend::Unsupported => return Err(CryptoError::invalid_group(group)),
    };

    let shared = shared_bytes(backend, group, recipient, &ephemeral_secret)?;
    let key = kdf::symmetric_key(&shared);

    let mut iv = [0u8; BLOCK_LEN];
    rng.try_fill_bytes(&mut iv)?;

    let header = StreamHeader { ephemeral, iv };
    header.write_to(&mut writer, config.effective_max_header_len())?;

    debug!(%group, "opened encryption stream");
    Ok(Encryptor::new(writer, &key, &iv))
}

/// Open an encrypted stream with `key`
///
/// Reads the stream header from `reader` immediately. The returned
/// [`Decryptor`] yields the plaintext.
///
/// # Errors
///
/// - `HeaderTooBig`: the header length prefix is over the limit
/// - `Encoding`: the ephemeral key is malformed
/// - `GroupMismatch`: the stream was made for a different group
/// - `InvalidGroup`: the key's group has no backend
/// - `InvalidKey`: the ephemeral key is not a valid group element
/// - `Io`: reading the header failed
pub fn decrypt<R: Read>(key: &PrivateKey, reader: R) -> Result<Decryptor<R>> {
    decrypt_with_config(key, reader, &StreamConfig::default())
}

/// [`decrypt`] with an explicit configuration
pub fn decrypt_with_config<R: Read>(
    key: &PrivateKey,
    mut reader: R,
    config: &StreamConfig,
) -> Result<Decryptor<R>> {
    let header = StreamHeader::read_from(&mut reader, config.effective_max_header_len())?;

    if header.ephemeral.group != key.group {
        warn!(expected = %key.group, actual = %header.ephemeral.group, "stream group mismatch");
        return Err(CryptoError::GroupMismatch {
            expected: key.group.clone(),
            actual: header.ephemeral.group,
        });
    }

    let backend = Registry::global().resolve(&key.group);
    let shared = shared_bytes(backend, &key.group, &header.ephemeral, &key.secret)?;
    let symmetric = kdf::symmetric_key(&shared);

    debug!(group = %key.group, "opened decryption stream");
    Ok(Decryptor::new(reader, &symmetric, &header.iv, config.effective_read_chunk_size()))
}

/// Fixed-width bytes of `secret` applied to `peer`
///
/// MODP: `peer^secret mod p`. Curves: `x || y` of `secret·peer`.
fn shared_bytes(
    backend: Backend<'_>,
    group: &ObjectId,
    peer: &PublicKey,
    secret: &BigUint,
) -> Result<Zeroizing<Vec<u8>>> {
    match backend {
        Backend::Modular(modp) => {
            modp.check_element(&peer.x)?;
            let shared = SecretInt::new(modp.exp(&peer.x, secret));
            Ok(kdf::element_bytes(&shared, modp.element_len()))
        },
        Backend::Curve(curve) => {
            let peer = peer.point();
            curve.check_point(&peer)?;
            let mut shared = curve.scalar_mult(&peer, secret)?;
            let bytes = kdf::point_bytes(&shared, curve.field_len());
            wipe(&mut shared.x);
            wipe(&mut shared.y);
            Ok(bytes)
        },
        Backend::Unsupported => Err(CryptoError::invalid_group(group)),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::{group::NamedGroup, keys::generate_key_pair};

    fn seal(public: &PublicKey, rng: &mut ChaCha20Rng, plaintext: &[u8]) -> Vec<u8> {
        let mut encryptor = encrypt(public, rng, Vec::new()).unwrap();
        encryptor.write_all(plaintext).unwrap();
        encryptor.finish().unwrap()
    }

    fn open(private: &PrivateKey, ciphertext: &[u8]) -> io::Result<Vec<u8>> {
        let mut decryptor = decrypt(private, ciphertext).map_err(io::Error::from)?;
        let mut plaintext = Vec::new();
        decryptor.read_to_end(&mut plaintext)?;
        Ok(plaintext)
    }

    #[test]
    fn round_trip_on_p256() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let (public, private) = generate_key_pair(&NamedGroup::FipsP256.id(), &mut rng).unwrap();

        for len in [0, 1, 15, 16, 17, 32, 1000] {
            let plaintext: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let ciphertext = seal(&public, &mut rng, &plaintext);
            assert_eq!(open(&private, &ciphertext).unwrap(), plaintext, "len {len}");
        }
    }

    #[test]
    fn round_trip_on_modp() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let (public, private) = generate_key_pair(&NamedGroup::Modp1536.id(), &mut rng).unwrap();

        let ciphertext = seal(&public, &mut rng, b"attack at dawn");
        assert_eq!(open(&private, &ciphertext).unwrap(), b"attack at dawn");
    }

    #[test]
    fn ciphertext_body_is_whole_blocks() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let (public, _) = generate_key_pair(&NamedGroup::FipsP384.id(), &mut rng).unwrap();

        let empty = seal(&public, &mut rng, b"");
        let mut reader = empty.as_slice();
        StreamHeader::read_from(&mut reader, u32::MAX).unwrap();
        assert_eq!(reader.len(), BLOCK_LEN);

        let full = seal(&public, &mut rng, &[0u8; BLOCK_LEN]);
        let mut reader = full.as_slice();
        StreamHeader::read_from(&mut reader, u32::MAX).unwrap();
        assert_eq!(reader.len(), 2 * BLOCK_LEN);
    }

    #[test]
    fn ephemeral_key_lives_in_recipient_group() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let group = NamedGroup::KoblitzS256.id();
        let (public, _) = generate_key_pair(&group, &mut rng).unwrap();

        let ciphertext = seal(&public, &mut rng, b"x");
        let header = StreamHeader::read_from(&mut ciphertext.as_slice(), u32::MAX).unwrap();
        assert_eq!(header.ephemeral.group, group);
        header.ephemeral.validate().unwrap();
    }

    #[test]
    fn group_mismatch_is_reported() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let (public, _) = generate_key_pair(&NamedGroup::FipsP256.id(), &mut rng).unwrap();
        let (_, other) = generate_key_pair(&NamedGroup::FipsP384.id(), &mut rng).unwrap();

        let ciphertext = seal(&public, &mut rng, b"hello");
        let err = decrypt(&other, ciphertext.as_slice()).unwrap_err();
        assert!(matches!(err, CryptoError::GroupMismatch { .. }));
    }

    #[test]
    fn stream_debug_output_hides_cipher_state() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let (public, private) = generate_key_pair(&NamedGroup::FipsP256.id(), &mut rng).unwrap();

        let mut encryptor = encrypt(&public, &mut rng, Vec::new()).unwrap();
        encryptor.write_all(b"abc").unwrap();
        let rendered = format!("{encryptor:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(rendered.contains("pending_len: 3"));

        let ciphertext = encryptor.finish().unwrap();
        let decryptor = decrypt(&private, ciphertext.as_slice()).unwrap();
        assert!(format!("{decryptor:?}").contains("Accumulating"));
    }

    #[test]
    fn unsupported_recipient_group() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let public = PublicKey::curve(&NamedGroup::KoblitzS224.id(), crate::group::Point::identity());

        let err = encrypt(&public, &mut rng, Vec::new()).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidGroup { .. }));
    }

    #[test]
    fn invalid_recipient_key_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let (mut public, _) = generate_key_pair(&NamedGroup::Modp1536.id(), &mut rng).unwrap();
        public.x = BigUint::from(1u32);

        let err = encrypt(&public, &mut rng, Vec::new()).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKey { .. }));
    }
}
