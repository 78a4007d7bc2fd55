//! Key generation and encoding tests
//!
//! Behavior of key pairs outside the encryption and signature pipelines:
//! re-derivation, validation, tag handling and CBOR encoding.

use std::io::{Read, Write};

use gencrypt::{CryptoError, NamedGroup, ObjectId, PrivateKey, PublicKey, generate_key_pair};
use num_bigint::BigUint;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[test]
fn public_key_rederives_for_every_supported_group() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);

    for group in NamedGroup::ALL.into_iter().filter(|g| g.is_supported()) {
        let (public, private) = generate_key_pair(&group.id(), &mut rng).unwrap();

        assert_eq!(private.public_key().as_ref(), Some(&public), "{group:?}");
        assert_eq!(private.public_key(), private.public_key(), "{group:?}");
        public.validate().unwrap();
    }
}

#[test]
fn p224_and_brainpool_curves_serve_both_pipelines() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);

    for group in [
        NamedGroup::FipsP224,
        NamedGroup::BrainpoolP256r1,
        NamedGroup::BrainpoolP256t1,
        NamedGroup::BrainpoolP384r1,
        NamedGroup::BrainpoolP384t1,
    ] {
        assert!(group.is_supported(), "{group:?}");
        let (public, private) = generate_key_pair(&group.id(), &mut rng).unwrap();
        public.validate().unwrap();

        let mut sink = gencrypt::encrypt(&public, &mut rng, Vec::new()).unwrap();
        sink.write_all(b"brainpool").unwrap();
        let ciphertext = sink.finish().unwrap();

        let mut plaintext = Vec::new();
        gencrypt::decrypt(&private, ciphertext.as_slice())
            .unwrap()
            .read_to_end(&mut plaintext)
            .unwrap();
        assert_eq!(plaintext, b"brainpool", "{group:?}");

        let signature = gencrypt::sign_message(&private, &mut rng, b"brainpool").unwrap();
        assert!(gencrypt::verify_message(&public, &signature, b"brainpool").unwrap());
    }
}

#[test]
fn unserved_curves_stay_unsupported() {
    let mut rng = ChaCha20Rng::seed_from_u64(8);

    for group in [
        NamedGroup::KoblitzS160,
        NamedGroup::KoblitzS192,
        NamedGroup::KoblitzS224,
        NamedGroup::BrainpoolP160r1,
        NamedGroup::BrainpoolP224t1,
        NamedGroup::BrainpoolP320r1,
        NamedGroup::BrainpoolP512t1,
    ] {
        let err = generate_key_pair(&group.id(), &mut rng).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidGroup { .. }), "{group:?}");
    }
}

#[test]
fn keys_round_trip_through_cbor() {
    let mut rng = ChaCha20Rng::seed_from_u64(2);

    for group in [NamedGroup::Modp1536, NamedGroup::FipsP521] {
        let (public, private) = generate_key_pair(&group.id(), &mut rng).unwrap();

        let decoded = PublicKey::from_bytes(&public.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, public);

        let decoded = PrivateKey::from_bytes(&private.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, private);
    }
}

#[test]
fn reserved_z_is_an_empty_byte_string() {
    let mut rng = ChaCha20Rng::seed_from_u64(9);
    let (mut public, _) = generate_key_pair(&NamedGroup::BrainpoolP384t1.id(), &mut rng).unwrap();
    assert!(public.z.is_empty());

    public.z = vec![0x02, 0xff];
    let decoded = PublicKey::from_bytes(&public.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.z, [0x02, 0xff]);
}

#[test]
fn group_tag_is_copied_verbatim() {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let id = ObjectId::from([2, 384, 77]);

    let (public, private) = generate_key_pair(&id, &mut rng).unwrap();
    assert_eq!(public.group, id);
    assert_eq!(private.group, id);
    assert_ne!(public.group, NamedGroup::FipsP384.id());
}

#[test]
fn malformed_tags_fail_generation() {
    let mut rng = ChaCha20Rng::seed_from_u64(4);

    for tag in [vec![], vec![2], vec![9, 256], vec![1, 6], vec![5, 2]] {
        let id = ObjectId::new(tag);
        let err = generate_key_pair(&id, &mut rng).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidGroup { ref group } if *group == id));
    }
}

#[test]
fn validation_catches_out_of_range_modp_values() {
    let mut rng = ChaCha20Rng::seed_from_u64(5);
    let (mut public, _) = generate_key_pair(&NamedGroup::Modp1536.id(), &mut rng).unwrap();

    public.x = BigUint::from(1u32) << 1600u32;
    assert!(matches!(public.validate(), Err(CryptoError::InvalidKey { .. })));
}

#[test]
fn truncated_key_bytes_fail_decoding() {
    let mut rng = ChaCha20Rng::seed_from_u64(6);
    let (public, _) = generate_key_pair(&NamedGroup::FipsP256.id(), &mut rng).unwrap();
    let bytes = public.to_bytes().unwrap();

    let err = PublicKey::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, CryptoError::Encoding { .. }));
}
