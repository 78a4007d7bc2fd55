//! RFC 3526 MODP groups
//!
//! Multiplicative groups modulo a safe prime `p = 2q + 1` with generator 2.
//! Secrets are exponents in `[1, q)`, public values are `2^secret mod p`.

use num_bigint::{BigInt, BigUint};
use rand::RngCore;
use tracing::trace;

use super::{NamedGroup, ObjectId, reduce_signed};
use crate::{
    error::{CryptoError, Result},
    random,
};

/// RFC 3526 group 5, 1536-bit prime
const MODP_1536: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF",
);

/// RFC 3526 group 14, 2048-bit prime
const MODP_2048: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

/// RFC 3526 group 15, 3072-bit prime
const MODP_3072: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF",
);

/// RFC 3526 group 16, 4096-bit prime
const MODP_4096: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C934063199FFFFFFFFFFFFFFFF",
);

/// RFC 3526 group 17, 6144-bit prime
const MODP_6144: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026",
    "C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AE",
    "B06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1B",
    "DB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92EC",
    "F032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E",
    "59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AA",
    "CC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76",
    "F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468",
    "043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DCC4024FFFFFFFFFFFFFFFF",
);

/// RFC 3526 group 18, 8192-bit prime
const MODP_8192: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026",
    "C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AE",
    "B06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1B",
    "DB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92EC",
    "F032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E",
    "59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AA",
    "CC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76",
    "F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468",
    "043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DBE115974A3926F12FEE5E4",
    "38777CB6A932DF8CD8BEC4D073B931BA3BC832B68D9DD300741FA7BF8AFC47ED",
    "2576F6936BA424663AAB639C5AE4F5683423B4742BF1C978238F16CBE39D652D",
    "E3FDB8BEFC848AD922222E04A4037C0713EB57A81A23F0C73473FC646CEA306B",
    "4BCBC8862F8385DDFA9D4B7FA2C087E879683303ED5BDD3A062B3CF5B3A278A6",
    "6D2A13F83F44F82DDF310EE074AB6A364597E899A0255DC164F31CC50846851D",
    "F9AB48195DED7EA1B1D510BD7EE74D73FAF36BC31ECFA268359046F4EB879F92",
    "4009438B481C6CD7889A002ED5EE382BC9190DA6FC026E479558E4475677E9AA",
    "9E3050E2765694DFC81F56E880B96E7160C980DD98EDD3DFFFFFFFFFFFFFFFFF",
);

/// A multiplicative group modulo a safe prime
#[derive(Debug, Clone)]
pub struct ModpGroup {
    group: NamedGroup,
    rfc_number: u32,
    generator: BigUint,
    modulus: BigUint,
    modulus_minus_one: BigUint,
    order: BigUint,
    element_len: usize,
}

/// All six RFC 3526 groups, smallest first
pub(crate) fn rfc3526_groups() -> Vec<ModpGroup> {
    vec![
        ModpGroup::from_hex(NamedGroup::Modp1536, 5, MODP_1536),
        ModpGroup::from_hex(NamedGroup::Modp2048, 14, MODP_2048),
        ModpGroup::from_hex(NamedGroup::Modp3072, 15, MODP_3072),
        ModpGroup::from_hex(NamedGroup::Modp4096, 16, MODP_4096),
        ModpGroup::from_hex(NamedGroup::Modp6144, 17, MODP_6144),
        ModpGroup::from_hex(NamedGroup::Modp8192, 18, MODP_8192),
    ]
}

impl ModpGroup {
    fn from_hex(group: NamedGroup, rfc_number: u32, hex: &str) -> Self {
        let Some(modulus) = BigUint::parse_bytes(hex.as_bytes(), 16) else {
            unreachable!("RFC 3526 prime constants are valid hex");
        };
        let modulus_minus_one = &modulus - 1u32;
        let order = &modulus_minus_one >> 1u32;
        let element_len = modulus.bits().div_ceil(8) as usize;

        Self {
            group,
            rfc_number,
            generator: BigUint::from(2u32),
            modulus,
            modulus_minus_one,
            order,
            element_len,
        }
    }

    /// Wire identifier of this group
    pub fn id(&self) -> ObjectId {
        self.group.id()
    }

    /// RFC 3526 group number, the second element of the tag
    pub fn rfc_number(&self) -> u32 {
        self.rfc_number
    }

    /// Generator and modulus
    pub fn params(&self) -> (&BigUint, &BigUint) {
        (&self.generator, &self.modulus)
    }

    /// Order `q = (p - 1) / 2` of the subgroup generated by 2
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Width of an element in bytes
    pub fn element_len(&self) -> usize {
        self.element_len
    }

    /// Draw a secret exponent in `[1, q)` and its public value
    ///
    /// # Errors
    ///
    /// - `Random`: the RNG failed
    pub fn fresh_secret_and_public<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint)> {
        let secret = random::below(rng, &(&self.order - 1u32))? + 1u32;
        let public = self.public_from_secret(&secret);
        trace!(group = %self.id(), "generated modp secret");
        Ok((secret, public))
    }

    /// `g^secret mod p`
    pub fn public_from_secret(&self, secret: &BigUint) -> BigUint {
        self.exp(&self.generator, secret)
    }

    /// `base^exponent mod p`
    pub fn exp(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        base.modpow(exponent, &self.modulus)
    }

    /// `base^exponent mod p` for a signed exponent
    ///
    /// The exponent is reduced modulo `p - 1` first, which leaves the result
    /// unchanged for any base coprime to `p`.
    pub fn exp_signed(&self, base: &BigUint, exponent: &BigInt) -> BigUint {
        let exponent = reduce_signed(exponent, &self.modulus_minus_one);
        self.exp(base, &exponent)
    }

    /// Accept `x` only if `1 < x < p - 1`
    ///
    /// Rejects the trivial elements 0, 1 and `p - 1` along with anything
    /// outside the field.
    pub fn check_element(&self, x: &BigUint) -> Result<()> {
        if *x <= BigUint::from(1u32) || *x >= self.modulus_minus_one {
            return Err(CryptoError::invalid_key(format!(
                "element out of range for modp group {}",
                self.rfc_number
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use num_traits::One;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn group_1536() -> ModpGroup {
        rfc3526_groups().remove(0)
    }

    #[test]
    fn modulus_widths_match_group_sizes() {
        let bits: Vec<u64> = rfc3526_groups().iter().map(|g| g.params().1.bits()).collect();
        assert_eq!(bits, vec![1536, 2048, 3072, 4096, 6144, 8192]);

        for group in rfc3526_groups() {
            assert_eq!(group.element_len() as u64 * 8, group.params().1.bits());
        }
    }

    #[test]
    fn generator_lies_in_prime_order_subgroup() {
        let group = group_1536();
        assert!(group.exp(&group.generator, group.order()).is_one());
    }

    #[test]
    fn fresh_secret_is_in_range() {
        let group = group_1536();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let (secret, public) = group.fresh_secret_and_public(&mut rng).unwrap();

        assert!(secret >= BigUint::one());
        assert!(secret < *group.order());
        assert_eq!(public, group.public_from_secret(&secret));
        group.check_element(&public).unwrap();
    }

    #[test]
    fn check_element_rejects_trivial_values() {
        let group = group_1536();
        let (_, p) = group.params();

        for bad in [BigUint::ZERO, BigUint::one(), p - 1u32, p.clone(), p + 1u32] {
            assert!(matches!(group.check_element(&bad), Err(CryptoError::InvalidKey { .. })));
        }
        group.check_element(&BigUint::from(2u32)).unwrap();
        group.check_element(&(p - 2u32)).unwrap();
    }

    #[test]
    fn negative_exponent_inverts() {
        let group = group_1536();
        let base = BigUint::from(3u32);
        let forward = group.exp(&base, &BigUint::from(12345u32));
        let backward = group.exp_signed(&base, &BigInt::from(-12345));
        let (_, p) = group.params();

        assert!(((forward * backward) % p).is_one());
    }
}
