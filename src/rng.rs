//! The crate's single randomness source: a deterministic AES-CTR DRBG.
//!
//! Every sampling step in both generators (`obf::lin`, `obf::lz`) must draw
//! from this type so that an obfuscation is "strictly deterministic given
//! the input RNG state and backend" (spec.md §4.2). We build it from the
//! real RustCrypto `aes`/`ctr` crates rather than the teacher's
//! `concrete-csprng` (an unavailable sibling path-dependency) — see
//! `DESIGN.md` for the drop/replacement note.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes128;
use ctr::Ctr64BE;
use rand_core::{RngCore, SeedableRng};

type Aes128Ctr = Ctr64BE<Aes128>;

/// AES-128-CTR deterministic bit generator, seeded from a 32-byte value
/// (16 bytes key, 16 bytes initial counter block).
pub struct AesRng {
    cipher: Aes128Ctr,
}

impl AesRng {
    fn fill(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        self.cipher.apply_keystream(buf);
    }
}

impl SeedableRng for AesRng {
    type Seed = [u8; 32];

    fn from_seed(seed: Self::Seed) -> Self {
        let (key, iv) = seed.split_at(16);
        let cipher = Aes128Ctr::new(key.into(), iv.into());
        AesRng { cipher }
    }
}

impl RngCore for AesRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.fill(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill(dest);
        Ok(())
    }
}

/// Samples a uniform value in `[0, modulus)`. The sole source of randomness
/// used by both generators when drawing ring elements.
pub fn sample_mod(rng: &mut AesRng, modulus: &num_bigint::BigUint) -> num_bigint::BigUint {
    use num_bigint::RandBigInt;
    rng.gen_biguint_below(modulus)
}

/// Samples a uniform invertible element of `Z/mZ` (nonzero, and for
/// composite `m` additionally coprime to it) — used by LZ's `alpha`,
/// `beta`, `gamma`, `delta` samples, whose C ancestor calls this
/// `mpz_randomm_inv`.
pub fn sample_invertible(rng: &mut AesRng, modulus: &num_bigint::BigUint) -> num_bigint::BigUint {
    use num_bigint::BigUint;
    use num_integer::Integer;
    loop {
        let candidate = sample_mod(rng, modulus);
        if candidate != BigUint::from(0u32) && candidate.gcd(modulus) == BigUint::from(1u32) {
            return candidate;
        }
    }
}
