//! The typed encoding wrapper: a pair `(ix, ct)` of an index-set/level tag
//! and an opaque mmap ciphertext, with algebra that mirrors the underlying
//! ring while enforcing the index-set laws of spec.md §3/§8: `mul` adds
//! index sets; `add`/`sub` require identical index sets.

use crate::index_set::IndexSet;
use crate::level::Level;
use crate::mmap::Mmap;
use crate::error::Result;

/// A tag type's algebra, shared by [`IndexSet`] (LZ) and [`Level`] (LIN).
pub trait Grading: Clone + PartialEq {
    fn add_grading(&self, other: &Self) -> Self;
    fn eq_grading(&self, other: &Self) -> bool;
}

impl Grading for IndexSet {
    fn add_grading(&self, other: &Self) -> Self {
        self.add(other)
    }
    fn eq_grading(&self, other: &Self) -> bool {
        self.eq_ix(other)
    }
}

impl Grading for Level {
    fn add_grading(&self, other: &Self) -> Self {
        self.add(other)
    }
    fn eq_grading(&self, other: &Self) -> bool {
        self.eq_level(other)
    }
}

/// An mmap-encoded ring element tagged with its index-set/level.
#[derive(Clone, Debug)]
pub struct Encoding<M: Mmap, T> {
    pub ix: T,
    pub ct: M::Ciphertext,
}

impl<M: Mmap, T: Grading> Encoding<M, T> {
    pub fn new(ix: T, ct: M::Ciphertext) -> Self {
        Encoding { ix, ct }
    }

    /// Encodes `ring_elems` at `ix` using the backend's secret parameters.
    pub fn encode(sk: &M::SecretParams, ring_elems: &[num_bigint::BigUint], ix: T) -> Self {
        Encoding {
            ix,
            ct: M::encode(sk, ring_elems),
        }
    }

    /// Multiplies two encodings; the result's index set is the sum of
    /// both operands' (spec.md §8: `ix(mul(x,y)) = add(ix(x), ix(y))`).
    pub fn mul(&self, other: &Self, pp: &M::PublicParams) -> Result<Self> {
        let ct = M::mul(pp, &self.ct, &other.ct)?;
        Ok(Encoding {
            ix: self.ix.add_grading(&other.ix),
            ct,
        })
    }

    /// Adds two encodings at the same index set.
    pub fn add(&self, other: &Self, pp: &M::PublicParams) -> Result<Self> {
        debug_assert!(
            self.ix.eq_grading(&other.ix),
            "add requires identical index sets"
        );
        let ct = M::add(pp, &self.ct, &other.ct)?;
        Ok(Encoding {
            ix: self.ix.clone(),
            ct,
        })
    }

    /// Subtracts two encodings at the same index set.
    pub fn sub(&self, other: &Self, pp: &M::PublicParams) -> Result<Self> {
        debug_assert!(
            self.ix.eq_grading(&other.ix),
            "sub requires identical index sets"
        );
        let ct = M::sub(pp, &self.ct, &other.ct)?;
        Ok(Encoding {
            ix: self.ix.clone(),
            ct,
        })
    }

    /// Whether this encoding is zero, valid only when `self.ix` is the
    /// scheme's toplevel — callers are responsible for checking that
    /// before calling (spec.md §3 invariant).
    pub fn is_zero(&self, pp: &M::PublicParams) -> Result<bool> {
        M::is_zero(pp, &self.ct)
    }

    /// The realized multilinearity degree.
    pub fn degree(&self) -> u32 {
        M::degree(&self.ct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmap::dummy::DummyMmap;
    use num_bigint::BigUint;
    use rand_core::SeedableRng;

    fn setup() -> (
        <DummyMmap as Mmap>::SecretParams,
        <DummyMmap as Mmap>::PublicParams,
    ) {
        let mut rng = crate::rng::AesRng::from_seed([3u8; 32]);
        DummyMmap
            .generate_keys(8, 4, 1, &[], 2, 1, &mut rng)
            .unwrap()
    }

    #[test]
    fn mul_adds_index_sets() {
        let (sk, pp) = setup();
        let ix_a = IndexSet::with_s(1, 2, 0, 0, 1);
        let ix_b = IndexSet::with_z(1, 2, 0, 1);
        let a: Encoding<DummyMmap, _> =
            Encoding::encode(&sk, &[BigUint::from(2u32), BigUint::from(3u32)], ix_a.clone());
        let b: Encoding<DummyMmap, _> =
            Encoding::encode(&sk, &[BigUint::from(4u32), BigUint::from(5u32)], ix_b.clone());
        let product = a.mul(&b, &pp).unwrap();
        assert_eq!(product.ix, ix_a.add(&ix_b));
    }

    #[test]
    fn add_requires_equal_index_sets_is_checked_in_debug() {
        let (sk, pp) = setup();
        let ix = IndexSet::with_s(1, 2, 0, 0, 1);
        let a: Encoding<DummyMmap, _> =
            Encoding::encode(&sk, &[BigUint::from(1u32), BigUint::from(1u32)], ix.clone());
        let b: Encoding<DummyMmap, _> =
            Encoding::encode(&sk, &[BigUint::from(1u32), BigUint::from(1u32)], ix);
        let sum = a.add(&b, &pp).unwrap();
        assert_eq!(sum.ix, a.ix);
    }
}
