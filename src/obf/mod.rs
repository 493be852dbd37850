//! The two obfuscation schemes: [`lin`] (straddling-set / Z*-raising) and
//! [`lz`] (index-set powers). Both share the ready-counter pool driver in
//! [`crate::pool`] and report results through [`EvalReport`].

pub mod lin;
pub mod lz;

/// Explicit ownership tag replacing the original's `my_r`/`my_z`
/// booleans (spec.md §9 design note). Safe Rust's ordinary ownership
/// already frees every encoding automatically on drop, so this tag
/// carries no `free()` responsibility of its own — it exists purely so a
/// wire's provenance (a fresh computation vs. a borrowed table cell) is
/// explicit and testable, rather than folded into an implicit pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Owned,
    Borrowed,
}

/// Per-output evaluation result: the zero-test bit vector plus the
/// realized multilinearity degree for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalReport {
    pub rop: Vec<bool>,
    pub kappas: Vec<u32>,
    /// LZ only: the largest packed power used while raising any encoding
    /// during this evaluation (spec.md §9: replaces the `g_max_npowers`
    /// global with a per-evaluation field).
    pub max_npowers: Option<u32>,
}

use crate::rng::{sample_mod, AesRng};
use num_bigint::BigUint;
use num_integer::Integer;

/// Samples one ring element per CRT slot.
pub(crate) fn random_vec(rng: &mut AesRng, moduli: &[BigUint]) -> Vec<BigUint> {
    moduli.iter().map(|m| sample_mod(rng, m)).collect()
}

/// Elementwise product, reduced per-slot so intermediate magnitudes stay
/// bounded across long products (e.g. LIN's `tmp := what * whatk[0] * ...`).
pub(crate) fn elementwise_mul_mod(a: &[BigUint], b: &[BigUint], moduli: &[BigUint]) -> Vec<BigUint> {
    a.iter()
        .zip(b.iter())
        .zip(moduli.iter())
        .map(|((x, y), m)| (x * y).mod_floor(m))
        .collect()
}

/// Builds an `nslots`-long payload vector with `a` at slot 0, `b` at slot
/// 1, and `1` (pass-through) everywhere else — the LIN payload-vector
/// convention (`SPEC_FULL.md` §3).
pub(crate) fn payload2(nslots: usize, a: BigUint, b: BigUint) -> Vec<BigUint> {
    let mut v = vec![BigUint::from(1u32); nslots];
    v[0] = a;
    v[1] = b;
    v
}

/// Reduces a circuit constant (`i64`, possibly negative) into `Z/mZ`.
pub(crate) fn const_mod(v: i64, modulus: &BigUint) -> BigUint {
    use num_bigint::{BigInt, Sign};
    let m = BigInt::from_biguint(Sign::Plus, modulus.clone());
    let raw = BigInt::from(v);
    raw.mod_floor(&m).to_biguint().expect("mod_floor is non-negative for a positive modulus")
}
