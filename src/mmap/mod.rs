//! The mmap (graded-encoding / multilinear map) façade.
//!
//! This trait is the narrow interface through which the rest of the crate
//! consumes a multilinear map — key generation, encoding, and the ring ops
//! `add`/`sub`/`mul`/`is_zero`/`degree`. The real cryptographic primitive
//! (lattice-based hardness, CLT/GGH-style constructions) is explicitly out
//! of scope (spec.md §1): the only backend shipped here is [`dummy::DummyMmap`],
//! which computes directly in the product of plaintext rings with no
//! hiding, for use in tests and as the reference semantics every scheme
//! must match (spec.md §8's main correctness property).

pub mod dummy;

use crate::error::{ObfError, Result};
use crate::rng::AesRng;
use num_bigint::BigUint;
use std::fmt::Debug;

/// A graded-encoding backend.
pub trait Mmap {
    /// Secret parameters: plaintext ring moduli and anything needed to
    /// encode fresh ring elements.
    type SecretParams: Clone + Send + Sync;
    /// Public parameters: whatever is needed to perform ring ops and
    /// zero-test on already-produced ciphertexts.
    type PublicParams: Clone + Send + Sync;
    /// An opaque encoded ring element at some (unlabeled, by this trait)
    /// level; the index-set/level labeling is tracked one layer up by
    /// [`crate::encoding::Encoding`].
    type Ciphertext: Clone + PartialEq + Debug + Send + Sync;

    /// Generates a fresh secret/public parameter pair.
    ///
    /// `lambda` is the security parameter, `kappa` the maximum
    /// multilinearity degree, `nzs` the number of index slots the backend
    /// must support, `pows` the set of packed powers (LZ's `npowers`) that
    /// will be published, `nslots` the plaintext ring's CRT width, and
    /// `ncores` a hint for backend-internal parallelism.
    #[allow(clippy::too_many_arguments)]
    fn generate_keys(
        &self,
        lambda: u32,
        kappa: u32,
        nzs: usize,
        pows: &[u32],
        nslots: usize,
        ncores: usize,
        rng: &mut AesRng,
    ) -> Result<(Self::SecretParams, Self::PublicParams)>;

    /// The plaintext ring moduli, one per CRT slot.
    fn plaintext_moduli(sk: &Self::SecretParams) -> &[BigUint];

    /// Encodes a vector of ring elements (one per plaintext slot).
    fn encode(sk: &Self::SecretParams, ring_elems: &[BigUint]) -> Self::Ciphertext;

    fn add(pp: &Self::PublicParams, x: &Self::Ciphertext, y: &Self::Ciphertext) -> Result<Self::Ciphertext>;
    fn sub(pp: &Self::PublicParams, x: &Self::Ciphertext, y: &Self::Ciphertext) -> Result<Self::Ciphertext>;
    fn mul(pp: &Self::PublicParams, x: &Self::Ciphertext, y: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// Whether the encoded value is the zero ring element.
    fn is_zero(pp: &Self::PublicParams, x: &Self::Ciphertext) -> Result<bool>;

    /// The realized multilinearity degree of this ciphertext (number of
    /// `mul`s folded into it since encoding).
    fn degree(x: &Self::Ciphertext) -> u32;

    /// Writes a ciphertext using the crate's textual line-oriented framing
    /// (`config.rs`). Every backend owns its own wire format; the dummy
    /// backend writes one decimal line per plaintext slot plus a degree
    /// line.
    fn ciphertext_fwrite(w: &mut dyn std::io::Write, ct: &Self::Ciphertext) -> Result<()>;

    /// Inverse of [`Mmap::ciphertext_fwrite`]; `nslots` must match the
    /// value used at encode time.
    fn ciphertext_fread(r: &mut dyn std::io::BufRead, nslots: usize) -> Result<Self::Ciphertext>;

    /// Writes the public parameters (the only backend state a fresh
    /// evaluator needs alongside the obfuscation tables themselves).
    fn public_params_fwrite(w: &mut dyn std::io::Write, pp: &Self::PublicParams) -> Result<()>;

    /// Inverse of [`Mmap::public_params_fwrite`].
    fn public_params_fread(r: &mut dyn std::io::BufRead) -> Result<Self::PublicParams>;
}

pub(crate) fn ring_failure(output: usize, reason: impl Into<String>) -> ObfError {
    ObfError::RingOpFailure {
        output,
        reason: reason.into(),
    }
}
