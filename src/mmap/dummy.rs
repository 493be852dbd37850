//! The dummy mmap backend: trivial computation in the product of plaintext
//! rings, with no hiding. Used only for testing (spec.md §4.1).

use super::Mmap;
use crate::error::{ObfError, Result};
use crate::rng::AesRng;
use num_bigint::BigUint;
use num_integer::Integer;

/// Marker type selecting the dummy backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMmap;

/// Secret parameters for the dummy backend: just the plaintext moduli.
#[derive(Debug, Clone)]
pub struct DummySecretParams {
    moduli: Vec<BigUint>,
}

/// Public parameters for the dummy backend carry nothing beyond the
/// moduli, which are needed to reduce after every ring op.
#[derive(Debug, Clone)]
pub struct DummyPublicParams {
    moduli: Vec<BigUint>,
}

/// A plaintext vector plus a realized-degree counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyCiphertext {
    vals: Vec<BigUint>,
    degree: u32,
}

impl DummyCiphertext {
    /// Exposes the raw plaintext vector (dummy backend only — a real
    /// backend would never expose this).
    pub fn reveal(&self) -> &[BigUint] {
        &self.vals
    }
}

fn reduce(v: &BigUint, m: &BigUint) -> BigUint {
    v.mod_floor(m)
}

impl Mmap for DummyMmap {
    type SecretParams = DummySecretParams;
    type PublicParams = DummyPublicParams;
    type Ciphertext = DummyCiphertext;

    fn generate_keys(
        &self,
        _lambda: u32,
        _kappa: u32,
        _nzs: usize,
        _pows: &[u32],
        nslots: usize,
        _ncores: usize,
        rng: &mut AesRng,
    ) -> Result<(Self::SecretParams, Self::PublicParams)> {
        if nslots < 2 {
            return Err(ObfError::BackendKeygenFailure(format!(
                "nslots must be >= 2, got {nslots}"
            )));
        }
        use rand_core::RngCore;
        let moduli: Vec<BigUint> = (0..nslots)
            .map(|_| {
                // Small, odd, deterministic-from-rng primeish moduli; the
                // dummy backend needs no real hardness, only a nontrivial
                // modulus per slot so zero-testing is meaningful.
                let mut bytes = [0u8; 8];
                rng.fill_bytes(&mut bytes);
                let candidate = u64::from_le_bytes(bytes) | 1;
                BigUint::from(candidate.max(1_000_003))
            })
            .collect();
        Ok((
            DummySecretParams {
                moduli: moduli.clone(),
            },
            DummyPublicParams { moduli },
        ))
    }

    fn plaintext_moduli(sk: &Self::SecretParams) -> &[BigUint] {
        &sk.moduli
    }

    fn encode(sk: &Self::SecretParams, ring_elems: &[BigUint]) -> Self::Ciphertext {
        debug_assert_eq!(ring_elems.len(), sk.moduli.len());
        let vals = ring_elems
            .iter()
            .zip(sk.moduli.iter())
            .map(|(v, m)| reduce(v, m))
            .collect();
        DummyCiphertext { vals, degree: 1 }
    }

    fn add(pp: &Self::PublicParams, x: &Self::Ciphertext, y: &Self::Ciphertext) -> Result<Self::Ciphertext> {
        combine(pp, x, y, |a, b| a + b, std::cmp::max)
    }

    fn sub(pp: &Self::PublicParams, x: &Self::Ciphertext, y: &Self::Ciphertext) -> Result<Self::Ciphertext> {
        sub_impl(pp, x, y)
    }

    fn mul(pp: &Self::PublicParams, x: &Self::Ciphertext, y: &Self::Ciphertext) -> Result<Self::Ciphertext> {
        combine(pp, x, y, |a, b| a * b, |a, b| a + b)
    }

    fn is_zero(_pp: &Self::PublicParams, x: &Self::Ciphertext) -> Result<bool> {
        Ok(x.vals.iter().all(|v| v.sign() == num_bigint::Sign::NoSign))
    }

    fn degree(x: &Self::Ciphertext) -> u32 {
        x.degree
    }

    fn ciphertext_fwrite(w: &mut dyn std::io::Write, ct: &Self::Ciphertext) -> Result<()> {
        use std::io::Write as _;
        let alloc_err = |e: std::io::Error| ObfError::AllocFailure(e.to_string());
        writeln!(w, "{}", ct.vals.len()).map_err(alloc_err)?;
        for v in &ct.vals {
            writeln!(w, "{v}").map_err(alloc_err)?;
        }
        writeln!(w, "{}", ct.degree).map_err(alloc_err)?;
        Ok(())
    }

    fn ciphertext_fread(r: &mut dyn std::io::BufRead, nslots: usize) -> Result<Self::Ciphertext> {
        let alloc_err = |e: std::io::Error| ObfError::AllocFailure(e.to_string());
        let mut line = String::new();
        r.read_line(&mut line).map_err(alloc_err)?;
        let n: usize = line.trim().parse().map_err(|_| {
            ObfError::MalformedInput("bad ciphertext slot count".into())
        })?;
        if n != nslots {
            return Err(ObfError::MalformedInput(format!(
                "ciphertext has {n} slots, expected {nslots}"
            )));
        }
        let mut vals = Vec::with_capacity(n);
        for _ in 0..n {
            let mut l = String::new();
            r.read_line(&mut l).map_err(alloc_err)?;
            let v = l
                .trim()
                .parse::<BigUint>()
                .map_err(|_| ObfError::MalformedInput("bad ciphertext value".into()))?;
            vals.push(v);
        }
        let mut dline = String::new();
        r.read_line(&mut dline).map_err(alloc_err)?;
        let degree: u32 = dline
            .trim()
            .parse()
            .map_err(|_| ObfError::MalformedInput("bad ciphertext degree".into()))?;
        Ok(DummyCiphertext { vals, degree })
    }

    fn public_params_fwrite(w: &mut dyn std::io::Write, pp: &Self::PublicParams) -> Result<()> {
        use std::io::Write as _;
        let alloc_err = |e: std::io::Error| ObfError::AllocFailure(e.to_string());
        writeln!(w, "{}", pp.moduli.len()).map_err(alloc_err)?;
        for m in &pp.moduli {
            writeln!(w, "{m}").map_err(alloc_err)?;
        }
        Ok(())
    }

    fn public_params_fread(r: &mut dyn std::io::BufRead) -> Result<Self::PublicParams> {
        let alloc_err = |e: std::io::Error| ObfError::AllocFailure(e.to_string());
        let mut line = String::new();
        r.read_line(&mut line).map_err(alloc_err)?;
        let n: usize = line
            .trim()
            .parse()
            .map_err(|_| ObfError::MalformedInput("bad public params slot count".into()))?;
        let mut moduli = Vec::with_capacity(n);
        for _ in 0..n {
            let mut l = String::new();
            r.read_line(&mut l).map_err(alloc_err)?;
            let v = l
                .trim()
                .parse::<BigUint>()
                .map_err(|_| ObfError::MalformedInput("bad public params modulus".into()))?;
            moduli.push(v);
        }
        Ok(DummyPublicParams { moduli })
    }
}

fn sub_impl(
    pp: &DummyPublicParams,
    x: &DummyCiphertext,
    y: &DummyCiphertext,
) -> Result<DummyCiphertext> {
    if x.vals.len() != y.vals.len() || x.vals.len() != pp.moduli.len() {
        return Err(super::ring_failure(0, "mismatched ciphertext shape in sub"));
    }
    let vals = x
        .vals
        .iter()
        .zip(y.vals.iter())
        .zip(pp.moduli.iter())
        .map(|((a, b), m)| {
            let diff = if a >= b {
                a - b
            } else {
                m - (b - a).mod_floor(m)
            };
            reduce(&diff, m)
        })
        .collect();
    Ok(DummyCiphertext {
        vals,
        degree: std::cmp::max(x.degree, y.degree),
    })
}

fn combine(
    pp: &DummyPublicParams,
    x: &DummyCiphertext,
    y: &DummyCiphertext,
    op: impl Fn(&BigUint, &BigUint) -> BigUint,
    degree_op: impl Fn(u32, u32) -> u32,
) -> Result<DummyCiphertext> {
    if x.vals.len() != y.vals.len() || x.vals.len() != pp.moduli.len() {
        return Err(super::ring_failure(0, "mismatched ciphertext shape"));
    }
    let vals = x
        .vals
        .iter()
        .zip(y.vals.iter())
        .zip(pp.moduli.iter())
        .map(|((a, b), m)| reduce(&op(a, b), m))
        .collect();
    Ok(DummyCiphertext {
        vals,
        degree: degree_op(x.degree, y.degree),
    })
}

impl DummyMmap {
    /// Test-only constructor bypassing RNG-derived moduli, so callers can
    /// hand-verify ring arithmetic against known small primes.
    #[cfg(test)]
    pub(crate) fn keys_with_moduli(moduli: Vec<BigUint>) -> (DummySecretParams, DummyPublicParams) {
        (
            DummySecretParams {
                moduli: moduli.clone(),
            },
            DummyPublicParams { moduli },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(nslots: usize) -> (DummySecretParams, DummyPublicParams) {
        use rand_core::SeedableRng;
        let mut rng = crate::rng::AesRng::from_seed([42u8; 32]);
        DummyMmap.generate_keys(8, 2, 1, &[], nslots, 1, &mut rng).unwrap()
    }

    #[test]
    fn mul_adds_degree() {
        let (sk, pp) = keys(2);
        let a = DummyMmap::encode(&sk, &[BigUint::from(2u32), BigUint::from(3u32)]);
        let b = DummyMmap::encode(&sk, &[BigUint::from(4u32), BigUint::from(5u32)]);
        let c = DummyMmap::mul(&pp, &a, &b).unwrap();
        assert_eq!(DummyMmap::degree(&c), 2);
    }

    #[test]
    fn add_then_sub_round_trips_to_zero() {
        let (sk, pp) = keys(2);
        let a = DummyMmap::encode(&sk, &[BigUint::from(7u32), BigUint::from(9u32)]);
        let b = DummyMmap::encode(&sk, &[BigUint::from(7u32), BigUint::from(9u32)]);
        let diff = DummyMmap::sub(&pp, &a, &b).unwrap();
        assert!(DummyMmap::is_zero(&pp, &diff).unwrap());
    }
}
