//! The LZ scheme: index-set-powers. Every wire is a single
//! `Encoding<M, IndexSet>` (no `R`/`Z` split, unlike LIN); equality between
//! two operands of an `ADD`/`SUB` gate is reached by raising both to the
//! pointwise union of their index sets using precomputed "packed power"
//! unit encodings — one chain per named slot, each entry a power of two of
//! a fresh multiplicative-identity-valued encoding at that slot (the
//! scheme's namesake: raising by any `delta` decomposes into a handful of
//! multiplications by the chain's set bits, rather than `delta` of them).
//!
//! Grounded in `lz/obf_params.c` (toplevel/degree-bound derivation, already
//! implemented in `params.rs`) and `lz/obfuscator.c`'s `obf_worker` for the
//! pool-driven generation style.

use super::{const_mod, EvalReport};
use crate::circuit::{Circuit, GateKind, GateRef};
use crate::encoding::Encoding;
use crate::error::{ObfError, Result};
use crate::index_set::{IndexSet, Slot};
use crate::mmap::Mmap;
use crate::params::{self, LzParams};
use crate::pool;
use crate::rng::AesRng;
use crate::telemetry::TelemetrySink;
use num_bigint::BigUint;
use std::sync::atomic::{AtomicU32, Ordering};

/// One packed-power chain per named slot: `table[p]` encodes the
/// multiplicative identity at that slot with exponent `2^p`. Only `Y` and
/// `S(k,s)` slots need a chain — `Z(k)`/`W(k)` are never raised mid-circuit,
/// they're multiplied in exactly once at the output, already set to their
/// final exponent by `zhat`/`what`'s own index sets.
pub struct PowerTable<M: Mmap> {
    pub(crate) y: Vec<Encoding<M, IndexSet>>,
    /// `s[k][sv]`.
    pub(crate) s: Vec<Vec<Vec<Encoding<M, IndexSet>>>>,
    pub(crate) npowers: usize,
}

fn build_power_chain<M: Mmap>(
    sk: &M::SecretParams,
    base_ix: IndexSet,
    npowers: usize,
    pp: &M::PublicParams,
) -> Result<Vec<Encoding<M, IndexSet>>> {
    let unit = vec![BigUint::from(1u32), BigUint::from(1u32)];
    let mut chain = Vec::with_capacity(npowers);
    let mut cur = Encoding::encode(sk, &unit, base_ix);
    chain.push(cur.clone());
    for _ in 1..npowers {
        cur = cur.mul(&cur, pp)?;
        chain.push(cur.clone());
    }
    Ok(chain)
}

impl<M: Mmap> PowerTable<M> {
    fn build(
        sk: &M::SecretParams,
        c: usize,
        q: usize,
        npowers: usize,
        pp: &M::PublicParams,
    ) -> Result<Self> {
        let npowers = npowers.max(1);
        let y = build_power_chain::<M>(sk, IndexSet::with_y(c, q, 1), npowers, pp)?;
        let mut s = Vec::with_capacity(c);
        for k in 0..c {
            let mut s_k = Vec::with_capacity(q);
            for sv in 0..q {
                s_k.push(build_power_chain::<M>(
                    sk,
                    IndexSet::with_s(c, q, k, sv, 1),
                    npowers,
                    pp,
                )?);
            }
            s.push(s_k);
        }
        Ok(PowerTable { y, s, npowers })
    }
}

/// Raises a single slot's exponent by `delta`, consuming packed powers for
/// each set bit of `delta`'s binary expansion; records the highest power
/// index touched into `max_power` (spec.md §9: `max_npowers` diagnostic).
fn raise_slot<M: Mmap>(
    e: Encoding<M, IndexSet>,
    mut delta: u32,
    table: &[Encoding<M, IndexSet>],
    pp: &M::PublicParams,
    max_power: &AtomicU32,
) -> Result<Encoding<M, IndexSet>> {
    let mut acc = e;
    let mut p = 0usize;
    while delta > 0 {
        if delta & 1 == 1 {
            let factor = table
                .get(p)
                .ok_or_else(|| ObfError::AllocFailure(format!("npowers exceeded: needed power {p}")))?;
            acc = acc.mul(factor, pp)?;
            max_power.fetch_max(p as u32 + 1, Ordering::Relaxed);
        }
        delta >>= 1;
        p += 1;
    }
    Ok(acc)
}

/// Raises `e` to exactly `target`'s index set, slot by slot.
fn raise_to_ix<M: Mmap>(
    mut e: Encoding<M, IndexSet>,
    target: &IndexSet,
    powers: &PowerTable<M>,
    pp: &M::PublicParams,
    max_power: &AtomicU32,
) -> Result<Encoding<M, IndexSet>> {
    let c = target.nsymbols();
    let q = target.alphabet_size();

    let dy = target.get(Slot::Y).saturating_sub(e.ix.get(Slot::Y));
    e = raise_slot(e, dy, &powers.y, pp, max_power)?;

    for k in 0..c {
        for s in 0..q {
            let d = target
                .get(Slot::S(k, s))
                .saturating_sub(e.ix.get(Slot::S(k, s)));
            e = raise_slot(e, d, &powers.s[k][s], pp, max_power)?;
        }
    }
    Ok(e)
}

/// The public obfuscation.
pub struct LzObfuscation<M: Mmap> {
    pub pp: M::PublicParams,
    pub params: LzParams,
    /// `shat[k][s][j]`: the value of input bit `j` of symbol `k` when that
    /// symbol equals alphabet value `s`.
    pub shat: Vec<Vec<Vec<Encoding<M, IndexSet>>>>,
    /// `yhat[j]`: the `j`-th constant.
    pub yhat: Vec<Encoding<M, IndexSet>>,
    pub(crate) powers: PowerTable<M>,
    /// `zhat[k][s][o]`: output-`o`'s padding factor for symbol `k`, row `s`,
    /// carrying `(delta[k][s][o], gamma[k][s][o])`.
    pub zhat: Vec<Vec<Vec<Encoding<M, IndexSet>>>>,
    /// `what[k][s][o]`: carries `(0, gamma[k][s][o])` — the same `gamma` as
    /// `zhat[k][s][o]` — at index set `{W(k)=1}` only, supplying the blinding
    /// ring's `W(k)` contribution that `Chatstar` itself omits.
    pub what: Vec<Vec<Vec<Encoding<M, IndexSet>>>>,
    /// `Chatstar[o]`: the circuit evaluated symbolically on the blinding
    /// labels `(alpha, beta)`, carried at toplevel minus every `W(k)`.
    pub chatstar: Vec<Encoding<M, IndexSet>>,
    pub toplevel: IndexSet,
}

/// Builds an LZ obfuscation of `circuit`.
pub fn obfuscate<M: Mmap>(
    mmap: &M,
    circuit: &Circuit,
    ell: usize,
    sigma: bool,
    npowers: usize,
    lambda: u32,
    ncores: usize,
    rng: &mut AesRng,
) -> Result<LzObfuscation<M>> {
    let params = params::derive_lz(circuit, ell, sigma, npowers)?;
    let (c, q, m, gamma) = (params.sym.c, params.sym.q, params.m, params.gamma);
    let nslots = 2;
    let nzs = 1 + c * q + 2 * c;
    let kappa = params
        .cdmax
        .max(params.vdmax.iter().copied().max().unwrap_or(0))
        .max(1);

    let (sk, pp) = mmap.generate_keys(lambda, kappa, nzs, &[], nslots, ncores, rng)?;
    let moduli = M::plaintext_moduli(&sk).to_vec();

    // Blinding labels: alpha per (symbol, bit), beta per constant, both
    // uniform-invertible in the blinding ring moduli[1] (spec.md §4.2 step
    // 2). gamma/delta are sampled per (symbol, alphabet value, output):
    // gamma in moduli[1] is shared between zhat and what, delta in
    // moduli[0] carries zhat's own message-ring padding.
    let alpha: Vec<Vec<BigUint>> = (0..c)
        .map(|_| (0..ell).map(|_| crate::rng::sample_invertible(rng, &moduli[1])).collect())
        .collect();
    let beta: Vec<BigUint> = (0..m)
        .map(|_| crate::rng::sample_invertible(rng, &moduli[1]))
        .collect();
    let gamma_t: Vec<Vec<Vec<BigUint>>> = (0..c)
        .map(|_| {
            (0..q)
                .map(|_| (0..gamma).map(|_| crate::rng::sample_invertible(rng, &moduli[1])).collect())
                .collect()
        })
        .collect();
    let delta: Vec<Vec<Vec<BigUint>>> = (0..c)
        .map(|_| {
            (0..q)
                .map(|_| (0..gamma).map(|_| crate::rng::sample_invertible(rng, &moduli[0])).collect())
                .collect()
        })
        .collect();

    let mut shat = Vec::with_capacity(c);
    for k in 0..c {
        let mut row_k = Vec::with_capacity(q);
        for s in 0..q {
            let ix = IndexSet::with_s(c, q, k, s, 1);
            let mut row_s = Vec::with_capacity(ell);
            for j in 0..ell {
                let bit = if sigma { (s == j) as u32 } else { ((s >> j) & 1) as u32 };
                let val = const_mod(bit as i64, &moduli[0]);
                row_s.push(Encoding::encode(&sk, &[val, alpha[k][j].clone()], ix.clone()));
            }
            row_k.push(row_s);
        }
        shat.push(row_k);
    }

    let mut yhat = Vec::with_capacity(m);
    for j in 0..m {
        let val = const_mod(circuit.consts()[j], &moduli[0]);
        let ix = IndexSet::with_y(c, q, 1);
        yhat.push(Encoding::encode(&sk, &[val, beta[j].clone()], ix));
    }

    let powers = PowerTable::build(&sk, c, q, params.npowers, &pp)?;

    let mut zhat = Vec::with_capacity(c);
    let mut what = Vec::with_capacity(c);
    for k in 0..c {
        let mut zrow_k = Vec::with_capacity(q);
        let mut wrow_k = Vec::with_capacity(q);
        let what_ix = params::what_level(&params, k);
        for s in 0..q {
            let mut zrow_s = Vec::with_capacity(gamma);
            let mut wrow_s = Vec::with_capacity(gamma);
            for o in 0..gamma {
                let zix = params::zhat_level(&params, k, s, o);
                zrow_s.push(Encoding::encode(
                    &sk,
                    &[delta[k][s][o].clone(), gamma_t[k][s][o].clone()],
                    zix,
                ));
                wrow_s.push(Encoding::encode(
                    &sk,
                    &[BigUint::from(0u32), gamma_t[k][s][o].clone()],
                    what_ix.clone(),
                ));
            }
            zrow_k.push(zrow_s);
            wrow_k.push(wrow_s);
        }
        zhat.push(zrow_k);
        what.push(wrow_k);
    }

    // Cstar[o] := C(alpha, beta) mod moduli[1] — the circuit evaluated
    // symbolically on the blinding labels (spec.md §4.2 step 2), mirroring
    // LIN's ybaro computation.
    let ninputs = circuit.ninputs();
    use num_bigint::{BigInt, Sign};
    let modulus1 = BigInt::from_biguint(Sign::Plus, moduli[1].clone());
    let inputs_bi: Vec<BigInt> = (0..ninputs)
        .map(|id| {
            let (k, j) = params.sym.chunker(id);
            BigInt::from_biguint(Sign::Plus, alpha[k][j].clone())
        })
        .collect();
    let consts_bi: Vec<BigInt> = beta
        .iter()
        .map(|v| BigInt::from_biguint(Sign::Plus, v.clone()))
        .collect();
    let cstar: Vec<BigUint> = circuit
        .eval_mod_memo(&inputs_bi, &consts_bi, &modulus1)
        .into_iter()
        .map(|v| v.to_biguint().expect("mod_floor is non-negative"))
        .collect();

    let chatstar_ix = params::chatstar_level(&params);
    let chatstar: Vec<Encoding<M, IndexSet>> = cstar
        .into_iter()
        .map(|v| Encoding::encode(&sk, &[BigUint::from(0u32), v], chatstar_ix.clone()))
        .collect();

    let toplevel = params::lz_toplevel(&params);

    Ok(LzObfuscation {
        pp,
        params,
        shat,
        yhat,
        powers,
        zhat,
        what,
        chatstar,
        toplevel,
    })
}

type WireResult<M> = Result<Encoding<M, IndexSet>>;

fn wire_add<M: Mmap>(
    obf: &LzObfuscation<M>,
    x: Encoding<M, IndexSet>,
    y: Encoding<M, IndexSet>,
    max_power: &AtomicU32,
) -> WireResult<M> {
    let target = x.ix.union_max(&y.ix);
    let xr = raise_to_ix(x, &target, &obf.powers, &obf.pp, max_power)?;
    let yr = raise_to_ix(y, &target, &obf.powers, &obf.pp, max_power)?;
    xr.add(&yr, &obf.pp)
}

fn wire_sub<M: Mmap>(
    obf: &LzObfuscation<M>,
    x: Encoding<M, IndexSet>,
    y: Encoding<M, IndexSet>,
    max_power: &AtomicU32,
) -> WireResult<M> {
    let target = x.ix.union_max(&y.ix);
    let xr = raise_to_ix(x, &target, &obf.powers, &obf.pp, max_power)?;
    let yr = raise_to_ix(y, &target, &obf.powers, &obf.pp, max_power)?;
    xr.sub(&yr, &obf.pp)
}

/// Evaluates `circuit` under `inputs` against an LZ obfuscation.
pub fn evaluate<M: Mmap>(
    obf: &LzObfuscation<M>,
    circuit: &Circuit,
    inputs: &[bool],
    nthreads: usize,
    telemetry: &dyn TelemetrySink,
) -> Result<EvalReport> {
    let sym = &obf.params.sym;
    if circuit.ninputs() != sym.c * sym.ell {
        return Err(ObfError::MalformedInput(format!(
            "circuit has {} inputs, expected {}",
            circuit.ninputs(),
            sym.c * sym.ell
        )));
    }
    let syms = sym.input_symbols(inputs)?;
    let max_power = AtomicU32::new(0);

    let compute = |r: GateRef, get_dep: &dyn Fn(GateRef) -> WireResult<M>| -> WireResult<M> {
        match circuit.gate(r) {
            GateKind::Input(id) => {
                let (k, j) = sym.chunker(*id);
                Ok(obf.shat[k][syms[k]][j].clone())
            }
            GateKind::Const(idx) => Ok(obf.yhat[*idx].clone()),
            GateKind::Set(x) => get_dep(*x),
            GateKind::Mul(x, y) => {
                let wx = get_dep(*x)?;
                let wy = get_dep(*y)?;
                wx.mul(&wy, &obf.pp)
            }
            GateKind::Add(x, y) => {
                let wx = get_dep(*x)?;
                let wy = get_dep(*y)?;
                wire_add(obf, wx, wy, &max_power)
            }
            GateKind::Sub(x, y) => {
                let wx = get_dep(*x)?;
                let wy = get_dep(*y)?;
                wire_sub(obf, wx, wy, &max_power)
            }
        }
    };

    let wires = pool::run_dag(circuit, nthreads, compute);

    let mut rop = vec![false; obf.params.gamma];
    let mut kappas = vec![0u32; obf.params.gamma];
    for (o, &outref) in circuit.outputs().iter().enumerate() {
        let acc = match &wires[outref] {
            Ok(w) => w.clone(),
            Err(e) => {
                telemetry.diagnostic(e);
                rop[o] = true;
                continue;
            }
        };
        // lhs := acc * prod_k zhat[k][sym[k]][o], raised to toplevel; rhs :=
        // Chatstar[o] * prod_k what[k][sym[k]][o] (already at toplevel by
        // construction). rop[o] is the zero-test of lhs - rhs (spec.md §4.3,
        // §8: rop[o] == (C(x)[o] == 0)).
        let finalize = (|| -> Result<Encoding<M, IndexSet>> {
            let mut lhs = acc;
            for k in 0..sym.c {
                let s = syms[k];
                lhs = lhs.mul(&obf.zhat[k][s][o], &obf.pp)?;
            }
            lhs = raise_to_ix(lhs, &obf.toplevel, &obf.powers, &obf.pp, &max_power)?;
            if !lhs.ix.eq_ix(&obf.toplevel) {
                return Err(ObfError::TopLevelMismatch { output: o });
            }

            let mut rhs = obf.chatstar[o].clone();
            for k in 0..sym.c {
                let s = syms[k];
                rhs = rhs.mul(&obf.what[k][s][o], &obf.pp)?;
            }
            if !rhs.ix.eq_ix(&obf.toplevel) {
                return Err(ObfError::TopLevelMismatch { output: o });
            }

            lhs.sub(&rhs, &obf.pp)
        })();

        match finalize {
            Ok(w) => match w.is_zero(&obf.pp) {
                Ok(is_zero) => {
                    rop[o] = is_zero;
                    kappas[o] = w.degree();
                }
                Err(e) => {
                    telemetry.diagnostic(&e);
                    rop[o] = true;
                }
            },
            Err(e) => {
                telemetry.diagnostic(&e);
                rop[o] = true;
            }
        }
    }

    Ok(EvalReport {
        rop,
        kappas,
        max_npowers: Some(max_power.load(Ordering::Relaxed)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmap::dummy::DummyMmap;
    use crate::telemetry::NullTelemetry;

    #[test]
    fn raise_slot_adds_exactly_delta_to_the_targeted_exponent() {
        let (sk, pp) =
            DummyMmap::keys_with_moduli(vec![BigUint::from(97u32), BigUint::from(101u32)]);
        let base_ix = IndexSet::with_s(1, 1, 0, 0, 1);
        let table = build_power_chain::<DummyMmap>(&sk, base_ix.clone(), 3, &pp).unwrap();

        let e: Encoding<DummyMmap, IndexSet> =
            Encoding::encode(&sk, &[BigUint::from(9u32), BigUint::from(1u32)], base_ix);
        let max_power = AtomicU32::new(0);
        let raised = raise_slot(e, 5, &table, &pp, &max_power).unwrap();

        assert_eq!(raised.ix.get(Slot::S(0, 0)), 6); // base exponent 1 + delta 5
        assert_eq!(
            raised.ct.reveal(),
            &[BigUint::from(9u32), BigUint::from(1u32)]
        );
        assert_eq!(max_power.load(Ordering::Relaxed), 3); // bits 0 and 2 of 5 used, highest is index 2 -> recorded as 2+1
    }

    #[test]
    fn obfuscate_produces_correctly_shaped_tables() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([5u8; 32]);
        let mut circuit = Circuit::new(2, vec![1]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let c0 = circuit.constant(0);
        let t = circuit.mul(x0, x1);
        let o = circuit.add(t, c0);
        circuit.mark_output(o);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 4, 8, 1, &mut rng).unwrap();
        assert_eq!(obf.shat.len(), 2);
        assert_eq!(obf.shat[0].len(), 2);
        assert_eq!(obf.shat[0][0].len(), 1);
        assert_eq!(obf.yhat.len(), 1);
        assert_eq!(obf.zhat.len(), 2);
        assert_eq!(obf.zhat[0][0].len(), 1);
        assert_eq!(obf.what.len(), 2);
        assert_eq!(obf.what[0].len(), 2);
        assert_eq!(obf.what[0][0].len(), 1);
        assert_eq!(obf.chatstar.len(), 1);
    }

    #[test]
    fn evaluate_runs_end_to_end_without_error() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([6u8; 32]);
        let mut circuit = Circuit::new(2, vec![]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let o = circuit.mul(x0, x1);
        circuit.mark_output(o);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 4, 8, 1, &mut rng).unwrap();
        let report = evaluate(&obf, &circuit, &[true, true], 2, &NullTelemetry).unwrap();
        assert_eq!(report.rop.len(), 1);
        assert!(report.max_npowers.is_some());
    }

    fn bits_to_i64(bits: &[bool]) -> Vec<i64> {
        bits.iter().map(|&b| b as i64).collect()
    }

    /// Every scenario's oracle: `rop[o] == (C(x)[o] == 0)` against the
    /// circuit's own exact-integer evaluation (spec.md §8).
    fn assert_matches_plain(
        obf: &LzObfuscation<DummyMmap>,
        circuit: &Circuit,
        inputs: &[bool],
    ) {
        let report = evaluate(obf, circuit, inputs, 1, &NullTelemetry).unwrap();
        let expected = circuit.eval_plain(&bits_to_i64(inputs));
        for o in 0..circuit.noutputs() {
            assert_eq!(
                report.rop[o],
                expected[o] == 0,
                "output {o} for inputs {inputs:?}: got rop={}, C(x)={}",
                report.rop[o],
                expected[o]
            );
        }
    }

    #[test]
    fn scenario_identity_circuit_binary_mode() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([20u8; 32]);
        let mut circuit = Circuit::new(1, vec![]);
        let x0 = circuit.input(0);
        circuit.mark_output(x0);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 4, 8, 1, &mut rng).unwrap();
        assert_matches_plain(&obf, &circuit, &[false]);
        assert_matches_plain(&obf, &circuit, &[true]);
    }

    #[test]
    fn scenario_two_bit_and_in_binary_mode() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([21u8; 32]);
        let mut circuit = Circuit::new(2, vec![]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let o = circuit.mul(x0, x1);
        circuit.mark_output(o);

        let obf = obfuscate(&DummyMmap, &circuit, 2, false, 4, 8, 1, &mut rng).unwrap();
        for a in [false, true] {
            for b in [false, true] {
                assert_matches_plain(&obf, &circuit, &[a, b]);
            }
        }
    }

    #[test]
    fn scenario_three_variable_xor() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([22u8; 32]);
        let mut circuit = Circuit::new(3, vec![2, 4]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let x2 = circuit.input(2);
        let two = circuit.constant(0);
        let four = circuit.constant(1);

        let t1 = circuit.mul(x0, x1);
        let t2 = circuit.mul(x1, x2);
        let t3 = circuit.mul(x0, x2);
        let t4 = circuit.mul(t1, x2);
        let pairs01 = circuit.add(t1, t2);
        let sum_pairs = circuit.add(pairs01, t3);
        let term2 = circuit.mul(two, sum_pairs);
        let term3 = circuit.mul(four, t4);
        let bits01 = circuit.add(x0, x1);
        let sum_bits = circuit.add(bits01, x2);
        let tmp = circuit.sub(sum_bits, term2);
        let o = circuit.add(tmp, term3);
        circuit.mark_output(o);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 4, 8, 1, &mut rng).unwrap();
        for a in [false, true] {
            for b in [false, true] {
                for c in [false, true] {
                    assert_matches_plain(&obf, &circuit, &[a, b, c]);
                }
            }
        }
    }

    #[test]
    fn scenario_constant_add_then_sub() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([23u8; 32]);
        let mut circuit = Circuit::new(1, vec![5]);
        let x0 = circuit.input(0);
        let c0 = circuit.constant(0);
        let added = circuit.add(x0, c0);
        circuit.mark_output(added);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 4, 8, 1, &mut rng).unwrap();
        assert_matches_plain(&obf, &circuit, &[false]);

        let mut extended = Circuit::new(1, vec![5]);
        let x0e = extended.input(0);
        let c0e = extended.constant(0);
        let added_e = extended.add(x0e, c0e);
        let subbed = extended.sub(added_e, c0e);
        extended.mark_output(subbed);

        let mut rng2 = AesRng::from_seed([24u8; 32]);
        let obf2 = obfuscate(&DummyMmap, &extended, 1, false, 4, 8, 1, &mut rng2).unwrap();
        assert_matches_plain(&obf2, &extended, &[false]);
    }

    #[test]
    fn scenario_multi_output_on_distinct_symbols() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([25u8; 32]);
        let mut circuit = Circuit::new(3, vec![]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let x2 = circuit.input(2);
        let o0 = circuit.set(x0);
        let o1 = circuit.set(x1);
        let o2 = circuit.mul(x1, x2);
        circuit.mark_output(o0);
        circuit.mark_output(o1);
        circuit.mark_output(o2);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 4, 8, 1, &mut rng).unwrap();
        assert_matches_plain(&obf, &circuit, &[true, false, true]);
        assert_matches_plain(&obf, &circuit, &[false, true, true]);
    }

    #[test]
    fn scenario_distinct_var_degree_bounds_max_npowers_below_configured() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([26u8; 32]);
        // Symbol 0 feeds a degree-3 chain, symbol 1 a degree-1 use, so
        // var_degree differs per symbol and raising never needs every
        // configured power.
        let mut circuit = Circuit::new(2, vec![]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let sq = circuit.mul(x0, x0);
        let cube = circuit.mul(sq, x0);
        let o0 = circuit.add(cube, x1);
        let o1 = circuit.set(x1);
        circuit.mark_output(o0);
        circuit.mark_output(o1);

        let npowers = 16;
        let obf = obfuscate(&DummyMmap, &circuit, 1, false, npowers, 8, 1, &mut rng).unwrap();
        let report = evaluate(&obf, &circuit, &[true, true], 1, &NullTelemetry).unwrap();
        assert!(report.max_npowers.unwrap() < npowers as u32);
        assert_matches_plain(&obf, &circuit, &[true, true]);
        assert_matches_plain(&obf, &circuit, &[false, false]);
    }
}
