//! The LIN scheme: a straddling-set construction over LIN's rectangular
//! `Level` algebra, with a `Zstar`-raising gadget that equalizes two wires'
//! accumulated degree before a level-sensitive `add`/`sub`.
//!
//! Grounded in `lin/obfuscator.c`'s `obfuscate`/`eval_worker` (table names
//! `Rks`/`Zksj`/`Rc`/`Zcj`/`Rhatkso`/`Zhatkso`/`Rhato`/`Zhato`/`Rbaro`/`Zbaro`
//! carried over verbatim; see `DESIGN.md` for the payload-vector and
//! `Level`-coordinate conventions this module assumes).

use super::{const_mod, elementwise_mul_mod, payload2, random_vec, EvalReport, Provenance};
use crate::circuit::{Circuit, GateKind, GateRef};
use crate::encoding::Encoding;
use crate::error::{ObfError, Result};
use crate::level::Level;
use crate::mmap::Mmap;
use crate::params::{self, LinParams};
use crate::pool;
use crate::rng::AesRng;
use crate::telemetry::TelemetrySink;
use num_bigint::{BigInt, BigUint, Sign};

/// The public obfuscation: every named encoding table from `lin/obfuscator.c`,
/// plus the derived parameters needed to drive an evaluation.
pub struct LinObfuscation<M: Mmap> {
    pub pp: M::PublicParams,
    pub params: LinParams,
    pub zstar: Encoding<M, Level>,
    /// `Rks[k][s]`.
    pub rks: Vec<Vec<Encoding<M, Level>>>,
    /// `Zksj[k][s][j]`.
    pub zksj: Vec<Vec<Vec<Encoding<M, Level>>>>,
    pub rc: Encoding<M, Level>,
    /// `Zcj[j]`.
    pub zcj: Vec<Encoding<M, Level>>,
    /// `Rhatkso[k][s][o]`.
    pub rhatkso: Vec<Vec<Vec<Encoding<M, Level>>>>,
    /// `Zhatkso[k][s][o]`.
    pub zhatkso: Vec<Vec<Vec<Encoding<M, Level>>>>,
    /// `Rhato[o]`.
    pub rhato: Vec<Encoding<M, Level>>,
    /// `Zhato[o]`.
    pub zhato: Vec<Encoding<M, Level>>,
    /// `Rbaro[o]`.
    pub rbaro: Vec<Encoding<M, Level>>,
    /// `Zbaro[o]`.
    pub zbaro: Vec<Encoding<M, Level>>,
}

/// Builds a LIN obfuscation of `circuit`. `ell`/`sigma` pick the symbol
/// chunking (spec.md §4.4); `lambda` is the mmap security parameter.
pub fn obfuscate<M: Mmap>(
    mmap: &M,
    circuit: &Circuit,
    ell: usize,
    sigma: bool,
    lambda: u32,
    ncores: usize,
    rng: &mut AesRng,
) -> Result<LinObfuscation<M>> {
    let params = params::derive_lin(circuit, ell, sigma)?;
    let (c, q, m, gamma, d) = (
        params.sym.c,
        params.sym.q,
        params.m,
        params.gamma,
        params.d,
    );
    let nslots = c + 3;
    let nzs = (q + 1) * (c + 2);
    let kappa = d.max(1);

    let (sk, pp) = mmap.generate_keys(lambda, kappa, nzs, &[], nslots, ncores, rng)?;
    let moduli = M::plaintext_moduli(&sk).to_vec();

    // Per-symbol "main payload" and "indicator" scalars.
    let ykj: Vec<Vec<BigUint>> = (0..c)
        .map(|_| (0..ell).map(|_| crate::rng::sample_mod(rng, &moduli[0])).collect())
        .collect();
    let ykjc: Vec<BigUint> = (0..m).map(|_| crate::rng::sample_mod(rng, &moduli[0])).collect();

    // whatk[k]/what: full-length random vectors with one forced-zero slot.
    let mut whatk: Vec<Vec<BigUint>> = (0..c).map(|_| random_vec(rng, &moduli)).collect();
    for (k, w) in whatk.iter_mut().enumerate() {
        w[k + 2] = BigUint::from(0u32);
    }
    let mut what = random_vec(rng, &moduli);
    what[c + 2] = BigUint::from(0u32);

    let vstar = Level::vstar(q, c);

    let mut zstar_vec = vec![BigUint::from(1u32); nslots];
    for slot in zstar_vec.iter_mut().skip(2) {
        *slot = crate::rng::sample_mod(rng, &moduli[0]);
    }
    let zstar: Encoding<M, Level> = Encoding::encode(&sk, &zstar_vec, vstar.clone());

    let mut rks: Vec<Vec<Encoding<M, Level>>> = Vec::with_capacity(c);
    let mut zksj: Vec<Vec<Vec<Encoding<M, Level>>>> = Vec::with_capacity(c);
    for k in 0..c {
        let mut rks_k = Vec::with_capacity(q);
        let mut zksj_k = Vec::with_capacity(q);
        for s in 0..q {
            let rs = random_vec(rng, &moduli);
            let lvl = Level::vks(q, c, k, s);
            rks_k.push(Encoding::encode(&sk, &rs, lvl.clone()));

            let mut zksj_s = Vec::with_capacity(ell);
            for j in 0..ell {
                let indicator = if sigma {
                    (s == j) as u32
                } else {
                    ((s >> j) & 1) as u32
                };
                let payload = payload2(nslots, ykj[k][j].clone(), BigUint::from(indicator));
                let z_vec = elementwise_mul_mod(&payload, &rs, &moduli);
                zksj_s.push(Encoding::encode(&sk, &z_vec, lvl.add(&vstar)));
            }
            zksj_k.push(zksj_s);
        }
        rks.push(rks_k);
        zksj.push(zksj_k);
    }

    let rs_c = random_vec(rng, &moduli);
    let vc = Level::vc(q, c);
    let rc: Encoding<M, Level> = Encoding::encode(&sk, &rs_c, vc.clone());
    let mut zcj = Vec::with_capacity(m);
    for j in 0..m {
        let const_val = const_mod(circuit.consts()[j], &moduli[1]);
        let payload = payload2(nslots, ykjc[j].clone(), const_val);
        let z_vec = elementwise_mul_mod(&payload, &rs_c, &moduli);
        zcj.push(Encoding::encode(&sk, &z_vec, vc.add(&vstar)));
    }

    let mut rhatkso: Vec<Vec<Vec<Encoding<M, Level>>>> = Vec::with_capacity(c);
    let mut zhatkso: Vec<Vec<Vec<Encoding<M, Level>>>> = Vec::with_capacity(c);
    for k in 0..c {
        let mut r_k = Vec::with_capacity(q);
        let mut z_k = Vec::with_capacity(q);
        for s in 0..q {
            let mut r_s = Vec::with_capacity(gamma);
            let mut z_s = Vec::with_capacity(gamma);
            for o in 0..gamma {
                let rs = random_vec(rng, &moduli);
                let lvl = Level::vhatkso(q, c, k, s, o);
                r_s.push(Encoding::encode(&sk, &rs, lvl.clone()));
                let z_vec = elementwise_mul_mod(&whatk[k], &rs, &moduli);
                z_s.push(Encoding::encode(&sk, &z_vec, lvl.add(&vstar)));
            }
            r_k.push(r_s);
            z_k.push(z_s);
        }
        rhatkso.push(r_k);
        zhatkso.push(z_k);
    }

    let mut rhato = Vec::with_capacity(gamma);
    let mut zhato = Vec::with_capacity(gamma);
    for o in 0..gamma {
        let rs = random_vec(rng, &moduli);
        let lvl = Level::vhato(q, c, o);
        rhato.push(Encoding::encode(&sk, &rs, lvl.clone()));
        let z_vec = elementwise_mul_mod(&what, &rs, &moduli);
        zhato.push(Encoding::encode(&sk, &z_vec, lvl.add(&vstar)));
    }

    // ybaro[o] := C(ykj, ykjc), the circuit evaluated symbolically on the
    // per-symbol y-labels rather than on actual input bits (spec.md §4.2
    // step 7) — this is what each real evaluation's accumulated Z-term is
    // checked against.
    let ninputs = circuit.ninputs();
    let modulus0 = BigInt::from_biguint(Sign::Plus, moduli[0].clone());
    let inputs_bi: Vec<BigInt> = (0..ninputs)
        .map(|id| {
            let (k, j) = params.sym.chunker(id);
            BigInt::from_biguint(Sign::Plus, ykj[k][j].clone())
        })
        .collect();
    let consts_bi: Vec<BigInt> = ykjc
        .iter()
        .map(|v| BigInt::from_biguint(Sign::Plus, v.clone()))
        .collect();
    let ybaro: Vec<BigUint> = circuit
        .eval_mod_memo(&inputs_bi, &consts_bi, &modulus0)
        .into_iter()
        .map(|v| v.to_biguint().expect("mod_floor is non-negative"))
        .collect();

    let mut tmp = what.clone();
    for w in &whatk {
        tmp = elementwise_mul_mod(&tmp, w, &moduli);
    }

    let mut rbaro = Vec::with_capacity(gamma);
    let mut zbaro = Vec::with_capacity(gamma);
    for o in 0..gamma {
        let rs = random_vec(rng, &moduli);
        let base = Level::vbaro(q, c, o);
        rbaro.push(Encoding::encode(&sk, &rs, base.clone()));

        let tmp_rs = elementwise_mul_mod(&tmp, &rs, &moduli);
        let payload = payload2(nslots, ybaro[o].clone(), BigUint::from(1u32));
        let z_vec = elementwise_mul_mod(&payload, &tmp_rs, &moduli);
        let z_lvl = base.add(&vstar.scalar_mul(d));
        zbaro.push(Encoding::encode(&sk, &z_vec, z_lvl));
    }

    Ok(LinObfuscation {
        pp,
        params,
        zstar,
        rks,
        zksj,
        rc,
        zcj,
        rhatkso,
        zhatkso,
        rhato,
        zhato,
        rbaro,
        zbaro,
    })
}

/// A value carried along one circuit wire during evaluation: the `(R, Z)`
/// encoding pair plus the accumulated `Zstar`-degree counter `d`.
#[derive(Clone)]
pub struct Wire<M: Mmap> {
    pub r: Encoding<M, Level>,
    pub z: Encoding<M, Level>,
    pub d: u32,
    pub provenance: Provenance,
}

type WireResult<M> = Result<Wire<M>>;

fn hat_wire<M: Mmap>(r: &Encoding<M, Level>, z: &Encoding<M, Level>) -> Wire<M> {
    Wire {
        r: r.clone(),
        z: z.clone(),
        d: 0,
        provenance: Provenance::Borrowed,
    }
}

/// `Zstar^delta`, computed by square-and-multiply; `None` for `delta == 0`
/// so callers can skip the multiplication entirely rather than needing a
/// multiplicative-identity encoding.
fn zstar_power<M: Mmap>(
    zstar: &Encoding<M, Level>,
    mut delta: u32,
    pp: &M::PublicParams,
) -> Result<Option<Encoding<M, Level>>> {
    if delta == 0 {
        return Ok(None);
    }
    let mut acc: Option<Encoding<M, Level>> = None;
    let mut base = zstar.clone();
    while delta > 0 {
        if delta & 1 == 1 {
            acc = Some(match acc {
                Some(r) => r.mul(&base, pp)?,
                None => base.clone(),
            });
        }
        delta >>= 1;
        if delta > 0 {
            base = base.mul(&base, pp)?;
        }
    }
    Ok(acc)
}

fn raise_by_zstar<M: Mmap>(
    e: &Encoding<M, Level>,
    delta: u32,
    zstar: &Encoding<M, Level>,
    pp: &M::PublicParams,
) -> Result<Encoding<M, Level>> {
    match zstar_power(zstar, delta, pp)? {
        None => Ok(e.clone()),
        Some(zp) => e.mul(&zp, pp),
    }
}

fn wire_mul<M: Mmap>(obf: &LinObfuscation<M>, x: &Wire<M>, y: &Wire<M>) -> WireResult<M> {
    Ok(Wire {
        r: x.r.mul(&y.r, &obf.pp)?,
        z: x.z.mul(&y.z, &obf.pp)?,
        d: x.d + y.d,
        provenance: Provenance::Owned,
    })
}

fn wire_add<M: Mmap>(obf: &LinObfuscation<M>, mut x: Wire<M>, mut y: Wire<M>) -> WireResult<M> {
    if x.d > y.d {
        std::mem::swap(&mut x, &mut y);
    }
    let delta = y.d - x.d;
    let same_r_level = x.r.ix.eq_level(&y.r.ix);
    let r = x.r.mul(&y.r, &obf.pp)?;
    let z = if same_r_level {
        if delta == 0 {
            x.z.add(&y.z, &obf.pp)?
        } else {
            raise_by_zstar(&x.z, delta, &obf.zstar, &obf.pp)?.add(&y.z, &obf.pp)?
        }
    } else {
        let xzyr = x.z.mul(&y.r, &obf.pp)?;
        let xzyr_raised = raise_by_zstar(&xzyr, delta, &obf.zstar, &obf.pp)?;
        let yzxr = y.z.mul(&x.r, &obf.pp)?;
        xzyr_raised.add(&yzxr, &obf.pp)?
    };
    Ok(Wire {
        r,
        z,
        d: y.d,
        provenance: Provenance::Owned,
    })
}

/// `SUB(x, y)`. Unlike `ADD`, the operands cannot be swapped (subtraction
/// is not commutative); when `x.d > y.d` we instead raise `y` in place.
///
/// This is the branch the original's `wire_constrained_sub` computed
/// incorrectly — it read `rop->z` before ever assigning it. Here the
/// assignment is explicit: `rop.z := x.z - y.z * Zstar^delta`.
fn wire_sub<M: Mmap>(obf: &LinObfuscation<M>, x: Wire<M>, y: Wire<M>) -> WireResult<M> {
    let same_r_level = x.r.ix.eq_level(&y.r.ix);
    let r = x.r.mul(&y.r, &obf.pp)?;
    if x.d <= y.d {
        let delta = y.d - x.d;
        let z = if same_r_level {
            if delta == 0 {
                x.z.sub(&y.z, &obf.pp)?
            } else {
                raise_by_zstar(&x.z, delta, &obf.zstar, &obf.pp)?.sub(&y.z, &obf.pp)?
            }
        } else {
            let xzyr = x.z.mul(&y.r, &obf.pp)?;
            let xzyr_raised = raise_by_zstar(&xzyr, delta, &obf.zstar, &obf.pp)?;
            let yzxr = y.z.mul(&x.r, &obf.pp)?;
            xzyr_raised.sub(&yzxr, &obf.pp)?
        };
        Ok(Wire {
            r,
            z,
            d: y.d,
            provenance: Provenance::Owned,
        })
    } else {
        let delta = x.d - y.d;
        let z = if same_r_level {
            if delta == 0 {
                x.z.sub(&y.z, &obf.pp)?
            } else {
                let y_raised = raise_by_zstar(&y.z, delta, &obf.zstar, &obf.pp)?;
                x.z.sub(&y_raised, &obf.pp)?
            }
        } else {
            let xzyr = x.z.mul(&y.r, &obf.pp)?;
            let yzxr = y.z.mul(&x.r, &obf.pp)?;
            let yzxr_raised = raise_by_zstar(&yzxr, delta, &obf.zstar, &obf.pp)?;
            xzyr.sub(&yzxr_raised, &obf.pp)?
        };
        Ok(Wire {
            r,
            z,
            d: x.d,
            provenance: Provenance::Owned,
        })
    }
}

/// Evaluates `circuit` under `inputs` against a LIN obfuscation, returning
/// one zero-test bit (and realized degree, for diagnostics) per output.
///
/// Every gate — leaves included — is scheduled through the shared pool
/// driver (`pool::run_dag`), uniformly with `obf::lz::evaluate`. The
/// original evaluator instead enqueued only leaf refs onto the worker pool
/// and walked internal gates outside of it, leaving `nthreads` partially
/// unused; that asymmetry is not replicated here.
pub fn evaluate<M: Mmap>(
    obf: &LinObfuscation<M>,
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

    let compute = |r: GateRef, get_dep: &dyn Fn(GateRef) -> WireResult<M>| -> WireResult<M> {
        match circuit.gate(r) {
            GateKind::Input(id) => {
                let (k, j) = sym.chunker(*id);
                let s = syms[k];
                Ok(Wire {
                    r: obf.rks[k][s].clone(),
                    z: obf.zksj[k][s][j].clone(),
                    d: 0,
                    provenance: Provenance::Borrowed,
                })
            }
            GateKind::Const(idx) => Ok(Wire {
                r: obf.rc.clone(),
                z: obf.zcj[*idx].clone(),
                d: 0,
                provenance: Provenance::Borrowed,
            }),
            GateKind::Set(x) => get_dep(*x),
            GateKind::Mul(x, y) => {
                let wx = get_dep(*x)?;
                let wy = get_dep(*y)?;
                wire_mul(obf, &wx, &wy)
            }
            GateKind::Add(x, y) => {
                let wx = get_dep(*x)?;
                let wy = get_dep(*y)?;
                wire_add(obf, wx, wy)
            }
            GateKind::Sub(x, y) => {
                let wx = get_dep(*x)?;
                let wy = get_dep(*y)?;
                wire_sub(obf, wx, wy)
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
        let finalize = (|| -> Result<Wire<M>> {
            let mut acc = acc;
            for k in 0..sym.c {
                let s = syms[k];
                let hat = hat_wire(&obf.rhatkso[k][s][o], &obf.zhatkso[k][s][o]);
                acc = wire_mul(obf, &acc, &hat)?;
            }
            let hat_o = hat_wire(&obf.rhato[o], &obf.zhato[o]);
            acc = wire_mul(obf, &acc, &hat_o)?;
            let baro = Wire {
                r: obf.rbaro[o].clone(),
                z: obf.zbaro[o].clone(),
                d: obf.params.d,
                provenance: Provenance::Borrowed,
            };
            wire_sub(obf, acc, baro)
        })();

        match finalize {
            Ok(w) => match w.z.is_zero(&obf.pp) {
                Ok(is_zero) => {
                    rop[o] = is_zero;
                    kappas[o] = w.z.degree();
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
        max_npowers: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmap::dummy::DummyMmap;
    use crate::params::SymbolParams;
    use crate::telemetry::NullTelemetry;

    fn minimal_obf(
        pp: <DummyMmap as Mmap>::PublicParams,
        zstar: Encoding<DummyMmap, Level>,
    ) -> LinObfuscation<DummyMmap> {
        LinObfuscation {
            pp,
            params: LinParams {
                sym: SymbolParams {
                    c: 1,
                    ell: 1,
                    q: 2,
                    sigma: false,
                },
                m: 0,
                gamma: 0,
                d: 0,
            },
            rc: zstar.clone(),
            zstar,
            rks: vec![],
            zksj: vec![],
            zcj: vec![],
            rhatkso: vec![],
            zhatkso: vec![],
            rhato: vec![],
            zhato: vec![],
            rbaro: vec![],
            zbaro: vec![],
        }
    }

    #[test]
    fn wire_constrained_sub_high_degree_branch_is_explicit_not_uninitialized() {
        let (sk, pp) =
            DummyMmap::keys_with_moduli(vec![BigUint::from(97u32), BigUint::from(101u32)]);
        let lvl = Level::vks(1, 1, 0, 0);
        let zstar: Encoding<DummyMmap, Level> = Encoding::encode(
            &sk,
            &[BigUint::from(5u32), BigUint::from(7u32)],
            Level::vstar(1, 1),
        );

        let x = Wire {
            r: Encoding::encode(&sk, &[BigUint::from(2u32), BigUint::from(3u32)], lvl.clone()),
            z: Encoding::encode(&sk, &[BigUint::from(10u32), BigUint::from(20u32)], lvl.clone()),
            d: 2,
            provenance: Provenance::Owned,
        };
        let y = Wire {
            r: Encoding::encode(&sk, &[BigUint::from(4u32), BigUint::from(5u32)], lvl.clone()),
            z: Encoding::encode(&sk, &[BigUint::from(3u32), BigUint::from(4u32)], lvl),
            d: 0,
            provenance: Provenance::Owned,
        };

        let obf = minimal_obf(pp, zstar);
        let result = wire_sub(&obf, x, y).unwrap();

        assert_eq!(result.d, 2);
        // y.z * Zstar^2 = [3*25, 4*49] mod [97,101] = [75, 95];
        // x.z - that = [10-75, 20-95] mod [97,101] = [32, 26].
        assert_eq!(
            result.z.ct.reveal(),
            &[BigUint::from(32u32), BigUint::from(26u32)]
        );
    }

    #[test]
    fn wire_add_degree_is_max_of_operands() {
        let (sk, pp) =
            DummyMmap::keys_with_moduli(vec![BigUint::from(11u32), BigUint::from(13u32)]);
        let lvl = Level::vks(1, 1, 0, 0);
        let zstar: Encoding<DummyMmap, Level> =
            Encoding::encode(&sk, &[BigUint::from(2u32), BigUint::from(3u32)], Level::vstar(1, 1));
        let x = Wire {
            r: Encoding::encode(&sk, &[BigUint::from(1u32), BigUint::from(1u32)], lvl.clone()),
            z: Encoding::encode(&sk, &[BigUint::from(1u32), BigUint::from(1u32)], lvl.clone()),
            d: 0,
            provenance: Provenance::Owned,
        };
        let y = Wire {
            r: Encoding::encode(&sk, &[BigUint::from(1u32), BigUint::from(1u32)], lvl.clone()),
            z: Encoding::encode(&sk, &[BigUint::from(1u32), BigUint::from(1u32)], lvl),
            d: 3,
            provenance: Provenance::Owned,
        };
        let obf = minimal_obf(pp, zstar);
        let sum = wire_add(&obf, x, y).unwrap();
        assert_eq!(sum.d, 3);
    }

    #[test]
    fn obfuscate_produces_correctly_shaped_tables() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([9u8; 32]);
        let mut circuit = Circuit::new(2, vec![1]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let c0 = circuit.constant(0);
        let t = circuit.mul(x0, x1);
        let o = circuit.add(t, c0);
        circuit.mark_output(o);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 8, 1, &mut rng).unwrap();
        assert_eq!(obf.rks.len(), 2);
        assert_eq!(obf.rks[0].len(), 2);
        assert_eq!(obf.zksj[0][0].len(), 1);
        assert_eq!(obf.zcj.len(), 1);
        assert_eq!(obf.rhatkso.len(), 2);
        assert_eq!(obf.rhatkso[0][0].len(), 1);
        assert_eq!(obf.rbaro.len(), 1);
    }

    #[test]
    fn evaluate_runs_end_to_end_without_error() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([11u8; 32]);
        let mut circuit = Circuit::new(2, vec![]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let o = circuit.mul(x0, x1);
        circuit.mark_output(o);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 8, 1, &mut rng).unwrap();
        let report = evaluate(&obf, &circuit, &[true, false], 2, &NullTelemetry).unwrap();
        assert_eq!(report.rop.len(), 1);
        assert_eq!(report.kappas.len(), 1);
    }

    fn bits_to_i64(bits: &[bool]) -> Vec<i64> {
        bits.iter().map(|&b| b as i64).collect()
    }

    /// Every scenario's oracle: `rop[o] == (C(x)[o] == 0)` against the
    /// circuit's own exact-integer evaluation (spec.md §8).
    fn assert_matches_plain(obf: &LinObfuscation<DummyMmap>, circuit: &Circuit, inputs: &[bool]) {
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
        let mut rng = AesRng::from_seed([30u8; 32]);
        let mut circuit = Circuit::new(1, vec![]);
        let x0 = circuit.input(0);
        circuit.mark_output(x0);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 8, 1, &mut rng).unwrap();
        assert_matches_plain(&obf, &circuit, &[false]);
        assert_matches_plain(&obf, &circuit, &[true]);
    }

    #[test]
    fn scenario_two_bit_and_in_binary_mode() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([31u8; 32]);
        let mut circuit = Circuit::new(2, vec![]);
        let x0 = circuit.input(0);
        let x1 = circuit.input(1);
        let o = circuit.mul(x0, x1);
        circuit.mark_output(o);

        let obf = obfuscate(&DummyMmap, &circuit, 2, false, 8, 1, &mut rng).unwrap();
        for a in [false, true] {
            for b in [false, true] {
                assert_matches_plain(&obf, &circuit, &[a, b]);
            }
        }
    }

    #[test]
    fn scenario_three_variable_xor() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([32u8; 32]);
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

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 8, 1, &mut rng).unwrap();
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
        let mut rng = AesRng::from_seed([33u8; 32]);
        let mut circuit = Circuit::new(1, vec![5]);
        let x0 = circuit.input(0);
        let c0 = circuit.constant(0);
        let added = circuit.add(x0, c0);
        circuit.mark_output(added);

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 8, 1, &mut rng).unwrap();
        assert_matches_plain(&obf, &circuit, &[false]);

        let mut extended = Circuit::new(1, vec![5]);
        let x0e = extended.input(0);
        let c0e = extended.constant(0);
        let added_e = extended.add(x0e, c0e);
        let subbed = extended.sub(added_e, c0e);
        extended.mark_output(subbed);

        let mut rng2 = AesRng::from_seed([34u8; 32]);
        let obf2 = obfuscate(&DummyMmap, &extended, 1, false, 8, 1, &mut rng2).unwrap();
        assert_matches_plain(&obf2, &extended, &[false]);
    }

    #[test]
    fn scenario_multi_output_on_distinct_symbols() {
        use rand_core::SeedableRng;
        let mut rng = AesRng::from_seed([35u8; 32]);
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

        let obf = obfuscate(&DummyMmap, &circuit, 1, false, 8, 1, &mut rng).unwrap();
        assert_matches_plain(&obf, &circuit, &[true, false, true]);
        assert_matches_plain(&obf, &circuit, &[false, true, true]);
    }
}
