//! Parameter derivation: symbol chunking, alphabet sizing, and per-scheme
//! degree-bound/toplevel derivation from a [`Circuit`] (spec.md §4.4).

use crate::circuit::Circuit;
use crate::error::{ObfError, Result};
use crate::index_set::{IndexSet, Slot};

/// Symbol chunking shared by both schemes: `ninputs = c * ell` bits are
/// grouped into `c` symbols of `ell` bits each, each symbol taking one of
/// `q` alphabet values.
#[derive(Debug, Clone)]
pub struct SymbolParams {
    pub c: usize,
    pub ell: usize,
    pub q: usize,
    pub sigma: bool,
}

impl SymbolParams {
    /// Derives symbol chunking for `ninputs` true input bits (constants
    /// are not part of this count — they form their own strand, see
    /// `SPEC_FULL.md` §3).
    pub fn derive(ninputs: usize, ell: usize, sigma: bool) -> Result<Self> {
        if ell == 0 || ninputs % ell != 0 {
            return Err(ObfError::MalformedInput(format!(
                "ninputs ({ninputs}) % symlen ({ell}) != 0"
            )));
        }
        let c = ninputs / ell;
        let q = if sigma { ell } else { 1usize << ell };
        Ok(SymbolParams { c, ell, q, sigma })
    }

    /// Bijective `chunker`: bit-id -> (symbol k, bit j). In-order chunking,
    /// grounded in `lz/obf_params.c`'s `chunker_in_order`.
    pub fn chunker(&self, id: usize) -> (usize, usize) {
        (id / self.ell, id % self.ell)
    }

    /// Inverse of [`SymbolParams::chunker`].
    pub fn rchunker(&self, k: usize, j: usize) -> usize {
        k * self.ell + j
    }

    /// Reduces one symbol's `ell` input bits to its alphabet value,
    /// failing with `MalformedInput` if `sigma` mode is not one-hot.
    pub fn symbol_value(&self, bits: &[bool]) -> Result<usize> {
        debug_assert_eq!(bits.len(), self.ell);
        if self.sigma {
            let ones: Vec<usize> = bits
                .iter()
                .enumerate()
                .filter(|(_, &b)| b)
                .map(|(i, _)| i)
                .collect();
            if ones.len() != 1 {
                return Err(ObfError::MalformedInput(
                    "sigma-mode symbol is not one-hot".into(),
                ));
            }
            Ok(ones[0])
        } else {
            let mut v = 0usize;
            for (j, &b) in bits.iter().enumerate() {
                if b {
                    v |= 1 << j;
                }
            }
            Ok(v)
        }
    }

    /// Derives `sym[0..c)` from a full input-bit vector.
    pub fn input_symbols(&self, inputs: &[bool]) -> Result<Vec<usize>> {
        if inputs.len() != self.c * self.ell {
            return Err(ObfError::MalformedInput(format!(
                "expected {} input bits, got {}",
                self.c * self.ell,
                inputs.len()
            )));
        }
        (0..self.c)
            .map(|k| {
                let bits: Vec<bool> = (0..self.ell).map(|j| inputs[self.rchunker(k, j)]).collect();
                self.symbol_value(&bits)
            })
            .collect()
    }
}

/// Derived parameters for the LIN scheme.
#[derive(Debug, Clone)]
pub struct LinParams {
    pub sym: SymbolParams,
    pub m: usize,
    pub gamma: usize,
    /// `D = acirc_max_const_degree(C)`.
    pub d: u32,
}

/// Derives LIN parameters from a circuit.
pub fn derive_lin(circuit: &Circuit, ell: usize, sigma: bool) -> Result<LinParams> {
    let sym = SymbolParams::derive(circuit.ninputs(), ell, sigma)?;
    Ok(LinParams {
        m: circuit.nconsts(),
        gamma: circuit.noutputs(),
        d: circuit.max_const_degree(),
        sym,
    })
}

/// Derived parameters for the LZ scheme.
#[derive(Debug, Clone)]
pub struct LzParams {
    pub sym: SymbolParams,
    pub m: usize,
    pub gamma: usize,
    pub npowers: usize,
    pub cdmax: u32,
    pub vdmax: Vec<u32>,
    /// `cd[o]`, per output.
    pub cd: Vec<u32>,
    /// `vd[k][o]`, per symbol then output.
    pub vd: Vec<Vec<u32>>,
}

/// Derives LZ parameters from a circuit (spec.md §4.2/§4.4, confirmed
/// against `lz/obf_params.c`'s `_op_new`/`obf_params_nzs`).
pub fn derive_lz(circuit: &Circuit, ell: usize, sigma: bool, npowers: usize) -> Result<LzParams> {
    let sym = SymbolParams::derive(circuit.ninputs(), ell, sigma)?;
    let chunker = move |id: usize| sym.chunker(id).0;

    let cd: Vec<u32> = circuit.outputs().iter().map(|&o| circuit.const_degree(o)).collect();
    let cdmax = cd.iter().copied().max().unwrap_or(0);

    let vd: Vec<Vec<u32>> = (0..sym.c)
        .map(|k| {
            circuit
                .outputs()
                .iter()
                .map(|&o| circuit.var_degree(o, k, &chunker))
                .collect()
        })
        .collect();
    let vdmax: Vec<u32> = vd
        .iter()
        .map(|row| row.iter().copied().max().unwrap_or(0))
        .collect();

    Ok(LzParams {
        m: circuit.nconsts(),
        gamma: circuit.noutputs(),
        npowers,
        cdmax,
        vdmax,
        cd,
        vd,
        sym,
    })
}

/// The LZ toplevel index set: `{ Y=cdmax, S(k,s)=vdmax[k], Z(k)=1, W(k)=1 }`
/// for every symbol `k` and alphabet value `s` — confirmed authoritative by
/// `lz/obf_params.c`'s `obf_params_new_toplevel`, which sets `ix_w_set` for
/// every input symbol (resolving the apparent omission in the inline
/// `_obfuscate` construction, which is not the canonical definition).
pub fn lz_toplevel(p: &LzParams) -> IndexSet {
    let mut ix = IndexSet::with_y(p.sym.c, p.sym.q, p.cdmax);
    for k in 0..p.sym.c {
        for s in 0..p.sym.q {
            ix.set(Slot::S(k, s), p.vdmax[k]);
        }
        ix.set(Slot::Z(k), 1);
        ix.set(Slot::W(k), 1);
    }
    ix
}

/// `zhat[k][s][o]`'s index set (spec.md §4.2 step 5).
pub fn zhat_level(p: &LzParams, k: usize, s: usize, o: usize) -> IndexSet {
    let mut ix = IndexSet::zero(p.sym.c, p.sym.q);
    if k == 0 {
        ix.set(Slot::Y, p.cdmax - p.cd[o]);
    }
    for r in 0..p.sym.q {
        let val = if r == s {
            p.vdmax[k] - p.vd[k][o]
        } else {
            p.vdmax[k]
        };
        ix.set(Slot::S(k, r), val);
    }
    ix.set(Slot::Z(k), 1);
    ix.set(Slot::W(k), 1);
    ix
}

/// `what[k][s][o]`'s index set: `W(k)=1` only (spec.md §4.2 step 6;
/// confirmed against `lz/obfuscator.c`, which calls only `ix_w_set` for
/// this table — no `Y`/`S`/`Z` contribution).
pub fn what_level(p: &LzParams, k: usize) -> IndexSet {
    IndexSet::with_w(p.sym.c, p.sym.q, k, 1)
}

/// `Chatstar[o]`'s index set: the toplevel with every `W(k)` zeroed, so
/// that multiplying in one `what[k][sym[k]][o]` per symbol lands exactly
/// on toplevel (spec.md §4.2 step 8; confirmed against
/// `lz/obfuscator.c`'s `Chatstar` construction, which sets `Y`/`S`/`Z` to
/// their full toplevel values but never calls `ix_w_set`).
pub fn chatstar_level(p: &LzParams) -> IndexSet {
    let mut ix = lz_toplevel(p);
    for k in 0..p.sym.c {
        ix.set(Slot::W(k), 0);
    }
    ix
}
