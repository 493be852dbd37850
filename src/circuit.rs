//! A minimal in-memory arithmetic-circuit DAG.
//!
//! This is the narrow stand-in for the arithmetic-circuit front-end that
//! spec.md declares out of scope ("parsing, topological analysis, degree
//! queries, symbolic evaluation `acirc_eval`"): just enough of a DAG type,
//! plus the degree/evaluation queries the two obfuscators actually call,
//! to drive and test the evaluator. A real front-end (parser, optimizer)
//! would produce one of these and is not this crate's concern.

use std::collections::HashMap;
use std::sync::Mutex;

/// Reference to a gate within a [`Circuit`].
pub type GateRef = usize;

/// A single gate.
#[derive(Debug, Clone)]
pub enum GateKind {
    /// The `i`-th circuit input bit.
    Input(usize),
    /// The `i`-th circuit constant.
    Const(usize),
    Add(GateRef, GateRef),
    Sub(GateRef, GateRef),
    Mul(GateRef, GateRef),
    /// Unary passthrough (`SET` in spec.md §3).
    Set(GateRef),
}

/// An arithmetic circuit: a DAG of [`GateKind`]s, a constants vector, an
/// input count, and a list of output refs.
///
/// Degree-query memo tables use `Mutex` rather than `RefCell` so a shared
/// `&Circuit` can cross the pool driver's worker threads (`pool::run_dag`).
#[derive(Debug)]
pub struct Circuit {
    gates: Vec<GateKind>,
    consts: Vec<i64>,
    ninputs: usize,
    outputs: Vec<GateRef>,
    const_degree_memo: Mutex<HashMap<GateRef, u32>>,
    var_degree_memo: Mutex<HashMap<(GateRef, usize), u32>>,
}

impl Circuit {
    pub fn new(ninputs: usize, consts: Vec<i64>) -> Self {
        Circuit {
            gates: Vec::new(),
            consts,
            ninputs,
            outputs: Vec::new(),
            const_degree_memo: Mutex::new(HashMap::new()),
            var_degree_memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn ninputs(&self) -> usize {
        self.ninputs
    }

    pub fn nconsts(&self) -> usize {
        self.consts.len()
    }

    pub fn consts(&self) -> &[i64] {
        &self.consts
    }

    pub fn noutputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn outputs(&self) -> &[GateRef] {
        &self.outputs
    }

    pub fn nrefs(&self) -> usize {
        self.gates.len()
    }

    pub fn gate(&self, r: GateRef) -> &GateKind {
        &self.gates[r]
    }

    fn push(&mut self, g: GateKind) -> GateRef {
        self.gates.push(g);
        self.gates.len() - 1
    }

    pub fn input(&mut self, i: usize) -> GateRef {
        self.push(GateKind::Input(i))
    }

    pub fn constant(&mut self, i: usize) -> GateRef {
        self.push(GateKind::Const(i))
    }

    pub fn add(&mut self, x: GateRef, y: GateRef) -> GateRef {
        self.push(GateKind::Add(x, y))
    }

    pub fn sub(&mut self, x: GateRef, y: GateRef) -> GateRef {
        self.push(GateKind::Sub(x, y))
    }

    pub fn mul(&mut self, x: GateRef, y: GateRef) -> GateRef {
        self.push(GateKind::Mul(x, y))
    }

    pub fn set(&mut self, x: GateRef) -> GateRef {
        self.push(GateKind::Set(x))
    }

    pub fn mark_output(&mut self, r: GateRef) {
        self.outputs.push(r);
    }

    /// Each ref's two dependency refs (leaves have none); used by the
    /// pool driver to build ready-counters and by evaluators to fetch
    /// operand wires.
    pub fn deps(&self, r: GateRef) -> (Option<GateRef>, Option<GateRef>) {
        match self.gates[r] {
            GateKind::Input(_) | GateKind::Const(_) => (None, None),
            GateKind::Set(x) => (Some(x), None),
            GateKind::Add(x, y) | GateKind::Sub(x, y) | GateKind::Mul(x, y) => (Some(x), Some(y)),
        }
    }

    pub fn is_leaf(&self, r: GateRef) -> bool {
        matches!(self.gates[r], GateKind::Input(_) | GateKind::Const(_))
    }

    /// Exact-integer evaluation (no modular reduction): used only by
    /// correctness tests to compute the "ground truth" `C(x)`.
    pub fn eval_plain(&self, inputs: &[i64]) -> Vec<i64> {
        debug_assert_eq!(inputs.len(), self.ninputs);
        let mut vals = vec![0i64; self.gates.len()];
        for (r, gate) in self.gates.iter().enumerate() {
            vals[r] = match gate {
                GateKind::Input(i) => inputs[*i],
                GateKind::Const(i) => self.consts[*i],
                GateKind::Set(x) => vals[*x],
                GateKind::Add(x, y) => vals[*x] + vals[*y],
                GateKind::Sub(x, y) => vals[*x] - vals[*y],
                GateKind::Mul(x, y) => vals[*x] * vals[*y],
            };
        }
        self.outputs.iter().map(|&o| vals[o]).collect()
    }

    /// Modular evaluation over an explicit assignment to inputs and
    /// constants, memoized per-ref. Used by LIN's `ybaro` and LZ's
    /// `Cstar` computations (spec.md §4.2 steps 7/2).
    pub fn eval_mod_memo(
        &self,
        inputs: &[num_bigint::BigInt],
        consts: &[num_bigint::BigInt],
        modulus: &num_bigint::BigInt,
    ) -> Vec<num_bigint::BigInt> {
        use num_bigint::BigInt;
        use num_integer::Integer;
        debug_assert_eq!(inputs.len(), self.ninputs);
        debug_assert_eq!(consts.len(), self.consts.len());
        let mut vals: Vec<BigInt> = vec![BigInt::from(0); self.gates.len()];
        for (r, gate) in self.gates.iter().enumerate() {
            let raw = match gate {
                GateKind::Input(i) => inputs[*i].clone(),
                GateKind::Const(i) => consts[*i].clone(),
                GateKind::Set(x) => vals[*x].clone(),
                GateKind::Add(x, y) => &vals[*x] + &vals[*y],
                GateKind::Sub(x, y) => &vals[*x] - &vals[*y],
                GateKind::Mul(x, y) => &vals[*x] * &vals[*y],
            };
            vals[r] = raw.mod_floor(modulus);
        }
        self.outputs.iter().map(|&o| vals[o].clone()).collect()
    }

    /// Total degree contributed by constants alone to ref `r` (treating
    /// every input as degree 0), memoized.
    pub fn const_degree(&self, r: GateRef) -> u32 {
        if let Some(&d) = self.const_degree_memo.lock().unwrap().get(&r) {
            return d;
        }
        let d = match self.gates[r] {
            GateKind::Input(_) => 0,
            GateKind::Const(_) => 1,
            GateKind::Set(x) => self.const_degree(x),
            GateKind::Add(x, y) | GateKind::Sub(x, y) => {
                self.const_degree(x).max(self.const_degree(y))
            }
            GateKind::Mul(x, y) => self.const_degree(x) + self.const_degree(y),
        };
        self.const_degree_memo.lock().unwrap().insert(r, d);
        d
    }

    /// Total degree contributed by input symbol `k` alone to ref `r`
    /// (every other input/const treated as degree 0), memoized.
    pub fn var_degree(&self, r: GateRef, k: usize, chunker: &dyn Fn(usize) -> usize) -> u32 {
        if let Some(&d) = self.var_degree_memo.lock().unwrap().get(&(r, k)) {
            return d;
        }
        let d = match self.gates[r] {
            GateKind::Input(i) => {
                if chunker(i) == k {
                    1
                } else {
                    0
                }
            }
            GateKind::Const(_) => 0,
            GateKind::Set(x) => self.var_degree(x, k, chunker),
            GateKind::Add(x, y) | GateKind::Sub(x, y) => self
                .var_degree(x, k, chunker)
                .max(self.var_degree(y, k, chunker)),
            GateKind::Mul(x, y) => {
                self.var_degree(x, k, chunker) + self.var_degree(y, k, chunker)
            }
        };
        self.var_degree_memo.lock().unwrap().insert((r, k), d);
        d
    }

    pub fn max_const_degree(&self) -> u32 {
        self.outputs
            .iter()
            .map(|&o| self.const_degree(o))
            .max()
            .unwrap_or(0)
    }

    pub fn max_var_degree(&self, k: usize, chunker: &dyn Fn(usize) -> usize) -> u32 {
        self.outputs
            .iter()
            .map(|&o| self.var_degree(o, k, chunker))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xor3() -> Circuit {
        // x0 + x1 + x2, evaluated mod 2 externally; here plain integer sum
        // suffices for degree/eval smoke tests.
        let mut c = Circuit::new(3, vec![]);
        let x0 = c.input(0);
        let x1 = c.input(1);
        let x2 = c.input(2);
        let s = c.add(x0, x1);
        let s2 = c.add(s, x2);
        c.mark_output(s2);
        c
    }

    #[test]
    fn eval_plain_matches_hand_computation() {
        let c = xor3();
        assert_eq!(c.eval_plain(&[1, 0, 1]), vec![2]);
        assert_eq!(c.eval_plain(&[0, 0, 0]), vec![0]);
    }

    #[test]
    fn const_degree_zero_without_consts() {
        let c = xor3();
        assert_eq!(c.max_const_degree(), 0);
    }

    #[test]
    fn var_degree_is_one_per_symbol_for_linear_circuit() {
        let c = xor3();
        let id = |i: usize| i;
        for k in 0..3 {
            assert_eq!(c.max_var_degree(k, &id), 1);
        }
    }

    #[test]
    fn mul_gate_sums_var_degrees() {
        let mut c = Circuit::new(2, vec![]);
        let x0 = c.input(0);
        let x1 = c.input(1);
        let p = c.mul(x0, x1);
        c.mark_output(p);
        let id = |i: usize| i;
        assert_eq!(c.max_var_degree(0, &id), 1);
        assert_eq!(c.max_var_degree(1, &id), 1);
    }
}
