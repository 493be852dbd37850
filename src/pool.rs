//! The ready-counter-driven parallel DAG driver shared by both obfuscators
//! (spec.md §5). A gate is computed once every dependency it has is
//! computed; a gate with two parents becomes ready exactly when the
//! second-completing parent's atomic fetch-add brings its counter to 2;
//! leaves (no dependencies) are enqueued eagerly.
//!
//! Built over a `rayon::ThreadPool`/`scope`, following the teacher's choice
//! of `rayon` for all parallel work.

use crate::circuit::{Circuit, GateRef};
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

/// Runs `compute` once per ref of `circuit`, in dependency order, using a
/// pool of `nthreads` workers, and returns the computed value for every
/// ref. `compute` receives the ref being computed and a lookup closure for
/// already-computed dependency values.
pub fn run_dag<T, F>(circuit: &Circuit, nthreads: usize, compute: F) -> Vec<T>
where
    T: Clone + Send + Sync,
    F: Fn(GateRef, &dyn Fn(GateRef) -> T) -> T + Send + Sync,
{
    let n = circuit.nrefs();
    let slots: Vec<Mutex<Option<T>>> = (0..n).map(|_| Mutex::new(None)).collect();
    let ready: Vec<AtomicU8> = (0..n).map(|_| AtomicU8::new(0)).collect();

    let mut children: Vec<Vec<GateRef>> = vec![Vec::new(); n];
    for r in 0..n {
        let (a, b) = circuit.deps(r);
        if let Some(a) = a {
            children[a].push(r);
        }
        if let Some(b) = b {
            children[b].push(r);
        }
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(nthreads.max(1))
        .build()
        .expect("failed to build thread pool");

    pool.scope(|s| {
        for r in 0..n {
            if circuit.is_leaf(r) {
                s.spawn(|s| enqueue(r, circuit, &slots, &ready, &children, &compute, s));
            }
        }
    });

    slots
        .into_iter()
        .map(|m| m.into_inner().unwrap().expect("every ref is computed"))
        .collect()
}

fn enqueue<'scope, T, F>(
    r: GateRef,
    circuit: &'scope Circuit,
    slots: &'scope [Mutex<Option<T>>],
    ready: &'scope [AtomicU8],
    children: &'scope [Vec<GateRef>],
    compute: &'scope F,
    s: &rayon::Scope<'scope>,
) where
    T: Clone + Send + Sync,
    F: Fn(GateRef, &dyn Fn(GateRef) -> T) -> T + Send + Sync,
{
    let value = compute(r, &|dep: GateRef| {
        slots[dep]
            .lock()
            .unwrap()
            .clone()
            .expect("dependency must already be computed")
    });
    *slots[r].lock().unwrap() = Some(value);

    for &child in &children[r] {
        let (a, b) = circuit.deps(child);
        let needed: u8 = if a.is_some() && b.is_some() { 2 } else { 1 };
        let prev = ready[child].fetch_add(1, Ordering::AcqRel);
        if prev + 1 == needed {
            s.spawn(move |s2| enqueue(child, circuit, slots, ready, children, compute, s2));
        }
    }
}
