//! Benchmarks unit propagation through a chain of implications.
//!
//! Drives `criterion_group!`/`criterion_main!` over `Solver::from_cnf`, with
//! a single synthetic chain formula generated in-process rather than a
//! fixture corpus read from disk.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cdcl_primitives::{PropagationMode, Solver};

/// Builds a DIMACS CNF chain `(¬x1 ∨ x2) ∧ (¬x2 ∨ x3) ∧ … ∧ (¬x(n-1) ∨ xn)`:
/// deciding `x1` forces every other variable true in one propagation pass.
fn chain_formula(n: u32) -> Vec<u8> {
    let mut dimacs = format!("p cnf {} {}\n", n, n - 1);
    for i in 1..n {
        dimacs.push_str(&format!("-{} {} 0\n", i, i + 1));
    }
    dimacs.into_bytes()
}

fn bench_propagation_chain(c: &mut Criterion) {
    let dimacs = chain_formula(200);
    let mut solver = Solver::from_cnf(&mut &dimacs[..]).expect("chain formula is well-formed");
    let first_literal = solver.pos_literal(solver.index2var(1));

    c.bench_function("propagate chain of 200 implications", |bencher| {
        bencher.iter(|| {
            solver.decide_literal(black_box(first_literal));
            let result = solver.unit_resolution(PropagationMode::AfterDecidingLiteral);
            assert!(result.is_ok());
            solver.undo_unit_resolution();
            solver.undo_decide_literal();
        });
    });
}

criterion_group!(benches, bench_propagation_chain);
criterion_main!(benches);
