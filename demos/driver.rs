//! A minimal CDCL search loop built on `cdcl-primitives`: decide the
//! lowest-indexed free variable true, propagate, and on conflict analyze,
//! backjump, and learn instead of simply trying the opposite polarity.
//!
//! Reads a `.cnf` file named on the command line and prints `SAT`/`UNSAT`.

use std::{fs, path::PathBuf};

use cdcl_primitives::{PropagationMode, Solver, Variable};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "cdcl-primitives-demo")]
struct Opt {
    /// Path to a DIMACS CNF input file.
    #[structopt(parse(from_os_str))]
    input: PathBuf,
}

fn first_free_variable(solver: &Solver) -> Option<Variable> {
    (1..=solver.var_count())
        .map(|index| solver.index2var(index))
        .find(|&var| !solver.instantiated_var(var))
}

/// Runs unit resolution under `mode`, resolving any conflicts by learning a
/// clause and backjumping, repeating until propagation succeeds with no
/// conflict or the conflict survives at the top decision level.
///
/// Returns `false` if the formula is proven unsatisfiable.
fn propagate_and_resolve_conflicts(solver: &mut Solver, mode: PropagationMode) -> bool {
    let mut mode = mode;
    loop {
        match solver.unit_resolution(mode) {
            Ok(()) => return true,
            Err(conflict) => {
                if solver.decision_level() == 1 {
                    return false
                }
                let learned = solver.analyze_conflict(conflict);
                while solver.decision_level() > learned.assertion_level {
                    solver.undo_unit_resolution();
                    solver.undo_decide_literal();
                }
                let id = solver.assert_clause(learned);
                debug_assert!(solver.at_assertion_level(id));
                mode = PropagationMode::AfterAssertingClause;
            }
        }
    }
}

fn search(solver: &mut Solver) -> bool {
    if !propagate_and_resolve_conflicts(solver, PropagationMode::FirstTime) {
        return false
    }
    loop {
        let var = match first_free_variable(solver) {
            None => return true,
            Some(var) => var,
        };
        solver.decide_literal(solver.pos_literal(var));
        if !propagate_and_resolve_conflicts(solver, PropagationMode::AfterDecidingLiteral) {
            return false
        }
    }
}

fn main() {
    let opt = Opt::from_args();
    let cnf_contents = fs::read(&opt.input).expect("couldn't read provided input .cnf file");
    let mut solver =
        Solver::from_cnf(&mut &cnf_contents[..]).expect("couldn't properly decode provided input .cnf file");

    log::info!("loaded {} variable(s), {} clause(s)", solver.var_count(), solver.clause_count());

    if search(&mut solver) {
        println!("SAT");
    } else {
        println!("UNSAT");
    }
}
