//! Conflict analysis: turning a conflicting clause into a learned, asserting
//! clause.
//!
//! Keeps a reusable `seen` bitmap plus a list of touched entries, so
//! resetting after each analysis is O(touched) rather than O(n), and
//! BFS-resolves the conflict through each literal's reason clause. The cut
//! stops at every decision literal or every literal from an earlier
//! decision level (a non-strict asserting cut, not strict first-UIP) — a
//! literal already seen from resolving its own reason clause naturally
//! skips itself when that reason clause is scanned, so no special-casing of
//! the asserting literal is needed.

use std::collections::VecDeque;

use crate::{clause::ClauseId, formula::FormulaStore, trail::Trail, variable::Literal};

/// The result of [`ConflictAnalyzer::analyze`]: a new clause and the level
/// to backtrack to before asserting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedClause {
    pub literals: Vec<Literal>,
    /// The level at which the clause becomes unit once decisions above it
    /// are undone.
    pub assertion_level: u32,
}

/// Resolves a conflicting clause back to a learned clause, reusing its
/// `seen` bitmap and touched list across calls.
#[derive(Debug, Default)]
pub struct ConflictAnalyzer {
    seen: Vec<bool>,
    touched: Vec<usize>,
}

impl ConflictAnalyzer {
    pub fn new() -> Self {
        Self { seen: Vec::new(), touched: Vec::new() }
    }

    fn ensure_capacity(&mut self, var_count: u32) {
        if (self.seen.len() as u32) < var_count {
            self.seen.resize(var_count as usize, false);
        }
    }

    /// Analyzes the conflicting clause `conflict`, returning the learned
    /// clause and its assertion level.
    pub fn analyze(&mut self, store: &FormulaStore, trail: &Trail, conflict: ClauseId) -> LearnedClause {
        self.ensure_capacity(store.var_count());
        debug_assert!(self.touched.is_empty(), "analyzer not reset from a previous run");

        let level = trail.current_level();
        let mut queue: VecDeque<Literal> = store.clause_literals(conflict).iter().copied().collect();
        let mut learned = Vec::new();
        // The trail never drops below level 1, so that is the floor for the
        // assertion level too: a clause with nothing left to resolve but the
        // conflict-level literal becomes unit as soon as every decision is
        // undone.
        let mut assertion_level = 1u32;

        while let Some(clause_lit) = queue.pop_front() {
            let var_idx = clause_lit.variable().index() as usize - 1;
            if self.seen[var_idx] {
                continue
            }
            self.seen[var_idx] = true;
            self.touched.push(var_idx);

            let true_lit = !clause_lit;
            let lit_level = store.literal_decision_level(true_lit);
            match store.literal_reason(true_lit) {
                Some(reason) if lit_level == level => {
                    queue.extend(store.clause_literals(reason).iter().copied());
                }
                _ => {
                    learned.push(clause_lit);
                    if lit_level > 0 && lit_level != level && lit_level > assertion_level {
                        assertion_level = lit_level;
                    }
                }
            }
        }

        for var_idx in self.touched.drain(..) {
            self.seen[var_idx] = false;
        }

        log::debug!(
            "learned clause of size {} with assertion level {}",
            learned.len(),
            assertion_level
        );
        LearnedClause { literals: learned, assertion_level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{propagate::{PropagationEngine, PropagationMode}, variable::Variable};

    fn lit(i: u32) -> Literal {
        Variable::from_index(i).unwrap().pos_literal()
    }

    fn neg(i: u32) -> Literal {
        Variable::from_index(i).unwrap().neg_literal()
    }

    #[test]
    fn analysis_learns_a_clause_forbidding_the_conflicting_combination() {
        // (¬x1 ∨ x2) ∧ (¬x1 ∨ x3) ∧ (¬x2 ∨ ¬x3): deciding x1 forces x2 and x3,
        // which conflict. The learned clause must at least forbid x1 again.
        let mut store = FormulaStore::default();
        store.register_variables(3).unwrap();
        store.add_original_clause(vec![neg(1), lit(2)]).unwrap();
        store.add_original_clause(vec![neg(1), lit(3)]).unwrap();
        store.add_original_clause(vec![neg(2), neg(3)]).unwrap();
        store.freeze_cnf_occurrences();

        let mut trail = Trail::new();
        let level = trail.push_decision(lit(1));
        store.assign_literal(lit(1), level, None);

        let mut engine = PropagationEngine::new();
        let conflict = engine.propagate(&mut store, &mut trail, lit(1), PropagationMode::AfterDecidingLiteral).unwrap_err();

        let mut analyzer = ConflictAnalyzer::new();
        let learned = analyzer.analyze(&store, &trail, conflict);

        assert!(learned.literals.contains(&neg(1)));
        assert_eq!(learned.assertion_level, 1, "everything resolves back to before the level-1 decision");
    }
}
