//! Boolean constraint propagation.
//!
//! Drains a work queue of newly-assigned literals, looking up each
//! literal's occurrence list to find clauses that might now be unit or
//! conflicting, and re-derives each clause's status from
//! `FormulaStore::clause_status` after every assignment — a counter-based
//! classification rather than two-watched-literals.

use std::collections::VecDeque;

use crate::{
    clause::{ClauseId, ClauseStatus},
    formula::FormulaStore,
    variable::Literal,
};

/// Distinguishes why propagation is being run, mirroring the three
/// `unit_resolution` entry points. The engine's algorithm is
/// identical in all three cases; the mode only affects how the caller seeds
/// the initial work queue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PropagationMode {
    /// The very first call, before any literal has been decided.
    FirstTime,
    /// Immediately after a new decision was pushed.
    AfterDecidingLiteral,
    /// Immediately after a learned clause was asserted.
    AfterAssertingClause,
}

/// Drains a work queue of newly-true literals, applying unit propagation
/// until fixpoint or conflict.
///
/// Reused across calls so its internal queue never needs reallocating.
#[derive(Debug, Default)]
pub struct PropagationEngine {
    queue: VecDeque<Literal>,
}

impl PropagationEngine {
    pub fn new() -> Self {
        Self { queue: VecDeque::new() }
    }

    /// Runs BCP to fixpoint, starting from `seed` (freshly assigned, already
    /// recorded on the trail and in the formula store).
    ///
    /// On success, every additionally implied literal has been pushed onto
    /// `trail`'s implied sequence and recorded in `store`. On conflict,
    /// returns the conflicting clause; the literals implied before the
    /// conflict was found remain applied (the caller resolves before
    /// undoing).
    pub fn propagate(
        &mut self,
        store: &mut FormulaStore,
        trail: &mut crate::trail::Trail,
        seed: Literal,
        mode: PropagationMode,
    ) -> Result<(), ClauseId> {
        log::trace!("propagate: mode={:?} seed={:?}", mode, seed.index());
        self.queue.clear();
        self.queue.push_back(seed);
        self.drain(store, trail)
    }

    /// Runs BCP to fixpoint with no particular seed literal, scanning every
    /// original clause for ones that are already unit under an empty
    /// assignment. Used for the very first call to unit resolution, before
    /// any literal has been decided.
    pub fn propagate_initial(
        &mut self,
        store: &mut FormulaStore,
        trail: &mut crate::trail::Trail,
    ) -> Result<(), ClauseId> {
        log::trace!("propagate_initial: scanning {} original clauses", store.clause_count());
        self.queue.clear();
        let ids: Vec<ClauseId> = store.original_clause_ids().collect();
        for id in ids {
            if let ClauseStatus::Unit(forced) = store.clause_status(id) {
                if store.literal_decision_level(forced) > 0 {
                    continue
                }
                let level = trail.current_level();
                store.assign_literal(forced, level, Some(id));
                trail.push_implied(forced);
                self.queue.push_back(forced);
            }
        }
        self.drain(store, trail)
    }

    fn drain(&mut self, store: &mut FormulaStore, trail: &mut crate::trail::Trail) -> Result<(), ClauseId> {
        while let Some(lit) = self.queue.pop_front() {
            let candidates = store.var_occurrence_list(lit.variable()).to_vec();
            for id in candidates {
                match store.clause_status(id) {
                    ClauseStatus::Conflicting => {
                        log::debug!("conflict in clause {}", id.index());
                        return Err(id)
                    }
                    ClauseStatus::Unit(forced) => {
                        let level = trail.current_level();
                        store.assign_literal(forced, level, Some(id));
                        trail.push_implied(forced);
                        log::trace!("implied {:?} via clause {}", forced.index(), id.index());
                        self.queue.push_back(forced);
                    }
                    ClauseStatus::Subsumed | ClauseStatus::Pending => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{trail::Trail, variable::Variable};

    fn lit(i: u32) -> Literal {
        Variable::from_index(i).unwrap().pos_literal()
    }

    fn store_with_vars(n: u32) -> FormulaStore {
        let mut store = FormulaStore::default();
        store.register_variables(n).unwrap();
        store
    }

    #[test]
    fn unit_propagation_chains_through_implications() {
        // (¬x1 ∨ x2) ∧ (¬x2 ∨ x3): deciding x1 should force x2 then x3.
        let mut store = store_with_vars(3);
        let v1 = Variable::from_index(1).unwrap();
        let v2 = Variable::from_index(2).unwrap();
        let v3 = Variable::from_index(3).unwrap();
        store.add_original_clause(vec![v1.neg_literal(), v2.pos_literal()]).unwrap();
        store.add_original_clause(vec![v2.neg_literal(), v3.pos_literal()]).unwrap();
        store.freeze_cnf_occurrences();

        let mut trail = Trail::new();
        let level = trail.push_decision(v1.pos_literal());
        store.assign_literal(v1.pos_literal(), level, None);

        let mut engine = PropagationEngine::new();
        engine.propagate(&mut store, &mut trail, v1.pos_literal(), PropagationMode::AfterDecidingLiteral).unwrap();

        let implied: Vec<_> = trail.implied_literals().collect();
        assert_eq!(implied, vec![v2.pos_literal(), v3.pos_literal()]);
    }

    #[test]
    fn conflicting_unit_clauses_report_the_conflict() {
        let mut store = store_with_vars(1);
        let v1 = Variable::from_index(1).unwrap();
        store.add_original_clause(vec![v1.pos_literal()]).unwrap();
        let conflict_id = store.add_original_clause(vec![v1.neg_literal()]).unwrap();
        store.freeze_cnf_occurrences();

        let mut trail = Trail::new();
        let level = trail.push_decision(v1.pos_literal());
        store.assign_literal(v1.pos_literal(), level, None);

        let mut engine = PropagationEngine::new();
        let result = engine.propagate(&mut store, &mut trail, v1.pos_literal(), PropagationMode::AfterDecidingLiteral);
        assert_eq!(result, Err(conflict_id));
    }

    #[test]
    fn initial_propagation_finds_unit_clauses_with_no_decision() {
        // (x1) ∧ (¬x1 ∨ x2): x1 is already unit before any decision is made.
        let mut store = store_with_vars(2);
        let v1 = Variable::from_index(1).unwrap();
        let v2 = Variable::from_index(2).unwrap();
        store.add_original_clause(vec![v1.pos_literal()]).unwrap();
        store.add_original_clause(vec![v1.neg_literal(), v2.pos_literal()]).unwrap();
        store.freeze_cnf_occurrences();

        let mut trail = Trail::new();
        let mut engine = PropagationEngine::new();
        engine.propagate_initial(&mut store, &mut trail).unwrap();

        let implied: Vec<_> = trail.implied_literals().collect();
        assert_eq!(implied, vec![v1.pos_literal(), v2.pos_literal()]);
    }
}
