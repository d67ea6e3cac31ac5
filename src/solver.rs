//! The public primitive API: the operations a CDCL search loop composes.
//!
//! `Solver` owns the formula store, trail, propagation engine, and conflict
//! analyzer behind a small set of methods. It exposes the lower-level
//! primitives a search loop calls rather than a full `solve` entry point —
//! branching heuristics and backjump orchestration stay with the caller, so
//! `demos/driver.rs` composes `decide_literal`/`unit_resolution`/
//! `assert_clause` itself.

use crate::{
    analyze::{ConflictAnalyzer, LearnedClause},
    clause::{Clause, ClauseId, ClauseStatus},
    error::Error,
    formula::FormulaStore,
    propagate::{PropagationEngine, PropagationMode},
    trail::Trail,
    variable::{Literal, Variable},
};

/// Holds one CNF formula, its learned clauses, and the current partial
/// assignment, and exposes the primitive operations the crate describes.
#[derive(Debug, Default)]
pub struct Solver {
    store: FormulaStore,
    trail: Trail,
    engine: PropagationEngine,
    analyzer: ConflictAnalyzer,
    last_decision: Option<Literal>,
    last_asserted: Option<ClauseId>,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a DIMACS CNF stream directly into a ready-to-use solver.
    pub fn from_cnf<I>(input: &mut I) -> Result<Self, cnf_parser::Error<Error>>
    where
        I: cnf_parser::Input,
    {
        let mut builder = crate::builder::SolverBuilder::new();
        cnf_parser::parse_cnf(input, &mut builder)?;
        Ok(builder.finalize())
    }

    pub(crate) fn register_variables(&mut self, additional: u32) -> Result<(), Error> {
        self.store.register_variables(additional)
    }

    pub(crate) fn reserve_clauses(&mut self, additional: usize) {
        self.store.reserve_clauses(additional);
    }

    pub(crate) fn add_original_clause(&mut self, literals: Vec<Literal>) -> Result<ClauseId, Error> {
        self.store.add_original_clause(literals)
    }

    pub(crate) fn freeze_cnf_occurrences(&mut self) {
        self.store.freeze_cnf_occurrences();
    }

    // -- Structural accessors ------------------------------------------------

    pub fn var_count(&self) -> u32 {
        self.store.var_count()
    }

    pub fn clause_count(&self) -> u32 {
        self.store.clause_count()
    }

    pub fn learned_count(&self) -> u32 {
        self.store.learned_count()
    }

    pub fn index2var(&self, index: u32) -> Variable {
        self.store.index2var(index)
    }

    pub fn index2literal(&self, index: i32) -> Literal {
        self.store.index2literal(index)
    }

    pub fn pos_literal(&self, var: Variable) -> Literal {
        self.store.pos_literal(var)
    }

    pub fn neg_literal(&self, var: Variable) -> Literal {
        self.store.neg_literal(var)
    }

    pub fn opposite(&self, lit: Literal) -> Literal {
        self.store.opposite(lit)
    }

    pub fn clause(&self, id: ClauseId) -> &Clause {
        self.store.clause(id)
    }

    pub fn clause_literals(&self, id: ClauseId) -> &[Literal] {
        self.store.clause_literals(id)
    }

    pub fn clause_size(&self, id: ClauseId) -> usize {
        self.store.clause_size(id)
    }

    pub fn clause_status(&self, id: ClauseId) -> ClauseStatus {
        self.store.clause_status(id)
    }

    pub fn original_clause_ids(&self) -> impl Iterator<Item = ClauseId> + '_ {
        self.store.original_clause_ids()
    }

    /// Iterates the identifiers of every learned clause, in assertion order.
    pub fn learned_clause_ids(&self) -> impl Iterator<Item = ClauseId> + '_ {
        self.store.learned_clause_ids()
    }

    pub fn var_occurrences(&self, var: Variable) -> u32 {
        self.store.var_occurrences(var)
    }

    pub fn clause_of_var(&self, index: usize, var: Variable) -> ClauseId {
        self.store.clause_of_var(index, var)
    }

    pub fn irrelevant_var(&self, var: Variable) -> bool {
        self.store.irrelevant_var(var)
    }

    pub fn instantiated_var(&self, var: Variable) -> bool {
        self.store.instantiated_var(var)
    }

    pub fn implied_literal(&self, lit: Literal) -> bool {
        self.store.implied_literal(lit)
    }

    pub fn literal_decision_level(&self, lit: Literal) -> u32 {
        self.store.literal_decision_level(lit)
    }

    pub fn is_marked_var(&self, var: Variable) -> bool {
        self.store.is_marked_var(var)
    }

    pub fn mark_var(&mut self, var: Variable) {
        self.store.mark_var(var)
    }

    pub fn unmark_var(&mut self, var: Variable) {
        self.store.unmark_var(var)
    }

    pub fn is_marked_clause(&self, id: ClauseId) -> bool {
        self.store.is_marked_clause(id)
    }

    pub fn mark_clause(&mut self, id: ClauseId) {
        self.store.mark_clause(id)
    }

    pub fn unmark_clause(&mut self, id: ClauseId) {
        self.store.unmark_clause(id)
    }

    /// The current decision level (starts at `1`).
    pub fn decision_level(&self) -> u32 {
        self.trail.current_level()
    }

    pub fn decided_literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.trail.decided_literals()
    }

    pub fn implied_literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.trail.implied_literals()
    }

    // -- Decision and propagation primitives ----------------------------------

    /// Decides `lit` true, bumping the decision level. Does not propagate;
    /// call [`Self::unit_resolution`] with [`PropagationMode::AfterDecidingLiteral`]
    /// next.
    pub fn decide_literal(&mut self, lit: Literal) {
        let level = self.trail.push_decision(lit);
        self.store.assign_literal(lit, level, None);
        self.last_decision = Some(lit);
        log::debug!("decide {:?} at level {}", lit.index(), level);
    }

    /// Undoes the most recent decision. The caller must have already undone
    /// every literal implied since that decision with
    /// [`Self::undo_unit_resolution`].
    pub fn undo_decide_literal(&mut self) -> Literal {
        let lit = self.trail.pop_decision();
        let level = self.trail.current_level();
        self.store.unassign_literal(lit, level);
        self.trail.lower_level();
        log::debug!("undo decide {:?}, back to level {}", lit.index(), self.trail.current_level());
        lit
    }

    /// Runs unit resolution in the given mode.
    ///
    /// # Panics
    ///
    /// Panics if `mode` is [`PropagationMode::AfterDecidingLiteral`] with no
    /// pending decision, or [`PropagationMode::AfterAssertingClause`] with no
    /// pending asserted clause, or if the asserted clause is not actually
    /// unit at the current level.
    pub fn unit_resolution(&mut self, mode: PropagationMode) -> Result<(), ClauseId> {
        match mode {
            PropagationMode::FirstTime => self.engine.propagate_initial(&mut self.store, &mut self.trail),
            PropagationMode::AfterDecidingLiteral => {
                let seed = self.last_decision.expect("unit_resolution(AfterDecidingLiteral) with no pending decision");
                self.engine.propagate(&mut self.store, &mut self.trail, seed, mode)
            }
            PropagationMode::AfterAssertingClause => {
                let id = self.last_asserted.expect("unit_resolution(AfterAssertingClause) with no asserted clause");
                let forced = match self.store.clause_status(id) {
                    ClauseStatus::Unit(forced) => forced,
                    other => panic!("asserted clause is not unit at its assertion level: {:?}", other),
                };
                let level = self.trail.current_level();
                self.store.assign_literal(forced, level, Some(id));
                self.trail.push_implied(forced);
                self.engine.propagate(&mut self.store, &mut self.trail, forced, mode)
            }
        }
    }

    /// Undoes every literal implied (not decided) at the current decision
    /// level, in reverse order of assignment, and returns them.
    pub fn undo_unit_resolution(&mut self) -> Vec<Literal> {
        let level = self.trail.current_level();
        let drained = self.trail.drain_implied_from(level);
        for &lit in &drained {
            self.store.unassign_literal(lit, level);
        }
        log::debug!("undid {} implied literal(s) at level {}", drained.len(), level);
        drained
    }

    // -- Conflict analysis and clause learning --------------------------------

    /// Analyzes a conflicting clause, producing a learned clause and its
    /// assertion level.
    pub fn analyze_conflict(&mut self, conflict: ClauseId) -> LearnedClause {
        self.analyzer.analyze(&self.store, &self.trail, conflict)
    }

    /// Adds a learned clause to the formula, returning its identifier. Does
    /// not backtrack or propagate; the caller undoes decisions down to the
    /// clause's assertion level, then calls [`Self::unit_resolution`] with
    /// [`PropagationMode::AfterAssertingClause`].
    pub fn assert_clause(&mut self, learned: LearnedClause) -> ClauseId {
        let id = self.store.add_learned_clause(learned.literals, learned.assertion_level);
        self.last_asserted = Some(id);
        log::debug!("asserted clause {} at level {}", id.index(), self.store.clause(id).assertion_level());
        id
    }

    /// Returns `true` if the current decision level matches the clause's
    /// assertion level, meaning the clause is ready to force its asserting
    /// literal.
    pub fn at_assertion_level(&self, id: ClauseId) -> bool {
        self.trail.current_level() == self.store.clause(id).assertion_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(i: u32) -> Literal {
        Variable::from_index(i).unwrap().pos_literal()
    }

    fn neg(i: u32) -> Literal {
        Variable::from_index(i).unwrap().neg_literal()
    }

    fn build(n: u32, clauses: &[&[Literal]]) -> Solver {
        let mut solver = Solver::new();
        solver.register_variables(n).unwrap();
        for clause in clauses {
            solver.add_original_clause(clause.to_vec()).unwrap();
        }
        solver.freeze_cnf_occurrences();
        solver
    }

    #[test]
    fn decide_and_undo_round_trips_the_level() {
        let mut solver = build(1, &[]);
        assert_eq!(solver.decision_level(), 1);
        solver.decide_literal(lit(1));
        assert_eq!(solver.decision_level(), 2);
        assert!(solver.implied_literal(lit(1)));
        let undone = solver.undo_decide_literal();
        assert_eq!(undone, lit(1));
        assert_eq!(solver.decision_level(), 1);
        assert!(!solver.implied_literal(lit(1)));
    }

    #[test]
    fn learn_and_assert_a_clause_then_propagate() {
        // (¬x1 ∨ x2) ∧ (¬x1 ∨ x3) ∧ (¬x2 ∨ ¬x3), deciding x1 conflicts.
        let mut solver = build(3, &[
            &[neg(1), lit(2)],
            &[neg(1), lit(3)],
            &[neg(2), neg(3)],
        ]);
        solver.decide_literal(lit(1));
        let conflict = solver.unit_resolution(PropagationMode::AfterDecidingLiteral).unwrap_err();

        let learned = solver.analyze_conflict(conflict);
        assert_eq!(learned.assertion_level, 1);

        solver.undo_unit_resolution();
        solver.undo_decide_literal();
        assert_eq!(solver.decision_level(), 1);

        let id = solver.assert_clause(learned);
        assert!(solver.at_assertion_level(id));
        solver.unit_resolution(PropagationMode::AfterAssertingClause).unwrap();
        assert!(solver.implied_literal(neg(1)));
    }
}
