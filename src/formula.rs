//! The formula store: variables, literals, clauses, and their occurrence
//! lists.
//!
//! Keeps per-variable positive/negative occurrence vectors plus a combined
//! per-variable occurrence list, a frozen `cnf_occurrences` count, and
//! per-literal `decision_level`/reason state, so clause status can be
//! classified in O(1) and BCP can walk a variable's occurrences in either
//! polarity.

use crate::{
    clause::{
        Clause,
        ClauseId,
        ClauseStatus,
    },
    error::Error,
    variable::{
        Literal,
        Variable,
    },
};

/// Per-variable bookkeeping: combined occurrence list and the frozen CNF
/// occurrence count (`var_occurrences`).
#[derive(Debug, Default, Clone)]
struct VarData {
    /// Every clause (original or learned) mentioning either polarity, in
    /// insertion order.
    occurrences: Vec<ClauseId>,
    /// Frozen once parsing finishes: the number of *original* clauses
    /// mentioning the variable.
    cnf_occurrences: u32,
    mark: bool,
}

/// Per-literal bookkeeping: current assignment state and this polarity's
/// own occurrence list.
#[derive(Debug, Default, Clone)]
struct LitData {
    /// `0` when free, else the decision level at which this literal was set
    /// true.
    decision_level: u32,
    /// The clause that forced this literal under BCP, or `None` if it was
    /// decided (not implied) or is free.
    reason: Option<ClauseId>,
    /// Every clause containing this exact literal (this polarity), in
    /// insertion order.
    occurrences: Vec<ClauseId>,
}

/// Owns every variable, literal, and clause (original and learned) for one
/// solver state.
#[derive(Debug, Default, Clone)]
pub struct FormulaStore {
    vars: Vec<VarData>,
    pos: Vec<LitData>,
    neg: Vec<LitData>,
    clauses: Vec<Clause>,
    learned: Vec<Clause>,
    cnf_occurrences_frozen: bool,
}

impl FormulaStore {
    /// Returns the number of variables in the formula.
    pub fn var_count(&self) -> u32 {
        self.vars.len() as u32
    }

    /// Returns the number of original CNF clauses.
    pub fn clause_count(&self) -> u32 {
        self.clauses.len() as u32
    }

    /// Returns the number of learned clauses.
    pub fn learned_count(&self) -> u32 {
        self.learned.len() as u32
    }

    fn var_idx(var: Variable) -> usize {
        var.index() as usize - 1
    }

    fn lit_data(&self, lit: Literal) -> &LitData {
        let idx = Self::var_idx(lit.variable());
        if lit.is_positive() { &self.pos[idx] } else { &self.neg[idx] }
    }

    fn lit_data_mut(&mut self, lit: Literal) -> &mut LitData {
        let idx = Self::var_idx(lit.variable());
        if lit.is_positive() { &mut self.pos[idx] } else { &mut self.neg[idx] }
    }

    /// Registers `additional` fresh variables, as declared by the DIMACS
    /// problem line.
    pub(crate) fn register_variables(&mut self, additional: u32) -> Result<(), Error> {
        let new_len = self.vars.len() + additional as usize;
        if Variable::from_index(new_len as u32).is_none() && new_len > 0 {
            return Err(Error::TooManyVariables)
        }
        self.vars.resize_with(new_len, Default::default);
        self.pos.resize_with(new_len, Default::default);
        self.neg.resize_with(new_len, Default::default);
        Ok(())
    }

    /// Reserves space for `additional` original clauses up front.
    pub(crate) fn reserve_clauses(&mut self, additional: usize) {
        self.clauses.reserve(additional);
    }

    /// Returns the variable for the given 1-based index.
    pub fn index2var(&self, index: u32) -> Variable {
        Variable::from_index(index).expect("index2var called with an out-of-range index")
    }

    /// Returns the literal for the given signed index (positive index
    /// returns `L⁺`, negative returns `L⁻`).
    pub fn index2literal(&self, index: i32) -> Literal {
        Literal::from_index(index).expect("index2literal called with an out-of-range index")
    }

    /// Returns the positive literal of a variable.
    pub fn pos_literal(&self, var: Variable) -> Literal {
        var.pos_literal()
    }

    /// Returns the negative literal of a variable.
    pub fn neg_literal(&self, var: Variable) -> Literal {
        var.neg_literal()
    }

    /// Returns the opposite of a literal.
    pub fn opposite(&self, lit: Literal) -> Literal {
        lit.opposite()
    }

    /// Resolves a clause identifier, covering both original and learned
    /// clauses.
    pub fn clause(&self, id: ClauseId) -> &Clause {
        let idx = id.index();
        let m = self.clauses.len() as u32;
        if idx <= m {
            &self.clauses[(idx - 1) as usize]
        } else {
            &self.learned[(idx - m - 1) as usize]
        }
    }

    fn clause_mut(&mut self, id: ClauseId) -> &mut Clause {
        let idx = id.index();
        let m = self.clauses.len() as u32;
        if idx <= m {
            &mut self.clauses[(idx - 1) as usize]
        } else {
            &mut self.learned[(idx - m - 1) as usize]
        }
    }

    /// Returns the literals of a clause.
    pub fn clause_literals(&self, id: ClauseId) -> &[Literal] {
        self.clause(id).literals()
    }

    /// Returns the number of literals in a clause.
    pub fn clause_size(&self, id: ClauseId) -> usize {
        self.clause(id).len()
    }

    /// Iterates the identifiers of all original clauses, `1..=m`.
    pub(crate) fn original_clause_ids(&self) -> impl Iterator<Item = ClauseId> + '_ {
        (1..=self.clauses.len() as u32).map(ClauseId::from_raw)
    }

    /// Iterates the identifiers of all learned clauses, `m+1, m+2, …`, in
    /// assertion order.
    pub(crate) fn learned_clause_ids(&self) -> impl Iterator<Item = ClauseId> + '_ {
        let m = self.clauses.len() as u32;
        (1..=self.learned.len() as u32).map(move |k| ClauseId::from_raw(m + k))
    }

    /// Returns the decision level of a literal (`0` when free).
    pub fn literal_decision_level(&self, lit: Literal) -> u32 {
        self.lit_data(lit).decision_level
    }

    /// Returns the reason clause that forced a literal, if any.
    pub fn literal_reason(&self, lit: Literal) -> Option<ClauseId> {
        self.lit_data(lit).reason
    }

    /// Returns `true` if the literal is implied (decided or forced true).
    pub fn implied_literal(&self, lit: Literal) -> bool {
        self.literal_decision_level(lit) > 0
    }

    /// Returns `true` if either literal of the variable is currently set.
    pub fn instantiated_var(&self, var: Variable) -> bool {
        self.implied_literal(var.pos_literal()) || self.implied_literal(var.neg_literal())
    }

    /// Returns the number of clauses mentioning the variable in the original
    /// CNF (frozen after parsing).
    pub fn var_occurrences(&self, var: Variable) -> u32 {
        self.vars[Self::var_idx(var)].cnf_occurrences
    }

    /// Returns the `index`-th clause mentioning `var` (over its full,
    /// ever-growing occurrence list, not just the CNF-frozen prefix).
    pub fn clause_of_var(&self, index: usize, var: Variable) -> ClauseId {
        self.vars[Self::var_idx(var)].occurrences[index]
    }

    /// Returns `true` if every clause mentioning `var` is currently
    /// subsumed.
    pub fn irrelevant_var(&self, var: Variable) -> bool {
        self.vars[Self::var_idx(var)]
            .occurrences
            .iter()
            .all(|&id| self.clause(id).is_subsumed())
    }

    pub fn is_marked_var(&self, var: Variable) -> bool {
        self.vars[Self::var_idx(var)].mark
    }

    pub fn mark_var(&mut self, var: Variable) {
        let idx = Self::var_idx(var);
        debug_assert!(!self.vars[idx].mark, "marking an already-marked variable");
        self.vars[idx].mark = true;
    }

    pub fn unmark_var(&mut self, var: Variable) {
        let idx = Self::var_idx(var);
        debug_assert!(self.vars[idx].mark, "unmarking a variable that is not marked");
        self.vars[idx].mark = false;
    }

    pub fn is_marked_clause(&self, id: ClauseId) -> bool {
        self.clause(id).is_marked()
    }

    pub fn mark_clause(&mut self, id: ClauseId) {
        self.clause_mut(id).mark();
    }

    pub fn unmark_clause(&mut self, id: ClauseId) {
        self.clause_mut(id).unmark();
    }

    /// Classifies a clause in O(1) (or a linear scan for the `Unit` case's
    /// free literal).
    pub fn clause_status(&self, id: ClauseId) -> ClauseStatus {
        let clause = self.clause(id);
        if clause.is_subsumed() {
            return ClauseStatus::Subsumed
        }
        let size = clause.len() as u32;
        if clause.num_false() == size {
            return ClauseStatus::Conflicting
        }
        if clause.num_false() + 1 == size {
            let free = clause
                .literals()
                .iter()
                .copied()
                .find(|&lit| self.literal_decision_level(lit) == 0 && self.literal_decision_level(!lit) == 0)
                .expect("a unit clause must have exactly one free literal");
            return ClauseStatus::Unit(free)
        }
        ClauseStatus::Pending
    }

    fn register_occurrences(&mut self, id: ClauseId, literals: &[Literal]) {
        for &lit in literals {
            let var_idx = Self::var_idx(lit.variable());
            self.vars[var_idx].occurrences.push(id);
            self.lit_data_mut(lit).occurrences.push(id);
        }
    }

    /// Appends an original clause and returns its identifier.
    ///
    /// # Errors
    ///
    /// If the clause has no literals.
    pub(crate) fn add_original_clause(&mut self, literals: Vec<Literal>) -> Result<ClauseId, Error> {
        if literals.is_empty() {
            return Err(Error::EmptyClause)
        }
        let id = ClauseId::from_raw(self.clauses.len() as u32 + 1);
        self.clauses.push(Clause::new(literals.clone()));
        self.register_occurrences(id, &literals);
        Ok(id)
    }

    /// Freezes every variable's `cnf_occurrences` count to its current
    /// occurrence-list length. Called once, after parsing finishes and
    /// before any decision is made.
    pub(crate) fn freeze_cnf_occurrences(&mut self) {
        debug_assert!(!self.cnf_occurrences_frozen, "cnf occurrences already frozen");
        for var in &mut self.vars {
            var.cnf_occurrences = var.occurrences.len() as u32;
        }
        self.cnf_occurrences_frozen = true;
    }

    /// Appends a learned clause, recomputing `num_false`/`decision_level`
    /// against the current assignment and
    /// extending every mentioned variable's and literal's occurrence lists.
    ///
    /// Returns the new clause's identifier, `m + k` for its 1-based position
    /// `k` among learned clauses.
    pub(crate) fn add_learned_clause(&mut self, literals: Vec<Literal>, assertion_level: u32) -> ClauseId {
        let m = self.clauses.len() as u32;
        let k = self.learned.len() as u32 + 1;
        let id = ClauseId::from_raw(m + k);

        let mut clause = Clause::new(literals.clone());
        clause.set_assertion_level(assertion_level);

        let mut num_false = 0u32;
        let mut min_subsuming_level = 0u32;
        for &lit in &literals {
            let level = self.literal_decision_level(lit);
            if level > 0 && (min_subsuming_level == 0 || level < min_subsuming_level) {
                min_subsuming_level = level;
            }
            if self.literal_decision_level(!lit) > 0 {
                num_false += 1;
            }
        }
        clause.set_num_false(num_false);
        clause.set_decision_level(min_subsuming_level);

        self.learned.push(clause);
        self.register_occurrences(id, &literals);
        id
    }

    /// Sets `lit` true at `level`, with `reason` as its implying clause
    /// (`None` for a decision). Applies the mirror-image clause counter
    /// updates to every clause in `lit`'s and `!lit`'s
    /// occurrence lists.
    pub(crate) fn assign_literal(&mut self, lit: Literal, level: u32, reason: Option<ClauseId>) {
        debug_assert_eq!(self.literal_decision_level(lit), 0, "literal already assigned");
        debug_assert_eq!(self.literal_decision_level(!lit), 0, "opposite literal already assigned");
        {
            let data = self.lit_data_mut(lit);
            data.decision_level = level;
            data.reason = reason;
        }
        let subsuming = Self::occurrences_of(&self.pos, &self.neg, lit).to_vec();
        for id in subsuming {
            self.clause_mut(id).mark_subsumed(level);
        }
        let falsified = Self::occurrences_of(&self.pos, &self.neg, !lit).to_vec();
        for id in falsified {
            self.clause_mut(id).inc_false();
        }
    }

    /// Undoes [`Self::assign_literal`] for a literal that was set true at
    /// `level`.
    pub(crate) fn unassign_literal(&mut self, lit: Literal, level: u32) {
        debug_assert_eq!(self.literal_decision_level(lit), level, "unassigning from the wrong level");
        let subsuming = Self::occurrences_of(&self.pos, &self.neg, lit).to_vec();
        for id in subsuming {
            self.clause_mut(id).unmark_subsumed(level);
        }
        let falsified = Self::occurrences_of(&self.pos, &self.neg, !lit).to_vec();
        for id in falsified {
            self.clause_mut(id).dec_false();
        }
        let data = self.lit_data_mut(lit);
        data.decision_level = 0;
        data.reason = None;
    }

    fn occurrences_of<'a>(pos: &'a [LitData], neg: &'a [LitData], lit: Literal) -> &'a [ClauseId] {
        let idx = Self::var_idx(lit.variable());
        if lit.is_positive() { &pos[idx].occurrences } else { &neg[idx].occurrences }
    }

    /// Returns the combined occurrence list of `var` (both polarities), used
    /// by BCP to find clauses possibly affected by a newly assigned
    /// variable.
    pub(crate) fn var_occurrence_list(&self, var: Variable) -> &[ClauseId] {
        &self.vars[Self::var_idx(var)].occurrences
    }
}

/// The weight of a literal for (future) weighted model counting. Always `1`
/// in this crate.
pub fn literal_weight(_lit: Literal) -> f64 {
    1.0
}
