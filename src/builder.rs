//! Builds a [`Solver`] by implementing `cnf_parser`'s streaming [`Output`]
//! trait.
//!
//! Accumulates literals into a `current_clause` buffer and hands off
//! finished clauses to the solver as the parser calls `literal`/
//! `finalize_clause`/`finish`. Variable indices are bounded only by what a
//! non-zero 32-bit integer can represent; there is no separate clause or
//! variable-count cap.

use core::convert::TryFrom;

use cnf_parser::Output;

use crate::{error::Error, solver::Solver, variable::Literal};

/// Accumulates a DIMACS CNF stream into a [`Solver`].
#[derive(Debug, Default)]
pub struct SolverBuilder {
    solver: Solver,
    current_clause: Vec<Literal>,
}

impl SolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn finalize_current_clause(&mut self) -> Result<(), Error> {
        let literals = core::mem::take(&mut self.current_clause);
        self.solver.add_original_clause(literals)?;
        Ok(())
    }

    /// Consumes the builder, returning the completed [`Solver`].
    ///
    /// Equivalent to calling [`Output::finish`] followed by unwrapping the
    /// solver out; most callers should instead drive this type through
    /// `cnf_parser::parse_cnf` and call this once parsing returns `Ok`.
    pub fn finalize(self) -> Solver {
        self.solver
    }
}

impl Output for SolverBuilder {
    type Error = Error;

    fn problem(&mut self, num_variables: u32, num_clauses: u32) -> Result<(), Self::Error> {
        self.solver.register_variables(num_variables)?;
        self.solver.reserve_clauses(num_clauses as usize);
        Ok(())
    }

    fn literal(&mut self, literal: cnf_parser::Literal) -> Result<(), Self::Error> {
        let literal = Literal::try_from(literal)?;
        if literal.variable().index() > self.solver.var_count() {
            return Err(Error::LiteralOutOfRange(literal.index() as i64))
        }
        self.current_clause.push(literal);
        Ok(())
    }

    fn finalize_clause(&mut self) -> Result<(), Self::Error> {
        self.finalize_current_clause()
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        if !self.current_clause.is_empty() {
            self.finalize_current_clause()?;
        }
        self.solver.freeze_cnf_occurrences();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_small_cnf_into_a_solver() {
        let dimacs = b"p cnf 3 2\n1 -2 0\n2 3 0\n";
        let solver = Solver::from_cnf(&mut &dimacs[..]).unwrap();
        assert_eq!(solver.var_count(), 3);
        assert_eq!(solver.clause_count(), 2);
    }
}
