//! Recoverable error taxonomy.
//!
//! Conflicts are ordinary control flow and never represented here; this enum
//! only covers construction-time failures (malformed problem line, literal
//! out of the declared variable range, too many variables to index). Styled
//! after `varisat-dimacs`'s `thiserror`-derived `Error`.

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    #[error("problem line declares more variables than this crate can index")]
    TooManyVariables,
    #[error("literal {0} refers to a variable outside the declared range")]
    LiteralOutOfRange(i64),
    #[error("clause has no literals")]
    EmptyClause,
}
