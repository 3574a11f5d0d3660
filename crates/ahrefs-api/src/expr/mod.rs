//! Filter expressions for the `where` and `having` clauses.
//!
//! A filter is recorded as a raw `(operator, column, value)` triple and
//! serialized into the API's predicate dialect:
//!
//! - short operators (`eq`, `ne`, `gt`, `lt`, `gte`, `lte`) become
//!   `column<op>value`, e.g. `date>="2013-11-24"`;
//! - anything longer is a function predicate, `function(column,value)`, e.g.
//!   `substring(url,"ahrefs")`.

pub mod filter;
pub mod ops;

pub use filter::{quote, Clause, Filter};
pub use ops::{Comparison, Operator};
