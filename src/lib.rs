//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Operator-precedence reduction for Prolog-like terms.
//!
//! A front end that has already grouped its input into operands and operator
//! names feeds them, left to right, into a [`TermBuilder`]. The builder checks
//! every pair of neighbours as it goes, resolves operators that are defined
//! with more than one fixity, and on [`TermBuilder::finish`] reduces the
//! sequence into a single [`Term`] honouring precedence and associativity.
//!
//! Key components:
//! - `oper`: operator fixity/precedence/associativity and the definition table
//! - `token`: tokens and the roles they play
//! - `validate`: the pairwise adjacency decision
//! - `reducer`: the shunting pass and term assembly
//! - `render` and `reader`: the way back from terms to items and text
//!
//! ```rust
//! use term_reducer::{OperDefs, TermBuilder, atom, func};
//!
//! let opers = OperDefs::iso();
//! let mut b = TermBuilder::new(&opers);
//! b.add_operator("-")?;
//! b.add_operand(atom!("x"))?;
//! b.add_operator("*")?;
//! b.add_operand(2.into())?;
//! assert_eq!(b.finish()?, func!("*"; func!("-"; atom!("x")), 2));
//! # Ok::<(), term_reducer::ReduceError>(())
//! ```

pub mod error;
pub mod oper;
pub mod reader;
pub mod reducer;
pub mod render;
pub mod stack;
pub mod term;
pub mod token;
pub mod validate;

pub use crate::error::{ReduceError, SyntaxError};
pub use crate::oper::{Assoc, Fixity, OpType, OperDef, OperDefs, OperTriplet, Relation, Tie};
pub use crate::reader::read_term;
pub use crate::reducer::{BuilderStats, TermBuilder};
pub use crate::render::{Item, format, rebuild, to_items};
pub use crate::term::Term;
pub use crate::token::Role;
