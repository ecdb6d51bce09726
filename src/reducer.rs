//! Token-sequence-to-term reduction.
//!
//! [`TermBuilder`] receives the items of one term from a front end, validates
//! each against its left neighbour (see [`crate::validate`]) and keeps them on
//! an input stack. [`TermBuilder::finish`] then runs the two reduction phases:
//!
//! 1. **Shunting.** The input stack is drained from its top, i.e. right to
//!    left over the source, into an output stack in prefix order. Infix and
//!    postfix operators wait on a pending stack until an operator that binds
//!    looser arrives; operands, atoms and prefix operators go straight to
//!    output.
//! 2. **Assembly.** The output stack is consumed recursively, each operator
//!    taking as many already assembled subterms as its fixity requires.
//!
//! Tokens live in an arena owned by the builder; the stacks hold indices.
//! Resolving the role of a token appends a new token to the arena and points
//! the stack slot at it.
//!
//! # Example
//! ```rust
//! use term_reducer::{OperDefs, Term, TermBuilder};
//!
//! let opers = OperDefs::iso();
//! let mut b = TermBuilder::new(&opers);
//! b.add_operand(Term::from(3))?;
//! b.add_operator("-")?;
//! b.add_operand(Term::from(5))?;
//! assert_eq!(b.finish()?.to_string(), "'-'(3, 5)");
//! # Ok::<(), term_reducer::ReduceError>(())
//! ```

use crate::error::{ReduceError, SyntaxError};
use crate::oper::{Fixity, OperDef, OperDefs, Tie};
use crate::stack::Stack;
use crate::term::{CONS_NAMES, Term};
use crate::token::{Role, Token};
use crate::validate::{Adjacency, Verdict, validate};
use std::mem;

/// Counters collected while building one term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderStats {
    /// Tokens accepted onto the input stack.
    pub tokens: usize,
    /// Role resolutions, both of incoming tokens and of the token on top.
    pub resolutions: usize,
    /// Moves from the pending stack to the output stack.
    pub moves: usize,
}

/// Builds one term from a sequence of operands and operator occurrences.
#[derive(Debug)]
pub struct TermBuilder<'a> {
    opers: &'a OperDefs,
    tokens: Vec<Token>,
    input: Stack<usize>,
    infix_at_start: bool,
    stats: BuilderStats,
}

impl<'a> TermBuilder<'a> {
    /// Creates an empty builder reading descriptors from `opers`.
    pub fn new(opers: &'a OperDefs) -> Self {
        let mut input = Stack::new();
        input.push(0);
        Self {
            opers,
            tokens: vec![Token::Begin],
            input,
            infix_at_start: false,
            stats: BuilderStats::default(),
        }
    }

    /// Returns the work counters collected so far.
    pub fn stats(&self) -> BuilderStats {
        self.stats
    }

    /// Adds a finished term.
    pub fn add_operand(&mut self, term: Term) -> Result<(), ReduceError> {
        self.push(Token::Operand(term))
    }

    /// Adds an occurrence of the operator `name`.
    ///
    /// # Errors
    /// [`SyntaxError::NotAnOperator`] if the table has no definition for
    /// `name`; any rejection by the validator.
    pub fn add_operator(&mut self, name: &str) -> Result<(), ReduceError> {
        let role = self
            .opers
            .triplet(name)
            .and_then(|t| t.role())
            .ok_or_else(|| SyntaxError::NotAnOperator { name: name.into() })?;
        let index = self
            .opers
            .lookup(name)
            .ok_or_else(|| ReduceError::internal(format!("{:?} has no index", name)))?;
        self.push(Token::operator(index, role))
    }

    /// Adds `name(args...)` as an operand. Without arguments this is the atom
    /// `name`; the list constructor with two arguments is a list cell.
    pub fn add_functor_application(&mut self, name: &str, args: Vec<Term>) -> Result<(), ReduceError> {
        let term = if args.len() == 2 && CONS_NAMES.contains(&name) {
            let mut args = args.into_iter();
            match (args.next(), args.next()) {
                (Some(head), Some(tail)) => Term::cons(head, tail),
                _ => return Err(ReduceError::internal("list cell without arguments")),
            }
        } else {
            Term::func(name, args)
        };
        self.add_operand(term)
    }

    /// Adds a parenthesized group as an operand: a single term passes
    /// through, more terms are joined with `','`.
    pub fn add_argument_list(&mut self, mut args: Vec<Term>) -> Result<(), ReduceError> {
        let term = match args.len() {
            0 => return Err(SyntaxError::EmptyArgumentList.into()),
            1 => args.pop().ok_or_else(|| ReduceError::internal("argument vanished"))?,
            _ => Term::func(",", args),
        };
        self.add_operand(term)
    }

    /// Adds `name(args...)` written in canonical form where `name` is an
    /// operator. The operator's own descriptor builds the term when the
    /// arity fits one of its forms, so renaming applies as in operator
    /// notation.
    pub fn add_operator_application(&mut self, name: &str, args: Vec<Term>) -> Result<(), ReduceError> {
        let def = self.opers.triplet(name).and_then(|t| match args.len() {
            1 => t.get(Fixity::Prefix).or(t.get(Fixity::Postfix)),
            2 => t.get(Fixity::Infix),
            _ => None,
        });
        let term = match def {
            Some(def) => def.make_term(args),
            None => Term::func(name, args),
        };
        self.add_operand(term)
    }

    /// Validates `token` against the top of the input stack and pushes it.
    fn push(&mut self, token: Token) -> Result<(), ReduceError> {
        let token = self.admit(token)?;
        let index = self.tokens.len();
        self.tokens.push(token);
        self.input.push(index);
        self.stats.tokens += 1;
        Ok(())
    }

    /// Runs the validator on `token` and applies its verdict: resolves the
    /// roles involved, maintains the infix-at-start marker and records the
    /// descriptor on top as the new token's `prev`.
    fn admit(&mut self, token: Token) -> Result<Token, ReduceError> {
        let top = *self
            .input
            .top()
            .ok_or_else(|| ReduceError::internal("input stack lost its begin sentinel"))?;
        let verdict = validate(&Adjacency {
            opers: self.opers,
            top: &self.tokens[top],
            new: &token,
            height: self.input.len(),
            infix_at_start: self.infix_at_start,
        })?;

        let flagged = verdict == Verdict::AcceptFlagged;
        let mut token = match verdict {
            Verdict::Accept | Verdict::AcceptFlagged => token,
            Verdict::AcceptAs(role) => {
                self.stats.resolutions += 1;
                token.resolve(role)?
            }
            Verdict::Resolve { top: top_role, new } => {
                self.resolve_top(top_role)?;
                if new != token.role() {
                    self.stats.resolutions += 1;
                }
                token.resolve(new)?
            }
            Verdict::Reject(e) => return Err(e.into()),
        };
        self.infix_at_start = flagged;

        if let Token::Operator(op) = &mut token {
            let top = *self
                .input
                .top()
                .ok_or_else(|| ReduceError::internal("input stack lost its begin sentinel"))?;
            op.prev = self.tokens[top].oper_ref();
        }
        Ok(token)
    }

    fn resolve_top(&mut self, role: Role) -> Result<(), ReduceError> {
        let top = *self
            .input
            .top()
            .ok_or_else(|| ReduceError::internal("nothing to resolve"))?;
        let token = self.tokens[top].resolve(role)?;
        log::trace!("resolved {} to {}", self.tokens[top].describe(self.opers), role);
        let index = self.tokens.len();
        self.tokens.push(token);
        self.input.replace_top(index)?;
        self.stats.resolutions += 1;
        Ok(())
    }

    /// Ends the sequence and returns the built term.
    ///
    /// # Errors
    /// Any rejection of the end of the sequence ([`SyntaxError::EmptyTerm`],
    /// [`SyntaxError::UnexpectedEnd`], ...), operator clashes and ambiguities
    /// found during the reduction, or [`ReduceError::Internal`] if the
    /// reduction did not balance.
    pub fn finish(mut self) -> Result<Term, ReduceError> {
        self.admit(Token::End)?;
        let mut output = self.reduce()?;
        let term = self.assemble(&mut output)?;
        if !output.is_empty() {
            return Err(ReduceError::internal(format!(
                "{} tokens left after assembly",
                output.len()
            )));
        }
        log::debug!("built {} ({:?})", term, self.stats);
        Ok(term)
    }

    /// Returns the descriptor of the resolved operator token at `index`.
    fn def(&self, index: usize) -> Result<&'a OperDef, ReduceError> {
        let opers: &'a OperDefs = self.opers;
        self.tokens[index]
            .oper_ref()
            .and_then(|r| r.def(opers))
            .ok_or_else(|| {
                ReduceError::internal(format!(
                    "{} has no resolved descriptor",
                    self.tokens[index].describe(opers)
                ))
            })
    }

    /// Drains the input stack into prefix order.
    fn reduce(&mut self) -> Result<Stack<usize>, ReduceError> {
        let mut pending = Stack::new();
        let mut output = Stack::new();
        while self.input.len() > 1 {
            let current = self.input.pop()?;
            match self.tokens[current].role() {
                Role::Operand | Role::Zerofix => output.push(current),
                Role::Infix => {
                    self.release(current, &mut pending, &mut output)?;
                    pending.push(current);
                }
                Role::Prefix => {
                    self.release(current, &mut pending, &mut output)?;
                    output.push(current);
                }
                Role::Postfix => pending.push(current),
                role => {
                    return Err(ReduceError::internal(format!(
                        "{} token in input stack at reduction",
                        role
                    )));
                }
            }
        }
        while !pending.is_empty() {
            pending.move_top_to(&mut output)?;
            self.stats.moves += 1;
        }
        Ok(output)
    }

    /// Moves to output the pending operators that end up inside the right
    /// argument of the operator `current`.
    fn release(
        &mut self,
        current: usize,
        pending: &mut Stack<usize>,
        output: &mut Stack<usize>,
    ) -> Result<(), ReduceError> {
        let def = self.def(current)?;
        while let Some(&top) = pending.top() {
            let other = self.def(top)?;
            let nest = if other.prec < def.prec {
                true
            } else if other.prec == def.prec {
                match OperDef::tie(def, other) {
                    Tie::Right => true,
                    Tie::Left => false,
                    Tie::Clash => {
                        return Err(SyntaxError::Clash {
                            left: def.to_string().into(),
                            right: other.to_string().into(),
                        }
                        .into());
                    }
                    Tie::Ambiguous => {
                        return Err(SyntaxError::Ambiguous {
                            left: def.to_string().into(),
                            right: other.to_string().into(),
                        }
                        .into());
                    }
                }
            } else {
                false
            };
            if !nest {
                break;
            }
            log::trace!("move {} to output", other);
            pending.move_top_to(output)?;
            self.stats.moves += 1;
        }
        Ok(())
    }

    /// Builds the term whose prefix-order tokens are on top of `output`.
    fn assemble(&mut self, output: &mut Stack<usize>) -> Result<Term, ReduceError> {
        let opers: &'a OperDefs = self.opers;
        let index = output.pop()?;
        match mem::replace(&mut self.tokens[index], Token::End) {
            Token::Operand(term) => Ok(term),
            Token::Operator(op) if op.role == Role::Zerofix => {
                let triplet = opers
                    .get(op.oper)
                    .ok_or_else(|| ReduceError::internal("operator index out of range"))?;
                Ok(Term::atom(triplet.name()))
            }
            token @ Token::Operator(_) => {
                let role = token.role();
                let def = token
                    .oper_ref()
                    .and_then(|r| r.def(opers))
                    .ok_or_else(|| ReduceError::internal(format!("{} operator in output", role)))?;
                let args = if role == Role::Infix {
                    let left = self.assemble(output)?;
                    let right = self.assemble(output)?;
                    vec![left, right]
                } else {
                    vec![self.assemble(output)?]
                };
                Ok(def.make_term(args))
            }
            token => Err(ReduceError::internal(format!(
                "{} token in output",
                token.role()
            ))),
        }
    }
}
