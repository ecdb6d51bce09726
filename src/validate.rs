//! Incoming-token validation.
//!
//! Every token entering the input stack is checked against the token
//! currently on top. The decision depends only on the two roles, on the
//! operator descriptors involved, on the height of the input stack (an
//! operator alone in the sequence may stand for an atom) and on the
//! infix-at-start marker. The accepted sequences follow
//!
//! ```text
//! Expr   -> Factor (Infix Factor)*
//! Factor -> Prefix* Operand Postfix*
//! ```
//!
//! Overloaded operators are resolved here: an infix-or-prefix operator is
//! pinned on arrival, an infix-or-postfix operator when the token after it
//! arrives. Precedence compatibility between adjacent operators is checked
//! with the argument predicates of [`OperDef`]; competition between equal
//! precedences across an operand is left to the reducer.

use crate::error::{ReduceError, SyntaxError};
use crate::oper::{Fixity, OperDef, OperDefs};
use crate::token::{Role, Token};

/// The pair of tokens under inspection plus the context it is judged in.
#[derive(Debug, Clone, Copy)]
pub struct Adjacency<'a> {
    pub opers: &'a OperDefs,
    /// Token on top of the input stack.
    pub top: &'a Token,
    /// Incoming token.
    pub new: &'a Token,
    /// Input stack height, begin sentinel included.
    pub height: usize,
    /// Set while the token on top is a pure infix operator that started the
    /// sequence.
    pub infix_at_start: bool,
}

/// Outcome of validating an incoming token.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Push the token as is.
    Accept,
    /// Push the token with its role resolved.
    AcceptAs(Role),
    /// Push the token and set the infix-at-start marker.
    AcceptFlagged,
    /// Resolve the token on top, then push the incoming one with `new` as
    /// its role.
    Resolve { top: Role, new: Role },
    Reject(SyntaxError),
}

impl<'a> Adjacency<'a> {
    /// The token on top is the only one above the begin sentinel.
    fn sole(&self) -> bool {
        self.height == 2
    }

    fn def(&self, token: &Token, role: Role) -> Result<&'a OperDef, ReduceError> {
        let opers: &'a OperDefs = self.opers;
        let found = match token {
            Token::Operator(op) => opers.get(op.oper).and_then(|t| t.for_role(role)),
            _ => None,
        };
        found.ok_or_else(|| {
            ReduceError::internal(format!(
                "no {} definition for {}",
                role,
                token.describe(opers)
            ))
        })
    }

    fn top_def(&self, role: Role) -> Result<&'a OperDef, ReduceError> {
        self.def(self.top, role)
    }

    fn new_def(&self, role: Role) -> Result<&'a OperDef, ReduceError> {
        self.def(self.new, role)
    }

    /// The postfix descriptor preceding the token on top, if any.
    fn prev_postfix(&self) -> Option<&'a OperDef> {
        let opers: &'a OperDefs = self.opers;
        match self.top {
            Token::Operator(op) => op
                .prev
                .filter(|r| r.fixity == Fixity::Postfix)
                .and_then(|r| r.def(opers)),
            _ => None,
        }
    }

    fn illegal(&self) -> Verdict {
        Verdict::Reject(SyntaxError::IllegalAdjacency {
            prev: self.top.describe(self.opers),
            next: self.new.describe(self.opers),
        })
    }

    fn at_end(&self) -> Verdict {
        if self.sole() {
            Verdict::Resolve {
                top: Role::Zerofix,
                new: Role::End,
            }
        } else {
            Verdict::Reject(SyntaxError::UnexpectedEnd {
                after: self.top.describe(self.opers),
            })
        }
    }

    /// Checks the token on top, resolved to `role`, against the postfix
    /// operator before it, which becomes its left argument.
    fn check_prev(&self, role: Role) -> Result<Result<(), SyntaxError>, ReduceError> {
        let Some(prev) = self.prev_postfix() else {
            return Ok(Ok(()));
        };
        Ok(match role {
            Role::Infix => left_arg(self.top_def(Role::Infix)?, prev),
            Role::Postfix => {
                let top = self.top_def(Role::Postfix)?;
                chain(prev, top, top.arg_valid(prev))
            }
            _ => Ok(()),
        })
    }

    /// Resolves the infix-or-postfix token on top if it fits its left
    /// neighbour and `check` holds.
    fn resolve_top(
        &self,
        top: Role,
        new: Role,
        check: Result<(), SyntaxError>,
    ) -> Result<Verdict, ReduceError> {
        Ok(match self.check_prev(top)?.and(check) {
            Ok(()) => Verdict::Resolve { top, new },
            Err(e) => Verdict::Reject(e),
        })
    }
}

fn left_arg(oper: &OperDef, arg: &OperDef) -> Result<(), SyntaxError> {
    if oper.left_arg_valid(arg) {
        Ok(())
    } else {
        Err(SyntaxError::InvalidLeftArg {
            oper: oper.to_string().into(),
            arg: arg.to_string().into(),
        })
    }
}

fn right_arg(oper: &OperDef, arg: &OperDef) -> Result<(), SyntaxError> {
    if oper.right_arg_valid(arg) {
        Ok(())
    } else {
        Err(SyntaxError::InvalidRightArg {
            oper: oper.to_string().into(),
            arg: arg.to_string().into(),
        })
    }
}

/// Result of a same-side check between two adjacent unary operators.
fn chain(prev: &OperDef, next: &OperDef, valid: bool) -> Result<(), SyntaxError> {
    if valid {
        Ok(())
    } else {
        Err(SyntaxError::IllegalAdjacency {
            prev: prev.to_string().into(),
            next: next.to_string().into(),
        })
    }
}

fn accept_if(check: Result<(), SyntaxError>, verdict: Verdict) -> Verdict {
    match check {
        Ok(()) => verdict,
        Err(e) => Verdict::Reject(e),
    }
}

/// Decides whether `adj.new` may follow `adj.top`.
///
/// # Errors
/// Returns [`ReduceError::Internal`] for combinations the reducer never
/// produces: a second begin sentinel, a token after the end sentinel, an
/// unresolved infix-or-prefix token on top, or descriptors missing from the
/// table. Syntax errors are reported as [`Verdict::Reject`].
pub fn validate(adj: &Adjacency<'_>) -> Result<Verdict, ReduceError> {
    let verdict = decide(adj)?;
    log::trace!(
        "validate {} / {} (height {}): {:?}",
        adj.top.role(),
        adj.new.role(),
        adj.height,
        verdict
    );
    Ok(verdict)
}

fn decide(adj: &Adjacency<'_>) -> Result<Verdict, ReduceError> {
    use Role::*;

    let prev = adj.top.role();
    let next = adj.new.role();
    if matches!(next, Begin | Zerofix) || matches!(prev, End | InfixOrPrefix) {
        return Err(ReduceError::internal(format!(
            "{} token may not meet {} token",
            prev, next
        )));
    }
    if adj.infix_at_start && next != End {
        return Ok(Verdict::Reject(SyntaxError::InfixAtStart {
            oper: adj.top.describe(adj.opers),
        }));
    }
    // An operator used as an atom behaves like any other operand.
    let prev = if prev == Zerofix { Operand } else { prev };

    Ok(match (prev, next) {
        (Begin, End) => Verdict::Reject(SyntaxError::EmptyTerm),
        (Begin, Operand | Prefix) => Verdict::Accept,
        (Begin, Infix) => Verdict::AcceptFlagged,
        (Begin, Postfix | InfixOrPostfix) => Verdict::AcceptAs(Zerofix),
        (Begin, InfixOrPrefix) => Verdict::AcceptAs(Prefix),

        (Operand, End | Infix | Postfix | InfixOrPostfix) => Verdict::Accept,
        (Operand, Operand | Prefix) => adj.illegal(),
        (Operand, InfixOrPrefix) => Verdict::AcceptAs(Infix),

        (Infix | Prefix, End) => adj.at_end(),
        (Infix | Prefix, Operand) => Verdict::Accept,
        (Infix | Prefix, Infix | Postfix | InfixOrPostfix) => adj.illegal(),
        (Infix, Prefix | InfixOrPrefix) => {
            let check = right_arg(adj.top_def(Role::Infix)?, adj.new_def(Role::Prefix)?);
            accept_if(check, resolved(next, Prefix))
        }
        (Prefix, Prefix | InfixOrPrefix) => {
            let outer = adj.top_def(Role::Prefix)?;
            let inner = adj.new_def(Role::Prefix)?;
            accept_if(chain(outer, inner, outer.arg_valid(inner)), resolved(next, Prefix))
        }

        (Postfix, End) if adj.sole() => Verdict::Resolve {
            top: Zerofix,
            new: End,
        },
        (Postfix, End | InfixOrPostfix) => Verdict::Accept,
        (Postfix, Operand | Prefix) => adj.illegal(),
        (Postfix, Infix | InfixOrPrefix) => {
            let check = left_arg(adj.new_def(Role::Infix)?, adj.top_def(Role::Postfix)?);
            accept_if(check, resolved(next, Infix))
        }
        (Postfix, Postfix) => {
            let inner = adj.top_def(Role::Postfix)?;
            let outer = adj.new_def(Role::Postfix)?;
            accept_if(chain(inner, outer, outer.arg_valid(inner)), Verdict::Accept)
        }

        (InfixOrPostfix, End) if adj.sole() => Verdict::Resolve {
            top: Zerofix,
            new: End,
        },
        (InfixOrPostfix, End) => adj.resolve_top(Postfix, End, Ok(()))?,
        (InfixOrPostfix, Operand) => adj.resolve_top(Infix, Operand, Ok(()))?,
        (InfixOrPostfix, Infix) => {
            let check = left_arg(adj.new_def(Role::Infix)?, adj.top_def(Role::Postfix)?);
            adj.resolve_top(Postfix, Infix, check)?
        }
        (InfixOrPostfix, Prefix) => {
            let check = right_arg(adj.top_def(Role::Infix)?, adj.new_def(Role::Prefix)?);
            adj.resolve_top(Infix, Prefix, check)?
        }
        (InfixOrPostfix, Postfix) => {
            let inner = adj.top_def(Role::Postfix)?;
            let outer = adj.new_def(Role::Postfix)?;
            adj.resolve_top(Postfix, Postfix, chain(inner, outer, outer.arg_valid(inner)))?
        }
        (InfixOrPostfix, InfixOrPrefix) => {
            let as_infix = adj.check_prev(Infix)?.and(right_arg(
                adj.top_def(Role::Infix)?,
                adj.new_def(Role::Prefix)?,
            ));
            let as_postfix = adj.check_prev(Postfix)?.and(left_arg(
                adj.new_def(Role::Infix)?,
                adj.top_def(Role::Postfix)?,
            ));
            match (as_infix, as_postfix) {
                (Ok(()), Ok(())) => Verdict::Reject(SyntaxError::Ambiguous {
                    left: adj.top.describe(adj.opers),
                    right: adj.new.describe(adj.opers),
                }),
                (Ok(()), Err(_)) => Verdict::Resolve {
                    top: Infix,
                    new: Prefix,
                },
                (Err(_), Ok(())) => Verdict::Resolve {
                    top: Postfix,
                    new: Infix,
                },
                (Err(_), Err(e)) => Verdict::Reject(e),
            }
        }
        (InfixOrPostfix, InfixOrPostfix) => adj.resolve_top(Postfix, InfixOrPostfix, Ok(()))?,

        (prev, next) => {
            return Err(ReduceError::internal(format!(
                "no adjacency rule for {} followed by {}",
                prev, next
            )));
        }
    })
}

/// `Accept` when the incoming token already has `role`, else `AcceptAs`.
fn resolved(current: Role, role: Role) -> Verdict {
    if current == role {
        Verdict::Accept
    } else {
        Verdict::AcceptAs(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;
    use crate::token::{OperRef, OperToken};

    const DEFS: &str = "
        % pure forms
        500 yfx +
        200 fy  \\
        100 yf  !
        % overloaded forms
        500 yfx -
        200 fy  -
        400 yfx @
        100 yf  @
    ";

    fn opers() -> OperDefs {
        OperDefs::try_from_defs(DEFS).unwrap()
    }

    fn token(opers: &OperDefs, role: Role) -> Token {
        let oper = |name: &str| Token::operator(opers.lookup(name).unwrap(), role);
        match role {
            Role::Begin => Token::Begin,
            Role::End => Token::End,
            Role::Operand => Token::Operand(Term::atom("a")),
            Role::Infix => oper("+"),
            Role::Prefix => oper("\\"),
            Role::Postfix => oper("!"),
            Role::InfixOrPrefix => oper("-"),
            Role::InfixOrPostfix => oper("@"),
            Role::Zerofix => oper("+").resolve(Role::Zerofix).unwrap(),
        }
    }

    /// Coarse outcome used by the table test.
    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Outcome {
        Internal,
        Reject,
        Accept,
        AcceptAs(Role),
        Flagged,
        Resolve(Role, Role),
    }

    fn outcome(result: Result<Verdict, ReduceError>) -> Outcome {
        match result {
            Err(e) => {
                assert!(e.is_internal());
                Outcome::Internal
            }
            Ok(Verdict::Accept) => Outcome::Accept,
            Ok(Verdict::AcceptAs(role)) => Outcome::AcceptAs(role),
            Ok(Verdict::AcceptFlagged) => Outcome::Flagged,
            Ok(Verdict::Resolve { top, new }) => Outcome::Resolve(top, new),
            Ok(Verdict::Reject(_)) => Outcome::Reject,
        }
    }

    fn check(opers: &OperDefs, top: &Token, new: &Token, height: usize) -> Result<Verdict, ReduceError> {
        validate(&Adjacency {
            opers,
            top,
            new,
            height,
            infix_at_start: false,
        })
    }

    #[test]
    fn all_role_pairs() {
        let _ = env_logger::builder().is_test(true).try_init();
        use Outcome::*;
        use Role::{
            Begin as B, End as E, Infix as I, InfixOrPostfix as IPo, InfixOrPrefix as IPr,
            Operand as O, Postfix as Po, Prefix as Pr, Zerofix as Z,
        };

        // Rows: token on top; columns: incoming token in `Role::OBSERVABLE` order
        // (begin, end, operand, infix, prefix, postfix, infix-or-prefix, infix-or-postfix).
        let table: [(Role, [Outcome; 8]); 8] = [
            (
                B,
                [Internal, Reject, Accept, Flagged, Accept, AcceptAs(Z), AcceptAs(Pr), AcceptAs(Z)],
            ),
            (E, [Internal; 8]),
            (
                O,
                [Internal, Accept, Reject, Accept, Reject, Accept, AcceptAs(I), Accept],
            ),
            (
                I,
                [Internal, Reject, Accept, Reject, Accept, Reject, AcceptAs(Pr), Reject],
            ),
            (
                Pr,
                [Internal, Reject, Accept, Reject, Accept, Reject, AcceptAs(Pr), Reject],
            ),
            (
                Po,
                [Internal, Accept, Reject, Accept, Reject, Accept, AcceptAs(I), Accept],
            ),
            (IPr, [Internal; 8]),
            (
                IPo,
                [
                    Internal,
                    Resolve(Po, E),
                    Resolve(I, O),
                    Resolve(Po, I),
                    Resolve(I, Pr),
                    Resolve(Po, Po),
                    Reject,
                    Resolve(Po, IPo),
                ],
            ),
        ];

        let opers = opers();
        let mut seen = 0;
        for (top_role, row) in table {
            let top = token(&opers, top_role);
            let height = if top_role == B { 1 } else { 3 };
            for (new_role, expected) in Role::OBSERVABLE.into_iter().zip(row) {
                let new = token(&opers, new_role);
                let got = outcome(check(&opers, &top, &new, height));
                assert_eq!(got, expected, "{} followed by {}", top_role, new_role);
                seen += 1;
            }
        }
        assert_eq!(seen, 64);
    }

    #[test]
    fn zerofix_on_top_behaves_as_operand() {
        let opers = opers();
        let top = token(&opers, Role::Zerofix);
        for new_role in Role::OBSERVABLE {
            let new = token(&opers, new_role);
            let operand = token(&opers, Role::Operand);
            assert_eq!(
                outcome(check(&opers, &top, &new, 3)),
                outcome(check(&opers, &operand, &new, 3)),
                "zerofix followed by {}",
                new_role
            );
        }
    }

    #[test]
    fn sole_operator_at_end_becomes_an_atom() {
        let opers = opers();
        for role in [Role::Infix, Role::Prefix, Role::Postfix, Role::InfixOrPostfix] {
            let top = token(&opers, role);
            assert_eq!(
                check(&opers, &top, &Token::End, 2).unwrap(),
                Verdict::Resolve {
                    top: Role::Zerofix,
                    new: Role::End
                },
                "{} alone",
                role
            );
        }
    }

    #[test]
    fn unexpected_end_names_the_operator() {
        let opers = opers();
        let top = token(&opers, Role::Infix);
        match check(&opers, &top, &Token::End, 3).unwrap() {
            Verdict::Reject(SyntaxError::UnexpectedEnd { after }) => {
                assert_eq!(after.as_str(), "op(500, yfx, '+')");
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn infix_at_start_rejects_everything_but_end() {
        let opers = opers();
        let top = token(&opers, Role::Infix);
        for new_role in Role::OBSERVABLE {
            if matches!(new_role, Role::Begin | Role::End) {
                continue;
            }
            let new = token(&opers, new_role);
            let verdict = validate(&Adjacency {
                opers: &opers,
                top: &top,
                new: &new,
                height: 2,
                infix_at_start: true,
            })
            .unwrap();
            assert!(
                matches!(verdict, Verdict::Reject(SyntaxError::InfixAtStart { .. })),
                "infix at start followed by {}",
                new_role
            );
        }
        let verdict = validate(&Adjacency {
            opers: &opers,
            top: &top,
            new: &Token::End,
            height: 2,
            infix_at_start: true,
        })
        .unwrap();
        assert_eq!(
            verdict,
            Verdict::Resolve {
                top: Role::Zerofix,
                new: Role::End
            }
        );
    }

    #[test]
    fn precedence_checks_between_adjacent_operators() {
        let opers = OperDefs::try_from_defs(
            "400 yfx *\n 600 fy ~\n 200 fx -\n 200 xf ?\n 100 xf !\n 300 xfx ==",
        )
        .unwrap();
        let op = |name: &str, role| Token::operator(opers.lookup(name).unwrap(), role);

        // `* ~`: the prefix binds looser than the infix allows on its right.
        let verdict = check(&opers, &op("*", Role::Infix), &op("~", Role::Prefix), 3).unwrap();
        assert!(matches!(verdict, Verdict::Reject(SyntaxError::InvalidRightArg { .. })));

        // `- -` with fx: equal precedence is not a valid argument.
        let verdict = check(&opers, &op("-", Role::Prefix), &op("-", Role::Prefix), 3).unwrap();
        assert!(matches!(verdict, Verdict::Reject(SyntaxError::IllegalAdjacency { .. })));

        // `! ?`: 100 < 200 fits the strict left side of `?`.
        let verdict = check(&opers, &op("!", Role::Postfix), &op("?", Role::Postfix), 3).unwrap();
        assert_eq!(verdict, Verdict::Accept);
        // `? !`: the other way round it does not.
        let verdict = check(&opers, &op("?", Role::Postfix), &op("!", Role::Postfix), 3).unwrap();
        assert!(matches!(verdict, Verdict::Reject(SyntaxError::IllegalAdjacency { .. })));

        // `? ==`: 200 < 300 on the strict left side.
        let verdict = check(&opers, &op("?", Role::Postfix), &op("==", Role::Infix), 3).unwrap();
        assert_eq!(verdict, Verdict::Accept);
        let opers2 = OperDefs::try_from_defs("200 xfx ==\n200 xf ?").unwrap();
        let eq = Token::operator(opers2.lookup("==").unwrap(), Role::Infix);
        let q = Token::operator(opers2.lookup("?").unwrap(), Role::Postfix);
        let verdict = check(&opers2, &q, &eq, 3).unwrap();
        assert!(matches!(verdict, Verdict::Reject(SyntaxError::InvalidLeftArg { .. })));
    }

    #[test]
    fn descriptors_are_selected_by_role() {
        let opers = opers();
        let op = |name: &str, role| Token::operator(opers.lookup(name).unwrap(), role);

        // `-` is looked up in its infix form on top and its prefix form below.
        let verdict = check(&opers, &op("-", Role::Infix), &op("-", Role::InfixOrPrefix), 3).unwrap();
        assert_eq!(verdict, Verdict::AcceptAs(Role::Prefix));

        // `!` has no infix form to select.
        let err = check(&opers, &op("!", Role::Infix), &op("\\", Role::Prefix), 3).unwrap_err();
        assert_eq!(
            err,
            ReduceError::internal("no infix definition for operator '!'")
        );
    }

    #[test]
    fn infix_or_postfix_checks_preceding_postfix() {
        // `a ! @ b` resolves `@` as infix; `!` must be a valid left argument.
        let opers = OperDefs::try_from_defs("300 xf !\n300 xfx @\n100 xf @").unwrap();
        let bang = opers.lookup("!").unwrap();
        let top = Token::Operator(OperToken {
            oper: opers.lookup("@").unwrap(),
            role: Role::InfixOrPostfix,
            prev: Some(OperRef {
                index: bang,
                fixity: Fixity::Postfix,
            }),
        });
        let verdict = check(&opers, &top, &Token::Operand(Term::atom("b")), 4).unwrap();
        assert!(matches!(verdict, Verdict::Reject(SyntaxError::InvalidLeftArg { .. })));

        // As a postfix `@` (xf 100) cannot take `!` (300) either.
        let verdict = check(&opers, &top, &Token::End, 4).unwrap();
        assert!(matches!(verdict, Verdict::Reject(SyntaxError::IllegalAdjacency { .. })));
    }

    #[test]
    fn infix_or_postfix_then_infix_or_prefix_picks_the_only_fit() {
        // `@` infix binds tighter than prefix `-`, so only (postfix, infix) fits.
        let opers = OperDefs::try_from_defs("100 yfx @\n50 yf @\n500 yfx -\n200 fy -").unwrap();
        let top = Token::operator(opers.lookup("@").unwrap(), Role::InfixOrPostfix);
        let new = Token::operator(opers.lookup("-").unwrap(), Role::InfixOrPrefix);
        assert_eq!(
            check(&opers, &top, &new, 3).unwrap(),
            Verdict::Resolve {
                top: Role::Postfix,
                new: Role::Infix
            }
        );

        // `-` infix binds tighter than postfix `@`, so only (infix, prefix) fits.
        let opers = OperDefs::try_from_defs("700 xfx @\n600 xf @\n100 xfx -\n200 fy -").unwrap();
        let top = Token::operator(opers.lookup("@").unwrap(), Role::InfixOrPostfix);
        let new = Token::operator(opers.lookup("-").unwrap(), Role::InfixOrPrefix);
        assert_eq!(
            check(&opers, &top, &new, 3).unwrap(),
            Verdict::Resolve {
                top: Role::Infix,
                new: Role::Prefix
            }
        );

        // Neither fits: the (postfix, infix) error is reported.
        let opers = OperDefs::try_from_defs("100 xfx @\n600 xf @\n100 xfx -\n200 fy -").unwrap();
        let top = Token::operator(opers.lookup("@").unwrap(), Role::InfixOrPostfix);
        let new = Token::operator(opers.lookup("-").unwrap(), Role::InfixOrPrefix);
        assert!(matches!(
            check(&opers, &top, &new, 3).unwrap(),
            Verdict::Reject(SyntaxError::InvalidLeftArg { .. })
        ));
    }
}
