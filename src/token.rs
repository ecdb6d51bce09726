//! Tokens seen by the reducer.
//!
//! A [`Token`] is either a sentinel, a finished operand or an occurrence of
//! an operator. Operator occurrences refer to their [`OperTriplet`] by index
//! into the [`OperDefs`] table and carry the [`Role`] they currently play.
//!
//! [`OperTriplet`]: crate::oper::OperTriplet

use crate::error::ReduceError;
use crate::oper::{Fixity, OperDef, OperDefs};
use crate::term::{Term, atom_text};
use smartstring::alias::String;
use std::fmt;

/// The part a token plays in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Start-of-sequence sentinel.
    Begin,
    /// End-of-sequence sentinel.
    End,
    /// A finished term.
    Operand,
    Infix,
    Prefix,
    Postfix,
    /// Declared infix and prefix; resolved as soon as the token arrives.
    InfixOrPrefix,
    /// Declared infix and postfix; resolved when the next token arrives.
    InfixOrPostfix,
    /// An operator standing alone as an atom. Only produced by resolution.
    Zerofix,
}

impl Role {
    /// Roles a token may have when it meets the validator.
    pub const OBSERVABLE: [Role; 8] = [
        Role::Begin,
        Role::End,
        Role::Operand,
        Role::Infix,
        Role::Prefix,
        Role::Postfix,
        Role::InfixOrPrefix,
        Role::InfixOrPostfix,
    ];

    /// Returns the fixity of a resolved operator role.
    pub fn fixity(self) -> Option<Fixity> {
        match self {
            Role::Infix => Some(Fixity::Infix),
            Role::Prefix => Some(Fixity::Prefix),
            Role::Postfix => Some(Fixity::Postfix),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Begin => "begin",
            Role::End => "end",
            Role::Operand => "operand",
            Role::Infix => "infix",
            Role::Prefix => "prefix",
            Role::Postfix => "postfix",
            Role::InfixOrPrefix => "infix-or-prefix",
            Role::InfixOrPostfix => "infix-or-postfix",
            Role::Zerofix => "zerofix",
        })
    }
}

/// Names one descriptor of the table: a triplet index plus a fixity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperRef {
    pub index: usize,
    pub fixity: Fixity,
}

impl OperRef {
    /// Looks the descriptor up in `opers`.
    pub fn def<'a>(&self, opers: &'a OperDefs) -> Option<&'a OperDef> {
        opers.get(self.index)?.get(self.fixity)
    }
}

/// An operator occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperToken {
    /// Index of the triplet in the [`OperDefs`] table.
    pub oper: usize,
    /// Current role.
    pub role: Role,
    /// Descriptor of the operator token that was on top of the input stack
    /// when this one was pushed.
    pub prev: Option<OperRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Begin,
    End,
    Operand(Term),
    Operator(OperToken),
}

impl Token {
    /// Creates an operator token with its declared role.
    pub fn operator(oper: usize, role: Role) -> Self {
        Token::Operator(OperToken {
            oper,
            role,
            prev: None,
        })
    }

    /// Returns the role the token currently plays.
    pub fn role(&self) -> Role {
        match self {
            Token::Begin => Role::Begin,
            Token::End => Role::End,
            Token::Operand(_) => Role::Operand,
            Token::Operator(op) => op.role,
        }
    }

    /// Returns a copy of this token playing `role`.
    ///
    /// Overloaded roles may resolve to one of their two fixities, and any
    /// operator may resolve to [`Role::Zerofix`]. Asking for the current
    /// role is a no-op.
    ///
    /// # Errors
    /// Any other change is a reducer defect reported as
    /// [`ReduceError::Internal`].
    pub fn resolve(&self, role: Role) -> Result<Token, ReduceError> {
        if self.role() == role {
            return Ok(self.clone());
        }
        let Token::Operator(op) = self else {
            return Err(ReduceError::internal(format!(
                "cannot resolve {} token to {}",
                self.role(),
                role
            )));
        };
        let allowed = matches!(
            (op.role, role),
            (Role::InfixOrPrefix, Role::Infix | Role::Prefix)
                | (Role::InfixOrPostfix, Role::Infix | Role::Postfix)
                | (
                    Role::Infix
                        | Role::Prefix
                        | Role::Postfix
                        | Role::InfixOrPrefix
                        | Role::InfixOrPostfix,
                    Role::Zerofix
                )
        );
        if !allowed {
            return Err(ReduceError::internal(format!(
                "cannot resolve {} operator to {}",
                op.role, role
            )));
        }
        Ok(Token::Operator(OperToken { role, ..*op }))
    }

    /// Returns the descriptor this token stands for once its role is resolved.
    pub fn oper_ref(&self) -> Option<OperRef> {
        match self {
            Token::Operator(op) => op.role.fixity().map(|fixity| OperRef {
                index: op.oper,
                fixity,
            }),
            _ => None,
        }
    }

    /// Describes the token for error messages.
    pub fn describe(&self, opers: &OperDefs) -> String {
        match self {
            Token::Begin => "start of term".into(),
            Token::End => "end of term".into(),
            Token::Operand(term) => format!("operand {}", term).into(),
            Token::Operator(op) => {
                let name = opers.get(op.oper).map(|t| t.name()).unwrap_or("?");
                match self.oper_ref().and_then(|r| r.def(opers)) {
                    Some(def) => def.to_string().into(),
                    None if op.role == Role::Zerofix => format!("atom {}", atom_text(name)).into(),
                    None => format!("operator {}", atom_text(name)).into(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opers() -> OperDefs {
        OperDefs::try_from_defs("500 yfx -\n200 fy -\n400 yfx @\n100 xf @\n700 xfx =").unwrap()
    }

    #[test]
    fn overloaded_roles_resolve_to_their_fixities() {
        let opers = opers();
        let minus = Token::operator(opers.lookup("-").unwrap(), Role::InfixOrPrefix);
        assert_eq!(minus.resolve(Role::Prefix).unwrap().role(), Role::Prefix);
        assert_eq!(minus.resolve(Role::Infix).unwrap().role(), Role::Infix);
        assert!(minus.resolve(Role::Postfix).unwrap_err().is_internal());

        let at = Token::operator(opers.lookup("@").unwrap(), Role::InfixOrPostfix);
        assert_eq!(at.resolve(Role::Postfix).unwrap().role(), Role::Postfix);
        assert!(at.resolve(Role::Prefix).is_err());
        assert_eq!(at.resolve(Role::Zerofix).unwrap().role(), Role::Zerofix);
    }

    #[test]
    fn resolution_keeps_the_original_token() {
        let opers = opers();
        let minus = Token::operator(opers.lookup("-").unwrap(), Role::InfixOrPrefix);
        let prefix = minus.resolve(Role::Prefix).unwrap();
        assert_eq!(minus.role(), Role::InfixOrPrefix);
        assert_ne!(minus, prefix);
        assert!(prefix.resolve(Role::Infix).is_err());
    }

    #[test]
    fn non_operators_do_not_resolve() {
        assert!(Token::Operand(Term::from(1)).resolve(Role::Zerofix).is_err());
        assert!(Token::Begin.resolve(Role::Operand).is_err());
        assert_eq!(Token::End.resolve(Role::End).unwrap(), Token::End);
    }

    #[test]
    fn oper_ref_only_for_fixity_roles() {
        let opers = opers();
        let index = opers.lookup("=").unwrap();
        let eq = Token::operator(index, Role::Infix);
        let oper_ref = eq.oper_ref().unwrap();
        assert_eq!(oper_ref, OperRef { index, fixity: Fixity::Infix });
        assert_eq!(oper_ref.def(&opers).unwrap().prec, 700);
        assert!(eq.resolve(Role::Zerofix).unwrap().oper_ref().is_none());
        assert!(Token::operator(opers.lookup("-").unwrap(), Role::InfixOrPrefix)
            .oper_ref()
            .is_none());
    }

    #[test]
    fn descriptions() {
        let opers = opers();
        let eq = Token::operator(opers.lookup("=").unwrap(), Role::Infix);
        assert_eq!(eq.describe(&opers).as_str(), "op(700, xfx, '=')");
        let minus = Token::operator(opers.lookup("-").unwrap(), Role::InfixOrPrefix);
        assert_eq!(minus.describe(&opers).as_str(), "operator '-'");
        assert_eq!(
            minus.resolve(Role::Zerofix).unwrap().describe(&opers).as_str(),
            "atom '-'"
        );
        assert_eq!(Token::Operand(Term::atom("a")).describe(&opers).as_str(), "operand a");
        assert_eq!(Token::End.describe(&opers).as_str(), "end of term");
    }
}
