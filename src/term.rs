//! Minimal Prolog-like term representation.
//!
//! The reducer only needs to build leaves, atoms, compounds and list cells;
//! [`Term`] provides exactly that, together with a canonical [`Display`]
//! form (`'+'(1, 2)`, `[a, b | T]`) used by tests, logs and the command line
//! tool.
//!
//! The [`atom!`](crate::atom), [`func!`](crate::func) and
//! [`list!`](crate::list) macros build terms tersely:
//!
//! ```rust
//! # use term_reducer::{atom, func, list};
//! let t = func!("+"; 1, func!("*"; atom!("x"), 2));
//! assert_eq!(t.to_string(), "'+'(1, '*'(x, 2))");
//! assert_eq!(list![1, 2].to_string(), "[1, 2]");
//! ```
//!
//! [`Display`]: std::fmt::Display

use smartstring::alias::String;
use std::fmt;

/// Name of the empty list atom.
pub const NIL: &str = "[]";

/// Functor names accepted as the two-argument list constructor.
pub const CONS_NAMES: &[&str] = &["[|]", "."];

/// A finished term.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Real(f64),
    /// Double-quoted string.
    Str(String),
    /// Variable, named as written.
    Var(String),
    /// Atom, i.e. a zero-argument functor.
    Atom(String),
    /// Compound term with at least one argument.
    Func(String, Vec<Term>),
    /// List cell.
    Cons(Box<Term>, Box<Term>),
}

impl Term {
    /// Creates an atom.
    pub fn atom(name: impl AsRef<str>) -> Self {
        Term::Atom(String::from(name.as_ref()))
    }

    /// Creates a variable.
    pub fn var(name: impl AsRef<str>) -> Self {
        Term::Var(String::from(name.as_ref()))
    }

    /// Creates a string term.
    pub fn str(text: impl AsRef<str>) -> Self {
        Term::Str(String::from(text.as_ref()))
    }

    /// Creates the empty list.
    pub fn nil() -> Self {
        Term::atom(NIL)
    }

    /// Creates a compound term, or an atom when `args` is empty.
    pub fn func(name: impl AsRef<str>, args: Vec<Term>) -> Self {
        if args.is_empty() {
            Term::atom(name)
        } else {
            Term::Func(String::from(name.as_ref()), args)
        }
    }

    /// Creates a list cell.
    pub fn cons(head: Term, tail: Term) -> Self {
        Term::Cons(Box::new(head), Box::new(tail))
    }

    /// Creates a proper list.
    pub fn list(items: Vec<Term>) -> Self {
        Term::listc(items, Term::nil())
    }

    /// Creates a list of `items` ending in `tail`.
    pub fn listc(items: Vec<Term>, tail: Term) -> Self {
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Term::cons(item, acc))
    }

    /// Returns the functor name of an atom or compound term.
    pub fn name(&self) -> Option<&str> {
        match self {
            Term::Atom(name) | Term::Func(name, _) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Returns the arguments of a compound term (empty for everything else).
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Func(_, args) => args,
            _ => &[],
        }
    }

    /// Returns the number of arguments.
    pub fn arity(&self) -> usize {
        match self {
            Term::Func(_, args) => args.len(),
            Term::Cons(_, _) => 2,
            _ => 0,
        }
    }

    /// Returns `true` for atoms.
    pub fn is_atom(&self) -> bool {
        matches!(self, Term::Atom(_))
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::Int(i)
    }
}

impl From<i32> for Term {
    fn from(i: i32) -> Self {
        Term::Int(i64::from(i))
    }
}

impl From<f64> for Term {
    fn from(r: f64) -> Self {
        Term::Real(r)
    }
}

/// Returns `true` if `name` can be written without quotes.
fn is_plain_atom(name: &str) -> bool {
    if name == NIL || name == "{}" {
        return true;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Writes `name` between single quotes, escaping quotes and backslashes.
pub(crate) fn write_quoted(f: &mut impl fmt::Write, name: &str) -> fmt::Result {
    f.write_char('\'')?;
    for c in name.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

/// Writes an atom name, quoting it only when required.
pub(crate) fn write_atom(f: &mut impl fmt::Write, name: &str) -> fmt::Result {
    if is_plain_atom(name) {
        f.write_str(name)
    } else {
        write_quoted(f, name)
    }
}

/// Returns `name` quoted only when required.
pub fn atom_text(name: &str) -> std::string::String {
    let mut s = std::string::String::new();
    // Writing into a String cannot fail.
    let _ = write_atom(&mut s, name);
    s
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Int(i) => write!(f, "{}", i),
            Term::Real(r) => {
                if r.is_finite() && r.fract() == 0.0 {
                    write!(f, "{:.1}", r)
                } else {
                    write!(f, "{}", r)
                }
            }
            Term::Str(s) => write!(f, "{:?}", s.as_str()),
            Term::Var(name) => f.write_str(name),
            Term::Atom(name) => write_atom(f, name),
            Term::Func(name, args) => {
                write_atom(f, name)?;
                f.write_str("(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Term::Cons(head, tail) => {
                write!(f, "[{}", head)?;
                let mut rest = tail.as_ref();
                loop {
                    match rest {
                        Term::Cons(head, tail) => {
                            write!(f, ", {}", head)?;
                            rest = tail.as_ref();
                        }
                        Term::Atom(name) if name.as_str() == NIL => break,
                        other => {
                            write!(f, " | {}", other)?;
                            break;
                        }
                    }
                }
                f.write_str("]")
            }
        }
    }
}

/// Builds an atom: `atom!("foo")`.
#[macro_export]
macro_rules! atom {
    ($name:expr) => {
        $crate::term::Term::atom($name)
    };
}

/// Builds a compound term: `func!("f"; atom!("a"), 1)`.
///
/// Arguments go through `Term::from`, so integers and reals can be written
/// directly.
#[macro_export]
macro_rules! func {
    ($name:expr; $($arg:expr),+ $(,)?) => {
        $crate::term::Term::func($name, ::std::vec![$($crate::term::Term::from($arg)),+])
    };
}

/// Builds a proper list: `list![1, atom!("a")]`.
#[macro_export]
macro_rules! list {
    ($($item:expr),* $(,)?) => {
        $crate::term::Term::list(::std::vec![$($crate::term::Term::from($item)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn func_without_args_is_an_atom() {
        assert_eq!(Term::func("foo", vec![]), Term::atom("foo"));
        assert!(Term::func("foo", vec![]).is_atom());
    }

    #[test]
    fn display_quotes_symbolic_atoms() {
        let t = func!("<="; func!("*"; 2, 2), 5);
        assert_eq!(t.to_string(), "'<='('*'(2, 2), 5)");
        assert_eq!(atom!("it's").to_string(), "'it\\'s'");
        assert_eq!(atom!("[]").to_string(), "[]");
        assert_eq!(atom!("Foo").to_string(), "'Foo'");
        assert_eq!(atom!("foo_Bar1").to_string(), "foo_Bar1");
    }

    #[test]
    fn display_lists() {
        assert_eq!(list![1, 2, 3].to_string(), "[1, 2, 3]");
        let partial = Term::listc(vec![Term::from(1)], Term::var("T"));
        assert_eq!(partial.to_string(), "[1 | T]");
        assert_eq!(Term::nil().to_string(), "[]");
    }

    #[test]
    fn display_leaves() {
        assert_eq!(Term::from(-7).to_string(), "-7");
        assert_eq!(Term::from(2.0).to_string(), "2.0");
        assert_eq!(Term::from(0.5).to_string(), "0.5");
        assert_eq!(Term::str("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(Term::var("_X").to_string(), "_X");
    }

    #[test]
    fn accessors() {
        let t = func!("f"; atom!("a"), 1);
        assert_eq!(t.name(), Some("f"));
        assert_eq!(t.arity(), 2);
        assert_eq!(t.args()[1], Term::Int(1));
        assert_eq!(Term::from(3).name(), None);
        assert_eq!(Term::cons(Term::from(1), Term::nil()).arity(), 2);
    }
}
