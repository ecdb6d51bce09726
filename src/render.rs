//! Operator-aware rendering of terms.
//!
//! [`to_items`] turns a term back into the item sequence a front end would
//! feed to a [`TermBuilder`]: operator applications become operator items
//! around their arguments, and any subterm that could not be written without
//! parentheses becomes a single operand item. [`rebuild`] feeds such a
//! sequence through a builder, so `rebuild(&to_items(t, o), o)` reproduces
//! `t` whenever `t` is free of renamed descriptors. Descriptors with
//! `embed_fixity` are never written in operator notation: their terms, and
//! terms whose first argument names such a descriptor's fixity, stay
//! canonical operands. [`format`] writes the same rendering as text readable
//! by [`crate::reader::read_term`].

use crate::error::ReduceError;
use crate::oper::{Fixity, OperDef, OperDefs, Tie};
use crate::reducer::TermBuilder;
use crate::term::{Term, atom_text};
use smartstring::alias::String;
use std::fmt::Write;

/// One item of a rendered term.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A finished subterm, parenthesized in text when it is an operator term.
    Operand(Term),
    /// An operator name.
    Operator(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Returns the descriptor `term` is written with in operator notation.
fn oper_form<'a>(term: &Term, opers: &'a OperDefs) -> Option<&'a OperDef> {
    let Term::Func(name, args) = term else {
        return None;
    };
    let triplet = opers.triplet(name)?;
    // Built by a descriptor that embeds its fixity as the first argument.
    if let Some(Term::Atom(first)) = args.first() {
        let fixity = first.parse::<Fixity>().ok();
        if triplet.defs().any(|d| d.embed_fixity && Some(d.fixity) == fixity) {
            return None;
        }
    }
    let def = match args.len() {
        1 => triplet
            .get(Fixity::Prefix)
            .or_else(|| triplet.get(Fixity::Postfix)),
        2 => triplet.get(Fixity::Infix),
        _ => None,
    }?;
    (!def.embed_fixity).then_some(def)
}

fn is_oper_atom(term: &Term, opers: &OperDefs) -> bool {
    match term {
        Term::Atom(name) => opers.triplet(name).is_some(),
        _ => false,
    }
}

/// Whether a term headed by `child` may be written without parentheses as
/// the `side` argument of `parent`.
fn inline(child: &OperDef, parent: &OperDef, side: Side) -> bool {
    let valid = match side {
        Side::Left => parent.left_arg_valid(child),
        Side::Right => parent.right_arg_valid(child),
    };
    if !valid {
        return false;
    }
    if child.prec < parent.prec {
        return true;
    }
    match (side, child.fixity) {
        (Side::Right, Fixity::Prefix) | (Side::Left, Fixity::Postfix) => true,
        (Side::Right, _) => OperDef::tie(parent, child) == Tie::Right,
        (Side::Left, _) => OperDef::tie(child, parent) == Tie::Left,
    }
}

fn push_arg(items: &mut Vec<Item>, arg: &Term, parent: &OperDef, side: Side, opers: &OperDefs) {
    match oper_form(arg, opers) {
        Some(child) if inline(child, parent, side) => push_term(items, arg, opers),
        _ => items.push(Item::Operand(arg.clone())),
    }
}

fn push_term(items: &mut Vec<Item>, term: &Term, opers: &OperDefs) {
    let Some(def) = oper_form(term, opers) else {
        items.push(Item::Operand(term.clone()));
        return;
    };
    let args = term.args();
    let name = Item::Operator(def.name.clone());
    match def.fixity {
        Fixity::Infix => {
            push_arg(items, &args[0], def, Side::Left, opers);
            items.push(name);
            push_arg(items, &args[1], def, Side::Right, opers);
        }
        Fixity::Prefix => {
            items.push(name);
            push_arg(items, &args[0], def, Side::Right, opers);
        }
        Fixity::Postfix => {
            push_arg(items, &args[0], def, Side::Left, opers);
            items.push(name);
        }
    }
}

/// Renders `term` into builder items.
///
/// An atom naming an operator renders as a lone operator item, which the
/// builder reads back as that atom. Nested inside another term it becomes
/// an operand item.
pub fn to_items(term: &Term, opers: &OperDefs) -> Vec<Item> {
    if let Term::Atom(name) = term {
        if opers.triplet(name).is_some() {
            return vec![Item::Operator(name.clone())];
        }
    }
    let mut items = Vec::new();
    push_term(&mut items, term, opers);
    items
}

/// Builds a term from rendered items.
pub fn rebuild(items: &[Item], opers: &OperDefs) -> Result<Term, ReduceError> {
    let mut builder = TermBuilder::new(opers);
    for item in items {
        match item {
            Item::Operand(term) => builder.add_operand(term.clone())?,
            Item::Operator(name) => builder.add_operator(name)?,
        }
    }
    builder.finish()
}

/// Writes `term` in operator notation.
///
/// Items are separated by single spaces, operand items that are operator
/// terms are parenthesized, and compound arguments above precedence 999 are
/// parenthesized as well.
pub fn format(term: &Term, opers: &OperDefs) -> std::string::String {
    let mut out = std::string::String::new();
    for (i, item) in to_items(term, opers).iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match item {
            Item::Operator(name) => out.push_str(name),
            Item::Operand(t) if oper_form(t, opers).is_some() || is_oper_atom(t, opers) => {
                out.push('(');
                out.push_str(&format(t, opers));
                out.push(')');
            }
            Item::Operand(t) => write_operand(&mut out, t, opers),
        }
    }
    out
}

fn write_operand(out: &mut std::string::String, term: &Term, opers: &OperDefs) {
    match term {
        Term::Atom(name) => out.push_str(&atom_text(name)),
        Term::Func(name, args) => {
            out.push_str(&atom_text(name));
            out.push('(');
            write_args(out, args.iter(), opers);
            out.push(')');
        }
        Term::Cons(head, tail) => {
            out.push('[');
            let mut items = vec![head.as_ref()];
            let mut rest = tail.as_ref();
            while let Term::Cons(head, tail) = rest {
                items.push(head.as_ref());
                rest = tail.as_ref();
            }
            write_args(out, items.into_iter(), opers);
            if *rest != Term::nil() {
                out.push_str(" | ");
                write_arg(out, rest, opers);
            }
            out.push(']');
        }
        // Writing into a String cannot fail.
        other => {
            let _ = write!(out, "{}", other);
        }
    }
}

fn write_args<'t>(out: &mut std::string::String, args: impl Iterator<Item = &'t Term>, opers: &OperDefs) {
    for (i, arg) in args.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_arg(out, arg, opers);
    }
}

fn write_arg(out: &mut std::string::String, arg: &Term, opers: &OperDefs) {
    match oper_form(arg, opers) {
        Some(def) if def.prec > 999 => {
            out.push('(');
            out.push_str(&format(arg, opers));
            out.push(')');
        }
        _ => out.push_str(&format(arg, opers)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{atom, func, list};

    fn round_trip(term: &Term, opers: &OperDefs) {
        let items = to_items(term, opers);
        let rebuilt = rebuild(&items, opers).unwrap_or_else(|e| panic!("{}: {:?}", e, items));
        assert_eq!(&rebuilt, term, "items {:?}", items);
    }

    #[test]
    fn items_follow_operator_notation() {
        let opers = OperDefs::iso();
        let t = func!("+"; 1, func!("*"; 2, 3));
        assert_eq!(
            to_items(&t, &opers),
            vec![
                Item::Operand(Term::from(1)),
                Item::Operator("+".into()),
                Item::Operand(Term::from(2)),
                Item::Operator("*".into()),
                Item::Operand(Term::from(3)),
            ]
        );
        // A looser argument becomes a single operand item.
        let t = func!("*"; func!("+"; 1, 2), 3);
        assert_eq!(
            to_items(&t, &opers),
            vec![
                Item::Operand(func!("+"; 1, 2)),
                Item::Operator("*".into()),
                Item::Operand(Term::from(3)),
            ]
        );
        assert_eq!(to_items(&atom!("-"), &opers), vec![Item::Operator("-".into())]);
    }

    #[test]
    fn terms_survive_rendering_and_rebuilding() {
        let _ = env_logger::builder().is_test(true).try_init();
        let opers = OperDefs::iso();
        let x = || Term::var("X");
        let terms = vec![
            func!("+"; 1, 2),
            func!("-"; func!("-"; 1, 2), 3),
            func!("-"; 1, func!("-"; 2, 3)),
            func!("^"; 2, func!("^"; 3, 4)),
            func!("^"; func!("^"; 2, 3), 4),
            func!("="; func!("="; atom!("a"), atom!("b")), atom!("c")),
            func!("-"; func!("*"; func!("-"; x()), 2)),
            func!("-"; func!("-"; func!("-"; 1))),
            func!(":-"; func!("p"; x()), func!(","; func!("q"; x()), func!(";"; atom!("r"), atom!("s")))),
            func!(":-"; func!("dynamic"; func!("/"; atom!("p"), 1))),
            func!("\\+"; func!("="; x(), 1)),
            func!("is"; x(), func!("mod"; func!("+"; atom!("a"), atom!("b")), 2)),
            func!("="; x(), atom!("+")),
            func!("f"; func!(","; 1, 2), list![1, 2]),
            atom!(":-"),
            func!("-"; atom!("-")),
        ];
        for t in &terms {
            round_trip(t, &opers);
        }
    }

    #[test]
    fn postfix_and_overloaded_operators_round_trip() {
        let opers = OperDefs::try_from_defs(
            "500 yfx +\n400 yfx *\n200 fy -\n100 yf !\n400 yfx @\n100 yf @\n700 xfx =",
        )
        .unwrap();
        let terms = vec![
            func!("!"; func!("+"; 1, 2)),
            func!("+"; func!("!"; 1), 2),
            func!("!"; func!("!"; atom!("n"))),
            func!("@"; 1, 2),
            func!("@"; func!("@"; 1), 2),
            func!("*"; func!("@"; 1), func!("-"; 2)),
            func!("="; func!("-"; func!("!"; 1)), func!("!"; func!("-"; 1))),
        ];
        for t in &terms {
            round_trip(t, &opers);
        }
    }

    #[test]
    fn embedded_fixity_terms_stay_canonical() {
        let opers = OperDefs::try_from_defs("400 yfx !\n100 yf ! embed\n500 yfx +").unwrap();
        let t = func!("!"; atom!("postfix"), atom!("x"));
        assert_eq!(to_items(&t, &opers), vec![Item::Operand(t.clone())]);
        round_trip(&t, &opers);

        // The plain infix form is still written as an operator.
        let t = func!("!"; atom!("a"), atom!("b"));
        assert_eq!(to_items(&t, &opers).len(), 3);
        round_trip(&t, &opers);

        let t = func!("+"; func!("!"; atom!("postfix"), 1), 2);
        round_trip(&t, &opers);
        assert_eq!(format(&t, &opers), "'!'(postfix, 1) + 2");
    }

    #[test]
    fn format_writes_operator_notation() {
        let opers = OperDefs::iso();
        let t = func!("*"; func!("+"; 1, 2), func!("-"; 3));
        assert_eq!(format(&t, &opers), "(1 + 2) * - 3");
        let t = func!(":-"; func!("p"; Term::var("X")), func!(","; atom!("q"), atom!("r")));
        assert_eq!(format(&t, &opers), "p(X) :- q , r");
        let t = func!("f"; func!(","; 1, 2), func!("+"; 1, 2), atom!("+"));
        assert_eq!(format(&t, &opers), "f((1 , 2), 1 + 2, +)");
        let t = func!("="; Term::var("X"), atom!("-"));
        assert_eq!(format(&t, &opers), "X = (-)");
        let t = func!("="; Term::str("hi"), func!("<=>"; atom!("a"), 2.5));
        assert_eq!(format(&t, &opers), "\"hi\" = '<=>'(a, 2.5)");
        let t = Term::listc(vec![Term::from(1), func!("-"; 2)], Term::var("T"));
        assert_eq!(format(&t, &opers), "[1, - 2 | T]");
    }
}
