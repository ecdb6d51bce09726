//! Operator definitions and precedence handling.
//!
//! This module defines the operator descriptor model consumed by the reducer:
//! fixity, associativity, precedence and the per-side relations derived from
//! them, grouped per operator name into an [`OperTriplet`] and registered in
//! an [`OperDefs`] table.
//!
//! # Overview
//! Operators in Prolog-like syntax are context-sensitive: one name may carry
//! a prefix, an infix and a postfix definition at the same time. The reducer
//! picks the definition that fits the surrounding tokens and then compares
//! precedences through the relations of each descriptor.
//!
//! # Precedence and relations
//! Precedences range over `0..=1200`; a **smaller** number binds tighter.
//! Each side of a descriptor carries a [`Relation`] that the precedence of the
//! operator term found in that argument position must satisfy against the
//! descriptor's own precedence:
//!
//! | Type  | Fixity  | Left            | Right           |
//! |-------|---------|-----------------|-----------------|
//! | `xfx` | infix   | `<`             | `<`             |
//! | `yfx` | infix   | `=<`            | `<`             |
//! | `xfy` | infix   | `<`             | `=<`            |
//! | `fx`  | prefix  | –               | `<`             |
//! | `fy`  | prefix  | –               | `=<`            |
//! | `xf`  | postfix | `<`             | –               |
//! | `yf`  | postfix | `=<`            | –               |
//!
//! # See Also
//! - [`crate::validate`]: uses the argument checks on adjacent operators.
//! - [`crate::reducer`]: resolves equal-precedence neighbours with [`OperDef::tie`].

use crate::term::{Term, atom_text};
use crate::token::Role;
use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use smartstring::alias::String;
use std::fmt;
use std::str::FromStr;

/// Defines the syntactic position (fixity) of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Fixity {
    /// Prefix operator, appearing before its operand, e.g. `-x`.
    Prefix = 0,

    /// Infix operator, appearing between operands, e.g. `x + y`.
    Infix = 1,

    /// Postfix operator, appearing after its operand, e.g., `x!`.
    Postfix = 2,
}

impl Fixity {
    /// The total number of fixity variants.
    pub const COUNT: usize = 3;

    /// String representations of each fixity variant, in declaration order.
    pub const STRS: &[&str] = &["prefix", "infix", "postfix"];

    /// All variants, in declaration order.
    pub const ALL: [Fixity; Fixity::COUNT] = [Fixity::Prefix, Fixity::Infix, Fixity::Postfix];
}

impl From<Fixity> for String {
    /// Converts a [`Fixity`] into its lowercase string representation.
    fn from(f: Fixity) -> Self {
        Fixity::STRS[Into::<usize>::into(f)].into()
    }
}

impl From<Fixity> for usize {
    /// Converts a [`Fixity`] value into its numeric index (0–2).
    fn from(f: Fixity) -> Self {
        f as usize
    }
}

impl fmt::Display for Fixity {
    /// Formats the fixity as its canonical lowercase name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(String::from(*self).as_str())
    }
}

/// Error type returned when parsing a [`Fixity`] from a string fails.
#[derive(Debug, Clone)]
pub struct ParseFixityError(String);

impl fmt::Display for ParseFixityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid fixity: {}", self.0)
    }
}

impl std::error::Error for ParseFixityError {}

/// Parses a string into a [`Fixity`] variant.
///
/// Accepts canonical lowercase names: `"prefix"`, `"infix"`, or `"postfix"`.
impl FromStr for Fixity {
    type Err = ParseFixityError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefix" => Ok(Fixity::Prefix),
            "infix" => Ok(Fixity::Infix),
            "postfix" => Ok(Fixity::Postfix),
            other => Err(ParseFixityError(String::from(other))),
        }
    }
}

/// Operator associativity classification.
///
/// | Variant | Description |
/// |----------|--------------|
/// | [`Assoc::None`]  | Non-associative: cannot chain with itself. |
/// | [`Assoc::Left`]  | Left-associative: groups from left to right. |
/// | [`Assoc::Right`] | Right-associative: groups from right to left. |
///
/// For prefix operators `Right` means `fy`, for postfix operators `Left`
/// means `yf`; a prefix operator cannot be `Left` and a postfix operator
/// cannot be `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Assoc {
    /// Non-associative operator.
    None = 0,
    /// Left-associative operator.
    Left = 1,
    /// Right-associative operator.
    Right = 2,
}

impl Assoc {
    /// Total number of associativity variants.
    pub const COUNT: usize = 3;

    /// Canonical string representations for each variant.
    pub const STRS: &[&str] = &["none", "left", "right"];
}

impl From<Assoc> for usize {
    fn from(a: Assoc) -> Self {
        a as usize
    }
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Assoc::STRS[usize::from(*self)])
    }
}

/// Error type returned when parsing an [`Assoc`] from a string fails.
#[derive(Debug, Clone)]
pub struct ParseAssocError(String);

impl fmt::Display for ParseAssocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid associativity: {}", self.0)
    }
}

impl std::error::Error for ParseAssocError {}

impl FromStr for Assoc {
    type Err = ParseAssocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Assoc::None),
            "left" => Ok(Assoc::Left),
            "right" => Ok(Assoc::Right),
            other => Err(ParseAssocError(String::from(other))),
        }
    }
}

/// Comparison a neighbouring precedence must satisfy on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The argument must bind strictly tighter (`<`).
    Strict,
    /// The argument may bind equally tight (`=<`).
    NonStrict,
}

impl Relation {
    /// Returns `true` if an argument of precedence `arg` satisfies the
    /// relation against an operator of precedence `oper`.
    pub fn holds(self, arg: usize, oper: usize) -> bool {
        match self {
            Relation::Strict => arg < oper,
            Relation::NonStrict => arg <= oper,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Strict => "<",
            Relation::NonStrict => "=<",
        })
    }
}

/// Classical Prolog operator type specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Xfx,
    Xfy,
    Yfx,
    Fy,
    Fx,
    Xf,
    Yf,
}

impl OpType {
    /// Canonical spellings, in declaration order.
    pub const STRS: &[&str] = &["xfx", "xfy", "yfx", "fy", "fx", "xf", "yf"];

    /// Combines a fixity and an associativity into a type specifier.
    pub fn from_parts(fixity: Fixity, assoc: Assoc) -> Result<Self> {
        Ok(match (fixity, assoc) {
            (Fixity::Infix, Assoc::None) => OpType::Xfx,
            (Fixity::Infix, Assoc::Left) => OpType::Yfx,
            (Fixity::Infix, Assoc::Right) => OpType::Xfy,
            (Fixity::Prefix, Assoc::None) => OpType::Fx,
            (Fixity::Prefix, Assoc::Right) => OpType::Fy,
            (Fixity::Postfix, Assoc::None) => OpType::Xf,
            (Fixity::Postfix, Assoc::Left) => OpType::Yf,
            (fixity, assoc) => {
                bail!(
                    "operator with type {:?} cannot have associativity {:?}",
                    fixity,
                    assoc
                )
            }
        })
    }

    /// Returns the fixity the type specifier declares.
    pub fn fixity(self) -> Fixity {
        match self {
            OpType::Xfx | OpType::Xfy | OpType::Yfx => Fixity::Infix,
            OpType::Fy | OpType::Fx => Fixity::Prefix,
            OpType::Xf | OpType::Yf => Fixity::Postfix,
        }
    }

    /// Returns the associativity; prefix types are never left- and
    /// postfix types never right-associative.
    pub fn assoc(self) -> Assoc {
        match self {
            OpType::Xfx | OpType::Fx | OpType::Xf => Assoc::None,
            OpType::Yfx | OpType::Yf => Assoc::Left,
            OpType::Xfy | OpType::Fy => Assoc::Right,
        }
    }

    /// Returns the `(left, right)` relations. The side a prefix or postfix
    /// operator has no argument on is reported as [`Relation::Strict`].
    pub fn relations(self) -> (Relation, Relation) {
        use Relation::{NonStrict, Strict};
        match self {
            OpType::Xfx => (Strict, Strict),
            OpType::Yfx => (NonStrict, Strict),
            OpType::Xfy => (Strict, NonStrict),
            OpType::Fx => (Strict, Strict),
            OpType::Fy => (Strict, NonStrict),
            OpType::Xf => (Strict, Strict),
            OpType::Yf => (NonStrict, Strict),
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(OpType::STRS[*self as usize])
    }
}

impl FromStr for OpType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "xfx" => OpType::Xfx,
            "xfy" => OpType::Xfy,
            "yfx" => OpType::Yfx,
            "fy" => OpType::Fy,
            "fx" => OpType::Fx,
            "xf" => OpType::Xf,
            "yf" => OpType::Yf,
            other => bail!("invalid operator type: {}", other),
        })
    }
}

/// Default precedence bounds.
///
/// - [`MIN_OPER_PREC`]: minimum allowed precedence (0).
/// - [`MAX_OPER_PREC`]: maximum allowed precedence (1200).
pub const MIN_OPER_PREC: usize = 0;
pub const MAX_OPER_PREC: usize = 1200;

/// Outcome of comparing two operators of equal precedence that compete for
/// the same operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tie {
    /// The left operator's term nests inside the right operator
    /// (`a - b - c` is `(a - b) - c`).
    Left,
    /// The right operator's term nests inside the left operator
    /// (`a ^ b ^ c` is `a ^ (b ^ c)`).
    Right,
    /// Neither nesting is allowed.
    Clash,
    /// Both nestings are allowed.
    Ambiguous,
}

/// Defines a single operator: name, fixity, precedence, associativity and
/// the optional normalization applied to terms built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct OperDef {
    /// Operator name as it occurs in the token stream.
    pub name: String,
    /// Operator fixity (prefix, infix, or postfix).
    pub fixity: Fixity,
    /// Operator precedence (`0`–`1200`); lower binds tighter.
    pub prec: usize,
    /// Operator associativity (depends on fixity).
    pub assoc: Assoc,
    /// Relation required of the left argument.
    pub left: Relation,
    /// Relation required of the right argument.
    pub right: Relation,
    /// Functor used in built terms instead of `name`.
    pub rename_to: Option<String>,
    /// Whether the fixity name is inserted as the first argument of built terms.
    pub embed_fixity: bool,
}

impl OperDef {
    /// Creates a descriptor from a Prolog type specifier.
    pub fn new(name: impl AsRef<str>, op_type: OpType, prec: usize) -> Self {
        let (left, right) = op_type.relations();
        Self {
            name: String::from(name.as_ref()),
            fixity: op_type.fixity(),
            prec,
            assoc: op_type.assoc(),
            left,
            right,
            rename_to: None,
            embed_fixity: false,
        }
    }

    /// Creates a descriptor from a fixity and an associativity.
    pub fn try_new(name: impl AsRef<str>, fixity: Fixity, assoc: Assoc, prec: usize) -> Result<Self> {
        let op_type = OpType::from_parts(fixity, assoc)
            .with_context(|| format!("defining operator {:?}", name.as_ref()))?;
        Ok(Self::new(name, op_type, prec))
    }

    /// Builds terms with `functor` instead of the operator name.
    pub fn with_rename(mut self, functor: impl AsRef<str>) -> Self {
        self.rename_to = Some(String::from(functor.as_ref()));
        self
    }

    /// Builds terms with the fixity name as an extra first argument.
    pub fn with_embed_fixity(mut self) -> Self {
        self.embed_fixity = true;
        self
    }

    /// Returns the Prolog type specifier of this descriptor.
    pub fn op_type(&self) -> OpType {
        match (self.fixity, self.left, self.right) {
            (Fixity::Infix, Relation::Strict, Relation::Strict) => OpType::Xfx,
            (Fixity::Infix, Relation::NonStrict, _) => OpType::Yfx,
            (Fixity::Infix, Relation::Strict, Relation::NonStrict) => OpType::Xfy,
            (Fixity::Prefix, _, Relation::Strict) => OpType::Fx,
            (Fixity::Prefix, _, Relation::NonStrict) => OpType::Fy,
            (Fixity::Postfix, Relation::Strict, _) => OpType::Xf,
            (Fixity::Postfix, Relation::NonStrict, _) => OpType::Yf,
        }
    }

    /// Returns `true` if a term headed by `other` may be this operator's
    /// left argument.
    pub fn left_arg_valid(&self, other: &OperDef) -> bool {
        self.left.holds(other.prec, self.prec)
    }

    /// Returns `true` if a term headed by `other` may be this operator's
    /// right argument.
    pub fn right_arg_valid(&self, other: &OperDef) -> bool {
        self.right.holds(other.prec, self.prec)
    }

    /// Same-side check for prefix and postfix chains: the operand side of
    /// a prefix operator is its right, of a postfix operator its left. For
    /// infix descriptors both sides must accept `other`.
    pub fn arg_valid(&self, other: &OperDef) -> bool {
        match self.fixity {
            Fixity::Prefix => self.right_arg_valid(other),
            Fixity::Postfix => self.left_arg_valid(other),
            Fixity::Infix => self.left_arg_valid(other) && self.right_arg_valid(other),
        }
    }

    /// Compares two operators of equal precedence where `left` occurs before
    /// `right` and both compete for the operand between them.
    ///
    /// `left` may nest inside `right` when `right` is left-associative, and
    /// `right` may nest inside `left` when `left` is right-associative.
    pub fn tie(left: &OperDef, right: &OperDef) -> Tie {
        debug_assert_eq!(left.prec, right.prec);
        let nest_left = right.assoc == Assoc::Left;
        let nest_right = left.assoc == Assoc::Right;
        match (nest_left, nest_right) {
            (true, false) => Tie::Left,
            (false, true) => Tie::Right,
            (false, false) => Tie::Clash,
            (true, true) => Tie::Ambiguous,
        }
    }

    /// Builds the compound term for an application of this operator,
    /// applying `rename_to` and `embed_fixity`.
    pub fn make_term(&self, mut args: Vec<Term>) -> Term {
        if self.embed_fixity {
            args.insert(0, Term::atom(String::from(self.fixity)));
        }
        let functor = self.rename_to.as_ref().unwrap_or(&self.name);
        Term::func(functor, args)
    }
}

impl fmt::Display for OperDef {
    /// Formats the descriptor as an `op/3` directive, e.g. `op(500, yfx, -)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "op({}, {}, {})",
            self.prec,
            self.op_type(),
            atom_text(&self.name)
        )
    }
}

/// Operator definitions sharing one name, indexed by [`Fixity`].
#[derive(Debug, Clone, PartialEq)]
pub struct OperTriplet {
    name: String,
    tab: [Option<OperDef>; Fixity::COUNT],
}

impl OperTriplet {
    /// Creates a new, empty [`OperTriplet`] with all fixity slots unset.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: String::from(name.as_ref()),
            tab: [const { None }; Fixity::COUNT],
        }
    }

    /// Returns the operator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_prefix(&self) -> bool {
        self.tab[usize::from(Fixity::Prefix)].is_some()
    }

    pub fn has_infix(&self) -> bool {
        self.tab[usize::from(Fixity::Infix)].is_some()
    }

    pub fn has_postfix(&self) -> bool {
        self.tab[usize::from(Fixity::Postfix)].is_some()
    }

    /// Retrieves the operator definition for the given [`Fixity`], if present.
    pub fn get(&self, fixity: Fixity) -> Option<&OperDef> {
        self.tab[usize::from(fixity)].as_ref()
    }

    /// Iterates over the defined descriptors.
    pub fn defs(&self) -> impl Iterator<Item = &OperDef> {
        self.tab.iter().flatten()
    }

    /// Selects the descriptor matching a resolved role.
    ///
    /// Returns `None` for roles that do not correspond to a fixity.
    pub fn for_role(&self, role: Role) -> Option<&OperDef> {
        self.get(role.fixity()?)
    }

    /// Returns the role an occurrence of this operator is declared with,
    /// before any neighbouring token has been seen.
    pub fn role(&self) -> Option<Role> {
        match (self.has_prefix(), self.has_infix(), self.has_postfix()) {
            (false, true, false) => Some(Role::Infix),
            (true, false, false) => Some(Role::Prefix),
            (false, false, true) => Some(Role::Postfix),
            (true, true, false) => Some(Role::InfixOrPrefix),
            (false, true, true) => Some(Role::InfixOrPostfix),
            // Prefix together with postfix is refused by `OperDefs::define_oper`.
            _ => None,
        }
    }
}

impl std::ops::Index<Fixity> for OperTriplet {
    type Output = Option<OperDef>;

    fn index(&self, i: Fixity) -> &Self::Output {
        let i: usize = i.into();
        &self.tab[i]
    }
}

/// Central registry of all operator definitions.
///
/// [`OperDefs`] maps operator names to their [`OperTriplet`]. Indices are
/// stable in insertion order, so tokens refer to a triplet by index.
#[derive(Debug, Clone, Default)]
pub struct OperDefs {
    map: IndexMap<String, OperTriplet>,
}

/// The standard operator table of ISO Prolog plus the common extensions.
const ISO_OPERS: &[(usize, OpType, &str)] = &[
    (1200, OpType::Xfx, ":-"),
    (1200, OpType::Xfx, "-->"),
    (1200, OpType::Fx, ":-"),
    (1200, OpType::Fx, "?-"),
    (1150, OpType::Fx, "dynamic"),
    (1150, OpType::Fx, "discontiguous"),
    (1150, OpType::Fx, "initialization"),
    (1150, OpType::Fx, "multifile"),
    (1100, OpType::Xfy, ";"),
    (1100, OpType::Xfy, "|"),
    (1050, OpType::Xfy, "->"),
    (1050, OpType::Xfy, "*->"),
    (1000, OpType::Xfy, ","),
    (900, OpType::Fy, "\\+"),
    (700, OpType::Xfx, "="),
    (700, OpType::Xfx, "\\="),
    (700, OpType::Xfx, "=="),
    (700, OpType::Xfx, "\\=="),
    (700, OpType::Xfx, "@<"),
    (700, OpType::Xfx, "@>"),
    (700, OpType::Xfx, "@=<"),
    (700, OpType::Xfx, "@>="),
    (700, OpType::Xfx, "=.."),
    (700, OpType::Xfx, "is"),
    (700, OpType::Xfx, "=:="),
    (700, OpType::Xfx, "=\\="),
    (700, OpType::Xfx, "<"),
    (700, OpType::Xfx, ">"),
    (700, OpType::Xfx, "=<"),
    (700, OpType::Xfx, ">="),
    (600, OpType::Xfy, ":"),
    (500, OpType::Yfx, "+"),
    (500, OpType::Yfx, "-"),
    (500, OpType::Yfx, "/\\"),
    (500, OpType::Yfx, "\\/"),
    (500, OpType::Yfx, "xor"),
    (400, OpType::Yfx, "*"),
    (400, OpType::Yfx, "/"),
    (400, OpType::Yfx, "//"),
    (400, OpType::Yfx, "rem"),
    (400, OpType::Yfx, "mod"),
    (400, OpType::Yfx, "div"),
    (400, OpType::Yfx, "<<"),
    (400, OpType::Yfx, ">>"),
    (200, OpType::Xfx, "**"),
    (200, OpType::Xfy, "^"),
    (200, OpType::Fy, "-"),
    (200, OpType::Fy, "+"),
    (200, OpType::Fy, "\\"),
];

static ISO_OPER_DEFS: Lazy<OperDefs> = Lazy::new(|| {
    let mut opers = OperDefs::new();
    for &(prec, op_type, name) in ISO_OPERS {
        opers.insert(OperDef::new(name, op_type, prec));
    }
    opers
});

impl OperDefs {
    /// Creates an empty [`OperDefs`] registry.
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }

    /// Returns a copy of the standard Prolog operator table.
    pub fn iso() -> Self {
        ISO_OPER_DEFS.clone()
    }

    /// Builds a table from `prec type name` lines, see [`OperDefs::define_opers`].
    pub fn try_from_defs(text: &str) -> Result<Self> {
        let mut opers = Self::new();
        opers.define_opers(text)?;
        Ok(opers)
    }

    /// Returns the total number of operator names in this registry.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no operator is defined.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Looks up an operator by name and returns its index, if defined.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.map.get_index_of(name)
    }

    /// Retrieves an operator triplet by index.
    pub fn get(&self, index: usize) -> Option<&OperTriplet> {
        self.map.get_index(index).map(|(_, tab)| tab)
    }

    /// Retrieves an operator triplet by name.
    pub fn triplet(&self, name: &str) -> Option<&OperTriplet> {
        self.map.get(name)
    }

    /// Iterates over all triplets in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &OperTriplet> {
        self.map.values()
    }

    fn insert(&mut self, def: OperDef) {
        let tab = self
            .map
            .entry(def.name.clone())
            .or_insert_with(|| OperTriplet::new(&def.name));
        let fixity = def.fixity;
        tab.tab[usize::from(fixity)] = Some(def);
    }

    /// Defines an operator from its Prolog type specifier, e.g.
    /// `opers.define("+", "yfx", 500)`.
    pub fn define(&mut self, name: &str, op_type: &str, prec: usize) -> Result<()> {
        let op_type: OpType = op_type.parse()?;
        self.define_oper(OperDef::new(name, op_type, prec))
    }

    /// Registers a single operator definition.
    ///
    /// # Errors
    /// Returns an error if the precedence is out of range, the same fixity is
    /// already defined for the name, or the definition would give the name
    /// both a prefix and a postfix form.
    pub fn define_oper(&mut self, def: OperDef) -> Result<()> {
        let name = def.name.clone();
        if !(MIN_OPER_PREC..=MAX_OPER_PREC).contains(&def.prec) {
            bail!(
                "precedence {} is out of range for operator {:?} with type {:?} (expected {}–{})",
                def.prec,
                name,
                def.fixity,
                MIN_OPER_PREC,
                MAX_OPER_PREC,
            );
        }
        if def.name.is_empty() {
            bail!("operator name cannot be empty");
        }

        if let Some(tab) = self.map.get(name.as_str()) {
            if tab[def.fixity].is_some() {
                bail!("cannot re-define {:?} with type {:?}", name, def.fixity);
            }
            let conflicting = match def.fixity {
                Fixity::Prefix => tab.has_postfix(),
                Fixity::Postfix => tab.has_prefix(),
                Fixity::Infix => false,
            };
            if conflicting {
                bail!(
                    "cannot define {:?} with type {:?}; it already has the opposite unary form",
                    name,
                    def.fixity,
                );
            }
        }

        log::trace!("Defining {}", def);
        self.insert(def);
        Ok(())
    }

    /// Defines one operator per line of `text`.
    ///
    /// Each line reads `prec type name [rename=functor] [embed]`; blank lines
    /// and lines starting with `%` are skipped:
    ///
    /// ```text
    /// % arithmetic
    /// 500 yfx +
    /// 200 fy  -  rename=neg
    /// 100 yf  !  embed
    /// ```
    ///
    /// # Errors
    /// Returns an error naming the line of the first malformed or invalid
    /// definition.
    pub fn define_opers(&mut self, text: &str) -> Result<()> {
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            self.define_line(line)
                .with_context(|| format!("operator definition on line {}", line_no + 1))?;
        }
        Ok(())
    }

    fn define_line(&mut self, line: &str) -> Result<()> {
        let mut words = line.split_whitespace();
        let (Some(prec), Some(op_type), Some(name)) = (words.next(), words.next(), words.next())
        else {
            bail!("expected `prec type name`, found {:?}", line);
        };
        let prec: usize = prec
            .parse()
            .with_context(|| format!("invalid precedence {:?}", prec))?;
        let op_type: OpType = op_type.parse()?;
        let mut def = OperDef::new(name, op_type, prec);
        for option in words {
            match option.split_once('=') {
                Some(("rename", functor)) if !functor.is_empty() => {
                    def = def.with_rename(functor);
                }
                None if option == "embed" => {
                    def = def.with_embed_fixity();
                }
                _ => bail!("unknown option {:?}", option),
            }
        }
        self.define_oper(def)
    }
}
