//! A small front end producing builder items from text.
//!
//! The reader is deliberately simple: operators, operands and parentheses
//! are separated by whitespace (`1 + 2`, not `1+2`), and there is no list,
//! curly or end-of-clause syntax. It recognizes
//!
//! - integers and reals (`42`, `-7`, `2.5`, `1e-3`),
//! - variables (`X`, `_Tail`),
//! - double-quoted strings and single-quoted atoms, with `\` escapes,
//! - canonical applications `f(a, b)` and `'+'(1, 2)`, the `(` written
//!   directly after the name,
//! - parenthesized groups `( ... )`, which become a single operand,
//! - operator names from the table; every other word is an atom.

use crate::error::{ReduceError, SyntaxError};
use crate::oper::OperDefs;
use crate::reducer::TermBuilder;
use crate::term::Term;
use anyhow::{Result, bail};
use smartstring::alias::String;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    /// `(`; `call` is set when it directly follows a name.
    Open { call: bool },
    Close,
    Comma,
    Word(String),
    Quoted(String),
    Str(String),
}

fn read_escaped(chars: &mut Peekable<Chars<'_>>, quote: char) -> Result<String> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => bail!("unterminated {}-quoted text", quote),
            Some(c) if c == quote => return Ok(text),
            Some('\\') => match chars.next() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some(c @ ('\\' | '\'' | '"')) => text.push(c),
                Some(c) => bail!("unknown escape \\{}", c),
                None => bail!("unterminated {}-quoted text", quote),
            },
            Some(c) => text.push(c),
        }
    }
}

fn lex(line: &str) -> Result<Vec<Lexeme>> {
    let mut lexemes = Vec::new();
    let mut chars = line.chars().peekable();
    // Whether the previous lexeme is a name with nothing in between.
    let mut glued = false;
    while let Some(&c) = chars.peek() {
        let lexeme = match c {
            c if c.is_whitespace() => {
                chars.next();
                glued = false;
                continue;
            }
            '(' => {
                chars.next();
                Lexeme::Open { call: glued }
            }
            ')' => {
                chars.next();
                Lexeme::Close
            }
            ',' => {
                chars.next();
                Lexeme::Comma
            }
            '\'' => {
                chars.next();
                Lexeme::Quoted(read_escaped(&mut chars, '\'')?)
            }
            '"' => {
                chars.next();
                Lexeme::Str(read_escaped(&mut chars, '"')?)
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | ',' | '\'' | '"') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                Lexeme::Word(word)
            }
        };
        glued = matches!(lexeme, Lexeme::Word(_) | Lexeme::Quoted(_));
        lexemes.push(lexeme);
    }
    Ok(lexemes)
}

fn number(word: &str) -> Option<Term> {
    if let Ok(i) = word.parse::<i64>() {
        return Some(Term::Int(i));
    }
    let digits = word.strip_prefix('-').unwrap_or(word);
    if digits.starts_with(|c: char| c.is_ascii_digit()) {
        return word.parse::<f64>().ok().map(Term::Real);
    }
    None
}

struct Reader<'a> {
    opers: &'a OperDefs,
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.pos)
    }

    fn next(&mut self) -> Option<Lexeme> {
        let lexeme = self.lexemes.get(self.pos).cloned();
        self.pos += 1;
        lexeme
    }

    fn call_follows(&self) -> bool {
        matches!(self.peek(), Some(Lexeme::Open { call: true }))
    }

    /// Reads items up to a closing parenthesis, the end of the line or, in an
    /// argument list, a comma.
    fn expr(&mut self, in_args: bool) -> Result<Term> {
        let mut builder = TermBuilder::new(self.opers);
        loop {
            match self.peek() {
                None | Some(Lexeme::Close) => break,
                Some(Lexeme::Comma) if in_args => break,
                _ => {}
            }
            match self.next() {
                Some(Lexeme::Open { .. }) => {
                    let group = self.expr(false)?;
                    self.close()?;
                    builder.add_operand(group)?;
                }
                Some(Lexeme::Comma) => builder.add_operator(",")?,
                Some(Lexeme::Word(name)) if self.call_follows() => self.apply(&mut builder, &name)?,
                Some(Lexeme::Quoted(name)) if self.call_follows() => self.apply(&mut builder, &name)?,
                Some(Lexeme::Word(word)) => {
                    if let Some(term) = number(&word) {
                        builder.add_operand(term)?;
                    } else if word.starts_with(|c: char| c.is_uppercase() || c == '_') {
                        builder.add_operand(Term::var(&word))?;
                    } else if self.opers.triplet(&word).is_some() {
                        builder.add_operator(&word)?;
                    } else {
                        builder.add_operand(Term::atom(&word))?;
                    }
                }
                Some(Lexeme::Quoted(name)) => builder.add_operand(Term::atom(&name))?,
                Some(Lexeme::Str(text)) => builder.add_operand(Term::str(&text))?,
                Some(Lexeme::Close) | None => bail!("unexpected end of items"),
            }
        }
        Ok(builder.finish()?)
    }

    /// Reads `(arg, ...)` after `name` and adds the application.
    fn apply(&mut self, builder: &mut TermBuilder<'_>, name: &str) -> Result<()> {
        self.next();
        let mut args = Vec::new();
        if matches!(self.peek(), Some(Lexeme::Close)) {
            return Err(ReduceError::from(SyntaxError::EmptyArgumentList).into());
        }
        loop {
            args.push(self.expr(true)?);
            match self.next() {
                Some(Lexeme::Comma) => continue,
                Some(Lexeme::Close) => break,
                _ => bail!("missing `)` after arguments of {:?}", name),
            }
        }
        if self.opers.triplet(name).is_some() {
            builder.add_operator_application(name, args)?;
        } else {
            builder.add_functor_application(name, args)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.next() {
            Some(Lexeme::Close) => Ok(()),
            _ => bail!("missing `)`"),
        }
    }
}

/// Reads one term from `line`.
///
/// # Errors
/// Lexical problems (unterminated quotes, unbalanced parentheses) are plain
/// [`anyhow`] errors; rejections by the reducer keep their type and can be
/// recovered with `downcast_ref::<ReduceError>()`.
pub fn read_term(line: &str, opers: &OperDefs) -> Result<Term> {
    let mut reader = Reader {
        opers,
        lexemes: lex(line)?,
        pos: 0,
    };
    let term = reader.expr(false)?;
    if reader.pos < reader.lexemes.len() {
        bail!("unexpected `)` at item {}", reader.pos + 1);
    }
    Ok(term)
}
