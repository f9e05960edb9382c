//! The parser for the pattern surface syntax: a POSIX-like dialect with bracket classes,
//! counted repetition and class set operators `{-}` (intersection) and `{+}` (union). Parsing
//! produces a small AST which is then lowered through the expression pool's smart constructors;
//! bracket classes desugar into the closed algebra (a positive class becomes a union of
//! symbols, a negated class becomes `. ∧ ¬(…)`).

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{self, char as nom_char};
use nom::combinator::{map, opt, value, verify};
use nom::error::{Error as NomError, ErrorKind};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

use crate::errors::{DescanError, DescanErrorKind, Result};

use super::{char_set::CharSet, expression::ExprPool, ExprID};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Ast {
    Empty,
    Dot,
    Literal(char),
    Class(ClassAtom),
    Seq(Vec<Ast>),
    Alt(Vec<Ast>),
    Star(Box<Ast>),
    Plus(Box<Ast>),
    Opt(Box<Ast>),
    Repeat(Box<Ast>, u32, Option<u32>),
    SetOp(SetOperator, Box<Ast>, Box<Ast>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetOperator {
    Intersection,
    Union,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassAtom {
    negated: bool,
    items: Vec<BracketItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BracketItem {
    Char(char),
    Range(char, char),
    Set(CharSet),
    /// A range whose endpoint is not a literal symbol; rejected during lowering.
    BadRange,
}

/// Parse a pattern into an interned expression.
pub(crate) fn parse_pattern(pool: &mut ExprPool, pattern: &str) -> Result<ExprID> {
    let ast = match expression(pattern) {
        Ok(("", ast)) => ast,
        Ok((rest, _)) => {
            return Err(parse_error(
                pattern,
                format!("unexpected trailing input at '{}'", rest.escape_default()),
            ))
        }
        Err(e) => return Err(parse_error(pattern, e.to_string())),
    };
    lower(pool, &ast)
}

fn parse_error(pattern: &str, message: String) -> DescanError {
    DescanError::new(DescanErrorKind::RegexParse {
        pattern: pattern.to_string(),
        message,
    })
}

fn expression(input: &str) -> IResult<&str, Ast> {
    map(separated_list1(nom_char('|'), sequence), |mut branches| {
        if branches.len() == 1 {
            branches.remove(0)
        } else {
            Ast::Alt(branches)
        }
    })(input)
}

fn sequence(input: &str) -> IResult<&str, Ast> {
    map(many0(factor), |mut items| match items.len() {
        0 => Ast::Empty,
        1 => items.remove(0),
        _ => Ast::Seq(items),
    })(input)
}

fn factor(input: &str) -> IResult<&str, Ast> {
    let (mut rest, mut ast) = set_term(input)?;
    loop {
        if let Ok((r, _)) = nom_char::<_, NomError<&str>>('*')(rest) {
            ast = Ast::Star(Box::new(ast));
            rest = r;
        } else if let Ok((r, _)) = nom_char::<_, NomError<&str>>('+')(rest) {
            ast = Ast::Plus(Box::new(ast));
            rest = r;
        } else if let Ok((r, _)) = nom_char::<_, NomError<&str>>('?')(rest) {
            ast = Ast::Opt(Box::new(ast));
            rest = r;
        } else if let Ok((r, (min, max))) = counted(rest) {
            ast = Ast::Repeat(Box::new(ast), min, max);
            rest = r;
        } else {
            break;
        }
    }
    Ok((rest, ast))
}

fn counted(input: &str) -> IResult<&str, (u32, Option<u32>)> {
    delimited(
        nom_char('{'),
        pair(complete::u32, opt(preceded(nom_char(','), complete::u32))),
        nom_char('}'),
    )(input)
}

/// A chain of class atoms joined with `{-}` / `{+}`. The set operators bind tighter than the
/// repetition postfixes.
fn set_term(input: &str) -> IResult<&str, Ast> {
    let (mut rest, mut ast) = atom(input)?;
    loop {
        let op = if let Ok((r, _)) = tag::<_, _, NomError<&str>>("{-}")(rest) {
            Some((r, SetOperator::Intersection))
        } else if let Ok((r, _)) = tag::<_, _, NomError<&str>>("{+}")(rest) {
            Some((r, SetOperator::Union))
        } else {
            None
        };
        match op {
            Some((r, operator)) => {
                let (r, rhs) = atom(r)?;
                ast = Ast::SetOp(operator, Box::new(ast), Box::new(rhs));
                rest = r;
            }
            None => break,
        }
    }
    Ok((rest, ast))
}

fn atom(input: &str) -> IResult<&str, Ast> {
    alt((group, dot, bracket_set, escape_atom, literal_atom))(input)
}

fn group(input: &str) -> IResult<&str, Ast> {
    delimited(nom_char('('), expression, nom_char(')'))(input)
}

fn dot(input: &str) -> IResult<&str, Ast> {
    value(Ast::Dot, nom_char('.'))(input)
}

fn literal_atom(input: &str) -> IResult<&str, Ast> {
    map(
        verify(nom::bytes::complete::take(1usize), |s: &str| {
            let c = s.chars().next().unwrap();
            !is_reserved_char(c)
        }),
        |s: &str| Ast::Literal(s.chars().next().unwrap()),
    )(input)
}

fn is_reserved_char(c: char) -> bool {
    ['|', '(', ')', '[', '*', '+', '?', '{', '.', '\\'].contains(&c)
}

fn escape_atom(input: &str) -> IResult<&str, Ast> {
    let (rest, _) = nom_char('\\')(input)?;
    let c = rest
        .chars()
        .next()
        .ok_or_else(|| nom::Err::Error(NomError::new(rest, ErrorKind::Eof)))?;
    let tail = &rest[c.len_utf8()..];
    let ast = match c {
        'n' => Ast::Literal('\n'),
        'r' => Ast::Literal('\r'),
        't' => Ast::Literal('\t'),
        'f' => Ast::Literal('\u{000C}'),
        'b' => Ast::Literal('\u{0008}'),
        'd' => class_escape(false, posix_class("digit")),
        'D' => class_escape(true, posix_class("digit")),
        'w' => class_escape(false, posix_class("word")),
        'a' => class_escape(false, posix_class("alpha")),
        's' => class_escape(false, posix_class("space")),
        'S' => class_escape(true, posix_class("space")),
        'x' => class_escape(false, posix_class("xdigit")),
        c if !c.is_alphanumeric() => Ast::Literal(c),
        _ => return Err(nom::Err::Error(NomError::new(rest, ErrorKind::Char))),
    };
    Ok((tail, ast))
}

fn class_escape(negated: bool, set: CharSet) -> Ast {
    Ast::Class(ClassAtom {
        negated,
        items: vec![BracketItem::Set(set)],
    })
}

/// Resolve a class name that is known at compile time.
fn posix_class(name: &'static str) -> CharSet {
    named_class_set(name).expect("class name is statically known")
}

/// Parse a bracket expression `[...]` or a bare named class `[:name:]`. Implemented by hand:
/// the member/range disambiguation around `-` does not decompose well into combinators.
fn bracket_set(input: &str) -> IResult<&str, Ast> {
    let (rest, _) = nom_char('[')(input)?;
    if rest.starts_with(':') {
        let (rest, set) = named_class(input)?;
        return Ok((
            rest,
            Ast::Class(ClassAtom {
                negated: false,
                items: vec![BracketItem::Set(set)],
            }),
        ));
    }
    let (rest, negated) = match opt(nom_char::<_, NomError<&str>>('^'))(rest)? {
        (r, Some(_)) => (r, true),
        (r, None) => (r, false),
    };
    let mut items: Vec<BracketItem> = Vec::new();
    let mut s = rest;
    loop {
        if s.is_empty() {
            return Err(nom::Err::Failure(NomError::new(input, ErrorKind::Char)));
        }
        if let Some(tail) = s.strip_prefix(']') {
            // A leading ']' is an ordinary member.
            if items.is_empty() {
                items.push(BracketItem::Char(']'));
                s = tail;
                continue;
            }
            return Ok((tail, Ast::Class(ClassAtom { negated, items })));
        }
        if s.starts_with("[:") {
            let (tail, set) = named_class(s)?;
            items.push(BracketItem::Set(set));
            s = tail;
            continue;
        }
        let (tail, member) = bracket_member(s)?;
        // A '-' between this member and another one denotes a range, unless the '-' is the
        // last character before the closing bracket.
        match tail.strip_prefix('-') {
            Some(after) if !after.starts_with(']') && !after.is_empty() => {
                let (tail, upper) = if after.starts_with("[:") {
                    let (t, _) = named_class(after)?;
                    (t, None)
                } else {
                    let (t, m) = bracket_member(after)?;
                    (t, Some(m))
                };
                match (member, upper) {
                    (BracketItem::Char(lo), Some(BracketItem::Char(hi))) => {
                        items.push(BracketItem::Range(lo, hi));
                    }
                    _ => items.push(BracketItem::BadRange),
                }
                s = tail;
            }
            _ => {
                items.push(member);
                s = tail;
            }
        }
    }
}

/// A single bracket member: a literal character or an escape.
fn bracket_member(s: &str) -> IResult<&str, BracketItem> {
    let mut chars = s.chars();
    let c = chars
        .next()
        .ok_or_else(|| nom::Err::Failure(NomError::new(s, ErrorKind::Eof)))?;
    if c != '\\' {
        return Ok((&s[c.len_utf8()..], BracketItem::Char(c)));
    }
    let e = chars
        .next()
        .ok_or_else(|| nom::Err::Failure(NomError::new(s, ErrorKind::Eof)))?;
    let tail = &s[1 + e.len_utf8()..];
    let item = match e {
        'n' => BracketItem::Char('\n'),
        'r' => BracketItem::Char('\r'),
        't' => BracketItem::Char('\t'),
        'f' => BracketItem::Char('\u{000C}'),
        'b' => BracketItem::Char('\u{0008}'),
        'd' => BracketItem::Set(posix_class("digit")),
        'w' => BracketItem::Set(posix_class("word")),
        'a' => BracketItem::Set(posix_class("alpha")),
        's' => BracketItem::Set(posix_class("space")),
        'x' => BracketItem::Set(posix_class("xdigit")),
        e if !e.is_alphanumeric() => BracketItem::Char(e),
        _ => return Err(nom::Err::Failure(NomError::new(s, ErrorKind::Char))),
    };
    Ok((tail, item))
}

/// Parse `[:name:]` starting at the opening `[`.
fn named_class(s: &str) -> IResult<&str, CharSet> {
    let (rest, name) = delimited(
        tag("[:"),
        nom::bytes::complete::take_while1(|c: char| c.is_ascii_lowercase()),
        tag(":]"),
    )(s)?;
    match named_class_set(name) {
        Some(set) => Ok((rest, set)),
        None => Err(nom::Err::Failure(NomError::new(s, ErrorKind::Tag))),
    }
}

/// The ASCII character sets of the named POSIX classes.
fn named_class_set(name: &str) -> Option<CharSet> {
    let set = match name {
        "alnum" => CharSet::from_ranges([('0', '9'), ('A', 'Z'), ('a', 'z')]),
        "alpha" => CharSet::from_ranges([('A', 'Z'), ('a', 'z')]),
        "blank" => CharSet::from_ranges([(' ', ' '), ('\t', '\t')]),
        "cntrl" => CharSet::from_ranges([('\u{0}', '\u{1F}'), ('\u{7F}', '\u{7F}')]),
        "digit" => CharSet::range('0', '9'),
        "graph" => CharSet::range('!', '~'),
        "lower" => CharSet::range('a', 'z'),
        "print" => CharSet::range(' ', '~'),
        "punct" => CharSet::from_ranges([('!', '/'), (':', '@'), ('[', '`'), ('{', '~')]),
        "space" => CharSet::from_ranges([
            (' ', ' '),
            ('\t', '\t'),
            ('\n', '\n'),
            ('\u{B}', '\u{C}'),
            ('\r', '\r'),
        ]),
        "upper" => CharSet::range('A', 'Z'),
        "xdigit" => CharSet::from_ranges([('0', '9'), ('A', 'F'), ('a', 'f')]),
        "word" => CharSet::from_ranges([('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')]),
        _ => return None,
    };
    Some(set)
}

fn lower(pool: &mut ExprPool, ast: &Ast) -> Result<ExprID> {
    match ast {
        Ast::Empty => Ok(ExprPool::EMPTY_STRING),
        Ast::Dot => Ok(ExprPool::ANY),
        Ast::Literal(c) => Ok(pool.symbol(*c)),
        Ast::Class(atom) => lower_class(pool, atom),
        Ast::Seq(items) => items.iter().try_fold(ExprPool::EMPTY_STRING, |acc, item| {
            let expr = lower(pool, item)?;
            Ok(pool.concat(acc, expr))
        }),
        Ast::Alt(branches) => branches.iter().try_fold(ExprPool::EMPTY_SET, |acc, item| {
            let expr = lower(pool, item)?;
            Ok(pool.or(acc, expr))
        }),
        Ast::Star(inner) => {
            let expr = lower(pool, inner)?;
            Ok(pool.star(expr))
        }
        Ast::Plus(inner) => {
            let expr = lower(pool, inner)?;
            let star = pool.star(expr);
            Ok(pool.concat(expr, star))
        }
        Ast::Opt(inner) => {
            let expr = lower(pool, inner)?;
            Ok(pool.or(expr, ExprPool::EMPTY_STRING))
        }
        Ast::Repeat(inner, min, max) => {
            let expr = lower(pool, inner)?;
            let max = max.unwrap_or(*min);
            if max < *min {
                return Err(DescanError::new(DescanErrorKind::Range(format!(
                    "counted repetition {{{},{}}} has max < min",
                    min, max
                ))));
            }
            let mut acc = ExprPool::EMPTY_STRING;
            for _ in 0..*min {
                acc = pool.concat(acc, expr);
            }
            let optional = pool.or(expr, ExprPool::EMPTY_STRING);
            for _ in *min..max {
                acc = pool.concat(acc, optional);
            }
            Ok(acc)
        }
        Ast::SetOp(op, a, b) => {
            let left = lower(pool, a)?;
            let right = lower(pool, b)?;
            Ok(match op {
                SetOperator::Intersection => pool.and(left, right),
                SetOperator::Union => pool.or(left, right),
            })
        }
    }
}

/// Desugar a bracket class into the closed algebra.
fn lower_class(pool: &mut ExprPool, atom: &ClassAtom) -> Result<ExprID> {
    let mut set = CharSet::empty();
    for item in &atom.items {
        match item {
            BracketItem::Char(c) => set = set.union(&CharSet::single(*c)),
            BracketItem::Range(lo, hi) => {
                if hi <= lo {
                    return Err(DescanError::new(DescanErrorKind::Range(format!(
                        "character range {}-{} has max <= min",
                        lo.escape_default(),
                        hi.escape_default()
                    ))));
                }
                set = set.union(&CharSet::range(*lo, *hi));
            }
            BracketItem::Set(s) => set = set.union(s),
            BracketItem::BadRange => {
                return Err(DescanError::new(DescanErrorKind::Range(
                    "range endpoint is not a literal symbol".to_string(),
                )))
            }
        }
    }
    let positive = set
        .chars()
        .fold(ExprPool::EMPTY_SET, |acc, c| {
            let sym = pool.symbol(c);
            pool.or(acc, sym)
        });
    if atom.negated {
        let negated = pool.not(positive);
        Ok(pool.and(ExprPool::ANY, negated))
    } else {
        Ok(positive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pattern: &str) -> (ExprPool, ExprID) {
        let mut pool = ExprPool::new();
        let expr = parse_pattern(&mut pool, pattern).unwrap();
        (pool, expr)
    }

    fn accepts(pool: &mut ExprPool, expr: ExprID, input: &str) -> bool {
        let mut residual = expr;
        for c in input.chars() {
            residual = pool.derive(residual, c);
        }
        pool.nullable(residual)
    }

    #[test]
    fn test_literals_and_operators() {
        let (mut pool, expr) = parse("ab|c*");
        assert!(accepts(&mut pool, expr, "ab"));
        assert!(accepts(&mut pool, expr, ""));
        assert!(accepts(&mut pool, expr, "ccc"));
        assert!(!accepts(&mut pool, expr, "abc"));
    }

    #[test]
    fn test_plus_and_opt() {
        let (mut pool, expr) = parse("a+b?");
        assert!(accepts(&mut pool, expr, "a"));
        assert!(accepts(&mut pool, expr, "aaab"));
        assert!(!accepts(&mut pool, expr, ""));
        assert!(!accepts(&mut pool, expr, "b"));
    }

    #[test]
    fn test_dot() {
        let (mut pool, expr) = parse("a.c");
        assert!(accepts(&mut pool, expr, "abc"));
        assert!(accepts(&mut pool, expr, "axc"));
        assert!(!accepts(&mut pool, expr, "ac"));
    }

    #[test]
    fn test_counted_repetition() {
        let (mut pool, expr) = parse("a{3}");
        assert!(accepts(&mut pool, expr, "aaa"));
        assert!(!accepts(&mut pool, expr, "aa"));
        assert!(!accepts(&mut pool, expr, "aaaa"));

        let (mut pool, expr) = parse("a{1,3}");
        assert!(!accepts(&mut pool, expr, ""));
        assert!(accepts(&mut pool, expr, "a"));
        assert!(accepts(&mut pool, expr, "aaa"));
        assert!(!accepts(&mut pool, expr, "aaaa"));
    }

    #[test]
    fn test_counted_repetition_bad_bounds() {
        let mut pool = ExprPool::new();
        let err = parse_pattern(&mut pool, "a{3,1}").unwrap_err();
        assert!(matches!(*err.source, DescanErrorKind::Range(_)));
    }

    #[test]
    fn test_bracket_class() {
        let (mut pool, expr) = parse("[a-cx]");
        for good in ["a", "b", "c", "x"] {
            assert!(accepts(&mut pool, expr, good));
        }
        assert!(!accepts(&mut pool, expr, "d"));
        assert!(!accepts(&mut pool, expr, "ab"));
    }

    #[test]
    fn test_negated_bracket_class() {
        let (mut pool, expr) = parse("1[^13]");
        assert!(accepts(&mut pool, expr, "12"));
        assert!(accepts(&mut pool, expr, "1x"));
        assert!(!accepts(&mut pool, expr, "11"));
        assert!(!accepts(&mut pool, expr, "13"));
        assert!(!accepts(&mut pool, expr, "1"));
        assert!(!accepts(&mut pool, expr, "124"));
    }

    #[test]
    fn test_named_classes() {
        let (mut pool, expr) = parse("[[:digit:]]{3}");
        assert!(accepts(&mut pool, expr, "042"));
        assert!(!accepts(&mut pool, expr, "04"));
        assert!(!accepts(&mut pool, expr, "04x"));

        let (mut pool, expr) = parse(r"\w+");
        assert!(accepts(&mut pool, expr, "ab_9"));
        assert!(!accepts(&mut pool, expr, "a b"));
    }

    #[test]
    fn test_negated_class_escapes() {
        let (mut pool, expr) = parse(r"\D");
        assert!(accepts(&mut pool, expr, "x"));
        assert!(!accepts(&mut pool, expr, "7"));

        let (mut pool, expr) = parse(r"\S+");
        assert!(accepts(&mut pool, expr, "abc"));
        assert!(!accepts(&mut pool, expr, "a c"));
    }

    #[test]
    fn test_bad_range_is_rejected() {
        let mut pool = ExprPool::new();
        let err = parse_pattern(&mut pool, "[z-a]").unwrap_err();
        assert!(matches!(*err.source, DescanErrorKind::Range(_)));
        let err = parse_pattern(&mut pool, r"[\d-z]").unwrap_err();
        assert!(matches!(*err.source, DescanErrorKind::Range(_)));
    }

    #[test]
    fn test_set_operators() {
        // [0-9]{-}[4-6] keeps only the digits shared by both sets.
        let (mut pool, expr) = parse("[0-9]{-}[4-6]");
        assert!(accepts(&mut pool, expr, "5"));
        assert!(!accepts(&mut pool, expr, "2"));

        let (mut pool, expr) = parse("[a-c]{+}[x-z]");
        assert!(accepts(&mut pool, expr, "b"));
        assert!(accepts(&mut pool, expr, "y"));
        assert!(!accepts(&mut pool, expr, "m"));
    }

    #[test]
    fn test_escapes() {
        let (mut pool, expr) = parse(r"a\.b");
        assert!(accepts(&mut pool, expr, "a.b"));
        assert!(!accepts(&mut pool, expr, "axb"));

        let (mut pool, expr) = parse(r"\t\n");
        assert!(accepts(&mut pool, expr, "\t\n"));
    }

    #[test]
    fn test_unbalanced_input_is_rejected() {
        let mut pool = ExprPool::new();
        assert!(parse_pattern(&mut pool, "(ab").is_err());
        assert!(parse_pattern(&mut pool, "[ab").is_err());
        assert!(parse_pattern(&mut pool, "ab)").is_err());
    }

    #[test]
    fn test_empty_pattern_matches_empty_string() {
        let (pool, expr) = parse("");
        assert!(pool.nullable(expr));
    }

    #[test]
    fn test_grouping_with_repetition() {
        let (mut pool, expr) = parse("(ab){2}c");
        assert!(accepts(&mut pool, expr, "ababc"));
        assert!(!accepts(&mut pool, expr, "abc"));
    }
}
