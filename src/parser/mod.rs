//! The recursive-descent, precedence-climbing parser.
//!
//! Grounded on distilled-spec §4.2: parsing and semantic-action construction are
//! fused, so every grammar production below returns an [`Evaluator`] node directly
//! rather than an intermediate syntax tree — the same fusion the teacher's own
//! `production::builder` module performs when it assembles `Rc<dyn IProduction>`
//! combinator trees during grammar construction, just specialized here to one fixed
//! grammar instead of a caller-assembled one. Operator precedence is realized through
//! the three combinators in [`combinators`] (`chainl`/`chainr`/`nonassoc`), named
//! exactly as distilled-spec §4.2 calls them out.

mod combinators;

use crate::error::ParseError;
use crate::eval::{
    Alternative, Arith, ArithOp, Binding, Call, Collect, Comma, Compare, CompareOp,
    CompoundAssign, CursorMarker, DictEntry, Dot, Evaluator, Field, Iterate, LogAnd, LogOr,
    Literal, MakeDict, Negate, Pipe, SetPath, Variable,
};
use crate::pattern::{KeyPattern, Pattern};
use crate::position::Span;
use crate::token::{Punct, Token, TokenKind};
use crate::value::Value;
use combinators::{chainl, chainr, nonassoc};
use std::rc::Rc;

type Node = Rc<dyn Evaluator>;

/// Token-stream cursor over an already-lexed program. Holds no evaluation state of its
/// own — every grammar production is a free function taking `&mut Parser`, matching
/// the `fn(&mut Parser) -> ...` shape [`combinators`] expects for its sub-parser and
/// operator-recognizer arguments (which must be plain function pointers, not
/// closures, since they carry no captured state).
pub struct Parser<'s> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'s str,
}

impl<'s> Parser<'s> {
    pub fn new(tokens: Vec<Token>, source: &'s str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn peek2_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|t| t.kind.clone())
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.peek().span.start, message.into())
    }

    fn expect_punct(&mut self, p: Punct) -> Result<Token, ParseError> {
        if self.peek_kind() == TokenKind::Punct(p) {
            Ok(self.advance())
        } else {
            Err(self.error(format!(
                "expected '{}', found {:?}",
                p.lexeme(),
                self.peek_kind()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("expected identifier, found {:?}", other))),
        }
    }

    /// Parse a complete program: the top `exp` production, followed by an optional
    /// trailing cursor (distilled-spec §4.2 — "the top-level `exp` also consumes an
    /// optional trailing Cursor so a cursor right after a complete expression still
    /// parses") and end of input.
    pub fn parse_program(mut self) -> Result<Node, ParseError> {
        crate::util::log::trace(crate::util::log::Level::Default, || {
            format!("parsing {} tokens", self.tokens.len())
        });
        let node = exp(&mut self)?;
        if self.peek_kind() == TokenKind::Cursor {
            self.advance();
        }
        if self.peek_kind() != TokenKind::Eof {
            return Err(self.error(format!(
                "unexpected trailing token {:?}",
                self.peek_kind()
            )));
        }
        crate::util::log::trace(crate::util::log::Level::Success, || {
            "parse succeeded".to_string()
        });
        Ok(node)
    }
}

/// `exp := term "as" pattern "|" exp | exp9`. The `term "as" ...` alternative is tried
/// first with full backtracking — the parser re-derives the whole precedence chain
/// from scratch when there turns out to be no `as`, which is simply wasted work (the
/// token list is already fully materialized, so this never risks reparsing a source
/// that has moved out from under it).
fn exp(p: &mut Parser) -> Result<Node, ParseError> {
    let checkpoint = p.pos;
    if let Ok(source) = term(p) {
        if p.peek_kind() == TokenKind::Punct(Punct::As) {
            p.advance();
            let pattern = parse_pattern(p)?;
            p.expect_punct(Punct::Pipe)?;
            let body = exp(p)?;
            return Ok(Rc::new(Binding {
                source,
                pattern,
                body,
            }));
        }
    }
    p.pos = checkpoint;
    exp9(p)
}

fn exp9(p: &mut Parser) -> Result<Node, ParseError> {
    chainr(p, exp8, pipe_op, pipe_make)
}
fn exp8(p: &mut Parser) -> Result<Node, ParseError> {
    chainl(p, exp7, comma_op, comma_make)
}
fn exp7(p: &mut Parser) -> Result<Node, ParseError> {
    chainr(p, exp6, alt_op, alt_make)
}
fn exp6(p: &mut Parser) -> Result<Node, ParseError> {
    nonassoc(p, exp5, assign_op, assign_make)
}
fn exp5(p: &mut Parser) -> Result<Node, ParseError> {
    chainl(p, exp4, or_op, or_make)
}
fn exp4(p: &mut Parser) -> Result<Node, ParseError> {
    chainl(p, exp3, and_op, and_make)
}
fn exp3(p: &mut Parser) -> Result<Node, ParseError> {
    nonassoc(p, exp2, cmp_op, cmp_make)
}
fn exp2(p: &mut Parser) -> Result<Node, ParseError> {
    chainl(p, exp1, addsub_op, arith_make)
}
fn exp1(p: &mut Parser) -> Result<Node, ParseError> {
    chainl(p, unary, muldiv_op, arith_make)
}

/// The optional leading `-` alternative of `exp1` (distilled-spec §4.2). Written as
/// its own production rather than folded into `exp1`'s chain so unary minus binds
/// tighter than the surrounding `*`/`/`/`%` chain, e.g. `-2 * 3` negates `2` first.
fn unary(p: &mut Parser) -> Result<Node, ParseError> {
    if p.peek_kind() == TokenKind::Punct(Punct::Minus) {
        p.advance();
        let inner = term(p)?;
        Ok(Rc::new(Negate(inner)))
    } else {
        term(p)
    }
}

fn pipe_op(k: &TokenKind) -> Option<()> {
    (*k == TokenKind::Punct(Punct::Pipe)).then_some(())
}
fn pipe_make(_: (), l: Node, r: Node) -> Node {
    Rc::new(Pipe(l, r))
}

fn comma_op(k: &TokenKind) -> Option<()> {
    (*k == TokenKind::Punct(Punct::Comma)).then_some(())
}
fn comma_make(_: (), l: Node, r: Node) -> Node {
    Rc::new(Comma(l, r))
}

fn alt_op(k: &TokenKind) -> Option<()> {
    (*k == TokenKind::Punct(Punct::SlashSlash)).then_some(())
}
fn alt_make(_: (), l: Node, r: Node) -> Node {
    Rc::new(Alternative { lhs: l, rhs: r })
}

/// `exp6`'s operator set: `=` assigns via [`SetPath`]; every other compound-assign
/// spelling parses (so the grammar stays total over valid jq source) but evaluates to
/// a hard error via [`CompoundAssign`] — the distilled spec's own grammar table marks
/// these "(todo)" rather than giving them update-in-place semantics.
#[derive(Debug, Clone, Copy)]
enum AssignOp {
    Set,
    Compound(&'static str),
}

fn assign_op(k: &TokenKind) -> Option<AssignOp> {
    match k {
        TokenKind::Punct(Punct::Eq) => Some(AssignOp::Set),
        TokenKind::Punct(Punct::PipeEq) => Some(AssignOp::Compound("|=")),
        TokenKind::Punct(Punct::PlusEq) => Some(AssignOp::Compound("+=")),
        TokenKind::Punct(Punct::MinusEq) => Some(AssignOp::Compound("-=")),
        TokenKind::Punct(Punct::StarEq) => Some(AssignOp::Compound("*=")),
        TokenKind::Punct(Punct::SlashEq) => Some(AssignOp::Compound("/=")),
        TokenKind::Punct(Punct::PercentEq) => Some(AssignOp::Compound("%=")),
        TokenKind::Punct(Punct::SlashSlashEq) => Some(AssignOp::Compound("//=")),
        _ => None,
    }
}
fn assign_make(op: AssignOp, l: Node, r: Node) -> Node {
    match op {
        AssignOp::Set => Rc::new(SetPath { lhs: l, rhs: r }),
        AssignOp::Compound(sym) => Rc::new(CompoundAssign {
            op: sym,
            lhs: l,
            rhs: r,
        }),
    }
}

fn or_op(k: &TokenKind) -> Option<()> {
    (*k == TokenKind::Punct(Punct::Or)).then_some(())
}
fn or_make(_: (), l: Node, r: Node) -> Node {
    Rc::new(LogOr(l, r))
}

fn and_op(k: &TokenKind) -> Option<()> {
    (*k == TokenKind::Punct(Punct::And)).then_some(())
}
fn and_make(_: (), l: Node, r: Node) -> Node {
    Rc::new(LogAnd(l, r))
}

fn cmp_op(k: &TokenKind) -> Option<CompareOp> {
    match k {
        TokenKind::Punct(Punct::EqEq) => Some(CompareOp::Eq),
        TokenKind::Punct(Punct::NotEq) => Some(CompareOp::Ne),
        TokenKind::Punct(Punct::Lt) => Some(CompareOp::Lt),
        TokenKind::Punct(Punct::Le) => Some(CompareOp::Le),
        TokenKind::Punct(Punct::Gt) => Some(CompareOp::Gt),
        TokenKind::Punct(Punct::Ge) => Some(CompareOp::Ge),
        _ => None,
    }
}
fn cmp_make(op: CompareOp, l: Node, r: Node) -> Node {
    Rc::new(Compare { op, lhs: l, rhs: r })
}

fn addsub_op(k: &TokenKind) -> Option<ArithOp> {
    match k {
        TokenKind::Punct(Punct::Plus) => Some(ArithOp::Add),
        TokenKind::Punct(Punct::Minus) => Some(ArithOp::Sub),
        _ => None,
    }
}
fn muldiv_op(k: &TokenKind) -> Option<ArithOp> {
    match k {
        TokenKind::Punct(Punct::Star) => Some(ArithOp::Mul),
        TokenKind::Punct(Punct::Slash) => Some(ArithOp::Div),
        TokenKind::Punct(Punct::Percent) => Some(ArithOp::Mod),
        _ => None,
    }
}
fn arith_make(op: ArithOp, l: Node, r: Node) -> Node {
    Rc::new(Arith { op, lhs: l, rhs: r })
}

/// `term := atom term-suffix*`, with a suffix position re-checked for the completion
/// cursor on every iteration (distilled-spec §4.2: "a `peek(Cursor)` check is
/// attempted at every suffix position of `term`").
fn term(p: &mut Parser) -> Result<Node, ParseError> {
    let mut node = atom(p)?;
    loop {
        match p.peek_kind() {
            TokenKind::Field(name) => {
                let span = p.peek().span;
                p.advance();
                node = Rc::new(Pipe(node, field_or_completion(p, name, span)));
            }
            TokenKind::Punct(Punct::Dot) => match p.peek2_kind() {
                TokenKind::Str(s) => {
                    p.advance();
                    p.advance();
                    node = Rc::new(Pipe(node, Rc::new(Field(s))));
                }
                TokenKind::PartialStr(prefix) => {
                    if p.tokens.get(p.pos + 2).map(|t| t.kind == TokenKind::Cursor) == Some(true) {
                        let prefix_span = partial_str_span(p.tokens[p.pos + 1].span);
                        let cursor_span = p.tokens[p.pos + 2].span;
                        p.advance();
                        p.advance();
                        p.advance();
                        let _ = cursor_span;
                        node = Rc::new(Pipe(
                            node,
                            Rc::new(CursorMarker {
                                mode: crate::completion::Mode::Field,
                                prefix: Some(prefix),
                                span: prefix_span,
                                bare_head: false,
                            }),
                        ));
                    } else {
                        break;
                    }
                }
                TokenKind::Cursor => {
                    let cursor_span = p.tokens[p.pos + 1].span;
                    p.advance();
                    p.advance();
                    node = Rc::new(Pipe(
                        node,
                        Rc::new(CursorMarker {
                            mode: crate::completion::Mode::Field,
                            prefix: None,
                            span: cursor_span,
                            bare_head: false,
                        }),
                    ));
                }
                _ => break,
            },
            TokenKind::Punct(Punct::LBracket) if p.peek2_kind() == TokenKind::Punct(Punct::RBracket) => {
                p.advance();
                p.advance();
                node = Rc::new(Pipe(node, Rc::new(Iterate)));
            }
            _ => break,
        }
    }
    Ok(node)
}

/// Given a just-consumed `Field(name)` token (and its span), check whether the cursor
/// sits directly after it; if so the field name is a completion prefix rather than a
/// finished access (distilled-spec §6, "after a Field/PartialString prefix p").
fn field_or_completion(p: &mut Parser, name: String, span: Span) -> Node {
    if p.peek_kind() == TokenKind::Cursor {
        p.advance();
        Rc::new(CursorMarker {
            mode: crate::completion::Mode::Field,
            prefix: Some(name),
            span,
            bare_head: false,
        })
    } else {
        Rc::new(Field(name))
    }
}

/// A [`TokenKind::PartialStr`]'s raw span covers the opening quote; the prefix text
/// itself starts one byte later (distilled-spec §6: "pos is the span of p", where `p`
/// is the decoded prefix, not the quote).
fn partial_str_span(raw: Span) -> Span {
    Span::new(raw.start + 1, raw.end)
}

fn atom(p: &mut Parser) -> Result<Node, ParseError> {
    match p.peek_kind() {
        TokenKind::Str(s) => {
            p.advance();
            Ok(Rc::new(Literal(Value::str(s))))
        }
        TokenKind::Number(v) => {
            p.advance();
            Ok(Rc::new(Literal(v)))
        }
        TokenKind::Field(name) => {
            let span = p.peek().span;
            p.advance();
            Ok(field_or_completion(p, name, span))
        }
        TokenKind::Punct(Punct::Dot) => match p.peek2_kind() {
            TokenKind::Str(s) => {
                p.advance();
                p.advance();
                Ok(Rc::new(Field(s)))
            }
            TokenKind::PartialStr(prefix) => {
                if p.tokens.get(p.pos + 2).map(|t| t.kind == TokenKind::Cursor) == Some(true) {
                    let prefix_span = partial_str_span(p.tokens[p.pos + 1].span);
                    p.advance();
                    p.advance();
                    p.advance();
                    Ok(Rc::new(CursorMarker {
                        mode: crate::completion::Mode::Field,
                        prefix: Some(prefix),
                        span: prefix_span,
                        bare_head: false,
                    }))
                } else {
                    p.advance();
                    Err(p.error("unterminated string literal"))
                }
            }
            TokenKind::Cursor => {
                let cursor_span = p.tokens[p.pos + 1].span;
                p.advance();
                p.advance();
                Ok(Rc::new(CursorMarker {
                    mode: crate::completion::Mode::Field,
                    prefix: None,
                    span: cursor_span,
                    bare_head: true,
                }))
            }
            _ => {
                p.advance();
                Ok(Rc::new(Dot))
            }
        },
        TokenKind::Punct(Punct::LParen) => {
            p.advance();
            let inner = exp(p)?;
            p.expect_punct(Punct::RParen)?;
            Ok(inner)
        }
        TokenKind::Ident(name) => {
            p.advance();
            if p.peek_kind() == TokenKind::Punct(Punct::LParen) {
                p.advance();
                let mut args = vec![exp(p)?];
                while p.peek_kind() == TokenKind::Punct(Punct::Semicolon) {
                    p.advance();
                    args.push(exp(p)?);
                }
                p.expect_punct(Punct::RParen)?;
                Ok(Rc::new(Call { name, args }))
            } else {
                Ok(Rc::new(Call {
                    name,
                    args: Vec::new(),
                }))
            }
        }
        TokenKind::Punct(Punct::LBracket) => {
            p.advance();
            if p.peek_kind() == TokenKind::Punct(Punct::RBracket) {
                p.advance();
                Ok(Rc::new(Literal(Value::Array(Vec::new()))))
            } else {
                let inner = exp(p)?;
                p.expect_punct(Punct::RBracket)?;
                Ok(Rc::new(Collect(inner)))
            }
        }
        TokenKind::Punct(Punct::Dollar) => {
            p.advance();
            let name = p.expect_ident()?;
            Ok(Rc::new(Variable(format!("${}", name))))
        }
        TokenKind::Punct(Punct::LBrace) => {
            p.advance();
            let entries = parse_dict(p)?;
            p.expect_punct(Punct::RBrace)?;
            Ok(Rc::new(MakeDict(entries)))
        }
        other => Err(p.error(format!("unexpected token {:?}", other))),
    }
}

/// `{ mk_dict item ("," mk_dict item)* }`, tolerating a bare `{}`.
fn parse_dict(p: &mut Parser) -> Result<Vec<DictEntry>, ParseError> {
    let mut entries = Vec::new();
    if p.peek_kind() == TokenKind::Punct(Punct::RBrace) {
        return Ok(entries);
    }
    loop {
        entries.push(parse_dict_entry(p)?);
        if p.peek_kind() == TokenKind::Punct(Punct::Comma) {
            p.advance();
            continue;
        }
        break;
    }
    Ok(entries)
}

/// One `mk_dict` item. Values are parsed at `exp6` — jq's object-literal grammar
/// excludes bare `,`/`|` from values (they'd be ambiguous with the entry separator and
/// the surrounding pipe), so the precedence chain bottoms out one level below
/// `exp7`/`exp8`/`exp9` rather than at the full `exp`.
fn parse_dict_entry(p: &mut Parser) -> Result<DictEntry, ParseError> {
    match p.peek_kind() {
        TokenKind::Ident(name) => {
            p.advance();
            if p.peek_kind() == TokenKind::Punct(Punct::Colon) {
                p.advance();
                let value = exp6(p)?;
                Ok(DictEntry {
                    key: Rc::new(Literal(Value::str(name))),
                    value,
                })
            } else {
                Ok(DictEntry {
                    key: Rc::new(Literal(Value::str(name.clone()))),
                    value: Rc::new(Field(name)),
                })
            }
        }
        TokenKind::Str(s) => {
            p.advance();
            if p.peek_kind() == TokenKind::Punct(Punct::Colon) {
                p.advance();
                let value = exp6(p)?;
                Ok(DictEntry {
                    key: Rc::new(Literal(Value::str(s))),
                    value,
                })
            } else {
                Ok(DictEntry {
                    key: Rc::new(Literal(Value::str(s.clone()))),
                    value: Rc::new(Field(s)),
                })
            }
        }
        TokenKind::Punct(Punct::Dollar) => {
            p.advance();
            let name = p.expect_ident()?;
            Ok(DictEntry {
                key: Rc::new(Literal(Value::str(name.clone()))),
                value: Rc::new(Variable(format!("${}", name))),
            })
        }
        TokenKind::Punct(Punct::LParen) => {
            p.advance();
            let key = exp(p)?;
            p.expect_punct(Punct::RParen)?;
            p.expect_punct(Punct::Colon)?;
            let value = exp6(p)?;
            Ok(DictEntry { key, value })
        }
        TokenKind::Punct(punct) if punct.is_keyword() => {
            p.advance();
            p.expect_punct(Punct::Colon)?;
            let value = exp6(p)?;
            Ok(DictEntry {
                key: Rc::new(Literal(Value::str(punct.lexeme().to_string()))),
                value,
            })
        }
        other => Err(p.error(format!("unexpected token in object literal: {:?}", other))),
    }
}

/// `pattern := "$" IDENT | "[" pattern ("," pattern)+ "]" | "{" obj-pat ("," obj-pat)* "}"`.
fn parse_pattern(p: &mut Parser) -> Result<Pattern, ParseError> {
    match p.peek_kind() {
        TokenKind::Punct(Punct::Dollar) => {
            p.advance();
            let name = p.expect_ident()?;
            Ok(Pattern::Var(format!("${}", name)))
        }
        TokenKind::Punct(Punct::LBracket) => {
            p.advance();
            let mut items = vec![parse_pattern(p)?];
            while p.peek_kind() == TokenKind::Punct(Punct::Comma) {
                p.advance();
                items.push(parse_pattern(p)?);
            }
            p.expect_punct(Punct::RBracket)?;
            Ok(Pattern::Array(items))
        }
        TokenKind::Punct(Punct::LBrace) => {
            p.advance();
            let mut entries = vec![parse_obj_pattern_entry(p)?];
            while p.peek_kind() == TokenKind::Punct(Punct::Comma) {
                p.advance();
                entries.push(parse_obj_pattern_entry(p)?);
            }
            p.expect_punct(Punct::RBrace)?;
            Ok(Pattern::Object(entries))
        }
        other => Err(p.error(format!(
            "expected a pattern ($name, [..], or {{..}}), found {:?}",
            other
        ))),
    }
}

/// `obj-pat := "$" IDENT | IDENT ":" pattern | String ":" pattern | "(" exp ")" ":" pattern`.
fn parse_obj_pattern_entry(p: &mut Parser) -> Result<(KeyPattern, Pattern), ParseError> {
    match p.peek_kind() {
        TokenKind::Punct(Punct::Dollar) => {
            p.advance();
            let name = p.expect_ident()?;
            Ok((KeyPattern::VarShorthand(name.clone()), Pattern::Var(format!("${}", name))))
        }
        TokenKind::Ident(name) => {
            p.advance();
            p.expect_punct(Punct::Colon)?;
            let sub = parse_pattern(p)?;
            Ok((KeyPattern::Literal(name), sub))
        }
        TokenKind::Str(s) => {
            p.advance();
            p.expect_punct(Punct::Colon)?;
            let sub = parse_pattern(p)?;
            Ok((KeyPattern::Literal(s), sub))
        }
        TokenKind::Punct(Punct::LParen) => {
            p.advance();
            let key_expr = exp(p)?;
            p.expect_punct(Punct::RParen)?;
            p.expect_punct(Punct::Colon)?;
            let sub = parse_pattern(p)?;
            Ok((KeyPattern::Expr(key_expr), sub))
        }
        other => Err(p.error(format!(
            "unexpected token in object pattern: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{splice, unsplice};
    use crate::lexer::Lexer;
    use indexmap::IndexMap;

    fn run(source: &str, inputs: Vec<Value>) -> Vec<Value> {
        let tokens = Lexer::new(source, None).lex().unwrap();
        let evaluator = Parser::new(tokens, source).parse_program().unwrap();
        let env = crate::make_env();
        let stream = splice(&env, inputs);
        unsplice(evaluator.eval(stream).unwrap())
    }

    #[test]
    fn identity_laws() {
        let v = Value::Int(42);
        assert_eq!(run(".", vec![v.clone()]), vec![v.clone()]);
        assert_eq!(run(". | .", vec![v.clone()]), vec![v.clone()]);
    }

    #[test]
    fn field_access_and_pipe() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Int(1));
        let obj = Value::Object(map);
        assert_eq!(run(".a", vec![obj.clone()]), vec![Value::Int(1)]);
    }

    #[test]
    fn comma_distributes_over_following_pipe_stage() {
        // x | (a, b) == (x | a, x | b) in multiplicity and order.
        let out = run(".[] | (1, 2)", vec![Value::Array(vec![Value::Null, Value::Null])]);
        assert_eq!(
            out,
            vec![Value::Int(1), Value::Int(2), Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn arithmetic_cross_product_matches_spec_scenario_2() {
        let out = run("(1,3) * (4,7)", vec![Value::Null]);
        assert_eq!(
            out,
            vec![
                Value::Int(4),
                Value::Int(12),
                Value::Int(7),
                Value::Int(21),
            ]
        );
    }

    #[test]
    fn set_path_builds_nested_objects_scenario_3() {
        let out = run(".a.b.c = 2", vec![Value::Object(IndexMap::new())]);
        let mut c = IndexMap::new();
        c.insert("c".to_string(), Value::Int(2));
        let mut b = IndexMap::new();
        b.insert("b".to_string(), Value::Object(c));
        let mut a = IndexMap::new();
        a.insert("a".to_string(), Value::Object(b));
        assert_eq!(out, vec![Value::Object(a)]);
    }

    #[test]
    fn set_path_composition_matches_single_chain() {
        let lhs = run(".a | .b.c = 9", vec![Value::Object(IndexMap::new())]);
        let rhs = run(".a.b.c = 9", vec![Value::Object(IndexMap::new())]);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn select_filters_truthy_scenario_6() {
        let out = run("1, 2, 3 | select(. < 3, . % 2 != 0)", vec![Value::Null]);
        assert_eq!(
            out,
            vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn destructuring_with_computed_keys_scenario_1() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Int(1));
        map.insert("b".to_string(), Value::Int(2));
        map.insert("c".to_string(), Value::Int(3));
        let out = run(
            r#". as {("a","b"):$A,("b","c"):$C} | [$A,$C]"#,
            vec![Value::Object(map)],
        );
        assert_eq!(
            out,
            vec![
                Value::Array(vec![Value::Int(1), Value::Int(2)]),
                Value::Array(vec![Value::Int(1), Value::Int(3)]),
                Value::Array(vec![Value::Int(2), Value::Int(2)]),
                Value::Array(vec![Value::Int(2), Value::Int(3)]),
            ]
        );
    }

    #[test]
    fn iterate_and_collect() {
        let arr = Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(run("[.[]]", vec![arr.clone()]), vec![arr]);
    }

    #[test]
    fn object_construction_cross_product() {
        let out = run(r#"{a: (1,2), b: 3}"#, vec![Value::Null]);
        let mut o1 = IndexMap::new();
        o1.insert("a".to_string(), Value::Int(1));
        o1.insert("b".to_string(), Value::Int(3));
        let mut o2 = IndexMap::new();
        o2.insert("a".to_string(), Value::Int(2));
        o2.insert("b".to_string(), Value::Int(3));
        assert_eq!(out, vec![Value::Object(o1), Value::Object(o2)]);
    }

    #[test]
    fn variable_binding() {
        let out = run("1 as $x | $x + 1", vec![Value::Null]);
        assert_eq!(out, vec![Value::Int(2)]);
    }

    #[test]
    fn unknown_function_is_a_hard_error() {
        let tokens = Lexer::new("nope", None).lex().unwrap();
        let evaluator = Parser::new(tokens, "nope").parse_program().unwrap();
        let env = crate::make_env();
        let stream = splice(&env, vec![Value::Null]);
        assert!(evaluator.eval(stream).is_err());
    }

    #[test]
    fn parse_error_on_mismatched_paren() {
        let tokens = Lexer::new("(.a", None).lex().unwrap();
        assert!(Parser::new(tokens, "(.a").parse_program().is_err());
    }
}
