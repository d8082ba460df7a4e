use std::io::BufRead;

use crate::{
    ast::ast::Expr,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// expression ::= unary binop_rhs
pub fn parse_expression<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    parser.nested(|parser| {
        let lhs = parse_unary(parser)?;
        parse_binop_rhs(parser, 0, lhs)
    })
}

/// unary ::= primary | OPCHAR unary
///
/// Any single-character token other than `(` and `,` is taken as a prefix
/// operator here, declared or not. Whether it means anything is up to the backend.
pub fn parse_unary<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    let op = match parser.current_char() {
        Some(c) if c != '(' && c != ',' => c,
        _ => return parse_primary(parser),
    };

    parser.advance();
    let operand = parser.nested(parse_unary)?;

    Ok(Expr::unary(op, operand))
}

/// binop_rhs ::= (BINOP unary)*
///
/// Precedence climbing: operators binding at least `min_precedence` are folded
/// into `lhs`. A right operand absorbs strictly tighter operators through a
/// recursive call; equal precedence folds left.
///
/// Folding happens in a loop, so the height of the tree it builds is checked
/// against the nesting limit separately.
pub fn parse_binop_rhs<R: BufRead>(
    parser: &mut Parser<R>,
    min_precedence: i32,
    mut lhs: Expr,
) -> Result<Expr, Error> {
    let mut height = lhs.height();

    loop {
        let precedence = parser.current_precedence();
        if precedence < min_precedence {
            return Ok(lhs);
        }

        let Some(op) = parser.current_char() else {
            return Ok(lhs);
        };

        if op == '=' && !lhs.is_variable() {
            return Err(Error::new(ErrorImpl::InvalidAssignment, parser.get_position()));
        }

        let position = parser.advance().position;
        let mut rhs = parse_unary(parser)?;

        if parser.current_precedence() > precedence {
            rhs = parser.nested(|parser| parse_binop_rhs(parser, precedence + 1, rhs))?;
        }

        height = height.max(rhs.height()) + 1;
        parser.check_height(height, position)?;

        lhs = Expr::binary(op, lhs, rhs);
    }
}

/// primary ::= number | parenexpr | identifierexpr | forexpr | ifexpr | varexpr
pub fn parse_primary<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Int(_) | TokenKind::Float(_) => parse_number(parser),
        TokenKind::Char(b'(') => parse_paren_expr(parser),
        TokenKind::Identifier(_) => parse_identifier_expr(parser),
        TokenKind::For => parse_for_expr(parser),
        TokenKind::If => parse_if_expr(parser),
        TokenKind::Var => parse_var_expr(parser),
        _ => Err(parser.unexpected("an expression")),
    }
}

pub fn parse_number<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Int(value) => {
            let value = *value as f64;
            parser.advance();
            Ok(Expr::number(value))
        }
        TokenKind::Float(value) => {
            let value = *value;
            parser.advance();
            Ok(Expr::number(value))
        }
        _ => Err(parser.unexpected("a number")),
    }
}

/// parenexpr ::= '(' expression ')'
pub fn parse_paren_expr<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    parser.expect_char(b'(')?;
    let expr = parse_expression(parser)?;
    parser.expect_char(b')')?;

    Ok(expr)
}

/// identifierexpr ::= IDENT | IDENT '(' (expression (',' expression)*)? ')'
pub fn parse_identifier_expr<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    let name = parser.expect_identifier("as a name")?;

    if !parser.is_char(b'(') {
        return Ok(Expr::Variable(name));
    }

    parser.advance();

    let mut args = vec![];

    if !parser.is_char(b')') {
        loop {
            args.push(parse_expression(parser)?);

            if parser.is_char(b')') {
                break;
            }

            if !parser.is_char(b',') {
                return Err(parser.unexpected("`,` or `)` in argument list"));
            }

            parser.advance();
        }
    }

    parser.expect_char(b')')?;

    Ok(Expr::Call { callee: name, args })
}

/// ifexpr ::= 'if' expression 'then' expression 'else' expression
pub fn parse_if_expr<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    parser.expect(TokenKind::If)?;

    let cond = parse_expression(parser)?;

    parser.expect(TokenKind::Then)?;
    let then_branch = parse_expression(parser)?;

    parser.expect(TokenKind::Else)?;
    let else_branch = parse_expression(parser)?;

    Ok(Expr::If {
        cond: Box::new(cond),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    })
}

/// forexpr ::= 'for' IDENT '=' expression ',' expression (',' expression)? 'in' expression
pub fn parse_for_expr<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    parser.expect(TokenKind::For)?;

    let var = parser.expect_identifier("after `for`")?;
    parser.expect_char(b'=')?;

    let start = parse_expression(parser)?;
    parser.expect_char(b',')?;

    let end = parse_expression(parser)?;

    let step = if parser.is_char(b',') {
        parser.advance();
        Some(Box::new(parse_expression(parser)?))
    } else {
        None
    };

    parser.expect(TokenKind::In)?;
    let body = parse_expression(parser)?;

    Ok(Expr::For {
        var,
        start: Box::new(start),
        end: Box::new(end),
        step,
        body: Box::new(body),
    })
}

/// varexpr ::= 'var' IDENT ('=' expression)? (',' IDENT ('=' expression)?)* 'in' expression
pub fn parse_var_expr<R: BufRead>(parser: &mut Parser<R>) -> Result<Expr, Error> {
    parser.expect(TokenKind::Var)?;

    let mut bindings = vec![];

    loop {
        let name = parser.expect_identifier("in `var` binding")?;

        let init = if parser.is_char(b'=') {
            parser.advance();
            Some(parse_expression(parser)?)
        } else {
            None
        };

        bindings.push((name, init));

        if !parser.is_char(b',') {
            break;
        }

        parser.advance();
    }

    parser.expect(TokenKind::In)?;
    let body = parse_expression(parser)?;

    Ok(Expr::Var {
        bindings,
        body: Box::new(body),
    })
}
