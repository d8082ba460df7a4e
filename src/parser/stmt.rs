use std::io::BufRead;

use crate::{
    ast::statements::{FunctionDef, Prototype},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{expr::parse_expression, lookups::is_legal_operator_symbol, parser::Parser};

/// definition ::= 'def' prototype expression
pub fn parse_definition<R: BufRead>(parser: &mut Parser<R>) -> Result<FunctionDef, Error> {
    parser.expect(TokenKind::Def)?;

    let proto = parse_prototype(parser)?;
    let body = parse_expression(parser)?;

    Ok(FunctionDef { proto, body })
}

/// extern ::= 'extern' prototype
pub fn parse_extern<R: BufRead>(parser: &mut Parser<R>) -> Result<Prototype, Error> {
    parser.expect(TokenKind::Extern)?;
    parse_prototype(parser)
}

/// toplevel ::= expression
///
/// The expression becomes the body of a fresh zero-parameter function.
pub fn parse_toplevel<R: BufRead>(parser: &mut Parser<R>) -> Result<FunctionDef, Error> {
    let position = parser.get_position();
    let body = parse_expression(parser)?;
    let name = parser.next_anonymous_name();

    Ok(FunctionDef {
        proto: Prototype::function(&name, vec![], position),
        body,
    })
}

/// prototype ::= IDENT '(' IDENT* ')'
///             | 'unary' OPCHAR '(' IDENT ')'
///             | 'binary' OPCHAR INT '(' IDENT IDENT ')'
pub fn parse_prototype<R: BufRead>(parser: &mut Parser<R>) -> Result<Prototype, Error> {
    let position = parser.get_position();

    match parser.current_token_kind() {
        TokenKind::Identifier(_) => {
            let name = parser.expect_identifier("as function name")?;
            let params = parse_parameters(parser)?;

            Ok(Prototype::function(&name, params, position))
        }
        TokenKind::Unary => {
            parser.advance();
            let op = parse_operator_symbol(parser)?;

            let mut params = parse_parameters(parser)?;
            if params.len() != 1 {
                return Err(arity_error(op, 1, params.len(), position));
            }

            Ok(Prototype::unary(op, params.remove(0), position))
        }
        TokenKind::Binary => {
            parser.advance();
            let op = parse_operator_symbol(parser)?;
            let precedence = parse_precedence(parser)?;

            let params = parse_parameters(parser)?;
            let [lhs, rhs]: [String; 2] = params
                .try_into()
                .map_err(|params: Vec<String>| arity_error(op, 2, params.len(), position))?;

            Ok(Prototype::binary(op, precedence, lhs, rhs, position))
        }
        _ => Err(Error::new(
            ErrorImpl::InvalidPrototype {
                token: parser.current_token_kind().to_string(),
            },
            position,
        )),
    }
}

/// '(' IDENT* ')'
fn parse_parameters<R: BufRead>(parser: &mut Parser<R>) -> Result<Vec<String>, Error> {
    parser.expect_char(b'(')?;

    let mut params = vec![];
    while let TokenKind::Identifier(name) = parser.current_token_kind() {
        params.push(name.clone());
        parser.advance();
    }

    parser.expect_char(b')')?;

    Ok(params)
}

fn parse_operator_symbol<R: BufRead>(parser: &mut Parser<R>) -> Result<char, Error> {
    match parser.current_token_kind() {
        TokenKind::Char(c) if is_legal_operator_symbol(*c) => {
            let op = *c as char;
            parser.advance();
            Ok(op)
        }
        other => Err(Error::new(
            ErrorImpl::InvalidOperatorSymbol {
                token: other.to_string(),
            },
            parser.get_position(),
        )),
    }
}

fn parse_precedence<R: BufRead>(parser: &mut Parser<R>) -> Result<i32, Error> {
    let precedence = match parser.current_token_kind() {
        TokenKind::Int(value) => i32::try_from(*value).ok(),
        _ => None,
    };

    let Some(precedence) = precedence else {
        return Err(Error::new(
            ErrorImpl::InvalidPrecedence {
                token: parser.current_token_kind().to_string(),
            },
            parser.get_position(),
        ));
    };

    if precedence <= 0 {
        tracing::warn!(
            precedence,
            position = %parser.get_position(),
            "operator precedence is not positive, the operator will not be usable as a binary operator"
        );
    }

    parser.advance();
    Ok(precedence)
}

fn arity_error(op: char, expected: usize, received: usize, position: crate::Position) -> Error {
    Error::new(
        ErrorImpl::OperatorArity {
            operator: op,
            expected,
            received,
        },
        position,
    )
}
