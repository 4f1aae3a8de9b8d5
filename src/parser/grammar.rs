//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::layout::{Attribute, Constraint, Relation, Strength};
use crate::parser::lexer::{tokenize, Token};

/// Right-hand side of a rule
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Reference {
        panel: String,
        attribute: Attribute,
        multiplier: f64,
        constant: f64,
    },
    Constant(f64),
}

/// Parse rules source into constraints
pub fn parse(input: &str) -> Result<Vec<Constraint>, Vec<ParseError>> {
    let len = input.len();
    let tokens = tokenize(input)?;

    let token_stream = Stream::from_iter(tokens.into_iter().map(|(tok, span)| (tok, span.into())))
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    rules_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn rules_parser<'a, I>() -> impl Parser<'a, I, Vec<Constraint>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let ident = select! {
        Token::Ident(s) => s,
    };

    let number = select! {
        Token::Number(n) => n,
    };

    let attribute = ident.clone().try_map(|name: String, span: SimpleSpan| {
        name.parse::<Attribute>()
            .map_err(|e| Rich::custom(span, e.to_string()))
    });

    // panel.attribute
    let reference = ident.clone().then_ignore(just(Token::Dot)).then(attribute);

    let relation = select! {
        Token::Equals => Relation::Eq,
        Token::GreaterOrEqual => Relation::Ge,
        Token::LessOrEqual => Relation::Le,
    };

    let offset = choice((just(Token::Plus).to(1.0), just(Token::Minus).to(-1.0)))
        .then(number.clone())
        .map(|(sign, n): (f64, f64)| sign * n);

    // ref [* n] [+- n]
    let scaled = reference
        .clone()
        .then(just(Token::Star).ignore_then(number.clone()).or_not())
        .then(offset.clone().or_not())
        .map(
            |(((panel, attribute), multiplier), constant)| Operand::Reference {
                panel,
                attribute,
                multiplier: multiplier.unwrap_or(1.0),
                constant: constant.unwrap_or(0.0),
            },
        );

    // n * ref [+- n]
    let factored = number
        .clone()
        .then_ignore(just(Token::Star))
        .then(reference.clone())
        .then(offset.or_not())
        .map(
            |((multiplier, (panel, attribute)), constant)| Operand::Reference {
                panel,
                attribute,
                multiplier,
                constant: constant.unwrap_or(0.0),
            },
        );

    // [-] n
    let constant = just(Token::Minus)
        .or_not()
        .then(number)
        .map(|(negative, n)| Operand::Constant(if negative.is_some() { -n } else { n }));

    let operand = choice((scaled, factored, constant));

    let strength = just(Token::At).ignore_then(ident.try_map(|name: String, span: SimpleSpan| {
        name.parse::<Strength>()
            .map_err(|e| Rich::custom(span, e.to_string()))
    }));

    let rule = reference
        .then(relation)
        .then(operand.or_not())
        .then(strength.or_not())
        .then_ignore(just(Token::Semicolon).or_not())
        .map(|((((target, target_attribute), relation), operand), strength)| {
            let constraint = Constraint::new(target, target_attribute, relation)
                .with_strength(strength.unwrap_or_default());
            match operand {
                Some(Operand::Reference {
                    panel,
                    attribute,
                    multiplier,
                    constant,
                }) => constraint
                    .with_source(panel, attribute)
                    .with_multiplier(multiplier)
                    .with_constant(constant),
                Some(Operand::Constant(constant)) => constraint.with_constant(constant),
                None => constraint,
            }
        });

    rule.repeated().collect().then_ignore(end())
}
