//! Lexer for the constraint rules language using logos

use logos::Logos;

use crate::error::ParseError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,

    // Relations (longer first)
    #[token(">=")]
    GreaterOrEqual,
    #[token("<=")]
    LessOrEqual,
    #[token("==")]
    #[token("=")]
    Equals,

    #[token("@")]
    At,
    #[token(";")]
    Semicolon,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Both `//` and `#` start a line comment
    #[regex(r"(//|#)[^\n]*", logos::skip)]
    Comment,
}

/// Lex input string, reporting every unrecognized character
pub fn tokenize(input: &str) -> Result<Vec<(Token, Span)>, Vec<ParseError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(tok) => tokens.push((tok, span)),
            Err(()) => {
                let text = &input[span.clone()];
                errors.push(ParseError::unexpected_character(span, text));
            }
        }
    }
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> {
        tokenize(input).unwrap().into_iter()
    }

    #[test]
    fn test_rule_tokens() {
        let tokens: Vec<_> = lex("menu.width = super.width * 0.25 @strong")
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("menu".to_string()),
                Token::Dot,
                Token::Ident("width".to_string()),
                Token::Equals,
                Token::Ident("super".to_string()),
                Token::Dot,
                Token::Ident("width".to_string()),
                Token::Star,
                Token::Number(0.25),
                Token::At,
                Token::Ident("strong".to_string()),
            ]
        );
    }

    #[test]
    fn test_relations() {
        let tokens: Vec<_> = lex(">= <= == =").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::GreaterOrEqual,
                Token::LessOrEqual,
                Token::Equals,
                Token::Equals
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        let tokens: Vec<_> = lex("a // one\n# two\nb").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![Token::Ident("a".to_string()), Token::Ident("b".to_string())]
        );
    }

    #[test]
    fn test_negative_number_is_minus_then_number() {
        let tokens: Vec<_> = lex("-10 3").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![Token::Minus, Token::Number(10.0), Token::Number(3.0)]
        );
    }

    #[test]
    fn test_spans() {
        let spans: Vec<_> = lex("ab.width").map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..2, 2..3, 3..8]);
    }

    #[test]
    fn test_tokenize_reports_unexpected_characters() {
        let errors = tokenize("a.width = $ 3 !").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].span(), &(10..11));
        assert_eq!(errors[0].message(), "Unexpected character '$'");
        assert_eq!(errors[1].span(), &(14..15));
    }

    #[test]
    fn test_tokenize_ok() {
        let tokens = tokenize("a.height == 1;").unwrap();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[5].0, Token::Semicolon);
    }
}
