use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "parser/solidity.pest"]
pub struct SolidityLexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    StringLiteral,
    Punctuation,
}

/// A single lexeme with the 1-based line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
}

impl<'a> Token<'a> {
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    fn is_word(&self) -> bool {
        self.kind != TokenKind::Punctuation
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, pest::error::Error<Rule>> {
    let pairs = SolidityLexer::parse(Rule::source, source)?;

    let mut tokens = Vec::new();
    let mut line = 1;
    let mut last_offset = 0;

    for pair in pairs.flatten() {
        let kind = match pair.as_rule() {
            Rule::identifier => TokenKind::Identifier,
            Rule::number => TokenKind::Number,
            Rule::string_literal => TokenKind::StringLiteral,
            Rule::punctuation => TokenKind::Punctuation,
            _ => continue,
        };

        // Position::line_col rescans from the start of input, count incrementally instead
        let start = pair.as_span().start();
        line += source[last_offset..start].matches('\n').count();
        last_offset = start;

        tokens.push(Token {
            kind,
            text: pair.as_str(),
            line,
        });
    }

    Ok(tokens)
}

/// Renders tokens back into compact source text, e.g. `mapping(address => uint256)`.
pub fn join_tokens(tokens: &[Token]) -> String {
    let mut output = String::new();
    let mut previous: Option<&Token> = None;

    for token in tokens {
        if let Some(prev) = previous {
            let spaced = (prev.is_word() && token.is_word())
                || prev.is(",")
                || prev.is("=>")
                || token.is("=>");
            if spaced {
                output.push(' ');
            }
        }
        output.push_str(token.text);
        previous = Some(token);
    }

    output
}
