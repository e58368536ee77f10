//! Line tokenizer for the schema descriptor grammar.
//!
//! The grammar is line-oriented: every member of a block sits on its own
//! line, so each line is tokenized independently. String literals are kept
//! whole so braces inside default values never affect block depth.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    /// `@name` (field directive) or `@@name` (block directive).
    Directive { name: String, block: bool },
    Str(String),
    Question,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Other(char),
}

/// Tokenizes one line, dropping any `//` comment outside string literals.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    break;
                }
                tokens.push(Token::Other('/'));
            }
            '"' => {
                chars.next();
                let mut literal = String::new();
                let mut escaped = false;
                for c in chars.by_ref() {
                    if escaped {
                        literal.push(c);
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    } else {
                        literal.push(c);
                    }
                }
                tokens.push(Token::Str(literal));
            }
            '@' => {
                chars.next();
                let block = chars.peek() == Some(&'@');
                if block {
                    chars.next();
                }
                let name = take_identifier(&mut chars);
                tokens.push(Token::Directive { name, block });
            }
            c if is_identifier_char(c) => {
                tokens.push(Token::Ident(take_identifier(&mut chars)));
            }
            _ => {
                chars.next();
                tokens.push(match c {
                    '?' => Token::Question,
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ':' => Token::Colon,
                    ',' => Token::Comma,
                    other => Token::Other(other),
                });
            }
        }
    }

    tokens
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn take_identifier(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        // Dotted names such as `db.VarChar` stay one identifier.
        if is_identifier_char(c) || (c == '.' && !ident.is_empty()) {
            ident.push(c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}
