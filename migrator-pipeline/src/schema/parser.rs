//! State machine over tokenized descriptor lines.
//!
//! The parser tracks which kind of block it is in and the brace depth. Only
//! depth-1 tokens of a `model` block are interpreted as members; deeper lines
//! (nested sub-configuration) and other block kinds only move the depth.
//! A block header may carry its opening brace on the following line.
use migrator_shared::types::{FieldDescriptor, FieldType, ModelDescriptor, SchemaMap};
use tracing::debug;

use super::tokenizer::{tokenize_line, Token};
use crate::errors::SchemaError;

#[derive(Debug)]
enum State {
    Outside,
    InModel { model: ModelDescriptor, opened_at: usize },
    InOtherBlock { name: String, opened_at: usize },
}

/// Parses descriptor text into model descriptors keyed by model name.
///
/// # Arguments
///
/// * `text` - The full descriptor document
///
/// # Returns
///
/// * `Ok(SchemaMap)` - Every model block found, in name order
/// * `Err(SchemaError)` - The block structure is malformed
pub fn parse_schema(text: &str) -> Result<SchemaMap, SchemaError> {
    let mut models = SchemaMap::new();
    let mut state = State::Outside;
    let mut depth: usize = 0;
    let mut pending: Option<Header> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let tokens = tokenize_line(line);
        if tokens.is_empty() {
            continue;
        }

        if let State::Outside = state {
            state = match pending.take() {
                Some(header) if tokens.first() == Some(&Token::LBrace) => header.into_state(),
                Some(header) if header.keyword == "model" => {
                    return Err(SchemaError::MissingOpenBrace {
                        name: header.name,
                        line: header.line,
                    });
                }
                _ => open_block(&tokens, line_no)?,
            };
            match &mut state {
                State::Outside => pending = Header::from_tokens(&tokens, line_no),
                State::InModel { model, .. } => apply_member_line(model, opening_line_members(&tokens)),
                State::InOtherBlock { .. } => {}
            }
        } else if depth == 1 {
            if let State::InModel { model, .. } = &mut state {
                apply_member_line(model, &tokens);
            }
        }

        for token in &tokens {
            match token {
                Token::LBrace => {
                    if matches!(state, State::Outside) {
                        state = State::InOtherBlock {
                            name: "<anonymous>".to_string(),
                            opened_at: line_no,
                        };
                    }
                    depth += 1;
                }
                Token::RBrace => {
                    if depth == 0 {
                        return Err(SchemaError::UnexpectedCloseBrace { line: line_no });
                    }
                    depth -= 1;
                    if depth == 0 {
                        let finished = std::mem::replace(&mut state, State::Outside);
                        if let State::InModel { model, .. } = finished {
                            if models.contains_key(&model.name) {
                                return Err(SchemaError::DuplicateModel {
                                    name: model.name,
                                    line: line_no,
                                });
                            }
                            debug!(
                                model = %model.name,
                                field_count = model.fields.len(),
                                dependency_count = model.dependencies.len(),
                                "Parsed model"
                            );
                            models.insert(model.name.clone(), model);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if let Some(header) = pending.filter(|h| h.keyword == "model") {
        return Err(SchemaError::MissingOpenBrace {
            name: header.name,
            line: header.line,
        });
    }

    match state {
        State::Outside => Ok(models),
        State::InModel { model, opened_at } => Err(SchemaError::UnterminatedBlock {
            name: model.name,
            line: opened_at,
        }),
        State::InOtherBlock { name, opened_at } => Err(SchemaError::UnterminatedBlock {
            name,
            line: opened_at,
        }),
    }
}

/// A `keyword Name` line whose opening brace is expected on the next line.
#[derive(Debug)]
struct Header {
    keyword: String,
    name: String,
    line: usize,
}

impl Header {
    fn from_tokens(tokens: &[Token], line_no: usize) -> Option<Self> {
        match tokens {
            [Token::Ident(keyword), Token::Ident(name)] => Some(Self {
                keyword: keyword.clone(),
                name: name.clone(),
                line: line_no,
            }),
            _ => None,
        }
    }

    fn into_state(self) -> State {
        if self.keyword == "model" {
            State::InModel {
                model: ModelDescriptor::new(self.name),
                opened_at: self.line,
            }
        } else {
            State::InOtherBlock {
                name: format!("{} {}", self.keyword, self.name),
                opened_at: self.line,
            }
        }
    }
}

/// Member tokens that follow the opening brace on the line that opens a
/// model, up to a closing brace on the same line.
fn opening_line_members(tokens: &[Token]) -> &[Token] {
    let Some(open) = tokens.iter().position(|t| *t == Token::LBrace) else {
        return &[];
    };
    let rest = &tokens[open + 1..];
    let end = rest
        .iter()
        .position(|t| *t == Token::RBrace)
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Decides what block, if any, a top-level line opens.
///
/// The opening brace itself is counted by the caller.
fn open_block(tokens: &[Token], line_no: usize) -> Result<State, SchemaError> {
    let opens = tokens.contains(&Token::LBrace);
    match tokens {
        [Token::Ident(keyword), Token::Ident(name), Token::LBrace, ..] if keyword == "model" => {
            Ok(State::InModel {
                model: ModelDescriptor::new(name.clone()),
                opened_at: line_no,
            })
        }
        [Token::Ident(keyword), Token::LBrace, ..] if keyword == "model" => {
            Err(SchemaError::MissingBlockName { line: line_no })
        }
        [Token::Ident(keyword), Token::Ident(name), ..] if opens => Ok(State::InOtherBlock {
            name: format!("{keyword} {name}"),
            opened_at: line_no,
        }),
        _ => Ok(State::Outside),
    }
}

/// Interprets a depth-1 line inside a model block.
///
/// Unknown shapes are ignored: descriptor richness beyond what migration
/// needs is not an error.
fn apply_member_line(model: &mut ModelDescriptor, tokens: &[Token]) {
    match tokens {
        [Token::Directive { name, block: true }, rest @ ..] if name == "map" => {
            if let Some(table) = first_string(rest) {
                model.table = table;
            }
        }
        [Token::Ident(field_name), Token::Ident(type_name), rest @ ..] => {
            let is_list = matches!(rest, [Token::LBracket, Token::RBracket, ..]);
            if is_list {
                return;
            }
            let is_optional = matches!(rest.first(), Some(Token::Question));

            if let Some(field_type) = FieldType::from_keyword(type_name) {
                let mut field = FieldDescriptor::new(field_name.clone(), field_type);
                field.is_optional = is_optional;
                field.is_identity = has_directive(rest, "id");
                if let Some(column) = directive_string(rest, "map") {
                    field.column = column;
                }
                model.fields.push(field);
            } else if starts_uppercase(type_name) && is_owning_relation(rest) {
                // Self references cannot be ordered and are dropped.
                if type_name != &model.name {
                    model.dependencies.insert(type_name.clone());
                }
            }
        }
        _ => {}
    }
}

fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn has_directive(tokens: &[Token], wanted: &str) -> bool {
    tokens
        .iter()
        .any(|t| matches!(t, Token::Directive { name, block: false } if name == wanted))
}

/// Returns the first string argument of a field directive, e.g. `@map("x")`.
fn directive_string(tokens: &[Token], wanted: &str) -> Option<String> {
    let position = tokens
        .iter()
        .position(|t| matches!(t, Token::Directive { name, block: false } if name == wanted))?;
    first_string(&tokens[position + 1..])
}

/// Returns the string inside a directive's leading parenthesised arguments.
fn first_string(tokens: &[Token]) -> Option<String> {
    match tokens {
        [Token::LParen, Token::Str(value), ..] => Some(value.clone()),
        [Token::LParen, Token::Ident(key), Token::Colon, Token::Str(value), ..] if key == "name" => {
            Some(value.clone())
        }
        _ => None,
    }
}

/// True when the tokens carry `@relation(... fields: [...] ...)`, which marks
/// the side of a relation that owns the foreign-key columns.
fn is_owning_relation(tokens: &[Token]) -> bool {
    let Some(position) = tokens
        .iter()
        .position(|t| matches!(t, Token::Directive { name, block: false } if name == "relation"))
    else {
        return false;
    };

    tokens[position + 1..]
        .windows(3)
        .any(|w| matches!(w, [Token::Ident(key), Token::Colon, Token::LBracket] if key == "fields"))
}
