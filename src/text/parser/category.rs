//! Category readers: single-row `_name.field value` runs and `loop_` tables.

use indexmap::IndexMap;
use log::{info, trace};

use super::error::{CifParseError, ReaderError};
use crate::data::{CifCategory, CifField, CifFrame};
use crate::task::{chunked_subtask, Progress, RuntimeContext};
use crate::text::tokenizer::{is_namespace, move_next, namespace_end, TokenType, TokenizerState};
use crate::text::tokens::TokenBuilder;

/// Loops with more values than this are logged when they finish.
const LARGE_LOOP_VALUES: usize = 1_000_000;

/// The data name of the current token without its `_category.` prefix.
fn field_name<'a>(tokenizer: &TokenizerState<'a>, namespace_len: usize) -> &'a str {
    tokenizer.token_str().get(namespace_len + 1..).unwrap_or("")
}

/// The `_category` part of the current data name.
fn namespace<'a>(tokenizer: &TokenizerState<'a>) -> (usize, usize, &'a str) {
    let start = tokenizer.token_start;
    let end = namespace_end(tokenizer);
    (start, end, tokenizer.data.get(start..end).unwrap_or(""))
}

/// Read a single-row category, starting at its first data name.
///
/// Consumes `_name.field value` pairs while the data names share the first
/// one's category and stops at the first token that does not.
pub(crate) fn handle_single<'a>(
    tokenizer: &mut TokenizerState<'a>,
    frame: &mut CifFrame<'a>,
) -> Result<(), CifParseError> {
    let (ns_start, ns_end, name) = namespace(tokenizer);
    let mut fields = IndexMap::new();

    while tokenizer.token_type == TokenType::ColumnName && is_namespace(tokenizer, ns_start, ns_end)
    {
        let field = field_name(tokenizer, name.len());
        move_next(tokenizer);
        if tokenizer.token_type != TokenType::Value {
            return Err(CifParseError::ExpectedValue {
                line: tokenizer.line_number,
            });
        }

        let mut tokens = TokenBuilder::with_capacity(1);
        tokens.add_token(tokenizer.token_start, tokenizer.token_end, tokenizer.is_escaped);
        fields.insert(field.to_string(), CifField::of_tokens(tokenizer.data, tokens));
        move_next(tokenizer);
    }

    let category_name = name.get(1..).unwrap_or("");
    trace!("Single-row category '{}' with {} fields", category_name, fields.len());
    frame.push_category(CifCategory::new(category_name, 1, fields));
    Ok(())
}

struct LoopReadState<'t, 'a> {
    tokenizer: &'t mut TokenizerState<'a>,
    tokens: Vec<TokenBuilder>,
    token_count: usize,
}

fn read_loop_chunk(chunk_size: usize, state: &mut LoopReadState<'_, '_>) -> usize {
    let field_count = state.tokens.len();
    let mut counter = 0;
    while state.tokenizer.token_type == TokenType::Value && counter < chunk_size {
        let tokenizer = &*state.tokenizer;
        state.tokens[state.token_count % field_count].add_token(
            tokenizer.token_start,
            tokenizer.token_end,
            tokenizer.is_escaped,
        );
        state.token_count += 1;
        move_next(state.tokenizer);
        counter += 1;
    }
    counter
}

fn update_loop_chunk(state: &LoopReadState<'_, '_>) -> Progress {
    Progress {
        message: "Parsing...",
        current: state.tokenizer.position,
        max: state.tokenizer.length,
    }
}

/// Read a `loop_` category, starting at the `loop_` keyword.
///
/// Values are streamed round-robin into the declared fields in chunks of
/// [`ParserConfig::chunk_size`](crate::ParserConfig) values, with a yield
/// point between chunks.
pub(crate) fn handle_loop<'a>(
    tokenizer: &mut TokenizerState<'a>,
    ctx: &mut RuntimeContext<'_>,
    frame: &mut CifFrame<'a>,
) -> Result<(), ReaderError> {
    let loop_line = tokenizer.line_number;

    move_next(tokenizer);
    if tokenizer.token_type != TokenType::ColumnName {
        return Err(CifParseError::EmptyLoop { line: loop_line }.into());
    }

    let (_, _, name) = namespace(tokenizer);
    let mut field_names = Vec::new();
    while tokenizer.token_type == TokenType::ColumnName {
        field_names.push(field_name(tokenizer, name.len()));
        move_next(tokenizer);
    }

    let field_count = field_names.len();
    let row_estimate = if name == "_atom_site" {
        tokenizer.length / 100
    } else {
        32
    };

    let mut state = LoopReadState {
        tokenizer: &mut *tokenizer,
        tokens: (0..field_count)
            .map(|_| TokenBuilder::with_capacity(row_estimate))
            .collect(),
        token_count: 0,
    };
    let chunk_size = ctx.config().chunk_size;
    let outcome = chunked_subtask(ctx, chunk_size, &mut state, read_loop_chunk, update_loop_chunk);
    let LoopReadState {
        tokens, token_count, ..
    } = state;

    if let Err(source) = outcome {
        return Err(ReaderError::Aborted {
            line: tokenizer.line_number,
            source,
        });
    }

    if token_count % field_count != 0 {
        return Err(CifParseError::MalformedLoopRowCount {
            line: loop_line,
            values: token_count,
            columns: field_count,
        }
        .into());
    }

    let row_count = token_count / field_count;
    let fields: IndexMap<String, CifField<'a>> = field_names
        .into_iter()
        .zip(tokens)
        .map(|(field, tokens)| (field.to_string(), CifField::of_tokens(tokenizer.data, tokens)))
        .collect();

    let category_name = name.get(1..).unwrap_or("");
    if token_count >= LARGE_LOOP_VALUES {
        info!(
            "Read loop '{}': {} rows x {} columns",
            category_name, row_count, field_count
        );
    } else {
        trace!("Loop category '{}' with {} rows", category_name, row_count);
    }
    frame.push_category(CifCategory::new(category_name, row_count, fields));
    Ok(())
}
