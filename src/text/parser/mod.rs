//! CIF text parser.
//!
//! Drives the tokenizer over the whole buffer and assembles blocks, save
//! frames and categories. Parsing stops at the first structural error; there
//! is no partial document.

use log::debug;

use crate::data::{CifBlock, CifFile, CifFrame};
use crate::task::{Progress, RuntimeContext};
use crate::text::tokenizer::{move_next, TokenType, TokenizerState};

pub use error::{CifParseError, ReaderError, ReaderResult};

mod category;
mod error;

#[cfg(test)]
mod tests;

/// Length of the `data_` / `save_` keyword prefix.
const KEYWORD_LEN: usize = 5;

/// Parse CIF text with the default configuration.
pub fn parse(data: &str) -> ReaderResult<CifFile<'_>> {
    parse_with(data, &mut RuntimeContext::default())
}

/// Parse CIF text, reporting progress and honoring cancellation through `ctx`.
pub fn parse_with<'a>(data: &'a str, ctx: &mut RuntimeContext<'_>) -> ReaderResult<CifFile<'a>> {
    let mut tokenizer = TokenizerState::new(data);
    update(&tokenizer, ctx, 0)?;

    let file = parse_internal(&mut tokenizer, ctx)?;

    ctx.finish(Progress {
        message: "Parsing...",
        current: data.len(),
        max: data.len(),
    });
    debug!(
        "Parsed {} bytes, {} lines into {} blocks",
        data.len(),
        tokenizer.line_number,
        file.blocks().len()
    );
    Ok(file)
}

fn update(
    tokenizer: &TokenizerState<'_>,
    ctx: &mut RuntimeContext<'_>,
    current: usize,
) -> ReaderResult<()> {
    ctx.update(Progress {
        message: "Parsing...",
        current,
        max: tokenizer.length,
    })
    .map_err(|source| ReaderError::Aborted {
        line: tokenizer.line_number,
        source,
    })
}

/// Text after the 5-byte `data_`/`save_` keyword of the current token.
fn header<'a>(tokenizer: &TokenizerState<'a>) -> &'a str {
    tokenizer.token_str().get(KEYWORD_LEN..).unwrap_or("")
}

/// Pushes the block if it has categories, or if `keep_save_frames` is set and
/// it has save frames.
fn seal_block<'a>(
    blocks: &mut Vec<CifBlock<'a>>,
    frame: CifFrame<'a>,
    save_frames: Vec<CifFrame<'a>>,
    keep_save_frames: bool,
) {
    let keep = !frame.is_empty() || (keep_save_frames && !save_frames.is_empty());
    if !keep {
        if !save_frames.is_empty() {
            debug!(
                "Dropping block '{}' without categories ({} save frames)",
                frame.header(),
                save_frames.len()
            );
        }
        return;
    }
    debug!(
        "Sealed block '{}' ({} categories, {} save frames)",
        frame.header(),
        frame.category_count(),
        save_frames.len()
    );
    blocks.push(CifBlock::new(frame, save_frames));
}

fn parse_internal<'a>(
    tokenizer: &mut TokenizerState<'a>,
    ctx: &mut RuntimeContext<'_>,
) -> ReaderResult<CifFile<'a>> {
    let mut blocks = Vec::new();
    let mut block_frame = CifFrame::new("");
    let mut save_frames: Vec<CifFrame<'a>> = Vec::new();
    // `Some` while inside a save frame.
    let mut save_frame: Option<CifFrame<'a>> = None;

    move_next(tokenizer);
    loop {
        match tokenizer.token_type {
            TokenType::End => break,
            TokenType::Data => {
                if save_frame.is_some() {
                    return Err(CifParseError::DataBlockInsideSaveFrame {
                        line: tokenizer.line_number,
                    }
                    .into());
                }
                let next_frame = CifFrame::new(header(tokenizer));
                seal_block(
                    &mut blocks,
                    std::mem::replace(&mut block_frame, next_frame),
                    std::mem::take(&mut save_frames),
                    false,
                );
                move_next(tokenizer);
            }
            TokenType::Save => {
                let name = header(tokenizer);
                if name.is_empty() {
                    match save_frame.take() {
                        Some(frame) if frame.is_empty() => {
                            debug!("Dropping empty save frame '{}'", frame.header());
                        }
                        Some(frame) => {
                            debug!(
                                "Sealed save frame '{}' ({} categories)",
                                frame.header(),
                                frame.category_count()
                            );
                            save_frames.push(frame);
                        }
                        None => {
                            debug!(
                                "Ignoring save_ outside a save frame at line {}",
                                tokenizer.line_number
                            );
                        }
                    }
                } else {
                    if save_frame.is_some() {
                        return Err(CifParseError::NestedSaveFrame {
                            line: tokenizer.line_number,
                        }
                        .into());
                    }
                    save_frame = Some(CifFrame::new(name));
                }
                move_next(tokenizer);
            }
            TokenType::Loop => {
                let target = save_frame.as_mut().unwrap_or(&mut block_frame);
                category::handle_loop(tokenizer, ctx, target)?;
            }
            TokenType::ColumnName => {
                let target = save_frame.as_mut().unwrap_or(&mut block_frame);
                category::handle_single(tokenizer, target)?;
            }
            TokenType::Value | TokenType::Comment => {
                return Err(CifParseError::UnexpectedToken {
                    token: tokenizer.token_str().to_string(),
                    line: tokenizer.line_number,
                }
                .into());
            }
        }
    }

    if let Some(frame) = save_frame {
        return Err(CifParseError::UnterminatedSaveFrame {
            header: frame.header().to_string(),
            line: tokenizer.line_number,
        }
        .into());
    }

    seal_block(&mut blocks, block_frame, save_frames, true);
    Ok(CifFile::new(blocks))
}
