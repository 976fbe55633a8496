//! Tokenizing Volpiano with winnow combinators.

use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::alphabet::{is_pitched, CharGroup};

use super::DecodeError;

type PResult<T> = winnow::ModalResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Clef(char),
    Bar(char),
    /// A run of space characters and its length.
    Gap(usize),
    /// A note or liquescent.
    Note(char),
    Flat(char),
    Natural(char),
    /// Brackets and other editorial signs.
    Other(char),
}

/// Parse a run of spaces (`-`, `.`, `,`)
fn parse_gap(input: &mut &str) -> PResult<Token> {
    take_while(1.., |c: char| CharGroup::Spaces.contains(c))
        .map(|run: &str| Token::Gap(run.chars().count()))
        .parse_next(input)
}

/// Parse a single token
pub fn parse_token(input: &mut &str) -> PResult<Token> {
    alt((
        parse_gap,
        one_of(is_pitched).map(Token::Note),
        one_of(|c: char| CharGroup::Clefs.contains(c)).map(Token::Clef),
        one_of(|c: char| CharGroup::Bars.contains(c)).map(Token::Bar),
        one_of(|c: char| CharGroup::Flats.contains(c)).map(Token::Flat),
        one_of(|c: char| CharGroup::Naturals.contains(c)).map(Token::Natural),
        one_of(|c: char| CharGroup::Others.contains(c)).map(Token::Other),
    ))
    .parse_next(input)
}

/// Split a Volpiano string into tokens paired with their byte offsets.
pub fn tokenize(notation: &str) -> Result<Vec<(usize, Token)>, DecodeError> {
    let mut tokens = Vec::new();
    let mut remaining = notation;

    while !remaining.is_empty() {
        let offset = notation.len() - remaining.len();
        let before = remaining;
        match parse_token.parse_next(&mut remaining) {
            Ok(token) => tokens.push((offset, token)),
            Err(_) => {
                let character = before.chars().next().unwrap_or_default();
                return Err(DecodeError::UnknownCharacter { character, offset });
            }
        }
    }

    Ok(tokens)
}
