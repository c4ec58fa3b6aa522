//! Media query evaluation on top of the `cssparser` tokenizer.
//! Spec: <https://www.w3.org/TR/mediaqueries-3/#syntax>

use core::error::Error;
use core::fmt;

use cssparser::{Delimiter, ParseError, ParseErrorKind, Parser, ParserInput, Token};
use log::trace;

use crate::MediaEnvironment;

/// Why a media query could not be evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaError {
    /// Query text was empty or whitespace only.
    Empty,
    /// Media feature name outside the supported set.
    UnknownFeature(String),
    /// Feature value of the wrong type or unit.
    BadValue(String),
    /// Tokens that do not form a media query.
    Syntax(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(formatter, "empty media query"),
            Self::UnknownFeature(name) => write!(formatter, "unknown media feature `{name}`"),
            Self::BadValue(value) => write!(formatter, "bad media feature value {value}"),
            Self::Syntax(detail) => write!(formatter, "media query syntax error: {detail}"),
        }
    }
}

impl Error for MediaError {}

type QueryResult<'input, T> = Result<T, ParseError<'input, MediaError>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Range {
    Exact,
    Min,
    Max,
}

/// Evaluate a comma-separated media query list.
///
/// The list holds when any query in it holds; evaluation stops at the first
/// satisfied query, so later queries are not validated.
///
/// # Errors
/// Returns a [`MediaError`] when the text is empty, names an unknown feature,
/// carries a value of the wrong type, or does not parse.
pub fn evaluate(query: &str, env: &MediaEnvironment) -> Result<bool, MediaError> {
    if query.trim().is_empty() {
        return Err(MediaError::Empty);
    }
    let mut input = ParserInput::new(query);
    let mut parser = Parser::new(&mut input);
    let outcome = evaluate_list(&mut parser, env).map_err(into_media_error);
    trace!(target: "css::media", "@media {query} -> {outcome:?}");
    outcome
}

fn evaluate_list<'input>(
    parser: &mut Parser<'input, '_>,
    env: &MediaEnvironment,
) -> QueryResult<'input, bool> {
    loop {
        let satisfied =
            parser.parse_until_before(Delimiter::Comma, |query| evaluate_query(query, env))?;
        if satisfied {
            return Ok(true);
        }
        if parser.is_exhausted() {
            return Ok(false);
        }
        parser.expect_comma()?;
    }
}

/// `[not|only]? <media-type> [and (<feature>)]*` or `(<feature>) [and (<feature>)]*`.
fn evaluate_query<'input>(
    parser: &mut Parser<'input, '_>,
    env: &MediaEnvironment,
) -> QueryResult<'input, bool> {
    let negated = parser
        .try_parse(|input| input.expect_ident_matching("not"))
        .is_ok();
    let only = !negated
        && parser
            .try_parse(|input| input.expect_ident_matching("only"))
            .is_ok();
    let location = parser.current_source_location();
    let token = parser.next()?.clone();
    let mut satisfied = match token {
        Token::Ident(media_type) => media_type_matches(&media_type),
        Token::ParenthesisBlock if !only => {
            parser.parse_nested_block(|block| evaluate_feature(block, env))?
        }
        other => {
            return Err(location.new_custom_error(MediaError::Syntax(format!("{other:?}"))));
        }
    };
    while !parser.is_exhausted() {
        parser.expect_ident_matching("and")?;
        parser.expect_parenthesis_block()?;
        let feature = parser.parse_nested_block(|block| evaluate_feature(block, env))?;
        satisfied = satisfied && feature;
    }
    Ok(satisfied != negated)
}

/// Contents of one `( ... )` group: `name` or `name: value`.
fn evaluate_feature<'input>(
    block: &mut Parser<'input, '_>,
    env: &MediaEnvironment,
) -> QueryResult<'input, bool> {
    let location = block.current_source_location();
    let name = block.expect_ident()?.to_ascii_lowercase();
    let value = if block.is_exhausted() {
        None
    } else {
        block.expect_colon()?;
        Some(block.next()?.clone())
    };
    feature_holds(&name, value.as_ref(), env).map_err(|error| location.new_custom_error(error))
}

fn media_type_matches(media_type: &str) -> bool {
    media_type.eq_ignore_ascii_case("all") || media_type.eq_ignore_ascii_case("screen")
}

fn feature_holds(
    name: &str,
    value: Option<&Token<'_>>,
    env: &MediaEnvironment,
) -> Result<bool, MediaError> {
    let (range, feature) = if let Some(rest) = name.strip_prefix("min-") {
        (Range::Min, rest)
    } else if let Some(rest) = name.strip_prefix("max-") {
        (Range::Max, rest)
    } else {
        (Range::Exact, name)
    };
    match (feature, range) {
        ("width", _) => compare_length(range, value, env.width, env),
        ("height", _) => compare_length(range, value, env.height, env),
        ("color", _) => compare_bits(range, value, env.color_bits),
        ("monochrome", _) => compare_bits(range, value, env.monochrome_bits),
        ("orientation", Range::Exact) => match keyword(value).as_deref() {
            Some("landscape") => Ok(env.is_landscape()),
            Some("portrait") => Ok(!env.is_landscape()),
            _ => Err(bad_value(value)),
        },
        ("scripting", Range::Exact) => match keyword(value).as_deref() {
            None if value.is_none() => Ok(env.scripting),
            Some("enabled") => Ok(env.scripting),
            Some("none") => Ok(!env.scripting),
            Some("initial-only") => Ok(false),
            _ => Err(bad_value(value)),
        },
        // No pointing device and no color inversion on a headless screen.
        ("hover" | "any-hover" | "pointer" | "any-pointer" | "inverted-colors", Range::Exact) => {
            Ok(false)
        }
        _ => Err(MediaError::UnknownFeature(name.to_owned())),
    }
}

fn compare_length(
    range: Range,
    value: Option<&Token<'_>>,
    actual: f32,
    env: &MediaEnvironment,
) -> Result<bool, MediaError> {
    let Some(token) = value else {
        return match range {
            Range::Exact => Ok(actual > 0.0),
            Range::Min | Range::Max => Err(bad_value(value)),
        };
    };
    let wanted = match token {
        Token::Dimension {
            value: amount,
            unit,
            ..
        } => match unit.to_ascii_lowercase().as_str() {
            "px" => *amount,
            "em" | "rem" => *amount * env.em_size,
            _ => return Err(bad_value(value)),
        },
        Token::Number { value: amount, .. } if amount.abs() < f32::EPSILON => 0.0,
        _ => return Err(bad_value(value)),
    };
    Ok(match range {
        Range::Min => actual >= wanted,
        Range::Max => actual <= wanted,
        Range::Exact => (actual - wanted).abs() < 0.5,
    })
}

fn compare_bits(range: Range, value: Option<&Token<'_>>, actual: u32) -> Result<bool, MediaError> {
    let Some(token) = value else {
        return match range {
            Range::Exact => Ok(actual > 0),
            Range::Min | Range::Max => Err(bad_value(value)),
        };
    };
    let Token::Number {
        int_value: Some(bits),
        ..
    } = token
    else {
        return Err(bad_value(value));
    };
    let wanted = u32::try_from(*bits).map_err(|_| bad_value(value))?;
    Ok(match range {
        Range::Min => actual >= wanted,
        Range::Max => actual <= wanted,
        Range::Exact => actual == wanted,
    })
}

fn keyword(value: Option<&Token<'_>>) -> Option<String> {
    match value {
        Some(Token::Ident(ident)) => Some(ident.to_ascii_lowercase()),
        _ => None,
    }
}

fn bad_value(value: Option<&Token<'_>>) -> MediaError {
    value.map_or_else(
        || MediaError::BadValue("(missing)".to_owned()),
        |token| MediaError::BadValue(format!("{token:?}")),
    )
}

fn into_media_error(error: ParseError<'_, MediaError>) -> MediaError {
    match error.kind {
        ParseErrorKind::Custom(inner) => inner,
        ParseErrorKind::Basic(basic) => MediaError::Syntax(format!("{basic:?}")),
    }
}
