use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::combinator::{map, success};
use nom::multi::many0;
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;
use xmlite_nom::xmlchar;

use crate::error::{self, Error};

// -----------------------------------------------------------------------------------------------

/// Where evaluation starts relative to the context node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Children of the context node.
    Relative,
    /// Re-root at the owning document.
    Root,
    /// All descendants of the document, in document order.
    Descendant,
    /// Attributes of all descendants of the document.
    DescendantAttribute,
}

// -----------------------------------------------------------------------------------------------

/// One slash-delimited step of a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// `..`
    Parent,
    /// `@name`, matched verbatim against attribute names.
    Attribute(String),
    /// `name` or `prefix:name`, matched exactly.
    Name(String),
    /// `*:local`, matched against the substring after the last `:`.
    AnyPrefix(String),
}

// -----------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub anchor: Anchor,
    pub segments: Vec<Segment>,
}

impl Expr {
    /// Parses and validates a whole query up front.
    pub fn parse(input: &str) -> error::Result<Expr> {
        let (rest, (anchor, texts)) =
            path(input).map_err(|_| Error::InvalidXPath(input.to_string()))?;
        if !rest.is_empty() {
            return Err(Error::InvalidXPath(input.to_string()));
        }

        let segments = texts
            .iter()
            .map(|v| classify(v))
            .collect::<error::Result<Vec<Segment>>>()?;

        // A descendant search with nothing to match is meaningless.
        if segments.is_empty()
            && matches!(anchor, Anchor::Descendant | Anchor::DescendantAttribute)
        {
            return Err(Error::InvalidXPath(input.to_string()));
        }

        Ok(Expr { anchor, segments })
    }
}

// -----------------------------------------------------------------------------------------------

/// Anchor Segment ('/'+ Segment)* '/'*
fn path(input: &str) -> IResult<&str, (Anchor, Vec<&str>)> {
    tuple((anchor, segments))(input)
}

/// '//@' | '//' | '/' | ε
fn anchor(input: &str) -> IResult<&str, Anchor> {
    alt((
        map(tag("//@"), |_| Anchor::DescendantAttribute),
        map(tag("//"), |_| Anchor::Descendant),
        map(tag("/"), |_| Anchor::Root),
        success(Anchor::Relative),
    ))(input)
}

/// Slash-separated segment texts; repeated and trailing slashes collapse.
fn segments(input: &str) -> IResult<&str, Vec<&str>> {
    terminated(
        many0(preceded(
            take_while(|c| c == '/'),
            take_while1(|c| c != '/'),
        )),
        take_while(|c| c == '/'),
    )(input)
}

fn classify(text: &str) -> error::Result<Segment> {
    if text == ".." {
        return Ok(Segment::Parent);
    }

    if let Some(name) = text.strip_prefix('@') {
        if name.is_empty() {
            return Err(Error::InvalidXPath(text.to_string()));
        }
        return Ok(Segment::Attribute(name.to_string()));
    }

    let parts: Vec<&str> = text.split(':').collect();
    match parts.as_slice() {
        [name] if is_name(name) => Ok(Segment::Name(text.to_string())),
        ["*", local] if is_name(local) => Ok(Segment::AnyPrefix(local.to_string())),
        [prefix, local] if is_name(prefix) && is_name(local) => {
            Ok(Segment::Name(text.to_string()))
        }
        _ => Err(Error::InvalidXPath(text.to_string())),
    }
}

fn is_name(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next().is_some_and(xmlchar::is_name_start_char) && chars.all(xmlchar::is_name_char)
}

// -----------------------------------------------------------------------------------------------
