pub mod error;
pub mod model;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, hex_digit1, multispace0, multispace1};
use nom::combinator::{map, map_opt, opt, recognize};
use nom::error::{Error as NomError, ErrorKind};
use nom::multi::{many0, many1};
use nom::sequence::{delimited, preceded, separated_pair, tuple};
use nom::IResult;
use xmlite_nom::{helper, name, xmlchar};

// -----------------------------------------------------------------------------------------------

/// Pull tokenizer over a complete in-memory document.
///
/// Emits `StartDocument` first and `EndDocument` only when the input ends
/// cleanly after the root element; a truncated input simply stops producing
/// events, leaving the truncation for the consumer to diagnose. The XML
/// declaration, comments, processing instructions, and the DOCTYPE are
/// recognized and skipped.
pub struct EventReader<'a> {
    input: &'a str,
    rest: &'a str,
    state: State,
    depth: usize,
    pending: Option<model::XmlEvent>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    Start,
    Prolog,
    Content,
    Epilog,
    Finished,
}

impl<'a> EventReader<'a> {
    pub fn new(input: &'a str) -> Self {
        EventReader {
            input,
            rest: input,
            state: State::Start,
            depth: 0,
            pending: None,
        }
    }

    fn syntax_error(&mut self, at: &str) -> error::Error {
        let (line, column) = position(self.input, at);
        self.state = State::Finished;
        error::Error::Syntax { line, column }
    }

    fn validation_error(&mut self, at: &str) -> error::Error {
        let (line, column) = position(self.input, at);
        self.state = State::Finished;
        error::Error::Validation { line, column }
    }

    fn start_element(
        &mut self,
        at: &str,
        rest: &'a str,
        name: &str,
        attributes: Vec<model::Attribute>,
        empty: bool,
    ) -> error::Result<model::XmlEvent> {
        for (index, attribute) in attributes.iter().enumerate() {
            if attributes[..index].iter().any(|a| a.name == attribute.name) {
                return Err(self.validation_error(at));
            }
        }

        self.rest = rest;
        self.state = State::Content;
        self.depth += 1;
        if empty {
            self.pending = Some(model::XmlEvent::EndElement {
                name: name.to_string(),
            });
        }

        Ok(model::XmlEvent::StartElement {
            name: name.to_string(),
            attributes,
        })
    }

    fn end_element(&mut self, name: &str) -> model::XmlEvent {
        self.depth -= 1;
        if self.depth == 0 {
            self.state = State::Epilog;
        }

        model::XmlEvent::EndElement {
            name: name.to_string(),
        }
    }
}

impl<'a> Iterator for EventReader<'a> {
    type Item = error::Result<model::XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Start => {
                    self.state = State::Prolog;
                    return Some(Ok(model::XmlEvent::StartDocument));
                }
                State::Prolog => {
                    if let Ok((rest, _)) = misc(self.rest) {
                        self.rest = rest;
                    } else if let Ok((rest, _)) = doctype(self.rest) {
                        self.rest = rest;
                    } else if let Ok((rest, (name, attributes, empty))) = start_tag(self.rest) {
                        let at = self.rest;
                        return Some(self.start_element(at, rest, name, attributes, empty));
                    } else {
                        let at = self.rest;
                        return Some(Err(self.syntax_error(at)));
                    }
                }
                State::Content => {
                    if let Some(event) = self.pending.take() {
                        if let model::XmlEvent::EndElement { name } = event {
                            return Some(Ok(self.end_element(&name)));
                        }
                        return Some(Ok(event));
                    }

                    if self.rest.is_empty() {
                        // Truncated document; the consumer sees no terminal event.
                        self.state = State::Finished;
                        return None;
                    }

                    if let Ok((rest, name)) = end_tag(self.rest) {
                        self.rest = rest;
                        return Some(Ok(self.end_element(name)));
                    } else if let Ok((rest, (name, attributes, empty))) = start_tag(self.rest) {
                        let at = self.rest;
                        return Some(self.start_element(at, rest, name, attributes, empty));
                    } else if let Ok((rest, value)) = cdata(self.rest) {
                        self.rest = rest;
                        if value.is_empty() {
                            continue;
                        }
                        return Some(Ok(model::XmlEvent::Characters(value.to_string())));
                    } else if let Ok((rest, _)) = comment(self.rest) {
                        self.rest = rest;
                    } else if let Ok((rest, _)) = pi(self.rest) {
                        self.rest = rest;
                    } else if let Ok((rest, value)) = text(self.rest) {
                        self.rest = rest;
                        return Some(Ok(model::XmlEvent::Characters(value)));
                    } else {
                        let at = self.rest;
                        return Some(Err(self.syntax_error(at)));
                    }
                }
                State::Epilog => {
                    if let Ok((rest, _)) = misc(self.rest) {
                        self.rest = rest;
                    } else if self.rest.is_empty() {
                        self.state = State::Finished;
                        return Some(Ok(model::XmlEvent::EndDocument));
                    } else {
                        let at = self.rest;
                        return Some(Err(self.syntax_error(at)));
                    }
                }
                State::Finished => return None,
            }
        }
    }
}

// -----------------------------------------------------------------------------------------------

/// '<' Name (S Attribute)* S? ('/>' | '>')
///
/// [\[40\] STag](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-STag)
///
/// [\[44\] EmptyElemTag](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EmptyElemTag)
fn start_tag(input: &str) -> IResult<&str, (&str, Vec<model::Attribute>, bool)> {
    tuple((
        preceded(char('<'), name),
        many0(preceded(multispace1, attribute)),
        preceded(
            multispace0,
            alt((map(tag("/>"), |_| true), map(tag(">"), |_| false))),
        ),
    ))(input)
}

/// '</' Name S? '>'
///
/// [\[42\] ETag](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-ETag)
fn end_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("</"), name, tuple((multispace0, char('>'))))(input)
}

/// Name Eq AttValue
///
/// [\[41\] Attribute](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Attribute)
fn attribute(input: &str) -> IResult<&str, model::Attribute> {
    map(
        separated_pair(name, eq, att_value),
        model::Attribute::from,
    )(input)
}

/// S? '=' S?
///
/// [\[25\] Eq](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Eq)
fn eq(input: &str) -> IResult<&str, &str> {
    recognize(tuple((multispace0, char('='), multispace0)))(input)
}

/// '"' ([^<&"] | Reference)* '"' | "'" ([^<&'] | Reference)* "'"
///
/// [\[10\] AttValue](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-AttValue)
fn att_value(input: &str) -> IResult<&str, String> {
    alt((
        delimited(char('"'), decoded_text0("<&\""), char('"')),
        delimited(char('\''), decoded_text0("<&'"), char('\'')),
    ))(input)
}

/// \[^<&]* - (\[^<&]* ']]>' \[^<&]*)
///
/// [\[14\] CharData](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-CharData)
fn char_data(input: &str) -> IResult<&str, &str> {
    helper::text_until(xmlchar::char_except1("<&"), "]]>")(input)
}

/// (CharData | Reference)+ — one contiguous run of decoded character content.
fn text(input: &str) -> IResult<&str, String> {
    map(
        many1(alt((
            map(char_data, String::from),
            map(reference, String::from),
        ))),
        |pieces| pieces.concat(),
    )(input)
}

/// Zero or more decoded characters excluding `except`, references resolved.
fn decoded_text0(except: &'static str) -> impl FnMut(&str) -> IResult<&str, String> {
    move |input: &str| {
        map(
            many0(alt((
                map(xmlchar::char_except1(except), String::from),
                map(reference, String::from),
            ))),
            |pieces| pieces.concat(),
        )(input)
    }
}

/// EntityRef | CharRef
///
/// [\[67\] Reference](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Reference)
fn reference(input: &str) -> IResult<&str, char> {
    delimited(
        char('&'),
        alt((char_ref_hex, char_ref_dec, entity_ref)),
        char(';'),
    )(input)
}

/// '#x' \[0-9a-fA-F]+
///
/// [\[66\] CharRef](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-CharRef)
fn char_ref_hex(input: &str) -> IResult<&str, char> {
    map_opt(preceded(tag("#x"), hex_digit1), |v| {
        u32::from_str_radix(v, 16)
            .ok()
            .and_then(char::from_u32)
            .filter(|c| xmlchar::is_char(*c))
    })(input)
}

/// '#' \[0-9]+
///
/// [\[66\] CharRef](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-CharRef)
fn char_ref_dec(input: &str) -> IResult<&str, char> {
    map_opt(preceded(char('#'), digit1), |v: &str| {
        v.parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .filter(|c| xmlchar::is_char(*c))
    })(input)
}

/// '&' Name ';' — only the five predefined entities resolve.
///
/// [\[68\] EntityRef](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-EntityRef)
fn entity_ref(input: &str) -> IResult<&str, char> {
    map_opt(name, |v| match v {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => None,
    })(input)
}

/// '<![CDATA[' (Char* - (Char* ']]>' Char*)) ']]>'
///
/// [\[18\] CDSect](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-CDSect)
fn cdata(input: &str) -> IResult<&str, &str> {
    map(
        delimited(
            tag("<![CDATA["),
            opt(helper::text_until(xmlchar::char_except1(""), "]]>")),
            tag("]]>"),
        ),
        |v| v.unwrap_or(""),
    )(input)
}

/// '\<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'
///
/// [\[15\] Comment](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Comment)
fn comment(input: &str) -> IResult<&str, &str> {
    delimited(
        tag("<!--"),
        recognize(many0(tuple((opt(char('-')), xmlchar::char_except1("-"))))),
        tag("-->"),
    )(input)
}

/// '\<?' PITarget (S Char*)? '?>' — the XML declaration parses as a PI here;
/// both are skipped.
///
/// [\[16\] PI](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-PI)
fn pi(input: &str) -> IResult<&str, &str> {
    delimited(
        tag("<?"),
        recognize(tuple((
            name,
            opt(preceded(
                multispace1,
                opt(helper::text_until(xmlchar::char_except1(""), "?>")),
            )),
        ))),
        tag("?>"),
    )(input)
}

/// '\<!DOCTYPE' ... '>' — recognized and skipped, internal subset included.
///
/// [\[28\] doctypedecl](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-doctypedecl)
fn doctype(input: &str) -> IResult<&str, &str> {
    let (rest, _) = tag("<!DOCTYPE")(input)?;

    let mut depth = 0usize;
    for (index, c) in rest.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => return Ok((&rest[index + 1..], &rest[..index])),
            _ => {}
        }
    }

    Err(nom::Err::Error(NomError::new(input, ErrorKind::TakeUntil)))
}

/// Comment | PI | S
///
/// [\[27\] Misc](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Misc)
fn misc(input: &str) -> IResult<&str, &str> {
    alt((comment, pi, multispace1))(input)
}

// -----------------------------------------------------------------------------------------------

/// 1-based line and column of the first unconsumed character.
fn position(input: &str, rest: &str) -> (usize, usize) {
    let offset = input.len() - rest.len();
    let consumed = &input[..offset];
    let line = consumed.matches('\n').count() + 1;
    let column = match consumed.rfind('\n') {
        Some(index) => consumed[index + 1..].chars().count() + 1,
        None => consumed.chars().count() + 1,
    };
    (line, column)
}

// -----------------------------------------------------------------------------------------------
