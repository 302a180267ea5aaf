use nom::error::{Error, ErrorKind};
use nom::IResult;

// -----------------------------------------------------------------------------------------------

/// Runs `parser` and cuts its output short at the first occurrence of `stop`.
///
/// Fails when `stop` leads the matched text, so callers see an error instead
/// of an empty match.
pub fn text_until<'a, F>(
    mut parser: F,
    stop: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str>
where
    F: FnMut(&'a str) -> IResult<&'a str, &'a str>,
{
    move |input: &'a str| {
        let (rest, value) = parser(input)?;
        match value.find(stop) {
            Some(0) => Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil))),
            Some(index) => Ok((&input[index..], &input[..index])),
            None => Ok((rest, value)),
        }
    }
}

// -----------------------------------------------------------------------------------------------
