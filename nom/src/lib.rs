pub mod helper;
pub mod xmlchar;

use nom::bytes::complete::take_while1;
use nom::combinator::verify;
use nom::IResult;

// -----------------------------------------------------------------------------------------------

/// NameStartChar (NameChar)*
///
/// [\[5\] Name](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Name)
pub fn name(input: &str) -> IResult<&str, &str> {
    verify(take_while1(xmlchar::is_name_char), |v: &str| {
        v.chars().next().is_some_and(xmlchar::is_name_start_char)
    })(input)
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        let (rest, value) = name("note>").unwrap();
        assert_eq!(">", rest);
        assert_eq!("note", value);

        let (rest, value) = name("dc:title ").unwrap();
        assert_eq!(" ", rest);
        assert_eq!("dc:title", value);

        let (rest, value) = name("full-path=").unwrap();
        assert_eq!("=", rest);
        assert_eq!("full-path", value);
    }

    #[test]
    fn test_name_invalid_start() {
        assert!(name("1abc").is_err());
        assert!(name("-abc").is_err());
        assert!(name(" abc").is_err());
        assert!(name("").is_err());
    }
}
