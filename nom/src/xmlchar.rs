use nom::error::ErrorKind;
use nom::{AsChar, IResult, InputTakeAtPosition};

// -----------------------------------------------------------------------------------------------

/// #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
///
/// [\[2\] Char](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-Char)
pub fn is_char(value: char) -> bool {
    matches!(
        value,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// ":" | \[A-Z] | "_" | \[a-z] | \[#xC0-#xD6] | \[#xD8-#xF6] | \[#xF8-#x2FF] | \[#x370-#x37D] |
/// \[#x37F-#x1FFF] | \[#x200C-#x200D] | \[#x2070-#x218F] | \[#x2C00-#x2FEF] | \[#x3001-#xD7FF] |
/// \[#xF900-#xFDCF] | \[#xFDF0-#xFFFD] | \[#x10000-#xEFFFF]
///
/// [\[4\] NameStartChar](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-NameStartChar)
pub fn is_name_start_char(value: char) -> bool {
    matches!(
        value,
        ':' | 'A'..='Z'
            | '_'
            | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}'
    )
}

/// NameStartChar | "-" | "." | \[0-9] | #xB7 | \[#x0300-#x036F] | \[#x203F-#x2040]
///
/// [\[4a\] NameChar](https://www.w3.org/TR/2008/REC-xml-20081126/#NT-NameChar)
pub fn is_name_char(value: char) -> bool {
    is_name_start_char(value)
        || matches!(
            value,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

// -----------------------------------------------------------------------------------------------

/// Recognizes zero or more XML characters not listed in `except`.
pub fn char_except0(except: &'static str) -> impl FnMut(&str) -> IResult<&str, &str> {
    move |input: &str| {
        input.split_at_position_complete(|i| {
            let c = i.as_char();
            !is_char(c) || except.contains(c)
        })
    }
}

/// Recognizes one or more XML characters not listed in `except`.
pub fn char_except1(except: &'static str) -> impl FnMut(&str) -> IResult<&str, &str> {
    move |input: &str| {
        input.split_at_position1_complete(
            |i| {
                let c = i.as_char();
                !is_char(c) || except.contains(c)
            },
            ErrorKind::Char,
        )
    }
}

// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_char() {
        assert!(is_char('\t'));
        assert!(is_char('\n'));
        assert!(is_char('a'));
        assert!(is_char('\u{10000}'));
        assert!(!is_char('\u{0}'));
        assert!(!is_char('\u{B}'));
        assert!(!is_char('\u{FFFE}'));
    }

    #[test]
    fn test_is_name_start_char() {
        assert!(is_name_start_char(':'));
        assert!(is_name_start_char('_'));
        assert!(is_name_start_char('a'));
        assert!(is_name_start_char('A'));
        assert!(!is_name_start_char('-'));
        assert!(!is_name_start_char('1'));
        assert!(!is_name_start_char(' '));
    }

    #[test]
    fn test_is_name_char() {
        assert!(is_name_char('-'));
        assert!(is_name_char('.'));
        assert!(is_name_char('1'));
        assert!(is_name_char('a'));
        assert!(!is_name_char(' '));
        assert!(!is_name_char('<'));
    }

    #[test]
    fn test_char_except0() {
        let (rest, value) = char_except0("<&")("ab<c").unwrap();
        assert_eq!("<c", rest);
        assert_eq!("ab", value);

        let (rest, value) = char_except0("<&")("<c").unwrap();
        assert_eq!("<c", rest);
        assert_eq!("", value);
    }

    #[test]
    fn test_char_except1() {
        let (rest, value) = char_except1("<&")("ab<c").unwrap();
        assert_eq!("<c", rest);
        assert_eq!("ab", value);

        let err = char_except1("<&")("<c").err().unwrap();
        assert!(matches!(err, nom::Err::Error(_)));
    }
}
