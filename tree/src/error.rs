use xmlite_sax::error as sax;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    Parse { line: usize, column: usize },
    Validation { line: usize, column: usize },
    MalformedDocument,
    UnexpectedEndOfStream,
    Structure(&'static str),
    IndexOutOfBounds,
}

impl From<sax::Error> for Error {
    fn from(value: sax::Error) -> Self {
        match value {
            sax::Error::Syntax { line, column } => Error::Parse { line, column },
            sax::Error::Validation { line, column } => Error::Validation { line, column },
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
