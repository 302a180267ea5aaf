#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    Syntax { line: usize, column: usize },
    Validation { line: usize, column: usize },
}

impl Error {
    pub fn line(&self) -> usize {
        match self {
            Error::Syntax { line, .. } | Error::Validation { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Error::Syntax { column, .. } | Error::Validation { column, .. } => *column,
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
