use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input stream closed")]
    Eof,
}

pub type CalcResult<T> = Result<T, CalcError>;
