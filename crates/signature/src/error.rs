use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Unexpected end of {input:?}")]
    UnexpectedEnd { input: String },
    #[error("Unexpected {found:?} at position {position} of {input:?}")]
    UnexpectedChar {
        found: char,
        position: usize,
        input: String,
    },
    #[error("Trailing input at position {position} of {input:?}")]
    TrailingInput { position: usize, input: String },
    #[error("More than 255 array dimensions at position {position} of {input:?}")]
    TooManyDimensions { position: usize, input: String },
    #[error("Type arguments nested too deep at position {position} of {input:?}")]
    NestingTooDeep { position: usize, input: String },
}
