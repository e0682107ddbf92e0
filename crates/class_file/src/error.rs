use std::io;

use classlens_signature::SignatureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(io::Error),
    #[error("Invalid magic identifier: 0x{0:X}")]
    MalformedHeader(u32),
    #[error("Unsupported constant pool tag: {0}")]
    UnsupportedConstantTag(u8),
    #[error("Expected {expected} in constant pool index {index} but found {found}")]
    ConstantKindMismatch {
        index: u16,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Unexpected end of class file")]
    TruncatedInput,
    #[error("Unresolved type variable {variable} in {owner}")]
    UnresolvedTypeVariable { owner: String, variable: String },
    #[error("Invalid constant pool index: {0}")]
    InvalidConstantIndex(u16),
    #[error("Unknown method handle reference kind: {0}")]
    UnknownReferenceKind(u8),
    #[error("{0} constant pool entries reference each other and cannot be resolved")]
    UnresolvableConstantPool(usize),
    #[error("Unknown element value tag: {0:?}")]
    UnknownElementValueTag(char),
    #[error("Malformed modified UTF-8 at byte {0}")]
    MalformedUtf8(usize),
    #[error("Element values nested deeper than {0} levels")]
    ElementValueTooDeep(usize),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl From<io::Error> for ClassFileError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => ClassFileError::TruncatedInput,
            _ => ClassFileError::IOError(e),
        }
    }
}
