// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

#[macro_use]
mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
mod constant_pool;
mod error;
mod members;
mod overrides;
mod parser;

use std::{fmt, sync::OnceLock};

pub use self::class_file::{ClassFile, ClassKind};
pub use access_flags::{
    ClassAccessFlags, FieldAccessFlags, MethodAccessFlags, ParameterAccessFlags, Visibility,
};
pub use classlens_signature as signature;
pub use constant_pool::{
    ClassConstant, Constant, ConstantPool, DynamicConstant, HandleReference, MemberRef,
    MethodHandle, NameAndType, ReferenceKind,
};
pub use error::ClassFileError;
pub use members::{FieldInfo, MethodInfo, MethodParameter};
pub use overrides::{ClassResolver, DeclaredMethod, NoResolver, SubstitutionMap};
pub use parser::Parser;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

/// Decodes a complete class file held in memory.
pub fn decode(bytes: &[u8]) -> Result<ClassFile> {
    Parser::new(bytes).parse()
}

pub struct Attribute {
    pub name: String,
    pub info: Vec<u8>,
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}

/// Returns the memoized value of `cell`, computing it on first access.
///
/// A failed computation leaves the cell empty so the error is reported again next time.
pub(crate) fn memoize<T>(cell: &OnceLock<T>, f: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }

    let value = f()?;
    Ok(cell.get_or_init(|| value))
}
