// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.3
// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.9.1

mod descriptor;
mod error;
mod parser;
mod signature;

pub use descriptor::{BaseType, FieldDescriptor, FieldType, MethodDescriptor};
pub use error::SignatureError;
pub use parser::Parser;
pub use signature::{
    ClassSignature, ClassType, FieldSignature, MethodSignature, SimpleClassType, TypeArgument,
    TypeParameter, TypeTree,
};

pub type Result<T, E = SignatureError> = std::result::Result<T, E>;

/// The root of every class hierarchy, used wherever a raw reference needs a default binding.
pub const OBJECT_CLASS: &str = "java/lang/Object";
