use bitflags::bitflags;

bitflags! {
    // https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.1-200-E.1
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    // https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.5-200-A.1
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    // https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.6-200-A.1
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    // https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.24
    pub struct ParameterAccessFlags: u16 {
        const FINAL = 0x0010;
        const SYNTHETIC = 0x1000;
        const MANDATED = 0x8000;
    }
}

/// Expands to `pub fn is_xxx(&self) -> bool` methods testing single flags of `self.$field`.
macro_rules! flag_predicates {
    ($field:ident: $flags:ty { $($name:ident => $flag:ident),* $(,)? }) => {
        $(
            pub fn $name(&self) -> bool {
                self.$field.contains(<$flags>::$flag)
            }
        )*
    };
}

/// Visibility predicates shared by classes, fields and methods.
pub trait Visibility {
    fn is_public(&self) -> bool;
    fn is_protected(&self) -> bool;
    fn is_private(&self) -> bool;

    /// Package visibility: none of public, protected or private is set.
    fn is_default_scope(&self) -> bool {
        !(self.is_public() || self.is_protected() || self.is_private())
    }
}

macro_rules! impl_visibility {
    ($($flags:ty),*) => {
        $(
            impl Visibility for $flags {
                fn is_public(&self) -> bool {
                    self.contains(<$flags>::PUBLIC)
                }

                fn is_protected(&self) -> bool {
                    self.contains(<$flags>::PROTECTED)
                }

                fn is_private(&self) -> bool {
                    self.contains(<$flags>::PRIVATE)
                }
            }
        )*
    };
}

impl_visibility!(ClassAccessFlags, FieldAccessFlags, MethodAccessFlags);
