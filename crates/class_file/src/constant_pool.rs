use std::convert::TryFrom;

use classlens_signature::{FieldType, MethodDescriptor};
use log::debug;

use crate::{ClassFileError, Result};

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.4-210
pub(crate) mod tag {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

/// Extracts the payload of a constant of the given kind or fails with `ConstantKindMismatch`.
macro_rules! matches_cp_info {
    ($constant:expr, $index:expr, $kind:ident) => {
        match $constant {
            $crate::constant_pool::Constant::$kind(n) => Ok(n),
            c => Err($crate::ClassFileError::ConstantKindMismatch {
                index: $index,
                expected: stringify!($kind),
                found: c.kind(),
            }),
        }
    };
}

/// A fully resolved constant pool entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ClassConstant),
    String(String),
    FieldRef(MemberRef),
    MethodRef(MemberRef),
    InterfaceMethodRef(MemberRef),
    NameAndType(NameAndType),
    MethodHandle(MethodHandle),
    MethodType(String),
    Dynamic(DynamicConstant),
    InvokeDynamic(DynamicConstant),
    Module(String),
    Package(String),
}
impl Constant {
    pub fn kind(&self) -> &'static str {
        match self {
            Constant::Utf8(_) => "Utf8",
            Constant::Integer(_) => "Integer",
            Constant::Float(_) => "Float",
            Constant::Long(_) => "Long",
            Constant::Double(_) => "Double",
            Constant::Class(_) => "Class",
            Constant::String(_) => "String",
            Constant::FieldRef(_) => "FieldRef",
            Constant::MethodRef(_) => "MethodRef",
            Constant::InterfaceMethodRef(_) => "InterfaceMethodRef",
            Constant::NameAndType(_) => "NameAndType",
            Constant::MethodHandle(_) => "MethodHandle",
            Constant::MethodType(_) => "MethodType",
            Constant::Dynamic(_) => "Dynamic",
            Constant::InvokeDynamic(_) => "InvokeDynamic",
            Constant::Module(_) => "Module",
            Constant::Package(_) => "Package",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassConstant {
    // A binary class or interface name in internal form, or an array type descriptor.
    pub name: String,
}
impl ClassConstant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_array(&self) -> bool {
        self.name.starts_with('[')
    }

    pub fn array_dimensions(&self) -> usize {
        self.name.chars().take_while(|c| *c == '[').count()
    }

    pub fn is_array_of_primitives(&self) -> bool {
        self.is_array() && !self.name.trim_start_matches('[').starts_with('L')
    }

    pub fn is_array_of_objects(&self) -> bool {
        self.is_array() && self.name.trim_start_matches('[').starts_with('L')
    }

    /// The class this constant ultimately refers to; `None` for arrays of primitives.
    pub fn reference_class(&self) -> Option<&str> {
        if !self.is_array() {
            return Some(self.name.as_str());
        }

        self.name
            .trim_start_matches('[')
            .strip_prefix('L')
            .and_then(|n| n.strip_suffix(';'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameAndType {
    pub name: String,
    pub descriptor: String,
}
impl NameAndType {
    pub fn method_descriptor(&self) -> Result<MethodDescriptor> {
        Ok(self.descriptor.parse()?)
    }

    pub fn field_type(&self) -> Result<FieldType> {
        Ok(self.descriptor.parse()?)
    }
}

/// The shared shape of `FieldRef`, `MethodRef` and `InterfaceMethodRef`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub class: ClassConstant,
    pub name_and_type: NameAndType,
}
impl MemberRef {
    pub fn class_name(&self) -> &str {
        &self.class.name
    }

    pub fn name(&self) -> &str {
        &self.name_and_type.name
    }

    pub fn descriptor(&self) -> &str {
        &self.name_and_type.descriptor
    }
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-5.html#jvms-5.4.3.5-220
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    GetField = 1,
    GetStatic = 2,
    PutField = 3,
    PutStatic = 4,
    InvokeVirtual = 5,
    InvokeStatic = 6,
    InvokeSpecial = 7,
    NewInvokeSpecial = 8,
    InvokeInterface = 9,
}
impl TryFrom<u8> for ReferenceKind {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(ReferenceKind::GetField),
            2 => Ok(ReferenceKind::GetStatic),
            3 => Ok(ReferenceKind::PutField),
            4 => Ok(ReferenceKind::PutStatic),
            5 => Ok(ReferenceKind::InvokeVirtual),
            6 => Ok(ReferenceKind::InvokeStatic),
            7 => Ok(ReferenceKind::InvokeSpecial),
            8 => Ok(ReferenceKind::NewInvokeSpecial),
            9 => Ok(ReferenceKind::InvokeInterface),
            _ => Err(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandleReference {
    Field(MemberRef),
    Method(MemberRef),
    InterfaceMethod(MemberRef),
}
impl HandleReference {
    pub fn member(&self) -> &MemberRef {
        match self {
            HandleReference::Field(m)
            | HandleReference::Method(m)
            | HandleReference::InterfaceMethod(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodHandle {
    pub kind: ReferenceKind,
    pub reference: HandleReference,
}
impl MethodHandle {
    /// The field or method name, depending on the reference kind.
    pub fn name(&self) -> &str {
        self.reference.member().name()
    }
}

/// Shared by `Dynamic` and `InvokeDynamic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DynamicConstant {
    /// Index into the `BootstrapMethods` attribute, not into the constant pool.
    pub bootstrap_method_attr_index: u16,
    pub name_and_type: NameAndType,
}

/// The index operands of an entry that references other pool slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawConstant {
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PoolSlot {
    /// Slot 0.
    Reserved,
    /// The slot following a `Long` or `Double`.
    Unusable,
    Resolved(Constant),
    Pending(RawConstant),
}

#[derive(Debug, Default)]
pub struct ConstantPool {
    // Index 0 and the second slot of 8-byte constants are `None`.
    entries: Vec<Option<Constant>>,
}
impl ConstantPool {
    /// Resolves every pending slot, repeating full passes until none is left.
    ///
    /// Entries may reference slots that appear later in the pool, so a single pass is
    /// not enough. A pass that makes no progress means the references form a cycle.
    pub(crate) fn resolve(mut slots: Vec<PoolSlot>, major_version: u16) -> Result<Self> {
        let mut passes = 0;
        loop {
            passes += 1;
            let mut resolved = 0;
            let mut pending = 0;

            for i in 0..slots.len() {
                let raw = match &slots[i] {
                    PoolSlot::Pending(raw) => *raw,
                    _ => continue,
                };

                match resolve_entry(&slots, raw, major_version)? {
                    Some(constant) => {
                        slots[i] = PoolSlot::Resolved(constant);
                        resolved += 1;
                    }
                    None => pending += 1,
                }
            }

            if pending == 0 {
                break;
            }
            if resolved == 0 {
                return Err(ClassFileError::UnresolvableConstantPool(pending));
            }
        }

        debug!(
            "Resolved {} constant pool slots in {} passes",
            slots.len(),
            passes
        );

        let entries = slots
            .into_iter()
            .map(|slot| match slot {
                PoolSlot::Resolved(constant) => Some(constant),
                _ => None,
            })
            .collect();

        Ok(Self { entries })
    }

    /// The constant pool count, i.e. one more than the highest valid index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    pub fn get(&self, index: u16) -> Result<&Constant> {
        self.entries
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(ClassFileError::InvalidConstantIndex(index))
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self.get(index)?, index, Utf8).map(String::as_str)
    }

    pub fn class(&self, index: u16) -> Result<&ClassConstant> {
        matches_cp_info!(self.get(index)?, index, Class)
    }

    /// Like [`ConstantPool::class`], but index 0 means "none".
    pub fn optional_class(&self, index: u16) -> Result<Option<&ClassConstant>> {
        match index {
            0 => Ok(None),
            _ => self.class(index).map(Some),
        }
    }

    /// Like [`ConstantPool::utf8`], but index 0 means "none".
    pub fn optional_utf8(&self, index: u16) -> Result<Option<&str>> {
        match index {
            0 => Ok(None),
            _ => self.utf8(index).map(Some),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<&NameAndType> {
        matches_cp_info!(self.get(index)?, index, NameAndType)
    }

    pub fn method_handle(&self, index: u16) -> Result<&MethodHandle> {
        matches_cp_info!(self.get(index)?, index, MethodHandle)
    }

    /// Every usable entry with its index.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_ref().map(|c| (i as u16, c)))
    }

    pub fn constant_classes(&self) -> Vec<&ClassConstant> {
        self.iter()
            .filter_map(|(_, c)| match c {
                Constant::Class(class) => Some(class),
                _ => None,
            })
            .collect()
    }

    pub fn field_descriptors(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|(_, c)| match c {
                Constant::FieldRef(field_ref) => Some(field_ref.descriptor()),
                _ => None,
            })
            .collect()
    }

    pub fn method_descriptors(&self) -> Vec<&str> {
        self.method_refs()
            .into_iter()
            .map(MemberRef::descriptor)
            .collect()
    }

    /// Method and interface method references.
    pub fn method_refs(&self) -> Vec<&MemberRef> {
        self.iter()
            .filter_map(|(_, c)| match c {
                Constant::MethodRef(m) | Constant::InterfaceMethodRef(m) => Some(m),
                _ => None,
            })
            .collect()
    }
}

/// Looks up a dependency; `Ok(None)` while it is still pending.
fn lookup(slots: &[PoolSlot], index: u16) -> Result<Option<&Constant>> {
    match slots.get(index as usize) {
        Some(PoolSlot::Resolved(constant)) => Ok(Some(constant)),
        Some(PoolSlot::Pending(_)) => Ok(None),
        _ => Err(ClassFileError::InvalidConstantIndex(index)),
    }
}

macro_rules! dependency {
    ($slots:expr, $index:expr) => {
        match lookup($slots, $index)? {
            Some(constant) => constant,
            None => return Ok(None),
        }
    };
}

fn resolve_utf8(slots: &[PoolSlot], index: u16) -> Result<Option<String>> {
    let constant = dependency!(slots, index);
    Ok(Some(matches_cp_info!(constant, index, Utf8)?.clone()))
}

fn resolve_member_ref(
    slots: &[PoolSlot],
    class_index: u16,
    name_and_type_index: u16,
) -> Result<Option<MemberRef>> {
    let class = dependency!(slots, class_index);
    let name_and_type = dependency!(slots, name_and_type_index);

    Ok(Some(MemberRef {
        class: matches_cp_info!(class, class_index, Class)?.clone(),
        name_and_type: matches_cp_info!(name_and_type, name_and_type_index, NameAndType)?.clone(),
    }))
}

fn resolve_method_handle(
    slots: &[PoolSlot],
    reference_kind: u8,
    reference_index: u16,
    major_version: u16,
) -> Result<Option<MethodHandle>> {
    use ReferenceKind::*;

    let kind = ReferenceKind::try_from(reference_kind)
        .map_err(ClassFileError::UnknownReferenceKind)?;
    let target = dependency!(slots, reference_index);

    let reference = match (kind, target) {
        (GetField | GetStatic | PutField | PutStatic, Constant::FieldRef(m)) => {
            HandleReference::Field(m.clone())
        }
        (InvokeVirtual | NewInvokeSpecial, Constant::MethodRef(m)) => {
            HandleReference::Method(m.clone())
        }
        (InvokeStatic | InvokeSpecial, Constant::MethodRef(m)) => HandleReference::Method(m.clone()),
        (InvokeStatic | InvokeSpecial, Constant::InterfaceMethodRef(m)) if major_version >= 52 => {
            HandleReference::InterfaceMethod(m.clone())
        }
        (InvokeInterface, Constant::InterfaceMethodRef(m)) => {
            HandleReference::InterfaceMethod(m.clone())
        }
        (kind, found) => {
            let expected = match kind {
                GetField | GetStatic | PutField | PutStatic => "FieldRef",
                InvokeVirtual | NewInvokeSpecial => "MethodRef",
                InvokeStatic | InvokeSpecial if major_version >= 52 => {
                    "MethodRef or InterfaceMethodRef"
                }
                InvokeStatic | InvokeSpecial => "MethodRef",
                InvokeInterface => "InterfaceMethodRef",
            };
            return Err(ClassFileError::ConstantKindMismatch {
                index: reference_index,
                expected,
                found: found.kind(),
            });
        }
    };

    Ok(Some(MethodHandle { kind, reference }))
}

fn resolve_entry(
    slots: &[PoolSlot],
    raw: RawConstant,
    major_version: u16,
) -> Result<Option<Constant>> {
    let constant = match raw {
        RawConstant::Class { name_index } => {
            resolve_utf8(slots, name_index)?.map(|name| Constant::Class(ClassConstant { name }))
        }
        RawConstant::String { string_index } => {
            resolve_utf8(slots, string_index)?.map(Constant::String)
        }
        RawConstant::MethodType { descriptor_index } => {
            resolve_utf8(slots, descriptor_index)?.map(Constant::MethodType)
        }
        RawConstant::Module { name_index } => resolve_utf8(slots, name_index)?.map(Constant::Module),
        RawConstant::Package { name_index } => {
            resolve_utf8(slots, name_index)?.map(Constant::Package)
        }
        RawConstant::NameAndType {
            name_index,
            descriptor_index,
        } => {
            let name = resolve_utf8(slots, name_index)?;
            let descriptor = resolve_utf8(slots, descriptor_index)?;
            name.zip(descriptor)
                .map(|(name, descriptor)| Constant::NameAndType(NameAndType { name, descriptor }))
        }
        RawConstant::FieldRef {
            class_index,
            name_and_type_index,
        } => resolve_member_ref(slots, class_index, name_and_type_index)?.map(Constant::FieldRef),
        RawConstant::MethodRef {
            class_index,
            name_and_type_index,
        } => resolve_member_ref(slots, class_index, name_and_type_index)?.map(Constant::MethodRef),
        RawConstant::InterfaceMethodRef {
            class_index,
            name_and_type_index,
        } => resolve_member_ref(slots, class_index, name_and_type_index)?
            .map(Constant::InterfaceMethodRef),
        RawConstant::MethodHandle {
            reference_kind,
            reference_index,
        } => resolve_method_handle(slots, reference_kind, reference_index, major_version)?
            .map(Constant::MethodHandle),
        RawConstant::Dynamic {
            bootstrap_method_attr_index,
            name_and_type_index,
        } => resolve_dynamic(slots, bootstrap_method_attr_index, name_and_type_index)?
            .map(Constant::Dynamic),
        RawConstant::InvokeDynamic {
            bootstrap_method_attr_index,
            name_and_type_index,
        } => resolve_dynamic(slots, bootstrap_method_attr_index, name_and_type_index)?
            .map(Constant::InvokeDynamic),
    };

    Ok(constant)
}

fn resolve_dynamic(
    slots: &[PoolSlot],
    bootstrap_method_attr_index: u16,
    name_and_type_index: u16,
) -> Result<Option<DynamicConstant>> {
    let name_and_type = dependency!(slots, name_and_type_index);

    Ok(Some(DynamicConstant {
        bootstrap_method_attr_index,
        name_and_type: matches_cp_info!(name_and_type, name_and_type_index, NameAndType)?.clone(),
    }))
}

#[cfg(test)]
mod resolve_tests {
    use super::*;

    fn utf8(s: &str) -> PoolSlot {
        PoolSlot::Resolved(Constant::Utf8(s.to_owned()))
    }

    #[test]
    fn it_should_resolve_forward_references() {
        // #1 FieldRef -> #2 Class, #3 NameAndType; #2 -> #4 Class name, ...
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Pending(RawConstant::FieldRef {
                class_index: 2,
                name_and_type_index: 3,
            }),
            PoolSlot::Pending(RawConstant::Class { name_index: 4 }),
            PoolSlot::Pending(RawConstant::NameAndType {
                name_index: 5,
                descriptor_index: 6,
            }),
            utf8("my/Point"),
            utf8("x"),
            utf8("I"),
        ];

        let pool = ConstantPool::resolve(slots, 52).unwrap();

        assert_eq!(
            &Constant::FieldRef(MemberRef {
                class: ClassConstant::new("my/Point"),
                name_and_type: NameAndType {
                    name: "x".into(),
                    descriptor: "I".into(),
                },
            }),
            pool.get(1).unwrap()
        );
        assert_eq!("my/Point", pool.class(2).unwrap().name());
    }

    #[test]
    fn it_should_resolve_a_method_handle_that_precedes_its_method_ref() {
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Pending(RawConstant::MethodHandle {
                reference_kind: 6,
                reference_index: 2,
            }),
            PoolSlot::Pending(RawConstant::MethodRef {
                class_index: 3,
                name_and_type_index: 4,
            }),
            PoolSlot::Pending(RawConstant::Class { name_index: 5 }),
            PoolSlot::Pending(RawConstant::NameAndType {
                name_index: 6,
                descriptor_index: 7,
            }),
            utf8("java/lang/Integer"),
            utf8("valueOf"),
            utf8("(I)Ljava/lang/Integer;"),
        ];

        let pool = ConstantPool::resolve(slots, 52).unwrap();
        let handle = pool.method_handle(1).unwrap();

        assert_eq!(ReferenceKind::InvokeStatic, handle.kind);
        assert_eq!("valueOf", handle.name());
        assert_eq!("java/lang/Integer", handle.reference.member().class_name());
    }

    #[test]
    fn it_should_reject_a_field_handle_to_a_method() {
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Pending(RawConstant::MethodHandle {
                reference_kind: 1,
                reference_index: 2,
            }),
            PoolSlot::Pending(RawConstant::MethodRef {
                class_index: 3,
                name_and_type_index: 4,
            }),
            PoolSlot::Pending(RawConstant::Class { name_index: 5 }),
            PoolSlot::Pending(RawConstant::NameAndType {
                name_index: 5,
                descriptor_index: 5,
            }),
            utf8("a"),
        ];

        assert!(matches!(
            ConstantPool::resolve(slots, 52),
            Err(ClassFileError::ConstantKindMismatch {
                index: 2,
                expected: "FieldRef",
                found: "MethodRef"
            })
        ));
    }

    #[test]
    fn it_should_only_accept_interface_methods_for_invoke_static_from_version_52() {
        let slots = |major| {
            let slots = vec![
                PoolSlot::Reserved,
                PoolSlot::Pending(RawConstant::MethodHandle {
                    reference_kind: 6,
                    reference_index: 2,
                }),
                PoolSlot::Pending(RawConstant::InterfaceMethodRef {
                    class_index: 3,
                    name_and_type_index: 4,
                }),
                PoolSlot::Pending(RawConstant::Class { name_index: 5 }),
                PoolSlot::Pending(RawConstant::NameAndType {
                    name_index: 5,
                    descriptor_index: 5,
                }),
                utf8("a"),
            ];
            ConstantPool::resolve(slots, major)
        };

        assert!(slots(52).is_ok());
        assert!(matches!(
            slots(51),
            Err(ClassFileError::ConstantKindMismatch {
                index: 2,
                expected: "MethodRef",
                found: "InterfaceMethodRef"
            })
        ));
    }

    fn handle_to(reference_kind: u8, reference: RawConstant) -> Result<ConstantPool> {
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Pending(RawConstant::MethodHandle {
                reference_kind,
                reference_index: 2,
            }),
            PoolSlot::Pending(reference),
            PoolSlot::Pending(RawConstant::Class { name_index: 5 }),
            PoolSlot::Pending(RawConstant::NameAndType {
                name_index: 5,
                descriptor_index: 5,
            }),
            utf8("a"),
        ];
        ConstantPool::resolve(slots, 52)
    }

    #[test]
    fn it_should_check_the_member_kind_of_method_handles() {
        let method_ref = RawConstant::MethodRef {
            class_index: 3,
            name_and_type_index: 4,
        };
        let interface_method_ref = RawConstant::InterfaceMethodRef {
            class_index: 3,
            name_and_type_index: 4,
        };
        let field_ref = RawConstant::FieldRef {
            class_index: 3,
            name_and_type_index: 4,
        };

        assert!(handle_to(5, method_ref).is_ok());
        assert!(matches!(
            handle_to(5, interface_method_ref),
            Err(ClassFileError::ConstantKindMismatch {
                index: 2,
                expected: "MethodRef",
                found: "InterfaceMethodRef"
            })
        ));
        assert!(handle_to(8, method_ref).is_ok());
        assert!(matches!(
            handle_to(8, field_ref),
            Err(ClassFileError::ConstantKindMismatch {
                index: 2,
                expected: "MethodRef",
                found: "FieldRef"
            })
        ));
        assert!(handle_to(9, interface_method_ref).is_ok());
        assert!(matches!(
            handle_to(9, method_ref),
            Err(ClassFileError::ConstantKindMismatch {
                index: 2,
                expected: "InterfaceMethodRef",
                found: "MethodRef"
            })
        ));
        assert!(matches!(
            handle_to(10, method_ref),
            Err(ClassFileError::UnknownReferenceKind(10))
        ));
    }

    #[test]
    fn it_should_resolve_dynamic_module_and_package_entries() {
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Pending(RawConstant::Dynamic {
                bootstrap_method_attr_index: 0,
                name_and_type_index: 3,
            }),
            PoolSlot::Pending(RawConstant::InvokeDynamic {
                bootstrap_method_attr_index: 1,
                name_and_type_index: 3,
            }),
            PoolSlot::Pending(RawConstant::NameAndType {
                name_index: 6,
                descriptor_index: 7,
            }),
            PoolSlot::Pending(RawConstant::Module { name_index: 8 }),
            PoolSlot::Pending(RawConstant::Package { name_index: 9 }),
            utf8("run"),
            utf8("()Ljava/lang/Runnable;"),
            utf8("java.base"),
            utf8("java/lang"),
        ];

        let pool = ConstantPool::resolve(slots, 55).unwrap();
        let name_and_type = NameAndType {
            name: "run".into(),
            descriptor: "()Ljava/lang/Runnable;".into(),
        };

        assert_eq!(
            &Constant::Dynamic(DynamicConstant {
                bootstrap_method_attr_index: 0,
                name_and_type: name_and_type.clone(),
            }),
            pool.get(1).unwrap()
        );
        assert_eq!(
            &Constant::InvokeDynamic(DynamicConstant {
                bootstrap_method_attr_index: 1,
                name_and_type,
            }),
            pool.get(2).unwrap()
        );
        assert_eq!(&Constant::Module("java.base".into()), pool.get(4).unwrap());
        assert_eq!(&Constant::Package("java/lang".into()), pool.get(5).unwrap());
    }

    #[test]
    fn it_should_reject_a_dynamic_entry_without_a_name_and_type() {
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Pending(RawConstant::Dynamic {
                bootstrap_method_attr_index: 0,
                name_and_type_index: 2,
            }),
            utf8("run"),
        ];

        assert!(matches!(
            ConstantPool::resolve(slots, 55),
            Err(ClassFileError::ConstantKindMismatch {
                index: 2,
                expected: "NameAndType",
                found: "Utf8"
            })
        ));
    }

    #[test]
    fn it_should_fail_on_self_referencing_entries() {
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Pending(RawConstant::FieldRef {
                class_index: 1,
                name_and_type_index: 1,
            }),
        ];

        assert!(matches!(
            ConstantPool::resolve(slots, 52),
            Err(ClassFileError::UnresolvableConstantPool(1))
        ));
    }

    #[test]
    fn it_should_fail_on_references_to_the_reserved_slot() {
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Pending(RawConstant::Class { name_index: 0 }),
        ];

        assert!(matches!(
            ConstantPool::resolve(slots, 52),
            Err(ClassFileError::InvalidConstantIndex(0))
        ));
    }

    #[test]
    fn it_should_reject_the_reserved_and_unusable_slots() {
        let slots = vec![
            PoolSlot::Reserved,
            PoolSlot::Resolved(Constant::Long(42)),
            PoolSlot::Unusable,
            utf8("after"),
        ];

        let pool = ConstantPool::resolve(slots, 52).unwrap();

        assert!(matches!(
            pool.get(0),
            Err(ClassFileError::InvalidConstantIndex(0))
        ));
        assert!(matches!(
            pool.get(2),
            Err(ClassFileError::InvalidConstantIndex(2))
        ));
        assert!(matches!(
            pool.get(4),
            Err(ClassFileError::InvalidConstantIndex(4))
        ));
        assert_eq!(&Constant::Long(42), pool.get(1).unwrap());
        assert_eq!("after", pool.utf8(3).unwrap());
    }

    #[test]
    fn it_should_report_the_kind_found_by_typed_lookups() {
        let pool = ConstantPool::resolve(vec![PoolSlot::Reserved, utf8("x")], 52).unwrap();

        assert!(matches!(
            pool.class(1),
            Err(ClassFileError::ConstantKindMismatch {
                index: 1,
                expected: "Class",
                found: "Utf8"
            })
        ));
    }
}

#[cfg(test)]
mod class_constant_tests {
    use super::*;

    #[test]
    fn it_should_find_the_element_class_of_an_array() {
        let class = ClassConstant::new("[[Ljava/lang/String;");

        assert!(class.is_array_of_objects());
        assert_eq!(2, class.array_dimensions());
        assert_eq!(Some("java/lang/String"), class.reference_class());
    }

    #[test]
    fn it_should_have_no_reference_class_for_primitive_arrays() {
        let class = ClassConstant::new("[I");

        assert!(class.is_array_of_primitives());
        assert_eq!(None, class.reference_class());
    }
}
