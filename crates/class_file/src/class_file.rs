use std::{
    fmt,
    io::Read,
    sync::{Arc, OnceLock},
};

use classlens_signature::{ClassSignature, ClassType, TypeParameter};

use crate::{
    attributes::{
        find_annotation, Annotation, Attributes, BootstrapMethod, EnclosingMethod, InnerClass,
    },
    members::type_variable_identifier,
    memoize,
    overrides::DeclaredMethod,
    parser::Parser,
    ClassAccessFlags, ClassConstant, ClassFileError, ConstantPool, FieldInfo, MethodInfo,
    NameAndType, Result, Visibility,
};

const ENUM_CLASS: &str = "java/lang/Enum";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

pub struct ClassFile {
    pub(crate) major_version: u16,
    pub(crate) minor_version: u16,
    pub(crate) constant_pool: Arc<ConstantPool>,
    pub(crate) access_flags: ClassAccessFlags,
    pub(crate) this_class: ClassConstant,
    pub(crate) super_class: Option<ClassConstant>,
    pub(crate) interfaces: Vec<ClassConstant>,
    pub(crate) fields: Vec<FieldInfo>,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) attributes: Attributes,
    pub(crate) class_signature: OnceLock<Option<ClassSignature>>,
    pub(crate) annotations: OnceLock<Vec<Annotation>>,
}
impl ClassFile {
    pub fn parse(bytes: impl Read) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    flag_predicates!(access_flags: ClassAccessFlags {
        is_public => PUBLIC,
        is_private => PRIVATE,
        is_protected => PROTECTED,
        is_static => STATIC,
        is_final => FINAL,
        is_super => SUPER,
        is_interface => INTERFACE,
        is_abstract => ABSTRACT,
        is_synthetic => SYNTHETIC,
        is_annotation => ANNOTATION,
        is_enum => ENUM,
    });

    pub fn is_default_scope(&self) -> bool {
        self.access_flags.is_default_scope()
    }

    pub fn kind(&self) -> ClassKind {
        if self.is_interface() {
            ClassKind::Interface
        } else if self.super_class() == Some(ENUM_CLASS) {
            ClassKind::Enum
        } else {
            ClassKind::Class
        }
    }

    pub fn this_class(&self) -> &ClassConstant {
        &self.this_class
    }

    pub fn class_name(&self) -> &str {
        &self.this_class.name
    }

    /// `None` only for `java/lang/Object`.
    pub fn super_class(&self) -> Option<&str> {
        self.super_class.as_ref().map(ClassConstant::name)
    }

    pub fn interfaces(&self) -> &[ClassConstant] {
        &self.interfaces
    }

    pub fn interface_names(&self) -> Vec<&str> {
        self.interfaces.iter().map(ClassConstant::name).collect()
    }

    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodInfo> {
        self.methods.iter().filter(move |m| m.name() == name)
    }

    pub fn method_count(&self, name: &str) -> usize {
        self.methods_named(name).count()
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.iter().filter(|m| m.is_constructor())
    }

    pub fn class_initializer(&self) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.is_class_initializer())
    }

    /// Every method except constructors and the class initializer.
    pub fn non_initializer_methods(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods
            .iter()
            .filter(|m| !m.is_constructor() && !m.is_class_initializer())
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.descriptor() == descriptor)
    }

    pub fn find_method(&self, name_and_type: &NameAndType) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.matches(name_and_type))
    }

    /// Pairs each method with this class so it can take part in override matching.
    pub fn declared_methods(&self) -> impl Iterator<Item = DeclaredMethod<'_>> {
        self.methods.iter().map(move |method| DeclaredMethod {
            class_file: self,
            method,
        })
    }

    pub fn declared_method(&self, name: &str, descriptor: &str) -> Option<DeclaredMethod<'_>> {
        self.method(name, descriptor).map(|method| DeclaredMethod {
            class_file: self,
            method,
        })
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn source_file(&self) -> Result<Option<String>> {
        self.attributes
            .decode("SourceFile", |p| p.parse_utf8_ref(&self.constant_pool))
    }

    pub fn signature(&self) -> Result<Option<String>> {
        self.attributes.signature(&self.constant_pool)
    }

    /// The type parameter declaration of the signature, e.g. `<T:Ljava/lang/Object;>`.
    /// Empty for a class that declares none.
    pub fn this_signature(&self) -> Result<Option<String>> {
        Ok(self
            .signature()?
            .map(|s| split_class_signature(&s).0.to_owned()))
    }

    /// The superclass and superinterface part of the signature.
    pub fn super_signature(&self) -> Result<Option<String>> {
        Ok(self
            .signature()?
            .map(|s| split_class_signature(&s).1.to_owned()))
    }

    pub fn class_signature(&self) -> Result<Option<&ClassSignature>> {
        let class_signature = memoize(&self.class_signature, || {
            self.signature()?
                .map(|s| s.parse::<ClassSignature>())
                .transpose()
                .map_err(ClassFileError::from)
        })?;

        Ok(class_signature.as_ref())
    }

    /// The superclass followed by the superinterfaces, with type arguments where the class
    /// has a `Signature` attribute and as raw types otherwise.
    pub fn generic_supertypes(&self) -> Result<Vec<ClassType>> {
        if let Some(class_signature) = self.class_signature()? {
            return Ok(class_signature.supertypes().cloned().collect());
        }

        Ok(self
            .super_class()
            .into_iter()
            .chain(self.interfaces.iter().map(ClassConstant::name))
            .map(ClassType::raw)
            .collect())
    }

    /// The class bound and interface bounds of a type parameter declared by this class.
    /// Accepts both `T` and `TT;`.
    pub fn resolve_type_variable(&self, variable: &str) -> Result<&TypeParameter> {
        let identifier = type_variable_identifier(variable);

        self.class_signature()?
            .and_then(|s| s.type_parameter_named(identifier))
            .ok_or_else(|| ClassFileError::UnresolvedTypeVariable {
                owner: self.class_name().to_owned(),
                variable: identifier.to_owned(),
            })
    }

    pub fn nest_host(&self) -> Result<Option<String>> {
        self.attributes
            .decode("NestHost", |p| p.parse_class_ref(&self.constant_pool))
    }

    pub fn nest_members(&self) -> Result<Option<Vec<String>>> {
        self.attributes
            .decode("NestMembers", |p| p.parse_class_refs(&self.constant_pool))
    }

    pub fn inner_classes(&self) -> Result<Option<Vec<InnerClass>>> {
        self.attributes
            .decode("InnerClasses", |p| p.parse_inner_classes(&self.constant_pool))
    }

    pub fn enclosing_method(&self) -> Result<Option<EnclosingMethod>> {
        self.attributes.decode("EnclosingMethod", |p| {
            p.parse_enclosing_method(&self.constant_pool)
        })
    }

    pub fn bootstrap_methods(&self) -> Result<Option<Vec<BootstrapMethod>>> {
        self.attributes.decode("BootstrapMethods", |p| {
            p.parse_bootstrap_methods(&self.constant_pool)
        })
    }

    pub fn annotations(&self) -> Result<&[Annotation]> {
        let annotations = memoize(&self.annotations, || {
            self.attributes
                .runtime_visible_annotations(&self.constant_pool)
        })?;

        Ok(annotations.as_slice())
    }

    pub fn annotation(&self, class_name: &str) -> Result<Option<&Annotation>> {
        Ok(find_annotation(self.annotations()?, class_name))
    }
}
impl fmt::Debug for ClassFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassFile")
            .field("version", &(self.major_version, self.minor_version))
            .field("access_flags", &self.access_flags)
            .field("this_class", &self.this_class.name)
            .field("super_class", &self.super_class())
            .field("interfaces", &self.interface_names())
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Splits a class signature at the first character outside of angle brackets.
///
/// Searching for the first `<` instead would cut `Ljava/util/ArrayList<TE;>;` in half for a
/// class that declares no type parameters of its own.
fn split_class_signature(signature: &str) -> (&str, &str) {
    let mut depth = 0usize;
    for (i, c) in signature.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => return signature.split_at(i),
            _ => {}
        }
    }
    (signature, "")
}
