use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use classlens_signature::{
    FieldSignature, FieldType, MethodDescriptor, MethodSignature, TypeParameter, TypeTree,
};

use crate::{
    attributes::{find_annotation, Annotation, Attributes, CodeAttribute, ElementValue},
    memoize, ClassFile, ClassFileError, Constant, ConstantPool, FieldAccessFlags,
    MethodAccessFlags, NameAndType, ParameterAccessFlags, Result, Visibility,
};

pub struct FieldInfo {
    access_flags: FieldAccessFlags,
    name: String,
    descriptor: String,
    attributes: Attributes,
    constant_pool: Arc<ConstantPool>,
    field_type: OnceLock<FieldType>,
    field_signature: OnceLock<Option<FieldSignature>>,
    annotations: OnceLock<Vec<Annotation>>,
}
impl FieldInfo {
    pub(crate) fn new(
        access_flags: FieldAccessFlags,
        name: String,
        descriptor: String,
        attributes: Attributes,
        constant_pool: Arc<ConstantPool>,
    ) -> Self {
        Self {
            access_flags,
            name,
            descriptor,
            attributes,
            constant_pool,
            field_type: OnceLock::new(),
            field_signature: OnceLock::new(),
            annotations: OnceLock::new(),
        }
    }

    pub fn access_flags(&self) -> FieldAccessFlags {
        self.access_flags
    }

    flag_predicates!(access_flags: FieldAccessFlags {
        is_public => PUBLIC,
        is_private => PRIVATE,
        is_protected => PROTECTED,
        is_static => STATIC,
        is_final => FINAL,
        is_volatile => VOLATILE,
        is_transient => TRANSIENT,
        is_synthetic => SYNTHETIC,
        is_enum => ENUM,
    });

    pub fn is_default_scope(&self) -> bool {
        self.access_flags.is_default_scope()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn field_type(&self) -> Result<&FieldType> {
        memoize(&self.field_type, || Ok(self.descriptor.parse()?))
    }

    pub fn signature(&self) -> Result<Option<String>> {
        self.attributes.signature(&self.constant_pool)
    }

    pub fn field_signature(&self) -> Result<Option<&FieldSignature>> {
        let field_signature = memoize(&self.field_signature, || {
            self.signature()?
                .map(|s| s.parse::<FieldSignature>())
                .transpose()
                .map_err(ClassFileError::from)
        })?;

        Ok(field_signature.as_ref())
    }

    /// The initial value of a `static final` field of primitive or `String` type.
    pub fn constant_value(&self) -> Result<Option<Constant>> {
        self.attributes
            .decode("ConstantValue", |p| p.parse_constant_ref(&self.constant_pool))
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
impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("access_flags", &self.access_flags)
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("attributes", &self.attributes)
            .finish()
    }
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.24
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    /// `None` for a formal parameter without a recorded name.
    pub name: Option<String>,
    pub access_flags: ParameterAccessFlags,
}

pub struct MethodInfo {
    access_flags: MethodAccessFlags,
    name: String,
    descriptor: String,
    attributes: Attributes,
    constant_pool: Arc<ConstantPool>,
    method_descriptor: OnceLock<MethodDescriptor>,
    generic_signature: OnceLock<Option<MethodSignature>>,
    erased_signature: OnceLock<MethodSignature>,
    code: OnceLock<Option<CodeAttribute>>,
    annotations: OnceLock<Vec<Annotation>>,
    parameter_annotations: OnceLock<Vec<Vec<Annotation>>>,
}
impl MethodInfo {
    pub(crate) fn new(
        access_flags: MethodAccessFlags,
        name: String,
        descriptor: String,
        attributes: Attributes,
        constant_pool: Arc<ConstantPool>,
    ) -> Self {
        Self {
            access_flags,
            name,
            descriptor,
            attributes,
            constant_pool,
            method_descriptor: OnceLock::new(),
            generic_signature: OnceLock::new(),
            erased_signature: OnceLock::new(),
            code: OnceLock::new(),
            annotations: OnceLock::new(),
            parameter_annotations: OnceLock::new(),
        }
    }

    pub fn access_flags(&self) -> MethodAccessFlags {
        self.access_flags
    }

    flag_predicates!(access_flags: MethodAccessFlags {
        is_public => PUBLIC,
        is_private => PRIVATE,
        is_protected => PROTECTED,
        is_static => STATIC,
        is_final => FINAL,
        is_synchronized => SYNCHRONIZED,
        is_bridge => BRIDGE,
        is_varargs => VARARGS,
        is_native => NATIVE,
        is_abstract => ABSTRACT,
        is_strict => STRICT,
        is_synthetic => SYNTHETIC,
    });

    pub fn is_default_scope(&self) -> bool {
        self.access_flags.is_default_scope()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_class_initializer(&self) -> bool {
        self.name == "<clinit>"
    }

    /// Whether this method has exactly the given name and descriptor.
    pub fn matches(&self, name_and_type: &NameAndType) -> bool {
        self.name == name_and_type.name && self.descriptor == name_and_type.descriptor
    }

    pub fn method_descriptor(&self) -> Result<&MethodDescriptor> {
        memoize(&self.method_descriptor, || Ok(self.descriptor.parse()?))
    }

    pub fn is_void(&self) -> Result<bool> {
        Ok(self.method_descriptor()?.is_void())
    }

    pub fn argument_count(&self) -> Result<usize> {
        Ok(self.method_descriptor()?.parameter_count())
    }

    pub fn argument_types(&self) -> Result<&[FieldType]> {
        Ok(self.method_descriptor()?.parameters.as_slice())
    }

    /// `None` for a `void` method.
    pub fn return_type(&self) -> Result<Option<&FieldType>> {
        Ok(self.method_descriptor()?.return_type.as_ref())
    }

    pub fn signature(&self) -> Result<Option<String>> {
        self.attributes.signature(&self.constant_pool)
    }

    /// The parsed `Signature` attribute, if the method has one.
    pub fn generic_signature(&self) -> Result<Option<&MethodSignature>> {
        let generic_signature = memoize(&self.generic_signature, || {
            self.signature()?
                .map(|s| s.parse::<MethodSignature>())
                .transpose()
                .map_err(ClassFileError::from)
        })?;

        Ok(generic_signature.as_ref())
    }

    /// The generic signature, or the descriptor read as a signature when there is none.
    pub fn method_signature(&self) -> Result<&MethodSignature> {
        match self.generic_signature()? {
            Some(generic_signature) => Ok(generic_signature),
            None => memoize(&self.erased_signature, || Ok(self.descriptor.parse()?)),
        }
    }

    pub fn type_parameters(&self) -> Result<&[TypeParameter]> {
        Ok(self.method_signature()?.type_parameters.as_slice())
    }

    pub fn throws_signatures(&self) -> Result<&[TypeTree]> {
        Ok(self.method_signature()?.throws.as_slice())
    }

    /// The checked exceptions listed in the `Exceptions` attribute.
    pub fn exceptions(&self) -> Result<Vec<String>> {
        Ok(self
            .attributes
            .decode("Exceptions", |p| p.parse_class_refs(&self.constant_pool))?
            .unwrap_or_default())
    }

    pub fn parameters(&self) -> Result<Option<Vec<MethodParameter>>> {
        self.attributes.decode("MethodParameters", |p| {
            let parameters_count = p.read_u8()?;
            (0..parameters_count)
                .map(|_| {
                    let name = self
                        .constant_pool
                        .optional_utf8(p.read_u16()?)?
                        .map(str::to_owned);
                    let access_flags = ParameterAccessFlags::from_bits_truncate(p.read_u16()?);
                    Ok(MethodParameter { name, access_flags })
                })
                .collect()
        })
    }

    /// One name per argument, `arg<i>` wherever `MethodParameters` does not supply one.
    pub fn parameter_names(&self) -> Result<Vec<String>> {
        let parameters = self.parameters()?.unwrap_or_default();

        Ok((0..self.argument_count()?)
            .map(|i| {
                parameters
                    .get(i)
                    .and_then(|p| p.name.clone())
                    .unwrap_or_else(|| format!("arg{}", i))
            })
            .collect())
    }

    pub fn code(&self) -> Result<Option<&CodeAttribute>> {
        let code = memoize(&self.code, || {
            self.attributes
                .decode("Code", |p| p.parse_code_attribute(&self.constant_pool))
        })?;

        Ok(code.as_ref())
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

    /// One annotation list per parameter, empty when the attribute is absent.
    pub fn parameter_annotations(&self) -> Result<&[Vec<Annotation>]> {
        let parameter_annotations = memoize(&self.parameter_annotations, || {
            Ok(self
                .attributes
                .decode("RuntimeVisibleParameterAnnotations", |p| {
                    p.parse_parameter_annotations(&self.constant_pool)
                })?
                .unwrap_or_default())
        })?;

        Ok(parameter_annotations.as_slice())
    }

    /// The default value of an annotation interface element.
    pub fn annotation_default(&self) -> Result<Option<ElementValue>> {
        self.attributes.decode("AnnotationDefault", |p| {
            p.parse_element_value(&self.constant_pool)
        })
    }

    /// Looks `variable` up among this method's bounded type parameters, then among those of
    /// `class_file`. Accepts both `T` and `TT;`.
    pub fn resolve_type_variable<'a>(
        &'a self,
        class_file: &'a ClassFile,
        variable: &str,
    ) -> Result<&'a TypeParameter> {
        let identifier = type_variable_identifier(variable);

        if let Some(type_parameter) = self
            .method_signature()?
            .type_parameter_named(identifier)
            .filter(|t| t.is_bounded())
        {
            return Ok(type_parameter);
        }

        class_file.resolve_type_variable(identifier)
    }
}
impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("access_flags", &self.access_flags)
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Strips the `T` and `;` of a type variable signature, leaving plain identifiers alone.
pub(crate) fn type_variable_identifier(variable: &str) -> &str {
    variable
        .strip_prefix('T')
        .and_then(|v| v.strip_suffix(';'))
        .unwrap_or(variable)
}
