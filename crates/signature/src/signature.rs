use std::{fmt, str::FromStr};

use crate::{BaseType, Parser, SignatureError, OBJECT_CLASS};

/// A generic-aware Java type as it appears in a `Signature` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTree {
    Primitive(BaseType),
    Array(Box<TypeTree>),
    Class(ClassType),
    TypeVariable(String),
}
impl TypeTree {
    /// A raw reference to `java/lang/Object`.
    pub fn object() -> Self {
        TypeTree::Class(ClassType::raw(OBJECT_CLASS))
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            TypeTree::Class(class_type) => Some(class_type),
            _ => None,
        }
    }

    pub fn as_type_variable(&self) -> Option<&str> {
        match self {
            TypeTree::TypeVariable(identifier) => Some(identifier),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeTree::Primitive(_))
    }
}
impl fmt::Display for TypeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTree::Primitive(base_type) => write!(f, "{}", base_type.code()),
            TypeTree::Array(component) => write!(f, "[{}", component),
            TypeTree::Class(class_type) => class_type.fmt(f),
            TypeTree::TypeVariable(identifier) => write!(f, "T{};", identifier),
        }
    }
}
impl FromStr for TypeTree {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse_type_signature()
    }
}

/// One `Identifier<TypeArguments>` segment of a class type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleClassType {
    pub identifier: String,
    pub type_arguments: Vec<TypeArgument>,
}
impl fmt::Display for SimpleClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for type_argument in &self.type_arguments {
                write!(f, "{}", type_argument)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// `L` package simple-class-type { `.` simple-class-type } `;`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    /// The package prefix including its trailing `/`, empty for the default package.
    pub package: String,
    pub simple: SimpleClassType,
    /// Inner class segments, outermost first.
    pub suffixes: Vec<SimpleClassType>,
}
impl ClassType {
    /// An unparameterized reference to an internal class name such as `java/util/Map$Entry`.
    pub fn raw(class_name: &str) -> Self {
        let (package, identifier) = match class_name.rfind('/') {
            Some(i) => class_name.split_at(i + 1),
            None => ("", class_name),
        };

        ClassType {
            package: package.to_owned(),
            simple: SimpleClassType {
                identifier: identifier.to_owned(),
                type_arguments: Vec::new(),
            },
            suffixes: Vec::new(),
        }
    }

    /// The internal name of the referenced class with all type arguments discarded.
    pub fn erasure(&self) -> String {
        let mut name = format!("{}{}", self.package, self.simple.identifier);
        for suffix in &self.suffixes {
            name.push('$');
            name.push_str(&suffix.identifier);
        }
        name
    }

    /// The segment naming the referenced class itself.
    pub fn innermost(&self) -> &SimpleClassType {
        self.suffixes.last().unwrap_or(&self.simple)
    }

    pub fn simple_name(&self) -> &str {
        &self.innermost().identifier
    }

    /// The type arguments supplied to the referenced class.
    pub fn type_arguments(&self) -> &[TypeArgument] {
        &self.innermost().type_arguments
    }

    pub fn is_parameterized(&self) -> bool {
        std::iter::once(&self.simple)
            .chain(&self.suffixes)
            .any(|segment| !segment.type_arguments.is_empty())
    }

    /// All segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &SimpleClassType> {
        std::iter::once(&self.simple).chain(&self.suffixes)
    }
}
impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}{}", self.package, self.simple)?;
        for suffix in &self.suffixes {
            write!(f, ".{}", suffix)?;
        }
        f.write_str(";")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeArgument {
    /// `*`
    Any,
    /// `+` bound, i.e. `? extends`
    Extends(TypeTree),
    /// `-` bound, i.e. `? super`
    Super(TypeTree),
    Exact(TypeTree),
}
impl TypeArgument {
    pub fn is_wildcard(&self) -> bool {
        !matches!(self, TypeArgument::Exact(_))
    }

    pub fn is_extends_wildcard(&self) -> bool {
        matches!(self, TypeArgument::Extends(_))
    }

    pub fn is_super_wildcard(&self) -> bool {
        matches!(self, TypeArgument::Super(_))
    }

    /// The bounding type, absent for `*`.
    pub fn type_tree(&self) -> Option<&TypeTree> {
        match self {
            TypeArgument::Any => None,
            TypeArgument::Extends(t) | TypeArgument::Super(t) | TypeArgument::Exact(t) => Some(t),
        }
    }
}
impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeArgument::Any => f.write_str("*"),
            TypeArgument::Extends(t) => write!(f, "+{}", t),
            TypeArgument::Super(t) => write!(f, "-{}", t),
            TypeArgument::Exact(t) => t.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParameter {
    pub identifier: String,
    pub class_bound: Option<TypeTree>,
    pub interface_bounds: Vec<TypeTree>,
}
impl TypeParameter {
    /// The bound that determines the erasure of this type variable, if any.
    pub fn erasure_bound(&self) -> Option<&TypeTree> {
        self.class_bound
            .as_ref()
            .or_else(|| self.interface_bounds.first())
    }

    pub fn is_bounded(&self) -> bool {
        self.class_bound.is_some() || !self.interface_bounds.is_empty()
    }
}
impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.identifier)?;
        if let Some(class_bound) = &self.class_bound {
            write!(f, "{}", class_bound)?;
        }
        for interface_bound in &self.interface_bounds {
            write!(f, ":{}", interface_bound)?;
        }
        Ok(())
    }
}

fn write_type_parameters(f: &mut fmt::Formatter<'_>, type_parameters: &[TypeParameter]) -> fmt::Result {
    if type_parameters.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for type_parameter in type_parameters {
        write!(f, "{}", type_parameter)?;
    }
    f.write_str(">")
}

fn find_type_parameter<'a>(
    type_parameters: &'a [TypeParameter],
    identifier: &str,
) -> Option<&'a TypeParameter> {
    type_parameters
        .iter()
        .find(|type_parameter| type_parameter.identifier == identifier)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: ClassType,
    pub superinterfaces: Vec<ClassType>,
}
impl ClassSignature {
    pub fn type_parameter_count(&self) -> usize {
        self.type_parameters.len()
    }

    pub fn type_parameter(&self, i: usize) -> Option<&TypeParameter> {
        self.type_parameters.get(i)
    }

    pub fn type_parameter_named(&self, identifier: &str) -> Option<&TypeParameter> {
        find_type_parameter(&self.type_parameters, identifier)
    }

    pub fn superinterface_count(&self) -> usize {
        self.superinterfaces.len()
    }

    pub fn superinterface(&self, i: usize) -> Option<&ClassType> {
        self.superinterfaces.get(i)
    }

    /// The superclass followed by every superinterface.
    pub fn supertypes(&self) -> impl Iterator<Item = &ClassType> {
        std::iter::once(&self.superclass).chain(&self.superinterfaces)
    }
}
impl FromStr for ClassSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse_class_signature()
    }
}
impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        write!(f, "{}", self.superclass)?;
        for superinterface in &self.superinterfaces {
            write!(f, "{}", superinterface)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeTree>,
    /// `None` for a `void` method.
    pub return_type: Option<TypeTree>,
    /// Either class types or type variables.
    pub throws: Vec<TypeTree>,
}
impl MethodSignature {
    pub fn is_void(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter(&self, i: usize) -> Option<&TypeTree> {
        self.parameters.get(i)
    }

    pub fn return_type(&self) -> Option<&TypeTree> {
        self.return_type.as_ref()
    }

    pub fn type_parameter_count(&self) -> usize {
        self.type_parameters.len()
    }

    pub fn type_parameter(&self, i: usize) -> Option<&TypeParameter> {
        self.type_parameters.get(i)
    }

    pub fn type_parameter_named(&self, identifier: &str) -> Option<&TypeParameter> {
        find_type_parameter(&self.type_parameters, identifier)
    }

    pub fn throws_count(&self) -> usize {
        self.throws.len()
    }

    pub fn throws_signature(&self, i: usize) -> Option<&TypeTree> {
        self.throws.get(i)
    }
}
impl FromStr for MethodSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse_method_signature()
    }
}
impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        f.write_str("(")?;
        for parameter in &self.parameters {
            write!(f, "{}", parameter)?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(return_type) => write!(f, "{}", return_type)?,
            None => f.write_str("V")?,
        }
        for throws in &self.throws {
            write!(f, "^{}", throws)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSignature(pub TypeTree);
impl FieldSignature {
    pub fn type_tree(&self) -> &TypeTree {
        &self.0
    }
}
impl FromStr for FieldSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse_field_signature().map(FieldSignature)
    }
}
impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod class_type_tests {
    use super::*;

    #[test]
    fn it_should_split_a_raw_name_into_package_and_identifier() {
        let class_type = ClassType::raw("java/util/Map$Entry");

        assert_eq!("java/util/", class_type.package);
        assert_eq!("Map$Entry", class_type.simple_name());
        assert_eq!("java/util/Map$Entry", class_type.erasure());
        assert!(!class_type.is_parameterized());
    }

    #[test]
    fn it_should_join_inner_segments_with_a_dollar_sign() {
        let class_type = match "Ljava/util/Map<TK;TV;>.Entry<TK;TV;>;".parse().unwrap() {
            TypeTree::Class(class_type) => class_type,
            other => panic!("expected a class type, got {}", other),
        };

        assert_eq!("java/util/Map$Entry", class_type.erasure());
        assert_eq!("Entry", class_type.simple_name());
        assert_eq!(2, class_type.type_arguments().len());
    }

    #[test]
    fn it_should_handle_the_default_package() {
        let class_type = ClassType::raw("Box");

        assert_eq!("", class_type.package);
        assert_eq!("LBox;", class_type.to_string());
    }
}
