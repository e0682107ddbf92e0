use std::{fmt, str::FromStr};

use crate::{Parser, SignatureError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}
impl BaseType {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(BaseType::Byte),
            'C' => Some(BaseType::Char),
            'D' => Some(BaseType::Double),
            'F' => Some(BaseType::Float),
            'I' => Some(BaseType::Int),
            'J' => Some(BaseType::Long),
            'S' => Some(BaseType::Short),
            'Z' => Some(BaseType::Boolean),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    /// The Java source keyword for this type, e.g. `int` for `I`.
    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

/// A non-generic field type, as found in field and method descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    Object(String),
    Array(Box<FieldType>),
}
impl FieldType {
    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Base(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, FieldType::Object(_))
    }

    pub fn array_dimensions(&self) -> usize {
        match self {
            FieldType::Array(component) => 1 + component.array_dimensions(),
            _ => 0,
        }
    }

    /// The innermost component type of an array, or the type itself.
    pub fn element_type(&self) -> &FieldType {
        match self {
            FieldType::Array(component) => component.element_type(),
            t => t,
        }
    }

    pub fn is_array_of_primitives(&self) -> bool {
        self.is_array() && self.element_type().is_primitive()
    }

    pub fn is_array_of_objects(&self) -> bool {
        self.is_array() && self.element_type().is_object()
    }

    pub fn primitive_type(&self) -> Option<BaseType> {
        match self.element_type() {
            FieldType::Base(base_type) => Some(*base_type),
            _ => None,
        }
    }

    /// The internal class name referenced by this type, looking through arrays.
    pub fn reference_class(&self) -> Option<&str> {
        match self.element_type() {
            FieldType::Object(class_name) => Some(class_name),
            _ => None,
        }
    }
}
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base_type) => write!(f, "{}", base_type.code()),
            FieldType::Object(class_name) => write!(f, "L{};", class_name),
            FieldType::Array(component) => write!(f, "[{}", component),
        }
    }
}
impl FromStr for FieldType {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse_field_descriptor()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor(pub FieldType);
impl FieldDescriptor {
    pub fn field_type(&self) -> &FieldType {
        &self.0
    }
}
impl FromStr for FieldDescriptor {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldDescriptor(s.parse()?))
    }
}
impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` for a `void` method.
    pub return_type: Option<FieldType>,
}
impl MethodDescriptor {
    pub fn is_void(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter(&self, i: usize) -> Option<&FieldType> {
        self.parameters.get(i)
    }
}
impl FromStr for MethodDescriptor {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse_method_descriptor()
    }
}
impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for parameter in &self.parameters {
            write!(f, "{}", parameter)?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(return_type) => write!(f, "{}", return_type),
            None => f.write_str("V"),
        }
    }
}

#[cfg(test)]
mod field_type_tests {
    use super::*;

    #[test]
    fn it_should_count_array_dimensions() {
        let field_type: FieldType = "[[I".parse().unwrap();

        assert_eq!(2, field_type.array_dimensions());
        assert!(field_type.is_array_of_primitives());
        assert_eq!(Some(BaseType::Int), field_type.primitive_type());
    }

    #[test]
    fn it_should_find_the_reference_class_of_an_object_array() {
        let field_type: FieldType = "[Ljava/lang/String;".parse().unwrap();

        assert!(field_type.is_array_of_objects());
        assert_eq!(Some("java/lang/String"), field_type.reference_class());
        assert_eq!(None, field_type.primitive_type());
    }

    #[test]
    fn it_should_accept_the_maximum_array_dimensions() {
        let descriptor = format!("{}I", "[".repeat(255));
        let field_type: FieldType = descriptor.parse().unwrap();

        assert_eq!(255, field_type.array_dimensions());
        assert_eq!(Some(BaseType::Int), field_type.primitive_type());
    }

    #[test]
    fn it_should_reject_too_many_array_dimensions() {
        for dimensions in [256, 60_000] {
            let descriptor = format!("{}I", "[".repeat(dimensions));

            assert!(matches!(
                descriptor.parse::<FieldType>(),
                Err(SignatureError::TooManyDimensions { position: 0, .. })
            ));
        }
    }

    #[test]
    fn it_should_display_as_a_descriptor() {
        let descriptor = "[[Ljava/util/List;";

        assert_eq!(descriptor, descriptor.parse::<FieldType>().unwrap().to_string());
    }
}
