use std::io::Read;

use crate::{parser::Parser, ClassFileError, Constant, ConstantPool, Result};

// Arrays and annotations nested inside element values are followed at most this deep.
const MAX_ELEMENT_VALUE_DEPTH: usize = 255;

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.16
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// A field descriptor such as `Ljava/lang/Deprecated;`.
    pub type_descriptor: String,
    pub element_value_pairs: Vec<ElementValuePair>,
}
impl Annotation {
    /// The internal name of the annotation interface.
    pub fn class_name(&self) -> &str {
        self.type_descriptor
            .strip_prefix('L')
            .and_then(|n| n.strip_suffix(';'))
            .unwrap_or(&self.type_descriptor)
    }

    /// Accepts either an internal name (`a/b/C`) or a descriptor (`La/b/C;`).
    pub fn is_of_type(&self, class_name: &str) -> bool {
        self.type_descriptor == class_name || self.class_name() == class_name
    }

    /// Element names are compared ignoring ASCII case.
    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.element_value_pairs
            .iter()
            .find(|pair| pair.name.eq_ignore_ascii_case(name))
            .map(|pair| &pair.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementValuePair {
    pub name: String,
    pub value: ElementValue,
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.16.1
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// One of `B C D F I J S Z s`; strings are stored as `Constant::Utf8`.
    Const { tag: char, value: Constant },
    Enum { type_name: String, const_name: String },
    /// A return descriptor, e.g. `Ljava/lang/Object;` or `V`.
    Class(String),
    Annotation(Annotation),
    Array(Vec<ElementValue>),
}
impl ElementValue {
    pub fn as_const(&self) -> Option<&Constant> {
        match self {
            ElementValue::Const { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ElementValue::Const {
                tag: 's',
                value: Constant::Utf8(s),
            } => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ElementValue]> {
        match self {
            ElementValue::Array(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

pub(crate) fn find_annotation<'a>(
    annotations: &'a [Annotation],
    class_name: &str,
) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.is_of_type(class_name))
}

impl<R: Read> Parser<R> {
    /// `RuntimeVisibleAnnotations` and friends.
    pub(crate) fn parse_annotations(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<Annotation>> {
        let num_annotations = self.read_u16()?;
        (0..num_annotations)
            .map(|_| self.parse_annotation(constant_pool, 0))
            .collect()
    }

    /// `RuntimeVisibleParameterAnnotations`: one annotation list per parameter.
    pub(crate) fn parse_parameter_annotations(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<Vec<Annotation>>> {
        let num_parameters = self.read_u8()?;
        (0..num_parameters)
            .map(|_| self.parse_annotations(constant_pool))
            .collect()
    }

    fn parse_annotation(
        &mut self,
        constant_pool: &ConstantPool,
        depth: usize,
    ) -> Result<Annotation> {
        let type_descriptor = self.parse_utf8_ref(constant_pool)?;
        let num_element_value_pairs = self.read_u16()?;
        let element_value_pairs = (0..num_element_value_pairs)
            .map(|_| {
                Ok(ElementValuePair {
                    name: self.parse_utf8_ref(constant_pool)?,
                    value: self.parse_nested_element_value(constant_pool, depth)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Annotation {
            type_descriptor,
            element_value_pairs,
        })
    }

    pub(crate) fn parse_element_value(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<ElementValue> {
        self.parse_nested_element_value(constant_pool, 0)
    }

    fn parse_nested_element_value(
        &mut self,
        constant_pool: &ConstantPool,
        depth: usize,
    ) -> Result<ElementValue> {
        if depth >= MAX_ELEMENT_VALUE_DEPTH {
            return Err(ClassFileError::ElementValueTooDeep(MAX_ELEMENT_VALUE_DEPTH));
        }

        let tag = self.read_u8()? as char;
        let element_value = match tag {
            'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 's' => ElementValue::Const {
                tag,
                value: self.parse_constant_ref(constant_pool)?,
            },
            'e' => ElementValue::Enum {
                type_name: self.parse_utf8_ref(constant_pool)?,
                const_name: self.parse_utf8_ref(constant_pool)?,
            },
            'c' => ElementValue::Class(self.parse_utf8_ref(constant_pool)?),
            '@' => ElementValue::Annotation(self.parse_annotation(constant_pool, depth + 1)?),
            '[' => {
                let num_values = self.read_u16()?;
                let values = (0..num_values)
                    .map(|_| self.parse_nested_element_value(constant_pool, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                ElementValue::Array(values)
            }
            _ => return Err(ClassFileError::UnknownElementValueTag(tag)),
        };

        Ok(element_value)
    }
}
