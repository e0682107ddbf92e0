use std::io::{Cursor, Read};

use crate::{
    parser::Parser, Attribute, ClassAccessFlags, Constant, ConstantPool, MethodHandle,
    NameAndType, Result,
};

mod annotations;
mod code;

pub use annotations::{Annotation, ElementValue, ElementValuePair};
pub use code::{CodeAttribute, ExceptionTableEntry, LineNumber, LocalVariable};

pub(crate) use annotations::find_annotation;

#[derive(Debug, Default)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the payload of the attribute called `name`, or returns `None` if there is none.
    pub(crate) fn decode<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Parser<Cursor<&[u8]>>) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.find_by_name(name) {
            Some(attribute) => f(&mut Parser::new(Cursor::new(&attribute.info[..]))).map(Some),
            None => Ok(None),
        }
    }

    /// The raw text of the `Signature` attribute.
    pub(crate) fn signature(&self, constant_pool: &ConstantPool) -> Result<Option<String>> {
        self.decode("Signature", |p| p.parse_utf8_ref(constant_pool))
    }

    /// `RuntimeVisibleAnnotations`, empty when the attribute is absent.
    pub(crate) fn runtime_visible_annotations(
        &self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<Annotation>> {
        Ok(self
            .decode("RuntimeVisibleAnnotations", |p| {
                p.parse_annotations(constant_pool)
            })?
            .unwrap_or_default())
    }
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.6
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub inner_class: String,
    /// `None` for top-level, local and anonymous classes.
    pub outer_class: Option<String>,
    /// `None` for anonymous classes.
    pub inner_name: Option<String>,
    pub access_flags: ClassAccessFlags,
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.7
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingMethod {
    pub class: String,
    /// `None` when the class is not immediately enclosed by a method or constructor.
    pub method: Option<NameAndType>,
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.23
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapMethod {
    pub method_handle: MethodHandle,
    pub arguments: Vec<Constant>,
}

impl<R: Read> Parser<R> {
    pub(crate) fn parse_utf8_ref(&mut self, constant_pool: &ConstantPool) -> Result<String> {
        Ok(constant_pool.utf8(self.read_u16()?)?.to_owned())
    }

    pub(crate) fn parse_class_ref(&mut self, constant_pool: &ConstantPool) -> Result<String> {
        Ok(constant_pool.class(self.read_u16()?)?.name.clone())
    }

    /// A `u2` count followed by that many class indices, as in `Exceptions` and `NestMembers`.
    pub(crate) fn parse_class_refs(&mut self, constant_pool: &ConstantPool) -> Result<Vec<String>> {
        let count = self.read_u16()?;
        (0..count)
            .map(|_| self.parse_class_ref(constant_pool))
            .collect()
    }

    pub(crate) fn parse_constant_ref(&mut self, constant_pool: &ConstantPool) -> Result<Constant> {
        Ok(constant_pool.get(self.read_u16()?)?.clone())
    }

    pub(crate) fn parse_inner_classes(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<InnerClass>> {
        let number_of_classes = self.read_u16()?;
        (0..number_of_classes)
            .map(|_| {
                let inner_class = self.parse_class_ref(constant_pool)?;
                let outer_class = constant_pool
                    .optional_class(self.read_u16()?)?
                    .map(|c| c.name.clone());
                let inner_name = constant_pool
                    .optional_utf8(self.read_u16()?)?
                    .map(str::to_owned);
                let access_flags = ClassAccessFlags::from_bits_truncate(self.read_u16()?);

                Ok(InnerClass {
                    inner_class,
                    outer_class,
                    inner_name,
                    access_flags,
                })
            })
            .collect()
    }

    pub(crate) fn parse_enclosing_method(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<EnclosingMethod> {
        let class = self.parse_class_ref(constant_pool)?;
        let method = match self.read_u16()? {
            0 => None,
            index => Some(constant_pool.name_and_type(index)?.clone()),
        };

        Ok(EnclosingMethod { class, method })
    }

    pub(crate) fn parse_bootstrap_methods(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<Vec<BootstrapMethod>> {
        let num_bootstrap_methods = self.read_u16()?;
        (0..num_bootstrap_methods)
            .map(|_| {
                let method_handle = constant_pool.method_handle(self.read_u16()?)?.clone();
                let num_bootstrap_arguments = self.read_u16()?;
                let arguments = (0..num_bootstrap_arguments)
                    .map(|_| self.parse_constant_ref(constant_pool))
                    .collect::<Result<Vec<_>>>()?;

                Ok(BootstrapMethod {
                    method_handle,
                    arguments,
                })
            })
            .collect()
    }
}
