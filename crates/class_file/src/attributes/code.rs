use std::{
    fmt,
    io::Read,
    sync::{Arc, OnceLock},
};

use crate::{memoize, parser::Parser, Constant, ConstantPool, Result};

use super::Attributes;

const ALOAD_0: u8 = 0x2a;
const INVOKESPECIAL: u8 = 0xb7;
const RETURN: u8 = 0xb1;

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.3
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
    constant_pool: Arc<ConstantPool>,
    line_numbers: OnceLock<Option<Vec<LineNumber>>>,
    local_variables: OnceLock<Option<Vec<LocalVariable>>>,
}
impl CodeAttribute {
    pub fn line_numbers(&self) -> Result<Option<&[LineNumber]>> {
        let line_numbers = memoize(&self.line_numbers, || {
            self.attributes.decode("LineNumberTable", |p| p.parse_line_numbers())
        })?;

        Ok(line_numbers.as_deref())
    }

    pub fn first_line_number(&self) -> Result<Option<u16>> {
        Ok(self
            .line_numbers()?
            .and_then(|lines| lines.iter().map(|l| l.line_number).min()))
    }

    pub fn last_line_number(&self) -> Result<Option<u16>> {
        Ok(self
            .line_numbers()?
            .and_then(|lines| lines.iter().map(|l| l.line_number).max()))
    }

    pub fn local_variables(&self) -> Result<Option<&[LocalVariable]>> {
        let local_variables = memoize(&self.local_variables, || {
            self.attributes.decode("LocalVariableTable", |p| {
                p.parse_local_variables(&self.constant_pool)
            })
        })?;

        Ok(local_variables.as_deref())
    }

    /// The first variable declared in the local variable slot `index`.
    pub fn local_variable(&self, index: u16) -> Result<Option<&LocalVariable>> {
        Ok(self
            .local_variables()?
            .and_then(|variables| variables.iter().find(|v| v.index == index)))
    }

    pub fn local_variable_named(&self, name: &str) -> Result<Option<&LocalVariable>> {
        Ok(self
            .local_variables()?
            .and_then(|variables| variables.iter().find(|v| v.name == name)))
    }

    /// Whether the code begins with `aload_0; invokespecial super_class.<init>`.
    pub fn starts_with_super_init(&self, super_class: &str) -> Result<bool> {
        match self.code.as_slice() {
            [ALOAD_0, INVOKESPECIAL, hi, lo, ..] => {
                self.is_init_of(u16::from_be_bytes([*hi, *lo]), super_class)
            }
            _ => Ok(false),
        }
    }

    /// Whether the code is exactly `super.<init>(); return;`, i.e. a default constructor body.
    pub fn is_super_init_return(&self, super_class: &str) -> Result<bool> {
        match self.code.as_slice() {
            [ALOAD_0, INVOKESPECIAL, hi, lo, RETURN] => {
                self.is_init_of(u16::from_be_bytes([*hi, *lo]), super_class)
            }
            _ => Ok(false),
        }
    }

    fn is_init_of(&self, method_ref_index: u16, class_name: &str) -> Result<bool> {
        Ok(match self.constant_pool.get(method_ref_index)? {
            Constant::MethodRef(m) => m.class_name() == class_name && m.name() == "<init>",
            _ => false,
        })
    }
}
impl fmt::Debug for CodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAttribute")
            .field("max_stack", &self.max_stack)
            .field("max_locals", &self.max_locals)
            .field("code", &format!("({} bytes)", self.code.len()))
            .field("exception_table", &self.exception_table)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: Option<String>,
}
impl ExceptionTableEntry {
    /// A handler without a catch type catches everything, which is how `finally` is compiled.
    pub fn is_finally(&self) -> bool {
        self.catch_type.is_none()
    }
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.12
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumber {
    pub start_pc: u16,
    pub line_number: u16,
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.7.13
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name: String,
    pub descriptor: String,
    pub index: u16,
}

impl<R: Read> Parser<R> {
    pub(crate) fn parse_code_attribute(
        &mut self,
        constant_pool: &Arc<ConstantPool>,
    ) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.read_bytes(code_length as usize)?;
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry(constant_pool))
            .collect::<Result<Vec<_>>>()?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
            constant_pool: Arc::clone(constant_pool),
            line_numbers: OnceLock::new(),
            local_variables: OnceLock::new(),
        })
    }

    fn parse_exception_table_entry(
        &mut self,
        constant_pool: &ConstantPool,
    ) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = constant_pool
            .optional_class(self.read_u16()?)?
            .map(|c| c.name.clone());

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    fn parse_line_numbers(&mut self) -> Result<Vec<LineNumber>> {
        let line_number_table_length = self.read_u16()?;
        (0..line_number_table_length)
            .map(|_| {
                Ok(LineNumber {
                    start_pc: self.read_u16()?,
                    line_number: self.read_u16()?,
                })
            })
            .collect()
    }

    fn parse_local_variables(&mut self, constant_pool: &ConstantPool) -> Result<Vec<LocalVariable>> {
        let local_variable_table_length = self.read_u16()?;
        (0..local_variable_table_length)
            .map(|_| {
                Ok(LocalVariable {
                    start_pc: self.read_u16()?,
                    length: self.read_u16()?,
                    name: self.parse_utf8_ref(constant_pool)?,
                    descriptor: self.parse_utf8_ref(constant_pool)?,
                    index: self.read_u16()?,
                })
            })
            .collect()
    }
}
