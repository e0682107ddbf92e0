use std::{
    io::{BufReader, Read},
    sync::{Arc, OnceLock},
};

use byteorder::{BigEndian, ReadBytesExt};
use log::debug;

use crate::{
    attributes::Attributes,
    class_file::ClassFile,
    constant_pool::{tag, Constant, ConstantPool, PoolSlot, RawConstant},
    members::{FieldInfo, MethodInfo},
    Attribute, ClassAccessFlags, ClassFileError, FieldAccessFlags, MethodAccessFlags, Result,
};

type Endian = BigEndian;

const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;

pub struct Parser<R> {
    r: BufReader<R>,
}
impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self {
            r: BufReader::new(r),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool = Arc::new(self.parse_constant_pool(major_version)?);
        let access_flags = ClassAccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = constant_pool.class(self.read_u16()?)?.clone();
        let super_class = constant_pool.optional_class(self.read_u16()?)?.cloned();
        let interfaces_count = self.read_u16()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;
        let interfaces = interfaces
            .into_iter()
            .map(|index| constant_pool.class(index).cloned())
            .collect::<Result<Vec<_>>>()?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes(&constant_pool)?;

        debug!(
            "Decoded {} (version {}.{}): {} fields, {} methods, {} attributes",
            this_class.name,
            major_version,
            minor_version,
            fields.len(),
            methods.len(),
            attributes.len()
        );

        Ok(ClassFile {
            major_version,
            minor_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
            class_signature: OnceLock::new(),
            annotations: OnceLock::new(),
        })
    }

    fn parse_field_info(&mut self, constant_pool: &Arc<ConstantPool>) -> Result<FieldInfo> {
        let access_flags = FieldAccessFlags::from_bits_truncate(self.read_u16()?);
        let name = constant_pool.utf8(self.read_u16()?)?.to_owned();
        let descriptor = constant_pool.utf8(self.read_u16()?)?.to_owned();
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(FieldInfo::new(
            access_flags,
            name,
            descriptor,
            attributes,
            Arc::clone(constant_pool),
        ))
    }

    fn parse_method_info(&mut self, constant_pool: &Arc<ConstantPool>) -> Result<MethodInfo> {
        let access_flags = MethodAccessFlags::from_bits_truncate(self.read_u16()?);
        let name = constant_pool.utf8(self.read_u16()?)?.to_owned();
        let descriptor = constant_pool.utf8(self.read_u16()?)?.to_owned();
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(MethodInfo::new(
            access_flags,
            name,
            descriptor,
            attributes,
            Arc::clone(constant_pool),
        ))
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC_IDENTIFIER => Ok(()),
            magic_identifier => Err(ClassFileError::MalformedHeader(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self, major_version: u16) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()? as usize;

        let mut slots = Vec::with_capacity(constant_pool_count.max(1));
        slots.push(PoolSlot::Reserved);
        while slots.len() < constant_pool_count {
            let slot = self.parse_cp_info()?;
            let wide = matches!(
                slot,
                PoolSlot::Resolved(Constant::Long(_) | Constant::Double(_))
            );

            slots.push(slot);
            if wide {
                slots.push(PoolSlot::Unusable);
            }
        }

        debug!("Scanned {} constant pool slots", slots.len());

        ConstantPool::resolve(slots, major_version)
    }

    fn parse_cp_info(&mut self) -> Result<PoolSlot> {
        let tag = self.read_u8()?;
        let slot = match tag {
            tag::UTF8 => PoolSlot::Resolved(self.parse_utf8()?),
            tag::INTEGER => PoolSlot::Resolved(Constant::Integer(self.read_i32()?)),
            tag::FLOAT => PoolSlot::Resolved(Constant::Float(self.r.read_f32::<Endian>()?)),
            tag::LONG => PoolSlot::Resolved(Constant::Long(self.r.read_i64::<Endian>()?)),
            tag::DOUBLE => PoolSlot::Resolved(Constant::Double(self.r.read_f64::<Endian>()?)),
            tag::CLASS => PoolSlot::Pending(RawConstant::Class {
                name_index: self.read_u16()?,
            }),
            tag::STRING => PoolSlot::Pending(RawConstant::String {
                string_index: self.read_u16()?,
            }),
            tag::FIELD_REF => {
                let (class_index, name_and_type_index) = self.parse_ref_info()?;
                PoolSlot::Pending(RawConstant::FieldRef {
                    class_index,
                    name_and_type_index,
                })
            }
            tag::METHOD_REF => {
                let (class_index, name_and_type_index) = self.parse_ref_info()?;
                PoolSlot::Pending(RawConstant::MethodRef {
                    class_index,
                    name_and_type_index,
                })
            }
            tag::INTERFACE_METHOD_REF => {
                let (class_index, name_and_type_index) = self.parse_ref_info()?;
                PoolSlot::Pending(RawConstant::InterfaceMethodRef {
                    class_index,
                    name_and_type_index,
                })
            }
            tag::NAME_AND_TYPE => PoolSlot::Pending(RawConstant::NameAndType {
                name_index: self.read_u16()?,
                descriptor_index: self.read_u16()?,
            }),
            tag::METHOD_HANDLE => PoolSlot::Pending(RawConstant::MethodHandle {
                reference_kind: self.read_u8()?,
                reference_index: self.read_u16()?,
            }),
            tag::METHOD_TYPE => PoolSlot::Pending(RawConstant::MethodType {
                descriptor_index: self.read_u16()?,
            }),
            tag::DYNAMIC => {
                let (bootstrap_method_attr_index, name_and_type_index) = self.parse_ref_info()?;
                PoolSlot::Pending(RawConstant::Dynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                })
            }
            tag::INVOKE_DYNAMIC => {
                let (bootstrap_method_attr_index, name_and_type_index) = self.parse_ref_info()?;
                PoolSlot::Pending(RawConstant::InvokeDynamic {
                    bootstrap_method_attr_index,
                    name_and_type_index,
                })
            }
            tag::MODULE => PoolSlot::Pending(RawConstant::Module {
                name_index: self.read_u16()?,
            }),
            tag::PACKAGE => PoolSlot::Pending(RawConstant::Package {
                name_index: self.read_u16()?,
            }),
            _ => return Err(ClassFileError::UnsupportedConstantTag(tag)),
        };

        Ok(slot)
    }

    fn parse_utf8(&mut self) -> Result<Constant> {
        let length = self.read_u16()?;
        let bytes = self.read_bytes(length as usize)?;

        Ok(Constant::Utf8(decode_modified_utf8(&bytes)?))
    }

    fn parse_ref_info(&mut self) -> Result<(u16, u16)> {
        let first = self.read_u16()?;
        let second = self.read_u16()?;
        Ok((first, second))
    }

    fn parse_attribute(&mut self, constant_pool: &ConstantPool) -> Result<Attribute> {
        let name = constant_pool.utf8(self.read_u16()?)?.to_owned();
        let attribute_length = self.read_u32()?;
        let info = self.read_bytes(attribute_length as usize)?;

        Ok(Attribute { name, info })
    }

    /// Reads an attribute count followed by that many attributes.
    pub(crate) fn parse_attributes(&mut self, constant_pool: &ConstantPool) -> Result<Attributes> {
        let attributes_count = self.read_u16()?;
        (0..attributes_count)
            .map(|_| self.parse_attribute(constant_pool))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    pub(crate) fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.r.by_ref().take(length as u64).read_to_end(&mut bytes)?;
        if bytes.len() < length {
            return Err(ClassFileError::TruncatedInput);
        }
        Ok(bytes)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }
}

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.4.7
//
// Modified UTF-8 encodes NUL as two bytes and supplementary characters as surrogate pairs
// of three bytes each, neither of which is valid UTF-8. Unpaired surrogates cannot be held
// by a `String` and are replaced by U+FFFD.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Ok(s.to_owned());
    }

    let continuation = |i: usize| match bytes.get(i) {
        Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
        _ => Err(ClassFileError::MalformedUtf8(i)),
    };

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i] as u16;
        let (unit, width) = match bytes[i] {
            0x00..=0x7F => (b, 1),
            0xC0..=0xDF => (((b & 0x1F) << 6) | continuation(i + 1)?, 2),
            0xE0..=0xEF => (
                ((b & 0x0F) << 12) | (continuation(i + 1)? << 6) | continuation(i + 2)?,
                3,
            ),
            _ => return Err(ClassFileError::MalformedUtf8(i)),
        };

        units.push(unit);
        i += width;
    }

    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}
