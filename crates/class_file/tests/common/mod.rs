#![allow(dead_code)]

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ENUM: u16 = 0x4000;

pub const ALOAD_0: u8 = 0x2a;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const RETURN: u8 = 0xb1;

/// Assembles class file bytes in memory.
///
/// Constants are appended in the order they are requested, so the resulting pool only ever
/// refers backwards unless an entry is added with [`ClassBuilder::raw_constant`].
pub struct ClassBuilder {
    major_version: u16,
    constant_pool: Vec<u8>,
    next_index: u16,
    utf8s: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}
impl ClassBuilder {
    /// A public class extending `java/lang/Object`.
    pub fn new(class_name: &str) -> Self {
        let mut builder = Self {
            major_version: 52,
            constant_pool: Vec::new(),
            next_index: 1,
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            access_flags: ACC_PUBLIC | ACC_SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        builder.this_class = builder.class(class_name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    pub fn version(mut self, major_version: u16) -> Self {
        self.major_version = major_version;
        self
    }

    pub fn access(mut self, access_flags: u16) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn extends(mut self, class_name: &str) -> Self {
        self.super_class = self.class(class_name);
        self
    }

    pub fn without_super_class(mut self) -> Self {
        self.super_class = 0;
        self
    }

    pub fn implements(mut self, class_name: &str) -> Self {
        let index = self.class(class_name);
        self.interfaces.push(index);
        self
    }

    pub fn source_file(mut self, file_name: &str) -> Self {
        let index = self.utf8(file_name);
        let attribute = self.attribute("SourceFile", &index.to_be_bytes());
        self.attributes.push(attribute);
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        let attribute = self.signature_attribute(signature);
        self.attributes.push(attribute);
        self
    }

    /// Adds a class level `RuntimeVisibleAnnotations` attribute with string elements.
    pub fn annotation(mut self, type_descriptor: &str, elements: &[(&str, &str)]) -> Self {
        let mut info = 1u16.to_be_bytes().to_vec();
        info.extend(self.annotation_bytes(type_descriptor, elements));
        let attribute = self.attribute("RuntimeVisibleAnnotations", &info);
        self.attributes.push(attribute);
        self
    }

    pub fn field(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        let member = self.member(access_flags, name, descriptor, Vec::new());
        self.fields.push(member);
        self
    }

    pub fn method(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        let member = self.member(access_flags, name, descriptor, Vec::new());
        self.methods.push(member);
        self
    }

    pub fn generic_method(
        mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        signature: &str,
    ) -> Self {
        let attribute = self.signature_attribute(signature);
        let member = self.member(access_flags, name, descriptor, vec![attribute]);
        self.methods.push(member);
        self
    }

    /// Adds a method whose `Code` attribute holds `code` and maps pc 0 to `line_number`.
    pub fn method_with_code(
        mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        code: &[u8],
        line_number: u16,
    ) -> Self {
        let mut line_numbers = 1u16.to_be_bytes().to_vec();
        line_numbers.extend(0u16.to_be_bytes());
        line_numbers.extend(line_number.to_be_bytes());
        let line_number_table = self.attribute("LineNumberTable", &line_numbers);

        let mut info = Vec::new();
        info.extend(1u16.to_be_bytes());
        info.extend(1u16.to_be_bytes());
        info.extend((code.len() as u32).to_be_bytes());
        info.extend(code);
        info.extend(0u16.to_be_bytes());
        info.extend(1u16.to_be_bytes());
        info.extend(line_number_table);
        let attribute = self.attribute("Code", &info);

        let member = self.member(access_flags, name, descriptor, vec![attribute]);
        self.methods.push(member);
        self
    }

    /// The bytecode of a constructor that only calls `super_class.<init>()`.
    pub fn default_constructor_code(&mut self, super_class: &str) -> Vec<u8> {
        let [hi, lo] = self.method_ref(super_class, "<init>", "()V").to_be_bytes();
        vec![ALOAD_0, INVOKESPECIAL, hi, lo, RETURN]
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8s.get(value) {
            return *index;
        }
        let mut bytes = vec![1];
        bytes.extend((value.len() as u16).to_be_bytes());
        bytes.extend(value.as_bytes());
        let index = self.raw_constant(&bytes, 1);
        self.utf8s.insert(value.to_owned(), index);
        index
    }

    pub fn class(&mut self, class_name: &str) -> u16 {
        if let Some(index) = self.classes.get(class_name) {
            return *index;
        }
        let name_index = self.utf8(class_name);
        let index = self.raw_constant(&[&[7u8][..], &name_index.to_be_bytes()[..]].concat(), 1);
        self.classes.insert(class_name.to_owned(), index);
        index
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.raw_constant(
            &[
                &[12u8][..],
                &name_index.to_be_bytes()[..],
                &descriptor_index.to_be_bytes()[..],
            ]
            .concat(),
            1,
        )
    }

    pub fn method_ref(&mut self, class_name: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class_name);
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.raw_constant(
            &[
                &[10u8][..],
                &class_index.to_be_bytes()[..],
                &name_and_type_index.to_be_bytes()[..],
            ]
            .concat(),
            1,
        )
    }

    /// The index the next constant will be given.
    pub fn next_index(&self) -> u16 {
        self.next_index
    }

    /// Appends an already encoded `cp_info` occupying `slots` pool indices.
    pub fn raw_constant(&mut self, bytes: &[u8], slots: u16) -> u16 {
        let index = self.next_index;
        self.constant_pool.extend(bytes);
        self.next_index += slots;
        index
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(0xCAFEBABEu32.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(self.major_version.to_be_bytes());
        bytes.extend(self.next_index.to_be_bytes());
        bytes.extend(&self.constant_pool);
        bytes.extend(self.access_flags.to_be_bytes());
        bytes.extend(self.this_class.to_be_bytes());
        bytes.extend(self.super_class.to_be_bytes());
        bytes.extend((self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            bytes.extend(interface.to_be_bytes());
        }
        for members in [&self.fields, &self.methods, &self.attributes] {
            bytes.extend((members.len() as u16).to_be_bytes());
            for member in members {
                bytes.extend(member);
            }
        }
        bytes
    }

    fn member(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Vec<u8>>,
    ) -> Vec<u8> {
        let mut bytes = access_flags.to_be_bytes().to_vec();
        bytes.extend(self.utf8(name).to_be_bytes());
        bytes.extend(self.utf8(descriptor).to_be_bytes());
        bytes.extend((attributes.len() as u16).to_be_bytes());
        for attribute in attributes {
            bytes.extend(attribute);
        }
        bytes
    }

    fn signature_attribute(&mut self, signature: &str) -> Vec<u8> {
        let index = self.utf8(signature);
        self.attribute("Signature", &index.to_be_bytes())
    }

    fn annotation_bytes(&mut self, type_descriptor: &str, elements: &[(&str, &str)]) -> Vec<u8> {
        let mut bytes = self.utf8(type_descriptor).to_be_bytes().to_vec();
        bytes.extend((elements.len() as u16).to_be_bytes());
        for (name, value) in elements {
            bytes.extend(self.utf8(name).to_be_bytes());
            bytes.push(b's');
            bytes.extend(self.utf8(value).to_be_bytes());
        }
        bytes
    }

    fn attribute(&mut self, name: &str, info: &[u8]) -> Vec<u8> {
        let mut bytes = self.utf8(name).to_be_bytes().to_vec();
        bytes.extend((info.len() as u32).to_be_bytes());
        bytes.extend(info);
        bytes
    }
}
