//! Fixtures shared by the classpath tests: a class file assembler and
//! helpers that write source trees and archives into temporary directories.

use std::io::Write;
use std::path::{Path, PathBuf};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ENUM: u16 = 0x4000;

/// Assembles minimal but well-formed class files.
pub struct ClassFileBuilder {
    pool: Vec<u8>,
    pool_count: u16,
    access: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
    inner_classes: Vec<[u16; 4]>,
    class_constants: Vec<(String, u16)>,
}

impl ClassFileBuilder {
    /// `binary_name` uses `/` separators (`p/Outer$Inner`).
    pub fn new(binary_name: &str, super_name: Option<&str>, access: u16) -> Self {
        let mut builder = ClassFileBuilder {
            pool: Vec::new(),
            pool_count: 1,
            access,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
            inner_classes: Vec::new(),
            class_constants: Vec::new(),
        };
        builder.this_class = builder.class(binary_name);
        if let Some(name) = super_name {
            builder.super_class = builder.class(name);
        }
        builder
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        self.pool.push(1);
        self.pool.extend_from_slice(&(text.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(text.as_bytes());
        self.next_index(1)
    }

    /// A `CONSTANT_Class`; repeated names share one entry, as javac emits.
    pub fn class(&mut self, binary_name: &str) -> u16 {
        if let Some((_, index)) = self.class_constants.iter().find(|(n, _)| n == binary_name) {
            return *index;
        }
        let name = self.utf8(binary_name);
        self.pool.push(7);
        self.pool.extend_from_slice(&name.to_be_bytes());
        let index = self.next_index(1);
        self.class_constants.push((binary_name.to_string(), index));
        index
    }

    /// A `CONSTANT_Long`, which occupies two pool slots.
    pub fn long_constant(&mut self, value: i64) -> u16 {
        self.pool.push(5);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.next_index(2)
    }

    fn next_index(&mut self, slots: u16) -> u16 {
        let index = self.pool_count;
        self.pool_count += slots;
        index
    }

    pub fn interface(&mut self, binary_name: &str) -> &mut Self {
        let index = self.class(binary_name);
        self.interfaces.push(index);
        self
    }

    fn attribute(&mut self, name: &str, data: &[u8]) -> Vec<u8> {
        let name = self.utf8(name);
        let mut out = Vec::new();
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
        out
    }

    fn signature_attribute(&mut self, signature: &str) -> Vec<u8> {
        let index = self.utf8(signature);
        self.attribute("Signature", &index.to_be_bytes())
    }

    fn member(&mut self, access: u16, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> Vec<u8> {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let mut out = Vec::new();
        out.extend_from_slice(&access.to_be_bytes());
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&descriptor.to_be_bytes());
        out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for attribute in attributes {
            out.extend_from_slice(&attribute);
        }
        out
    }

    pub fn field(&mut self, access: u16, name: &str, descriptor: &str, signature: Option<&str>) -> &mut Self {
        let attributes = signature
            .map(|s| vec![self.signature_attribute(s)])
            .unwrap_or_default();
        let field = self.member(access, name, descriptor, attributes);
        self.fields.push(field);
        self
    }

    pub fn method(
        &mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        exceptions: &[&str],
    ) -> &mut Self {
        let mut attributes = Vec::new();
        if let Some(signature) = signature {
            attributes.push(self.signature_attribute(signature));
        }
        if !exceptions.is_empty() {
            let mut data = (exceptions.len() as u16).to_be_bytes().to_vec();
            for exception in exceptions {
                data.extend_from_slice(&self.class(exception).to_be_bytes());
            }
            attributes.push(self.attribute("Exceptions", &data));
        }
        // A Code attribute the decoder must skip by length.
        if access & ACC_ABSTRACT == 0 {
            attributes.push(self.attribute("Code", &[0, 1, 0, 1, 0, 0, 0, 1, 0xB1, 0, 0, 0, 0]));
        }
        let method = self.member(access, name, descriptor, attributes);
        self.methods.push(method);
        self
    }

    pub fn class_signature(&mut self, signature: &str) -> &mut Self {
        let attribute = self.signature_attribute(signature);
        self.attributes.push(attribute);
        self
    }

    /// One `InnerClasses` row; `outer` and `simple` are `None` for local and
    /// anonymous classes.
    pub fn inner_class(&mut self, inner: &str, outer: Option<&str>, simple: Option<&str>, access: u16) -> &mut Self {
        let inner = self.class(inner);
        let outer = outer.map_or(0, |o| self.class(o));
        let simple = simple.map_or(0, |s| self.utf8(s));
        self.inner_classes.push([inner, outer, simple, access]);
        self
    }

    pub fn build(&mut self) -> Vec<u8> {
        if !self.inner_classes.is_empty() {
            let mut data = (self.inner_classes.len() as u16).to_be_bytes().to_vec();
            for row in self.inner_classes.clone() {
                for value in row {
                    data.extend_from_slice(&value.to_be_bytes());
                }
            }
            let attribute = self.attribute("InnerClasses", &data);
            self.attributes.push(attribute);
            self.inner_classes.clear();
        }
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&51u16.to_be_bytes());
        out.extend_from_slice(&self.pool_count.to_be_bytes());
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for index in &self.interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }
        for members in [&self.fields, &self.methods] {
            out.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members {
                out.extend_from_slice(member);
            }
        }
        out.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            out.extend_from_slice(attribute);
        }
        out
    }
}

/// A public class with one public field of type `int`.
pub fn class_with_field(binary_name: &str, field: &str) -> Vec<u8> {
    ClassFileBuilder::new(binary_name, Some("java/lang/Object"), ACC_PUBLIC | ACC_SUPER)
        .field(ACC_PUBLIC, field, "I", None)
        .method(ACC_PUBLIC, "<init>", "()V", None, &[])
        .build()
}

/// Write `files` (relative path, content) under `root`.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }
}

/// Write a zip archive at `path` holding `entries`.
pub fn write_archive(path: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    let bytes = writer.finish().unwrap().into_inner();
    std::fs::write(path, bytes).unwrap();
    path.to_path_buf()
}
