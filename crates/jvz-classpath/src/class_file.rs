//! Class file decoding into a `TypeDecl`.
//!
//! Only what name resolution needs is decoded: the constant pool, access
//! flags, the class hierarchy, field and method signatures, and the
//! `Signature`, `Exceptions` and `InnerClasses` attributes. Code and every
//! other attribute are skipped by length.

use jvz_parser::ModifierFlags;
use jvz_parser::node::TypeDeclarationKind;
use tracing::trace;

use crate::decl::{
    DeclOrigin, FieldDecl, MethodDecl, TypeDecl, TypeRef, canonical_from_binary,
};
use crate::error::ClassFileError;
use crate::signature::{
    MethodSignature, parse_class_signature, parse_field_signature, parse_method_signature,
};

const MAGIC: u32 = 0xCAFE_BABE;

mod access {
    pub const SUPER: u16 = 0x0020;
    pub const BRIDGE: u16 = 0x0040;
    pub const VARARGS: u16 = 0x0080;
    pub const INTERFACE: u16 = 0x0200;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

/// Decode a class file. `origin` is recorded on the declaration.
pub fn read_class_file(bytes: &[u8], origin: DeclOrigin) -> Result<TypeDecl, ClassFileError> {
    let mut reader = ByteReader { bytes, pos: 0 };
    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(ClassFileError::BadMagic(magic));
    }
    let _minor = reader.u16()?;
    let _major = reader.u16()?;
    let pool = ConstantPool::read(&mut reader)?;

    let access_flags = reader.u16()?;
    let this_class = reader.u16()?;
    let super_class = reader.u16()?;
    let binary = pool.class_name(this_class)?.to_string();

    let interface_count = reader.u16()?;
    let mut interface_names = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interface_names.push(pool.class_name(reader.u16()?)?.to_string());
    }

    let fields = read_members(&mut reader, &pool)?;
    let methods = read_members(&mut reader, &pool)?;
    let class_attributes = read_attributes(&mut reader, &pool)?;

    let mut decl = TypeDecl {
        name: canonical_from_binary(&binary),
        binary_name: binary.replace('/', "."),
        package: binary
            .rsplit_once('/')
            .map(|(pkg, _)| pkg.replace('/', "."))
            .unwrap_or_default(),
        kind: TypeDeclarationKind::Class,
        modifiers: ModifierFlags::empty(),
        type_parameters: Vec::new(),
        superclass: None,
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        member_types: Vec::new(),
        enclosing: None,
        origin,
    };

    // Nesting comes from InnerClasses: a `$` in a binary name is only a
    // convention.
    let mut effective_access = access_flags;
    if let Some(data) = find_attribute(&class_attributes, "InnerClasses") {
        let mut inner = ByteReader { bytes: data, pos: 0 };
        let count = inner.u16()?;
        let mut members = Vec::new();
        let mut outer_of_this = None;
        for _ in 0..count {
            let inner_class = inner.u16()?;
            let outer_class = inner.u16()?;
            let inner_name = inner.u16()?;
            let inner_access = inner.u16()?;
            if inner_class == this_class && outer_class != 0 && inner_name != 0 {
                effective_access = inner_access;
                outer_of_this = Some((
                    canonical_from_binary(pool.class_name(outer_class)?),
                    pool.utf8(inner_name)?.to_string(),
                ));
            } else if outer_class == this_class && inner_name != 0 {
                members.push(pool.utf8(inner_name)?.to_string());
            }
        }
        if let Some((outer, simple)) = outer_of_this {
            decl.name = format!("{outer}.{simple}");
            decl.enclosing = Some(outer);
        }
        decl.member_types = members
            .into_iter()
            .map(|simple| format!("{}.{simple}", decl.name))
            .collect();
    }

    decl.kind = if effective_access & access::ANNOTATION != 0 {
        TypeDeclarationKind::Annotation
    } else if effective_access & access::INTERFACE != 0 {
        TypeDeclarationKind::Interface
    } else if effective_access & access::ENUM != 0 {
        TypeDeclarationKind::Enum
    } else {
        TypeDeclarationKind::Class
    };
    decl.modifiers = ModifierFlags::from_bits_truncate(effective_access & !access::SUPER);

    if let Some(signature) = find_attribute(&class_attributes, "Signature") {
        let signature = pool.utf8(attribute_index(signature)?)?;
        let parsed = parse_class_signature(signature)?;
        decl.type_parameters = parsed.type_parameters;
        decl.superclass = Some(parsed.superclass);
        decl.interfaces = parsed.interfaces;
    } else {
        if super_class != 0 {
            decl.superclass = Some(TypeRef::class(canonical_from_binary(
                pool.class_name(super_class)?,
            )));
        }
        decl.interfaces = interface_names
            .iter()
            .map(|name| TypeRef::class(canonical_from_binary(name)))
            .collect();
    }
    if decl.is_interface() {
        decl.superclass = None;
    }

    for member in &fields {
        if member.access & access::SYNTHETIC != 0 {
            continue;
        }
        let ty = match find_attribute(&member.attributes, "Signature") {
            Some(sig) => parse_field_signature(pool.utf8(attribute_index(sig)?)?)?,
            None => parse_field_signature(&member.descriptor)?,
        };
        decl.fields.push(FieldDecl {
            name: member.name.clone(),
            ty,
            modifiers: ModifierFlags::from_bits_truncate(member.access),
        });
    }

    for member in &methods {
        if member.access & (access::SYNTHETIC | access::BRIDGE) != 0 || member.name == "<clinit>" {
            continue;
        }
        let is_constructor = member.name == "<init>";
        let generic = find_attribute(&member.attributes, "Signature");
        let mut signature = match generic {
            Some(sig) => parse_method_signature(pool.utf8(attribute_index(sig)?)?)?,
            None => parse_method_signature(&member.descriptor)?,
        };
        if is_constructor && generic.is_none() {
            drop_implicit_constructor_parameters(&decl, &mut signature);
        }
        if signature.throws.is_empty() {
            if let Some(data) = find_attribute(&member.attributes, "Exceptions") {
                let mut exceptions = ByteReader { bytes: data, pos: 0 };
                for _ in 0..exceptions.u16()? {
                    let name = pool.class_name(exceptions.u16()?)?;
                    signature.throws.push(TypeRef::class(canonical_from_binary(name)));
                }
            }
        }
        let name = if is_constructor {
            decl.simple_name().to_string()
        } else {
            member.name.clone()
        };
        decl.methods.push(MethodDecl {
            name,
            type_parameters: signature.type_parameters,
            parameters: signature.parameters,
            return_type: signature.return_type,
            throws: signature.throws,
            modifiers: ModifierFlags::from_bits_truncate(
                member.access & !(access::BRIDGE | access::VARARGS),
            ),
            is_varargs: member.access & access::VARARGS != 0,
            is_constructor,
        });
    }

    trace!(
        name = %decl.name,
        fields = decl.fields.len(),
        methods = decl.methods.len(),
        "decoded class file"
    );
    Ok(decl)
}

/// Erased constructor descriptors carry the outer instance of inner classes
/// and the name/ordinal pair of enums; source code never passes these.
fn drop_implicit_constructor_parameters(decl: &TypeDecl, signature: &mut MethodSignature) {
    if let Some(outer) = &decl.enclosing {
        if !decl.is_static() && !decl.is_interface() {
            if signature.parameters.first().and_then(TypeRef::class_name) == Some(outer.as_str()) {
                signature.parameters.remove(0);
            }
        }
    }
    if decl.kind == TypeDeclarationKind::Enum {
        let synthetic = [
            TypeRef::class("java.lang.String"),
            TypeRef::Primitive(jvz_parser::node::PrimitiveKind::Int),
        ];
        if signature.parameters.starts_with(&synthetic) {
            signature.parameters.drain(..2);
        }
    }
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(ClassFileError::Truncated(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ClassFileError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ClassFileError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

enum Constant {
    Utf8(String),
    Class(u16),
    /// Numeric, string, member reference and dynamic constants.
    Other,
    /// Second slot of a long or double.
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn read(reader: &mut ByteReader<'_>) -> Result<ConstantPool, ClassFileError> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);
        let mut index = 1u16;
        while index < count {
            let tag = reader.u8()?;
            let constant = match tag {
                1 => {
                    let len = reader.u16()? as usize;
                    Constant::Utf8(decode_modified_utf8(reader.take(len)?))
                }
                7 => Constant::Class(reader.u16()?),
                3 | 4 => {
                    reader.take(4)?;
                    Constant::Other
                }
                5 | 6 => {
                    reader.take(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                8 | 16 | 19 | 20 => {
                    reader.take(2)?;
                    Constant::Other
                }
                9..=12 | 17 | 18 => {
                    reader.take(4)?;
                    Constant::Other
                }
                15 => {
                    reader.take(3)?;
                    Constant::Other
                }
                _ => return Err(ClassFileError::UnknownConstantTag { tag, index }),
            };
            entries.push(constant);
            index += 1;
        }
        Ok(ConstantPool { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.entries.get(index as usize) {
            Some(Constant::Utf8(text)) => Ok(text),
            _ => Err(ClassFileError::BadConstantIndex(index)),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.entries.get(index as usize) {
            Some(Constant::Class(name_index)) => self.utf8(*name_index),
            _ => Err(ClassFileError::BadConstantIndex(index)),
        }
    }
}

/// The JVM's "modified UTF-8": NUL is two bytes and supplementary
/// characters are surrogate pairs of three bytes each.
fn decode_modified_utf8(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 && i + 1 < bytes.len() {
            units.push((u16::from(b & 0x1F) << 6) | u16::from(bytes[i + 1] & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 && i + 2 < bytes.len() {
            units.push(
                (u16::from(b & 0x0F) << 12)
                    | (u16::from(bytes[i + 1] & 0x3F) << 6)
                    | u16::from(bytes[i + 2] & 0x3F),
            );
            i += 3;
        } else {
            units.push(0xFFFD);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}

struct Attribute<'p, 'b> {
    name: &'p str,
    data: &'b [u8],
}

struct Member<'p, 'b> {
    access: u16,
    name: String,
    descriptor: String,
    attributes: Vec<Attribute<'p, 'b>>,
}

fn read_attributes<'p, 'b>(
    reader: &mut ByteReader<'b>,
    pool: &'p ConstantPool,
) -> Result<Vec<Attribute<'p, 'b>>, ClassFileError> {
    let count = reader.u16()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = pool.utf8(reader.u16()?)?;
        let len = reader.u32()? as usize;
        let data = reader.take(len)?;
        out.push(Attribute { name, data });
    }
    Ok(out)
}

fn read_members<'p, 'b>(
    reader: &mut ByteReader<'b>,
    pool: &'p ConstantPool,
) -> Result<Vec<Member<'p, 'b>>, ClassFileError> {
    let count = reader.u16()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access = reader.u16()?;
        let name = pool.utf8(reader.u16()?)?.to_string();
        let descriptor = pool.utf8(reader.u16()?)?.to_string();
        let attributes = read_attributes(reader, pool)?;
        out.push(Member {
            access,
            name,
            descriptor,
            attributes,
        });
    }
    Ok(out)
}

fn find_attribute<'b>(attributes: &[Attribute<'_, 'b>], name: &str) -> Option<&'b [u8]> {
    attributes.iter().find(|a| a.name == name).map(|a| a.data)
}

fn attribute_index(data: &[u8]) -> Result<u16, ClassFileError> {
    ByteReader { bytes: data, pos: 0 }.u16()
}
