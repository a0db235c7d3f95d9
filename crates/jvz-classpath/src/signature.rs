//! Descriptor and generic `Signature` attribute decoding.
//!
//! Descriptors (`(ILjava/lang/String;)V`) are the erased subset of the
//! signature grammar, so one recursive decoder handles both.

use jvz_common::limits::MAX_SIGNATURE_DEPTH;
use jvz_parser::node::{PrimitiveKind, WildcardBound};

use crate::decl::{TypeParam, TypeRef, canonical_from_binary};
use crate::error::ClassFileError;

/// Generic class signature: `<T:...>Super;Iface;...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParam>,
    pub superclass: TypeRef,
    pub interfaces: Vec<TypeRef>,
}

/// Method descriptor or generic method signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParam>,
    pub parameters: Vec<TypeRef>,
    pub return_type: TypeRef,
    pub throws: Vec<TypeRef>,
}

pub fn parse_field_signature(signature: &str) -> Result<TypeRef, ClassFileError> {
    let mut reader = SignatureReader::new(signature);
    let ty = reader.read_type(0)?;
    reader.expect_end()?;
    Ok(ty)
}

pub fn parse_method_signature(signature: &str) -> Result<MethodSignature, ClassFileError> {
    let mut reader = SignatureReader::new(signature);
    let type_parameters = reader.read_type_parameters()?;
    reader.expect(b'(')?;
    let mut parameters = Vec::new();
    while reader.peek() != Some(b')') {
        parameters.push(reader.read_type(0)?);
    }
    reader.expect(b')')?;
    let return_type = if reader.peek() == Some(b'V') {
        reader.pos += 1;
        TypeRef::Void
    } else {
        reader.read_type(0)?
    };
    let mut throws = Vec::new();
    while reader.peek() == Some(b'^') {
        reader.pos += 1;
        throws.push(reader.read_type(0)?);
    }
    reader.expect_end()?;
    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
        throws,
    })
}

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature, ClassFileError> {
    let mut reader = SignatureReader::new(signature);
    let type_parameters = reader.read_type_parameters()?;
    let superclass = reader.read_type(0)?;
    let mut interfaces = Vec::new();
    while reader.peek().is_some() {
        interfaces.push(reader.read_type(0)?);
    }
    Ok(ClassSignature {
        type_parameters,
        superclass,
        interfaces,
    })
}

struct SignatureReader<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SignatureReader<'a> {
    fn new(text: &'a str) -> Self {
        SignatureReader {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self) -> ClassFileError {
        ClassFileError::BadSignature {
            signature: self.text.to_string(),
            position: self.pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<u8, ClassFileError> {
        let b = self.peek().ok_or_else(|| self.error())?;
        self.pos += 1;
        Ok(b)
    }

    fn expect(&mut self, expected: u8) -> Result<(), ClassFileError> {
        if self.bump()? == expected {
            Ok(())
        } else {
            self.pos -= 1;
            Err(self.error())
        }
    }

    fn expect_end(&self) -> Result<(), ClassFileError> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// Read up to (not including) any of `stops`.
    fn read_identifier(&mut self, stops: &[u8]) -> Result<&'a str, ClassFileError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if stops.contains(&b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start || self.pos >= self.bytes.len() {
            return Err(self.error());
        }
        Ok(&self.text[start..self.pos])
    }

    fn read_type_parameters(&mut self) -> Result<Vec<TypeParam>, ClassFileError> {
        let mut params = Vec::new();
        if self.peek() != Some(b'<') {
            return Ok(params);
        }
        self.pos += 1;
        while self.peek() != Some(b'>') {
            let name = self.read_identifier(b":")?.to_string();
            let mut bounds = Vec::new();
            // Class bound (may be empty), then interface bounds.
            while self.peek() == Some(b':') {
                self.pos += 1;
                if matches!(self.peek(), Some(b'L' | b'T' | b'[')) {
                    bounds.push(self.read_type(0)?);
                }
            }
            params.push(TypeParam { name, bounds });
        }
        self.expect(b'>')?;
        Ok(params)
    }

    fn read_type(&mut self, depth: u32) -> Result<TypeRef, ClassFileError> {
        if depth > MAX_SIGNATURE_DEPTH {
            return Err(self.error());
        }
        let tag = self.bump()?;
        let primitive = |kind| Ok(TypeRef::Primitive(kind));
        match tag {
            b'B' => primitive(PrimitiveKind::Byte),
            b'C' => primitive(PrimitiveKind::Char),
            b'D' => primitive(PrimitiveKind::Double),
            b'F' => primitive(PrimitiveKind::Float),
            b'I' => primitive(PrimitiveKind::Int),
            b'J' => primitive(PrimitiveKind::Long),
            b'S' => primitive(PrimitiveKind::Short),
            b'Z' => primitive(PrimitiveKind::Boolean),
            b'[' => Ok(TypeRef::array_of(self.read_type(depth + 1)?)),
            b'T' => {
                let name = self.read_identifier(b";")?.to_string();
                self.expect(b';')?;
                Ok(TypeRef::TypeVar(name))
            }
            b'L' => self.read_class_type(depth),
            _ => {
                self.pos -= 1;
                Err(self.error())
            }
        }
    }

    /// `L` already consumed: `pkg/Outer<args>.Inner<args>;`.
    fn read_class_type(&mut self, depth: u32) -> Result<TypeRef, ClassFileError> {
        let mut name = canonical_from_binary(self.read_identifier(b"<;.")?);
        let mut args = self.read_type_arguments(depth)?;
        while self.peek() == Some(b'.') {
            self.pos += 1;
            let inner = self.read_identifier(b"<;.")?;
            name.push('.');
            name.push_str(inner);
            args = self.read_type_arguments(depth)?;
        }
        self.expect(b';')?;
        Ok(TypeRef::Class { name, args })
    }

    fn read_type_arguments(&mut self, depth: u32) -> Result<Vec<TypeRef>, ClassFileError> {
        let mut args = Vec::new();
        if self.peek() != Some(b'<') {
            return Ok(args);
        }
        self.pos += 1;
        while self.peek() != Some(b'>') {
            let arg = match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    TypeRef::Wildcard {
                        bound_kind: WildcardBound::None,
                        bound: None,
                    }
                }
                Some(b'+') => {
                    self.pos += 1;
                    TypeRef::Wildcard {
                        bound_kind: WildcardBound::Extends,
                        bound: Some(Box::new(self.read_type(depth + 1)?)),
                    }
                }
                Some(b'-') => {
                    self.pos += 1;
                    TypeRef::Wildcard {
                        bound_kind: WildcardBound::Super,
                        bound: Some(Box::new(self.read_type(depth + 1)?)),
                    }
                }
                Some(_) => self.read_type(depth + 1)?,
                None => return Err(self.error()),
            };
            args.push(arg);
        }
        self.expect(b'>')?;
        Ok(args)
    }
}
