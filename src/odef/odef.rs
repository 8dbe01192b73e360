use std::rc::Rc;

use crate::{
    ast::{
        ast::{Arena, TypingId, VarDeclId},
        statements::{Access, ClassDef, Import, Program, VarDecl},
        types::Typing,
    },
    errors::errors::OdefError,
    Span,
};

pub const SIGNATURE: &[u8; 4] = b"Org\x92";
/// Source id carried by every decoded node.
pub const ODEF_FILE: &str = "<odef>";

const HEADER_SIZE: usize = 12;

fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

fn write_u16(out: &mut Vec<u8>, value: u16) {
    write_u8(out, (value & 0xFF) as u8);
    write_u8(out, (value >> 8) as u8);
}

fn write_u32(out: &mut Vec<u8>, value: u32) {
    write_u16(out, (value & 0xFFFF) as u16);
    write_u16(out, (value >> 16) as u16);
}

fn write_u64(out: &mut Vec<u8>, value: u64) {
    write_u32(out, (value & 0xFFFF_FFFF) as u32);
    write_u32(out, (value >> 32) as u32);
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    write_u64(out, len as u64);
}

fn write_str(out: &mut Vec<u8>, value: &str) {
    write_len(out, value.len());
    out.extend_from_slice(value.as_bytes());
}

fn write_flag(out: &mut Vec<u8>, value: bool) {
    write_u8(out, u8::from(value));
}

fn encode_typing(out: &mut Vec<u8>, arena: &Arena, id: TypingId) {
    let typing = &arena[id];
    write_str(out, &typing.name);
    write_len(out, typing.templates.len());
    for template in &typing.templates {
        encode_typing(out, arena, *template);
    }
}

fn encode_vardecl(out: &mut Vec<u8>, arena: &Arena, id: VarDeclId) {
    let decl = &arena[id];
    write_str(out, &decl.name);
    match decl.typing {
        Some(typing) => {
            write_flag(out, true);
            encode_typing(out, arena, typing);
        }
        None => write_flag(out, false),
    }
}

/// Serializes the declarations of `program`, e.g. to be saved to a file.
pub fn encode(program: &Program, arena: &Arena) -> Vec<u8> {
    let mut payload = Vec::new();

    write_str(&mut payload, &program.namespace_name);
    write_len(&mut payload, program.imports.len());
    for import in &program.imports {
        write_str(&mut payload, &import.name);
    }

    write_len(&mut payload, program.vardecls.len());
    for vardecl in &program.vardecls {
        encode_vardecl(&mut payload, arena, *vardecl);
    }

    write_len(&mut payload, program.classes.len());
    for class in &program.classes {
        let class = &arena[*class];
        write_str(&mut payload, &class.name);
        write_flag(&mut payload, class.is_struct);
        write_flag(&mut payload, class.is_variadic);
        write_len(&mut payload, class.generics.len());
        for generic in &class.generics {
            write_str(&mut payload, generic);
        }
        write_len(&mut payload, class.fields.len());
        for (field, access) in class.fields_with_access() {
            encode_vardecl(&mut payload, arena, field);
            write_flag(&mut payload, access == Access::Public);
        }
    }

    write_len(&mut payload, program.aliases.len());
    for (name, typing) in &program.aliases {
        write_str(&mut payload, name);
        encode_typing(&mut payload, arena, *typing);
    }

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(SIGNATURE);
    write_len(&mut result, payload.len());
    result.extend_from_slice(&payload);
    result
}

/// Cursor over the payload of a definition file.
struct Reader<'a> {
    data: &'a [u8],
    span: Span,
}

impl<'a> Reader<'a> {
    fn read(&mut self, len: usize) -> Result<&'a [u8], OdefError> {
        if self.data.len() < len {
            return Err(OdefError::Truncated);
        }
        let (result, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(result)
    }

    fn read_u8(&mut self) -> Result<u8, OdefError> {
        Ok(self.read(1)?[0])
    }

    fn read_u64(&mut self) -> Result<u64, OdefError> {
        let bytes = self.read(8)?;
        let mut value = [0u8; 8];
        value.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(value))
    }

    /// A length or count; anything longer than the remaining input is truncation.
    fn read_len(&mut self) -> Result<usize, OdefError> {
        let len = self.read_u64()?;
        usize::try_from(len)
            .ok()
            .filter(|len| *len <= self.data.len())
            .ok_or(OdefError::Truncated)
    }

    fn read_str(&mut self) -> Result<String, OdefError> {
        let len = self.read_len()?;
        let bytes = self.read(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| OdefError::InvalidUtf8)
    }

    fn read_flag(&mut self) -> Result<bool, OdefError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(OdefError::InvalidFlag { value }),
        }
    }

    fn read_typing(&mut self, arena: &mut Arena) -> Result<TypingId, OdefError> {
        let name = self.read_str()?;
        let count = self.read_len()?;
        let mut templates = vec![];
        for _ in 0..count {
            templates.push(self.read_typing(arena)?);
        }
        Ok(arena.alloc_typing(Typing::new(&name, self.span.clone()).with_templates(templates)))
    }

    fn read_vardecl(&mut self, arena: &mut Arena) -> Result<VarDeclId, OdefError> {
        let name = self.read_str()?;
        let typing = if self.read_flag()? {
            Some(self.read_typing(arena)?)
        } else {
            None
        };
        Ok(arena.alloc_vardecl(VarDecl {
            span: self.span.clone(),
            name,
            name_span: self.span.clone(),
            typing,
            init: None,
        }))
    }

    fn read_class(&mut self, arena: &mut Arena) -> Result<ClassDef, OdefError> {
        let name = self.read_str()?;
        let is_struct = self.read_flag()?;
        let is_variadic = self.read_flag()?;

        let mut generics = vec![];
        for _ in 0..self.read_len()? {
            generics.push(self.read_str()?);
        }

        let mut fields = vec![];
        let mut accesses = vec![];
        for _ in 0..self.read_len()? {
            fields.push(self.read_vardecl(arena)?);
            accesses.push(if self.read_flag()? {
                Access::Public
            } else {
                Access::Private
            });
        }

        Ok(ClassDef {
            name,
            name_span: self.span.clone(),
            is_struct,
            generics,
            is_variadic,
            fields,
            accesses,
            program: None,
        })
    }
}

/// Deserializes a definition file, allocating its nodes in `arena`.
pub fn decode(bytes: &[u8], arena: &mut Arena) -> Result<Program, OdefError> {
    if bytes.len() < HEADER_SIZE {
        return Err(OdefError::TooShort { len: bytes.len() });
    }
    if &bytes[..4] != SIGNATURE {
        return Err(OdefError::BadSignature);
    }

    let span = Span::new(0, 0, &Rc::new(ODEF_FILE.to_string()));
    let mut header = Reader {
        data: &bytes[4..],
        span: span.clone(),
    };
    let len = header.read_u64()?;
    let len = usize::try_from(len).map_err(|_| OdefError::Truncated)?;
    if header.data.len() < len {
        return Err(OdefError::Truncated);
    }
    if header.data.len() > len {
        return Err(OdefError::TrailingBytes {
            count: header.data.len() - len,
        });
    }

    let mut reader = Reader {
        data: header.data,
        span: span.clone(),
    };
    let mut program = Program {
        namespace_name: reader.read_str()?,
        ..Program::default()
    };

    for _ in 0..reader.read_len()? {
        let name = reader.read_str()?;
        program.imports.push(Import {
            name,
            span: span.clone(),
        });
    }

    for _ in 0..reader.read_len()? {
        program.vardecls.push(reader.read_vardecl(arena)?);
    }

    for _ in 0..reader.read_len()? {
        let class = reader.read_class(arena)?;
        program.classes.push(arena.alloc_class(class));
    }

    for _ in 0..reader.read_len()? {
        let name = reader.read_str()?;
        let typing = reader.read_typing(arena)?;
        program.aliases.insert(name, typing);
    }

    if !reader.data.is_empty() {
        return Err(OdefError::TrailingBytes {
            count: reader.data.len(),
        });
    }

    Ok(program)
}
