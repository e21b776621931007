//! Minimal class-file decoder.
//!
//! Reads only what is needed to name a class and its directly declared
//! interfaces: the constant pool, `this_class` and the interfaces table.
//! Fields, methods and attributes are never touched.

use crate::error::ParseError;

pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

/// A decoded class: its dotted binary name and its direct interfaces, in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledClass {
    pub name: String,
    pub interfaces: Vec<String>,
}

impl CompiledClass {
    pub fn implements(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class(u16),
    Other,
    /// Index 0, and the slot following a Long or Double.
    Unusable,
}

impl Constant {
    fn describe(&self) -> &'static str {
        match self {
            Constant::Utf8(_) => "Utf8",
            Constant::Class(_) => "Class",
            Constant::Other => "another constant kind",
            Constant::Unusable => "an unusable slot",
        }
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.data.len());
        let Some(end) = end else {
            return Err(ParseError::Truncated {
                offset: self.pos,
                needed: n - (self.data.len() - self.pos.min(self.data.len())),
            });
        };
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ParseError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ParseError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.take(n).map(|_| ())
    }
}

/// Decodes the JVM's modified UTF-8: NUL is `C0 80`, and characters outside
/// the BMP are stored as two three-byte surrogates.
fn decode_modified_utf8(bytes: &[u8], index: u16) -> Result<String, ParseError> {
    let invalid = || ParseError::InvalidUtf8 { index };
    let continuation = |b: Option<&u8>| match b {
        Some(&b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        _ => Err(invalid()),
    };

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter();
    while let Some(&b) = iter.next() {
        let unit = match b {
            0x01..=0x7F => u16::from(b),
            0xC0..=0xDF => (u16::from(b & 0x1F) << 6) | continuation(iter.next())?,
            0xE0..=0xEF => {
                let hi = continuation(iter.next())?;
                let lo = continuation(iter.next())?;
                (u16::from(b & 0x0F) << 12) | (hi << 6) | lo
            }
            _ => return Err(invalid()),
        };
        units.push(unit);
    }

    String::from_utf16(&units).map_err(|_| invalid())
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn read(reader: &mut Reader<'_>) -> Result<Self, ParseError> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        entries.push(Constant::Unusable);

        let mut index: u16 = 1;
        while index < count {
            let tag = reader.u8()?;
            let constant = match tag {
                TAG_UTF8 => {
                    let len = reader.u16()?;
                    let bytes = reader.take(usize::from(len))?;
                    Constant::Utf8(decode_modified_utf8(bytes, index)?)
                }
                TAG_CLASS => Constant::Class(reader.u16()?),
                TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                    reader.skip(2)?;
                    Constant::Other
                }
                TAG_METHOD_HANDLE => {
                    reader.skip(3)?;
                    Constant::Other
                }
                TAG_INTEGER
                | TAG_FLOAT
                | TAG_FIELDREF
                | TAG_METHODREF
                | TAG_INTERFACE_METHODREF
                | TAG_NAME_AND_TYPE
                | TAG_DYNAMIC
                | TAG_INVOKE_DYNAMIC => {
                    reader.skip(4)?;
                    Constant::Other
                }
                TAG_LONG | TAG_DOUBLE => {
                    reader.skip(8)?;
                    if index + 1 >= count {
                        return Err(ParseError::IndexOutOfRange {
                            index: index + 1,
                            count,
                        });
                    }
                    entries.push(Constant::Other);
                    entries.push(Constant::Unusable);
                    index += 2;
                    continue;
                }
                _ => return Err(ParseError::UnknownTag { tag, index }),
            };
            entries.push(constant);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn count(&self) -> u16 {
        // entries.len() never exceeds the u16 pool count it was read from
        u16::try_from(self.entries.len()).unwrap_or(u16::MAX)
    }

    fn get(&self, index: u16) -> Result<&Constant, ParseError> {
        match self.entries.get(usize::from(index)) {
            Some(Constant::Unusable) | None => Err(ParseError::IndexOutOfRange {
                index,
                count: self.count(),
            }),
            Some(c) => Ok(c),
        }
    }

    fn utf8(&self, index: u16) -> Result<&str, ParseError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            other => Err(ParseError::TagMismatch {
                index,
                expected: "Utf8",
                found: other.describe(),
            }),
        }
    }

    /// Resolves a Class entry to its internal (slash separated) name.
    fn class_name(&self, index: u16) -> Result<&str, ParseError> {
        match self.get(index)? {
            Constant::Class(name_index) => self.utf8(*name_index),
            other => Err(ParseError::TagMismatch {
                index,
                expected: "Class",
                found: other.describe(),
            }),
        }
    }
}

pub fn dotted(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

/// Decodes the class name and directly implemented interfaces from raw
/// class-file bytes.
pub fn parse_class(data: &[u8]) -> Result<CompiledClass, ParseError> {
    let mut reader = Reader::new(data);

    let magic = reader.u32()?;
    if magic != CLASS_MAGIC {
        return Err(ParseError::BadMagic { found: magic });
    }
    // minor_version, major_version
    reader.skip(4)?;

    let pool = ConstantPool::read(&mut reader)?;

    let _access_flags = reader.u16()?;
    let this_class = reader.u16()?;
    let _super_class = reader.u16()?;

    let interfaces_count = reader.u16()?;
    let mut interfaces = Vec::with_capacity(usize::from(interfaces_count));
    for _ in 0..interfaces_count {
        let index = reader.u16()?;
        interfaces.push(dotted(pool.class_name(index)?));
    }

    let name = dotted(pool.class_name(this_class)?);

    Ok(CompiledClass { name, interfaces })
}

/// Builds syntactically valid class files for tests.
#[cfg(test)]
pub(crate) mod fixture {
    pub struct ClassBuilder {
        pool: Vec<Vec<u8>>,
        slots: u16,
        this_class: u16,
        super_class: u16,
        interfaces: Vec<u16>,
    }

    impl ClassBuilder {
        pub fn new(name: &str) -> Self {
            let mut b = Self {
                pool: Vec::new(),
                slots: 1,
                this_class: 0,
                super_class: 0,
                interfaces: Vec::new(),
            };
            b.this_class = b.class(name);
            b.super_class = b.class("java/lang/Object");
            b
        }

        fn push(&mut self, entry: Vec<u8>, width: u16) -> u16 {
            let index = self.slots;
            self.pool.push(entry);
            self.slots += width;
            index
        }

        pub fn utf8(&mut self, s: &str) -> u16 {
            self.raw_utf8(s.as_bytes())
        }

        pub fn raw_utf8(&mut self, bytes: &[u8]) -> u16 {
            let mut e = vec![1u8];
            e.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            e.extend_from_slice(bytes);
            self.push(e, 1)
        }

        pub fn class(&mut self, name: &str) -> u16 {
            let name_index = self.utf8(name);
            let mut e = vec![7u8];
            e.extend_from_slice(&name_index.to_be_bytes());
            self.push(e, 1)
        }

        pub fn long(mut self, value: i64) -> Self {
            let mut e = vec![5u8];
            e.extend_from_slice(&value.to_be_bytes());
            self.push(e, 2);
            self
        }

        pub fn method_handle(mut self) -> Self {
            self.push(vec![15u8, 6, 0, 1], 1);
            self
        }

        pub fn super_class(mut self, name: &str) -> Self {
            self.super_class = self.class(name);
            self
        }

        pub fn implements(mut self, name: &str) -> Self {
            let index = self.class(name);
            self.interfaces.push(index);
            self
        }

        pub fn build(&self) -> Vec<u8> {
            let mut out = Vec::new();
            out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
            out.extend_from_slice(&0u16.to_be_bytes());
            out.extend_from_slice(&52u16.to_be_bytes());
            out.extend_from_slice(&self.slots.to_be_bytes());
            for entry in &self.pool {
                out.extend_from_slice(entry);
            }
            out.extend_from_slice(&0x0021u16.to_be_bytes());
            out.extend_from_slice(&self.this_class.to_be_bytes());
            out.extend_from_slice(&self.super_class.to_be_bytes());
            out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
            for i in &self.interfaces {
                out.extend_from_slice(&i.to_be_bytes());
            }
            // fields, methods, attributes
            out.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
            out
        }
    }
}
