//! Decoding of NBT data into a generic tree value.
//!
//! NBT is the self-describing binary tree format Minecraft stores nearly
//! everything in. [`from_reader`] decodes one named tag, which for every
//! file this crate cares about is the root compound of a chunk, a player
//! data file, or `level.dat`.

use std::convert::TryFrom;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use indexmap::IndexMap;

use crate::{Error, Result};

/// An NBT tag type. This does not carry the value or the name of the data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Tag {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64.
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// Represents an array of Byte (i8).
    ByteArray = 7,
    /// Represents a Unicode string.
    String = 8,
    /// Represents a list of other values, all of one declared element type.
    List = 9,
    /// Represents a struct-like structure of named values.
    Compound = 10,
    /// Represents an array of Int (i32).
    IntArray = 11,
    /// Represents an array of Long (i64).
    LongArray = 12,
}

// Crates exist to generate this code for us, but the tags will very rarely
// change, so writing it out saves the compile time.
impl TryFrom<u8> for Tag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        use Tag::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            t => return Err(Error::InvalidTag(t)),
        })
    }
}

/// Compound children keyed by name, in the order they appeared on disk.
pub type CompoundMap = IndexMap<String, Value>;

/// Value is a complete NBT value. It owns its data. Compounds and lists are
/// recursively decoded. This type preserves all the information from the
/// original NBT except the name of the root tag.
///
/// A list keeps the element tag it declared on disk, so an empty list still
/// knows what it would have contained.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Tag, Vec<Value>),
    Compound(CompoundMap),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

// Corrupted input can declare arbitrarily deep nesting. The decoder recurses
// per compound/list level, so cap the depth well below stack exhaustion.
const MAX_DEPTH: usize = 512;

/// Decode a single named tag from `reader`, eg the root compound of a chunk.
/// The name of the root tag is discarded.
pub fn from_reader<R: Read>(mut reader: R) -> Result<Value> {
    let tag = Tag::try_from(reader.read_u8()?)?;
    if tag == Tag::End {
        return Err(Error::InvalidTag(Tag::End as u8));
    }

    let _root_name = read_string(&mut reader)?;
    read_payload(&mut reader, tag, MAX_DEPTH)
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;

    let mut buf = vec![0; len];
    reader.read_exact(&mut buf[..])?;

    // NBT strings are Java's modified UTF-8, not quite real UTF-8.
    Ok(cesu8::from_java_cesu8(&buf[..])
        .map_err(|_| Error::NonunicodeString)?
        .into_owned())
}

fn read_array_len<R: Read>(reader: &mut R) -> Result<usize> {
    let len = reader.read_i32::<BigEndian>()?;
    usize::try_from(len).map_err(|_| Error::InvalidListTag)
}

fn read_payload<R: Read>(reader: &mut R, tag: Tag, depth: usize) -> Result<Value> {
    if depth == 0 {
        return Err(Error::DepthLimit);
    }

    Ok(match tag {
        Tag::End => return Err(Error::InvalidTag(Tag::End as u8)),
        Tag::Byte => Value::Byte(reader.read_i8()?),
        Tag::Short => Value::Short(reader.read_i16::<BigEndian>()?),
        Tag::Int => Value::Int(reader.read_i32::<BigEndian>()?),
        Tag::Long => Value::Long(reader.read_i64::<BigEndian>()?),
        Tag::Float => Value::Float(reader.read_f32::<BigEndian>()?),
        Tag::Double => Value::Double(reader.read_f64::<BigEndian>()?),
        Tag::String => Value::String(read_string(reader)?),
        Tag::ByteArray => {
            let size = read_array_len(reader)?;
            let mut buf = vec![0u8; size];
            reader.read_exact(&mut buf[..])?;
            Value::ByteArray(buf.into_iter().map(|b| b as i8).collect())
        }
        Tag::IntArray => {
            let size = read_array_len(reader)?;
            let mut buf = vec![0i32; size];
            for v in buf.iter_mut() {
                *v = reader.read_i32::<BigEndian>()?;
            }
            Value::IntArray(buf)
        }
        Tag::LongArray => {
            let size = read_array_len(reader)?;
            let mut buf = vec![0i64; size];
            for v in buf.iter_mut() {
                *v = reader.read_i64::<BigEndian>()?;
            }
            Value::LongArray(buf)
        }
        Tag::List => {
            let element_tag = Tag::try_from(reader.read_u8()?)?;
            let size = reader.read_i32::<BigEndian>()?;

            // Empty lists are written with an End element tag. A non-empty
            // list of End makes no sense, nor does a negative size.
            if size < 0 || (element_tag == Tag::End && size > 0) {
                return Err(Error::InvalidListTag);
            }

            let mut elements = Vec::new();
            for _ in 0..size {
                elements.push(read_payload(reader, element_tag, depth - 1)?);
            }
            Value::List(element_tag, elements)
        }
        Tag::Compound => {
            let mut compound = CompoundMap::new();
            loop {
                let tag = Tag::try_from(reader.read_u8()?)?;
                if tag == Tag::End {
                    break;
                }

                let name = read_string(reader)?;
                let value = read_payload(reader, tag, depth - 1)?;
                compound.insert(name, value);
            }
            Value::Compound(compound)
        }
    })
}
