use crate::types::Error;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Little-endian reader over a byte slice, with .NET `BinaryReader` string encoding.
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BinaryReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.position();
        let end = start.checked_add(n)?;
        let bytes = data.get(start..end)?;
        self.cursor.set_position(end as u64);
        Some(bytes)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.cursor.read_u8().ok()
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.cursor.read_i32::<LittleEndian>().ok()
    }

    /// Length prefix: 7 bits per byte, least significant group first, high bit set on all but the last byte.
    pub fn read_7bit_encoded_int(&mut self) -> Option<u32> {
        let mut result: u32 = 0;

        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            result |= u32::from(byte & 0x7F) << shift;

            if byte & 0x80 == 0 {
                return Some(result);
            }
        }

        None
    }

    /// A length-prefixed UTF-8 string. `None` if truncated or not UTF-8.
    pub fn read_string(&mut self) -> Option<String> {
        let len = self.read_7bit_encoded_int()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).ok()
    }
}

/// The leading, translatable part of a `.menu` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuHeader {
    pub magic: String,
    pub version: i32,
    pub path: String,
    pub name: String,
    /// Always lower-case.
    pub category: String,
    pub info: String,
}

impl MenuHeader {
    /// Reads the header of the `.menu` file `file`.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedMenu`] - if the data is truncated or a string isn't UTF-8.
    pub fn parse(file: &str, data: &[u8]) -> Result<Self, Error> {
        let mut reader = BinaryReader::new(data);

        let magic = read_field(&mut reader, file, "magic")?;
        let position = reader.position();
        let version = reader
            .read_i32()
            .ok_or_else(|| malformed(file, "version", position))?;
        let path = read_field(&mut reader, file, "path")?;
        let name = read_field(&mut reader, file, "name")?;
        let category = read_field(&mut reader, file, "category")?.to_lowercase();
        let info = read_field(&mut reader, file, "info")?;

        Ok(Self {
            magic,
            version,
            path,
            name,
            category,
            info,
        })
    }
}

fn malformed(file: &str, field: &str, position: usize) -> Error {
    Error::MalformedMenu {
        file: file.to_owned(),
        reason: format!("couldn't read {field} at byte {position}"),
    }
}

fn read_field(
    reader: &mut BinaryReader<'_>,
    file: &str,
    field: &str,
) -> Result<String, Error> {
    let position = reader.position();
    reader
        .read_string()
        .ok_or_else(|| malformed(file, field, position))
}
