use bytes::{Buf, BufMut, BytesMut};
use chrono::{Datelike, NaiveDate};

use super::field::NAME_LEN;
use super::{CodePage, DbfError, FieldDescriptor, FieldType};

pub const VERSION_FOXBASE_PLUS: u8 = 0x03;
pub const PREFIX_LEN: usize = 32;
pub const DESCRIPTOR_LEN: usize = 32;
pub const FIELD_TERMINATOR: u8 = 0x0D;
pub const EOF_MARKER: u8 = 0x1A;
pub const RECORD_LIVE: u8 = b' ';
pub const RECORD_DELETED: u8 = b'*';

// Bytes 12..29: reserved, transaction, encryption, multi-user and MDX flags
const FLAGS_RANGE: std::ops::Range<usize> = 12..29;
const TAIL_RANGE: std::ops::Range<usize> = 30..32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    pub version: u8,
    pub last_update: NaiveDate,
    pub record_count: u32,
    pub header_length: u16,
    pub record_length: u16,
    pub code_page_mark: u8,
    pub fields: Vec<FieldDescriptor>,
    /// Flag bytes carried through unchanged on rewrite
    flags: [u8; 17],
    tail: [u8; 2],
}

impl TableHeader {
    pub fn new(
        fields: Vec<FieldDescriptor>,
        code_page: CodePage,
        last_update: NaiveDate,
    ) -> Result<Self, DbfError> {
        if fields.is_empty() {
            return Err(DbfError::InvalidHeader("Table needs at least one field".into()));
        }
        let header_length = PREFIX_LEN + fields.len() * DESCRIPTOR_LEN + 1;
        let record_length = 1 + fields.iter().map(|f| f.length() as usize).sum::<usize>();
        let header_length = u16::try_from(header_length)
            .map_err(|_| DbfError::InvalidHeader("Too many fields".into()))?;
        let record_length = u16::try_from(record_length)
            .map_err(|_| DbfError::InvalidHeader("Record too long".into()))?;

        Ok(Self {
            version: VERSION_FOXBASE_PLUS,
            last_update,
            record_count: 0,
            header_length,
            record_length,
            code_page_mark: code_page.mark(),
            fields,
            flags: [0; 17],
            tail: [0; 2],
        })
    }

    /// Fixed 32-byte prefix: version, update date, counts and lengths
    pub fn encode_prefix(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(PREFIX_LEN);
        buf.put_u8(self.version);
        buf.put_u8((self.last_update.year() - 1900).clamp(0, 255) as u8);
        buf.put_u8(self.last_update.month() as u8);
        buf.put_u8(self.last_update.day() as u8);
        buf.put_u32_le(self.record_count);
        buf.put_u16_le(self.header_length);
        buf.put_u16_le(self.record_length);
        buf.put_slice(&self.flags);
        buf.put_u8(self.code_page_mark);
        buf.put_slice(&self.tail);
        buf
    }

    /// Full header including field descriptors and the terminator
    pub fn encode(&self) -> BytesMut {
        let mut buf = self.encode_prefix();
        buf.reserve(self.fields.len() * DESCRIPTOR_LEN + 1);
        for field in &self.fields {
            let mut name = [0u8; NAME_LEN];
            name[..field.name().len()].copy_from_slice(field.name().as_bytes());
            buf.put_slice(&name);
            buf.put_u8(field.field_type().code());
            buf.put_u32_le(0);
            buf.put_u8(field.length());
            buf.put_u8(field.decimals());
            buf.put_bytes(0, 14);
        }
        buf.put_u8(FIELD_TERMINATOR);
        buf
    }

    /// Parse a full header: prefix, descriptors and terminator
    pub fn decode(bytes: &[u8]) -> Result<Self, DbfError> {
        if bytes.len() < PREFIX_LEN {
            return Err(DbfError::InvalidHeader(format!(
                "Expected at least {PREFIX_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut prefix = &bytes[..PREFIX_LEN];
        let version = prefix.get_u8();
        let year = 1900 + i32::from(prefix.get_u8());
        let month = u32::from(prefix.get_u8());
        let day = u32::from(prefix.get_u8());
        let record_count = prefix.get_u32_le();
        let header_length = prefix.get_u16_le();
        let record_length = prefix.get_u16_le();
        prefix.advance(17);
        let code_page_mark = prefix.get_u8();
        let mut flags = [0u8; 17];
        flags.copy_from_slice(&bytes[FLAGS_RANGE]);
        let mut tail = [0u8; 2];
        tail.copy_from_slice(&bytes[TAIL_RANGE]);

        let last_update = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            DbfError::InvalidHeader(format!("Invalid update date {year}-{month}-{day}"))
        })?;
        if (header_length as usize) < PREFIX_LEN + 1 || bytes.len() < header_length as usize {
            return Err(DbfError::InvalidHeader(format!(
                "Header length {header_length} does not match {} available bytes",
                bytes.len()
            )));
        }

        let mut fields = Vec::new();
        let mut descriptors = &bytes[PREFIX_LEN..header_length as usize];
        while descriptors.first() != Some(&FIELD_TERMINATOR) {
            if descriptors.len() < DESCRIPTOR_LEN {
                return Err(DbfError::InvalidHeader("Truncated field descriptor".into()));
            }
            let raw_name = &descriptors[..NAME_LEN];
            let name_end = raw_name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
            let name = std::str::from_utf8(&raw_name[..name_end])
                .map_err(|_| DbfError::InvalidHeader("Field name is not ASCII".into()))?;
            descriptors.advance(NAME_LEN);
            let field_type = FieldType::from_code(descriptors.get_u8())?;
            descriptors.advance(4);
            let length = descriptors.get_u8();
            let decimals = descriptors.get_u8();
            descriptors.advance(14);

            fields.push(FieldDescriptor::new(name, field_type, length, decimals)?);
        }

        let expected_record = 1 + fields.iter().map(|f| f.length() as usize).sum::<usize>();
        if expected_record != record_length as usize {
            return Err(DbfError::InvalidHeader(format!(
                "Record length {record_length} does not match fields ({expected_record})"
            )));
        }

        Ok(Self {
            version,
            last_update,
            record_count,
            header_length,
            record_length,
            code_page_mark,
            fields,
            flags,
            tail,
        })
    }

    pub fn code_page(&self) -> Option<CodePage> {
        CodePage::from_mark(self.code_page_mark)
    }

    pub fn record_offset(&self, index: u32) -> u64 {
        u64::from(self.header_length) + u64::from(index) * u64::from(self.record_length)
    }

    /// Header, records and the trailing end-of-file marker
    pub fn file_size(&self) -> u64 {
        self.record_offset(self.record_count) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::numeric("ADR", 10).unwrap(),
            FieldDescriptor::date("DATEW").unwrap(),
            FieldDescriptor::character("TIMEW", 10).unwrap(),
        ]
    }

    fn header() -> TableHeader {
        let date = NaiveDate::from_ymd_opt(2024, 11, 11).unwrap();
        TableHeader::new(fields(), CodePage::Windows1250, date).unwrap()
    }

    #[test]
    fn test_lengths() {
        let header = header();
        assert_eq!(header.header_length, 32 + 3 * 32 + 1);
        assert_eq!(header.record_length, 1 + 10 + 8 + 10);
        assert_eq!(header.encode().len(), header.header_length as usize);
    }

    #[test]
    fn test_prefix_layout() {
        let mut header = header();
        header.record_count = 258;
        let prefix = header.encode_prefix();

        assert_eq!(prefix.len(), PREFIX_LEN);
        assert_eq!(prefix[0], VERSION_FOXBASE_PLUS);
        assert_eq!(&prefix[1..4], &[124, 11, 11]);
        assert_eq!(&prefix[4..8], &[2, 1, 0, 0]);
        assert_eq!(prefix[29], 0xC8);
    }

    #[test]
    fn test_descriptor_layout() {
        let bytes = header().encode();
        let first = &bytes[PREFIX_LEN..PREFIX_LEN + DESCRIPTOR_LEN];
        assert_eq!(&first[..4], b"ADR\0");
        assert_eq!(first[11], b'N');
        assert_eq!(first[16], 10);
        assert_eq!(bytes[bytes.len() - 1], FIELD_TERMINATOR);
    }

    #[test]
    fn test_decode_restores_header() {
        let mut header = header();
        header.record_count = 3;
        let bytes = header.encode();

        let decoded = TableHeader::decode(&bytes).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.code_page(), Some(CodePage::Windows1250));
    }

    #[test]
    fn test_foreign_flags_survive_rewrite() {
        let mut bytes = header().encode();
        bytes[14] = 0x01; // incomplete transaction
        bytes[28] = 0x01; // production MDX
        bytes[30] = 0x7F;

        let mut decoded = TableHeader::decode(&bytes).unwrap();
        decoded.record_count = 9;
        let prefix = decoded.encode_prefix();

        assert_eq!(&prefix[4..8], &[9, 0, 0, 0]);
        assert_eq!(&prefix[12..29], &bytes[12..29]);
        assert_eq!(prefix[30], 0x7F);
        assert_eq!(prefix[29], 0xC8);
    }

    #[test]
    fn test_decode_rejects_short_input() {
        assert!(matches!(
            TableHeader::decode(&[0x03, 124, 1]),
            Err(DbfError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_decode_rejects_inconsistent_record_length() {
        let mut bytes = header().encode();
        bytes[10] = 99;
        assert!(TableHeader::decode(&bytes).is_err());
    }

    #[test]
    fn test_file_size() {
        let mut header = header();
        header.record_count = 2;
        assert_eq!(header.file_size(), 129 + 2 * 29 + 1);
    }
}
