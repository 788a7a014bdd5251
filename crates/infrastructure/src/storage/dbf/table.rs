use std::fmt;
use std::fs::{File, OpenOptions, TryLockError};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use encoding_rs::Encoding;

use super::header::{EOF_MARKER, PREFIX_LEN, RECORD_DELETED, RECORD_LIVE};
use super::{CodePage, DbfError, FieldDescriptor, FieldValue, TableHeader};

/// Field values addressed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<(String, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self
            .values
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name.to_ascii_uppercase(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    pub last_modified: NaiveDate,
    pub columns_count: usize,
    pub records_count: u32,
    pub file_size: u64,
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Last modified: {}", self.last_modified)?;
        writeln!(f, "Columns count: {}", self.columns_count)?;
        writeln!(f, "Record count: {}", self.records_count)?;
        write!(f, "File size: {}", self.file_size)
    }
}

/// An open table file. Writable handles hold an exclusive OS lock until dropped.
pub struct DbfTable {
    path: PathBuf,
    file: File,
    header: TableHeader,
    encoding: &'static Encoding,
    writable: bool,
}

impl DbfTable {
    /// Create a new, empty table. Fails if the file already exists.
    pub fn create(
        path: &Path,
        fields: Vec<FieldDescriptor>,
        code_page: CodePage,
    ) -> Result<Self, DbfError> {
        let header = TableHeader::new(fields, code_page, Local::now().date_naive())?;
        let file = create_file(path, |file| {
            lock(file, path, true)?;
            file.write_all(&header.encode())?;
            file.write_all(&[EOF_MARKER])?;
            file.sync_all()?;
            Ok(())
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            encoding: code_page.encoding(),
            writable: true,
        })
    }

    /// Open for appending, taking the exclusive write lock
    pub fn open(path: &Path) -> Result<Self, DbfError> {
        Self::open_with(path, true)
    }

    pub fn open_read_only(path: &Path) -> Result<Self, DbfError> {
        Self::open_with(path, false)
    }

    fn open_with(path: &Path, writable: bool) -> Result<Self, DbfError> {
        let mut file = OpenOptions::new().read(true).write(writable).open(path)?;
        lock(&file, path, writable)?;

        let header = read_header(&mut file)?;
        // Tables without a known language driver are read as Western European
        let encoding = header
            .code_page()
            .unwrap_or(CodePage::Windows1252)
            .encoding();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            encoding,
            writable,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn record_count(&self) -> u32 {
        self.header.record_count
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            last_modified: self.header.last_update,
            columns_count: self.header.fields.len(),
            records_count: self.header.record_count,
            file_size: self.header.file_size(),
        }
    }

    /// Lay out a row in column order. Columns missing from `row` are left blank.
    pub fn encode_row(&self, row: &Row) -> Result<Vec<u8>, DbfError> {
        for (name, _) in &row.values {
            if !self
                .header
                .fields
                .iter()
                .any(|f| f.name().eq_ignore_ascii_case(name))
            {
                return Err(DbfError::UnknownField(name.clone()));
            }
        }

        let mut record = Vec::with_capacity(self.header.record_length as usize);
        record.push(RECORD_LIVE);
        for field in &self.header.fields {
            let value = row.get(field.name()).unwrap_or(&FieldValue::Null);
            field.encode_value(value, self.encoding, &mut record)?;
        }
        Ok(record)
    }

    /// Append an encoded record and update the header. Returns the record index.
    pub fn append_encoded(&mut self, record: &[u8]) -> Result<u32, DbfError> {
        if !self.writable {
            return Err(DbfError::ReadOnly);
        }
        let expected = self.header.record_length as usize;
        if record.len() != expected {
            return Err(DbfError::RecordLength {
                expected,
                actual: record.len(),
            });
        }

        let index = self.header.record_count;
        self.file
            .seek(SeekFrom::Start(self.header.record_offset(index)))?;
        self.file.write_all(record)?;
        self.file.write_all(&[EOF_MARKER])?;

        self.header.record_count += 1;
        self.header.last_update = Local::now().date_naive();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.header.encode_prefix())?;
        self.file.sync_data()?;

        Ok(index)
    }

    pub fn append(&mut self, row: &Row) -> Result<u32, DbfError> {
        let record = self.encode_row(row)?;
        self.append_encoded(&record)
    }

    /// Read one record. Returns `None` for rows flagged as deleted.
    pub fn read_row(&mut self, index: u32) -> Result<Option<Row>, DbfError> {
        if index >= self.header.record_count {
            return Err(DbfError::RecordOutOfRange(index));
        }

        let mut record = vec![0u8; self.header.record_length as usize];
        self.file
            .seek(SeekFrom::Start(self.header.record_offset(index)))?;
        self.file.read_exact(&mut record)?;
        if record[0] == RECORD_DELETED {
            return Ok(None);
        }

        let mut row = Row::new();
        let mut offset = 1;
        for field in &self.header.fields {
            let width = field.length() as usize;
            let value = field.decode_value(&record[offset..offset + width], self.encoding)?;
            row.set(field.name(), value);
            offset += width;
        }
        Ok(Some(row))
    }

    /// All live rows in file order
    pub fn rows(&mut self) -> Result<Vec<Row>, DbfError> {
        let mut rows = Vec::with_capacity(self.header.record_count as usize);
        for index in 0..self.header.record_count {
            if let Some(row) = self.read_row(index)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Flush and release the lock
    pub fn close(self) -> Result<(), DbfError> {
        if self.writable {
            self.file.sync_all()?;
        }
        self.file.unlock()?;
        Ok(())
    }
}

/// Create `path` exclusively and fill it. A file that could not be fully
/// written is removed so the next attempt starts clean.
fn create_file(
    path: &Path,
    fill: impl FnOnce(&mut File) -> Result<(), DbfError>,
) -> Result<File, DbfError> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)?;

    match fill(&mut file) {
        Ok(()) => Ok(file),
        Err(e) => {
            drop(file);
            if let Err(remove_err) = std::fs::remove_file(path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "Failed to remove partially written table"
                );
            }
            Err(e)
        }
    }
}

fn lock(file: &File, path: &Path, exclusive: bool) -> Result<(), DbfError> {
    let result = if exclusive {
        file.try_lock()
    } else {
        file.try_lock_shared()
    };
    match result {
        Ok(()) => Ok(()),
        Err(TryLockError::WouldBlock) => Err(DbfError::Locked(path.to_path_buf())),
        Err(TryLockError::Error(e)) => Err(DbfError::Io(e)),
    }
}

fn read_header(file: &mut File) -> Result<TableHeader, DbfError> {
    let mut bytes = vec![0u8; PREFIX_LEN];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut bytes).map_err(|e| {
        DbfError::InvalidHeader(format!("File too short for a table header: {e}"))
    })?;

    let header_length = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    if header_length > PREFIX_LEN {
        bytes.resize(header_length, 0);
        file.read_exact(&mut bytes[PREFIX_LEN..])
            .map_err(|e| DbfError::InvalidHeader(format!("Truncated field descriptors: {e}")))?;
    }

    TableHeader::decode(&bytes)
}
