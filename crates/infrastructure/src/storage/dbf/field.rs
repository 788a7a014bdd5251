use chrono::NaiveDate;
use encoding_rs::Encoding;

use super::DbfError;

pub(crate) const NAME_LEN: usize = 11;
const DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Numeric,
    Date,
}

impl FieldType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Character => b'C',
            Self::Numeric => b'N',
            Self::Date => b'D',
        }
    }

    pub fn from_code(code: u8) -> Result<Self, DbfError> {
        match code {
            b'C' => Ok(Self::Character),
            b'N' => Ok(Self::Numeric),
            b'D' => Ok(Self::Date),
            other => Err(DbfError::InvalidField(format!(
                "Unsupported field type {:?}",
                other as char
            ))),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Numeric => "numeric",
            Self::Date => "date",
        }
    }
}

/// Column definition: name, type and fixed width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    field_type: FieldType,
    length: u8,
    decimals: u8,
}

impl FieldDescriptor {
    pub fn new(
        name: &str,
        field_type: FieldType,
        length: u8,
        decimals: u8,
    ) -> Result<Self, DbfError> {
        if name.is_empty() || name.len() > NAME_LEN - 1 {
            return Err(DbfError::InvalidField(format!(
                "Field name {name:?} must be 1 to {} characters",
                NAME_LEN - 1
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DbfError::InvalidField(format!(
                "Field name {name:?} must be ASCII alphanumeric"
            )));
        }

        let length = match field_type {
            FieldType::Date => 8,
            FieldType::Character if length == 0 || length > 254 => {
                return Err(DbfError::InvalidField(format!(
                    "Character field {name} length {length} out of range"
                )));
            }
            FieldType::Numeric if length == 0 || length > 20 => {
                return Err(DbfError::InvalidField(format!(
                    "Numeric field {name} length {length} out of range"
                )));
            }
            _ => length,
        };
        if field_type == FieldType::Numeric && decimals > 0 && decimals >= length - 1 {
            return Err(DbfError::InvalidField(format!(
                "Numeric field {name} has too many decimals"
            )));
        }
        let decimals = if field_type == FieldType::Numeric {
            decimals
        } else {
            0
        };

        Ok(Self {
            name: name.to_ascii_uppercase(),
            field_type,
            length,
            decimals,
        })
    }

    pub fn character(name: &str, length: u8) -> Result<Self, DbfError> {
        Self::new(name, FieldType::Character, length, 0)
    }

    pub fn numeric(name: &str, length: u8) -> Result<Self, DbfError> {
        Self::new(name, FieldType::Numeric, length, 0)
    }

    pub fn date(name: &str) -> Result<Self, DbfError> {
        Self::new(name, FieldType::Date, 8, 0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Write `value` into `out` as exactly `length` bytes
    pub(crate) fn encode_value(
        &self,
        value: &FieldValue,
        encoding: &'static Encoding,
        out: &mut Vec<u8>,
    ) -> Result<(), DbfError> {
        let width = self.length as usize;
        let bytes: Vec<u8> = match (self.field_type, value) {
            (_, FieldValue::Null) => vec![b' '; width],
            (FieldType::Numeric, FieldValue::Numeric(n)) => {
                let text = if self.decimals > 0 {
                    format!("{}.{}", n, "0".repeat(self.decimals as usize))
                } else {
                    n.to_string()
                };
                if text.len() > width {
                    return Err(self.too_wide());
                }
                format!("{:>width$}", text).into_bytes()
            }
            (FieldType::Date, FieldValue::Date(d)) => {
                d.format(DATE_FORMAT).to_string().into_bytes()
            }
            (FieldType::Character, FieldValue::Character(s)) => {
                let (encoded, _, unmappable) = encoding.encode(s);
                if unmappable {
                    return Err(DbfError::Unmappable {
                        field: self.name.clone(),
                        encoding: encoding.name(),
                    });
                }
                if encoded.len() > width {
                    return Err(self.too_wide());
                }
                let mut padded = encoded.into_owned();
                padded.resize(width, b' ');
                padded
            }
            (expected, _) => {
                return Err(DbfError::TypeMismatch {
                    field: self.name.clone(),
                    expected: expected.describe(),
                });
            }
        };

        out.extend_from_slice(&bytes);
        Ok(())
    }

    /// Read this field's slot of a record. Padding is trimmed; blanks decode as `Null`.
    pub(crate) fn decode_value(
        &self,
        raw: &[u8],
        encoding: &'static Encoding,
    ) -> Result<FieldValue, DbfError> {
        match self.field_type {
            FieldType::Character => {
                let (text, _) = encoding.decode_without_bom_handling(raw);
                let trimmed = text.trim_end_matches([' ', '\0']);
                Ok(FieldValue::Character(trimmed.to_string()))
            }
            FieldType::Numeric => {
                let text = ascii_trim(raw).map_err(|e| self.invalid(e.to_string()))?;
                if text.is_empty() {
                    return Ok(FieldValue::Null);
                }
                let integer = text.split('.').next().unwrap_or_default();
                integer
                    .parse::<i64>()
                    .map(FieldValue::Numeric)
                    .map_err(|e| self.invalid(e.to_string()))
            }
            FieldType::Date => {
                let text = ascii_trim(raw).map_err(|e| self.invalid(e.to_string()))?;
                if text.is_empty() {
                    return Ok(FieldValue::Null);
                }
                NaiveDate::parse_from_str(text, DATE_FORMAT)
                    .map(FieldValue::Date)
                    .map_err(|e| self.invalid(e.to_string()))
            }
        }
    }

    fn too_wide(&self) -> DbfError {
        DbfError::ValueTooWide {
            field: self.name.clone(),
            width: self.length,
        }
    }

    fn invalid(&self, reason: String) -> DbfError {
        DbfError::InvalidValue {
            field: self.name.clone(),
            reason,
        }
    }
}

fn ascii_trim(raw: &[u8]) -> Result<&str, std::str::Utf8Error> {
    Ok(std::str::from_utf8(raw)?.trim_matches([' ', '\0']))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Character(String),
    Numeric(i64),
    Date(NaiveDate),
    Null,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Character(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Character(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}
