use encoding_rs::Encoding;

/// Text encoding of character fields, recorded as the language driver byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    Windows1250,
    Windows1251,
    Windows1252,
}

impl CodePage {
    pub fn mark(&self) -> u8 {
        match self {
            Self::Windows1250 => 0xC8,
            Self::Windows1251 => 0xC9,
            Self::Windows1252 => 0x03,
        }
    }

    pub fn from_mark(mark: u8) -> Option<Self> {
        match mark {
            0xC8 => Some(Self::Windows1250),
            0xC9 => Some(Self::Windows1251),
            0x03 => Some(Self::Windows1252),
            _ => None,
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        match self {
            Self::Windows1250 => encoding_rs::WINDOWS_1250,
            Self::Windows1251 => encoding_rs::WINDOWS_1251,
            Self::Windows1252 => encoding_rs::WINDOWS_1252,
        }
    }
}
