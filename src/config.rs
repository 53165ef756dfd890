//! Run-time configuration.
//!
//! The address width is a build-time choice (the `ea64` feature). What is
//! left to configure at run time is how foreign strings are copied out of
//! engine memory.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{MarshalError, Result};

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

/// Default bound on the bytes scanned for one foreign C string.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 1024;

/// Text encoding of names stored by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameEncoding {
    /// ANSI code page names, as the engine stores them on Windows hosts.
    #[default]
    Windows1252,
    /// UTF-8, with invalid sequences replaced by U+FFFD.
    Utf8Lossy,
}

impl NameEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            NameEncoding::Windows1252 => "windows_1252",
            NameEncoding::Utf8Lossy => "utf8_lossy",
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "windows_1252" | "windows-1252" | "cp1252" => Ok(NameEncoding::Windows1252),
            "utf8_lossy" | "utf-8" | "utf8" => Ok(NameEncoding::Utf8Lossy),
            other => Err(MarshalError::Config(format!("unknown name encoding: {other}"))),
        }
    }

    /// Decode raw name bytes.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            NameEncoding::Windows1252 => {
                let (text, had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
                if had_errors {
                    debug!(len = bytes.len(), "replaced undecodable bytes in name");
                }
                text.into_owned()
            }
            NameEncoding::Utf8Lossy => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Configuration of the marshaling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "python-ext", pyclass)]
#[serde(default)]
pub struct MarshalConfig {
    /// Most bytes scanned when copying a NUL-terminated name.
    pub max_name_length: usize,
    /// Encoding used to turn copied name bytes into text.
    pub name_encoding: NameEncoding,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            name_encoding: NameEncoding::default(),
        }
    }
}

impl MarshalConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MarshalConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading marshal configuration");
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_name_length == 0 {
            warn!("rejecting configuration with max_name_length = 0");
            return Err(MarshalError::Config(
                "max_name_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Change the name length cap, leaving the config untouched when the
    /// new value fails validation.
    pub fn set_max_name_length_checked(&mut self, max_name_length: usize) -> Result<()> {
        let candidate = Self {
            max_name_length,
            ..self.clone()
        };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Decode name bytes already copied out of engine memory.
    pub fn decode_name(&self, bytes: &[u8]) -> String {
        self.name_encoding.decode(bytes)
    }
}

#[cfg(feature = "python-ext")]
#[pymethods]
impl MarshalConfig {
    #[new]
    #[pyo3(signature = (max_name_length=DEFAULT_MAX_NAME_LENGTH, name_encoding="windows_1252"))]
    pub fn py_new(max_name_length: usize, name_encoding: &str) -> PyResult<Self> {
        let config = Self {
            max_name_length,
            name_encoding: NameEncoding::parse(name_encoding)?,
        };
        config.validate()?;
        Ok(config)
    }

    #[getter]
    pub fn get_max_name_length(&self) -> usize {
        self.max_name_length
    }

    #[setter]
    pub fn set_max_name_length(&mut self, v: usize) -> PyResult<()> {
        Ok(self.set_max_name_length_checked(v)?)
    }

    #[getter]
    pub fn get_name_encoding(&self) -> &'static str {
        self.name_encoding.as_str()
    }

    #[setter]
    pub fn set_name_encoding(&mut self, v: &str) -> PyResult<()> {
        self.name_encoding = NameEncoding::parse(v)?;
        Ok(())
    }

    #[staticmethod]
    #[pyo3(name = "from_json")]
    pub fn py_from_json(json: &str) -> PyResult<Self> {
        Ok(Self::from_json_str(json)?)
    }

    #[pyo3(name = "to_json")]
    pub fn py_to_json(&self) -> PyResult<String> {
        Ok(self.to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarshalConfig::default();
        assert_eq!(config.max_name_length, 1024);
        assert_eq!(config.name_encoding, NameEncoding::Windows1252);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MarshalConfig::from_json_str(r#"{"name_encoding":"utf8_lossy"}"#).unwrap();
        assert_eq!(config.name_encoding, NameEncoding::Utf8Lossy);
        assert_eq!(config.max_name_length, DEFAULT_MAX_NAME_LENGTH);
    }

    #[test]
    fn test_set_max_name_length_validates() {
        let mut config = MarshalConfig::default();
        config.set_max_name_length_checked(64).unwrap();
        assert_eq!(config.max_name_length, 64);

        let err = config.set_max_name_length_checked(0).unwrap_err();
        assert!(matches!(err, MarshalError::Config(_)));
        assert_eq!(config.max_name_length, 64);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            MarshalConfig::from_json_str(r#"{"max_name_length":0}"#),
            Err(MarshalError::Config(_))
        ));
        assert!(matches!(
            MarshalConfig::from_json_str("{not json"),
            Err(MarshalError::Serialization(_))
        ));
        assert!(matches!(
            MarshalConfig::from_json_str(r#"{"name_encoding":"ebcdic"}"#),
            Err(MarshalError::Serialization(_))
        ));
    }

    #[test]
    fn test_decode_windows_1252() {
        let config = MarshalConfig::default();
        // 0xE9 is e-acute and 0x80 the euro sign in code page 1252
        assert_eq!(config.decode_name(b"caf\xE9"), "caf\u{e9}");
        assert_eq!(config.decode_name(b"\x80"), "\u{20ac}");
    }

    #[test]
    fn test_decode_utf8_lossy() {
        let config = MarshalConfig {
            name_encoding: NameEncoding::Utf8Lossy,
            ..MarshalConfig::default()
        };
        assert_eq!(config.decode_name("caf\u{e9}".as_bytes()), "caf\u{e9}");
        assert_eq!(config.decode_name(b"a\xFFb"), "a\u{fffd}b");
    }

    #[test]
    fn test_encoding_names() {
        for encoding in [NameEncoding::Windows1252, NameEncoding::Utf8Lossy] {
            assert_eq!(NameEncoding::parse(encoding.as_str()).unwrap(), encoding);
        }
        assert!(NameEncoding::parse("latin9").is_err());
    }
}
