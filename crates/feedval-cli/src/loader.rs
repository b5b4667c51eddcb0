//! # Document Loader
//!
//! Reads feed configuration files into the [`Document`] model. The format
//! is chosen by file extension: `.yaml` / `.yml` for YAML, `.json` for JSON.
//!
//! YAML has a richer data model than JSON. The conversion keeps integers as
//! integers, drops tags in favour of their inner value, and rejects what the
//! document model cannot hold: non-finite floats and non-scalar map keys.

use std::path::{Path, PathBuf};

use feedval_core::Document;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Error loading a document file. Never reaches the validation layers.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot convert {} to a document: {source}", path.display())]
    Conversion {
        path: PathBuf,
        #[source]
        source: ConversionError,
    },

    #[error("unsupported file type {}: expected .yaml, .yml or .json", path.display())]
    UnsupportedExtension { path: PathBuf },
}

/// Serialization format of a document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Pick the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Load a document from disk.
pub fn load_document(path: &Path) -> Result<Document, LoaderError> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        LoaderError::UnsupportedExtension {
            path: path.to_path_buf(),
        }
    })?;
    let content = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_document(&content, format, path)?;
    debug!(path = %path.display(), entries = document.len(), "document loaded");
    Ok(document)
}

/// Parse document text. `path` is used only for error messages.
pub fn parse_document(
    content: &str,
    format: DocumentFormat,
    path: &Path,
) -> Result<Document, LoaderError> {
    let value = match format {
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|source| LoaderError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })?;
            yaml_to_json_value(yaml).map_err(|source| LoaderError::Conversion {
                path: path.to_path_buf(),
                source,
            })?
        }
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|source| LoaderError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
    };
    Ok(Document::new(value))
}

/// Why a YAML tree has no document equivalent. `at` is the JSON pointer
/// of the offending node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("{}: number {repr} has no document representation", shown(.at))]
    NonFiniteNumber { at: String, repr: String },

    #[error("{}: map keys must be scalars, found {kind}", shown(.at))]
    NonScalarKey { at: String, kind: &'static str },
}

fn shown(at: &str) -> &str {
    if at.is_empty() {
        "(root)"
    } else {
        at
    }
}

/// Convert a YAML tree into the JSON value model.
fn yaml_to_json_value(yaml: serde_yaml::Value) -> Result<Value, ConversionError> {
    YamlConverter::default().convert(yaml)
}

/// Walks a YAML tree, tracking the pointer of the node being converted.
#[derive(Default)]
struct YamlConverter {
    pointer: String,
}

impl YamlConverter {
    fn convert(&mut self, node: serde_yaml::Value) -> Result<Value, ConversionError> {
        use serde_yaml::Value as Yaml;

        Ok(match node {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => self.number(&n)?,
            Yaml::String(s) => Value::String(s),
            Yaml::Sequence(items) => Value::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| self.child(&index.to_string(), item))
                    .collect::<Result<_, _>>()?,
            ),
            Yaml::Mapping(map) => {
                let mut object = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    let key = self.key(key)?;
                    let item = self.child(&key, item)?;
                    object.insert(key, item);
                }
                Value::Object(object)
            }
            Yaml::Tagged(tagged) => self.convert(tagged.value)?,
        })
    }

    fn child(&mut self, segment: &str, node: serde_yaml::Value) -> Result<Value, ConversionError> {
        let parent_len = self.pointer.len();
        self.pointer.push('/');
        self.pointer
            .push_str(&segment.replace('~', "~0").replace('/', "~1"));
        let converted = self.convert(node);
        self.pointer.truncate(parent_len);
        converted
    }

    fn number(&self, n: &serde_yaml::Number) -> Result<Value, ConversionError> {
        if let Some(i) = n.as_i64() {
            return Ok(Value::from(i));
        }
        if let Some(u) = n.as_u64() {
            return Ok(Value::from(u));
        }
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| ConversionError::NonFiniteNumber {
                at: self.pointer.clone(),
                repr: n.to_string(),
            })
    }

    fn key(&self, key: serde_yaml::Value) -> Result<String, ConversionError> {
        use serde_yaml::Value as Yaml;

        let kind = match key {
            Yaml::String(s) => return Ok(s),
            Yaml::Number(n) => return Ok(n.to_string()),
            Yaml::Bool(b) => return Ok(b.to_string()),
            Yaml::Tagged(tagged) => return self.key(tagged.value),
            Yaml::Null => "null",
            Yaml::Sequence(_) => "a sequence",
            Yaml::Mapping(_) => "a mapping",
        };
        Err(ConversionError::NonScalarKey {
            at: self.pointer.clone(),
            kind,
        })
    }
}
