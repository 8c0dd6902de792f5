//! Block URIs.
//!
//! A block URI names a block family and, optionally, one concrete block in
//! it: `module:family`, `module:family:shape_module:shape`, each optionally
//! followed by `.IDENTIFIER` (e.g. `engine:torch.LEFT`, `engine:fence.12`).
//! Module and name parts are validated and ordered so URIs can be used as
//! stable persistence keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Module used when a URI omits one.
pub const DEFAULT_MODULE: &str = "engine";

/// Error returned when parsing an invalid [`BlockUri`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid block uri `{input}`: {reason}")]
pub struct BlockUriError {
    input: String,
    reason: &'static str,
}

impl BlockUriError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }

    /// Why the input was rejected.
    pub fn reason(&self) -> &str {
        self.reason
    }
}

/// Identifies a block family, or one block of a family.
///
/// Ordering is lexical by `(module, family, shape, identifier)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockUri {
    module: String,
    family: String,
    shape: Option<(String, String)>,
    identifier: Option<String>,
}

impl BlockUri {
    /// Parse a URI, using [`DEFAULT_MODULE`] when the module is omitted.
    pub fn parse(input: &str) -> Result<Self, BlockUriError> {
        Self::parse_with_default_module(input, DEFAULT_MODULE)
    }

    /// Parse a URI using a caller-provided default module.
    pub fn parse_with_default_module(
        input: &str,
        default_module: &str,
    ) -> Result<Self, BlockUriError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(BlockUriError::new(input, "empty"));
        }

        let (body, identifier) = match trimmed.split_once('.') {
            Some((body, ident)) => (body, Some(ident)),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = body.split(':').collect();
        let (module, family, shape) = match parts.as_slice() {
            [family] => (default_module, *family, None),
            [module, family] => (*module, *family, None),
            [module, family, shape_module, shape] => {
                (*module, *family, Some((*shape_module, *shape)))
            }
            _ => return Err(BlockUriError::new(input, "expected 1, 2 or 4 `:` separated parts")),
        };

        validate_name(input, module)?;
        validate_name(input, family)?;
        if let Some((shape_module, shape)) = shape {
            validate_name(input, shape_module)?;
            validate_name(input, shape)?;
        }
        if let Some(ident) = identifier {
            validate_identifier(input, ident)?;
        }

        Ok(Self {
            module: module.to_string(),
            family: family.to_string(),
            shape: shape.map(|(m, s)| (m.to_string(), s.to_string())),
            identifier: identifier.map(str::to_string),
        })
    }

    /// Family URI from already-validated parts.
    pub fn new(module: &str, family: &str) -> Result<Self, BlockUriError> {
        Self::parse(&format!("{module}:{family}"))
    }

    /// Module that defines the family.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Family name within the module.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// `(module, name)` of the shape, if the family is shaped.
    pub fn shape(&self) -> Option<(&str, &str)> {
        self.shape.as_ref().map(|(m, s)| (m.as_str(), s.as_str()))
    }

    /// Identifier of one block within the family.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Whether this URI names a family rather than a single block.
    pub fn is_family_uri(&self) -> bool {
        self.identifier.is_none()
    }

    /// This URI with the identifier removed.
    pub fn family_uri(&self) -> BlockUri {
        Self {
            identifier: None,
            ..self.clone()
        }
    }

    /// This URI with the given shape attached.
    pub fn with_shape(&self, shape: &str) -> Result<BlockUri, BlockUriError> {
        let (shape_module, shape_name) = match shape.split_once(':') {
            Some((m, s)) => (m, s),
            None => (DEFAULT_MODULE, shape),
        };
        validate_name(shape, shape_module)?;
        validate_name(shape, shape_name)?;
        Ok(Self {
            shape: Some((shape_module.to_string(), shape_name.to_string())),
            ..self.clone()
        })
    }

    /// This URI with the given block identifier.
    pub fn with_identifier(&self, identifier: &str) -> Result<BlockUri, BlockUriError> {
        validate_identifier(identifier, identifier)?;
        Ok(Self {
            identifier: Some(identifier.to_string()),
            ..self.clone()
        })
    }

    /// Whether `other` names a block of the family this URI names.
    pub fn same_family(&self, other: &BlockUri) -> bool {
        self.module == other.module && self.family == other.family && self.shape == other.shape
    }
}

impl fmt::Display for BlockUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.family)?;
        if let Some((shape_module, shape)) = &self.shape {
            write!(f, ":{shape_module}:{shape}")?;
        }
        if let Some(ident) = &self.identifier {
            write!(f, ".{ident}")?;
        }
        Ok(())
    }
}

impl FromStr for BlockUri {
    type Err = BlockUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BlockUri {
    type Error = BlockUriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BlockUri> for String {
    fn from(uri: BlockUri) -> Self {
        uri.to_string()
    }
}

fn validate_name(input: &str, name: &str) -> Result<(), BlockUriError> {
    if name.is_empty() {
        return Err(BlockUriError::new(input, "name part cannot be empty"));
    }
    if name.len() > 64 {
        return Err(BlockUriError::new(input, "name part too long (max 64)"));
    }
    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-'))
    {
        return Err(BlockUriError::new(
            input,
            "name part has invalid characters (allowed: a-z0-9_-)",
        ));
    }
    Ok(())
}

fn validate_identifier(input: &str, ident: &str) -> Result<(), BlockUriError> {
    if ident.is_empty() {
        return Err(BlockUriError::new(input, "identifier cannot be empty"));
    }
    if !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(BlockUriError::new(
            input,
            "identifier has invalid characters (allowed: A-Za-z0-9_)",
        ));
    }
    Ok(())
}
