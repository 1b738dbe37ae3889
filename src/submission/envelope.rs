//! Backend-specific envelopes wrapped around a raw payload.

use std::fmt;

use alloy::hex;
use alloy::primitives::Bytes;

use crate::submission::error::ValidationError;

/// Total namespace size: one version byte plus a 28-byte id.
pub const NAMESPACE_SIZE: usize = 29;

/// Bytes of a version-0 namespace id the user may choose.
pub const NAMESPACE_V0_USER_SIZE: usize = 10;

const NAMESPACE_ID_SIZE: usize = NAMESPACE_SIZE - 1;
const NAMESPACE_V0_PREFIX_SIZE: usize = NAMESPACE_ID_SIZE - NAMESPACE_V0_USER_SIZE;

/// A version-0 blob namespace.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace([u8; NAMESPACE_SIZE]);

impl Namespace {
    /// Build a version-0 namespace from up to ten user bytes.
    ///
    /// Shorter ids are left-padded with zeros.
    pub fn v0(id: &[u8]) -> Result<Self, ValidationError> {
        if id.is_empty() || id.len() > NAMESPACE_V0_USER_SIZE {
            return Err(ValidationError::InvalidNamespace(format!(
                "version-0 id must be 1..={} bytes, got {}",
                NAMESPACE_V0_USER_SIZE,
                id.len()
            )));
        }

        let mut bytes = [0u8; NAMESPACE_SIZE];
        bytes[NAMESPACE_SIZE - id.len()..].copy_from_slice(id);
        let namespace = Self(bytes);
        namespace.validate()?;
        Ok(namespace)
    }

    /// Parse a full 29-byte namespace.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        let raw: [u8; NAMESPACE_SIZE] = bytes.try_into().map_err(|_| {
            ValidationError::InvalidNamespace(format!(
                "expected {} bytes, got {}",
                NAMESPACE_SIZE,
                bytes.len()
            ))
        })?;
        let namespace = Self(raw);
        namespace.validate()?;
        Ok(namespace)
    }

    /// Parse a hex id: 29 bytes as a full namespace, up to ten as a v0 id.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let bytes = hex::decode(s)
            .map_err(|e| ValidationError::InvalidNamespace(format!("invalid hex '{}': {}", s, e)))?;
        if bytes.len() == NAMESPACE_SIZE {
            Self::from_bytes(&bytes)
        } else {
            Self::v0(&bytes)
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.0[0] != 0 {
            return Err(ValidationError::InvalidNamespace(format!(
                "unsupported namespace version {}",
                self.0[0]
            )));
        }
        if self.0[1..=NAMESPACE_V0_PREFIX_SIZE].iter().any(|b| *b != 0) {
            return Err(ValidationError::InvalidNamespace(
                "version-0 namespace must have an all-zero id prefix".to_string(),
            ));
        }
        // Ids using only the last byte are reserved for the protocol.
        if self.0[1..NAMESPACE_SIZE - 1].iter().all(|b| *b == 0) {
            return Err(ValidationError::InvalidNamespace(
                "namespace is reserved".to_string(),
            ));
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8; NAMESPACE_SIZE] {
        &self.0
    }

    pub fn version(&self) -> u8 {
        self.0[0]
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[NAMESPACE_SIZE - NAMESPACE_V0_USER_SIZE..]))
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", hex::encode(self.0))
    }
}

/// Payload tagged with an application id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDataEnvelope {
    pub app_id: u32,
    pub data: Bytes,
}

/// Payload addressed to a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacedBlob {
    pub namespace: Namespace,
    pub data: Bytes,
}

/// Field-aligned payload and the quorums asked to attest it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispersalRequest {
    pub data: Bytes,
    pub quorums: Vec<u8>,
}
