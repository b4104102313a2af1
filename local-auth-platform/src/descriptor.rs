//! OS version descriptor
//!
//! Capability probing branches on the platform API level. The descriptor is
//! passed in explicitly so every tier can be exercised without a device.

use serde::{Deserialize, Serialize};

/// Android 6.0, the oldest release with a biometric prompt compat layer
pub const API_MARSHMALLOW: u32 = 23;

/// Android 10, first release exposing face unlock as a system feature
pub const API_Q: u32 = 29;

/// Android 11, first release with `canAuthenticate(authenticators)`
pub const API_R: u32 = 30;

/// Capability tier derived from the API level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformTier {
    /// Direct fingerprint feature probing only
    Legacy,
    /// Direct feature probing, face unlock included
    LegacyWithFace,
    /// Unified capability oracle
    Unified,
}

/// Platform version information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// API level (e.g., 30 for Android 11)
    pub api_level: u32,

    /// Release version (e.g., "11")
    pub release: String,
}

impl PlatformDescriptor {
    pub fn new(api_level: u32, release: impl Into<String>) -> Self {
        Self { api_level, release: release.into() }
    }

    /// Descriptor for an API level with its well-known release name
    pub fn from_api_level(api_level: u32) -> Self {
        let release = match api_level {
            23 => "6.0",
            24 => "7.0",
            25 => "7.1",
            26 => "8.0",
            27 => "8.1",
            28 => "9",
            29 => "10",
            30 => "11",
            31 => "12",
            32 => "12L",
            33 => "13",
            34 => "14",
            35 => "15",
            _ => "unknown",
        };
        Self::new(api_level, release)
    }

    /// Whether `canAuthenticate(authenticators)` is available
    pub fn has_unified_oracle(&self) -> bool {
        self.api_level >= API_R
    }

    /// Whether face unlock can be probed as a system feature
    pub fn supports_face_unlock(&self) -> bool {
        self.api_level >= API_Q
    }

    /// Whether the prompt builder can combine biometric strengths with device credential
    pub fn supports_credential_fallback(&self) -> bool {
        self.has_unified_oracle()
    }

    pub fn tier(&self) -> PlatformTier {
        if self.has_unified_oracle() {
            PlatformTier::Unified
        } else if self.supports_face_unlock() {
            PlatformTier::LegacyWithFace
        } else {
            PlatformTier::Legacy
        }
    }
}

impl Default for PlatformDescriptor {
    fn default() -> Self {
        Self::from_api_level(API_R)
    }
}
