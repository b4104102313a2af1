//! Platform-specific types and data structures

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Set of acceptable authenticator strengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Authenticators(u8);

impl Authenticators {
    /// No authenticator
    pub const NONE: Self = Self(0);

    /// Class 3 biometric (fingerprint on most devices)
    pub const BIOMETRIC_STRONG: Self = Self(0b001);

    /// Class 2 biometric (face unlock on most devices)
    pub const BIOMETRIC_WEAK: Self = Self(0b010);

    /// Device PIN, pattern or password
    pub const DEVICE_CREDENTIAL: Self = Self(0b100);

    /// Any biometric strength
    pub const ANY_BIOMETRIC: Self = Self(0b011);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every flag of `other` is present
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether at least one flag of `other` is present
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether any biometric strength is requested
    pub const fn has_biometric(self) -> bool {
        self.intersects(Self::ANY_BIOMETRIC)
    }

    /// Remove device credential from the set
    pub const fn without_credential(self) -> Self {
        Self(self.0 & !Self::DEVICE_CREDENTIAL.0)
    }

    /// Integer flags understood by `BiometricManager` and `PromptInfo.Builder`
    pub fn to_android_bits(self) -> i32 {
        let mut bits = 0;
        if self.contains(Self::BIOMETRIC_STRONG) {
            bits |= 0x000F;
        }
        if self.contains(Self::BIOMETRIC_WEAK) {
            bits |= 0x00FF;
        }
        if self.contains(Self::DEVICE_CREDENTIAL) {
            bits |= 0x8000;
        }
        bits
    }
}

impl BitOr for Authenticators {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Authenticators {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for Authenticators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::BIOMETRIC_STRONG) {
            names.push("BIOMETRIC_STRONG");
        }
        if self.contains(Self::BIOMETRIC_WEAK) {
            names.push("BIOMETRIC_WEAK");
        }
        if self.contains(Self::DEVICE_CREDENTIAL) {
            names.push("DEVICE_CREDENTIAL");
        }
        if names.is_empty() {
            return f.write_str("NONE");
        }
        f.write_str(&names.join("|"))
    }
}

/// Result reported by the platform capability oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiometricStatus {
    /// Usable authenticators are enrolled
    Success,
    /// Status could not be determined
    StatusUnknown,
    /// Requested combination unsupported on this OS version
    Unsupported,
    /// Hardware present but currently unavailable
    HardwareUnavailable,
    /// Hardware present but nothing enrolled
    NoneEnrolled,
    /// No matching hardware
    NoHardware,
    /// A security vulnerability was found in the sensor
    SecurityUpdateRequired,
    /// Code not known to this crate
    Other(i32),
}

impl BiometricStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            -1 => Self::StatusUnknown,
            -2 => Self::Unsupported,
            1 => Self::HardwareUnavailable,
            11 => Self::NoneEnrolled,
            12 => Self::NoHardware,
            15 => Self::SecurityUpdateRequired,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::StatusUnknown => -1,
            Self::Unsupported => -2,
            Self::HardwareUnavailable => 1,
            Self::NoneEnrolled => 11,
            Self::NoHardware => 12,
            Self::SecurityUpdateRequired => 15,
            Self::Other(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Hardware features probed directly on legacy OS tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemFeature {
    Fingerprint,
    Face,
}

impl SystemFeature {
    /// Package manager feature name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fingerprint => "android.hardware.fingerprint",
            Self::Face => "android.hardware.biometrics.face",
        }
    }
}

/// Lifecycle state of the foreground surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceLifecycle {
    Active,
    Finishing,
    Destroyed,
}

/// The foreground UI surface a prompt would be rendered on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForegroundContext {
    /// Component name, reported when the surface cannot host the prompt
    pub component: String,

    /// Current lifecycle state
    pub lifecycle: SurfaceLifecycle,

    /// Whether the surface can host the modal prompt
    pub hosts_prompt: bool,
}

impl ForegroundContext {
    /// An active surface able to host the prompt
    pub fn active(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            lifecycle: SurfaceLifecycle::Active,
            hosts_prompt: true,
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: SurfaceLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_prompt_support(mut self, hosts_prompt: bool) -> Self {
        self.hosts_prompt = hosts_prompt;
        self
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == SurfaceLifecycle::Active
    }
}
