//! Capability probing across OS tiers
//!
//! All answers are computed from the platform on every call. Enrollment can
//! change between calls, so nothing here is cached.

use local_auth_platform::{
    Authenticators, BiometricStatus, CapabilityOracle, FeatureProbe, PlatformBindings,
    PlatformDescriptor, PlatformResult, SystemFeature,
};
use tracing::{trace, warn};

use crate::types::{AvailabilityReport, BiometricStrength, BiometricType, CapabilityQuery};

/// Capability view over one set of platform bindings
pub struct CapabilityProbe<'a> {
    descriptor: &'a PlatformDescriptor,
    oracle: &'a dyn CapabilityOracle,
    features: &'a dyn FeatureProbe,
}

impl<'a> CapabilityProbe<'a> {
    pub fn new(
        descriptor: &'a PlatformDescriptor,
        oracle: &'a dyn CapabilityOracle,
        features: &'a dyn FeatureProbe,
    ) -> Self {
        Self { descriptor, oracle, features }
    }

    pub fn from_bindings(bindings: &'a PlatformBindings) -> Self {
        Self::new(&bindings.descriptor, bindings.oracle.as_ref(), bindings.features.as_ref())
    }

    /// Whether usable, enrolled authenticators match `query`
    pub fn check_availability(&self, query: CapabilityQuery) -> bool {
        let authenticators = query.authenticators();
        let available = if self.descriptor.has_unified_oracle() {
            self.status(self.oracle.can_authenticate(authenticators)).is_success()
        } else {
            self.check_legacy_availability(authenticators)
        };
        trace!(%authenticators, available, tier = ?self.descriptor.tier(), "Capability check");
        available
    }

    fn check_legacy_availability(&self, authenticators: Authenticators) -> bool {
        if !self.status(self.oracle.can_authenticate_legacy()).is_success() {
            return false;
        }

        let wants_strong = authenticators.contains(Authenticators::BIOMETRIC_STRONG);
        let wants_weak = authenticators.contains(Authenticators::BIOMETRIC_WEAK);
        if !wants_strong && !wants_weak {
            return true;
        }

        // A strong request is settled by the fingerprint sensor alone
        if wants_strong {
            return self.features.has_system_feature(SystemFeature::Fingerprint);
        }
        self.has_face_feature()
    }

    /// Availability of one modality
    pub fn check_type(&self, biometric_type: BiometricType) -> bool {
        match biometric_type {
            BiometricType::Fingerprint => {
                if self.descriptor.has_unified_oracle() {
                    self.check_availability(Authenticators::BIOMETRIC_STRONG.into())
                } else {
                    self.features.has_system_feature(SystemFeature::Fingerprint)
                }
            }
            BiometricType::Face => {
                if self.descriptor.has_unified_oracle() {
                    self.check_availability(Authenticators::BIOMETRIC_WEAK.into())
                } else {
                    self.has_face_feature()
                }
            }
            BiometricType::Any => self.check_availability(CapabilityQuery::any_biometric()),
        }
    }

    /// Whether any biometric hardware is present, enrolled or not
    pub fn has_hardware(&self) -> bool {
        if self.descriptor.has_unified_oracle() {
            self.status(self.oracle.can_authenticate(Authenticators::ANY_BIOMETRIC))
                != BiometricStatus::NoHardware
        } else {
            self.features.has_system_feature(SystemFeature::Fingerprint) || self.has_face_feature()
        }
    }

    /// Device credential can only be reported on the unified tier
    pub fn is_device_credential_available(&self) -> bool {
        self.descriptor.has_unified_oracle()
            && self.status(self.oracle.can_authenticate(Authenticators::DEVICE_CREDENTIAL)).is_success()
    }

    /// Strong if fingerprint is available, else weak if face is, else none
    pub fn strength(&self) -> BiometricStrength {
        if self.check_type(BiometricType::Fingerprint) {
            BiometricStrength::Strong
        } else if self.check_type(BiometricType::Face) {
            BiometricStrength::Weak
        } else {
            BiometricStrength::None
        }
    }

    pub fn detailed_availability(&self) -> AvailabilityReport {
        let is_fingerprint_available = self.check_type(BiometricType::Fingerprint);
        let is_face_available = self.check_type(BiometricType::Face);
        let biometric_strength = if is_fingerprint_available {
            BiometricStrength::Strong
        } else if is_face_available {
            BiometricStrength::Weak
        } else {
            BiometricStrength::None
        };

        AvailabilityReport {
            has_hardware: self.has_hardware(),
            has_enrolled_biometrics: self.check_availability(CapabilityQuery::any_biometric()),
            is_fingerprint_available,
            is_face_available,
            is_iris_available: false,
            is_device_credential_available: self.is_device_credential_available(),
            biometric_strength,
        }
    }

    fn has_face_feature(&self) -> bool {
        self.descriptor.supports_face_unlock() && self.features.has_system_feature(SystemFeature::Face)
    }

    fn status(&self, result: PlatformResult<BiometricStatus>) -> BiometricStatus {
        result.unwrap_or_else(|e| {
            warn!("Capability oracle failed: {}", e);
            BiometricStatus::StatusUnknown
        })
    }
}
