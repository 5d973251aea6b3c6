//! Capability probe (C11): selects the highest-throughput DWT kernel that
//! still produces bit-identical output to the scalar reference.
//!
//! The normative behaviour lives entirely in [`crate::dwt`]/[`crate::dwt_rem`]
//! (the "shift" form of the DWT, per §4.11); SIMD kernels are hand-written
//! assembly/intrinsics in the reference encoder (`rfxencode_tile_x86.c`,
//! `rfxencode_tile_arm64.c`) and are explicitly out of scope for this crate
//! (§1 PURPOSE & SCOPE: "Hand-written assembly / SIMD kernels are not part
//! of the normative spec"). `Kernel` still models the selection axis so a
//! caller asking for `NOACCEL` gets the same scalar path as every other
//! variant, and so the dispatch point exists for a future accelerated
//! kernel to slot into without changing the public API.

/// DWT kernel variant. Every variant other than [`Kernel::Scalar`] is
/// reserved for a future bit-identical accelerated implementation; today
/// they all dispatch to the scalar reference (`crate::dwt`/`crate::dwt_rem`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    Scalar,
    Sse2,
    Sse41,
    Neon,
}

impl Kernel {
    /// Probes the running CPU for the best available kernel, honouring a
    /// forced-scalar override (the `NOACCEL` creation flag).
    pub fn detect(force_scalar: bool) -> Self {
        if force_scalar {
            return Self::Scalar;
        }

        #[cfg(target_arch = "x86_64")]
        {
            if std::is_x86_feature_detected!("sse4.1") {
                return Self::Sse41;
            }
            if std::is_x86_feature_detected!("sse2") {
                return Self::Sse2;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                return Self::Neon;
            }
        }

        Self::Scalar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_scalar_overrides_detection() {
        assert_eq!(Kernel::detect(true), Kernel::Scalar);
    }
}
