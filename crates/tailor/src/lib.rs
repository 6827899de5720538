#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

// Re-export main types from sub-crates
pub use tailor_fit as fit;
pub use tailor_pattern as pattern;
pub use tailor_tails as tails;

/// Common imports for fitting tails
pub mod prelude {
    pub use tailor_fit::{CurveKind, GrowthCurve, LowFactorPolicy};
    pub use tailor_pattern::{
        Attachment, DevelopmentAxis, Grain, PatternArray, PatternError, PatternKind,
    };
    pub use tailor_tails::{
        BondyConfig, BondyTail, ClarkConfig, ClarkPattern, ClarkTail, ConstantConfig,
        ConstantTail, CurveConfig, CurveTail, DevelopmentSource, FitPeriod, FitStatus,
        TailError, TailedPattern,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
