#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod array;
pub mod attachment;
pub mod axis;
pub mod error;

pub use array::{PatternArray, PatternKind};
pub use attachment::{Attachment, AttachmentResolver};
pub use axis::{AGE_TOLERANCE, DevelopmentAxis, Grain};
pub use error::{PatternError, Result};
