//! Error shim: generation services report failures via the shared
//! [`CoreError`] taxonomy directly.

pub use studyforge_core::error::{CoreError, Result};
