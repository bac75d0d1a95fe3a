//! Waah Core
//!
//! Shared building blocks for the Waah canvas:
//! - Error taxonomy and backend status codes
//! - Resource finalization guards
//! - Pixel surfaces (ARGB32 / RGB24)
//! - Already-typed script argument values

pub mod color;
pub mod error;
pub mod resource;
pub mod status;
pub mod surface;
pub mod value;

pub use color::Rgba;
pub use error::{Result, WaahError};
pub use resource::{live_count, Finalizer, ResourceKind};
pub use status::Status;
pub use surface::{Format, Surface};
pub use value::{Alpha, Value};
