//! Audio device backends for voxline.

mod cpal_backend;
mod offline;
mod traits;

pub use cpal_backend::{CpalOutput, Handoff, HANDOFF_CAPACITY};
pub use offline::OfflineDevice;
pub use traits::{AudioDevice, DeviceClock, InitializationError};
