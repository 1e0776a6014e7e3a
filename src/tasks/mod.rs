pub mod dac_sync;

pub use dac_sync::{apply, run, sync_once, Status, StatusLine};
#[cfg(feature = "firmware")]
pub use dac_sync::dac_sync_task;
