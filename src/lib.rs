//! Umbrella crate re-exporting the tfbridge component libraries.

pub use tfbridge_core;
pub use tfbridge_sdk;
pub use tfbridge_server;
