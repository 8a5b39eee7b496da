pub use core::time::Duration;

// `std::time::Instant::now()` panics on `wasm32-unknown-unknown`; `web-time`
// backs it with `performance.now()` there.
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
