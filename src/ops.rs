#[cfg(feature = "timer")]
pub mod delay;
pub mod filter;
pub mod finalize;
pub mod map;
pub mod map_with_err;
pub mod on_complete;
pub mod on_error;
pub mod pipe;
pub mod switch_map;
pub mod take;
