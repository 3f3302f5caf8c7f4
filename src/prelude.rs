//! Re-exports everything the common case needs.

pub use crate::observable;
pub use crate::observable::*;
pub use crate::observer::*;
pub use crate::ops;
pub use crate::ops::pipe::{pipe, Pipeline, Stage};
pub use crate::rc::*;
pub use crate::scheduler;
pub use crate::scheduler::*;
pub use crate::subject::*;
pub use crate::subscription::*;
