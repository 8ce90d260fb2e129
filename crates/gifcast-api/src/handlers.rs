//! Request handlers.

pub mod convert;
pub mod health;
pub mod pages;

pub use convert::*;
pub use health::*;
pub use pages::*;
