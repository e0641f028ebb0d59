#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

pub mod classify;
pub mod config;
pub mod error;
pub mod models;
pub mod operations;
pub mod session;
pub mod transport;

pub use crate::classify::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::models::*;
pub use crate::operations::*;
pub use crate::session::*;
pub use crate::transport::*;
