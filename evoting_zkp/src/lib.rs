#[macro_use]
extern crate serde;

pub mod catalog;
mod config;
mod elgamal;
mod error;
mod exponent;
mod group;
mod handlers;
mod hash;
mod phi;
mod proof;
mod protocol;
mod service;
mod zp;

pub use config::*;
pub use elgamal::*;
pub use error::*;
pub use exponent::*;
pub use group::*;
pub use handlers::*;
pub use hash::*;
pub use phi::*;
pub use proof::*;
pub use protocol::*;
pub use service::*;
pub use zp::*;
