#![forbid(unsafe_code)]

pub mod collect;
pub mod config;
pub mod model;
pub mod store;
pub mod tabular;

pub fn infra_bootstrapped() -> bool {
    shadowlink_core::crate_bootstrapped()
}
