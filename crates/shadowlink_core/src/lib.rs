#![forbid(unsafe_code)]

pub mod classify;
pub mod engine;
pub mod features;
pub mod ledger;

pub fn crate_bootstrapped() -> bool {
    true
}
