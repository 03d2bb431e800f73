//! FRACTRAN toolkit.
//!
//! Compiles register-machine circuits into FRACTRAN programs and evaluates
//! them on arbitrarily large configurations.

pub mod circuits;
pub mod machine;
pub mod primes;
pub mod utils;
