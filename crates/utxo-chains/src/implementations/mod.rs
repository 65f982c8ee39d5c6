//! Concrete adaptor implementations.

pub mod bitcoin;
