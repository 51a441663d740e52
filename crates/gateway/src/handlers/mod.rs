//! API handlers module

pub mod citations;
pub mod health;
