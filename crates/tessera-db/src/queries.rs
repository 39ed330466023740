//! Query functions, one module per table group.

pub mod affiliates;
pub mod drawings;
pub mod sales;
pub mod users;
