//! Domain types shared by every Biz-Agent crate.

pub mod errors;
pub mod models;
pub mod response;
