//! Command implementations

pub mod async_utils;
pub mod operation;
pub mod profile;
pub mod resource;
