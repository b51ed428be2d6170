//! Data models for slipscan.

pub mod config;
pub mod dto;
pub mod invoice;
pub mod receipt;
