pub mod api;
pub mod config;
pub mod convert;
pub mod humanize;
pub mod observability;
pub mod tools;
pub mod upload;
