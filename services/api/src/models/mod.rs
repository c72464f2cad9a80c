//! API models for request and response payloads

pub mod account;
pub mod branch;
pub mod material;
pub mod notice;
pub mod subject;
pub mod timetable;
