//! Scale logger - polls Modbus RTU scales and appends results to a DBF table

pub mod cli;
pub mod commands;
pub mod logging;
