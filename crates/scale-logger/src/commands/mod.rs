pub mod create;
pub mod start;
pub mod stats;
