pub mod account;
pub mod action;
pub mod agent;
pub mod automation;
pub mod board;
pub mod cadence;
pub mod distribution;
pub mod import;
pub mod metrics;
pub mod pix;
