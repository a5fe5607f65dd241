// Library for the doke binary and its tests

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod format;
pub mod frame;
pub mod gateway;
pub mod inspect;
pub mod models;
pub mod proxy;
pub mod runcmd;
pub mod version;
