pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod progress;
pub mod srs;

#[cfg(test)]
mod testing;
