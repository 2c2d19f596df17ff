//! Core business logic for galeria.

pub mod services;

pub use services::*;

#[cfg(test)]
mod test_fixtures;
