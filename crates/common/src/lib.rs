//! Common utilities and shared types for galeria.
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers and reset tokens via [`IdGenerator`]
//! - **Storage**: Public/private media buckets (local, S3-compatible)
//! - **Sessions**: Cookie session tokens via [`TokenService`]
//!
//! # Example
//!
//! ```no_run
//! use galeria_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} listening on {}", id_gen.generate(), config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;
pub mod token;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{
    Bucket, LocalStorage, StorageBackend, StorageConfig, UploadedFile, generate_storage_key,
    variant_key,
};
pub use token::{SESSION_COOKIE, SessionClaims, TokenService};
