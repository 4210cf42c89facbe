//! # restkit
//!
//! Resources and lazily fetched representations for RESTful HTTP services.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restkit::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let resource = Resource::open("https://dns.google.com/resolve")?;
//!     let query = resource
//!         .get::<Json>([("name", "example.com"), ("type", "AAAA")])
//!         .await?;
//!     println!("{}", query.value().await?["Answer"]);
//!     resource.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Re-export core types and traits
pub use restkit_core::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use restkit_core::prelude::*;
}
