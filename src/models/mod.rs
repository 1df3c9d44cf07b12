//! Data Models
//!
//! Request, response and storage types used by the handlers and services.

pub mod folder;
pub mod generation;
pub mod profile;
pub mod prompt;
pub mod response;
pub mod settings;

pub use folder::*;
pub use generation::*;
pub use profile::*;
pub use prompt::*;
pub use response::*;
pub use settings::*;
