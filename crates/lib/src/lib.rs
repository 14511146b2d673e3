//! runsel-lib: resolve a build identifier to one build of a job
//!
//! This crate provides the pieces a pipeline step needs to say "use the build
//! identified by X":
//! - `SpecificBuildSelector`: expands, classifies, and looks up an identifier
//! - `Job`, `Run`, `Permalink`: the collaborator traits a host implements
//! - `EnvVars`: variable expansion for identifiers
//! - `StoredJob`: an in-memory job with the standard permalinks
//! - `SelectorRegistry`: the menu of selectors a host offers

pub mod error;
pub mod job;
pub mod permalink;
pub mod placeholder;
pub mod registry;
pub mod selector;
pub mod store;

pub use error::{Result, SelectError};
pub use job::{Job, Permalink, Run};
pub use placeholder::EnvVars;
pub use selector::{SelectorContext, SpecificBuildSelector};
pub use store::{StoredJob, StoredRun};
