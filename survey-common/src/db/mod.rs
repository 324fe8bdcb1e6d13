//! Persistence gateway
//!
//! Multi-row creates (`create_survey`, `create_reply`) each run in a single
//! transaction; reads are plain queries against the pool.

pub mod admins;
pub mod init;
pub mod replies;
pub mod surveys;

pub use admins::*;
pub use init::*;
pub use replies::*;
pub use surveys::*;
