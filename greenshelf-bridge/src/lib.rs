//! Typed operation bridge over the GreenShelf service.
//!
//! Clients send JSON naming exactly one of a closed set of operations.
//! The bridge parses it into a `ShelfOperation`, checks parameter bounds,
//! runs it against the shared service and answers with a tagged
//! `OperationResult`. Every processed request lands in the audit log.

pub mod error;
pub mod ops;
pub mod protocol;
pub mod results;

pub use error::{BridgeError, BridgeResult};
pub use ops::{ReadingInput, ShelfOperation};
pub use protocol::{AuditEntry, Bridge, BridgeRequest, BridgeResponse};
pub use results::OperationResult;
