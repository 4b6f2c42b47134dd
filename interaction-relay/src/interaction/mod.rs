//! Interaction handling module.
//!
//! ## Processing Flow
//!
//! ```text
//! body → parse_envelope() → dispatch() → response
//!                                └─ (ApplicationCommand) redact() → Publisher
//! ```

pub mod dispatch;
pub mod envelope;
pub mod redact;

pub use dispatch::{dispatch, DispatchError};
pub use envelope::{
    parse_envelope, InteractionEnvelope, InteractionResponse, InteractionType, ParseError,
    ResponseType,
};
pub use redact::{redact, RedactedEnvelope, ALLOWED_FIELDS};
