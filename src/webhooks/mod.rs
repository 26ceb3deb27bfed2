//! Inbound webhook handling: signature verification, payload parsing, and
//! the record-then-notify router.

pub mod events;
pub mod parser;
pub mod router;
pub mod signature;

pub use events::GithubEvent;
pub use parser::{parse_webhook, ParseError, INERT_EVENT_TYPES};
pub use router::{EventRouter, RouteOutcome};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
