#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub use details::icmp::v4::{
    checksum, frame_size, verify_checksum, RawSocket, SequenceNumber, SessionId, TSocket, Ttl, ECHO_HEADER_SIZE,
    MAX_PING_DATA_SIZE,
};
pub use details::records::{AttemptOutcome, AttemptRecord, SessionResult};
pub use details::{GenericError, PingError, PingErrorKind, PingResult};
pub use ping_config::*;
pub use ping_session::*;
pub use resolver::*;

mod details;
mod ping_config;
mod ping_session;
mod resolver;
