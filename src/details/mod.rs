pub use generic_error::GenericError;
pub use ping_error::{PingError, PingErrorKind};
pub use ping_result::PingResult;

mod generic_error;
pub(crate) mod icmp;
mod ping_error;
mod ping_result;
pub(crate) mod records;
pub(crate) mod session;
mod tick_clock;
pub(crate) mod transport;
