mod checksum;
pub(crate) mod echo_frame;
pub(crate) mod reply_decoder;
mod sequence_number;
mod session_id;
pub(crate) mod socket;
mod ttl;

pub use checksum::{checksum, verify_checksum};
pub(crate) use echo_frame::ICMP_MIN as ICMP_MIN_PACKET_SIZE;
pub use echo_frame::{frame_size, ECHO_HEADER_SIZE, MAX_PING_DATA_SIZE};
pub use sequence_number::SequenceNumber;
pub use session_id::SessionId;
pub use socket::raw_socket::RawSocket;
pub use socket::TSocket;
pub use ttl::Ttl;
