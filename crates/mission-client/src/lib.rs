pub mod client;
pub mod frame;
pub mod parser;
pub mod router;
pub mod stream;
pub mod transport;

pub use client::{MissionClient, RunTicket};
pub use frame::{Frame, FrameDecoder, DATA_PREFIX, DONE_SENTINEL};
pub use parser::{parse_event, ParseFailure};
pub use router::{ModeRouter, RoutePlan};
pub use stream::{agent_stream, search_stream, MissionItem, MissionStream};
pub use transport::{FragmentStream, HttpTransport, Transport, TransportError};
