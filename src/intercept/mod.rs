//! HTTP interception.
//!
//! This module makes outbound calls issued by the code under test
//! deterministic and observable. In playback mode a substitute transport
//! serves responses from the active fixture strictly in recorded order; in
//! record mode requests pass through to the live service while the
//! exchange is captured for later storage.

mod recording;
mod scope;
mod session;
mod transport;

pub use recording::RecordingSession;
pub use scope::{path_and_query, HttpRequest, HttpResponse, Scope};
pub use session::InterceptSession;
pub use transport::{HttpTransport, LiveTransport, PlaybackTransport, RecordingTransport};
