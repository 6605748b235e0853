pub mod config;
pub mod events;
pub mod session;

pub use config::{Config, ConfigError, DEFAULT_BASE_URL, DEFAULT_FAST_KEYWORDS};
pub use events::{AgentEvent, Strategy};
pub use session::{Applied, Session};
