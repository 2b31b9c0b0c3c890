//! ezhost engine: HTTP client, history file and the blocking session facade.
mod client;
mod engine;
mod history;
mod persist;
mod session;
mod settings;
mod wire;

pub use client::{HostApi, ReqwestHostApi};
pub use engine::EngineHandle;
pub use history::{Clock, JsonHistoryFile, HISTORY_FILENAME};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use session::Session;
pub use settings::{ApiKey, ApiSettings, DEFAULT_API_URL};
