//! Shared transterm library exports that keep the binary and tests aligned.

pub mod doctor;
pub mod logging;
pub mod protocol;
pub mod storage;
pub mod terminal_restore;
pub mod transport;

pub use logging::{init_logging, log_file_path};
pub use protocol::{ClientCommand, ConfigPatch, Microphone, ServerEvent, TranslationConfig};
pub use storage::ConfigStore;
pub use transport::{Connection, TransportEvent};
