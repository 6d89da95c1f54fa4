pub mod compile;
pub mod errors;
pub mod id;
pub mod message;
pub mod types;

pub use compile::{CompileError, Location};
pub use errors::{
    ConfigError, DesktopError, LivedeskError, PlatformError, RuntimeError, WindowError,
};
pub use id::{new_correlation_id, WindowId};
pub use message::{Command, Message};
pub use types::{Phase, WindowKind};

pub type Result<T> = std::result::Result<T, LivedeskError>;
