pub mod config;
pub mod error;
pub mod logger;
pub mod style;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::SummaryBenchError;
pub use style::{InputSource, LengthSetting, Tone};
pub type Result<T> = std::result::Result<T, SummaryBenchError>;
