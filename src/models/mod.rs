pub mod config;
pub mod palette;

pub use config::{AppConfig, DEFAULT_ENDPOINT};
pub use palette::{ColorSwatch, PaletteResult, ParseColorError};
