pub mod analysis_client;
pub mod session;
pub mod typewriter;

pub use analysis_client::{HttpAnalysisClient, PaletteAnalyzer};
pub use session::{SessionController, SessionState};
pub use typewriter::{prefixes, Reveal, Typewriter};
