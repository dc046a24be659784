pub mod prompt;
pub mod record;

pub use prompt::Prompt;
pub use record::{CandidateRecord, Field};
