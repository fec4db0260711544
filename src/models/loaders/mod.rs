pub mod toml_loader;

pub use toml_loader::{load_assessment, parse_assessment, AnswerEntry, AssessmentFile};
