pub mod curriculum;
pub mod loaders;
pub mod quiz;
pub mod score;

pub use curriculum::{ContentUnit, DeletionReport, StudyArtifact, TopicPlan, UploadHandle};
pub use loaders::{load_assessment, AssessmentFile};
pub use quiz::{items_from_questions, AnswerSet, ItemId, QuizItem, QuizQuestion};
pub use score::{Level, TopicScore};
