pub mod category_repository;
pub mod question_repository;
pub mod session_repository;
pub mod user_repository;
pub mod verification_repository;

pub use category_repository::{CategoryRepository, SqliteCategoryRepository};
pub use question_repository::{QuestionRepository, SqliteQuestionRepository};
pub use session_repository::{SessionRepository, SqliteSessionRepository};
pub use user_repository::{
    NewRegistration, RepositoryError, RepositoryResult, SqliteUserRepository, UserRepository,
};
pub use verification_repository::{SqliteVerificationRepository, VerificationRepository};
