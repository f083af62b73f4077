pub mod auth_service;
pub mod email_service;
pub mod quiz_service;
pub mod user_service;
pub mod validation;
pub mod verification_service;

pub use auth_service::{AuthService, AuthServiceError, LoginOutcome, LoginRequest};
pub use email_service::{create_email_service, EmailError, EmailService};
pub use quiz_service::{QuestionBatch, QuizService, QuizServiceError};
pub use user_service::{CreateUserRequest, RegisterRequest, UserService, UserServiceError};
pub use verification_service::{VerificationError, VerificationOutcome, VerificationService};
