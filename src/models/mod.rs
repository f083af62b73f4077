pub mod category;
pub mod email_verification;
pub mod question;
pub mod session;
pub mod user;

pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use email_verification::EmailVerification;
pub use question::{DifficultyLevel, Question, QuestionCreate, QuestionUpdate};
pub use session::{SessionClient, UserSession};
pub use user::{User, UserResponse};
