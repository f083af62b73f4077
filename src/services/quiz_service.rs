use crate::models::{Category, CategoryCreate, CategoryUpdate, Question, QuestionCreate, QuestionUpdate};
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::question_repository::QuestionRepository;
use crate::repositories::user_repository::RepositoryError;
use crate::services::validation::{check_length, check_range};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum QuizServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("At least one category is required")]
    EmptyCategoryBatch,
    #[error("At least one question is required")]
    EmptyQuestionBatch,
    #[error("Duplicate category name is present in request")]
    DuplicateInBatch,
    #[error("Category already present")]
    CategoryExists,
    #[error("Categories already exists: {}", .0.join(", "))]
    CategoriesExist(Vec<String>),
    #[error("Category not found")]
    CategoryNotFound,
    #[error("Question not found")]
    QuestionNotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// Questions created in bulk together with the category that received them.
#[derive(Debug)]
pub struct QuestionBatch {
    pub category: Category,
    pub questions: Vec<Question>,
}

pub struct QuizService {
    categories: Arc<dyn CategoryRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl QuizService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            categories,
            questions,
        }
    }

    pub async fn create_category(
        &self,
        category: CategoryCreate,
    ) -> Result<Category, QuizServiceError> {
        validate_category(&category)?;

        if self.categories.find_by_name(&category.name).await?.is_some() {
            return Err(QuizServiceError::CategoryExists);
        }

        let created = self
            .categories
            .create(category)
            .await
            .map_err(conflict_as(QuizServiceError::CategoryExists))?;

        tracing::info!(category_id = created.id, name = %created.name, "Category created");

        Ok(created)
    }

    /// Creates every category in the batch or none of them.
    pub async fn create_categories_bulk(
        &self,
        categories: Vec<CategoryCreate>,
    ) -> Result<Vec<Category>, QuizServiceError> {
        if categories.is_empty() {
            return Err(QuizServiceError::EmptyCategoryBatch);
        }

        for category in &categories {
            validate_category(category)?;
        }

        let mut seen = HashSet::new();
        if !categories.iter().all(|c| seen.insert(c.name.as_str())) {
            return Err(QuizServiceError::DuplicateInBatch);
        }

        let names = categories.iter().map(|c| c.name.clone()).collect();
        let existing = self.categories.find_existing_names(names).await?;
        if !existing.is_empty() {
            return Err(QuizServiceError::CategoriesExist(existing));
        }

        let created = self
            .categories
            .create_many(categories)
            .await
            .map_err(conflict_as(QuizServiceError::DuplicateInBatch))?;

        tracing::info!(count = created.len(), "Categories created in bulk");

        Ok(created)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, QuizServiceError> {
        Ok(self.categories.list_active().await?)
    }

    pub async fn update_category(
        &self,
        id: i64,
        changes: CategoryUpdate,
    ) -> Result<Category, QuizServiceError> {
        if let Some(name) = &changes.name {
            check_length("Name", name, 1, 200).map_err(QuizServiceError::InvalidInput)?;
            if let Some(other) = self.categories.find_by_name(name).await? {
                if other.id != id {
                    return Err(QuizServiceError::CategoryExists);
                }
            }
        }
        if let Some(description) = &changes.description {
            check_length("Description", description, 1, 500)
                .map_err(QuizServiceError::InvalidInput)?;
        }
        if let Some(multiplier) = changes.difficulty_multiplier {
            check_range("Difficulty multiplier", multiplier, 0.1, 10.0)
                .map_err(QuizServiceError::InvalidInput)?;
        }

        self.categories
            .update(id, changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => QuizServiceError::CategoryNotFound,
                RepositoryError::AlreadyExists => QuizServiceError::CategoryExists,
                other => QuizServiceError::RepositoryError(other),
            })
    }

    pub async fn create_question(
        &self,
        category_id: i64,
        question: QuestionCreate,
    ) -> Result<Question, QuizServiceError> {
        validate_question(&question)?;
        self.active_category(category_id).await?;

        let created = self.questions.create(category_id, question).await?;

        tracing::info!(category_id, question_id = created.id, "Question created");

        Ok(created)
    }

    /// Creates every question in the batch under one category, or none of them.
    pub async fn create_questions_bulk(
        &self,
        category_id: i64,
        questions: Vec<QuestionCreate>,
    ) -> Result<QuestionBatch, QuizServiceError> {
        if questions.is_empty() {
            return Err(QuizServiceError::EmptyQuestionBatch);
        }

        for question in &questions {
            validate_question(question)?;
        }

        let category = self.active_category(category_id).await?;
        let questions = self.questions.create_many(category_id, questions).await?;

        tracing::info!(category_id, count = questions.len(), "Questions created in bulk");

        Ok(QuestionBatch {
            category,
            questions,
        })
    }

    pub async fn list_questions(&self, category_id: i64) -> Result<Vec<Question>, QuizServiceError> {
        self.categories
            .find_by_id(category_id)
            .await?
            .ok_or(QuizServiceError::CategoryNotFound)?;

        Ok(self.questions.list_by_category(category_id).await?)
    }

    pub async fn update_question(
        &self,
        id: i64,
        changes: QuestionUpdate,
    ) -> Result<Question, QuizServiceError> {
        if let Some(text) = &changes.question_text {
            check_length("Question text", text, 1, 500).map_err(QuizServiceError::InvalidInput)?;
        }
        let answers = [
            ("Correct answer", &changes.correct_answer),
            ("Option a", &changes.option_a),
            ("Option b", &changes.option_b),
            ("Option c", &changes.option_c),
            ("Option d", &changes.option_d),
        ];
        for (field, value) in answers {
            if let Some(value) = value {
                check_length(field, value, 1, 50).map_err(QuizServiceError::InvalidInput)?;
            }
        }

        self.questions
            .update(id, changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => QuizServiceError::QuestionNotFound,
                other => QuizServiceError::RepositoryError(other),
            })
    }

    async fn active_category(&self, category_id: i64) -> Result<Category, QuizServiceError> {
        self.categories
            .find_by_id(category_id)
            .await?
            .filter(|category| category.is_active)
            .ok_or(QuizServiceError::CategoryNotFound)
    }
}

fn conflict_as(
    conflict: QuizServiceError,
) -> impl FnOnce(RepositoryError) -> QuizServiceError {
    move |e| match e {
        RepositoryError::AlreadyExists => conflict,
        other => QuizServiceError::RepositoryError(other),
    }
}

fn validate_category(category: &CategoryCreate) -> Result<(), QuizServiceError> {
    check_length("Name", &category.name, 1, 200).map_err(QuizServiceError::InvalidInput)?;
    check_length("Description", &category.description, 1, 500)
        .map_err(QuizServiceError::InvalidInput)?;
    check_range(
        "Difficulty multiplier",
        category.difficulty_multiplier,
        0.1,
        10.0,
    )
    .map_err(QuizServiceError::InvalidInput)
}

fn validate_question(question: &QuestionCreate) -> Result<(), QuizServiceError> {
    check_length("Question text", &question.question_text, 1, 500)
        .map_err(QuizServiceError::InvalidInput)?;
    for (field, value) in [
        ("Correct answer", &question.correct_answer),
        ("Option a", &question.option_a),
        ("Option b", &question.option_b),
        ("Option c", &question.option_c),
        ("Option d", &question.option_d),
    ] {
        check_length(field, value, 1, 50).map_err(QuizServiceError::InvalidInput)?;
    }
    Ok(())
}
