use crate::models::{Question, QuestionCreate, QuestionUpdate};
use crate::repositories::user_repository::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

const QUESTION_COLUMNS: &str = "id, category_id, question_text, difficulty_level, correct_answer, option_a, option_b, option_c, option_d, is_active, created_at, updated_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait QuestionRepository: Send + Sync {
    async fn create(&self, category_id: i64, question: QuestionCreate)
        -> RepositoryResult<Question>;
    /// Inserts every question or none of them.
    async fn create_many(
        &self,
        category_id: i64,
        questions: Vec<QuestionCreate>,
    ) -> RepositoryResult<Vec<Question>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Question>>;
    async fn list_by_category(&self, category_id: i64) -> RepositoryResult<Vec<Question>>;
    async fn update(&self, id: i64, changes: QuestionUpdate) -> RepositoryResult<Question>;
}

pub struct SqliteQuestionRepository {
    pool: SqlitePool,
}

impl SqliteQuestionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_question<'e, E>(
    executor: E,
    category_id: i64,
    question: &QuestionCreate,
) -> RepositoryResult<i64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO questions (
            category_id, question_text, difficulty_level, correct_answer,
            option_a, option_b, option_c, option_d, is_active, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(category_id)
    .bind(&question.question_text)
    .bind(question.difficulty_level)
    .bind(&question.correct_answer)
    .bind(&question.option_a)
    .bind(&question.option_b)
    .bind(&question.option_c)
    .bind(&question.option_d)
    .bind(question.is_active)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

#[async_trait]
impl QuestionRepository for SqliteQuestionRepository {
    async fn create(
        &self,
        category_id: i64,
        question: QuestionCreate,
    ) -> RepositoryResult<Question> {
        let id = insert_question(&self.pool, category_id, &question).await?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn create_many(
        &self,
        category_id: i64,
        questions: Vec<QuestionCreate>,
    ) -> RepositoryResult<Vec<Question>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(questions.len());

        for question in &questions {
            let id = insert_question(&mut *tx, category_id, question).await?;
            let row = sqlx::query_as::<_, Question>(&format!(
                "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"
            ))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn list_by_category(&self, category_id: i64) -> RepositoryResult<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE category_id = ? ORDER BY id"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn update(&self, id: i64, changes: QuestionUpdate) -> RepositoryResult<Question> {
        let current = self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)?;

        sqlx::query(
            r#"
            UPDATE questions
            SET question_text = ?, difficulty_level = ?, correct_answer = ?,
                option_a = ?, option_b = ?, option_c = ?, option_d = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(changes.question_text.unwrap_or(current.question_text))
        .bind(changes.difficulty_level.unwrap_or(current.difficulty_level))
        .bind(changes.correct_answer.unwrap_or(current.correct_answer))
        .bind(changes.option_a.unwrap_or(current.option_a))
        .bind(changes.option_b.unwrap_or(current.option_b))
        .bind(changes.option_c.unwrap_or(current.option_c))
        .bind(changes.option_d.unwrap_or(current.option_d))
        .bind(changes.is_active.unwrap_or(current.is_active))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }
}
