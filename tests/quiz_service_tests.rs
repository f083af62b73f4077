use quizgame::{
    models::{CategoryCreate, CategoryUpdate, DifficultyLevel, QuestionCreate, QuestionUpdate},
    repositories::{SqliteCategoryRepository, SqliteQuestionRepository},
    services::{QuizService, QuizServiceError},
    test_utils::test_helpers,
};
use sqlx::SqlitePool;
use std::sync::Arc;

fn quiz_service(pool: &SqlitePool) -> QuizService {
    QuizService::new(
        Arc::new(SqliteCategoryRepository::new(pool.clone())),
        Arc::new(SqliteQuestionRepository::new(pool.clone())),
    )
}

fn category(name: &str) -> CategoryCreate {
    CategoryCreate {
        name: name.to_string(),
        description: format!("All about {}", name),
        difficulty_multiplier: 1.5,
        is_active: true,
    }
}

fn question(text: &str, difficulty: DifficultyLevel) -> QuestionCreate {
    QuestionCreate {
        question_text: text.to_string(),
        difficulty_level: difficulty,
        correct_answer: "4".to_string(),
        option_a: "3".to_string(),
        option_b: "4".to_string(),
        option_c: "5".to_string(),
        option_d: "22".to_string(),
        is_active: true,
    }
}

#[tokio::test]
async fn test_create_category_and_reject_duplicate() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);

    let created = service.create_category(category("Math")).await.unwrap();
    assert_eq!(created.name, "Math");
    assert_eq!(created.difficulty_multiplier, 1.5);

    let duplicate = service.create_category(category("Math")).await;
    assert!(matches!(duplicate, Err(QuizServiceError::CategoryExists)));
}

#[tokio::test]
async fn test_bulk_with_internal_duplicate_writes_nothing() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);

    let result = service
        .create_categories_bulk(vec![category("Math"), category("Art"), category("Math")])
        .await;

    assert!(matches!(result, Err(QuizServiceError::DuplicateInBatch)));
    assert_eq!(
        test_helpers::count_rows(&pool, "categories").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_bulk_conflict_names_every_stored_category() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);
    service.create_category(category("Art")).await.unwrap();
    service.create_category(category("History")).await.unwrap();

    let result = service
        .create_categories_bulk(vec![
            category("History"),
            category("Science"),
            category("Art"),
        ])
        .await;

    match result {
        Err(QuizServiceError::CategoriesExist(names)) => {
            assert_eq!(names, vec!["Art".to_string(), "History".to_string()])
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(
        test_helpers::count_rows(&pool, "categories").await.unwrap(),
        2
    );
}

#[tokio::test]
async fn test_bulk_creates_all_categories() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);

    let created = service
        .create_categories_bulk(vec![category("Science"), category("Music")])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);

    let listed = service.list_categories().await.unwrap();
    let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Music", "Science"]);
}

#[tokio::test]
async fn test_inactive_categories_are_hidden_and_closed_to_questions() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);
    let mut retired = category("Retired");
    retired.is_active = false;
    let retired = service.create_category(retired).await.unwrap();

    assert!(service.list_categories().await.unwrap().is_empty());

    let result = service
        .create_question(retired.id, question("2 + 2?", DifficultyLevel::Easy))
        .await;
    assert!(matches!(result, Err(QuizServiceError::CategoryNotFound)));
}

#[tokio::test]
async fn test_question_keeps_requested_difficulty() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);
    let math = service.create_category(category("Math")).await.unwrap();

    let created = service
        .create_question(math.id, question("2 + 2?", DifficultyLevel::Expert))
        .await
        .unwrap();
    assert_eq!(created.difficulty_level, DifficultyLevel::Expert);
    assert_eq!(created.category_id, math.id);

    let (stored,): (String,) = sqlx::query_as("SELECT difficulty_level FROM questions WHERE id = ?")
        .bind(created.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "expert");
}

#[tokio::test]
async fn test_questions_bulk_and_listing() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);
    let math = service.create_category(category("Math")).await.unwrap();

    let batch = service
        .create_questions_bulk(
            math.id,
            vec![
                question("2 + 2?", DifficultyLevel::Easy),
                question("2 * 2?", DifficultyLevel::Medium),
            ],
        )
        .await
        .unwrap();
    assert_eq!(batch.category.name, "Math");
    assert_eq!(batch.questions.len(), 2);

    let listed = service.list_questions(math.id).await.unwrap();
    let texts: Vec<_> = listed.iter().map(|q| q.question_text.as_str()).collect();
    assert_eq!(texts, vec!["2 + 2?", "2 * 2?"]);

    let missing = service.list_questions(math.id + 100).await;
    assert!(matches!(missing, Err(QuizServiceError::CategoryNotFound)));
}

#[tokio::test]
async fn test_questions_bulk_for_missing_category() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);

    let result = service
        .create_questions_bulk(42, vec![question("2 + 2?", DifficultyLevel::Easy)])
        .await;
    assert!(matches!(result, Err(QuizServiceError::CategoryNotFound)));
    assert_eq!(
        test_helpers::count_rows(&pool, "questions").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_partial_updates() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = quiz_service(&pool);
    let math = service.create_category(category("Math")).await.unwrap();
    service.create_category(category("Art")).await.unwrap();

    let renamed = service
        .update_category(
            math.id,
            CategoryUpdate {
                name: Some("Mathematics".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Mathematics");
    assert_eq!(renamed.description, math.description);
    assert!(renamed.updated_at >= math.updated_at);

    let clash = service
        .update_category(
            math.id,
            CategoryUpdate {
                name: Some("Art".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(clash, Err(QuizServiceError::CategoryExists)));

    let missing = service
        .update_category(999, CategoryUpdate::default())
        .await;
    assert!(matches!(missing, Err(QuizServiceError::CategoryNotFound)));

    let created = service
        .create_question(math.id, question("2 + 2?", DifficultyLevel::Easy))
        .await
        .unwrap();
    let updated = service
        .update_question(
            created.id,
            QuestionUpdate {
                difficulty_level: Some(DifficultyLevel::Hard),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.difficulty_level, DifficultyLevel::Hard);
    assert!(!updated.is_active);
    assert_eq!(updated.question_text, "2 + 2?");
}
