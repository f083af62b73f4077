use crate::error::Result;
use crate::models::{CategoryCreate, CategoryUpdate, QuestionCreate, QuestionUpdate};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// POST /api/v1/question/categories
pub async fn create_category_handler(
    State(state): State<AppState>,
    Json(body): Json<CategoryCreate>,
) -> Result<impl IntoResponse> {
    let category = state.quiz_service.create_category(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category created successfully",
            "category": category,
        })),
    ))
}

/// POST /api/v1/question/categories/bulk
///
/// All-or-nothing: a duplicate within the batch or against stored names
/// rejects every row.
pub async fn create_categories_bulk_handler(
    State(state): State<AppState>,
    Json(body): Json<Vec<CategoryCreate>>,
) -> Result<impl IntoResponse> {
    let categories = state.quiz_service.create_categories_bulk(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Categories created successfully",
            "categories_created": categories.len(),
            "categories": categories,
        })),
    ))
}

/// GET /api/v1/question/categories
pub async fn list_categories_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.quiz_service.list_categories().await?;

    Ok(Json(categories))
}

/// PATCH /api/v1/question/categories/{id}
pub async fn update_category_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CategoryUpdate>,
) -> Result<impl IntoResponse> {
    let category = state.quiz_service.update_category(id, body).await?;

    Ok(Json(json!({
        "message": "Category updated successfully",
        "category": category,
    })))
}

/// POST /api/v1/question/categories/{id}/questions
pub async fn create_question_handler(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(body): Json<QuestionCreate>,
) -> Result<impl IntoResponse> {
    let question = state.quiz_service.create_question(category_id, body).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Question created successfully",
            "question": question,
        })),
    ))
}

/// POST /api/v1/question/categories/{id}/questions/bulk
pub async fn create_questions_bulk_handler(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Json(body): Json<Vec<QuestionCreate>>,
) -> Result<impl IntoResponse> {
    let batch = state
        .quiz_service
        .create_questions_bulk(category_id, body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Questions created successfully",
            "category_id": batch.category.id,
            "category_name": batch.category.name,
            "questions_created": batch.questions.len(),
            "questions": batch.questions,
        })),
    ))
}

/// GET /api/v1/question/categories/{id}/questions
pub async fn list_questions_handler(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let questions = state.quiz_service.list_questions(category_id).await?;

    Ok(Json(questions))
}

/// PATCH /api/v1/question/questions/{id}
pub async fn update_question_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<QuestionUpdate>,
) -> Result<impl IntoResponse> {
    let question = state.quiz_service.update_question(id, body).await?;

    Ok(Json(json!({
        "message": "Question updated successfully",
        "question": question,
    })))
}
