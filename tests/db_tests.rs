use quizgame::{db, test_utils::test_helpers};

#[tokio::test]
async fn test_file_database_survives_reconnect() {
    let (pool, temp_file) = test_helpers::create_test_db_file().await.unwrap();
    test_helpers::insert_test_user(&pool, "disk@example.com", "diskuser", "Secret1!", true)
        .await
        .unwrap();
    pool.close().await;

    let url = format!("sqlite://{}", temp_file.path().display());
    let reopened = db::create_pool(&url).await.unwrap();
    db::run_migrations(&reopened).await.unwrap();

    assert_eq!(test_helpers::count_rows(&reopened, "users").await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_pool_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("quiz.db");

    let pool = db::create_pool(&format!("sqlite://{}", path.display()))
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();

    assert!(path.exists());
}

#[tokio::test]
async fn test_only_verified_accounts_are_unique() {
    let pool = test_helpers::create_test_db().await.unwrap();

    test_helpers::insert_test_user(&pool, "dup@example.com", "dupname", "Secret1!", false)
        .await
        .unwrap();
    test_helpers::insert_test_user(&pool, "dup@example.com", "dupname", "Secret1!", false)
        .await
        .unwrap();
    test_helpers::insert_test_user(&pool, "dup@example.com", "dupname", "Secret1!", true)
        .await
        .unwrap();

    let second_verified =
        test_helpers::insert_test_user(&pool, "dup@example.com", "othername", "Secret1!", true)
            .await;
    assert!(second_verified.is_err());
}
