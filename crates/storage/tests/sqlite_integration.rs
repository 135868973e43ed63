use quiz_core::model::{CategoryId, Difficulty, QuizId};
use storage::sqlite::SqliteRepository;
use storage::{Catalog, ContentProvider, Storage, StorageError};

async fn seeded(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo.import_catalog(&Catalog::builtin().unwrap())
        .await
        .expect("import");
    repo
}

#[tokio::test]
async fn sqlite_serves_categories_with_derived_counts() {
    let repo = seeded("memdb_categories").await;

    let categories = repo.list_categories().await.unwrap();
    let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["history", "science", "math", "programming"]);
    let total: usize = categories.iter().map(|c| c.quiz_count).sum();
    assert_eq!(total, 15);

    let science = repo.get_category(&CategoryId::new("science")).await.unwrap();
    assert_eq!(science.quiz_count, 4);
}

#[tokio::test]
async fn sqlite_lists_quizzes_in_catalog_order() {
    let repo = seeded("memdb_quizzes").await;

    let quizzes = repo.list_quizzes(&CategoryId::new("math")).await.unwrap();
    let ids: Vec<&str> = quizzes.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["algebra-basics", "calculus", "geometry"]);
    assert!(quizzes.iter().all(|q| q.question_count == 5));

    let unknown = repo.list_quizzes(&CategoryId::new("music")).await.unwrap();
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn sqlite_rebuilds_full_definition() {
    let repo = seeded("memdb_definition").await;

    let quiz = repo.get_quiz(&QuizId::new("world-wars")).await.unwrap();
    assert_eq!(quiz.difficulty(), Difficulty::Hard);
    assert_eq!(quiz.estimated_minutes(), 12);
    assert_eq!(quiz.question_count(), 5);
    let first = &quiz.questions()[0];
    assert_eq!(first.option(first.correct_index()), Some("1914"));
}

#[tokio::test]
async fn sqlite_missing_quiz_and_category_are_not_found() {
    let repo = seeded("memdb_missing").await;

    assert!(matches!(
        repo.get_quiz(&QuizId::new("nope")).await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.get_category(&CategoryId::new("nope")).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn reimport_is_idempotent() {
    let repo = seeded("memdb_reimport").await;
    repo.import_catalog(&Catalog::builtin().unwrap())
        .await
        .expect("second import");

    let quiz = repo.get_quiz(&QuizId::new("astronomy")).await.unwrap();
    assert_eq!(quiz.question_count(), 5);
    let categories = repo.list_categories().await.unwrap();
    assert_eq!(categories.len(), 4);
}

#[tokio::test]
async fn storage_sqlite_seeds_and_serves_content() {
    let catalog = Catalog::builtin().unwrap();
    let storage = Storage::sqlite(
        "sqlite:file:memdb_storage_seed?mode=memory&cache=shared",
        Some(&catalog),
    )
    .await
    .unwrap();

    let quizzes = storage
        .content
        .list_quizzes(&CategoryId::new("programming"))
        .await
        .unwrap();
    assert_eq!(quizzes.len(), 5);
}

#[tokio::test]
async fn quiz_without_questions_is_malformed() {
    let repo = seeded("memdb_no_questions").await;
    sqlx::query("DELETE FROM questions WHERE quiz_id = 'calculus'")
        .execute(repo.pool())
        .await
        .unwrap();

    let err = repo.get_quiz(&QuizId::new("calculus")).await.unwrap_err();
    assert!(matches!(err, StorageError::Malformed(_)), "{err:?}");

    // Listings still work; only loading the definition fails.
    let math = repo.list_quizzes(&CategoryId::new("math")).await.unwrap();
    let calculus = math.iter().find(|q| q.id.as_str() == "calculus").unwrap();
    assert_eq!(calculus.question_count, 0);
}

#[tokio::test]
async fn out_of_range_correct_index_is_malformed() {
    let repo = seeded("memdb_bad_index").await;
    sqlx::query("UPDATE questions SET correct_index = 9 WHERE quiz_id = 'geometry' AND position = 2")
        .execute(repo.pool())
        .await
        .unwrap();

    let err = repo.get_quiz(&QuizId::new("geometry")).await.unwrap_err();
    match err {
        StorageError::Malformed(reason) => assert!(reason.contains("geometry"), "{reason}"),
        other => panic!("unexpected error: {other:?}"),
    }
}
