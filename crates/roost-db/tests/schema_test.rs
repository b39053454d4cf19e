//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    roost_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "user",
        "property",
        "booking",
        "review",
        "host_request",
        "ephemeral_token",
        "queue_message",
        "_migration",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    roost_db::run_migrations(&db).await.unwrap();
    roost_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn schema_rejects_out_of_range_rating() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    roost_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE review SET property_id = 'p', guest_id = 'g', \
             rating = 9, comment = 'too good', is_deleted = false",
        )
        .await
        .unwrap()
        .check();
    assert!(result.is_err(), "rating 9 should violate the ASSERT");
}

#[test]
fn exported_ddl_enforces_enums() {
    let ddl = roost_db::schema_v1();
    assert!(ddl.contains("ASSERT $value IN ['Pending', 'Confirmed', 'Completed', 'Canceled']"));
    assert!(ddl.contains("ASSERT $value IN ['Guest', 'Host', 'Admin']"));
}
