use diesel::prelude::*;
use diesel::sql_types::BigInt;

use tenant_crm::db::{get_connection, run_pending_migrations};

mod common;

#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[test]
fn test_creates_and_migrates_db_file() {
    let test_db = common::TestDb::new("test_creates_and_migrates_db_file.db");
    let conn = test_db.pool().get();
    assert!(conn.is_ok());
}

#[test]
fn test_migrations_are_idempotent() {
    let test_db = common::TestDb::new("test_migrations_are_idempotent.db");
    assert_eq!(run_pending_migrations(&test_db.pool()).unwrap(), 0);
}

#[test]
fn test_permission_catalog_is_seeded() {
    let test_db = common::TestDb::new("test_permission_catalog_is_seeded.db");
    let mut conn = get_connection(&test_db.pool()).unwrap();

    let row = diesel::sql_query("SELECT COUNT(*) AS count FROM permissions")
        .get_result::<Count>(&mut conn)
        .unwrap();
    assert_eq!(row.count, 28);
}
