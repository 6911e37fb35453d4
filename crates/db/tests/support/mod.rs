use folio_db::Db;
use tempfile::TempDir;

pub struct TestDb {
    pub db: Db,
    _dir: TempDir,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut db = Db::open(dir.path().join("test.sqlite")).expect("open db");
    db.migrate().expect("migrate db");
    TestDb { db, _dir: dir }
}
