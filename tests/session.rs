use std::fs;

use tabdb::{FileStorage, Result, Session};

fn open(root: &std::path::Path) -> Result<Session<FileStorage>> {
    Ok(Session::new(FileStorage::new(root)?))
}

#[test]
fn test_tables_persist_across_sessions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    {
        let mut s = open(dir.path())?;
        assert_eq!(s.handle_command("CREATE DATABASE Markbook;"), "[OK]");
        assert_eq!(s.handle_command("USE markbook;"), "[OK]");
        assert_eq!(s.handle_command("CREATE TABLE marks (name, mark, pass);"), "[OK]");
        assert_eq!(s.handle_command("INSERT INTO marks VALUES ('Simon', 65, TRUE);"), "[OK]");
        assert_eq!(s.handle_command("INSERT INTO marks VALUES ('Sion', 55, TRUE);"), "[OK]");
    }

    let content = fs::read_to_string(dir.path().join("markbook").join("marks.tab"))?;
    assert_eq!(content, "id\tname\tmark\tpass\n1\tSimon\t65\tTRUE\n2\tSion\t55\tTRUE\n");

    let mut s = open(dir.path())?;
    assert!(s.handle_command("SELECT * FROM marks;").starts_with("[ERROR]"));
    assert_eq!(s.handle_command("USE markbook;"), "[OK]");
    assert_eq!(
        s.handle_command("SELECT name FROM marks WHERE mark > 60;"),
        "[OK]\nname\nSimon"
    );
    Ok(())
}

#[test]
fn test_ids_are_not_reused_after_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    {
        let mut s = open(dir.path())?;
        s.execute("CREATE DATABASE db;")?;
        s.execute("USE db;")?;
        s.execute("CREATE TABLE t (a);")?;
        s.execute("INSERT INTO t VALUES (1);")?;
        s.execute("INSERT INTO t VALUES (2);")?;
        s.execute("DELETE FROM t WHERE a >= 1;")?;
    }

    let mut s = open(dir.path())?;
    s.execute("USE db;")?;
    s.execute("INSERT INTO t VALUES (3);")?;
    assert_eq!(s.handle_command("SELECT * FROM t;"), "[OK]\nid\ta\n3\t3");
    Ok(())
}

#[test]
fn test_failed_command_leaves_file_untouched() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut s = open(dir.path())?;
    s.execute("CREATE DATABASE db;")?;
    s.execute("USE db;")?;
    s.execute("CREATE TABLE t (a, b);")?;
    s.execute("INSERT INTO t VALUES ('x', 'y');")?;

    let path = dir.path().join("db").join("t.tab");
    let before = fs::read(&path)?;
    for sql in [
        "UPDATE t SET c = 1 WHERE a == 'x';",
        "UPDATE t SET a = 1 WHERE (a == 'x';",
        "INSERT INTO t VALUES ('only');",
        "ALTER TABLE t DROP id;",
        "DELETE FROM t WHERE;",
    ] {
        assert!(s.handle_command(sql).starts_with("[ERROR]"), "{}", sql);
    }
    assert_eq!(fs::read(&path)?, before);
    Ok(())
}

#[test]
fn test_drop_database_removes_directory() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut s = open(dir.path())?;
    s.execute("CREATE DATABASE db;")?;
    s.execute("USE db;")?;
    s.execute("CREATE TABLE t (a);")?;
    s.execute("INSERT INTO t VALUES (1);")?;
    s.execute("CREATE TABLE empty;")?;
    assert_eq!(s.handle_command("DROP DATABASE db;"), "[OK]");
    assert!(!dir.path().join("db").exists());
    assert!(s.handle_command("SELECT * FROM t;").starts_with("[ERROR]"));
    Ok(())
}
