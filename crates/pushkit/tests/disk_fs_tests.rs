//! DiskFs contract tests against a temporary directory.

use pretty_assertions::assert_eq;
use pushkit::{
    Directory, DiskFs, DiskFsConfig, Encoding, Error, FileSystem, FileType, FileUtil, InMemoryFs,
};
use std::sync::Arc;
use tempfile::TempDir;

const UTF8: Option<Encoding> = Some(Encoding::Utf8);

fn disk() -> (TempDir, Arc<DiskFs>) {
    let tmp = tempfile::tempdir().unwrap();
    let fs = Arc::new(DiskFs::new(DiskFsConfig::under(tmp.path())));
    (tmp, fs)
}

#[tokio::test]
async fn write_read_and_stat() {
    let (_tmp, fs) = disk();

    fs.write_file(Directory::Data, "app.json", r#"{"label":"v3"}"#, UTF8)
        .await
        .unwrap();

    let meta = fs.stat(Directory::Data, "app.json").await.unwrap();
    assert_eq!(meta.file_type, FileType::File);
    assert_eq!(meta.size, 14);
    assert!(meta.uri.starts_with("file://"));
    assert!(meta.uri.ends_with("/data/app.json"));

    let content = fs.read_file(Directory::Data, "app.json", UTF8).await.unwrap();
    assert_eq!(content, r#"{"label":"v3"}"#);
}

#[tokio::test]
async fn files_land_under_the_mapped_root() {
    let (tmp, fs) = disk();

    fs.write_file(Directory::Cache, "blob.bin", "AAEC", None)
        .await
        .unwrap();

    let on_disk = std::fs::read(tmp.path().join("cache").join("blob.bin")).unwrap();
    assert_eq!(on_disk, vec![0u8, 1, 2]);
}

#[tokio::test]
async fn mkdir_semantics() {
    let (_tmp, fs) = disk();

    let err = fs.mkdir(Directory::Data, "a/b", false).await.unwrap_err();
    assert!(err.is_not_found());

    fs.mkdir(Directory::Data, "a/b/c", true).await.unwrap();
    fs.mkdir(Directory::Data, "a/b/c", true).await.unwrap();
    let err = fs.mkdir(Directory::Data, "a/b/c", false).await.unwrap_err();
    assert_eq!(err.code(), "EEXIST");

    fs.write_file(Directory::Data, "a/file", "x", UTF8)
        .await
        .unwrap();
    let err = fs.mkdir(Directory::Data, "a/file/sub", true).await.unwrap_err();
    assert_eq!(err.code(), "EEXIST");
}

#[tokio::test]
async fn rmdir_semantics() {
    let (tmp, fs) = disk();
    fs.mkdir(Directory::Data, "pkg/www", true).await.unwrap();
    fs.write_file(Directory::Data, "pkg/www/index.html", "<html>", UTF8)
        .await
        .unwrap();

    let err = fs.rmdir(Directory::Data, "pkg", false).await.unwrap_err();
    assert!(err.to_string().contains("not empty"));

    let err = fs
        .rmdir(Directory::Data, "pkg/www/index.html", true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not a directory"));

    fs.rmdir(Directory::Data, "pkg", true).await.unwrap();
    assert!(!tmp.path().join("data").join("pkg").exists());

    let err = fs.rmdir(Directory::Data, "pkg", true).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn rmdir_of_root_keeps_root() {
    let (tmp, fs) = disk();
    fs.mkdir(Directory::Data, "pkg", false).await.unwrap();
    fs.write_file(Directory::Data, "top.txt", "x", UTF8)
        .await
        .unwrap();

    fs.rmdir(Directory::Data, "", true).await.unwrap();

    let root = tmp.path().join("data");
    assert!(root.is_dir());
    assert_eq!(std::fs::read_dir(root).unwrap().count(), 0);
}

#[tokio::test]
async fn delete_file_semantics() {
    let (_tmp, fs) = disk();
    fs.mkdir(Directory::Data, "d", false).await.unwrap();

    let err = fs.delete_file(Directory::Data, "d").await.unwrap_err();
    assert!(err.to_string().contains("is a directory"));

    let err = fs.delete_file(Directory::Data, "missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn read_directory_fails() {
    let (_tmp, fs) = disk();
    fs.mkdir(Directory::Data, "d", false).await.unwrap();

    let err = fs.read_file(Directory::Data, "d", UTF8).await.unwrap_err();
    assert!(err.to_string().contains("is a directory"));
}

#[tokio::test]
async fn unmapped_root_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let fs = DiskFs::new(DiskFsConfig::new().root(Directory::Data, tmp.path()));

    let err = fs
        .write_file(Directory::Documents, "x.txt", "x", UTF8)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnmappedDirectory(Directory::Documents)));
}

#[tokio::test]
async fn config_loads_from_json_file() {
    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("appdata");
    let config_path = tmp.path().join("pushkit.json");
    let json = serde_json::json!({ "roots": { "DATA": data_dir } });
    std::fs::write(&config_path, json.to_string()).unwrap();

    let config = DiskFsConfig::load(&config_path).await.unwrap();
    assert_eq!(config.roots.get(&Directory::Data), Some(&data_dir));

    let err = DiskFsConfig::load(tmp.path().join("missing.json"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// --- facade over disk ---

#[tokio::test]
async fn facade_clean_and_stage_package() {
    let (tmp, fs) = disk();
    let util = FileUtil::new(fs);

    let first = util.clean_data_directory("updates/pending").await.unwrap();
    util.write_string_to_data_file("{}", "updates/pending/app.json", true)
        .await
        .unwrap();

    let second = util.clean_data_directory("updates/pending").await.unwrap();
    assert_eq!(first, second);

    let dir = tmp.path().join("data").join("updates").join("pending");
    assert!(dir.is_dir());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

#[tokio::test]
async fn facade_existence_and_batch_delete() {
    let (_tmp, fs) = disk();
    let util = FileUtil::new(fs);
    util.clean_data_directory("pkg").await.unwrap();
    util.write_string_to_data_file("a", "pkg/a.txt", true)
        .await
        .unwrap();

    assert!(util.file_exists(Directory::Data, "pkg/a.txt").await);
    assert!(util.data_directory_exists("pkg").await);
    assert!(!util.file_exists(Directory::Data, "pkg/b.txt").await);

    util.delete_entries_from_data_directory("pkg", ["a.txt", "b.txt"])
        .await
        .unwrap();
    assert!(!util.file_exists(Directory::Data, "pkg/a.txt").await);
}

#[tokio::test]
async fn facade_write_round_trip() {
    let (_tmp, fs) = disk();
    let util = FileUtil::new(fs);

    util.write_string_to_file("hello", Directory::Documents, "x.txt", true)
        .await
        .unwrap();
    assert_eq!(
        util.read_file(Directory::Documents, "x.txt").await.unwrap(),
        "hello"
    );
}

#[tokio::test]
async fn mapped_roots_exist_before_first_write() {
    let (tmp, fs) = disk();
    let on_disk = FileUtil::new(fs.clone());
    let in_memory = FileUtil::new(Arc::new(InMemoryFs::new()));

    for util in [&on_disk, &in_memory] {
        assert!(util.data_directory_exists("").await);
        assert!(util.directory_exists(Directory::Cache, "/").await);
    }

    let meta = fs.stat(Directory::Documents, "").await.unwrap();
    assert_eq!(meta.file_type, FileType::Directory);
    assert!(tmp.path().join("documents").is_dir());

    fs.rmdir(Directory::Library, "", false).await.unwrap();
    assert!(tmp.path().join("library").is_dir());
}

#[cfg(unix)]
#[tokio::test]
async fn backslash_names_address_a_single_entry() {
    let (tmp, fs) = disk();
    let pkg = tmp.path().join("data").join("pkg");
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("a\\b.txt"), "x").unwrap();
    let util = FileUtil::new(fs);

    assert!(util.file_exists(Directory::Data, "pkg/a\\b.txt").await);
    assert!(!util.directory_exists(Directory::Data, "pkg/a").await);

    util.delete_entries_from_data_directory("pkg", ["a\\b.txt"])
        .await
        .unwrap();
    assert!(!pkg.join("a\\b.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn symlinks_leaving_the_root_are_rejected() {
    let (tmp, fs) = disk();
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();

    let data = tmp.path().join("data");
    std::fs::create_dir_all(data.join("pkg")).unwrap();
    std::os::unix::fs::symlink(outside.path(), data.join("link")).unwrap();
    std::os::unix::fs::symlink(outside.path().join("gone.txt"), data.join("dangling")).unwrap();

    let err = fs
        .read_file(Directory::Data, "link/secret.txt", UTF8)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPath(_)));

    let err = fs
        .write_file(Directory::Data, "link/planted.txt", "x", UTF8)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPath(_)));
    assert!(!outside.path().join("planted.txt").exists());

    let err = fs
        .write_file(Directory::Data, "dangling", "x", UTF8)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPath(_)));
    assert!(!outside.path().join("gone.txt").exists());

    let err = fs.rmdir(Directory::Data, "link", true).await.unwrap_err();
    assert!(matches!(err, Error::InvalidPath(_)));
    assert!(outside.path().join("secret.txt").exists());

    let util = FileUtil::new(fs.clone());
    assert!(!util.file_exists(Directory::Data, "link/secret.txt").await);
}

#[cfg(unix)]
#[tokio::test]
async fn symlinks_inside_the_root_are_followed() {
    let (tmp, fs) = disk();
    let data = tmp.path().join("data");
    std::fs::create_dir_all(data.join("pkg")).unwrap();
    std::fs::write(data.join("pkg").join("a.txt"), "inside").unwrap();
    std::os::unix::fs::symlink(data.join("pkg"), data.join("alias")).unwrap();

    let content = fs.read_file(Directory::Data, "alias/a.txt", UTF8).await.unwrap();
    assert_eq!(content, "inside");
}
