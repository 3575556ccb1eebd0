//! End-to-end tests: disk scan, sitemap encoding and reading it back.

use resync_builder::{BuilderConfig, FileFetcher, InventoryBuilder};
use resync_codec::{
    decode_inventory, encode_inventory, fs::write_sitemap, EncodedInventory, SitemapConfig,
};
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const FILE_A: &[u8] = b"This is file_a data\n";
const FILE_B: &[u8] = b"The content of file_b is a little longer....\n";

fn write_with_mtime(path: &Path, data: &[u8], secs: u64) {
    fs::write(path, data).unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

fn testdata() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_with_mtime(&dir.path().join("file_a"), FILE_A, 1_331_761_564);
    write_with_mtime(&dir.path().join("file_b"), FILE_B, 1_331_761_585);
    dir
}

fn encode_single(builder: &InventoryBuilder, root: &Path) -> String {
    let report = builder.from_disk(root, "http://example.org/t").unwrap();
    assert_eq!(report.added, 2);
    match encode_inventory(&report.inventory, &SitemapConfig::default(), "sitemap.xml").unwrap() {
        EncodedInventory::Single(bytes) => String::from_utf8(bytes).unwrap(),
        EncodedInventory::Multi { .. } => panic!("expected a single sitemap"),
    }
}

#[test]
fn two_files_without_md5() {
    let dir = testdata();
    let builder = InventoryBuilder::new(BuilderConfig::default()).unwrap();

    let xml = encode_single(&builder, dir.path());
    assert_eq!(
        xml,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:rs=\"http://resourcesync.org/change/0.1\">\
         <url><loc>http://example.org/t/file_a</loc>\
         <lastmod>2012-03-14T21:46:04Z</lastmod><rs:size>20</rs:size></url>\
         <url><loc>http://example.org/t/file_b</loc>\
         <lastmod>2012-03-14T21:46:25Z</lastmod><rs:size>45</rs:size></url>\
         </urlset>"
    );
    assert!(!xml.contains("rs:md5"));
}

#[test]
fn two_files_with_md5() {
    let dir = testdata();
    let builder = InventoryBuilder::new(BuilderConfig::new().do_md5(true)).unwrap();

    let xml = encode_single(&builder, dir.path());
    assert!(xml.contains(
        "<url><loc>http://example.org/t/file_a</loc>\
         <lastmod>2012-03-14T21:46:04Z</lastmod><rs:size>20</rs:size>\
         <rs:md5>723ff6f6961d69e4177ba35b7776737c</rs:md5></url>"
    ));
    assert!(xml.contains(
        "<url><loc>http://example.org/t/file_b</loc>\
         <lastmod>2012-03-14T21:46:25Z</lastmod><rs:size>45</rs:size>\
         <rs:md5>c5609bb28b73f677dc968299f125bd0c</rs:md5></url>"
    ));
}

#[test]
fn written_sitemap_is_excluded_from_rescan() {
    let dir = testdata();
    let builder = InventoryBuilder::new(BuilderConfig::default()).unwrap();
    let report = builder.from_disk(dir.path(), "http://example.org/t").unwrap();

    write_sitemap(
        &report.inventory,
        &dir.path().join("sitemap.xml"),
        &SitemapConfig::default(),
    )
    .unwrap();

    let rescan = builder.from_disk(dir.path(), "http://example.org/t").unwrap();
    assert_eq!(rescan.inventory, report.inventory);
}

#[test]
fn split_sitemap_round_trips_through_file_fetcher() {
    let source = TempDir::new().unwrap();
    for i in 0..7 {
        fs::write(source.path().join(format!("r{i}")), vec![b'x'; i]).unwrap();
    }
    let out = TempDir::new().unwrap();
    let out_dir = out.path().to_string_lossy().to_string();

    let builder = InventoryBuilder::new(BuilderConfig::default()).unwrap();
    let report = builder.from_disk(source.path(), "http://example.org/r").unwrap();

    let config = SitemapConfig::new()
        .max_entries(3)
        .allow_multi_file(true)
        .with_mapping(&out_dir, "http://example.org/sitemaps");
    let index_path = out.path().join("sitemap.xml");
    let summary = write_sitemap(&report.inventory, &index_path, &config).unwrap();
    assert!(summary.is_index);
    assert_eq!(summary.files.len(), 4);

    // The index alone is refused as a leaf
    let index_bytes = fs::read(&index_path).unwrap();
    assert!(decode_inventory(&index_bytes).is_err());

    let fetcher = FileFetcher::new().with_mapping("http://example.org/sitemaps", &out_dir);
    let collected = builder
        .collect_remote(&fetcher, &index_path.to_string_lossy())
        .unwrap();

    assert_eq!(collected.added, 7);
    assert_eq!(collected.inventory, report.inventory);
    for (read, built) in collected.inventory.iter().zip(report.inventory.iter()) {
        assert!(read.same_fields(built));
    }
}
