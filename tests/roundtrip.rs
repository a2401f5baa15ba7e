use std::fs;
use std::path::{Path, PathBuf};

use paq::{Error, ScanOptions};
use tempfile::TempDir;

const NOTE: &[u8] = b"hello world";

/// 2048 bytes that are not valid UTF-8 and cover every byte value.
fn rabbit_png() -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend((0..2040u32).map(|i| (i * 7 % 256) as u8));
    data
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn table_len(container: &[u8]) -> usize {
    paq::paq::grammar::find_table_end(&container[6..]).unwrap()
}

#[tokio::test]
async fn note_and_rabbit_scenario() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let note = write_file(src.path(), "note.txt", NOTE);
    let rabbit = write_file(src.path(), "rabbit.png", &rabbit_png());

    let container = paq::pack(&work.path().join("test.pq"), &[note, rabbit])
        .await
        .unwrap();
    assert_eq!(container, work.path().join("test.pq"));

    let bytes = fs::read(&container).unwrap();
    assert_eq!(&bytes[..6], b"EPAQ01");
    assert_eq!(
        &bytes[6..6 + table_len(&bytes)],
        b"://note.txt>>11?://rabbit.png>>2048?;;"
    );
    assert_eq!(bytes.len(), 6 + table_len(&bytes) + 11 + 2048);

    let package = paq::scan(&container, ScanOptions::default()).await.unwrap();
    assert_eq!(package.name, "test.pq");
    assert_eq!(package.len(), 2);
    assert_eq!(package.entries[1].offset - package.entries[0].offset, 11);
    let listing = package.to_string();
    assert!(listing.contains("  note.txt (11 bytes, offset 44)"), "{listing}");
    assert!(listing.contains("  rabbit.png (2048 bytes, offset 55)"), "{listing}");

    let out = work.path().join("out");
    let written = paq::unpack(&container, &out, ScanOptions::default())
        .await
        .unwrap();
    assert_eq!(written, [out.join("note.txt"), out.join("rabbit.png")]);
    assert_eq!(fs::read(out.join("note.txt")).unwrap(), NOTE);
    assert_eq!(fs::read(out.join("rabbit.png")).unwrap(), rabbit_png());
}

#[tokio::test]
async fn offsets_chain_from_table_end() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = [("one", 1usize), ("empty", 0), ("big", 200_000), ("last", 17)]
        .iter()
        .map(|&(name, len)| write_file(src.path(), name, &vec![len as u8; len]))
        .collect();

    let container = paq::pack(&work.path().join("c.pq"), &inputs).await.unwrap();
    let bytes = fs::read(&container).unwrap();
    let package = paq::scan(&container, ScanOptions::default()).await.unwrap();

    assert_eq!(package.entries[0].offset, (6 + table_len(&bytes)) as u64);
    assert_eq!(package.data_offset, package.entries[0].offset);
    for pair in package.entries.windows(2) {
        assert_eq!(pair[1].offset, pair[0].offset + pair[0].size);
    }
    assert_eq!(package.entries.last().unwrap().end(), Some(bytes.len() as u64));
    assert!(bytes.len() as u64 > package.content_size());

    let out = work.path().join("out");
    paq::unpack(&container, &out, ScanOptions::default()).await.unwrap();
    for input in &inputs {
        let name = input.file_name().unwrap();
        assert_eq!(fs::read(out.join(name)).unwrap(), fs::read(input).unwrap());
    }
}

#[tokio::test]
async fn directory_is_expanded_one_level() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let dir = src.path().join("docs");
    fs::create_dir(&dir).unwrap();
    write_file(&dir, "b.txt", b"bbbbb");
    write_file(&dir, "a.txt", b"aaa");
    fs::create_dir(dir.join("deeper")).unwrap();
    write_file(&dir.join("deeper"), "hidden.txt", b"not packed");

    let container = paq::pack(&work.path().join("d.pq"), &[dir]).await.unwrap();
    let bytes = fs::read(&container).unwrap();
    assert_eq!(&bytes[6..6 + table_len(&bytes)], b"://a.txt>>3?://b.txt>>5?;;");

    let out = work.path().join("out");
    paq::unpack(&container, &out, ScanOptions::default()).await.unwrap();
    assert_eq!(fs::read(out.join("a.txt")).unwrap(), b"aaa");
    assert_eq!(fs::read(out.join("b.txt")).unwrap(), b"bbbbb");
    assert!(!out.join("hidden.txt").exists());
}

#[tokio::test]
async fn empty_input_gives_empty_table() {
    let work = TempDir::new().unwrap();
    let container = paq::pack(&work.path().join("empty.pq"), &[]).await.unwrap();

    assert_eq!(fs::read(&container).unwrap(), b"EPAQ01;;");
    let package = paq::scan(&container, ScanOptions::default()).await.unwrap();
    assert!(package.is_empty());

    let out = work.path().join("out");
    let written = paq::unpack(&container, &out, ScanOptions::default())
        .await
        .unwrap();
    assert!(written.is_empty());
}

#[tokio::test]
async fn second_pack_never_overwrites_first() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let first_input = write_file(src.path(), "first.txt", b"first");
    let second_input = write_file(src.path(), "second.txt", b"second");
    let requested = work.path().join("same.pq");

    let first = paq::pack(&requested, &[first_input]).await.unwrap();
    let before = fs::read(&first).unwrap();
    let second = paq::pack(&requested, &[second_input]).await.unwrap();

    assert_eq!(first, requested);
    assert_eq!(second, work.path().join("same.pq2"));
    assert_eq!(fs::read(&first).unwrap(), before);

    let package = paq::scan(&second, ScanOptions::default()).await.unwrap();
    assert_eq!(package.entries[0].name, "second.txt");
}

#[tokio::test]
async fn unpack_overwrites_existing_files() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let input = write_file(src.path(), "note.txt", NOTE);
    let container = paq::pack(&work.path().join("n.pq"), &[input]).await.unwrap();

    let out = work.path().join("out");
    fs::create_dir(&out).unwrap();
    write_file(&out, "note.txt", b"an older and much longer note");

    paq::unpack(&container, &out, ScanOptions::default()).await.unwrap();
    assert_eq!(fs::read(out.join("note.txt")).unwrap(), NOTE);
}

#[tokio::test]
async fn missing_input_fails_before_creating_output() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let present = write_file(src.path(), "present.txt", b"here");
    let missing = src.path().join("missing.txt");
    let target = work.path().join("never.pq");

    let err = paq::pack_into(&target, &[present, missing.clone()])
        .await
        .unwrap_err();
    match err {
        Error::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!target.exists());
}

#[tokio::test]
async fn unencodable_name_leaves_partial_output() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let odd = write_file(src.path(), "why?.txt", b"?");
    let target = work.path().join("odd.pq");

    let err = paq::pack_into(&target, &[odd]).await.unwrap_err();
    assert!(matches!(err, Error::UnencodableName(ref name) if name == "why?.txt"));
    // Removing the partial container is up to the caller.
    assert_eq!(fs::read(&target).unwrap(), b"EPAQ01");
}

#[tokio::test]
async fn scanning_several_packages_keeps_them_apart() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let a = write_file(src.path(), "a.txt", b"a");
    let b = write_file(src.path(), "b.txt", b"bb");
    let first = paq::pack(&work.path().join("one.pq"), &[a]).await.unwrap();
    let second = paq::pack(&work.path().join("two.pq"), &[b]).await.unwrap();

    let packages = paq::scan_all(&[first, second], ScanOptions::default())
        .await
        .unwrap();
    let names: Vec<_> = packages
        .iter()
        .map(|p| (p.name.as_str(), p.entries[0].name.as_str()))
        .collect();
    assert_eq!(names, [("one.pq", "a.txt"), ("two.pq", "b.txt")]);
}

#[tokio::test]
async fn failed_pack_removes_only_its_own_output() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let odd = write_file(src.path(), "why?.txt", b"?");
    let requested = work.path().join("odd.pq");

    let err = paq::pack(&requested, &[odd]).await.unwrap_err();
    assert!(matches!(err, Error::UnencodableName(_)));
    assert!(!requested.exists());

    // A missing input fails before anything is created.
    let err = paq::pack(&requested, &[src.path().join("missing.txt")])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io { context: "stat", .. }));
    assert!(!requested.exists());
}

#[tokio::test]
async fn failed_pack_keeps_existing_containers() {
    let src = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let good = write_file(src.path(), "good.txt", b"good");
    let odd = write_file(src.path(), "why?.txt", b"?");
    let requested = work.path().join("keep.pq");

    let first = paq::pack(&requested, &[good]).await.unwrap();
    let before = fs::read(&first).unwrap();

    paq::pack(&requested, &[odd]).await.unwrap_err();
    assert_eq!(fs::read(&first).unwrap(), before);
    assert!(!work.path().join("keep.pq2").exists());
}
