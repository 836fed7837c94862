use coalesced::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Build an archive by hand, mixing both length styles
fn handmade_archive() -> Vec<u8> {
    fn int(out: &mut Vec<u8>, v: i32) {
        out.extend_from_slice(&v.to_be_bytes());
    }
    fn utf16(out: &mut Vec<u8>, s: &str) {
        for unit in s.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }
    fn string(out: &mut Vec<u8>, s: &str) {
        int(out, -(s.encode_utf16().count() as i32 + 1));
        utf16(out, s);
        out.extend_from_slice(&[0, 0]);
    }

    let mut out = Vec::new();
    int(&mut out, 2);

    // entry 1: negative-style path with the engine prefix
    string(&mut out, "..\\..\\cfg\\Game.ini");
    int(&mut out, 1);
    string(&mut out, "Engine");
    int(&mut out, 1);
    string(&mut out, "bEnabled");
    string(&mut out, "True");

    // entry 2: positive-style path with forward slashes
    let path = "../../Localization/INT/Menu.int";
    int(&mut out, path.len() as i32 * 2);
    utf16(&mut out, path);
    out.extend_from_slice(&[0, 0]);
    int(&mut out, 2);
    string(&mut out, "Title");
    int(&mut out, 1);
    string(&mut out, "Text");
    int(&mut out, -12);
    utf16(&mut out, "line1");
    out.extend_from_slice(&[b'\n', 0]);
    utf16(&mut out, "line2");
    out.extend_from_slice(&[0, 0]);
    string(&mut out, "Empty");
    int(&mut out, 0);

    out
}

fn write_archive(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_unpack_writes_ini_tree() {
    let dir = tempdir().unwrap();
    let archive = write_archive(dir.path(), "Coalesced.bin", &handmade_archive());
    let out = dir.path().join("out");

    let result = CoalescedOperations::unpack_to(&archive, &out, &UnpackOptions::default()).unwrap();

    let root = out.join("Coalesced");
    assert_eq!(result.output_dir, root);
    assert_eq!(result.files.len(), 2);
    assert_eq!(
        fs::read_to_string(root.join("cfg").join("Game.ini")).unwrap(),
        "[Engine]\nbEnabled=True\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("Localization").join("INT").join("Menu.int")).unwrap(),
        "[Title]\nText=line1\u{b6}line2\n\n[Empty]\n"
    );
}

#[test]
fn test_unpack_repack_unpack_is_stable() {
    let dir = tempdir().unwrap();
    let archive = write_archive(dir.path(), "Coalesced_INT.dat", &handmade_archive());
    let original = CoalescedOperations::read(&archive).unwrap();

    let unpacked = CoalescedOperations::unpack(&archive).unwrap();
    let repacked = CoalescedOperations::repack(&unpacked.output_dir).unwrap();
    assert_eq!(repacked.output_file, dir.path().join("Coalesced_INT.BIN"));
    assert_eq!(repacked.entries, 2);
    assert_eq!(repacked.records, 2);

    // files are packed in name order, so the positive-style Menu.int path comes
    // first and is rewritten in the negative style with the engine prefix
    let bytes = fs::read(&repacked.output_file).unwrap();
    assert_eq!(&bytes[4..8], &(-32i32).to_be_bytes());

    let mut reread = CoalescedOperations::read(&repacked.output_file).unwrap();
    // repack walks files in sorted order
    reread.entries.sort_by(|a, b| a.path.cmp(&b.path));
    let mut expected = original.clone();
    expected.entries.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(reread, expected);
}

#[test]
fn test_repack_writes_engine_prefix_and_sentinel() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("cfg")).unwrap();
    fs::write(src.join("cfg").join("Game.ini"), "[S]\nk=a\u{b6}b\n").unwrap();

    let out = dir.path().join("packed.bin");
    CoalescedOperations::repack_to(&src, &out, &RepackOptions::default()).unwrap();
    let bytes = fs::read(&out).unwrap();

    let prefix: Vec<u8> = "..\\..\\cfg\\Game.ini"
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    assert_eq!(&bytes[4..8], &(-19i32).to_be_bytes());
    assert_eq!(&bytes[8..8 + prefix.len()], prefix.as_slice());
    assert_eq!(&bytes[bytes.len() - 8..], &[b'a', 0, b'\n', 0, b'b', 0, 0, 0]);
}

#[test]
fn test_repack_bare_paths() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.ini"), "[S]\nk=v\n").unwrap();

    let out = dir.path().join("packed.bin");
    let options = RepackOptions::new().with_path_convention(PathConvention::Bare);
    CoalescedOperations::repack_to(&src, &out, &options).unwrap();

    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[4..8], &(-6i32).to_be_bytes());
    assert_eq!(CoalescedOperations::read(&out).unwrap().entries[0].path, "a.ini");
}

#[test]
fn test_failed_repack_leaves_destination_untouched() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.ini"), "[S]\nk=v\n").unwrap();
    fs::write(src.join("b.ini"), "[S]\n=orphan\n").unwrap();

    let out = dir.path().join("packed.bin");
    fs::write(&out, b"previous good archive").unwrap();

    let err = CoalescedOperations::repack_to(&src, &out, &RepackOptions::default()).unwrap_err();
    match &err {
        Error::EntryFile { path, source } => {
            assert_eq!(path, &src.join("b.ini"));
            assert!(matches!(**source, Error::IniEmptyName { line: 2, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read(&out).unwrap(), b"previous good archive");
}

#[test]
fn test_rejects_implausible_entry_count_before_parsing() {
    let dir = tempdir().unwrap();
    for (name, count) in [("zero.bin", 0i32), ("huge.bin", 10_001)] {
        let archive = write_archive(dir.path(), name, &count.to_be_bytes());
        let out = dir.path().join("out");

        let err = CoalescedOperations::unpack_to(&archive, &out, &UnpackOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotCoalesced { count: c } if c == count));
        assert!(!out.exists());
    }
}

#[test]
fn test_truncated_archive_keeps_written_files() {
    let dir = tempdir().unwrap();
    let mut data = handmade_archive();
    data.truncate(data.len() - 6);
    let archive = write_archive(dir.path(), "Broken.bin", &data);

    let err = CoalescedOperations::unpack(&archive).unwrap_err();
    match &err {
        Error::UnpackAborted {
            written,
            total,
            source,
        } => {
            assert_eq!(*written, 1);
            assert_eq!(*total, 2);
            assert!(matches!(**source, Error::TruncatedStream { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.offset().is_some());
    assert!(dir.path().join("Broken").join("cfg").join("Game.ini").exists());
}

#[test]
fn test_traversal_cannot_escape_output() {
    let archive = CoalescedArchive {
        entries: vec![
            Entry::new("cfg\\..\\..\\..\\evil.ini")
                .with_section(Section::new("S").with_record("k", "v")),
        ],
    };
    let bytes = serialize_coalesced(&archive, PathConvention::Bare).unwrap();

    let dir = tempdir().unwrap();
    let input = write_archive(dir.path(), "Evil.bin", &bytes);
    let out = dir.path().join("nested").join("out");
    let result = CoalescedOperations::unpack_to(&input, &out, &UnpackOptions::default()).unwrap();

    assert_eq!(result.files, vec![out.join("Evil").join("cfg").join("evil.ini")]);
    assert!(!dir.path().join("evil.ini").exists());
}

#[test]
fn test_validate_and_list() {
    let dir = tempdir().unwrap();
    let archive = write_archive(dir.path(), "Coalesced.bin", &handmade_archive());

    let info = CoalescedOperations::validate(&archive).unwrap();
    assert_eq!(info.entry_count, 2);
    assert_eq!(info.first_entry.as_deref(), Some("cfg\\Game.ini"));

    let listing = CoalescedOperations::list(&archive).unwrap();
    let paths: Vec<_> = listing.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["cfg\\Game.ini", "Localization\\INT\\Menu.int"]);
    assert_eq!(listing[1].sections, 2);
    assert_eq!(listing[1].records, 1);
}

#[test]
fn test_dump_json() {
    let dir = tempdir().unwrap();
    let archive = write_archive(dir.path(), "Coalesced.bin", &handmade_archive());

    let json = CoalescedOperations::dump_json(&archive).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["entries"][0]["path"], "cfg\\Game.ini");
    assert_eq!(value["entries"][0]["sections"][0]["records"][0]["value"], "True");
}

#[test]
fn test_progress_reports_each_entry() {
    use std::cell::RefCell;

    let dir = tempdir().unwrap();
    let archive = write_archive(dir.path(), "Coalesced.bin", &handmade_archive());
    let seen = RefCell::new(Vec::new());

    CoalescedOperations::unpack_with_progress(
        &archive,
        None,
        &UnpackOptions::default(),
        &|p| seen.borrow_mut().push((p.phase, p.total, p.current_file.clone())),
    )
    .unwrap();

    let seen = seen.into_inner();
    // validation does not know the entry count yet
    assert_eq!(seen.first().map(|s| (s.0, s.1)), Some((CoalescedPhase::Validating, 0)));
    assert_eq!(seen.last().map(|s| (s.0, s.1)), Some((CoalescedPhase::Complete, 2)));
    let files: Vec<_> = seen.iter().filter_map(|s| s.2.clone()).collect();
    assert_eq!(files, ["cfg\\Game.ini", "Localization\\INT\\Menu.int"]);
}
