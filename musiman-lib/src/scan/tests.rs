use std::{
    cell::RefCell,
    fs, io,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::audio::MusicTypes;
use crate::config::ScanConfig;
use crate::scan::{scan, Candidate, ScanError, PREFIX_LEN};
use crate::sniff::{FileFormatSniffer, FileType, SniffError, Sniffed, TypeSniffer};

/// An empty ID3v2 tag and an MPEG-1 Layer III frame header, padded to `len`.
fn mp3_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"ID3\x04\x00\x00\x00\x00\x00\x00\xff\xfb\x90\x64".to_vec();
    bytes.resize(len, 0);
    bytes
}

fn write(root: &Path, relative: &str, contents: &[u8]) -> io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

fn collect<S: TypeSniffer>(
    root: &Path,
    config: &ScanConfig,
    sniffer: S,
) -> Result<Vec<Candidate>, ScanError> {
    scan(root, config, sniffer).collect()
}

fn relative_paths(root: &Path, candidates: &[Candidate]) -> Vec<String> {
    candidates
        .iter()
        .map(|c| {
            c.path
                .strip_prefix(root)
                .expect("candidate below root")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

/// Reports every non-empty input as the same type.
struct StaticSniffer(&'static str);

impl TypeSniffer for StaticSniffer {
    fn sniff(&self, _prefix: &[u8]) -> Sniffed {
        Sniffed::Matched(FileType {
            extension: self.0.to_string(),
            media_type: None,
            description: "static".to_string(),
        })
    }
}

struct FailingSniffer;

impl TypeSniffer for FailingSniffer {
    fn sniff(&self, _prefix: &[u8]) -> Sniffed {
        Sniffed::Failed(SniffError("signature database unavailable".into()))
    }
}

/// Remembers the length of every prefix it is shown.
#[derive(Default)]
struct RecordingSniffer {
    matches: Option<StaticSniffer>,
    prefix_lens: RefCell<Vec<usize>>,
}

impl TypeSniffer for RecordingSniffer {
    fn sniff(&self, prefix: &[u8]) -> Sniffed {
        self.prefix_lens.borrow_mut().push(prefix.len());
        match &self.matches {
            Some(sniffer) => sniffer.sniff(prefix),
            None => Sniffed::Unknown,
        }
    }
}

#[test]
fn finds_mp3_and_skips_text() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "song.mp3", &mp3_bytes(2000))?;
    write(dir.path(), "notes.txt", b"remember to buy milk\n")?;

    let candidates = collect(dir.path(), &ScanConfig::default(), FileFormatSniffer)?;

    assert_eq!(relative_paths(dir.path(), &candidates), ["song.mp3"]);
    let song = &candidates[0];
    assert_eq!(song.file_type.extension, "mp3");
    assert_eq!(song.size, 2000);
    assert_eq!(song.path, dir.path().join("song.mp3"));
    Ok(())
}

#[test]
fn detection_ignores_extension() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "disguised.txt", &mp3_bytes(512))?;
    write(dir.path(), "fake.mp3", b"just some words")?;

    let candidates = collect(dir.path(), &ScanConfig::default(), FileFormatSniffer)?;

    assert_eq!(relative_paths(dir.path(), &candidates), ["disguised.txt"]);
    Ok(())
}

#[test]
fn ignored_subtrees() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "keep/a.mp3", &mp3_bytes(100))?;
    write(dir.path(), "skip/b.mp3", &mp3_bytes(100))?;
    write(dir.path(), "skip/deeper/c.mp3", &mp3_bytes(100))?;
    write(dir.path(), "skipper/d.mp3", &mp3_bytes(100))?;

    let ignores: [PathBuf; 4] = [
        "skip".into(),
        "./skip/".into(),
        "keep/../skip".into(),
        dir.path().join("skip"),
    ];
    for ignore in ignores {
        let config = ScanConfig::default().with_ignore_paths([ignore.clone()]);
        let candidates = collect(dir.path(), &config, FileFormatSniffer)?;
        assert_eq!(
            relative_paths(dir.path(), &candidates),
            ["keep/a.mp3", "skipper/d.mp3"],
            "{ignore:?}"
        );
    }
    Ok(())
}

#[test]
fn ignored_single_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "a.mp3", &mp3_bytes(100))?;
    write(dir.path(), "b.mp3", &mp3_bytes(100))?;

    let config = ScanConfig::default().with_ignore_paths(["a.mp3"]);
    let candidates = collect(dir.path(), &config, FileFormatSniffer)?;

    assert_eq!(relative_paths(dir.path(), &candidates), ["b.mp3"]);
    Ok(())
}

#[test]
fn min_size() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "small.mp3", &mp3_bytes(999))?;
    write(dir.path(), "exact.mp3", &mp3_bytes(1000))?;
    write(dir.path(), "large.mp3", &mp3_bytes(4000))?;

    let config = ScanConfig::default().with_min_size(1000);
    let candidates = collect(dir.path(), &config, FileFormatSniffer)?;

    assert_eq!(
        relative_paths(dir.path(), &candidates),
        ["exact.mp3", "large.mp3"]
    );
    Ok(())
}

#[test]
fn empty_files_are_skipped() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "empty.mp3", b"")?;
    write(dir.path(), "full.mp3", b"x")?;

    let candidates = collect(dir.path(), &ScanConfig::default(), StaticSniffer("mp3"))?;

    assert_eq!(relative_paths(dir.path(), &candidates), ["full.mp3"]);
    Ok(())
}

#[test]
fn directories_are_not_candidates() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join("album.mp3/disc1"))?;

    let candidates = collect(dir.path(), &ScanConfig::default(), StaticSniffer("mp3"))?;

    assert!(candidates.is_empty());
    Ok(())
}

#[test]
fn non_music_types_are_skipped() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "photo", b"pretend this is a jpeg")?;

    let candidates = collect(dir.path(), &ScanConfig::default(), StaticSniffer("jpg"))?;
    assert!(candidates.is_empty());

    // Matching is exact, so upper case extensions are not music either.
    let candidates = collect(dir.path(), &ScanConfig::default(), StaticSniffer("MP3"))?;
    assert!(candidates.is_empty());
    Ok(())
}

#[test]
fn substituted_music_types() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "song.mp3", &mp3_bytes(100))?;

    let config = ScanConfig::default().with_music_types(MusicTypes::new(["flac"]));
    assert!(collect(dir.path(), &config, FileFormatSniffer)?.is_empty());

    let config = ScanConfig::default().with_music_types(MusicTypes::new(["mp3"]));
    assert_eq!(collect(dir.path(), &config, FileFormatSniffer)?.len(), 1);
    Ok(())
}

#[test]
fn sniffer_sees_bounded_prefix() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "a_large", &vec![7; PREFIX_LEN * 5])?;
    write(dir.path(), "b_small", &[7; 10])?;

    let sniffer = RecordingSniffer::default();
    let candidates = collect(dir.path(), &ScanConfig::default(), &sniffer)?;

    assert!(candidates.is_empty());
    assert_eq!(*sniffer.prefix_lens.borrow(), [PREFIX_LEN, 10]);
    Ok(())
}

#[test]
fn sniffer_failure_aborts() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write(dir.path(), "a.mp3", &mp3_bytes(100))?;
    write(dir.path(), "b.mp3", &mp3_bytes(100))?;

    let config = ScanConfig::default();
    let mut scan = scan(dir.path(), &config, FailingSniffer);
    match scan.next() {
        Some(Err(ScanError::Sniffer { path, .. })) => {
            assert_eq!(path, dir.path().join("a.mp3"))
        }
        other => panic!("expected a sniffer error, got {other:?}"),
    }
    assert!(scan.next().is_none());
    Ok(())
}

#[test]
fn missing_root_aborts() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path().join("nowhere");

    let config = ScanConfig::default();
    let mut scan = scan(&root, &config, FileFormatSniffer);
    assert!(matches!(scan.next(), Some(Err(ScanError::Walkdir(_)))));
    assert!(scan.next().is_none());
}

#[cfg(unix)]
#[test]
fn unreadable_entries_are_skipped() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new()?;
    write(dir.path(), "a.mp3", &mp3_bytes(100))?;
    write(dir.path(), "locked.mp3", &mp3_bytes(100))?;
    write(dir.path(), "locked_dir/c.mp3", &mp3_bytes(100))?;
    write(dir.path(), "z.mp3", &mp3_bytes(100))?;
    let locked = dir.path().join("locked.mp3");
    let locked_dir = dir.path().join("locked_dir");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o000))?;
    // Permission bits do not stop a privileged user.
    let enforced = fs::File::open(&locked).is_err() && fs::read_dir(&locked_dir).is_err();

    let result = collect(dir.path(), &ScanConfig::default(), FileFormatSniffer);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644))?;
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755))?;
    let candidates = result?;
    if enforced {
        assert_eq!(relative_paths(dir.path(), &candidates), ["a.mp3", "z.mp3"]);
    } else {
        assert_eq!(candidates.len(), 4);
    }
    Ok(())
}

#[test]
fn abandoning_scan_early() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    for name in ["a", "b", "c"] {
        write(dir.path(), name, b"data")?;
    }

    let sniffer = RecordingSniffer {
        matches: Some(StaticSniffer("mp3")),
        ..Default::default()
    };
    let first = scan(dir.path(), &ScanConfig::default(), &sniffer).next();

    assert!(matches!(first, Some(Ok(_))));
    assert_eq!(sniffer.prefix_lens.borrow().len(), 1);
    Ok(())
}

#[test]
fn normalize_paths() {
    use super::normalize;

    assert_eq!(normalize(Path::new("./a/b/")), PathBuf::from("a/b"));
    assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
    assert_eq!(normalize(Path::new("../../a")), PathBuf::from("../../a"));
    assert_eq!(normalize(Path::new(".")), PathBuf::new());
}
