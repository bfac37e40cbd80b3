//! Integration tests for chunkcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const TOC: &str = r#"{
  "version": 1,
  "entries": [
    {"type": "dir", "name": "usr/bin", "mode": 493},
    {
      "type": "reg",
      "name": "usr/bin/foo",
      "mode": 511,
      "size": 103867,
      "modtime": "1970-01-01T01:00:00+01:00",
      "digest": "sha256:99fe908c699dc068438b23e28319cadff1f2153c3043bafb8e83a430bba0a2c6",
      "offset": 94149,
      "endOffset": 120135,
      "chunkSize": 17615,
      "chunkDigest": "sha256:2ce0d0f8eb2aa93d13007097763e4459c814c8d0e859e5a57465af924169b544"
    },
    {
      "type": "chunk",
      "name": "usr/bin/foo",
      "offset": 99939,
      "chunkSize": 86252,
      "chunkOffset": 17615,
      "chunkDigest": "sha256:2a9d3f1b6b37abc8bb35eb8fa98b893a2a2447bcb01184c3bafc8c6b40da099d"
    }
  ]
}"#;

    /// Command isolated from any user configuration
    fn chunkcache(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("chunkcache");
        cmd.arg("--config").arg(dir.join("config.toml"));
        cmd
    }

    fn build(dir: &TempDir) {
        let toc = dir.path().join("toc.json");
        fs::write(&toc, TOC).unwrap();

        chunkcache(dir.path())
            .arg("build")
            .arg(&toc)
            .args(["--layer", "layer1", "--store"])
            .arg(dir.path().join("store"))
            .assert()
            .success()
            .stdout(predicate::str::contains("4 tags"));
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        chunkcache(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("digest location cache"));
    }

    #[test]
    fn build_writes_store_file() {
        let dir = TempDir::new().unwrap();
        build(&dir);

        assert!(dir
            .path()
            .join("store")
            .join("layer1")
            .join("chunked-manifest-cache")
            .is_file());
    }

    #[test]
    fn lookup_chunk_after_build() {
        let dir = TempDir::new().unwrap();
        build(&dir);

        chunkcache(dir.path())
            .args([
                "lookup",
                "sha256:2a9d3f1b6b37abc8bb35eb8fa98b893a2a2447bcb01184c3bafc8c6b40da099d",
                "--layer",
                "layer1",
                "--format",
                "plain",
                "--store",
            ])
            .arg(dir.path().join("store"))
            .assert()
            .success()
            .stdout(predicate::str::diff("usr/bin/foo\t17615\n"));
    }

    #[test]
    fn lookup_json_miss() {
        let dir = TempDir::new().unwrap();
        build(&dir);

        chunkcache(dir.path())
            .args(["lookup", "layer1", "--layer", "layer1", "--format", "json", "--store"])
            .arg(dir.path().join("store"))
            .assert()
            .success()
            .stdout(predicate::str::contains("\"found\": false"));
    }

    #[test]
    fn lookup_without_cache_fails() {
        let dir = TempDir::new().unwrap();

        chunkcache(dir.path())
            .args(["lookup", "sha256:aa", "--layer", "missing", "--store"])
            .arg(dir.path().join("store"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn build_malformed_toc_fails() {
        let dir = TempDir::new().unwrap();
        let toc = dir.path().join("toc.json");
        fs::write(&toc, "{\"entries\": [").unwrap();

        chunkcache(dir.path())
            .arg("build")
            .arg(&toc)
            .args(["--layer", "layer1", "--store"])
            .arg(dir.path().join("store"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Malformed TOC"));

        assert!(!dir.path().join("store").join("layer1").exists());
    }

    #[test]
    fn holes_summary() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("sparse.bin");
        fs::write(&file, b"\x00\x00\x00\x00\x00FOO\x00\x00\x00\x00\x00").unwrap();

        chunkcache(dir.path())
            .arg("holes")
            .arg(&file)
            .args(["--threshold", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("HOLES        2"))
            .stdout(predicate::str::contains("DATA BYTES   3"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        chunkcache(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_init_then_show() {
        let dir = TempDir::new().unwrap();
        chunkcache(dir.path())
            .args(["config", "init"])
            .assert()
            .success();
        assert!(dir.path().join("config.toml").is_file());

        chunkcache(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[compressor]"));
    }
}
