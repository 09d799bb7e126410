//! Integration tests for Husk

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn husk() -> Command {
        cargo_bin_cmd!("husk")
    }

    /// Config file pointing the stores at a sandbox directory
    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            format!(
                "[stores]\nroot = \"{}\"\n",
                dir.join("stores").display()
            ),
        )
        .unwrap();
        path
    }

    /// A small deployable asset tree
    fn write_assets(dir: &Path) -> PathBuf {
        let assets = dir.join("dist");
        std::fs::create_dir_all(assets.join("assets")).unwrap();
        std::fs::write(assets.join("index.html"), "<html>shell</html>").unwrap();
        std::fs::write(assets.join("app.js"), "console.log('app')").unwrap();
        std::fs::write(assets.join("assets/style.css"), "body{}").unwrap();
        assets
    }

    #[test]
    fn help_displays() {
        husk()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline-first asset cache manager"));
    }

    #[test]
    fn version_displays() {
        husk()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("husk"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());
        husk()
            .args(["config", "path"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());
        husk()
            .args(["config", "show"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("[stores]"));
    }

    #[test]
    fn config_set_roundtrip() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");

        husk()
            .args(["config", "set", "origin.url", "https://app.example.com"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success();

        husk()
            .args(["config", "show"])
            .arg("--config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("https://app.example.com"));
    }

    #[test]
    fn completions_generate() {
        husk()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("husk"));
    }

    #[test]
    fn manifest_gen_writes_deploy_manifest() {
        let temp = TempDir::new().unwrap();
        let assets = write_assets(temp.path());

        husk()
            .args(["manifest", "gen"])
            .arg(&assets)
            .assert()
            .success();

        let manifest = std::fs::read_to_string(assets.join("husk.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert!(parsed["resources"]["index.html"].is_string());
        assert!(parsed["resources"]["assets/style.css"].is_string());
        // The entry document is aliased to the root key.
        assert_eq!(parsed["resources"]["/"], parsed["resources"]["index.html"]);
        assert_eq!(parsed["core"][0], "index.html");
    }

    #[test]
    fn manifest_gen_rejects_unknown_core() {
        let temp = TempDir::new().unwrap();
        let assets = write_assets(temp.path());

        husk()
            .args(["manifest", "gen"])
            .arg(&assets)
            .args(["--core", "nope.js"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("nope.js"));
    }

    #[test]
    fn fetch_without_manifest_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());

        husk()
            .current_dir(temp.path())
            .args(["fetch", "app.js", "--no-local"])
            .arg("--config")
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Deploy manifest not found"))
            .stderr(predicate::str::contains("husk manifest gen"));
    }

    #[test]
    fn full_upgrade_cycle() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());
        let assets = write_assets(temp.path());
        let manifest = assets.join("husk.json");

        let run = |args: &[&str]| {
            let mut cmd = husk();
            cmd.current_dir(temp.path())
                .arg("--no-local")
                .arg("--config")
                .arg(&config);
            cmd.args(args);
            cmd
        };

        // Generate a manifest, then activate against the deploy directory.
        run(&["manifest", "gen"]).arg(&assets).assert().success();
        run(&["activate", "--manifest"])
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is ready"));

        // The staged core serves from cache; a miss populates lazily.
        run(&["fetch", "app.js", "--manifest"])
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("bytes"));

        // Fill the remaining tracked resources.
        run(&["fill", "--manifest"])
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("offline"));

        // Status reports a persisted manifest and a no-op upgrade.
        run(&["status", "--manifest"])
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("resources"))
            .stdout(predicate::str::contains("evict 0"));

        // An untracked request is refused with the routing hint.
        run(&["fetch", "not-tracked.js", "--manifest"])
            .arg(&manifest)
            .assert()
            .failure()
            .stderr(predicate::str::contains("not tracked"));

        // Clear tears everything down; the next status is cold.
        run(&["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deleted"));
        run(&["status", "--manifest"])
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("0 entries"))
            .stdout(predicate::str::contains("absent"));
    }

    #[test]
    fn upgrade_evicts_changed_resources() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path());
        let assets = write_assets(temp.path());
        let manifest = assets.join("husk.json");

        let run = |args: &[&str]| {
            let mut cmd = husk();
            cmd.current_dir(temp.path())
                .arg("--no-local")
                .arg("--config")
                .arg(&config);
            cmd.args(args);
            cmd
        };

        run(&["manifest", "gen"]).arg(&assets).assert().success();
        run(&["activate", "--manifest"]).arg(&manifest).assert().success();
        run(&["fill", "--manifest"]).arg(&manifest).assert().success();

        // Ship a new build with a changed app.js.
        std::fs::write(assets.join("app.js"), "console.log('app v2')").unwrap();
        run(&["manifest", "gen"]).arg(&assets).assert().success();

        // The preview sees one eviction before activation applies it.
        run(&["status", "--manifest"])
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("evict 1"));

        run(&["activate", "--manifest"]).arg(&manifest).assert().success();

        // The evicted resource refetches with the new bytes.
        let out = temp.path().join("app.js.out");
        run(&["fetch", "app.js", "--manifest"])
            .arg(&manifest)
            .arg("--output")
            .arg(&out)
            .assert()
            .success();
        let body = std::fs::read_to_string(&out).unwrap();
        assert!(body.contains("app v2"));
    }
}
