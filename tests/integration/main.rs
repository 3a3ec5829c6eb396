//! Integration tests for pgdrop

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// pgdrop with an isolated config file
    fn pgdrop(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("pgdrop");
        cmd.arg("--config").arg(dir.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        pgdrop(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Drop database buffers and the OS page cache"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        pgdrop(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pgdrop"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        pgdrop(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        pgdrop(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]").and(predicate::str::contains("[system_cache]")));
    }

    #[test]
    fn config_init_then_show() {
        let dir = TempDir::new().unwrap();
        pgdrop(&dir).args(["config", "init"]).assert().success();
        assert!(dir.path().join("config.toml").exists());

        pgdrop(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Use --force to overwrite"));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[general\n").unwrap();

        pgdrop(&dir)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn status_runs() {
        let dir = TempDir::new().unwrap();
        pgdrop(&dir)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("pgdrop Status"));
    }

    #[test]
    fn system_cache_without_yes_drops_nothing() {
        // Non-interactive runs decline the prompt by default.
        let dir = TempDir::new().unwrap();
        pgdrop(&dir)
            .arg("system-cache")
            .assert()
            .failure()
            .stdout(predicate::str::contains("Machine-wide"))
            .stderr(predicate::str::contains("nothing was dropped"))
            .stderr(predicate::str::contains("Pass --yes"));
    }
}

mod library_tests {
    use async_trait::async_trait;
    use pgdrop::buffers::{drop_current_db_buffers, DatabaseId, InMemoryBufferPool, StaticSession};
    use pgdrop::exec::{CommandRunner, CommandSpec, ExitOutcome, SystemRunner};
    use pgdrop::syscache::SystemCacheDropper;
    use pgdrop::{DropError, DropResult, ErrorKind};

    /// Runs a shell script in place of the privileged command, keeping the
    /// pre-exec sync, so the real process path is exercised without sudo.
    struct ScriptRunner {
        script: &'static str,
        inner: SystemRunner,
    }

    #[async_trait]
    impl CommandRunner for ScriptRunner {
        async fn run(&self, spec: &CommandSpec) -> DropResult<ExitOutcome> {
            let substitute = CommandSpec::new("/bin/sh")
                .args(["-c", self.script])
                .with_sync(spec.sync_filesystems);
            self.inner.run(&substitute).await
        }

        fn runner_name(&self) -> &'static str {
            "script"
        }
    }

    fn dropper(script: &'static str) -> SystemCacheDropper<ScriptRunner> {
        SystemCacheDropper::new(ScriptRunner {
            script,
            inner: SystemRunner::new(),
        })
    }

    #[tokio::test]
    async fn system_cache_child_success() {
        dropper("exit 0").drop_system_cache().await.unwrap();
    }

    #[tokio::test]
    async fn system_cache_child_failure_reports_status() {
        let err = dropper("exit 4").drop_system_cache().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OperationFailed);
        assert!(err.to_string().contains("return code 4"));
        assert_eq!(
            err.hint().as_deref(),
            Some("Ensure the invoking user has sudo permissions for `/sbin/sysctl -w vm.drop_caches=3`")
        );
    }

    #[tokio::test]
    async fn system_cache_concurrent_children() {
        let first = dropper("sleep 0.2; exit 0");
        let second = dropper("sleep 0.2; exit 0");

        let (a, b) = tokio::join!(first.drop_system_cache(), second.drop_system_cache());
        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn buffer_drop_keeps_other_databases() {
        let current = DatabaseId::new(16384);
        let other = DatabaseId::new(1);
        let pool = InMemoryBufferPool::with_pages([
            (current, 0, true),
            (current, 1, false),
            (other, 0, false),
        ]);

        drop_current_db_buffers(&StaticSession::new(current), &pool)
            .await
            .unwrap();

        assert_eq!(pool.resident_pages(current).await, 0);
        assert_eq!(pool.resident_pages(other).await, 1);
    }

    #[tokio::test]
    async fn buffer_flush_failure_is_fatal() {
        let current = DatabaseId::new(16384);
        let pool = InMemoryBufferPool::with_pages([(current, 0, true)]);
        pool.fail_flush_for(current, "No space left on device").await;

        let err = drop_current_db_buffers(&StaticSession::new(current), &pool)
            .await
            .unwrap_err();

        assert!(matches!(err, DropError::FlushFailed { .. }));
        assert_eq!(pool.resident_pages(current).await, 1);
    }
}
