use std::path::Path;
use std::sync::{Arc, Mutex};

use cascade_core::adapter::{ManifestAdapter, PublishRunner};
use cascade_core::catalog::Catalog;
use cascade_core::error::{Error, Result};
use cascade_core::executor::PublishExecutor;
use cascade_core::package::{Package, RawManifest};
use cascade_core::planner::{arrange_publish_queue, Entries, PublishRecord};
use cascade_core::reporter::{PublishReporter, SilentReporter};
use cascade_core::version::{BumpLevel, Version, VersionTarget};

type Log = Arc<Mutex<Vec<String>>>;

fn dir_name(dir: &Path) -> String {
    dir.file_name().unwrap().to_string_lossy().into_owned()
}

struct FakeManifests {
    log: Log,
}

/// Writes succeed, restoring always fails.
struct UnrestorableManifests {
    log: Log,
}

impl ManifestAdapter for UnrestorableManifests {
    fn manifest_name(&self) -> &'static str {
        "package.json"
    }

    fn read_package(&self, dir: &Path) -> Result<Package> {
        Err(Error::InvalidManifest {
            path: dir.to_path_buf(),
            message: "not supported".to_string(),
        })
    }

    fn write_updated(&self, package: &Package) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("write {}", package.name));
        Ok(())
    }

    fn restore_raw(&self, package: &Package) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("restore {}", package.name));
        Err(Error::InvalidManifest {
            path: package.path.clone(),
            message: "disk full".to_string(),
        })
    }
}

impl ManifestAdapter for FakeManifests {
    fn manifest_name(&self) -> &'static str {
        "package.json"
    }

    fn read_package(&self, dir: &Path) -> Result<Package> {
        Err(Error::InvalidManifest {
            path: dir.to_path_buf(),
            message: "not supported".to_string(),
        })
    }

    fn write_updated(&self, package: &Package) -> Result<()> {
        let deps: Vec<String> = package
            .dependencies
            .iter()
            .map(|(name, version)| format!("{}@{}", name, version))
            .collect();
        self.log.lock().unwrap().push(format!(
            "write {}@{} [{}]",
            package.name,
            package.version,
            deps.join(", ")
        ));
        Ok(())
    }

    fn restore_raw(&self, package: &Package) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("restore {}", package.name));
        Ok(())
    }
}

struct FakeRunner {
    log: Log,
    fail_publish: Option<&'static str>,
}

impl PublishRunner for FakeRunner {
    fn install(&self, dir: &Path) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("install {}", dir_name(dir)));
        Ok(())
    }

    fn publish(&self, dir: &Path) -> Result<()> {
        let name = dir_name(dir);
        self.log.lock().unwrap().push(format!("publish {}", name));
        if self.fail_publish == Some(name.as_str()) {
            return Err(Error::CommandFailed {
                command: "npm publish".to_string(),
                dir: dir.to_path_buf(),
                code: Some(1),
            });
        }
        Ok(())
    }
}

struct RecordingReporter {
    log: Log,
}

impl PublishReporter for RecordingReporter {
    fn report_start(&self, record: &PublishRecord, position: usize, total: usize) {
        self.log
            .lock()
            .unwrap()
            .push(format!("start {} {}/{}", record.name, position, total));
    }

    fn report_published(&self, record: &PublishRecord) {
        self.log
            .lock()
            .unwrap()
            .push(format!("published {}", record.name));
    }
}

fn package(name: &str, deps: &[(&str, &str)]) -> Package {
    let dependencies = deps
        .iter()
        .map(|(dep, required)| (dep.to_string(), Version::parse(required).unwrap()))
        .collect();
    Package::new(
        name,
        Version::new(1, 0, 0),
        dependencies,
        RawManifest {
            value: serde_json::json!({}),
            text: "{}".to_string(),
        },
        format!("/workspace/{}", name),
    )
}

fn chain_catalog() -> Catalog {
    Catalog::from_packages(
        "/workspace",
        vec![
            package("a", &[]),
            package("b", &[("a", "^1.0.0")]),
            package("c", &[("b", "^1.0.0")]),
        ],
    )
}

fn minor_of(name: &str) -> Entries {
    Entries::from([(name.to_string(), VersionTarget::Level(BumpLevel::Minor))])
}

fn entries_of(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[test]
fn test_executes_queue_in_order() {
    let mut catalog = chain_catalog();
    let queue = arrange_publish_queue(&catalog, &minor_of("a")).unwrap();

    let log = Log::default();
    let executor = PublishExecutor::new(
        FakeManifests { log: log.clone() },
        FakeRunner {
            log: log.clone(),
            fail_publish: None,
        },
        SilentReporter,
    );
    executor.execute(&mut catalog, &queue).unwrap();

    assert_eq!(
        entries_of(&log),
        vec![
            "write a@1.1.0 []",
            "install a",
            "publish a",
            "write b@1.1.0 [a@^1.1.0]",
            "install b",
            "publish b",
            "write c@1.1.0 [b@^1.1.0]",
            "install c",
            "publish c",
        ]
    );
    assert_eq!(catalog.get("c").unwrap().version.to_string(), "1.1.0");
    assert_eq!(
        catalog.get("c").unwrap().requires("b").unwrap().to_string(),
        "^1.1.0"
    );
}

#[test]
fn test_failure_restores_manifest_and_halts() {
    let mut catalog = chain_catalog();
    let queue = arrange_publish_queue(&catalog, &minor_of("a")).unwrap();

    let log = Log::default();
    let executor = PublishExecutor::new(
        FakeManifests { log: log.clone() },
        FakeRunner {
            log: log.clone(),
            fail_publish: Some("b"),
        },
        SilentReporter,
    );
    let err = executor.execute(&mut catalog, &queue).unwrap_err();

    assert!(matches!(err, Error::CommandFailed { code: Some(1), .. }));
    assert_eq!(
        entries_of(&log),
        vec![
            "write a@1.1.0 []",
            "install a",
            "publish a",
            "write b@1.1.0 [a@^1.1.0]",
            "install b",
            "publish b",
            "restore b",
        ]
    );
    assert_eq!(catalog.get("a").unwrap().version.to_string(), "1.1.0");
    assert_eq!(catalog.get("c").unwrap().version.to_string(), "1.0.0");
}

#[test]
fn test_failed_restore_keeps_publish_error() {
    let mut catalog = chain_catalog();
    let queue = arrange_publish_queue(&catalog, &minor_of("a")).unwrap();

    let log = Log::default();
    let executor = PublishExecutor::new(
        UnrestorableManifests { log: log.clone() },
        FakeRunner {
            log: log.clone(),
            fail_publish: Some("a"),
        },
        SilentReporter,
    );
    let err = executor.execute(&mut catalog, &queue).unwrap_err();

    match err {
        Error::CommandFailed { command, code, .. } => {
            assert_eq!(command, "npm publish");
            assert_eq!(code, Some(1));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(
        entries_of(&log),
        vec!["write a", "install a", "publish a", "restore a"]
    );
}

#[test]
fn test_install_can_be_skipped() {
    let mut catalog = chain_catalog();
    let queue = arrange_publish_queue(&catalog, &minor_of("c")).unwrap();

    let log = Log::default();
    let executor = PublishExecutor::new(
        FakeManifests { log: log.clone() },
        FakeRunner {
            log: log.clone(),
            fail_publish: None,
        },
        SilentReporter,
    )
    .with_install(false);
    executor.execute(&mut catalog, &queue).unwrap();

    assert_eq!(entries_of(&log), vec!["write c@1.1.0 [b@^1.0.0]", "publish c"]);
}

#[test]
fn test_reporter_receives_progress() {
    let mut catalog = chain_catalog();
    let queue = arrange_publish_queue(&catalog, &minor_of("b")).unwrap();

    let events = Log::default();
    let executor = PublishExecutor::new(
        FakeManifests {
            log: Log::default(),
        },
        FakeRunner {
            log: Log::default(),
            fail_publish: None,
        },
        RecordingReporter {
            log: events.clone(),
        },
    );
    executor.execute(&mut catalog, &queue).unwrap();

    assert_eq!(
        entries_of(&events),
        vec!["start b 1/2", "published b", "start c 2/2", "published c"]
    );
}

#[test]
fn test_empty_queue_does_nothing() {
    let mut catalog = chain_catalog();
    let log = Log::default();
    let executor = PublishExecutor::new(
        FakeManifests { log: log.clone() },
        FakeRunner {
            log: log.clone(),
            fail_publish: None,
        },
        SilentReporter,
    );

    executor
        .execute(&mut catalog, &Default::default())
        .unwrap();
    assert!(entries_of(&log).is_empty());
}
