//! Verification runs against real files and a mock CDN

use std::path::Path;

use httpmock::prelude::*;
use modsync_checker::Checker;
use modsync_config::CdnConfig;
use modsync_errors::{Error, ProviderError, VerifyError};
use modsync_hash::Hash;
use modsync_net::{NetClient, NetConfig};
use modsync_provider::{CdnProvider, ProviderRegistry};
use modsync_types::{manifest_file_name, Arch, Branch, Manifest, ModuleStatus};

fn registry(server: &MockServer) -> ProviderRegistry {
    let client = NetClient::new(NetConfig {
        retry_count: 0,
        ..NetConfig::default()
    })
    .unwrap();
    let config = CdnConfig {
        base_url: server.base_url(),
        ..CdnConfig::default()
    };
    let mut registry = ProviderRegistry::new();
    registry.add_provider(CdnProvider::new(client, &config));
    registry
}

fn checker(registry: &ProviderRegistry) -> Checker<'_> {
    Checker::new(
        registry,
        Branch::Release,
        Arch::X64Linux,
        vec!["server".to_string()],
    )
}

fn write(root: &Path, rel: &str, data: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, data).unwrap();
}

fn digest(data: &[u8]) -> Option<Hash> {
    Some(Hash::from_data(data))
}

fn manifest_for(entries: &[(&str, Option<Hash>, i64)]) -> Manifest {
    let mut manifest = Manifest::default();
    for (path, hash, size) in entries {
        manifest.insert(*path, hash.as_ref(), u64::try_from(*size).ok());
    }
    manifest
}

fn write_local_manifest(root: &Path, module: &str, manifest: &Manifest) {
    write(
        root,
        &manifest_file_name(module),
        serde_json::to_string(manifest).unwrap().as_bytes(),
    );
}

async fn mock_remote(server: &MockServer, manifest: &Manifest) {
    let body = serde_json::to_value(manifest).unwrap();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/server/release/x64_linux/update.json");
            then.status(200).json_body(body);
        })
        .await;
}

#[tokio::test]
async fn nothing_to_verify_without_local_manifests_or_remote() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();

    let err = checker(&registry)
        .verify(dir.path(), false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Verify(VerifyError::NothingToVerify)));
}

#[tokio::test]
async fn local_only_matches_size_contract() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    let content = vec![7u8; 4096];
    write(dir.path(), "bin", &content);
    write_local_manifest(
        dir.path(),
        "server",
        &manifest_for(&[("bin", digest(&content), 4096)]),
    );

    let result = checker(&registry).verify(dir.path(), false).await.unwrap();
    assert_eq!(result.statuses.get("server"), Some(ModuleStatus::VALID));
    assert!(result.remote.is_empty());
    assert!(!result.is_degraded());

    write(dir.path(), "bin", &content[..2048]);
    let result = checker(&registry).verify(dir.path(), false).await.unwrap();
    assert_eq!(result.statuses.get("server"), Some(ModuleStatus::INVALID));
    assert_eq!(result.local["server"].failures.len(), 1);
}

#[tokio::test]
async fn local_only_never_sets_freshness() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a", b"a");
    write_local_manifest(dir.path(), "server", &manifest_for(&[("a", digest(b"a"), 1)]));
    write_local_manifest(
        dir.path(),
        "js-module",
        &manifest_for(&[("modules/js-module/libjs.so", None, 10)]),
    );

    let result = checker(&registry).verify(dir.path(), false).await.unwrap();

    assert_eq!(result.statuses.len(), 2);
    for (_, status) in result.statuses.iter() {
        assert!(status.freshness.is_none());
        assert!(status.validity.is_some());
    }
    assert_eq!(result.statuses.get("js-module"), Some(ModuleStatus::INVALID));
}

#[tokio::test]
async fn remote_only_checks_latest_published_files() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "altv-server", b"hello world");
    mock_remote(
        &server,
        &manifest_for(&[("altv-server", digest(b"hello world"), 11)]),
    )
    .await;

    let result = checker(&registry).verify(dir.path(), true).await.unwrap();

    assert_eq!(result.statuses.get("server"), Some(ModuleStatus::VALID));
    assert!(result.local.is_empty());
}

#[tokio::test]
async fn combined_check_marks_stale_install_upgradable() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bin", b"build 1");
    write_local_manifest(dir.path(), "server", &manifest_for(&[("bin", digest(b"build 1"), -1)]));
    mock_remote(&server, &manifest_for(&[("bin", digest(b"build 2"), -1)])).await;

    let result = checker(&registry).verify(dir.path(), true).await.unwrap();

    assert_eq!(
        result.statuses.get("server"),
        Some(ModuleStatus::VALID | ModuleStatus::UPGRADABLE)
    );
    assert_eq!(result.local["server"].status, ModuleStatus::VALID);
    assert_eq!(result.remote["server"].status, ModuleStatus::INVALID);
}

#[tokio::test]
async fn combined_check_confirms_current_install() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest_for(&[("bin", digest(b"build 2"), 7)]);
    write(dir.path(), "bin", b"build 2");
    write_local_manifest(dir.path(), "server", &manifest);
    mock_remote(&server, &manifest).await;

    let result = checker(&registry).verify(dir.path(), true).await.unwrap();

    let status = result.statuses.get("server").unwrap();
    assert!(status.is_current());
}

#[tokio::test]
async fn combined_check_with_corrupt_local_expectation() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bin", b"build 2");
    write_local_manifest(dir.path(), "server", &manifest_for(&[("bin", digest(b"build 1"), -1)]));
    mock_remote(&server, &manifest_for(&[("bin", digest(b"build 2"), -1)])).await;

    let result = checker(&registry).verify(dir.path(), true).await.unwrap();

    assert_eq!(
        result.statuses.get("server"),
        Some(ModuleStatus::INVALID | ModuleStatus::UP_TO_DATE)
    );
}

#[tokio::test]
async fn local_modules_drive_the_remote_lookups() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bin", b"x");
    write_local_manifest(dir.path(), "server", &manifest_for(&[("bin", digest(b"x"), 1)]));
    write_local_manifest(dir.path(), "go-module", &manifest_for(&[]));
    mock_remote(&server, &manifest_for(&[("bin", digest(b"x"), 1)])).await;

    let result = checker(&registry).verify(dir.path(), true).await.unwrap();

    // go-module has no provider here: it keeps its local status only
    assert_eq!(result.statuses.get("go-module"), Some(ModuleStatus::VALID));
    assert!(result.statuses.get("server").unwrap().is_current());
    assert!(result.is_degraded());
    assert!(result.errors.iter().any(|e| matches!(
        e,
        Error::Provider(ProviderError::NoProviderForModule { module }) if module == "go-module"
    )));
}

#[tokio::test]
async fn remote_outage_degrades_combined_check_to_local() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bin", b"x");
    write_local_manifest(dir.path(), "server", &manifest_for(&[("bin", digest(b"x"), 1)]));
    server
        .mock_async(|when, then| {
            when.method(GET).path("/server/release/x64_linux/update.json");
            then.status(503);
        })
        .await;

    let result = checker(&registry).verify(dir.path(), true).await.unwrap();

    assert_eq!(result.statuses.get("server"), Some(ModuleStatus::VALID));
    let (_, err) = result.into_parts();
    assert!(matches!(
        err,
        Some(Error::Provider(ProviderError::ManifestFetchFailed { .. }))
    ));
}

#[tokio::test]
async fn remote_only_with_no_manifest_is_a_hard_error() {
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/server/release/x64_linux/update.json");
            then.status(404);
        })
        .await;

    let err = checker(&registry).verify(dir.path(), true).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Provider(ProviderError::ManifestFetchFailed { ref module, .. }) if module == "server"
    ));
}

#[tokio::test]
async fn same_file_differs_from_remote_hash() {
    // local expects aaa, remote publishes bbb, disk holds aaa
    let server = MockServer::start_async().await;
    let registry = registry(&server);
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bin", b"aaa111");
    let local = manifest_for(&[("bin", digest(b"aaa111"), 6)]);
    write_local_manifest(dir.path(), "server", &local);
    mock_remote(&server, &manifest_for(&[("bin", digest(b"bbb222"), 6)])).await;

    let local_only = checker(&registry).verify(dir.path(), false).await.unwrap();
    assert_eq!(local_only.statuses.get("server"), Some(ModuleStatus::VALID));

    let combined = checker(&registry).verify(dir.path(), true).await.unwrap();
    assert_eq!(
        combined.statuses.get("server"),
        Some(ModuleStatus::VALID | ModuleStatus::UPGRADABLE)
    );
}
