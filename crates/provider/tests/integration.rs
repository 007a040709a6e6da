//! Providers against mock CDN and release API servers

use httpmock::prelude::*;
use modsync_config::{CdnConfig, GithubConfig};
use modsync_errors::{Error, NetworkError, ProviderError};
use modsync_events::{channel, AppEvent, ProviderEvent};
use modsync_hash::Hash;
use modsync_net::{NetClient, NetConfig};
use modsync_provider::{CdnProvider, ContentProvider, ReleaseProvider};
use modsync_types::{Arch, Branch, FileKind};
use serde_json::json;

fn client() -> NetClient {
    NetClient::new(NetConfig {
        retry_count: 0,
        ..NetConfig::default()
    })
    .unwrap()
}

fn cdn(server: &MockServer) -> CdnProvider {
    let config = CdnConfig {
        base_url: server.base_url(),
        ..CdnConfig::default()
    };
    CdnProvider::new(client(), &config)
}

fn github(server: &MockServer, token: Option<&str>) -> ReleaseProvider {
    let config = GithubConfig {
        enabled: true,
        api_url: server.base_url(),
        token: token.map(str::to_string),
    };
    ReleaseProvider::new(client(), &config).with_presets()
}

fn server_manifest() -> serde_json::Value {
    json!({
        "latestBuildNumber": 3725,
        "version": "16.2.1",
        "hashList": {
            "altv-server": "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed",
            "data/vehmodels.bin": ""
        },
        "sizeList": {
            "altv-server": 11,
            "data/vehmodels.bin": 4096
        }
    })
}

#[tokio::test]
async fn cdn_fetches_manifest_from_module_path() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/server/release/x64_linux/update.json");
            then.status(200).json_body(server_manifest());
        })
        .await;

    let manifest = cdn(&server)
        .manifest(Branch::Release, Arch::X64Linux, "server")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(manifest.build_number, 3725);
    assert_eq!(manifest.version, "16.2.1");
    assert_eq!(manifest.len(), 2);
}

#[tokio::test]
async fn cdn_expands_files_with_manifest_entry() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/server/dev/x64_win32/update.json");
            then.status(200).json_body(server_manifest());
        })
        .await;

    let files = cdn(&server)
        .files(Branch::Dev, Arch::X64Win32, "server", true)
        .await
        .unwrap();

    assert_eq!(files.len(), 3);
    let manifest_file = &files[0];
    assert_eq!(manifest_file.kind, FileKind::Manifest);
    assert_eq!(manifest_file.path, "server.update.json");
    assert_eq!(
        manifest_file.url,
        server.url("/server/dev/x64_win32/update.json")
    );
    assert!(manifest_file.hash.is_none());

    let binary = files.iter().find(|f| f.path == "altv-server").unwrap();
    assert_eq!(binary.kind, FileKind::Data);
    assert_eq!(binary.module, "server");
    assert_eq!(binary.url, server.url("/server/dev/x64_win32/altv-server"));
    assert_eq!(
        binary.hash,
        Some(Hash::from_hex("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed").unwrap())
    );
    assert_eq!(binary.size, Some(11));

    let data = files.iter().find(|f| f.path == "data/vehmodels.bin").unwrap();
    assert!(data.hash.is_none());
    assert_eq!(data.size, Some(4096));
    assert_eq!(
        data.url,
        server.url("/server/dev/x64_win32/data/vehmodels.bin")
    );
}

#[tokio::test]
async fn cdn_without_manifest_entry_lists_data_only() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/data/release/update.json");
            then.status(200).json_body(json!({
                "latestBuildNumber": 12,
                "version": "12",
                "hashList": { "data/clothes.bin": "" },
                "sizeList": { "data/clothes.bin": 10 }
            }));
        })
        .await;

    let files = cdn(&server)
        .files(Branch::Release, Arch::X64Linux, "data-files", false)
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert!(files.iter().all(|f| f.kind == FileKind::Data));
}

#[tokio::test]
async fn cdn_non_success_status_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/js-module/rc/x64_linux/update.json");
            then.status(404);
        })
        .await;

    let err = cdn(&server)
        .manifest(Branch::Rc, Arch::X64Linux, "js-module")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Network(NetworkError::HttpError { status: 404, .. })
    ));
}

#[tokio::test]
async fn cdn_malformed_manifest_is_a_parse_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/server/release/x64_linux/update.json");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = cdn(&server)
        .manifest(Branch::Release, Arch::X64Linux, "server")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Manifest(_)));
}

fn go_releases(server: &MockServer) -> serde_json::Value {
    json!([
        {
            "name": "v0.6.0 release",
            "tag_name": "v0.6.0",
            "created_at": "2023-03-01T10:00:00Z",
            "assets": [
                { "name": "go-module.so", "size": 100,
                  "browser_download_url": server.url("/dl/v0.6.0/go-module.so") }
            ]
        },
        {
            "name": "v0.7.0 release",
            "tag_name": "v0.7.0",
            "created_at": "2023-06-01T10:00:00Z",
            "assets": [
                { "name": "go-module.so", "size": 2048,
                  "browser_download_url": server.url("/dl/v0.7.0/go-module.so") },
                { "name": "go-module.dll", "size": 4096,
                  "browser_download_url": server.url("/dl/v0.7.0/go-module.dll") },
                { "name": "capi.h", "size": 12,
                  "browser_download_url": server.url("/dl/v0.7.0/capi.h") }
            ]
        },
        {
            "name": "v0.8.0-dev",
            "tag_name": "v0.8.0-dev",
            "created_at": "2023-07-01T10:00:00Z",
            "assets": []
        }
    ])
}

#[tokio::test]
async fn release_provider_picks_newest_branch_release_and_shared_libs() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/timo972/altv-go/releases")
                .header("accept", "application/vnd.github+json");
            then.status(200).json_body(go_releases(&server));
        })
        .await;

    let (tx, mut rx) = channel();
    let provider = github(&server, None).with_events(Some(tx));
    assert!(provider.has("go-module"));
    assert!(!provider.has("server"));

    let files = provider
        .files(Branch::Release, Arch::X64Linux, "go-module", true)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(files.len(), 1);
    let lib = &files[0];
    assert_eq!(lib.path, "modules/go-module/go-module.so");
    assert_eq!(lib.url, server.url("/dl/v0.7.0/go-module.so"));
    assert_eq!(lib.size, Some(2048));
    assert!(lib.hash.is_none());

    let mut selected = None;
    while let Ok(event) = rx.try_recv() {
        if let AppEvent::Provider(ProviderEvent::ReleaseSelected { release, assets, .. }) = event {
            selected = Some((release, assets));
        }
    }
    assert_eq!(selected, Some(("v0.7.0".to_string(), 1)));
}

#[tokio::test]
async fn release_manifest_uses_tag_as_version() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/timo972/altv-go/releases");
            then.status(200).json_body(go_releases(&server));
        })
        .await;

    let manifest = github(&server, None)
        .manifest(Branch::Release, Arch::X64Win32, "go-module")
        .await
        .unwrap();

    assert_eq!(manifest.version, "v0.7.0");
    assert_eq!(manifest.build_number, -1);
    assert_eq!(
        manifest.expected_size("modules/go-module/go-module.dll"),
        Some(4096)
    );
}

#[tokio::test]
async fn js_module_v2_matches_branch_prefix_and_arch() {
    let server = MockServer::start_async().await;
    let body = json!([
        {
            "name": "dev/0.0.12",
            "tag_name": "dev/0.0.12",
            "created_at": "2024-02-01T00:00:00Z",
            "assets": [
                { "name": "js-module-v2-x64_linux.so", "size": 5,
                  "browser_download_url": server.url("/dl/linux.so") },
                { "name": "js-module-v2-x64_win32.dll", "size": 6,
                  "browser_download_url": server.url("/dl/win.dll") }
            ]
        },
        {
            "name": "release-candidate/0.0.13",
            "tag_name": "rc-0.0.13",
            "created_at": "2024-03-01T00:00:00Z",
            "assets": []
        }
    ]);
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/altmp/altv-js-module-v2/releases");
            then.status(200).json_body(body);
        })
        .await;

    let files = github(&server, None)
        .files(Branch::Dev, Arch::X64Win32, "js-module-v2", false)
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "modules/js-module-v2/js-module-v2-x64_win32.dll");
    assert_eq!(files[0].url, server.url("/dl/win.dll"));
}

#[tokio::test]
async fn release_provider_sends_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/timo972/altv-go/releases")
                .header("authorization", "Bearer ghp_secret");
            then.status(200).json_body(go_releases(&server));
        })
        .await;

    github(&server, Some("ghp_secret"))
        .manifest(Branch::Release, Arch::X64Linux, "go-module")
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn release_provider_reports_missing_branch_release() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/timo972/altv-go/releases");
            then.status(200).json_body(go_releases(&server));
        })
        .await;

    let err = github(&server, None)
        .manifest(Branch::Rc, Arch::X64Linux, "go-module")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Provider(ProviderError::NoMatchingRelease { ref branch, .. }) if branch == "rc"
    ));
}

#[tokio::test]
async fn release_without_matching_assets_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/timo972/altv-go/releases");
            then.status(200).json_body(go_releases(&server));
        })
        .await;

    let err = github(&server, None)
        .manifest(Branch::Dev, Arch::X64Linux, "go-module")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Provider(ProviderError::NoAssets { ref release, .. }) if release == "v0.8.0-dev"
    ));
}
