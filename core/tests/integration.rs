//! End-to-end tests against the mock AppVeyor server.
//!
//! # Design
//! Each test starts the mock server on a random port in a background thread
//! and talks to it over real HTTP through the default `UreqTransport`.

use std::net::SocketAddr;

use appveyor_client::{
    ApiError, AppveyorClient, BuildTarget, ClientConfig, HistoryQuery, RepositoryProvider,
    StartBuild,
};

const TOKEN: &str = "abc123";

/// Start the mock server on a random port and return its address.
fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_appveyor::run(listener, TOKEN).await
        })
        .unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr, token: &str) -> AppveyorClient {
    let config = ClientConfig::builder()
        .base_url(format!("http://{addr}/api"))
        .build()
        .unwrap();
    AppveyorClient::with_config(token, config).unwrap()
}

#[test]
fn project_and_build_lifecycle() {
    let addr = spawn_server();
    let client = client_for(addr, TOKEN);

    // Step 1: no projects yet.
    assert!(client.list_projects().unwrap().is_empty());

    // Step 2: add a project.
    let project = client
        .projects()
        .add(RepositoryProvider::GitHub, "appvyr/demo-app")
        .unwrap();
    assert_eq!(project["slug"], "demo-app");
    assert_eq!(project["repositoryType"], "gitHub");

    // Step 3: list returns it, and the repo lookup finds it.
    let projects = client.list_projects().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0], project);
    assert_eq!(
        client.account_slug_for_repo("APPVYR/Demo-App").unwrap(),
        Some(("appvyr".to_string(), "demo-app".to_string()))
    );

    // Step 4: empty history.
    let history = client.get_build_history("appvyr", "demo-app").unwrap();
    assert!(history["builds"].as_array().unwrap().is_empty());

    // Step 5: start two builds on different branches.
    let first = client
        .builds()
        .start(&StartBuild::new("appvyr", "demo-app", BuildTarget::Branch("main".into())))
        .unwrap();
    let second = client
        .builds()
        .start(
            &StartBuild::new(
                "appvyr",
                "demo-app",
                BuildTarget::Commit {
                    branch: "develop".into(),
                    commit_id: "3e9d9468".into(),
                },
            )
            .env("CONFIGURATION", "Release"),
        )
        .unwrap();
    assert_eq!(first["version"], "1.0.1");
    assert_eq!(second["commitId"], "3e9d9468");
    assert_eq!(second["environmentVariables"]["CONFIGURATION"], "Release");

    // Step 6: history query parameters reach the server.
    let all = client.get_build_history("appvyr", "demo-app").unwrap();
    assert_eq!(all["builds"].as_array().unwrap().len(), 2);
    let main_only = client
        .get_build_history_with("appvyr", "demo-app", &HistoryQuery::records(10).branch("main"))
        .unwrap();
    let builds = main_only["builds"].as_array().unwrap();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0]["buildId"], first["buildId"]);

    // Step 7: last build and its log.
    let last = client.projects().last_build("appvyr", "demo-app").unwrap();
    assert_eq!(last["build"]["buildId"], second["buildId"]);
    let job_id = second["jobs"][0]["jobId"].as_str().unwrap();
    let log = client.builds().log(job_id).unwrap();
    assert!(log.contains("1.0.2"));

    // Step 8: cancel the latest build; 204 decodes as null.
    let cancelled = client.builds().cancel("appvyr", "demo-app", "1.0.2").unwrap();
    assert!(cancelled.is_null());
    let last = client.projects().last_build("appvyr", "demo-app").unwrap();
    assert_eq!(last["build"]["status"], "cancelled");

    // Step 9: settings YAML roundtrip and build number update.
    client
        .projects()
        .update_settings_yaml("appvyr", "demo-app", "version: 2.0.{build}\n")
        .unwrap();
    assert_eq!(
        client.projects().settings_yaml("appvyr", "demo-app").unwrap(),
        "version: 2.0.{build}\n"
    );
    client
        .projects()
        .update_build_number("appvyr", "demo-app", 100)
        .unwrap();
    let next = client
        .builds()
        .start(&StartBuild::new("appvyr", "demo-app", BuildTarget::PullRequest(7)))
        .unwrap();
    assert_eq!(next["version"], "1.0.100");

    // Step 10: delete the project; it is gone.
    client.projects().delete("appvyr", "demo-app").unwrap();
    let err = client.projects().last_build("appvyr", "demo-app").unwrap_err();
    assert!(err.is_not_found());
    assert!(client.list_projects().unwrap().is_empty());
}

#[test]
fn missing_project_history_is_404_with_body() {
    let addr = spawn_server();
    let client = client_for(addr, TOKEN);

    let err = client.get_build_history("acct", "missing").unwrap_err();
    match err {
        ApiError::Request { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"), "body was {body}");
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[test]
fn wrong_token_is_401() {
    let addr = spawn_server();
    let client = client_for(addr, "not-the-token");

    let err = client.list_projects().unwrap_err();
    assert!(err.is_unauthorized());
    assert!(err.body().unwrap().contains("Authorization required"));

    let err = client.roles().list().unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
fn closed_port_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(addr, TOKEN);

    let err = client.list_projects().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
}

#[test]
fn shared_client_serves_concurrent_threads() {
    let addr = spawn_server();
    let client = client_for(addr, TOKEN);
    client
        .projects()
        .add(RepositoryProvider::Git, "appvyr/shared")
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| client.list_projects().unwrap().len()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    });
    assert_eq!(client.base_url(), format!("http://{addr}/api"));
}
