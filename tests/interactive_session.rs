// Drives the prompt loop end to end against a mock GitHub API.

use ghstats_cli::api::ApiClient;
use ghstats_cli::commands::CommandRegistry;
use ghstats_cli::config::ClientConfig;
use ghstats_cli::session::Session;
use ghstats_cli::ui;
use mockito::{Matcher, Server};

fn run_script(server: &Server, script: &str) -> String {
    let api = ApiClient::new(ClientConfig::with_base_url(server.url())).unwrap();
    let registry = CommandRegistry::with_builtins();
    let mut session = Session::new();
    let mut out: Vec<u8> = Vec::new();
    ui::run(&registry, &api, &mut session, script.as_bytes(), &mut out).unwrap();
    assert!(!session.is_authenticated());
    String::from_utf8(out).unwrap()
}

#[test]
fn browse_then_fork_with_token() {
    let mut server = Server::new();
    let events = server
        .mock("GET", "/users/octo/events")
        .with_status(200)
        .with_body(
            r#"[{"type":"PushEvent","repo":{"name":"octo/hello"},
                 "created_at":"2024-05-01T10:00:00Z","payload":{"ref":"refs/heads/main"}}]"#,
        )
        .create();
    let readme = server
        .mock("GET", "/repos/octo/hello/contents/README.md")
        .match_query(Matcher::UrlEncoded("ref".into(), "master".into()))
        .with_status(200)
        .with_body(r#"{"content":"IyBIaQ==\n"}"#)
        .create();
    let auth = server
        .mock("GET", "/user")
        .match_header("authorization", "token ghp_test")
        .with_status(200)
        .with_body(r#"{"login":"me"}"#)
        .create();
    let fork = server
        .mock("POST", "/repos/octo/hello/forks")
        .match_header("authorization", "token ghp_test")
        .with_status(202)
        .with_body(r#"{"html_url":"https://github.com/me/hello"}"#)
        .expect(1)
        .create();

    let out = run_script(
        &server,
        "activity octo\nread octo hello\nfork octo hello\nset ghp_test\nfork octo hello\nunset\nfork octo hello\nexit\n",
    );

    events.assert();
    readme.assert();
    auth.assert();
    fork.assert();

    assert!(out.contains("Push to branch: refs/heads/main"));
    assert!(out.contains("\n# Hi\n"));
    assert!(out.contains("Authenticated as: me"));
    assert!(out.contains("Repository forked successfully! https://github.com/me/hello"));
    // Before `set` and after `unset`.
    assert_eq!(out.matches("GitHub token is not set").count(), 2);
    assert!(out.contains("Goodbye."));
}

#[test]
fn failures_do_not_end_the_session() {
    let mut server = Server::new();
    server.mock("GET", "/users/ghost").with_status(404).create();
    let repos = server
        .mock("GET", "/users/octo/repos")
        .with_status(200)
        .with_body(r#"[{"name":"a","html_url":"u1"},{"name":"b","html_url":"u2"}]"#)
        .create();

    let out = run_script(&server, "user ghost\nnope\nlist octo\n");

    repos.assert();
    assert!(out.contains("Error fetching data: returned status code: 404 Not Found"));
    assert!(out.contains("Command not found: nope"));
    assert!(out.contains("a - u1\nb - u2\n"));
}
