//! Router behaviour tests for command dispatch.

use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Barrier;
use std::thread;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use roster_config::DeletePolicy;

use super::*;
use crate::sessions::SessionRegistry;
use crate::store::UserStore;

const PEER: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));

struct RouterFixture {
    _dir: TempDir,
    root: Utf8PathBuf,
    router: CommandRouter,
}

impl RouterFixture {
    /// Sends `tokens` as one request and returns the raw response bytes.
    fn send(&self, tokens: &[&str]) -> (Result<Option<Command>, DispatchError>, Vec<u8>) {
        let mut input = Vec::new();
        for token in tokens {
            input.extend_from_slice(token.as_bytes());
            input.push(0);
        }
        let mut request = Cursor::new(input);
        let mut output = Vec::new();
        let mut response = ResponseWriter::new(&mut output);
        let result = self.router.route(PEER, &mut request, &mut response);
        (result, output)
    }

    fn code(&self, tokens: &[&str]) -> u8 {
        let (result, output) = self.send(tokens);
        result.expect("request routed");
        assert!(!output.is_empty(), "every recognised command answers");
        output[0]
    }

    fn registered_and_connected(&self, user: &str, port: u16) {
        assert_eq!(self.code(&["REGISTER", user]), 0);
        assert_eq!(self.code(&["CONNECT", user, &port.to_string()]), 0);
    }
}

#[fixture]
fn harness() -> RouterFixture {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join("storage")).expect("utf8 path");
    let store = UserStore::open(root.clone(), DeletePolicy::FailFast).expect("open store");
    let router = CommandRouter::new(Directory::new(store, SessionRegistry::new()));
    RouterFixture {
        _dir: dir,
        root,
        router,
    }
}

fn tokens(body: &[u8]) -> Vec<String> {
    body.split(|byte| *byte == 0)
        .filter(|token| !token.is_empty())
        .map(|token| String::from_utf8_lossy(token).into_owned())
        .collect()
}

#[rstest]
fn register_creates_directory_and_rejects_duplicates(harness: RouterFixture) {
    assert_eq!(harness.code(&["REGISTER", "alice"]), 0);
    assert!(harness.root.join("alice").is_dir());
    assert_eq!(harness.code(&["REGISTER", "alice"]), 1);
}

#[rstest]
#[case("bad name!")]
#[case("../escape")]
#[case("")]
fn register_rejects_invalid_names(harness: RouterFixture, #[case] name: &str) {
    assert_eq!(harness.code(&["REGISTER", name]), 2);
}

#[rstest]
fn register_without_argument_still_answers(harness: RouterFixture) {
    let (result, output) = harness.send(&["REGISTER"]);
    assert_eq!(result.expect("routed"), Some(Command::Register));
    assert_eq!(output, [2]);
}

#[rstest]
fn unregister_removes_user_and_content(harness: RouterFixture) {
    assert_eq!(harness.code(&["UNREGISTER", "ghost"]), 1);
    assert_eq!(harness.code(&["REGISTER", "alice"]), 0);
    fs::write(harness.root.join("alice").join("a.txt"), "").expect("seed file");

    assert_eq!(harness.code(&["UNREGISTER", "alice"]), 0);
    assert!(!harness.root.join("alice").exists());
}

#[rstest]
fn unregister_drops_the_session(harness: RouterFixture) {
    harness.registered_and_connected("alice", 4000);
    assert_eq!(harness.code(&["UNREGISTER", "alice"]), 0);
    let alice = roster_wire::Username::parse("alice").expect("username");
    assert!(
        !harness
            .router
            .directory()
            .sessions()
            .is_connected(&alice)
            .expect("probe")
    );
}

#[rstest]
fn unregister_racing_connect_leaves_no_session_behind(harness: RouterFixture) {
    const ROUNDS: usize = 200;
    for round in 0..ROUNDS {
        assert_eq!(harness.code(&["REGISTER", "alice"]), 0);
        let barrier = Barrier::new(2);
        let connected = thread::scope(|scope| {
            let connect = scope.spawn(|| {
                barrier.wait();
                harness.code(&["CONNECT", "alice", "4000"])
            });
            let unregister = scope.spawn(|| {
                barrier.wait();
                harness.code(&["UNREGISTER", "alice"])
            });
            assert_eq!(unregister.join().expect("unregister thread"), 0);
            connect.join().expect("connect thread")
        });
        assert!(
            matches!(connected, 0 | 1),
            "round {round}: CONNECT answered {connected}"
        );

        assert_eq!(harness.code(&["REGISTER", "alice"]), 0);
        assert_eq!(
            harness.code(&["DISCONNECT", "alice"]),
            2,
            "round {round}: session outlived UNREGISTER"
        );
        assert_eq!(harness.code(&["UNREGISTER", "alice"]), 0);
    }
}

#[rstest]
fn unregister_succeeds_when_the_session_cannot_be_dropped(harness: RouterFixture) {
    harness.registered_and_connected("alice", 4000);
    harness.router.directory().sessions().poison();

    assert_eq!(harness.code(&["UNREGISTER", "alice"]), 0);
    assert!(!harness.root.join("alice").exists());
}

#[rstest]
fn connect_and_disconnect_follow_the_session_rules(harness: RouterFixture) {
    assert_eq!(harness.code(&["CONNECT", "alice", "4000"]), 1);
    assert_eq!(harness.code(&["REGISTER", "alice"]), 0);
    assert_eq!(harness.code(&["DISCONNECT", "alice"]), 2);
    assert_eq!(harness.code(&["CONNECT", "alice", "4000"]), 0);
    assert_eq!(harness.code(&["CONNECT", "alice", "4001"]), 2);
    assert_eq!(harness.code(&["CONNECT", "alice", "not-a-port"]), 3);
    assert_eq!(harness.code(&["DISCONNECT", "alice"]), 0);
    assert_eq!(harness.code(&["DISCONNECT", "ghost"]), 1);
}

#[rstest]
fn list_users_requires_a_connected_requester(harness: RouterFixture) {
    assert_eq!(harness.code(&["LIST_USERS", "ghost"]), 1);
    assert_eq!(harness.code(&["REGISTER", "alice"]), 0);
    assert_eq!(harness.code(&["LIST_USERS", "alice"]), 2);
    assert_eq!(harness.code(&["LIST_USERS", "bad name"]), 3);
}

#[rstest]
fn list_users_reports_every_session(harness: RouterFixture) {
    harness.registered_and_connected("bob", 5000);
    harness.registered_and_connected("alice", 4000);

    let (result, output) = harness.send(&["LIST_USERS", "alice"]);
    assert_eq!(result.expect("routed"), Some(Command::ListUsers));
    assert_eq!(output.first(), Some(&0));
    assert_eq!(
        tokens(&output[1..]),
        ["2", "alice", "192.0.2.10", "4000", "bob", "192.0.2.10", "5000"]
    );
}

#[rstest]
fn list_content_reports_owner_files(harness: RouterFixture) {
    harness.registered_and_connected("alice", 4000);
    assert_eq!(harness.code(&["REGISTER", "bob"]), 0);
    fs::write(harness.root.join("bob").join("a.txt"), "").expect("seed a");
    fs::write(harness.root.join("bob").join("b.txt"), "").expect("seed b");

    let (result, output) = harness.send(&["LIST_CONTENT", "alice", "bob"]);
    result.expect("routed");
    assert_eq!(output.first(), Some(&0));
    let body = tokens(&output[1..]);
    assert_eq!(body.first().map(String::as_str), Some("2"));
    let files: BTreeSet<&str> = body[1..].iter().map(String::as_str).collect();
    assert_eq!(files, BTreeSet::from(["a.txt", "b.txt"]));
}

#[rstest]
fn list_content_gates_requester_and_owner(harness: RouterFixture) {
    assert_eq!(harness.code(&["LIST_CONTENT", "ghost", "bob"]), 1);
    assert_eq!(harness.code(&["REGISTER", "alice"]), 0);
    assert_eq!(harness.code(&["LIST_CONTENT", "alice", "bob"]), 2);
    assert_eq!(harness.code(&["CONNECT", "alice", "4000"]), 0);
    assert_eq!(harness.code(&["LIST_CONTENT", "alice", "bob"]), 3);
    assert_eq!(harness.code(&["LIST_CONTENT", "alice", "b@d"]), 4);
}

#[rstest]
fn deleted_owner_has_no_files(harness: RouterFixture) {
    harness.registered_and_connected("alice", 4000);
    assert_eq!(harness.code(&["REGISTER", "bob"]), 0);
    fs::write(harness.root.join("bob").join("a.txt"), "").expect("seed a");

    assert_eq!(harness.code(&["UNREGISTER", "bob"]), 0);
    assert_eq!(harness.code(&["LIST_CONTENT", "alice", "bob"]), 3);
}

#[rstest]
fn publish_and_delete_manage_content(harness: RouterFixture) {
    assert_eq!(harness.code(&["PUBLISH", "alice", "a.txt", "notes"]), 1);
    assert_eq!(harness.code(&["REGISTER", "alice"]), 0);
    assert_eq!(harness.code(&["PUBLISH", "alice", "a.txt", "notes"]), 2);
    assert_eq!(harness.code(&["CONNECT", "alice", "4000"]), 0);
    assert_eq!(harness.code(&["PUBLISH", "alice", "a.txt", "notes"]), 0);
    assert_eq!(harness.code(&["PUBLISH", "alice", "a.txt", "again"]), 3);
    assert_eq!(harness.code(&["PUBLISH", "alice", ".hidden", "x"]), 4);
    assert_eq!(
        fs::read_to_string(harness.root.join("alice").join("a.txt")).expect("body"),
        "notes"
    );

    assert_eq!(harness.code(&["DELETE", "alice", "a.txt"]), 0);
    assert_eq!(harness.code(&["DELETE", "alice", "a.txt"]), 3);
    assert_eq!(harness.code(&["DELETE", "ghost", "a.txt"]), 1);
}

#[rstest]
fn unknown_commands_get_no_response(harness: RouterFixture) {
    let (result, output) = harness.send(&["GET_FILE", "alice"]);
    assert!(matches!(result, Err(DispatchError::UnknownCommand(_))));
    assert!(output.is_empty());
}

#[rstest]
fn oversized_command_tokens_get_no_response(harness: RouterFixture) {
    let (result, output) = harness.send(&["REGISTER_A_VERY_LONG_COMMAND"]);
    assert!(matches!(result, Err(DispatchError::ReadCommand(_))));
    assert!(output.is_empty());
}

#[rstest]
fn empty_connections_are_ignored(harness: RouterFixture) {
    let (result, output) = harness.send(&[]);
    assert_eq!(result.expect("no error"), None);
    assert!(output.is_empty());
}

#[rstest]
fn newline_framed_requests_are_accepted(harness: RouterFixture) {
    let mut request = Cursor::new(b"REGISTER\r\nalice\r\n".to_vec());
    let mut output = Vec::new();
    let mut response = ResponseWriter::new(&mut output);
    let result = harness.router.route(PEER, &mut request, &mut response);
    assert_eq!(result.expect("routed"), Some(Command::Register));
    assert_eq!(output, [0]);
}
