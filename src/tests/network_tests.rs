use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use tempfile::{tempdir, TempDir};

use crate::constants::{MB, PROMPT};
use crate::network::Server;
use crate::Engine;

fn spawn_server() -> (std::net::SocketAddr, Arc<Engine>, TempDir) {
    let dir = tempdir().unwrap();
    let engine = Arc::new(
        Engine::builder()
            .data_dir(dir.path())
            .file_capacity(MB)
            .open()
            .unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server_engine = Arc::clone(&engine);
    thread::spawn(move || {
        Server::new(server_engine).serve(listener).unwrap();
    });
    (addr, engine, dir)
}

struct Client {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Client {
    fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        Self { stream, reader }
    }

    /// Wait for the prompt, send one request line, read the response line.
    fn request(&mut self, line: &str) -> String {
        let mut prompt = vec![0u8; PROMPT.len()];
        self.reader.read_exact(&mut prompt).unwrap();
        assert_eq!(prompt, PROMPT);

        self.stream.write_all(line.as_bytes()).unwrap();
        self.stream.write_all(b"\n").unwrap();

        let mut response = String::new();
        self.reader.read_line(&mut response).unwrap();
        response.trim_end_matches('\n').to_string()
    }
}

// ============ Wire Protocol Tests ============

#[test]
fn test_hi_over_the_wire() {
    let (addr, _engine, _dir) = spawn_server();
    let mut client = Client::connect(addr);
    assert_eq!(client.request("hi"), "hello frand");
}

#[test]
fn test_insert_find_delete_session() {
    let (addr, _engine, _dir) = spawn_server();
    let mut client = Client::connect(addr);

    assert_eq!(client.request(r#"insert {"_id":1,"x":"a"}"#), "OK");
    assert_eq!(client.request("findid 1"), r#"{"_id":1,"x":"a"}"#);
    assert_eq!(client.request("deleteid 1"), "OK");
    assert_eq!(client.request("findid 1"), "Id 1 not found");
}

#[test]
fn test_errors_do_not_end_the_session() {
    let (addr, _engine, _dir) = spawn_server();
    let mut client = Client::connect(addr);

    assert_eq!(client.request("frobnicate"), "Unrecognized command.");
    assert!(client.request("findid pony").contains("invalid integer"));
    assert_eq!(client.request("hi"), "hello frand");
}

#[test]
fn test_two_clients_share_the_engine() {
    let (addr, _engine, _dir) = spawn_server();
    let mut writer = Client::connect(addr);
    let mut reader = Client::connect(addr);

    assert_eq!(writer.request(r#"insert {"_id":7,"x":"shared"}"#), "OK");
    assert_eq!(reader.request("findid 7"), r#"{"_id":7,"x":"shared"}"#);
}

#[test]
fn test_getmore_joins_payloads_with_newlines() {
    let (addr, _engine, _dir) = spawn_server();
    let mut client = Client::connect(addr);

    for id in 1..=3 {
        let line = format!(r#"insert {{"_id":{},"x":"a"}}"#, id);
        assert_eq!(client.request(&line), "OK");
    }
    assert_eq!(client.request("findall"), "1");

    // Three payloads joined by '\n': the response spans three lines, the
    // last of which carries the protocol's line terminator.
    let mut prompt = vec![0u8; PROMPT.len()];
    client.reader.read_exact(&mut prompt).unwrap();
    client.stream.write_all(b"getmore 1\n").unwrap();

    let mut lines = Vec::new();
    for _ in 0..3 {
        let mut line = String::new();
        client.reader.read_line(&mut line).unwrap();
        lines.push(line.trim_end_matches('\n').to_string());
    }
    assert_eq!(lines[0], r#"{"_id":1,"x":"a"}"#);
    assert_eq!(lines[2], r#"{"_id":3,"x":"a"}"#);

    assert_eq!(client.request("getmore 1"), "cursor exhausted");
}

#[test]
fn test_disconnect_leaves_server_serving() {
    let (addr, _engine, _dir) = spawn_server();
    {
        let mut doomed = Client::connect(addr);
        assert_eq!(doomed.request("hi"), "hello frand");
        // Dropped here: the server should only log the closed session.
    }
    let mut client = Client::connect(addr);
    assert_eq!(client.request("hi"), "hello frand");
}
