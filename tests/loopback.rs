//! End-to-end tests against real loopback sockets.
//!
//! Multi-host fan-out is exercised with two loopback addresses
//! (`127.0.0.1` and `127.0.0.2`) sharing a single port, since the client
//! configures one port per protocol across its whole host set.

use std::{
    io::{ErrorKind, Read as _},
    net::{TcpListener, UdpSocket},
    sync::Arc,
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use mini_graphite::{instrument, MiniGraphite, MiniGraphiteBuilder, SendError};

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

fn udp_receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(RECV_TIMEOUT)).unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

fn recv_datagram(socket: &UdpSocket) -> String {
    let mut buf = [0_u8; 1024];
    let (len, _) = socket.recv_from(&mut buf).unwrap();
    String::from_utf8(buf[..len].to_vec()).unwrap()
}

fn assert_no_datagram(socket: &UdpSocket) {
    socket.set_nonblocking(true).unwrap();
    let mut buf = [0_u8; 1024];
    match socket.recv_from(&mut buf) {
        Err(err) if err.kind() == ErrorKind::WouldBlock => {}
        other => panic!("expected no datagram, got {other:?}"),
    }
    socket.set_nonblocking(false).unwrap();
}

fn statsd_client(port: u16) -> MiniGraphite {
    MiniGraphiteBuilder::default()
        .with_statsd_host("127.0.0.1")
        .with_statsd_port(port)
        .build()
        .unwrap()
}

/// Accepts one connection and returns everything the peer wrote.
fn capture_tcp_line(listener: TcpListener) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut received = String::new();
        stream.read_to_string(&mut received).unwrap();
        received
    })
}

#[test]
fn counter_reaches_every_statsd_host() {
    let first = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = first.local_addr().unwrap().port();
    let second = UdpSocket::bind(("127.0.0.2", port)).unwrap();
    first.set_read_timeout(Some(RECV_TIMEOUT)).unwrap();
    second.set_read_timeout(Some(RECV_TIMEOUT)).unwrap();

    let client = MiniGraphiteBuilder::default()
        .with_statsd_hosts(["127.0.0.1", "127.0.0.2"])
        .with_statsd_port(port)
        .build()
        .unwrap();

    client.counter("height", 231);

    assert_eq!(recv_datagram(&first), "height:231|c");
    assert_eq!(recv_datagram(&second), "height:231|c");
    assert_no_datagram(&first);
    assert_no_datagram(&second);
}

#[test]
fn increment_matches_counter_with_value_one() {
    let (socket, port) = udp_receiver();
    let client = statsd_client(port);

    client.increment("height");
    client.counter("height", 1);

    assert_eq!(recv_datagram(&socket), "height:1|c");
    assert_eq!(recv_datagram(&socket), "height:1|c");
}

#[test]
fn time_emits_timer_signal() {
    let (socket, port) = udp_receiver();
    let client = statsd_client(port);

    client.time("my_time", 231);

    assert_eq!(recv_datagram(&socket), "my_time:231|ms");
}

#[test]
fn datapoint_reaches_every_graphite_host() {
    let first = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = first.local_addr().unwrap().port();
    let second = TcpListener::bind(("127.0.0.2", port)).unwrap();
    let first_line = capture_tcp_line(first);
    let second_line = capture_tcp_line(second);

    let client = MiniGraphiteBuilder::default()
        .with_graphite_hosts(["127.0.0.1", "127.0.0.2"])
        .with_graphite_port(port)
        .build()
        .unwrap();

    client
        .datapoint_at("test.age", 31, UNIX_EPOCH + Duration::from_secs(1_357_121_460))
        .unwrap();

    assert_eq!(first_line.join().unwrap(), "test.age 31 1357121460\n");
    assert_eq!(second_line.join().unwrap(), "test.age 31 1357121460\n");
}

#[test]
fn datapoint_defaults_timestamp_to_now() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let line = capture_tcp_line(listener);

    let client = MiniGraphiteBuilder::default()
        .with_graphite_host("127.0.0.1")
        .with_graphite_port(port)
        .build()
        .unwrap();

    let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    client.datapoint("users.active", 1731).unwrap();
    let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

    let received = line.join().unwrap();
    let timestamp: u64 = received
        .strip_prefix("users.active 1731 ")
        .unwrap()
        .trim_end()
        .parse()
        .unwrap();
    assert!(timestamp >= before && timestamp <= after);
}

#[test]
fn mock_mode_suppresses_all_network_io() {
    let (socket, udp_port) = udp_receiver();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let tcp_port = listener.local_addr().unwrap().port();

    let client = MiniGraphiteBuilder::default()
        .with_graphite_host("127.0.0.1")
        .with_graphite_port(tcp_port)
        .with_statsd_host("127.0.0.1")
        .with_statsd_port(udp_port)
        .with_mock_mode(true)
        .build()
        .unwrap();

    client.datapoint("test.age", 1).unwrap();
    client.counter("test.age", 1);
    client.time("test.age", 1);
    client.benchmark("test").run(|| ());

    assert_no_datagram(&socket);
    match listener.accept() {
        Err(err) if err.kind() == ErrorKind::WouldBlock => {}
        other => panic!("expected no connection, got {other:?}"),
    }
}

#[test]
fn benchmark_emits_time_then_end() {
    let (socket, port) = udp_receiver();
    let client = statsd_client(port);

    let result = client.benchmark("p").run(|| "RESULT");
    assert_eq!(result, "RESULT");

    let time_signal = recv_datagram(&socket);
    let time_value: f64 = time_signal
        .strip_prefix("p.time:")
        .unwrap_or_else(|| panic!("unexpected signal: {time_signal}"))
        .strip_suffix("|c")
        .unwrap()
        .parse()
        .unwrap();
    assert!(time_value >= 0.0);

    assert_eq!(recv_datagram(&socket), "p.end:1|c");
    assert_no_datagram(&socket);
}

#[test]
fn benchmark_emits_start_and_projected_result() {
    let (socket, port) = udp_receiver();
    let client = statsd_client(port);

    let result = client
        .benchmark("p")
        .with_start_signal()
        .with_result_projection(|r: &&str| r.len().into())
        .run(|| "RESULT");
    assert_eq!(result, "RESULT");

    assert_eq!(recv_datagram(&socket), "p.ini:1|c");
    assert!(recv_datagram(&socket).starts_with("p.time:"));
    assert_eq!(recv_datagram(&socket), "p.result:6|c");
    assert_eq!(recv_datagram(&socket), "p.end:1|c");
    assert_no_datagram(&socket);
}

#[test]
fn refused_graphite_connection_propagates() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = MiniGraphiteBuilder::default()
        .with_graphite_host("127.0.0.1")
        .with_graphite_port(port)
        .build()
        .unwrap();

    let err = client.datapoint("test.age", 1).unwrap_err();
    assert!(matches!(err, SendError::Connect { .. }));
    assert!(!err.is_timeout());
}

#[test]
fn instrumented_callable_emits_and_passes_through() {
    let (socket, port) = udp_receiver();
    let client = Arc::new(statsd_client(port));

    struct Repo {
        prefix: &'static str,
    }

    impl Repo {
        fn get(&self, name: &str) -> String {
            format!("{}: {}", self.prefix, name)
        }
    }

    let repo = Repo { prefix: "RESULT" };
    let get = instrument(Arc::clone(&client), "repo.get", move |name: &str| repo.get(name));

    assert_eq!(get("params"), "RESULT: params");
    assert!(recv_datagram(&socket).starts_with("repo.get.time:"));
    assert_eq!(recv_datagram(&socket), "repo.get.end:1|c");

    // The wrapper stays installed: a second call emits again.
    assert_eq!(get("again"), "RESULT: again");
    assert!(recv_datagram(&socket).starts_with("repo.get.time:"));
    assert_eq!(recv_datagram(&socket), "repo.get.end:1|c");
}
