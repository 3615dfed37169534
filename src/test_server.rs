//! In-process HTTP server used by tests to stand in for remote endpoints.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What the server does with the next accepted connection.
#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    Respond(u16, String),
    DelayRespond(Duration, u16, String),
    /// Sends the head at once, then the body one byte per interval.
    Trickle(Duration, u16, String),
}

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: String,
}

impl CapturedRequest {
    pub(crate) fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }
}

#[derive(Debug, Default)]
struct Shared {
    script: Mutex<VecDeque<Behavior>>,
    accepted: Mutex<usize>,
    captured: Mutex<Vec<CapturedRequest>>,
    stopping: AtomicBool,
}

impl Shared {
    fn next_behavior(&self) -> Behavior {
        self.script
            .lock()
            .expect("lock script")
            .pop_front()
            .unwrap_or_else(|| Behavior::Respond(200, "default-ok".to_string()))
    }
}

#[derive(Debug)]
pub(crate) struct TestServer {
    pub(crate) base_url: String,
    addr: SocketAddr,
    shared: Arc<Shared>,
    acceptor: Option<JoinHandle<()>>,
}

impl TestServer {
    pub(crate) fn spawn(behaviors: Vec<Behavior>) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind test server");
        let addr = listener.local_addr().expect("local addr");
        let shared = Arc::new(Shared {
            script: Mutex::new(behaviors.into()),
            ..Shared::default()
        });

        let acceptor = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || accept_loop(&listener, &shared))
        };

        Self {
            base_url: format!("http://{addr}"),
            addr,
            shared,
            acceptor: Some(acceptor),
        }
    }

    /// Address of a server that is not listening anymore.
    pub(crate) fn unreachable_url() -> String {
        let addr = TcpListener::bind(("127.0.0.1", 0))
            .and_then(|listener| listener.local_addr())
            .expect("reserve port");
        format!("http://{addr}")
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn request_count(&self) -> usize {
        *self.shared.accepted.lock().expect("lock accepted")
    }

    /// Requests fully read so far. Waits briefly for handler threads to record them.
    pub(crate) fn requests(&self) -> Vec<CapturedRequest> {
        let mut attempts = 0;
        loop {
            let captured = self.shared.captured.lock().expect("lock captured").clone();
            if captured.len() >= self.request_count() || attempts == 100 {
                return captured;
            }
            attempts += 1;
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shared.stopping.store(true, Ordering::SeqCst);
        // Wake the blocking accept so the loop can see the flag.
        let _ = TcpStream::connect(self.addr);
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

fn accept_loop(listener: &TcpListener, shared: &Arc<Shared>) {
    for stream in listener.incoming() {
        if shared.stopping.load(Ordering::SeqCst) {
            return;
        }
        let Ok(mut stream) = stream else {
            return;
        };
        *shared.accepted.lock().expect("lock accepted") += 1;
        let behavior = shared.next_behavior();
        let shared = Arc::clone(shared);
        thread::spawn(move || {
            if let Ok(request) = read_request(&mut stream) {
                shared.captured.lock().expect("lock captured").push(request);
            }
            let _ = respond(&mut stream, behavior);
        });
    }
}

fn read_request(stream: &mut TcpStream) -> io::Result<CapturedRequest> {
    stream.set_read_timeout(Some(Duration::from_millis(500)))?;
    let mut chunk = [0_u8; 4096];
    let mut data = Vec::new();
    let head_len = loop {
        if let Some(pos) = data.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk)? {
            0 => return Err(io::ErrorKind::UnexpectedEof.into()),
            read => data.extend_from_slice(&chunk[..read]),
        }
    };

    let head = String::from_utf8_lossy(&data[..head_len]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect::<Vec<_>>();

    let expected = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = data.split_off(head_len);
    while body.len() < expected {
        match stream.read(&mut chunk)? {
            0 => break,
            read => body.extend_from_slice(&chunk[..read]),
        }
    }

    Ok(CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn respond(stream: &mut TcpStream, behavior: Behavior) -> io::Result<()> {
    let (status, body, pause, per_byte) = match behavior {
        Behavior::Respond(status, body) => (status, body, None, None),
        Behavior::DelayRespond(delay, status, body) => (status, body, Some(delay), None),
        Behavior::Trickle(gap, status, body) => (status, body, None, Some(gap)),
    };
    if let Some(pause) = pause {
        thread::sleep(pause);
    }

    write!(
        stream,
        "HTTP/1.1 {status} Test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )?;
    match per_byte {
        None => stream.write_all(body.as_bytes())?,
        Some(gap) => {
            stream.flush()?;
            for byte in body.bytes() {
                thread::sleep(gap);
                stream.write_all(&[byte])?;
                stream.flush()?;
            }
        }
    }
    stream.flush()
}
