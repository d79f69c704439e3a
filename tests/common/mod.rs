//! 集成测试共用工具：一次性 HTTP 服务 + 内存图片生成。

#![allow(dead_code)]

use image::{ImageBuffer, ImageFormat, Rgba};
use std::io::{Cursor, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// 服务端收到的原始请求。
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn body_contains(&self, needle: &[u8]) -> bool {
        find(&self.body, needle).is_some()
    }
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// 拼装完整 HTTP 响应。
pub fn http_response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

/// 启动只处理一个请求的服务，返回 base url 与请求接收端。
pub fn spawn_one_shot_server(response: Vec<u8>) -> (String, Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().expect("local addr failed");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let captured = read_request(&mut stream);
            let _ = stream.write_all(&response);
            let _ = stream.flush();
            let _ = tx.send(captured);
        }
    });

    (format!("http://{}", addr), rx)
}

/// 监听但从不应答的端口，用于断言“没有发出请求”。
pub struct SilentListener {
    listener: TcpListener,
}

impl SilentListener {
    pub fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
        listener.set_nonblocking(true).expect("nonblocking failed");
        Self { listener }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.listener.local_addr().expect("local addr failed"))
    }

    pub fn received_connection(&self) -> bool {
        self.listener.accept().is_ok()
    }
}

fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set timeout failed");

    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 8192];
    let header_end = loop {
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break buffer.len(),
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers = lines.collect::<Vec<_>>().join("\r\n");
    let lower = headers.to_ascii_lowercase();

    let content_length = lower
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok());
    let chunked = lower.contains("transfer-encoding: chunked");

    let mut body = buffer[header_end..].to_vec();
    loop {
        let done = match content_length {
            Some(len) => body.len() >= len,
            None if chunked => find(&body, b"0\r\n\r\n").is_some(),
            None => true,
        };
        if done {
            break;
        }
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
        }
    }

    CapturedRequest {
        request_line,
        headers,
        body,
    }
}

/// 纯色 PNG。
pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = ImageBuffer::from_pixel(width, height, Rgba(color));
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("png encode failed");
    cursor.into_inner()
}
