//! Test doubles: page fixtures, a scripted transport and a tiny HTTP server.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use crate::{
    error::Error,
    transport::{HttpRequest, HttpResponse, Transport},
};

pub const MODULUS: &str = "A5261939975948BB7A58DFFE5FF54E65F0498F9175F5A09288810B8975871E99\
                           AF3B5DD94057B0FC07535F5F97444504FA35169D461D0D30CF0192E307727C06\
                           5168C788771C561A9400FB49175E9E6AA4E23FE11AF69E9412DD23B0CB6684C4\
                           C2429BCE139E848AB26D0829073351F4ACD36074EAFD036A5EB83359D2A698D3";

pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>login</title>
<script type="text/javascript" src="/js/rsa.js"></script>
<script type="text/javascript">
function encrypt_pass(form) {
    var rsa = new RSAKey();
    var exponent = "65537";
    var modulus = "A5261939975948BB7A58DFFE5FF54E65F0498F9175F5A09288810B8975871E99AF3B5DD94057B0FC07535F5F97444504FA35169D461D0D30CF0192E307727C065168C788771C561A9400FB49175E9E6AA4E23FE11AF69E9412DD23B0CB6684C4C2429BCE139E848AB26D0829073351F4ACD36074EAFD036A5EB83359D2A698D3";
    rsa.setPublic(modulus, exponent);
    form.encrypted.value = rsa.encrypt("airstation_pass=" + form.airstation_pass.value);
}
</script>
</head>
<body>
<form name="login" method="post" action="/cgi-bin/cgi?req=inp&res=login.html">
<input type="hidden" name="lang" value="auto">
<input type="hidden" name="sWebSessionid" value="abc">
<input type="hidden" name="sWebSessionnum" value="123">
<input type="hidden" name="encrypted" value="">
<input type="text" name="airstation_uname" value="admin">
<input type="password" name="airstation_pass" value="">
<input type="submit" value="Login">
</form>
</body>
</html>
"#;

pub const LOGIN_FAILED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>login</title></head>
<body>
<div class="errortxt">The user name or password is incorrect.</div>
</body>
</html>
"#;

pub const MAIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>AirStation</title></head>
<body><div id="menu">Home</div></body>
</html>
"#;

pub const DHCP_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>DHCP Lease</title></head>
<body>
<form method="post" action="/cgi-bin/cgi?req=inp&res=dhcps_lease.html">
<table class="AD_LIST">
<tr><th>IP Address</th><th>MAC Address</th><th>Lease Period</th><th>Status</th><th>Operation</th></tr>
<tr>
<td>192.168.11.3(*)</td>
<td>aa:bb:cc:dd:ee:ff</td>
<td>12:00</td>
<td>-</td>
<td><submit name="fixID"></submit></td>
</tr>
<tr><td colspan="5">spacer</td></tr>
<tr>
<td>192.168.11.4</td>
<td>11:22:33:44:55:66</td>
<td>Manual</td>
<td>Active</td>
<td><input type="submit" name="fix2" value="Edit"></td>
</tr>
</table>
</form>
</body>
</html>
"#;

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, Error> + Send + Sync>;

/// A [`Transport`] answering from a closure and recording every call.
pub struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, Error> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    /// A transport that answers only after `delay`.
    pub fn slow<F>(delay: Duration, handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, Error> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    /// A transport simulating the console.
    pub fn device(device: Arc<FakeDevice>) -> Arc<Self> {
        Self::new(move |request| device.handle(request))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        self.calls.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&request)
    }
}

/// Console behaviour behind [`MockTransport::device`].
#[derive(Default)]
pub struct FakeDevice {
    pub logged_in: AtomicBool,
    pub reject_login: AtomicBool,
    pub fail_logout: AtomicBool,
    pub reject_commands: AtomicBool,
    pub logins: AtomicUsize,
}

impl FakeDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn handle(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let query = request.url.split_once('?').map(|(_, q)| q).unwrap_or_default();

        if query == "req=twz" {
            let page = if self.logged_in.load(Ordering::SeqCst) {
                MAIN_PAGE
            } else {
                LOGIN_PAGE
            };
            return Ok(HttpResponse::ok(page));
        }
        if query == "req=inp&res=login.html" {
            self.logins.fetch_add(1, Ordering::SeqCst);
            if self.reject_login.load(Ordering::SeqCst) {
                return Ok(HttpResponse::ok(LOGIN_FAILED_PAGE));
            }
            self.logged_in.store(true, Ordering::SeqCst);
            return Ok(HttpResponse {
                status: 302,
                body: String::new(),
            });
        }
        if query == "req=twz&frm=logout.html" {
            if self.fail_logout.load(Ordering::SeqCst) {
                return Err(Error::ConnectionFailed("connection reset".into()));
            }
            self.logged_in.store(false, Ordering::SeqCst);
            return Ok(HttpResponse::ok(LOGIN_PAGE));
        }
        if let Some(rest) = query.strip_prefix("req=fnc&fnc=%24{get_json_param(") {
            let name = rest.split(',').next().unwrap_or_default();
            return Ok(HttpResponse::ok(format!(
                r#"{{"PARAM":"{}","SUPPORT":true}}"#,
                name
            )));
        }
        if query.starts_with("req=set&t=") {
            if self.reject_commands.load(Ordering::SeqCst) {
                return Ok(HttpResponse::ok("NG"));
            }
            return Ok(HttpResponse::ok("OK"));
        }
        if query.starts_with("req=frm&frm=dhcps_lease.html&rnd=") {
            return Ok(HttpResponse::ok(DHCP_PAGE));
        }
        Ok(HttpResponse {
            status: 404,
            body: "not found".into(),
        })
    }
}

/// A request as seen by [`MockServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

/// What [`MockServer`] answers.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MockReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Single-purpose HTTP/1.1 server on a random local port.
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> MockReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve_one(stream, handler.as_ref(), &recorded).await;
                });
            }
        });

        Self { base_url, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_one<F>(
    mut stream: TcpStream,
    handler: &F,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> Option<()>
where
    F: Fn(&RecordedRequest) -> MockReply,
{
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(end) = find_header_end(&data) {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let body_start = header_end + 4;
    let content_length = parse_content_length(&head).unwrap_or(0);
    while data.len() - body_start < content_length {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }

    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let request = RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&data[body_start..]).to_string(),
    };

    let reply = handler(&request);
    recorded.lock().unwrap().push(request);

    let mut response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str("\r\n");
    response.push_str(&reply.body);

    stream.write_all(response.as_bytes()).await.ok()?;
    stream.shutdown().await.ok()
}

/// Find the position of "\r\n\r\n" in the request (end of headers).
fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Parse the Content-Length header value.
fn parse_content_length(headers: &str) -> Option<usize> {
    for line in headers.lines() {
        if line.to_lowercase().starts_with("content-length:") {
            let value = line.split(':').nth(1)?.trim();
            return value.parse().ok();
        }
    }
    None
}
