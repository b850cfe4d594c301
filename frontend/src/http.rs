//! HTTP 传输层
//!
//! 把浏览器 Fetch 封装在 [`HttpClient`] trait 之后，
//! 上层 API 客户端只依赖该抽象，测试时可替换为 Mock。

use serde::de::DeserializeOwned;
use std::fmt;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;

// =========================================================
// 错误类型
// =========================================================

/// 传输层错误：尚未拿到可用响应之前发生的一切
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// 请求构建失败（URL 或请求体不合法）
    BuildFailed(String),
    /// 网络层失败，没有收到任何响应
    Network(String),
    /// 收到响应但响应体读取失败
    BodyRead(String),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::BuildFailed(msg) => write!(f, "failed to build request: {}", msg),
            HttpError::Network(msg) => write!(f, "network error: {}", msg),
            HttpError::BodyRead(msg) => write!(f, "failed to read response body: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            body: None,
        }
    }

    /// 附加已序列化的 JSON 请求体
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// =========================================================
// 实现层: 浏览器 Fetch 客户端
// =========================================================

#[derive(Clone, Copy, Default)]
pub struct FetchClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        use gloo_net::http::Request;

        let response = match req.method {
            HttpMethod::Get => Request::get(&req.url)
                .send()
                .await
                .map_err(|e| HttpError::Network(e.to_string()))?,
            HttpMethod::Post => {
                let builder = Request::post(&req.url).header("Content-Type", "application/json");
                let request = match req.body {
                    Some(body) => builder
                        .body(body)
                        .map_err(|e| HttpError::BuildFailed(e.to_string()))?,
                    None => builder
                        .build()
                        .map_err(|e| HttpError::BuildFailed(e.to_string()))?,
                };
                request
                    .send()
                    .await
                    .map_err(|e| HttpError::Network(e.to_string()))?
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::BodyRead(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub struct MockHttpClient {
    // (URL, (Status, Response Body))
    responses: RefCell<HashMap<String, (u16, String)>>,
    // 记录发出的请求 (Method, URL, Body)
    pub requests: RefCell<Vec<(String, String, Option<String>)>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), (status, body.to_string()));
    }

    /// 已发出请求的 (Method, URL) 列表，便于断言调用序列
    pub fn sent(&self) -> Vec<(String, String)> {
        self.requests
            .borrow()
            .iter()
            .map(|(method, url, _)| (method.clone(), url.clone()))
            .collect()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push((
            req.method.as_str().to_string(),
            req.url.clone(),
            req.body.clone(),
        ));

        let responses = self.responses.borrow();
        if let Some((status, body)) = responses.get(&req.url) {
            Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            })
        } else {
            Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            })
        }
    }
}
