//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 发送请求，`HttpClient` trait 作为抽象层，
//! 以便在原生测试中替换为 `MockHttpClient`。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use codesage_shared::HttpMethod;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

use super::Timeout;

/// HTTP 错误类型
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    /// 请求构建失败
    #[error("request could not be built: {0}")]
    RequestBuildFailed(String),
    /// 网络请求失败
    #[error("network error: {0}")]
    NetworkError(String),
    /// 超时（请求已被中止）
    #[error("request timed out")]
    Timeout,
    /// 响应体读取失败
    #[error("response could not be read: {0}")]
    ResponseReadFailed(String),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// 添加请求头
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// 设置 JSON 请求体
    pub fn with_json_body(mut self, body: String) -> Self {
        self.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
impl HttpRequest {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// =========================================================
// 实现层: 浏览器 fetch
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchHttpClient;

#[async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let headers = Headers::new()
            .map_err(|e| HttpError::RequestBuildFailed(format!("Headers: {:?}", e)))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| HttpError::RequestBuildFailed(format!("header {}: {:?}", key, e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        // 超时通过 AbortController 中止 fetch
        let controller = AbortController::new()
            .map_err(|e| HttpError::RequestBuildFailed(format!("AbortController: {:?}", e)))?;
        opts.set_signal(Some(&controller.signal()));
        let timed_out = Rc::new(Cell::new(false));
        let _deadline = req.timeout.and_then(|timeout| {
            let timed_out = timed_out.clone();
            Timeout::new(timeout, move || {
                timed_out.set(true);
                controller.abort();
            })
        });

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?;

        let window = web_sys::window()
            .ok_or_else(|| HttpError::NetworkError("no window object".to_string()))?;

        let resp_value = match JsFuture::from(window.fetch_with_request(&request)).await {
            Ok(value) => value,
            Err(_) if timed_out.get() => return Err(HttpError::Timeout),
            Err(e) => return Err(HttpError::NetworkError(format!("{:?}", e))),
        };

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| HttpError::ResponseReadFailed(format!("not a Response: {:?}", e)))?;
        let status = response.status();

        let promise = response
            .text()
            .map_err(|e| HttpError::ResponseReadFailed(format!("{:?}", e)))?;
        let text = match JsFuture::from(promise).await {
            Ok(text) => text,
            Err(_) if timed_out.get() => return Err(HttpError::Timeout),
            Err(e) => return Err(HttpError::ResponseReadFailed(format!("{:?}", e))),
        };

        Ok(HttpResponse {
            status,
            body: text.as_string().unwrap_or_default(),
        })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    /// 按 "METHOD url" 排队的响应；同一请求多次发出时依次消费，
    /// 最后一个响应会被重复使用。
    #[derive(Default)]
    pub struct MockHttpClient {
        responses: RefCell<HashMap<String, VecDeque<Result<HttpResponse, HttpError>>>>,
        pub requests: RefCell<Vec<HttpRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        fn key(method: HttpMethod, url: &str) -> String {
            format!("{} {}", method.as_str(), url)
        }

        pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
            self.responses
                .borrow_mut()
                .entry(Self::key(method, url))
                .or_default()
                .push_back(Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                }));
        }

        pub fn mock_error(&self, method: HttpMethod, url: &str, error: HttpError) {
            self.responses
                .borrow_mut()
                .entry(Self::key(method, url))
                .or_default()
                .push_back(Err(error));
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.borrow().last().cloned()
        }
    }

    #[async_trait(?Send)]
    impl HttpClient for MockHttpClient {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
            let key = Self::key(req.method, &req.url);
            self.requests.borrow_mut().push(req);

            let mut responses = self.responses.borrow_mut();
            match responses.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Err(
                    HttpError::NetworkError("empty mock queue".to_string()),
                )),
                Some(queue) => queue.front().cloned().unwrap_or(Err(HttpError::NetworkError(
                    "empty mock queue".to_string(),
                ))),
                None => Ok(HttpResponse {
                    status: 404,
                    body: r#"{"detail":"Not Found"}"#.to_string(),
                }),
            }
        }
    }
}
