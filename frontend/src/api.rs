//! 后端 API 客户端
//!
//! 每个后端操作对应一个方法：恰好一次 HTTP 调用，
//! 无重试、无去重、无缓存。失败原样交给调用方处理。

use crate::http::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};
use ridewave_shared::{
    BusRoute, DepartureSignal, EtaInfo, NewRideRequest, NewUser, RideRequest, User,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ApiResult<T> = Result<T, ApiError>;

// =========================================================
// 客户端配置
// =========================================================

/// API 客户端配置
///
/// 在应用启动时显式构造并传给 [`RideApi`]，不存在全局单例。
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// 部署地址在编译期通过 `RIDEWAVE_API_BASE` 注入，
    /// 未设置时回退到本地开发后端。
    pub fn from_build_env() -> Self {
        Self::new(option_env!("RIDEWAVE_API_BASE").unwrap_or("http://localhost:8000"))
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

// =========================================================
// 错误类型
// =========================================================

/// API 调用错误，按处理方式分为三类
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 传输层失败：请求没有完成，或响应体不可读
    Transport(HttpError),
    /// 服务端拒绝：非 2xx，`message` 为服务端给出的细节（若可解析）
    Status { status: u16, message: String },
    /// 响应形状不符合约定；绝不静默降级
    Decode(String),
}

impl ApiError {
    /// 给用户看的一行描述
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "Unable to reach the server. Please try again.".to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) => "The server returned an unexpected response.".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "transport error: {}", e),
            ApiError::Status { status, message } => {
                write!(f, "server rejected the request ({}): {}", status, message)
            }
            ApiError::Decode(msg) => write!(f, "unexpected response shape: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        ApiError::Transport(e)
    }
}

/// 服务端错误响应体，尽力解析其中的人类可读信息
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// 统一的响应解码：非 2xx 提取服务端细节，2xx 严格按目标类型解析
fn decode<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<T> {
    if !response.is_success() {
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| format!("Request failed with status {}", response.status));
        return Err(ApiError::Status {
            status: response.status,
            message,
        });
    }
    response.json::<T>().map_err(|e| ApiError::Decode(e.to_string()))
}

// =========================================================
// API 客户端
// =========================================================

#[derive(Debug, Clone)]
pub struct RideApi<C> {
    config: ApiConfig,
    http: C,
}

/// 生产环境使用的具体客户端类型
pub type BackendApi = RideApi<crate::http::FetchClient>;

impl<C: HttpClient> RideApi<C> {
    pub fn new(config: ApiConfig, http: C) -> Self {
        Self { config, http }
    }

    /// 测试专用：直接访问底层 HTTP 客户端以断言请求序列
    #[cfg(test)]
    pub fn http(&self) -> &C {
        &self.http
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let req = HttpRequest::new(&self.config.url(path), HttpMethod::Get);
        decode(self.http.send(req).await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::Transport(HttpError::BuildFailed(e.to_string())))?;
        let req = HttpRequest::new(&self.config.url(path), HttpMethod::Post).with_body(body);
        decode(self.http.send(req).await?)
    }

    /// 注册新用户
    pub async fn create_user(&self, new_user: &NewUser) -> ApiResult<User> {
        self.post_json("/users", new_user).await
    }

    /// 提交乘车请求
    pub async fn create_ride_request(&self, request: &NewRideRequest) -> ApiResult<RideRequest> {
        self.post_json("/ride-requests", request).await
    }

    /// 当前全部在等请求，长度即 "N riders waiting" 的计数
    pub async fn list_ride_requests(&self) -> ApiResult<Vec<RideRequest>> {
        self.get_json("/ride-requests").await
    }

    /// 查询单个乘车请求的当前状态
    pub async fn get_ride_request(&self, id: &str) -> ApiResult<RideRequest> {
        self.get_json(&format!("/ride-requests/{}", id)).await
    }

    /// 全局发车就绪信号
    pub async fn get_departure_signal(&self) -> ApiResult<DepartureSignal> {
        self.get_json("/bus-routes/should-depart").await
    }

    /// 按 id 获取路线途经点
    pub async fn get_bus_route(&self, route_id: &str) -> ApiResult<BusRoute> {
        self.get_json(&format!("/bus-routes/{}", route_id)).await
    }

    /// (路线, 请求) 对应的预计到达时间
    pub async fn get_eta(&self, route_id: &str, request_id: &str) -> ApiResult<EtaInfo> {
        self.get_json(&format!("/bus-routes/{}/eta/{}", route_id, request_id))
            .await
    }
}

// =========================================================
// 测试 (Tests)
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockHttpClient;
    use ridewave_shared::{GeoPoint, PaymentMethod};
    use serde_json::json;

    fn test_api(http: MockHttpClient) -> RideApi<MockHttpClient> {
        RideApi::new(ApiConfig::new("http://api.test"), http)
    }

    #[test]
    fn config_normalizes_trailing_slash() {
        let config = ApiConfig::new("http://api.test/");
        assert_eq!(config.url("/users"), "http://api.test/users");
        assert_eq!(config.url("users"), "http://api.test/users");
    }

    #[tokio::test]
    async fn create_user_posts_json_body_and_decodes_response() {
        let http = MockHttpClient::new();
        http.mock_response(
            "http://api.test/users",
            201,
            json!({"user_id": "u1", "name": "Ann", "email": "a@x.com"}),
        );
        let api = test_api(http);

        let user = api
            .create_user(&NewUser {
                name: "Ann".into(),
                email: "a@x.com".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.user_id, "u1");

        let requests = api.http.requests.borrow();
        assert_eq!(requests.len(), 1);
        let (method, url, body) = &requests[0];
        assert_eq!(method, "POST");
        assert_eq!(url, "http://api.test/users");
        let body: serde_json::Value = serde_json::from_str(body.as_ref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Ann", "email": "a@x.com"}));
    }

    #[tokio::test]
    async fn server_rejection_surfaces_server_detail() {
        let http = MockHttpClient::new();
        http.mock_response(
            "http://api.test/users",
            422,
            json!({"error": "email already registered"}),
        );
        let api = test_api(http);

        let err = api
            .create_user(&NewUser {
                name: "Ann".into(),
                email: "a@x.com".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Status {
                status: 422,
                message: "email already registered".into()
            }
        );
        assert_eq!(err.user_message(), "email already registered");
    }

    #[tokio::test]
    async fn server_rejection_without_detail_falls_back_to_status_line() {
        let http = MockHttpClient::new();
        // 未打桩的 URL 由 Mock 返回 404 "Not Found"（非 JSON 响应体）
        let api = test_api(http);

        let err = api.get_ride_request("missing").await.unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Request failed with status 404");
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unexpected_shape_is_a_decode_error() {
        let http = MockHttpClient::new();
        // user_id 缺失：显式记录类型要求它必须存在
        http.mock_response("http://api.test/users", 200, json!({"name": "Ann"}));
        let api = test_api(http);

        let err = api
            .create_user(&NewUser {
                name: "Ann".into(),
                email: "a@x.com".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(
            err.user_message(),
            "The server returned an unexpected response."
        );
    }

    #[tokio::test]
    async fn eta_path_nests_route_and_request_ids() {
        let http = MockHttpClient::new();
        http.mock_response(
            "http://api.test/bus-routes/b7/eta/r1",
            200,
            json!({"pickup_eta": "2026-08-24T10:15:00Z", "dropoff_eta": "2026-08-24T10:48:30Z"}),
        );
        let api = test_api(http);

        let eta = api.get_eta("b7", "r1").await.unwrap();
        assert!(eta.dropoff_eta > eta.pickup_eta);
        assert_eq!(
            api.http.sent(),
            vec![(
                "GET".to_string(),
                "http://api.test/bus-routes/b7/eta/r1".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn create_ride_request_sends_seconds_on_the_wire() {
        let http = MockHttpClient::new();
        http.mock_response(
            "http://api.test/ride-requests",
            201,
            json!({
                "id": "r1",
                "user_id": "u1",
                "pickup_location": {"latitude": 37.7749, "longitude": -122.4194},
                "dropoff_location": {"latitude": 37.8044, "longitude": -122.2712},
                "max_wait_time": 1800,
                "payment_method": "card"
            }),
        );
        let api = test_api(http);

        let request = NewRideRequest::with_wait_minutes(
            "u1".into(),
            GeoPoint::new(37.7749, -122.4194),
            GeoPoint::new(37.8044, -122.2712),
            30,
            PaymentMethod::Card,
        );
        let created = api.create_ride_request(&request).await.unwrap();
        assert_eq!(created.id, "r1");

        let requests = api.http.requests.borrow();
        let body: serde_json::Value =
            serde_json::from_str(requests[0].2.as_ref().unwrap()).unwrap();
        assert_eq!(body["max_wait_time"], 1800);
        assert_eq!(body["payment_method"], "card");
    }
}
