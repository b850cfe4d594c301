//! RideWave 共享数据模型
//!
//! 前端与外部后端之间的线上数据结构（wire types）。
//! 所有请求/响应体都在这里定义，字段名与后端 API 完全一致。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod geo;

pub use geo::GeoPoint;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 最短可接受等待时间（分钟，含边界）
pub const MIN_WAIT_MINUTES: u32 = 10;
/// 最长可接受等待时间（分钟，含边界）
pub const MAX_WAIT_MINUTES: u32 = 120;

// =========================================================
// 用户 (User)
// =========================================================

/// `POST /users` 请求体
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// 注册成功后后端返回的用户记录
///
/// 会以 JSON 形式持久化在浏览器会话存储中，
/// 它的存在与否决定是否展示注册页。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

// =========================================================
// 乘车请求 (Ride Request)
// =========================================================

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    Wallet,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Card
    }
}

impl PaymentMethod {
    /// 表单下拉框的固定选项顺序
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Card, PaymentMethod::Cash, PaymentMethod::Wallet];

    /// 线上值（与 serde 的 snake_case 重命名保持一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Wallet => "wallet",
        }
    }

    /// 用户可见的展示名
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit card",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Wallet => "Wallet",
        }
    }
}

/// 乘车请求的后端状态
///
/// 线上形式为大写蛇形（如 `"CONFIRMED"`）。
/// 只有 `Confirmed` 会结束匹配等待，其余状态一律继续轮询。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Pending,
    Accepted,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl Default for RideStatus {
    fn default() -> Self {
        RideStatus::Pending
    }
}

impl RideStatus {
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, RideStatus::Confirmed)
    }
}

/// `POST /ride-requests` 请求体
///
/// 注意 `max_wait_time` 的线上单位是秒；表单输入的是分钟，
/// 由 [`NewRideRequest::with_wait_minutes`] 负责换算。
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewRideRequest {
    pub user_id: String,
    pub pickup_location: GeoPoint,
    pub dropoff_location: GeoPoint,
    pub max_wait_time: u32,
    pub payment_method: PaymentMethod,
}

impl NewRideRequest {
    /// 以分钟为单位构造（表单语义），写入线上时转换为秒
    pub fn with_wait_minutes(
        user_id: String,
        pickup: GeoPoint,
        dropoff: GeoPoint,
        wait_minutes: u32,
        payment_method: PaymentMethod,
    ) -> Self {
        NewRideRequest {
            user_id,
            pickup_location: pickup,
            dropoff_location: dropoff,
            max_wait_time: wait_minutes * 60,
            payment_method,
        }
    }
}

/// 后端返回的乘车请求记录（创建响应与状态查询共用）
///
/// 等待确认期间持久化于会话存储；`route_id` 在确认前不存在。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RideRequest {
    pub id: String,
    pub user_id: String,
    pub pickup_location: GeoPoint,
    pub dropoff_location: GeoPoint,
    pub max_wait_time: u32,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: RideStatus,
    #[serde(default)]
    pub route_id: Option<String>,
}

impl RideRequest {
    /// 等待时间的展示值（分钟）
    #[inline]
    pub fn max_wait_minutes(&self) -> u32 {
        self.max_wait_time / 60
    }
}

// =========================================================
// 公交路线 (Bus Route)
// =========================================================

/// `GET /bus-routes/should-depart` 响应
///
/// 后端的全局发车信号：一个布尔标志加上本批次被确认的请求 id 集合。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DepartureSignal {
    pub should_depart: bool,
    #[serde(default)]
    pub confirmed_request_ids: Vec<String>,
}

impl DepartureSignal {
    /// 该信号是否确认了指定请求：标志为真且 id 在确认集合内
    pub fn confirms(&self, request_id: &str) -> bool {
        self.should_depart && self.confirmed_request_ids.iter().any(|id| id == request_id)
    }
}

/// `GET /bus-routes/{routeId}` 响应：有序的上/下车途经点
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BusRoute {
    #[serde(default)]
    pub id: String,
    pub pickup_points: Vec<GeoPoint>,
    pub dropoff_points: Vec<GeoPoint>,
    #[serde(default)]
    pub confirmed_request_ids: Vec<String>,
}

/// `GET /bus-routes/{routeId}/eta/{requestId}` 响应
///
/// 两个 ISO 8601 时间戳，仅在确认路线页的生命周期内使用，不做缓存。
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct EtaInfo {
    pub pickup_eta: DateTime<Utc>,
    pub dropoff_eta: DateTime<Utc>,
}

// =========================================================
// 测试 (Tests)
// =========================================================
