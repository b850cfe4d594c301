//! 乘车请求生命周期
//!
//! 界面的唯一真相源：一个四阶段状态机，加上驱动它前进的业务逻辑。
//! 逻辑层对存储与 HTTP 都只依赖 trait，浏览器实现与测试 Mock 可互换。
//!
//! ```text
//! Unauthenticated → AwaitingRideRequest → AwaitingConfirmation → RouteConfirmed
//! ```

use crate::api::{ApiError, RideApi};
use crate::http::HttpClient;
use crate::session::{KEY_RIDE_REQUEST, KEY_USER, SessionStore};
use ridewave_shared::{
    GeoPoint, MAX_WAIT_MINUTES, MIN_WAIT_MINUTES, NewRideRequest, NewUser, PaymentMethod,
    RideRequest, RideStatus, User,
};
use std::fmt;

// =========================================================
// 状态机 (Ride Phase)
// =========================================================

/// 当前应当渲染哪个屏幕
///
/// 阶段只能由 [`RideFlow`] 的操作推进；组件层持有它的信号并据此切换页面。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RidePhase {
    /// 没有用户记录，显示注册页
    Unauthenticated,
    /// 已注册、无在途请求，显示乘车表单
    AwaitingRideRequest,
    /// 请求已提交，轮询等待后端确认
    AwaitingConfirmation { request_id: String },
    /// 后端已确认发车，展示路线与 ETA
    RouteConfirmed {
        request_id: String,
        route_id: String,
    },
}

// =========================================================
// 错误类型
// =========================================================

/// 本地校验错误。这一类永远不会发出网络请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// 有必填字段为空
    EmptyField,
    /// 上车点无法解析为坐标
    InvalidPickup,
    /// 下车点无法解析为坐标
    InvalidDropoff,
    /// 等待时间非数字或超出允许区间
    InvalidWaitTime,
    /// 会话中没有已注册用户
    MissingUser,
}

impl ValidationError {
    /// 表单内联提示文案
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::EmptyField => "All fields are required.",
            ValidationError::InvalidPickup => {
                "Pickup location must be \"latitude, longitude\" coordinates."
            }
            ValidationError::InvalidDropoff => {
                "Dropoff location must be \"latitude, longitude\" coordinates."
            }
            ValidationError::InvalidWaitTime => {
                "Maximum wait time should be between 10 and 120 minutes."
            }
            ValidationError::MissingUser => "No registered user found. Please register first.",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}

/// 表单提交失败的两大类：本地校验失败与 API 调用失败
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitError {
    Validation(ValidationError),
    Api(ApiError),
}

impl SubmitError {
    /// 给用户看的一行描述
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.message().to_string(),
            SubmitError::Api(e) => e.user_message(),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Validation(e) => write!(f, "validation failed: {}", e),
            SubmitError::Api(e) => write!(f, "api call failed: {}", e),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<ValidationError> for SubmitError {
    fn from(e: ValidationError) -> Self {
        SubmitError::Validation(e)
    }
}

impl From<ApiError> for SubmitError {
    fn from(e: ApiError) -> Self {
        SubmitError::Api(e)
    }
}

// =========================================================
// 表单草稿与本地校验
// =========================================================

/// 乘车表单的原始输入（未校验的文本）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideDraft {
    pub pickup: String,
    pub dropoff: String,
    pub max_wait_minutes: String,
    pub payment_method: PaymentMethod,
}

/// 通过本地校验后的表单值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedRide {
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub max_wait_minutes: u32,
    pub payment_method: PaymentMethod,
}

impl RideDraft {
    /// 本地校验：先查空字段，再解析坐标，最后检查等待区间。
    /// 区间两端（10 与 120 分钟）都是合法值。
    pub fn validate(&self) -> Result<ValidatedRide, ValidationError> {
        let pickup_text = self.pickup.trim();
        let dropoff_text = self.dropoff.trim();
        let wait_text = self.max_wait_minutes.trim();

        if pickup_text.is_empty() || dropoff_text.is_empty() || wait_text.is_empty() {
            return Err(ValidationError::EmptyField);
        }

        let pickup = GeoPoint::parse(pickup_text).ok_or(ValidationError::InvalidPickup)?;
        let dropoff = GeoPoint::parse(dropoff_text).ok_or(ValidationError::InvalidDropoff)?;

        let minutes: u32 = wait_text
            .parse()
            .map_err(|_| ValidationError::InvalidWaitTime)?;
        if !(MIN_WAIT_MINUTES..=MAX_WAIT_MINUTES).contains(&minutes) {
            return Err(ValidationError::InvalidWaitTime);
        }

        Ok(ValidatedRide {
            pickup,
            dropoff,
            max_wait_minutes: minutes,
            payment_method: self.payment_method,
        })
    }
}

// =========================================================
// 业务逻辑层 (Flow) - 可测试版本
// =========================================================

/// 乘车生命周期逻辑
/// S: SessionStore
/// C: HttpClient
#[derive(Clone)]
pub struct RideFlow<S, C> {
    session: S,
    api: RideApi<C>,
}

impl<S, C> RideFlow<S, C>
where
    S: SessionStore,
    C: HttpClient,
{
    pub fn new(session: S, api: RideApi<C>) -> Self {
        Self { session, api }
    }

    /// 界面层发起只读查询（路线途经点、ETA、轮询）时使用
    pub fn api(&self) -> &RideApi<C> {
        &self.api
    }

    /// 启动时从会话存储重建阶段
    ///
    /// 幂等，且绝不发起网络请求：已有在途请求时直接回到等待确认
    /// （由轮询器继续跟进），绝不重复提交。损坏的槽位按不存在处理，
    /// 逐级回退到注册页。
    pub fn restore(&self) -> RidePhase {
        if let Some(request) = self.session.load::<RideRequest>(KEY_RIDE_REQUEST) {
            // 已确认的请求连同 route_id 一起保存过，刷新后直达路线页
            if request.status.is_confirmed() {
                if let Some(route_id) = request.route_id {
                    return RidePhase::RouteConfirmed {
                        request_id: request.id,
                        route_id,
                    };
                }
            }
            return RidePhase::AwaitingConfirmation {
                request_id: request.id,
            };
        }
        if self.session.load::<User>(KEY_USER).is_some() {
            return RidePhase::AwaitingRideRequest;
        }
        RidePhase::Unauthenticated
    }

    /// 当前已注册用户（若有）
    pub fn current_user(&self) -> Option<User> {
        self.session.load(KEY_USER)
    }

    /// 在途乘车请求（若有）
    pub fn pending_request(&self) -> Option<RideRequest> {
        self.session.load(KEY_RIDE_REQUEST)
    }

    /// 注册新用户并持久化
    pub async fn register(&self, name: &str, email: &str) -> Result<User, SubmitError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(ValidationError::EmptyField.into());
        }

        let user = self
            .api
            .create_user(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await?;

        tracing::info!(user_id = %user.user_id, "user registered");
        self.session.save(KEY_USER, &user);
        Ok(user)
    }

    /// 提交乘车请求
    ///
    /// 本地校验全部通过才会触网；成功后把后端返回的记录持久化，
    /// 阶段推进到等待确认。
    pub async fn submit_request(&self, draft: &RideDraft) -> Result<RideRequest, SubmitError> {
        let validated = draft.validate()?;
        let user = self
            .current_user()
            .ok_or(ValidationError::MissingUser)?;

        let body = NewRideRequest::with_wait_minutes(
            user.user_id,
            validated.pickup,
            validated.dropoff,
            validated.max_wait_minutes,
            validated.payment_method,
        );
        let request = self.api.create_ride_request(&body).await?;

        tracing::info!(request_id = %request.id, "ride request submitted");
        self.session.save(KEY_RIDE_REQUEST, &request);
        Ok(request)
    }

    /// 轮询确认后调用：带着 route_id 重新持久化，
    /// 这样确认路线页刷新后仍能直接恢复。
    pub fn record_confirmation(&self, route_id: &str) {
        if let Some(mut request) = self.pending_request() {
            request.status = RideStatus::Confirmed;
            request.route_id = Some(route_id.to_string());
            self.session.save(KEY_RIDE_REQUEST, &request);
            tracing::info!(request_id = %request.id, route_id, "ride request confirmed");
        }
    }

    /// 用户主动取消等待：清掉在途请求，回到乘车表单
    pub fn cancel_request(&self) {
        self.session.clear(KEY_RIDE_REQUEST);
        tracing::info!("pending ride request cancelled");
    }

    /// 确认路线页卸载时清理已完成的请求
    pub fn clear_finished_request(&self) {
        self.session.clear(KEY_RIDE_REQUEST);
    }
}

// =========================================================
// 浏览器专用类型别名
// =========================================================

/// 浏览器环境下的 RideFlow
pub type AppFlow = RideFlow<crate::session::BrowserSession, crate::http::FetchClient>;

// =========================================================
// 测试模块
// =========================================================

#[cfg(test)]
mod tests;
