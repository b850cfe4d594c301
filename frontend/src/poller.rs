//! 匹配轮询器
//!
//! 等待确认阶段的后台循环。每个周期按固定顺序做三次读取：
//! (a) 在等请求总数，供 "N riders waiting" 展示；
//! (b) 全局发车信号；
//! (c) 仅当信号点名本请求时，查询自身状态——只有 `CONFIRMED` 才结束等待。
//!
//! 单轮失败记日志后照常进入下一轮：固定 3 秒间隔，不退避、不设上限。
//! 取消通过显式句柄完成，结果落地前都要过句柄检查，迟到的响应一律丢弃。

use crate::api::{ApiError, ApiResult, RideApi};
use crate::http::HttpClient;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 轮询周期
pub const POLL_INTERVAL_MILLIS: u32 = 3_000;

// =========================================================
// 取消句柄
// =========================================================

/// 轮询取消句柄
///
/// 启动循环时交给拥有它的屏幕；置位后循环在应用任何结果之前退出。
/// `Send + Sync`，可以直接放进 `on_cleanup`。
#[derive(Clone, Debug, Default)]
pub struct PollHandle(Arc<AtomicBool>);

impl PollHandle {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// =========================================================
// 单轮结论
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// 继续等待；附带当前在等请求数
    Waiting { riders_waiting: usize },
    /// 后端已确认本请求，带回路线 id
    Confirmed { route_id: String },
}

// =========================================================
// 轮询逻辑 - 可测试版本
// =========================================================

/// 匹配轮询逻辑
/// C: HttpClient
pub struct MatchPoller<C> {
    api: RideApi<C>,
    request_id: String,
}

impl<C: HttpClient> MatchPoller<C> {
    pub fn new(api: RideApi<C>, request_id: impl Into<String>) -> Self {
        Self {
            api,
            request_id: request_id.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// 执行一轮三步读取
    ///
    /// 任何一步失败立即以错误结束本轮，由调用方记日志并等待下一轮。
    pub async fn poll_once(&self) -> ApiResult<PollOutcome> {
        // (a) 在等请求总数
        let active = self.api.list_ride_requests().await?;

        // (b) 全局发车信号
        let signal = self.api.get_departure_signal().await?;
        if !signal.confirms(&self.request_id) {
            return Ok(PollOutcome::Waiting {
                riders_waiting: active.len(),
            });
        }

        // (c) 被点名后仍以自身状态为准
        let request = self.api.get_ride_request(&self.request_id).await?;
        if !request.status.is_confirmed() {
            tracing::debug!(
                request_id = %self.request_id,
                status = ?request.status,
                "named in departure signal but status not confirmed yet"
            );
            return Ok(PollOutcome::Waiting {
                riders_waiting: active.len(),
            });
        }

        match request.route_id {
            Some(route_id) => Ok(PollOutcome::Confirmed { route_id }),
            // 已确认却没有路线 id：形状不符合约定，按解码错误进入下一轮
            None => Err(ApiError::Decode(
                "confirmed ride request is missing route_id".to_string(),
            )),
        }
    }
}

// =========================================================
// 驱动循环
// =========================================================

/// 驱动轮询直到确认或取消
///
/// 每轮开始前与结果落地前各检查一次句柄，保证已离开等待阶段的
/// 屏幕收不到任何迟到结果。`on_waiting` 在每个继续等待的轮次后
/// 调用，`on_confirmed` 至多调用一次，随后循环退出。
pub async fn run_poll_loop<C, W, F>(
    poller: &MatchPoller<C>,
    handle: PollHandle,
    mut on_waiting: W,
    on_confirmed: F,
) where
    C: HttpClient,
    W: FnMut(usize),
    F: FnOnce(String),
{
    let mut cycle: u64 = 0;
    loop {
        if handle.is_cancelled() {
            return;
        }
        cycle += 1;

        let outcome = poller.poll_once().await;

        // 本轮在途期间阶段可能已经切换，丢弃迟到结果
        if handle.is_cancelled() {
            return;
        }

        match outcome {
            Ok(PollOutcome::Waiting { riders_waiting }) => on_waiting(riders_waiting),
            Ok(PollOutcome::Confirmed { route_id }) => {
                on_confirmed(route_id);
                return;
            }
            Err(e) => {
                tracing::warn!(cycle, error = %e, "poll cycle failed; retrying at next interval")
            }
        }

        gloo_timers::future::TimeoutFuture::new(POLL_INTERVAL_MILLIS).await;
    }
}

// =========================================================
// 测试模块
// =========================================================
