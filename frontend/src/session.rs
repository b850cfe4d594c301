//! 会话存储
//!
//! 两个固定槽位（当前用户 / 在途乘车请求），以 JSON 存放在
//! 浏览器 sessionStorage 中，随标签页存活，无过期、无版本迁移。
//! 损坏的值一律按"不存在"处理（fail open），绝不让启动恢复流程崩溃。

use gloo_storage::errors::StorageError;
use gloo_storage::{SessionStorage, Storage};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 当前用户槽位
pub const KEY_USER: &str = "user";
/// 在途乘车请求槽位
pub const KEY_RIDE_REQUEST: &str = "rideRequest";

// =========================================================
// 抽象存储接口
// =========================================================

/// 同步键值槽位。实现必须满足 fail-open 语义：
/// 任何读取异常都表现为 `None`，而不是错误或 panic。
pub trait SessionStore {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T>;
    fn save<T: Serialize>(&self, key: &str, value: &T);
    fn clear(&self, key: &str);
}

// =========================================================
// 实现层: 浏览器 sessionStorage
// =========================================================

#[derive(Clone, Copy, Default)]
pub struct BrowserSession;

impl SessionStore for BrowserSession {
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match SessionStorage::get::<T>(key) {
            Ok(value) => Some(value),
            // 键不存在是正常情况（首次访问）
            Err(StorageError::KeyNotFound(_)) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unreadable session value");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) {
        // 存储只是断线续传的优化，写失败不影响当前会话
        if let Err(e) = SessionStorage::set(key, value) {
            tracing::warn!(key, error = %e, "failed to persist session value");
        }
    }

    fn clear(&self, key: &str) {
        SessionStorage::delete(key);
    }
}

// =========================================================
// 测试环境实现 (Mock)
// =========================================================
