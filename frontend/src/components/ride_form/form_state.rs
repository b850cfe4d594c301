//! 表单状态管理模块
//!
//! 将零散的 signal 整合为 `FormState` 结构体，负责：
//! - 数据的持有
//! - 数据的重置
//! - 数据到待校验草稿的转换

use crate::lifecycle::RideDraft;
use leptos::prelude::*;
use ridewave_shared::PaymentMethod;

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，非常适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct FormState {
    /// 上车点文本（"纬度, 经度"）
    pub pickup: RwSignal<String>,
    /// 下车点文本（"纬度, 经度"）
    pub dropoff: RwSignal<String>,
    /// 最长等待时间（分钟，保留原始文本以便报出非数字输入）
    pub max_wait_minutes: RwSignal<String>,
    pub payment_method: RwSignal<PaymentMethod>,
}

impl FormState {
    /// 创建新的表单状态，所有字段使用默认值
    pub fn new() -> Self {
        Self {
            pickup: RwSignal::new(String::new()),
            dropoff: RwSignal::new(String::new()),
            max_wait_minutes: RwSignal::new("30".to_string()),
            payment_method: RwSignal::new(PaymentMethod::default()),
        }
    }

    /// 重置表单到初始状态
    pub fn reset(&self) {
        self.pickup.set(String::new());
        self.dropoff.set(String::new());
        self.max_wait_minutes.set("30".to_string());
        self.payment_method.set(PaymentMethod::default());
    }

    /// 把表单当前值快照为草稿，校验交给生命周期逻辑层
    pub fn to_draft(&self) -> RideDraft {
        RideDraft {
            pickup: self.pickup.get_untracked(),
            dropoff: self.dropoff.get_untracked(),
            max_wait_minutes: self.max_wait_minutes.get_untracked(),
            payment_method: self.payment_method.get_untracked(),
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
