//! RideWave 前端应用
//!
//! 采用阶段驱动的高内聚低耦合架构：
//! - `lifecycle`: 乘车请求生命周期状态机（领域模型）
//! - `poller`: 匹配阶段的轮询协议
//! - `api` / `http` / `session`: 后端客户端与会话持久化
//! - `components`: UI 组件层
//!
//! 屏幕切换完全由 [`RidePhase`] 驱动，没有 URL 路由：状态机就是路由。

mod api;
mod http;
mod lifecycle;
mod poller;
mod session;

mod components {
    pub mod confirmed_route;
    pub mod layout;
    pub mod matching;
    pub mod registration;
    pub mod ride_form;
}

use crate::api::{ApiConfig, RideApi};
use crate::components::confirmed_route::ConfirmedRouteScreen;
use crate::components::layout::{Footer, Header};
use crate::components::matching::MatchingScreen;
use crate::components::registration::RegistrationScreen;
use crate::components::ride_form::RideFormScreen;
use crate::http::FetchClient;
use crate::lifecycle::{AppFlow, RidePhase};
use crate::session::BrowserSession;

use leptos::prelude::*;

/// 应用级上下文：生命周期逻辑与当前阶段信号
///
/// 在 [`App`] 中构造一次并注入 context，各屏幕通过 [`use_app`] 获取。
#[derive(Clone)]
pub struct AppContext {
    pub flow: AppFlow,
    pub phase: RwSignal<RidePhase>,
}

/// 组件层获取应用上下文的统一入口
pub(crate) fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

/// 屏幕匹配函数
///
/// 根据 RidePhase 枚举返回对应的视图组件。
fn screen_matcher(phase: RidePhase) -> AnyView {
    match phase {
        RidePhase::Unauthenticated => view! { <RegistrationScreen /> }.into_any(),
        RidePhase::AwaitingRideRequest => view! { <RideFormScreen /> }.into_any(),
        RidePhase::AwaitingConfirmation { request_id } => {
            view! { <MatchingScreen request_id=request_id /> }.into_any()
        }
        RidePhase::RouteConfirmed {
            request_id,
            route_id,
        } => view! { <ConfirmedRouteScreen request_id=request_id route_id=route_id /> }.into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 显式构造 API 配置与生命周期逻辑，没有全局单例
    let flow = AppFlow::new(
        BrowserSession,
        RideApi::new(ApiConfig::from_build_env(), FetchClient),
    );

    // 2. 从会话存储重建阶段（幂等，刷新不会重复提交请求）
    let phase = RwSignal::new(flow.restore());

    // 3. 注入应用上下文，供各屏幕使用
    provide_context(AppContext { flow, phase });

    view! {
        <div class="min-h-screen flex flex-col bg-base-200 font-sans">
            <Header />
            <main class="flex-1">
                {move || screen_matcher(phase.get())}
            </main>
            <Footer />
        </div>
    }
}
