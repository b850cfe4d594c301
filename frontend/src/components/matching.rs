//! 匹配等待屏幕
//!
//! 轮询循环的拥有者：挂载即启动，卸载或取消即置位句柄停掉循环。
//! 后端确认后带着 route_id 记录确认并把阶段推进到路线页；
//! 迟到的轮询结果会在句柄检查处被丢弃，不会逆转已经离开的阶段。

use crate::lifecycle::RidePhase;
use crate::poller::{MatchPoller, PollHandle, run_poll_loop};
use crate::use_app;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn MatchingScreen(request_id: String) -> impl IntoView {
    let ctx = use_app();

    // None 表示第一轮还没回来
    let (riders_waiting, set_riders_waiting) = signal(Option::<usize>::None);

    let handle = PollHandle::new();

    on_cleanup({
        let handle = handle.clone();
        move || handle.cancel()
    });

    {
        let flow = ctx.flow.clone();
        let phase = ctx.phase;
        let handle = handle.clone();
        let request_id = request_id.clone();
        spawn_local(async move {
            let poller = MatchPoller::new(flow.api().clone(), request_id.clone());
            run_poll_loop(
                &poller,
                handle,
                move |count| set_riders_waiting.set(Some(count)),
                move |route_id| {
                    flow.record_confirmation(&route_id);
                    phase.set(RidePhase::RouteConfirmed {
                        request_id,
                        route_id,
                    });
                },
            )
            .await;
        });
    }

    let on_cancel = {
        let flow = ctx.flow.clone();
        let phase = ctx.phase;
        let handle = handle.clone();
        move |_| {
            handle.cancel();
            flow.cancel_request();
            phase.set(RidePhase::AwaitingRideRequest);
        }
    };

    view! {
        <div class="hero py-12 bg-base-200">
            <div class="hero-content flex-col w-full max-w-md text-center">
                <span class="loading loading-ring loading-lg text-primary"></span>
                <h1 class="text-3xl font-bold">"Finding your ride..."</h1>
                <p class="text-base-content/70">
                    "We are matching you with riders headed the same way. "
                    "This can take a few minutes."
                </p>
                <p class="badge badge-ghost">
                    {move || match riders_waiting.get() {
                        Some(1) => "1 rider waiting".to_string(),
                        Some(n) => format!("{} riders waiting", n),
                        None => "Contacting dispatch...".to_string(),
                    }}
                </p>
                <button on:click=on_cancel class="btn btn-outline btn-error mt-6">
                    "Cancel request"
                </button>
            </div>
        </div>
    }
}
