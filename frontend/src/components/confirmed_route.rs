//! 确认路线屏幕
//!
//! 会话的终点：挂载时把路线途经点与 ETA 各读取一次，
//! 屏幕存续期内不缓存、不刷新。卸载时清掉已完成请求的持久化记录。

use crate::use_app;
use chrono::{DateTime, Utc};
use leptos::prelude::*;
use leptos::task::spawn_local;
use ridewave_shared::{BusRoute, EtaInfo};

/// ETA 的展示格式（后端时间戳为 UTC）
fn format_eta(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

#[component]
pub fn ConfirmedRouteScreen(request_id: String, route_id: String) -> impl IntoView {
    let ctx = use_app();

    let (route, set_route) = signal(Option::<BusRoute>::None);
    let (eta, set_eta) = signal(Option::<EtaInfo>::None);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let route_label = route_id.clone();

    {
        let api = ctx.flow.api().clone();
        let route_id = route_id.clone();
        spawn_local(async move {
            match api.get_bus_route(&route_id).await {
                Ok(fetched) => set_route.set(Some(fetched)),
                Err(e) => {
                    tracing::error!(route_id = %route_id, error = %e, "failed to fetch confirmed route");
                    set_error_msg.set(Some(e.user_message()));
                }
            }
            match api.get_eta(&route_id, &request_id).await {
                Ok(info) => set_eta.set(Some(info)),
                Err(e) => {
                    tracing::error!(route_id = %route_id, request_id = %request_id, error = %e, "failed to fetch eta");
                    set_error_msg.set(Some(e.user_message()));
                }
            }
        });
    }

    on_cleanup({
        let flow = ctx.flow.clone();
        move || flow.clear_finished_request()
    });

    view! {
        <div class="hero py-12 bg-base-200">
            <div class="hero-content flex-col w-full max-w-lg">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold text-success">"Your ride is confirmed!"</h1>
                    <p class="text-base-content/70">
                        "Route " <span class="font-mono">{route_label}</span>
                        " is on its way. Be at your pickup point on time."
                    </p>
                </div>

                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error text-sm py-2 w-full">
                        <span>{move || error_msg.get().unwrap()}</span>
                    </div>
                </Show>

                {move || eta.get().map(|info| view! {
                    <div class="stats shadow w-full bg-base-100">
                        <div class="stat">
                            <div class="stat-title">"Pickup ETA"</div>
                            <div class="stat-value text-primary">{format_eta(info.pickup_eta)}</div>
                        </div>
                        <div class="stat">
                            <div class="stat-title">"Dropoff ETA"</div>
                            <div class="stat-value text-secondary">{format_eta(info.dropoff_eta)}</div>
                        </div>
                    </div>
                })}

                {move || match route.get() {
                    Some(fetched) => view! { <RouteStops route=fetched /> }.into_any(),
                    None => view! {
                        <div class="text-center py-8 text-base-content/50">
                            <span class="loading loading-spinner loading-md"></span>
                            " Loading route..."
                        </div>
                    }
                    .into_any(),
                }}
            </div>
        </div>
    }
}

/// 有序的上/下车途经点列表
#[component]
fn RouteStops(route: BusRoute) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl w-full">
            <div class="card-body">
                <h3 class="card-title text-base">"Pickup stops"</h3>
                <ol class="list-decimal list-inside">
                    {route
                        .pickup_points
                        .iter()
                        .map(|point| view! { <li class="font-mono text-sm">{point.to_string()}</li> })
                        .collect_view()}
                </ol>
                <h3 class="card-title text-base mt-4">"Dropoff stops"</h3>
                <ol class="list-decimal list-inside">
                    {route
                        .dropoff_points
                        .iter()
                        .map(|point| view! { <li class="font-mono text-sm">{point.to_string()}</li> })
                        .collect_view()}
                </ol>
            </div>
        </div>
    }
}
