//! 乘车请求表单
//!
//! 采集上车点、下车点、最长等待时间与支付方式。
//! 本地校验（坐标解析、等待区间 10–120 分钟）全部通过才会触网，
//! 校验失败在表单内联提示，绝不发出请求。

mod form_state;

use crate::lifecycle::RidePhase;
use crate::use_app;
use form_state::FormState;
use leptos::prelude::*;
use leptos::task::spawn_local;
use ridewave_shared::{MAX_WAIT_MINUTES, MIN_WAIT_MINUTES, PaymentMethod};

#[component]
pub fn RideFormScreen() -> impl IntoView {
    let ctx = use_app();
    let state = FormState::new();

    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 能到这个屏幕就说明用户已注册；问候语取一次即可，无需响应式
    let rider_name = ctx.flow.current_user().map(|u| u.name);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        set_error_msg.set(None);

        let flow = ctx.flow.clone();
        let phase = ctx.phase;
        spawn_local(async move {
            match flow.submit_request(&state.to_draft()).await {
                Ok(request) => {
                    state.reset();
                    phase.set(RidePhase::AwaitingConfirmation {
                        request_id: request.id,
                    });
                }
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero py-12 bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">
                        {match rider_name {
                            Some(name) => format!("Where to, {}?", name),
                            None => "Where to?".to_string(),
                        }}
                    </h1>
                    <p class="text-base-content/70">
                        "Tell us where to pick you up and drop you off"
                    </p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="pickup">
                                <span class="label-text">"Pickup location (latitude, longitude)"</span>
                            </label>
                            <input
                                id="pickup"
                                type="text"
                                placeholder="37.7749, -122.4194"
                                on:input=move |ev| state.pickup.set(event_target_value(&ev))
                                prop:value=move || state.pickup.get()
                                class="input input-bordered font-mono"
                                required
                            />
                        </div>

                        <div class="form-control">
                            <label class="label" for="dropoff">
                                <span class="label-text">"Dropoff location (latitude, longitude)"</span>
                            </label>
                            <input
                                id="dropoff"
                                type="text"
                                placeholder="37.8044, -122.2712"
                                on:input=move |ev| state.dropoff.set(event_target_value(&ev))
                                prop:value=move || state.dropoff.get()
                                class="input input-bordered font-mono"
                                required
                            />
                        </div>

                        <div class="form-control">
                            <label class="label" for="max_wait">
                                <span class="label-text">"Maximum wait time (minutes)"</span>
                            </label>
                            <input
                                id="max_wait"
                                type="number"
                                min=MIN_WAIT_MINUTES.to_string()
                                max=MAX_WAIT_MINUTES.to_string()
                                on:input=move |ev| state.max_wait_minutes.set(event_target_value(&ev))
                                prop:value=move || state.max_wait_minutes.get()
                                class="input input-bordered"
                                required
                            />
                            <label class="label">
                                <span class="label-text-alt text-base-content/50">
                                    "Between 10 and 120 minutes"
                                </span>
                            </label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="payment">
                                <span class="label-text">"Payment method"</span>
                            </label>
                            <select
                                id="payment"
                                class="select select-bordered w-full"
                                on:change=move |ev| {
                                    let value = event_target_value(&ev);
                                    if let Some(method) =
                                        PaymentMethod::ALL.into_iter().find(|m| m.as_str() == value)
                                    {
                                        state.payment_method.set(method);
                                    }
                                }
                            >
                                {PaymentMethod::ALL
                                    .into_iter()
                                    .map(|method| {
                                        view! {
                                            <option
                                                value=method.as_str()
                                                selected=move || state.payment_method.get() == method
                                            >
                                                {method.label()}
                                            </option>
                                        }
                                    })
                                    .collect_view()}
                            </select>
                        </div>

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Submitting..." }.into_any()
                                } else {
                                    "Request ride".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
