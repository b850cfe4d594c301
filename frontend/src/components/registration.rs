//! 注册屏幕
//!
//! 会话中没有用户记录时的第一屏。注册成功后用户被持久化，
//! 阶段推进到乘车表单；刷新页面不会再回到这里。

use crate::lifecycle::RidePhase;
use crate::use_app;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn RegistrationScreen() -> impl IntoView {
    let ctx = use_app();

    let (name, set_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if name.get().trim().is_empty() || email.get().trim().is_empty() {
            set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let flow = ctx.flow.clone();
        let phase = ctx.phase;
        spawn_local(async move {
            match flow.register(&name.get_untracked(), &email.get_untracked()).await {
                Ok(_) => phase.set(RidePhase::AwaitingRideRequest),
                Err(e) => set_error_msg.set(Some(e.user_message())),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="hero py-12 bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Welcome aboard"</h1>
                    <p class="text-base-content/70">
                        "Create a rider profile to request your first ride"
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
                            <label class="label" for="name">
                                <span class="label-text">"Name"</span>
                            </label>
                            <input
                                id="name"
                                type="text"
                                placeholder="Ann Rider"
                                on:input=move |ev| set_name.set(event_target_value(&ev))
                                prop:value=name
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="ann@example.com"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Registering..." }.into_any()
                                } else {
                                    "Start riding".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
