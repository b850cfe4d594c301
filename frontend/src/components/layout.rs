//! 页面框架
//!
//! 所有屏幕共用的顶部导航与页脚。

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <div class="navbar bg-base-100 shadow-md">
            <div class="flex-1 gap-2">
                <a class="btn btn-ghost text-xl text-primary">"RideWave"</a>
                <span class="badge badge-neutral hidden md:inline-flex">
                    "Shared rides, on demand"
                </span>
            </div>
        </div>
    }
}

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer class="footer footer-center p-4 text-base-content/50 text-sm">
            <p>"RideWave, pooled rides around the bay"</p>
        </footer>
    }
}
