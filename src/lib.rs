pub mod api;
pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod poll;
pub mod report;
pub mod session;
pub mod status;
pub mod store;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
