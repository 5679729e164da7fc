#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> std::io::Result<()> {
    use axum::Router;
    use leptos::logging::log;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use olympiad_web::app::*;
    use olympiad_web::config::ApiConfig;

    let api = ApiConfig::from_env();
    log!("judge API at {}", api.base_url);

    let conf = get_configuration(None).map_err(std::io::Error::other)?;
    let addr = conf.leptos_options.site_addr;
    let leptos_options = conf.leptos_options;
    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(App);

    let leptos_options_clone = leptos_options.clone();
    let app = Router::new()
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            // The shell publishes the API base URL to the browser.
            move || provide_context(api.clone()),
            move || shell(leptos_options_clone.clone()),
        )
        // Use shell for fallback.
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options.clone());

    log!("listening on http://{}", &addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}
