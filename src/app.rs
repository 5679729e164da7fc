use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::{
    components::{Route, Router, Routes, A},
    hooks::use_navigate,
    path, NavigateOptions,
};

use crate::api::ApiClient;
use crate::config::{ApiConfig, API_URL_META};
use crate::error::ClientError;
use crate::model::User;
use crate::session::Session;
use crate::store::{AuthState, ProblemsState};

mod auth;
mod olympiads;
mod problems;

use auth::{Login, Profile, Register};
use olympiads::{OlympiadDetail, OlympiadList, OlympiadProblems, OlympiadRegistration};
use problems::{ProblemDetail, ProblemList};

/// Everything the views share: the API client (which owns the session) and the client-side
/// state it mirrors.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub auth: RwSignal<AuthState>,
    pub problems: RwSignal<ProblemsState>,
}

impl AppState {
    pub fn new(api: ApiClient) -> Self {
        AppState {
            api,
            auth: RwSignal::new(AuthState::default()),
            problems: RwSignal::new(ProblemsState::default()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.with_untracked(AuthState::is_authenticated)
    }

    /// Records a newly issued token both in storage and in the auth state.
    pub fn sign_in(&self, token: String, user: Option<User>) {
        if let Err(e) = self.api.session().persist(&token, user.as_ref()) {
            warn!("Could not persist session: {}", e);
        }
        self.auth.update(|a| a.login_success(user, token));
    }

    pub fn sign_out(&self) {
        self.api.session().clear();
        self.auth.update(AuthState::logout);
    }

    /// Loads the session saved by an earlier visit and confirms it with the server.
    fn restore(&self) {
        let saved = self.api.session().load();
        let token = saved.token.clone();
        self.auth.set(saved);
        let Some(token) = token else {
            return;
        };

        self.auth.update(AuthState::login_start);
        let app = self.clone();
        spawn_local(async move {
            match app.api.me().await {
                Ok(user) => app.sign_in(token, Some(user)),
                Err(e) if e.requires_login() => {
                    warn!("Saved session rejected: {}", e);
                    app.sign_out();
                }
                Err(e) => {
                    warn!("Could not confirm saved session: {}", e);
                    app.auth.update(|a| a.loading = false);
                }
            }
        });
    }
}

pub fn use_app() -> AppState {
    expect_context::<AppState>()
}

/// Path of the login page, optionally asking it to come back to `return_to` afterwards.
pub fn login_path(return_to: Option<&str>) -> String {
    match return_to {
        Some(path) if is_local_path(path) => format!("/login?redirect={}", path),
        _ => "/login".to_string(),
    }
}

/// Where to go after logging in. Anything but a plain local path falls back to the home page.
pub fn safe_redirect(target: Option<String>) -> String {
    target
        .filter(|t| is_local_path(t))
        .unwrap_or_else(|| "/".to_string())
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_'))
}

/// Turns a failed call into the message to show. Authentication failures also end the session and
/// send the user to the login page.
pub fn failure_message<N>(
    app: &AppState,
    err: &ClientError,
    navigate: &N,
    return_to: Option<&str>,
) -> String
where
    N: Fn(&str, NavigateOptions),
{
    if err.requires_login() {
        app.sign_out();
        navigate(&login_path(return_to), NavigateOptions::default());
    }
    err.to_string()
}

pub fn shell(options: LeptosOptions) -> impl IntoView {
    let api = use_context::<ApiConfig>().unwrap_or_else(ApiConfig::discover);
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <meta name=API_URL_META content=api.base_url />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    let config = use_context::<ApiConfig>().unwrap_or_else(ApiConfig::discover);
    let session = if cfg!(feature = "hydrate") {
        Session::browser()
    } else {
        Session::in_memory()
    };
    let app = AppState::new(ApiClient::new(config, session));
    provide_context(app.clone());

    // Runs once in the browser after hydration, so the server and client render the same
    // logged-out markup first.
    Effect::new(move || app.restore());

    view! {
        <Stylesheet id="leptos" href="/pkg/olympiad-web.css" />
        <Title text="CodeAcademy" />

        <Router>
            <Nav />
            <main>
                <Routes fallback=|| view! { <NotFound /> }>
                    <Route path=path!("/") view=Home />
                    <Route path=path!("/register") view=Register />
                    <Route path=path!("/login") view=Login />
                    <Route path=path!("/profile") view=Profile />
                    <Route path=path!("/problems") view=ProblemList />
                    <Route path=path!("/problems/:id") view=ProblemDetail />
                    <Route path=path!("/olympiads") view=OlympiadList />
                    <Route path=path!("/olympiads/:olympiad_id") view=OlympiadDetail />
                    <Route
                        path=path!("/olympiads/:olympiad_id/problems")
                        view=OlympiadProblems
                    />
                    <Route
                        path=path!("/olympiads-register/:olympiad_id")
                        view=OlympiadRegistration
                    />
                    <Route path=path!("/about") view=About />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn Nav() -> impl IntoView {
    let app = use_app();
    let auth = app.auth;

    let logout = move |_| {
        app.sign_out();
        let navigate = use_navigate();
        navigate("/login", NavigateOptions::default());
    };

    view! {
        <nav class="top-nav">
            <A href="/">"CodeAcademy"</A>
            <A href="/problems">"Problems"</A>
            <A href="/olympiads">"Olympiads"</A>
            <A href="/about">"About"</A>
            <span class="spacer"></span>
            <Show
                when=move || auth.with(AuthState::is_authenticated)
                fallback=|| {
                    view! {
                        <A href="/login">"Login"</A>
                        <A href="/register">"Register"</A>
                    }
                }
            >
                <A href="/profile">
                    {move || auth.with(|a| a.username().unwrap_or("Profile").to_string())}
                </A>
                <button class="link" on:click=logout.clone()>
                    "Logout"
                </button>
            </Show>
        </nav>
    }
}

#[component]
fn Home() -> impl IntoView {
    view! {
        <div class="home">
            <h1>"CodeAcademy"</h1>
            <p>
                "An online platform for sharpening programming and algorithm skills and preparing for technical interviews."
            </p>
            <h2>"What you can do"</h2>
            <ul>
                <li>
                    <A href="/problems">"Solve programming problems"</A>
                    " with solutions checked in real time"
                </li>
                <li>
                    <A href="/olympiads">"Take part in olympiads"</A>
                    " and climb the leaderboard"
                </li>
            </ul>
        </div>
    }
}

#[component]
fn About() -> impl IntoView {
    view! {
        <div class="about">
            <h1>"About"</h1>
            <p>
                "Problems are judged on the server as soon as they are submitted. Olympiads open and close at fixed times; submissions are only accepted while an olympiad is running."
            </p>
        </div>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="not-found">
            <h2>"404 - Page Not Found"</h2>
            <p>"Sorry, this page does not exist."</p>
            <A href="/">"Back to home"</A>
        </div>
    }
}

/// Renders `message` as an error banner when it is set.
#[component]
fn ErrorBanner(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    move || {
        message
            .get()
            .map(|m| view! { <p class="error">{m}</p> })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_path() {
        assert_eq!(login_path(None), "/login");
        assert_eq!(
            login_path(Some("/olympiads/abc123")),
            "/login?redirect=/olympiads/abc123"
        );
        assert_eq!(login_path(Some("https://evil.example")), "/login");
    }

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(None), "/");
        assert_eq!(
            safe_redirect(Some("/olympiads/7/problems".to_string())),
            "/olympiads/7/problems"
        );
        assert_eq!(safe_redirect(Some("//evil.example".to_string())), "/");
        assert_eq!(safe_redirect(Some("javascript:alert(1)".to_string())), "/");
        assert_eq!(safe_redirect(Some("/a?b=c".to_string())), "/");
    }
}
