use leptos::ev::SubmitEvent;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::{
    components::A,
    hooks::{use_navigate, use_query_map},
    NavigateOptions,
};

use super::{failure_message, safe_redirect, use_app, AppState, ErrorBanner};
use crate::error::ClientError;
use crate::model::{LoginRequest, RegisterRequest, User};
use crate::store::AuthState;

/// Checks the login form before anything is sent.
pub fn validate_login(username: &str, password: &str) -> Result<(), &'static str> {
    if username.trim().is_empty() {
        return Err("Please input your username!");
    }
    if username.trim().chars().count() < 4 {
        return Err("Username must be at least 4 characters");
    }
    if password.is_empty() {
        return Err("Please input your password!");
    }
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// Checks the registration form before anything is sent.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), &'static str> {
    if username.trim().is_empty() {
        return Err("Please input your username!");
    }
    if username.trim().chars().count() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if email.trim().is_empty() {
        return Err("Please input your email!");
    }
    if !looks_like_email(email.trim()) {
        return Err("Please enter a valid email");
    }
    if password.is_empty() {
        return Err("Please input your password!");
    }
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }
    if confirm.is_empty() {
        return Err("Please confirm your password!");
    }
    if password != confirm {
        return Err("The two passwords that you entered do not match!");
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Exchanges credentials for a token, then fetches the user behind it when the login response
/// didn't include one.
async fn log_in(app: &AppState, request: LoginRequest) -> Result<(), ClientError> {
    let response = app.api.login(&request).await?;
    let user = match response.user_or(None) {
        Some(user) => user,
        None => {
            // The token has to be stored first so `/api/me` is sent with it.
            app.api.session().persist(&response.token, None)?;
            match app.api.me().await {
                Ok(user) => user,
                Err(e) => {
                    app.api.session().clear();
                    return Err(e);
                }
            }
        }
    };
    app.sign_in(response.token, Some(user));
    Ok(())
}

#[component]
pub fn Login() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();
    let query = use_query_map();
    let auth = app.auth;

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let u = username.get_untracked();
        let p = password.get_untracked();
        if let Err(msg) = validate_login(&u, &p) {
            auth.update(|a| a.login_failure(msg));
            return;
        }
        let target = safe_redirect(query.with_untracked(|q| q.get("redirect")));
        auth.update(AuthState::login_start);

        let app = app.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            let request = LoginRequest {
                username: u.trim().to_string(),
                password: p,
            };
            match log_in(&app, request).await {
                Ok(()) => {
                    log!("Logged in, continuing to {}", target);
                    navigate(&target, NavigateOptions::default());
                }
                Err(e) => {
                    let msg = e.to_string();
                    app.auth.update(|a| a.login_failure(msg));
                }
            }
        });
    };

    view! {
        <div class="auth-card">
            <h1>"Login"</h1>
            <ErrorBanner message=Signal::derive(move || auth.with(|a| a.error.clone())) />
            <form on:submit=submit>
                <label>
                    "Username: "
                    <input
                        type="text"
                        autocomplete="username"
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Password: "
                    <input
                        type="password"
                        autocomplete="current-password"
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>
                <button type="submit" disabled=move || auth.with(|a| a.loading)>
                    {move || if auth.with(|a| a.loading) { "Logging in..." } else { "Login" }}
                </button>
            </form>
            <p>"Don't have an account? " <A href="/register">"Register"</A></p>
        </div>
    }
}

#[component]
pub fn Register() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let loading = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let request = RegisterRequest {
            username: username.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        if let Err(msg) = validate_registration(
            &request.username,
            &request.email,
            &request.password,
            &confirm.get_untracked(),
        ) {
            error.set(Some(msg.to_string()));
            return;
        }
        loading.set(true);
        error.set(None);

        let app = app.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match app.api.register(&request).await {
                Ok(response) => {
                    let user = response.user_or(Some(request.email.clone()));
                    app.sign_in(response.token, user);
                    navigate("/", NavigateOptions::default());
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            loading.set(false);
        });
    };

    view! {
        <div class="auth-card">
            <h1>"Register"</h1>
            <ErrorBanner message=error />
            <form on:submit=submit>
                <label>
                    "Username: "
                    <input type="text" on:input=move |ev| username.set(event_target_value(&ev)) />
                </label>
                <label>
                    "Email: "
                    <input type="email" on:input=move |ev| email.set(event_target_value(&ev)) />
                </label>
                <label>
                    "Password: "
                    <input
                        type="password"
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Confirm password: "
                    <input
                        type="password"
                        on:input=move |ev| confirm.set(event_target_value(&ev))
                    />
                </label>
                <button type="submit" disabled=move || loading.get()>
                    {move || if loading.get() { "Registering..." } else { "Register" }}
                </button>
            </form>
            <p>"Already have an account? " <A href="/login">"Login"</A></p>
        </div>
    }
}

/// The signed-in user's profile. Visitors without a session are sent to the login page.
#[component]
pub fn Profile() -> impl IntoView {
    let app = use_app();
    let navigate = use_navigate();

    let user = RwSignal::new(None::<User>);
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);

    Effect::new({
        let app = app.clone();
        let navigate = navigate.clone();
        move || {
            if app.api.session().token().is_none() {
                navigate("/login?redirect=/profile", NavigateOptions::default());
                return;
            }
            let app = app.clone();
            let navigate = navigate.clone();
            spawn_local(async move {
                match app.api.me().await {
                    Ok(me) => {
                        if let Some(token) = app.api.session().token() {
                            app.sign_in(token, Some(me.clone()));
                        }
                        user.set(Some(me));
                    }
                    Err(e) => {
                        let msg = failure_message(&app, &e, &navigate, Some("/profile"));
                        error.set(Some(msg));
                    }
                }
                loading.set(false);
            });
        }
    });

    let logout = move |_| {
        app.sign_out();
        navigate("/login", NavigateOptions::default());
    };

    view! {
        <div class="profile">
            <ErrorBanner message=error />
            <Show when=move || !loading.get() fallback=|| view! { <p>"Loading..."</p> }>
                {move || {
                    user.get()
                        .map(|u| {
                            let joined = u
                                .created_at
                                .map(|t| t.format("%B %-d, %Y").to_string())
                                .unwrap_or_else(|| "Unknown".to_string());
                            view! {
                                <h1>{u.username.clone()}</h1>
                                <p class="role">{u.role.clone()}</p>
                                <dl>
                                    <dt>"Email"</dt>
                                    <dd>{u.email.clone().unwrap_or_else(|| "Not provided".to_string())}</dd>
                                    <dt>"Member since"</dt>
                                    <dd>{joined}</dd>
                                    <dt>"Problems solved"</dt>
                                    <dd>{u.solved_problems_count.unwrap_or(0)}</dd>
                                    <dt>"Total points"</dt>
                                    <dd>{u.total_points.unwrap_or(0.0)}</dd>
                                </dl>
                            }
                        })
                }}
            </Show>
            <button on:click=logout>"Logout"</button>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_login() {
        assert_eq!(validate_login("", "secret1"), Err("Please input your username!"));
        assert_eq!(
            validate_login("abc", "secret1"),
            Err("Username must be at least 4 characters")
        );
        assert_eq!(
            validate_login("alice", "12345"),
            Err("Password must be at least 6 characters")
        );
        assert_eq!(validate_login("alice", "123456"), Ok(()));
    }

    #[test]
    fn test_validate_registration() {
        assert_eq!(
            validate_registration("al", "a@b.co", "secret1", "secret1"),
            Err("Username must be at least 3 characters")
        );
        assert_eq!(
            validate_registration("ali", "not-an-email", "secret1", "secret1"),
            Err("Please enter a valid email")
        );
        assert_eq!(
            validate_registration("ali", "ali@example.com", "secret1", "secret2"),
            Err("The two passwords that you entered do not match!")
        );
        assert_eq!(
            validate_registration("ali", "ali@example.com", "secret1", "secret1"),
            Ok(())
        );
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada @example.com"));
        assert!(!looks_like_email("ada@.com"));
    }
}
