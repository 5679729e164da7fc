use chrono::{DateTime, Utc};
use leptos::ev::MouseEvent;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::{
    components::A,
    hooks::{use_navigate, use_params_map},
    NavigateOptions,
};
use std::collections::HashMap;

use super::problems::{DifficultyTag, Examples, LanguageSelect, SubmissionReport};
use super::{failure_message, login_path, use_app, ErrorBanner};
use crate::api::describe_submission;
use crate::editor::CodeBuffers;
use crate::error::ClientError;
use crate::model::{
    LeaderboardEntry, Olympiad, Problem, SubmissionRequest, SubmissionResult, OLYMPIAD_LANGUAGES,
};
use crate::poll::use_contest_status;
use crate::status::{
    accepts_registration, accepts_submissions, ContestStatus, StatusInfo, SystemClock,
};

/// Rows per leaderboard page.
pub const LEADERBOARD_PAGE_SIZE: usize = 10;

/// Number of pages needed for `total` rows. An empty board still has one page.
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1)).max(1)
}

/// The rows on zero-based page `page`. Pages past the end are empty.
pub fn page<T>(rows: &[T], page: usize, per_page: usize) -> &[T] {
    let start = page.saturating_mul(per_page).min(rows.len());
    let end = start.saturating_add(per_page).min(rows.len());
    &rows[start..end]
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%B %-d, %Y %H:%M UTC").to_string()
}

/// What to show when an olympiad could not be loaded. Only a 404 means it does not exist.
fn load_failure_message(err: Option<&ClientError>) -> String {
    match err {
        Some(e) if !e.is_not_found() => e.to_string(),
        _ => "Olympiad not found".to_string(),
    }
}

fn olympiad_id_param() -> impl Fn() -> String + Copy + Send + Sync + 'static {
    let params = use_params_map();
    move || params.with(|p| p.get("olympiad_id").unwrap_or_default())
}

#[component]
fn StatusBadge(status: ContestStatus) -> impl IntoView {
    view! { <span class=format!("tag tag-{}", status.color())>{status.label()}</span> }
}

#[component]
pub fn OlympiadList() -> impl IntoView {
    let app = use_app();
    let olympiads = LocalResource::new(move || {
        let api = app.api.clone();
        async move { api.olympiads().await }
    });

    view! {
        <div class="olympiads">
            <h1>"Olympiads"</h1>
            {move || match olympiads.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(e)) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                Some(Ok(list)) if list.is_empty() => {
                    view! { <p>"No olympiads have been announced yet."</p> }.into_any()
                }
                Some(Ok(list)) => {
                    view! {
                        <div class="cards">
                            {list
                                .into_iter()
                                .map(|olympiad| view! { <OlympiadCard olympiad=olympiad /> })
                                .collect_view()}
                        </div>
                    }
                        .into_any()
                }
            }}
        </div>
    }
}

#[component]
fn OlympiadCard(olympiad: Olympiad) -> impl IntoView {
    let window = olympiad.window();
    let StatusInfo { status, .. } = window.evaluate_with(&SystemClock);
    let id = olympiad.id.clone();

    view! {
        <div class="card">
            <h3>{olympiad.name.clone()}</h3>
            <StatusBadge status=status />
            <p>
                <strong>"Start: "</strong>
                {format_time(window.start)}
            </p>
            <p>
                <strong>"End: "</strong>
                {format_time(window.end)}
            </p>
            <p>
                <strong>"Duration: "</strong>
                {window.duration_minutes()}
                " minutes"
            </p>
            <div class="actions">
                <A href=format!("/olympiads/{}", id)>"Details"</A>
                {match status {
                    ContestStatus::Upcoming => {
                        view! { <A href=format!("/olympiads-register/{}", id)>"Register"</A> }
                            .into_any()
                    }
                    ContestStatus::Ongoing => {
                        view! { <A href=format!("/olympiads/{}/problems", id)>"Participate"</A> }
                            .into_any()
                    }
                    ContestStatus::Completed => ().into_any(),
                }}
            </div>
        </div>
    }
}

#[component]
pub fn OlympiadDetail() -> impl IntoView {
    let app = use_app();
    let olympiad_id = olympiad_id_param();

    let olympiad = RwSignal::new(None::<Olympiad>);
    let loading = RwSignal::new(true);
    let checking = RwSignal::new(true);
    let registered = RwSignal::new(false);
    let load_error = RwSignal::new(None::<ClientError>);
    let error = RwSignal::new(None::<String>);

    let window = Signal::derive(move || olympiad.with(|o| o.as_ref().map(Olympiad::window)));
    let status = use_contest_status(window);

    Effect::new({
        let app = app.clone();
        move || {
            let id = olympiad_id();
            let app = app.clone();
            loading.set(true);
            checking.set(true);
            load_error.set(None);
            spawn_local(async move {
                match app.api.olympiad(&id).await {
                    Ok(o) => olympiad.set(Some(o)),
                    Err(e) => {
                        warn!("Could not load olympiad {}: {}", id, e);
                        load_error.set(Some(e));
                    }
                }
                loading.set(false);

                if app.api.session().token().is_some() {
                    match app.api.check_registration(&id).await {
                        Ok(r) => registered.set(r.is_registered),
                        Err(e) => {
                            warn!("Could not check registration for {}: {}", id, e);
                            if e.requires_login() {
                                app.sign_out();
                            }
                        }
                    }
                }
                checking.set(false);
            });
        }
    });

    let enter = move |_: MouseEvent| {
        let navigate = use_navigate();
        navigate(
            &format!("/olympiads/{}/problems", olympiad_id()),
            NavigateOptions::default(),
        );
    };

    let register = move |_: MouseEvent| {
        let id = olympiad_id();
        let app = app.clone();
        error.set(None);
        spawn_local(async move {
            match app.api.register_for_olympiad(&id).await {
                Ok(()) => {
                    log!("Registered for olympiad {}", id);
                    registered.set(true);
                }
                Err(e) => {
                    let navigate = use_navigate();
                    let return_to = format!("/olympiads/{}", id);
                    error.set(Some(failure_message(&app, &e, &navigate, Some(&return_to))));
                }
            }
        });
    };

    let can_enter = move || accepts_submissions(status.get());
    let can_register = move || accepts_registration(status.get());

    view! {
        <div class="olympiad-detail">
            {move || {
                if loading.get() && olympiad.with(Option::is_none) {
                    return view! { <p>"Loading olympiad details..."</p> }.into_any();
                }
                let Some(o) = olympiad.get() else {
                    let message = load_failure_message(load_error.get().as_ref());
                    return view! { <p class="error">{message}</p> }.into_any();
                };
                let window = o.window();
                view! {
                    <h1>{o.name.clone()}</h1>
                    {move || status.get().map(|s| view! { <StatusBadge status=s.status /> })}
                    <h3>"Description"</h3>
                    <p>{o.description.clone()}</p>
                    <h3>"Schedule"</h3>
                    <p>
                        <strong>"Start: "</strong>
                        {format_time(window.start)}
                    </p>
                    <p>
                        <strong>"End: "</strong>
                        {format_time(window.end)}
                    </p>
                    <p>
                        <strong>"Duration: "</strong>
                        {window.duration_minutes()}
                        " minutes"
                    </p>
                    {(!o.rules.is_empty())
                        .then(|| {
                            view! {
                                <h3>"Rules"</h3>
                                <ol>
                                    {o
                                        .rules
                                        .iter()
                                        .map(|rule| view! { <li>{rule.clone()}</li> })
                                        .collect_view()}
                                </ol>
                            }
                        })}
                }
                    .into_any()
            }}
            <ErrorBanner message=error />
            <div class="actions">
                <Show when=move || !checking.get() && olympiad.with(Option::is_some)>
                    <Show
                        when=move || registered.get()
                        fallback={
                            let register = register.clone();
                            move || {
                                view! {
                                    <button on:click=register.clone() disabled=move || !can_register()>
                                        "Register"
                                    </button>
                                }
                            }
                        }
                    >
                        <button on:click=enter disabled=move || !can_enter()>
                            {move || {
                                status
                                    .get()
                                    .map(|s| s.status.entry_caption())
                                    .unwrap_or("Enter Olympiad")
                            }}
                        </button>
                    </Show>
                </Show>
            </div>
            <Leaderboard olympiad_id=Signal::derive(olympiad_id) />
        </div>
    }
}

#[component]
pub fn Leaderboard(#[prop(into)] olympiad_id: Signal<String>) -> impl IntoView {
    let app = use_app();
    let current = RwSignal::new(0usize);
    let board = LocalResource::new(move || {
        let id = olympiad_id.get();
        let api = app.api.clone();
        async move { api.leaderboard(&id).await }
    });

    view! {
        <div class="leaderboard">
            <h2>"Leaderboard"</h2>
            {move || match board.get() {
                None => view! { <p>"Loading..."</p> }.into_any(),
                Some(Err(e)) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                Some(Ok(entries)) if entries.is_empty() => {
                    view! {
                        <p class="info">
                            "No participants yet. No one has taken part in this olympiad."
                        </p>
                    }
                        .into_any()
                }
                Some(Ok(entries)) => {
                    view! { <LeaderboardTable entries=entries current=current /> }.into_any()
                }
            }}
        </div>
    }
}

#[component]
fn LeaderboardTable(entries: Vec<LeaderboardEntry>, current: RwSignal<usize>) -> impl IntoView {
    let pages = page_count(entries.len(), LEADERBOARD_PAGE_SIZE);
    let entries = StoredValue::new(entries);

    let rows = move || {
        let p = current.get().min(pages - 1);
        entries.with_value(|all| {
            page(all, p, LEADERBOARD_PAGE_SIZE)
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let rank = p * LEADERBOARD_PAGE_SIZE + i + 1;
                    view! { <LeaderboardRow rank=rank entry=entry.clone() /> }
                })
                .collect_view()
        })
    };

    view! {
        <table>
            <thead>
                <tr>
                    <th>"Rank"</th>
                    <th>"Username"</th>
                    <th>"Total Points"</th>
                    <th>"Problems Solved"</th>
                    <th>"Solved Problems"</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>
        <Show when=move || { pages > 1 }>
            <div class="pager">
                <button
                    disabled=move || current.get() == 0
                    on:click=move |_| current.update(|p| *p = p.saturating_sub(1))
                >
                    "Previous"
                </button>
                <span>{move || format!("Page {} of {}", current.get() + 1, pages)}</span>
                <button
                    disabled=move || current.get() + 1 >= pages
                    on:click=move |_| current.update(|p| *p = (*p + 1).min(pages - 1))
                >
                    "Next"
                </button>
            </div>
        </Show>
    }
}

#[component]
fn LeaderboardRow(rank: usize, entry: LeaderboardEntry) -> impl IntoView {
    let solved = if entry.problems_solved.is_empty() {
        view! { <span class="tag tag-gray">"No problems solved"</span> }.into_any()
    } else {
        entry
            .problems_solved
            .iter()
            .map(|p| {
                let when = p
                    .solved_at
                    .map(format_time)
                    .unwrap_or_else(|| "Unknown Time".to_string());
                view! {
                    <span class="tag tag-green">
                        {format!("{} ({} pts, {})", p.problem_id, p.points_earned, when)}
                    </span>
                }
            })
            .collect_view()
            .into_any()
    };

    view! {
        <tr>
            <td>{rank}</td>
            <td>{entry.username.clone()}</td>
            <td>{entry.total_points}</td>
            <td>{entry.problems_solved.len()}</td>
            <td>{solved}</td>
        </tr>
    }
}

/// The problem set of a running olympiad. Submissions are only accepted while the contest is
/// active; the status is re-checked on every tick and again right before sending.
#[component]
pub fn OlympiadProblems() -> impl IntoView {
    let app = use_app();
    let olympiad_id = olympiad_id_param();

    let olympiad = RwSignal::new(None::<Olympiad>);
    let problems = RwSignal::new(Vec::<Problem>::new());
    let loading = RwSignal::new(true);
    let submitting = RwSignal::new(false);
    let error = RwSignal::new(None::<ClientError>);
    let selected = RwSignal::new(0usize);
    let language = RwSignal::new("python".to_string());
    let buffers = RwSignal::new(CodeBuffers::default());
    let results = RwSignal::new(HashMap::<usize, SubmissionResult>::new());

    let window = Signal::derive(move || olympiad.with(|o| o.as_ref().map(Olympiad::window)));
    let status = use_contest_status(window);
    let is_active = move || accepts_submissions(status.get());

    Effect::new({
        let app = app.clone();
        move || {
            let id = olympiad_id();
            let app = app.clone();
            loading.set(true);
            error.set(None);
            spawn_local(async move {
                let loaded = async {
                    let o = app.api.olympiad(&id).await?;
                    let list = app.api.olympiad_problems(&id).await?;
                    Ok::<_, ClientError>((o, list))
                };
                match loaded.await {
                    Ok((o, list)) => {
                        buffers.set(CodeBuffers::seeded(&list, &language.get_untracked()));
                        results.set(HashMap::new());
                        selected.set(0);
                        problems.set(list);
                        olympiad.set(Some(o));
                    }
                    Err(e) => {
                        warn!("Could not load olympiad {}: {}", id, e);
                        error.set(Some(e));
                    }
                }
                loading.set(false);
            });
        }
    });

    let change_language = move |lang: String| {
        let from = language.get_untracked();
        problems.with_untracked(|list| {
            buffers.update(|b| b.switch_language(list, &from, &lang));
        });
        language.set(lang);
    };

    let submit = move |_: MouseEvent| {
        if !accepts_submissions(status.get_untracked()) {
            warn!("Olympiad is not running, submission not sent");
            return;
        }
        let index = selected.get_untracked();
        let Some(problem) = problems.with_untracked(|list| list.get(index).cloned()) else {
            return;
        };
        let id = olympiad_id();
        let submission = SubmissionRequest {
            problem_id: Some(problem.id),
            code: buffers.with_untracked(|b| b.get(index)),
            language: language.get_untracked(),
        };
        log!(
            "Submitting to {}: {}",
            crate::api::paths::olympiad_submit(&id),
            describe_submission(&submission)
        );
        submitting.set(true);

        let app = app.clone();
        spawn_local(async move {
            let verdict = match app.api.submit_olympiad(&id, &submission).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    let navigate = use_navigate();
                    let return_to = format!("/olympiads/{}/problems", id);
                    SubmissionResult::rejected(failure_message(
                        &app,
                        &e,
                        &navigate,
                        Some(&return_to),
                    ))
                }
            };
            results.update(|r| {
                r.insert(index, verdict);
            });
            submitting.set(false);
        });
    };

    view! {
        <div class="olympiad-problems">
            {move || {
                if loading.get() && olympiad.with(Option::is_none) {
                    return view! { <p>"Loading olympiad data..."</p> }.into_any();
                }
                match error.get() {
                    Some(ClientError::NotFound(_)) => {
                        return view! {
                            <div class="not-found">
                                <h2>"404"</h2>
                                <p>"Olympiad not found"</p>
                                <A href="/olympiads">"Back to Olympiads"</A>
                            </div>
                        }
                            .into_any();
                    }
                    Some(e) => {
                        return view! { <p class="error">{e.to_string()}</p> }.into_any();
                    }
                    None => {}
                }
                if problems.with(Vec::is_empty) {
                    return view! {
                        <div class="info">
                            <h2>"No Problems Available"</h2>
                            <p>"This olympiad currently has no problems to solve."</p>
                            <A href="/olympiads">"Back to Olympiads"</A>
                        </div>
                    }
                        .into_any();
                }
                view! {
                    <h1>{move || olympiad.with(|o| o.as_ref().map(|o| o.name.clone()))}</h1>
                    {move || status.get().map(|s| view! { <StatusBadge status=s.status /> })}
                    <Show when=move || !is_active()>
                        <p class="warning">
                            "Submissions are only accepted while the olympiad is running."
                        </p>
                    </Show>
                    <ProblemTabs problems=problems selected=selected results=results />
                    {move || {
                        problems
                            .with(|list| list.get(selected.get()).cloned())
                            .map(|p| {
                                view! {
                                    <h2>{p.title.clone()}</h2>
                                    <DifficultyTag difficulty=p.difficulty.clone() />
                                    <div class="statement" inner_html=p.description.clone()></div>
                                    <Examples cases=p.examples().to_vec() />
                                }
                            })
                    }}
                    <div class="editor">
                        <LanguageSelect
                            options=OLYMPIAD_LANGUAGES
                            language=language
                            on_change=change_language
                        />
                        <textarea
                            class="code"
                            spellcheck="false"
                            prop:value=move || buffers.with(|b| b.get(selected.get()))
                            on:input=move |ev| {
                                let index = selected.get_untracked();
                                buffers.update(|b| b.set(index, event_target_value(&ev)));
                            }
                        ></textarea>
                        <button
                            on:click=submit.clone()
                            disabled=move || submitting.get() || !is_active()
                        >
                            {move || if submitting.get() { "Submitting..." } else { "Submit" }}
                        </button>
                    </div>
                    {move || {
                        results
                            .with(|r| r.get(&selected.get()).cloned())
                            .map(|r| view! { <SubmissionReport result=r /> })
                    }}
                }
                    .into_any()
            }}
        </div>
    }
}

#[component]
fn ProblemTabs(
    problems: RwSignal<Vec<Problem>>,
    selected: RwSignal<usize>,
    results: RwSignal<HashMap<usize, SubmissionResult>>,
) -> impl IntoView {
    move || {
        problems
            .get()
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let solved = move || results.with(|r| r.get(&i).is_some_and(|r| r.is_correct));
                view! {
                    <button
                        class="tab"
                        class:selected=move || selected.get() == i
                        on:click=move |_| selected.set(i)
                    >
                        {format!("{}. {}", i + 1, p.title)}
                        {move || solved().then_some(" ✓")}
                    </button>
                }
            })
            .collect_view()
    }
}

/// Confirms registration for an olympiad, then returns to its detail page.
#[component]
pub fn OlympiadRegistration() -> impl IntoView {
    let app = use_app();
    let olympiad_id = olympiad_id_param();

    let loading = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let confirm = move |_: MouseEvent| {
        let id = olympiad_id();
        let navigate = use_navigate();
        let return_to = format!("/olympiads-register/{}", id);
        if app.api.session().token().is_none() {
            navigate(&login_path(Some(&return_to)), NavigateOptions::default());
            return;
        }
        loading.set(true);
        error.set(None);

        let app = app.clone();
        spawn_local(async move {
            match app.api.register_for_olympiad(&id).await {
                Ok(()) => {
                    log!("Registered for olympiad {}", id);
                    navigate(&format!("/olympiads/{}", id), NavigateOptions::default());
                }
                Err(e) => {
                    error.set(Some(failure_message(&app, &e, &navigate, Some(&return_to))));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="olympiad-registration">
            <h1>"Olympiad Registration"</h1>
            <p>"Do you want to register for this olympiad?"</p>
            <ErrorBanner message=error />
            <button on:click=confirm disabled=move || loading.get()>
                {move || if loading.get() { "Registering..." } else { "Confirm Registration" }}
            </button>
            <A href=move || format!("/olympiads/{}", olympiad_id())>"Cancel"</A>
        </div>
    }
}
