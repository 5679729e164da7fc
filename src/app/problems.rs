use leptos::ev::MouseEvent;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::{
    components::A,
    hooks::{use_navigate, use_params_map},
};

use super::{failure_message, use_app, ErrorBanner, NotFound};
use crate::model::{
    Difficulty, Problem, SubmissionRequest, SubmissionResult, TestCase, PRACTICE_LANGUAGES,
};
use crate::report;

#[component]
pub fn ProblemList() -> impl IntoView {
    let app = use_app();
    let state = app.problems;

    Effect::new(move || {
        let api = app.api.clone();
        state.update(|s| s.pending());
        spawn_local(async move {
            match api.problems().await {
                Ok(problems) => state.update(|s| s.list_loaded(problems)),
                Err(e) => state.update(|s| s.rejected(e.to_string())),
            }
        });
    });

    view! {
        <div class="problems">
            <h1>"Problems"</h1>
            <ErrorBanner message=Signal::derive(move || state.with(|s| s.error.clone())) />
            <Show
                when=move || !state.with(|s| s.loading && s.problems.is_empty())
                fallback=|| view! { <p>"Loading..."</p> }
            >
                <table>
                    <thead>
                        <tr>
                            <th>"ID"</th>
                            <th>"Title"</th>
                            <th>"Difficulty"</th>
                        </tr>
                    </thead>
                    <tbody>
                        {move || {
                            state
                                .with(|s| s.problems.clone())
                                .into_iter()
                                .map(|problem| {
                                    view! {
                                        <tr>
                                            <td>{problem.id.clone()}</td>
                                            <td>
                                                <A href=format!(
                                                    "/problems/{}",
                                                    problem.id,
                                                )>{problem.title.clone()}</A>
                                            </td>
                                            <td>
                                                <DifficultyTag difficulty=problem.difficulty.clone() />
                                            </td>
                                        </tr>
                                    }
                                })
                                .collect_view()
                        }}
                    </tbody>
                </table>
            </Show>
        </div>
    }
}

#[component]
pub(super) fn DifficultyTag(difficulty: String) -> impl IntoView {
    let color = Difficulty::parse(&difficulty).color();
    view! { <span class=format!("tag tag-{}", color)>{difficulty}</span> }
}

/// The worked examples shown under a problem statement.
#[component]
pub(super) fn Examples(cases: Vec<TestCase>) -> impl IntoView {
    (!cases.is_empty()).then(move || view! {
        <h3>"Examples"</h3>
        {cases
            .into_iter()
            .enumerate()
            .map(|(i, case)| {
                view! {
                    <div class="example">
                        <strong>"Input " {i + 1}</strong>
                        <pre>{case.input}</pre>
                        <strong>"Output"</strong>
                        <pre>{case.output}</pre>
                        {case
                            .explanation
                            .map(|e| {
                                view! {
                                    <strong>"Explanation"</strong>
                                    <p>{e}</p>
                                }
                            })}
                    </div>
                }
            })
            .collect_view()}
    })
}

/// A submission verdict laid out like terminal output.
#[component]
pub(super) fn SubmissionReport(result: SubmissionResult) -> impl IntoView {
    view! {
        <pre class="terminal">
            {report::render(&result)
                .into_iter()
                .map(|line| {
                    view! { <div class=format!("line {}", line.tone.class())>{line.text}</div> }
                })
                .collect_view()}
        </pre>
    }
}

/// Dropdown over `(value, label)` pairs bound to `language`.
#[component]
pub(super) fn LanguageSelect(
    options: &'static [(&'static str, &'static str)],
    language: RwSignal<String>,
    #[prop(into)] on_change: Callback<String>,
) -> impl IntoView {
    view! {
        <select on:change=move |ev| on_change.run(event_target_value(&ev))>
            {options
                .iter()
                .map(|(value, label)| {
                    view! {
                        <option value=*value selected=move || language.get() == *value>
                            {*label}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}

#[component]
pub fn ProblemDetail() -> impl IntoView {
    let app = use_app();
    let params = use_params_map();
    let problem_id = move || params.with(|p| p.get("id").unwrap_or_default());

    let problem = RwSignal::new(None::<Problem>);
    let not_found = RwSignal::new(false);
    let loading = RwSignal::new(true);
    let submitting = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let language = RwSignal::new("javascript".to_string());
    let code = RwSignal::new(String::new());
    let result = RwSignal::new(None::<SubmissionResult>);

    Effect::new({
        let app = app.clone();
        move || {
            let id = problem_id();
            let app = app.clone();
            loading.set(true);
            error.set(None);
            not_found.set(false);
            result.set(None);
            app.problems.update(|s| s.pending());
            spawn_local(async move {
                match app.api.problem(&id).await {
                    Ok(p) => {
                        code.set(p.starter_code(&language.get_untracked()));
                        problem.set(Some(p.clone()));
                        app.problems.update(|s| s.problem_loaded(p));
                    }
                    Err(e) => {
                        not_found.set(e.is_not_found());
                        error.set(Some(e.to_string()));
                        app.problems.update(|s| s.rejected(e.to_string()));
                    }
                }
                loading.set(false);
            });
        }
    });

    let change_language = move |lang: String| {
        if let Some(p) = problem.get_untracked() {
            code.set(p.starter_code(&lang));
        }
        language.set(lang);
    };

    let submit = move |_: MouseEvent| {
        let id = problem_id();
        let submission = SubmissionRequest {
            problem_id: None,
            code: code.get_untracked(),
            language: language.get_untracked(),
        };
        submitting.set(true);
        error.set(None);
        result.set(None);

        let app = app.clone();
        spawn_local(async move {
            match app.api.submit_problem(&id, &submission).await {
                Ok(verdict) => {
                    if verdict.is_correct {
                        log!("Problem {} solved", id);
                    }
                    result.set(Some(verdict));
                }
                Err(e) => {
                    let return_to = format!("/problems/{}", id);
                    let navigate = use_navigate();
                    let msg = failure_message(&app, &e, &navigate, Some(&return_to));
                    error.set(Some(msg));
                }
            }
            submitting.set(false);
        });
    };

    view! {
        <div class="problem-detail">
            <Show when=move || !not_found.get() fallback=|| view! { <NotFound /> }>
                <ErrorBanner message=error />
                {move || {
                    if loading.get() && problem.with(Option::is_none) {
                        return view! { <p>"Loading problem..."</p> }.into_any();
                    }
                    match problem.get() {
                        Some(p) => {
                            view! {
                                <h1>{p.title.clone()}</h1>
                                <DifficultyTag difficulty=p.difficulty.clone() />
                                <div class="statement" inner_html=p.description.clone()></div>
                                <Examples cases=p.examples().to_vec() />
                            }
                                .into_any()
                        }
                        None => ().into_any(),
                    }
                }}
                <div class="editor">
                    <LanguageSelect
                        options=PRACTICE_LANGUAGES
                        language=language
                        on_change=change_language
                    />
                    <textarea
                        class="code"
                        spellcheck="false"
                        prop:value=move || code.get()
                        on:input=move |ev| code.set(event_target_value(&ev))
                    ></textarea>
                    <button
                        on:click=submit.clone()
                        disabled=move || submitting.get() || problem.with(Option::is_none)
                    >
                        {move || if submitting.get() { "Submitting..." } else { "Submit" }}
                    </button>
                </div>
                {move || result.get().map(|r| view! { <SubmissionReport result=r /> })}
            </Show>
        </div>
    }
}
