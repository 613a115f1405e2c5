/// Popup / side panel page: choose how the toolbar button behaves

use crate::chrome::{load_display_mode, save_display_mode};
use crate::dom::{BrowserTimers, WebDocument};
use crate::storage::DisplayMode;
use crate::toast::{ToastKind, ToastManager, DEFAULT_DURATION_MS};
use patternfly_yew::prelude::{Alert, AlertType, Button, ButtonVariant, Spinner};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Key of the toast confirming a settings change
const SETTINGS_TOAST_KEY: &str = "display-mode";

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Idle,
    Saving,
    Error(String),
}

fn describe(mode: DisplayMode) -> &'static str {
    match mode {
        DisplayMode::Popup => "The toolbar button opens this popup.",
        DisplayMode::SidePanel => "The toolbar button toggles the side panel for the current tab.",
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading);
    let mode = use_state(DisplayMode::default);
    let toasts = use_memo((), |_| ToastManager::new(WebDocument, BrowserTimers));

    // Load the stored preference on mount
    {
        let state = state.clone();
        let mode = mode.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_display_mode().await {
                    Ok(stored) => {
                        mode.set(stored);
                        state.set(AppState::Idle);
                    }
                    Err(e) => {
                        log::warn!("Failed to load display mode: {}", e);
                        state.set(AppState::Error(format!("Failed to load settings: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_select = {
        let state = state.clone();
        let mode = mode.clone();
        let toasts = toasts.clone();
        move |selected: DisplayMode| {
            let state = state.clone();
            let mode = mode.clone();
            let toasts = toasts.clone();
            Callback::from(move |_| {
                let state = state.clone();
                let mode = mode.clone();
                let toasts = toasts.clone();

                state.set(AppState::Saving);
                toasts.clear_toasts(Some(SETTINGS_TOAST_KEY));

                spawn_local(async move {
                    match save_display_mode(selected).await {
                        Ok(()) => {
                            mode.set(selected);
                            state.set(AppState::Idle);
                            toasts.show_toast(
                                "Display mode saved",
                                ToastKind::Success,
                                DEFAULT_DURATION_MS,
                                Some(SETTINGS_TOAST_KEY),
                            );
                        }
                        Err(e) => {
                            state.set(AppState::Idle);
                            toasts.show_toast(
                                &format!("Could not save display mode: {}", e),
                                ToastKind::Error,
                                DEFAULT_DURATION_MS,
                                Some(SETTINGS_TOAST_KEY),
                            );
                        }
                    }
                });
            })
        }
    };

    let is_busy = matches!(*state, AppState::Loading | AppState::Saving);
    let variant_for = |candidate: DisplayMode| {
        if *mode == candidate {
            ButtonVariant::Primary
        } else {
            ButtonVariant::Secondary
        }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Scrum Helper"}</h1>

            {match &*state {
                AppState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle | AppState::Saving => html! {}
            }}

            <div class="flex-column-gap">
                <p class="message-text">{describe(*mode)}</p>
                <Button
                    onclick={on_select(DisplayMode::SidePanel)}
                    disabled={is_busy}
                    variant={variant_for(DisplayMode::SidePanel)}
                    block={true}
                >
                    {"Open in side panel"}
                </Button>
                <Button
                    onclick={on_select(DisplayMode::Popup)}
                    disabled={is_busy}
                    variant={variant_for(DisplayMode::Popup)}
                    block={true}
                >
                    {"Open as popup"}
                </Button>
            </div>
        </div>
    }
}
