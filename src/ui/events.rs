//! Application event handling.
//!
//! Applies the results of background tasks (page fetches, favorites and auth
//! updates, platform actions) to the application state.

use crate::app::{App, AppEvent, Screen};
use crate::pipeline::{ErrorKind, Event};
use crate::storage::AuthState;
use crate::util::strip_control_chars;
use tokio::sync::mpsc;

use super::helpers::{dispatch, spawn_favorites_load};

/// Show the article list for a freshly authenticated session.
pub(super) fn start_session(app: &mut App, auth: AuthState, event_tx: &mpsc::Sender<AppEvent>) {
    app.enter_session(auth);
    dispatch(app, Event::Mount, event_tx);
    spawn_favorites_load(app, event_tx);
}

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::Pipeline(event) => {
            // A fetch that outlived its session has nothing to update.
            if app.screen == Screen::Login {
                tracing::debug!("Dropping page result after logout");
                return;
            }
            dispatch(app, event, event_tx);
        }
        AppEvent::FavoritesLoaded(favorites) => {
            tracing::debug!(count = favorites.len(), "Favorites loaded");
            app.set_favorites(favorites);
        }
        AppEvent::FavoriteChanged { article, saved, ok } => {
            if !ok {
                app.set_status("Could not update favorites");
                return;
            }
            app.record_favorite(article, saved);
            let msg = match (saved, app.services.reminder_delay) {
                (true, Some(delay)) => {
                    format!("Saved to favorites, reminder in {} min", delay.as_secs() / 60)
                }
                (true, None) => "Saved to favorites".to_string(),
                (false, _) => "Removed from favorites".to_string(),
            };
            app.set_status(msg);
        }
        AppEvent::LoginFinished { success, biometric } => {
            if success {
                start_session(
                    app,
                    AuthState {
                        is_authenticated: true,
                        biometrics_enabled: biometric,
                    },
                    event_tx,
                );
            } else {
                app.login_pending = false;
                app.set_status(if biometric {
                    "Biometric login failed"
                } else {
                    "Could not save login state"
                });
            }
        }
        AppEvent::LoggedOut => {
            app.end_session();
            app.set_status("Logged out");
        }
        AppEvent::Reminder(notification) => {
            app.set_status(format!(
                "{}: {}",
                notification.title,
                strip_control_chars(&notification.body)
            ));
        }
        AppEvent::DownloadFinished(result) => match result {
            Ok(path) => app.set_status(format!("Saved to {}", path.display())),
            Err(e) => app.set_status(e),
        },
        AppEvent::ShareFinished(result) => match result {
            Ok(()) => app.set_status("Opened in browser"),
            Err(e) => app.set_status(e),
        },
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
            match task {
                "login" => app.login_pending = false,
                // Unstick the list so the user can retry.
                "fetch" if app.page.loading && app.screen != Screen::Login => {
                    if let Some(request) = app.page.last_request.clone() {
                        dispatch(
                            app,
                            Event::FetchFailed {
                                generation: request.generation,
                                page: request.page,
                                kind: ErrorKind::General,
                                message: None,
                            },
                            event_tx,
                        );
                    }
                }
                _ => {}
            }
        }
    }
    app.needs_redraw = true;
}
