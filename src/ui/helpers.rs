//! Background task spawning shared by the input and event handlers.
//!
//! Every task reports back through the `AppEvent` channel; none of them touch
//! `App` directly.

use crate::app::{App, AppEvent};
use crate::model::Article;
use crate::pipeline::{self, Effect, FetchRequest};
use crate::platform::{Notification, ShareRequest};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wraps a future to catch panics and convert them to errors.
///
/// Panics in spawned tasks would otherwise vanish into the runtime; this
/// turns them into `Err(message)` so the UI can report them.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `future` and send its event, or `TaskPanicked` if it panics.
fn spawn_reporting<F>(task: &'static str, tx: &mpsc::Sender<AppEvent>, future: F) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(future).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                AppEvent::TaskPanicked { task, error }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    })
}

/// Run an event through the page reducer and start the fetches it asks for.
pub(super) fn dispatch(app: &mut App, event: pipeline::Event, tx: &mpsc::Sender<AppEvent>) {
    for effect in app.apply(event) {
        match effect {
            Effect::Fetch(request) => spawn_fetch(app, request, tx),
        }
    }
}

fn spawn_fetch(app: &mut App, request: FetchRequest, tx: &mpsc::Sender<AppEvent>) {
    let retriever = app.services.retriever.clone();
    tracing::debug!(
        generation = request.generation,
        page = request.page,
        "Spawning page fetch"
    );
    let handle = spawn_reporting("fetch", tx, async move {
        AppEvent::Pipeline(retriever.fetch(&request).await)
    });
    app.track_fetch(handle);
}

pub(super) fn spawn_favorites_load(app: &App, tx: &mpsc::Sender<AppEvent>) {
    let favorites = app.services.favorites.clone();
    spawn_reporting("favorites_load", tx, async move {
        AppEvent::FavoritesLoaded(favorites.list().await)
    });
}

/// Save or unsave `article` depending on its current membership.
///
/// A newly saved article schedules a reading reminder when one is configured.
pub(super) fn spawn_favorite_toggle(app: &App, article: Article, tx: &mpsc::Sender<AppEvent>) {
    let favorites = app.services.favorites.clone();
    let notifier = app.services.notifier.clone();
    let reminder_delay = app.services.reminder_delay;
    let saving = !app.is_favorite(&article.url);

    spawn_reporting("favorite_toggle", tx, async move {
        let ok = if saving {
            favorites.add(&article).await
        } else {
            favorites.remove(&article.url).await
        };

        if ok && saving {
            if let Some(delay) = reminder_delay {
                let reminder = Notification {
                    title: "Reading reminder".to_string(),
                    body: article.title.clone(),
                    delay,
                };
                if let Err(e) = notifier.schedule(reminder).await {
                    tracing::warn!(error = %e, "Failed to schedule reading reminder");
                }
            }
        }

        AppEvent::FavoriteChanged {
            article,
            saved: saving,
            ok,
        }
    });
}

pub(super) fn spawn_login(app: &mut App, biometric: bool, tx: &mpsc::Sender<AppEvent>) {
    if app.login_pending {
        return;
    }
    app.login_pending = true;
    let auth = app.services.auth.clone();
    spawn_reporting("login", tx, async move {
        let success = if biometric {
            auth.authenticate().await
        } else {
            auth.login_without_biometrics().await
        };
        AppEvent::LoginFinished { success, biometric }
    });
}

pub(super) fn spawn_logout(app: &App, tx: &mpsc::Sender<AppEvent>) {
    let auth = app.services.auth.clone();
    spawn_reporting("logout", tx, async move {
        if !auth.logout().await {
            tracing::warn!("Logout could not be persisted");
        }
        AppEvent::LoggedOut
    });
}

pub(super) fn spawn_download(app: &App, article: &Article, tx: &mpsc::Sender<AppEvent>) {
    let downloader = app.services.downloader.clone();
    let url = article.url.clone();
    let name = article.title.clone();
    spawn_reporting("download", tx, async move {
        AppEvent::DownloadFinished(
            downloader
                .download(&url, &name)
                .await
                .map_err(|e| e.to_string()),
        )
    });
}

pub(super) fn spawn_share(app: &App, article: &Article, tx: &mpsc::Sender<AppEvent>) {
    let share = app.services.share.clone();
    let request = ShareRequest {
        title: article.title.clone(),
        url: article.url.clone(),
    };
    spawn_reporting("share", tx, async move {
        AppEvent::ShareFinished(share.share(&request).await.map_err(|e| e.to_string()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        assert_eq!(catch_task_panic(async { 42 }).await, Ok(42));
    }

    #[tokio::test]
    async fn test_catch_task_panic_str() {
        let result = catch_task_panic(async {
            if true {
                panic!("boom");
            }
            1
        })
        .await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_catch_task_panic_string() {
        let code = 7;
        let result = catch_task_panic(async move {
            if code > 0 {
                panic!("failed with {code}");
            }
            code
        })
        .await;
        assert_eq!(result, Err("failed with 7".to_string()));
    }

    #[tokio::test]
    async fn test_spawn_reporting_converts_panic() {
        let (tx, mut rx) = mpsc::channel(1);
        spawn_reporting("test", &tx, async {
            if true {
                panic!("kaput");
            }
            AppEvent::LoggedOut
        })
        .await
        .unwrap();
        match rx.recv().await {
            Some(AppEvent::TaskPanicked { task, error }) => {
                assert_eq!(task, "test");
                assert_eq!(error, "kaput");
            }
            other => panic!("expected TaskPanicked, got {other:?}"),
        }
    }
}
