//! The watch-and-batch event loop. One commit RPC is ever in flight; new
//! filesystem events keep accumulating into the batch while it's out,
//! and a failed commit simply re-marks its paths dirty so the next tick
//! retries — the same delta is recomputed against the (unchanged) cache.

use std::path::PathBuf;
use std::time::Duration;

use msync_filters::IgnorePolicy;
use msync_model::{path::to_relative, TextCache};
use msync_proto::{messages::PathDelta, Client, Request};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::batch::Batch;
use crate::error::SourceError;

/// One path's attempted commit: its relative path, the new text read from
/// disk (cached on success), and the delta encoded against the cache.
type CommitAttempt = Vec<(String, String, String)>;
type CommitResult<S> = (Client<S>, CommitAttempt, Result<(), SourceError>);

/// Run the source loop until `stop` fires or a watch error takes the
/// watcher down. `client` is the already-connected RPC stub; `cache` is
/// the initial cache built from disk (see [`crate::build::build_initial_cache`]).
pub async fn run<S>(
    base_dir: PathBuf,
    policy: IgnorePolicy,
    mut cache: TextCache,
    client: Client<S>,
    commit_delay: Duration,
    mut stop: oneshot::Receiver<()>,
) -> Result<(), SourceError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let watch_root = base_dir.clone();
    let mut watcher: RecommendedWatcher =
        notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })
        .map_err(|source| SourceError::Watch { path: watch_root.clone(), source })?;
    watcher
        .watch(&base_dir, RecursiveMode::Recursive)
        .map_err(|source| SourceError::Watch { path: base_dir.clone(), source })?;

    let mut batch = Batch::new();

    // One-shot debounce: armed when the batch goes empty -> non-empty, fires
    // once, and is disarmed as soon as it kicks off a commit. Its deadline is
    // anchored to the first path dirtied after idle, unlike a free-running
    // interval, so a burst of edits always lands in a single commit.
    let commit_timer = tokio::time::sleep(commit_delay);
    tokio::pin!(commit_timer);
    let mut commit_armed = false;

    let mut client_slot = Some(client);
    let mut in_flight: Option<JoinHandle<CommitResult<S>>> = None;

    loop {
        tokio::select! {
            _ = &mut stop => {
                return Ok(());
            }

            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(Ok(event)) => {
                        handle_fs_event(&base_dir, &policy, &mut batch, event);
                        if !commit_armed && !batch.is_empty() {
                            commit_timer.as_mut().reset(Instant::now() + commit_delay);
                            commit_armed = true;
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "watch error");
                    }
                    None => return Ok(()),
                }
            }

            _ = &mut commit_timer, if commit_armed && in_flight.is_none() => {
                commit_armed = false;
                let client = client_slot.take().expect("client present when no commit in flight");
                let paths = batch.drain();
                let attempt = build_attempt(&base_dir, &cache, paths);
                in_flight = Some(tokio::spawn(commit(client, attempt)));
            }

            result = await_in_flight(&mut in_flight), if in_flight.is_some() => {
                let (client, attempted, outcome) = result;
                match outcome {
                    Ok(()) => {
                        for (path, text, _delta) in attempted {
                            cache.insert(path, text);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "commit failed, will retry");
                        batch.restore(attempted.into_iter().map(|(path, _, _)| path));
                    }
                }
                client_slot = Some(client);
                if !commit_armed && !batch.is_empty() {
                    commit_timer.as_mut().reset(Instant::now() + commit_delay);
                    commit_armed = true;
                }
            }
        }
    }
}

/// Await whatever commit task is currently in flight, consuming the slot.
/// Only called behind an `in_flight.is_some()` select guard.
async fn await_in_flight<S>(slot: &mut Option<JoinHandle<CommitResult<S>>>) -> CommitResult<S>
where
    S: Send + 'static,
{
    let handle = slot.take().expect("guarded by in_flight.is_some()");
    handle.await.expect("commit task panicked")
}

fn handle_fs_event(base_dir: &PathBuf, policy: &IgnorePolicy, batch: &mut Batch, event: Event) {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return;
    }

    for path in event.paths {
        let Ok(rel) = to_relative(base_dir, &path) else {
            continue;
        };
        if policy.should_ignore(&path, &rel) {
            continue;
        }
        batch.mark_dirty(rel);
    }
}

fn build_attempt(base_dir: &PathBuf, cache: &TextCache, paths: Vec<String>) -> CommitAttempt {
    let mut attempt = Vec::with_capacity(paths.len());
    for path in paths {
        let absolute = msync_model::path::to_absolute(base_dir, &path);
        match std::fs::read_to_string(&absolute) {
            Ok(text) => {
                let delta = msync_delta::encode(cache.get_or_empty(&path), &text);
                attempt.push((path, text, delta));
            }
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "file vanished before commit, skipping");
            }
        }
    }
    attempt
}

async fn commit<S>(mut client: Client<S>, attempt: CommitAttempt) -> CommitResult<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let entries = attempt
        .iter()
        .map(|(path, _text, delta)| PathDelta {
            path: path.clone(),
            delta: delta.clone(),
        })
        .collect::<Vec<_>>();

    let result = client.call(Request::ApplyDeltas { entries }).await;

    let outcome = match result {
        Ok(_response) => Ok(()),
        Err(e) => Err(SourceError::Rpc(e)),
    };

    (client, attempt, outcome)
}

