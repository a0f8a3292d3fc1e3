//! The rendering side of the engine.
//!
//! The engine hands every animation request to a [`Presenter`] together with
//! the handle the action is waiting on, and once per tick asks it which
//! handles have finished.

use std::sync::mpsc::{self, Receiver, Sender};

use log::warn;

use crate::actions::{AnimationRequest, SceneHandle};

/// Shows animation requests and reports when they finish.
pub trait Presenter {
    /// Start showing `request`. Completion is reported under `handle`.
    fn present(&mut self, handle: SceneHandle, request: &AnimationRequest);

    /// Move every handle that finished since the last call into `out`.
    fn drain_completed(&mut self, out: &mut Vec<SceneHandle>);
}

/// Completes every animation on the next drain.
///
/// Useful for tests and tools that want animated-mode ordering without a
/// renderer.
#[derive(Clone, Debug, Default)]
pub struct InstantPresenter {
    finished: Vec<SceneHandle>,
    presented: usize,
}

impl InstantPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests presented so far.
    #[must_use]
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Presenter for InstantPresenter {
    fn present(&mut self, handle: SceneHandle, _request: &AnimationRequest) {
        self.presented += 1;
        self.finished.push(handle);
    }

    fn drain_completed(&mut self, out: &mut Vec<SceneHandle>) {
        out.append(&mut self.finished);
    }
}

/// Never completes anything itself.
///
/// Presented requests go down a channel to the host, which renders them on
/// its own schedule and reports each finished handle through
/// [`ActionEngine::post_animation_completed`](super::ActionEngine::post_animation_completed).
#[derive(Debug)]
pub struct ExternalPresenter {
    requests: Sender<(SceneHandle, AnimationRequest)>,
}

impl ExternalPresenter {
    /// Presenter plus the receiving end the host reads requests from.
    #[must_use]
    pub fn channel() -> (Self, Receiver<(SceneHandle, AnimationRequest)>) {
        let (requests, receiver) = mpsc::channel();
        (Self { requests }, receiver)
    }
}

impl Presenter for ExternalPresenter {
    fn present(&mut self, handle: SceneHandle, request: &AnimationRequest) {
        if self.requests.send((handle, request.clone())).is_err() {
            warn!("Host hung up, dropping animation {handle}");
        }
    }

    fn drain_completed(&mut self, _out: &mut Vec<SceneHandle>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner() -> AnimationRequest {
        AnimationRequest::Banner {
            text: "Turn 1".into(),
            duration_ms: 10.0,
        }
    }

    #[test]
    fn test_instant_presenter_completes_on_drain() {
        let mut presenter = InstantPresenter::new();
        presenter.present(SceneHandle(1), &banner());
        presenter.present(SceneHandle(2), &banner());

        let mut out = Vec::new();
        presenter.drain_completed(&mut out);
        assert_eq!(out, vec![SceneHandle(1), SceneHandle(2)]);
        assert_eq!(presenter.presented(), 2);

        out.clear();
        presenter.drain_completed(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_external_presenter_forwards_requests() {
        let (mut presenter, requests) = ExternalPresenter::channel();
        presenter.present(SceneHandle(7), &banner());

        let mut out = Vec::new();
        presenter.drain_completed(&mut out);
        assert!(out.is_empty());

        let received: Vec<_> = requests.try_iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, SceneHandle(7));
        assert!(requests.try_recv().is_err());
    }
}
