//! Drivers that replay a [`Run`] in real time.

use std::{thread, time::Duration};

use crate::algorithms::{Frame, Outcome, Run};

/// Blocking playback of a run.
///
/// Each call to `next` first waits for the pause requested by the previous
/// frame, then advances the run by one frame.
pub struct Playback<'g> {
    run: Run<'g>,
    pending: Option<Duration>,
}

impl<'g> Playback<'g> {
    pub fn new(run: Run<'g>) -> Self {
        Self { run, pending: None }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.run.outcome()
    }

    pub fn into_run(self) -> Run<'g> {
        self.run
    }
}

impl Iterator for Playback<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if let Some(pause) = self.pending.take() {
            thread::sleep(pause);
        }

        let frame = self.run.next()?;
        self.pending = Some(frame.pause);
        Some(frame)
    }
}

/// Drives `run` on the tokio timer, handing every frame to `on_frame`.
///
/// Dropping the returned future cancels the run.
#[cfg(not(target_arch = "wasm32"))]
pub async fn animate<F>(mut run: Run<'_>, mut on_frame: F) -> Outcome
where
    F: FnMut(&Frame),
{
    while let Some(frame) = run.next() {
        on_frame(&frame);
        tokio::time::sleep(frame.pause).await;
    }

    run.finish()
}
