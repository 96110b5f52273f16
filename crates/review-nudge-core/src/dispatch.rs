//! Running the review request on the host's UI context.
//!
//! The engine never calls the presenter from its own call stack. It hands a
//! [`UiTask`] to a [`UiExecutor`] and returns immediately. Hosts whose engine
//! calls already happen on the UI thread can use [`InlineExecutor`]; hosts
//! with a separate UI loop use [`ui_channel`] and drain the [`UiPump`] there.

use tokio::sync::mpsc;

/// Unit of work that must run on the UI context.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run a task on the context designated safe for UI.
///
/// Fire-and-forget: implementations must not block the caller on the task.
pub trait UiExecutor: Send + Sync {
    fn dispatch(&self, task: UiTask);
}

/// Runs tasks immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl UiExecutor for InlineExecutor {
    fn dispatch(&self, task: UiTask) {
        task();
    }
}

/// Create a dispatcher/pump pair connected by an unbounded channel.
pub fn ui_channel() -> (UiDispatcher, UiPump) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiDispatcher { tx }, UiPump { rx })
}

/// Sending half, handed to the engine as its executor.
#[derive(Debug, Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiTask>,
}

impl UiExecutor for UiDispatcher {
    fn dispatch(&self, task: UiTask) {
        if self.tx.send(task).is_err() {
            tracing::warn!("UI pump is gone; dropping dispatched task");
        }
    }
}

/// Receiving half, owned by the host's UI loop.
#[derive(Debug)]
pub struct UiPump {
    rx: mpsc::UnboundedReceiver<UiTask>,
}

impl UiPump {
    /// Run every task queued so far without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Run tasks as they arrive until every dispatcher is dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            task();
        }
    }
}
