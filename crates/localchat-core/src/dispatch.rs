use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::gateway::ModelGateway;
use crate::session::{Completion, PendingCall};

/// Runs gateway calls off the UI task and hands results back over a channel.
///
/// Workers only send; whoever owns the receiver applies the completion.
pub struct Dispatcher {
    gateway: ModelGateway,
    tx: mpsc::UnboundedSender<Completion>,
}

impl Dispatcher {
    pub fn new(gateway: ModelGateway) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { gateway, tx }, rx)
    }

    pub fn dispatch(&self, call: PendingCall) -> JoinHandle<()> {
        let gateway = self.gateway.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            debug!(epoch = call.epoch, "gateway call started");
            let reply = gateway.complete(&call.context, &call.question).await;
            let completion = Completion {
                epoch: call.epoch,
                question: call.question,
                reply,
            };
            // The receiver is gone only when the UI has shut down.
            if tx.send(completion).is_err() {
                debug!("completion dropped, UI closed");
            }
        })
    }
}
