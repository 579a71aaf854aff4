//! Background contact submissions so the UI loop never waits on the network.

use tokio::sync::mpsc;

use crate::core::contact::ContactPayload;
use crate::core::transport::{ContactClient, ContactError};

#[derive(Debug)]
pub enum ContactUpdate {
    Finished { result: Result<(), ContactError> },
}

/// Send one submission on its own task and report the outcome.
pub fn spawn_submit(
    tx: mpsc::UnboundedSender<ContactUpdate>,
    client: ContactClient,
    payload: ContactPayload,
) {
    tokio::spawn(async move {
        let result = client.submit(&payload).await;
        let _ = tx.send(ContactUpdate::Finished { result });
    });
}
