// SPDX-License-Identifier: GPL-3.0-only

//! One connection to the disk service and everything built on it

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::callback::CallbackQueue;
use crate::client::DisksClient;
use crate::config::ClientConfig;
use crate::dispatcher::RequestDispatcher;
use crate::error::ClientError;
use crate::events::EventRouter;
use crate::transport::{DbusTransport, Transport};

/// Owns the transport, the callback queue and the notification pump.
///
/// Construct one explicitly and pass it (or its parts) to whoever needs it.
/// Dropping the session stops notification delivery and any callbacks that
/// have not run yet.
pub struct Session {
    client: DisksClient,
    dispatcher: RequestDispatcher,
    events: EventRouter,
    callbacks_task: JoinHandle<()>,
    pump: JoinHandle<()>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub async fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = DbusTransport::connect(config).await?;
        Self::with_transport(Arc::new(transport), config).await
    }

    /// Build a session over an existing transport. Subscribes to
    /// notifications before returning so no signal after this call is missed.
    pub async fn with_transport(
        transport: Arc<dyn Transport>,
        config: &ClientConfig,
    ) -> Result<Self, ClientError> {
        let notifications = transport.notifications().await?;
        let (callbacks, callbacks_task) = CallbackQueue::start();

        let client = DisksClient::new(transport, config);
        let dispatcher = RequestDispatcher::new(client.clone(), callbacks.clone());
        let events = EventRouter::new(callbacks);
        let pump = events.attach(notifications);

        tracing::info!("Disk service session started");

        Ok(Self {
            client,
            dispatcher,
            events,
            callbacks_task,
            pump,
        })
    }

    /// Async request surface
    pub fn client(&self) -> &DisksClient {
        &self.client
    }

    /// Callback request surface
    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub fn events(&self) -> &EventRouter {
        &self.events
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.pump.abort();
        self.callbacks_task.abort();
    }
}
