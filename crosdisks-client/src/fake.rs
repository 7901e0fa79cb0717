// SPDX-License-Identifier: GPL-3.0-only

//! Scripted [`Transport`] for tests

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::transport::{Method, Notification, Reply, Request, Transport};

pub(crate) struct FakeTransport {
    replies: Mutex<HashMap<Method, VecDeque<Result<Reply, ClientError>>>>,
    calls: Mutex<Vec<Request>>,
    notify_tx: mpsc::UnboundedSender<Notification>,
    notify_rx: Mutex<Option<mpsc::UnboundedReceiver<Notification>>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            notify_tx,
            notify_rx: Mutex::new(Some(notify_rx)),
        })
    }

    /// Queue the outcome of the next call to `method`.
    pub(crate) fn push_reply(&self, method: Method, reply: Result<Reply, ClientError>) {
        self.replies
            .lock()
            .unwrap()
            .entry(method)
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notify_tx
            .send(notification)
            .expect("notification stream was dropped");
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn call(&self, request: Request) -> Result<Reply, ClientError> {
        let method = request.method();
        self.calls.lock().unwrap().push(request);

        self.replies
            .lock()
            .unwrap()
            .get_mut(&method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ClientError::MethodCall(format!(
                    "no scripted reply for {}",
                    method.name()
                )))
            })
    }

    async fn notifications(&self) -> Result<BoxStream<'static, Notification>, ClientError> {
        let receiver = self
            .notify_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ClientError::Connection("already subscribed".to_string()))?;

        Ok(stream::unfold(receiver, |mut receiver| async move {
            let notification = receiver.recv().await?;
            Some((notification, receiver))
        })
        .boxed())
    }
}
