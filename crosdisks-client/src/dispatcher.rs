// SPDX-License-Identifier: GPL-3.0-only

//! Callback request surface
//!
//! Every operation takes a success and an error callback and returns
//! immediately. Exactly one of the two runs, once, on the session's
//! [`CallbackQueue`]. The error callback carries no payload: transport
//! failures, method errors and undecodable replies all look the same to it.
//! The underlying [`ClientError`] is logged at debug level.
//!
//! Requests run on the runtime the dispatcher was created on, so the
//! operations may be called from any thread.

use std::future::Future;

use crosdisks_types::{DiskInfo, MountType};
use tokio::runtime::Handle;

use crate::callback::CallbackQueue;
use crate::client::DisksClient;
use crate::error::ClientError;

#[derive(Clone, Debug)]
pub struct RequestDispatcher {
    client: DisksClient,
    callbacks: CallbackQueue,
    runtime: Handle,
}

impl RequestDispatcher {
    /// Must be called from within a Tokio runtime; requests are spawned onto it.
    pub fn new(client: DisksClient, callbacks: CallbackQueue) -> Self {
        Self::with_runtime(client, callbacks, Handle::current())
    }

    pub fn with_runtime(client: DisksClient, callbacks: CallbackQueue, runtime: Handle) -> Self {
        Self {
            client,
            callbacks,
            runtime,
        }
    }

    pub fn mount<S, E>(
        &self,
        source_path: impl Into<String>,
        mount_type: MountType,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce() + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let client = self.client.clone();
        let source_path = source_path.into();
        self.dispatch(
            "Mount",
            async move { client.mount(&source_path, mount_type).await },
            move |()| on_success(),
            on_error,
        );
    }

    pub fn unmount<S, E>(&self, device_path: impl Into<String>, on_success: S, on_error: E)
    where
        S: FnOnce(String) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let client = self.client.clone();
        let device_path = device_path.into();
        self.dispatch(
            "Unmount",
            async move { client.unmount(&device_path).await },
            on_success,
            on_error,
        );
    }

    pub fn enumerate_auto_mountable_devices<S, E>(&self, on_success: S, on_error: E)
    where
        S: FnOnce(Vec<String>) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let client = self.client.clone();
        self.dispatch(
            "EnumerateAutoMountableDevices",
            async move { client.enumerate_auto_mountable_devices().await },
            on_success,
            on_error,
        );
    }

    /// `on_success` receives the device path and whether formatting succeeded.
    pub fn format_device<S, E>(
        &self,
        device_path: impl Into<String>,
        filesystem: impl Into<String>,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce(String, bool) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let client = self.client.clone();
        let device_path = device_path.into();
        let filesystem = filesystem.into();
        self.dispatch(
            "FormatDevice",
            async move { client.format_device(&device_path, &filesystem).await },
            move |(path, succeeded)| on_success(path, succeeded),
            on_error,
        );
    }

    pub fn get_device_properties<S, E>(
        &self,
        device_path: impl Into<String>,
        on_success: S,
        on_error: E,
    ) where
        S: FnOnce(DiskInfo) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let client = self.client.clone();
        let device_path = device_path.into();
        self.dispatch(
            "GetDeviceProperties",
            async move { client.get_device_properties(&device_path).await },
            on_success,
            on_error,
        );
    }

    fn dispatch<T, F, S, E>(&self, method: &'static str, request: F, on_success: S, on_error: E)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
        S: FnOnce(T) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        let callbacks = self.callbacks.clone();
        self.runtime.spawn(async move {
            match request.await {
                Ok(value) => {
                    callbacks.post(move || on_success(value));
                }
                Err(e) => {
                    tracing::debug!(method, error = %e, "Request failed; running error callback");
                    callbacks.post(on_error);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use crate::config::ClientConfig;
    use crate::decode::keys;
    use crate::decode::tests::usb_stick_properties;
    use crate::fake::FakeTransport;
    use crate::transport::{Method, Reply, Request};

    #[derive(Debug, PartialEq)]
    enum Outcome<T> {
        Success(T),
        Error,
    }

    fn dispatcher(fake: &Arc<FakeTransport>) -> RequestDispatcher {
        let (callbacks, _task) = CallbackQueue::start();
        RequestDispatcher::new(DisksClient::new(fake.clone(), &ClientConfig::default()), callbacks)
    }

    /// Collect every callback invocation until both callbacks are dropped.
    async fn outcomes<T>(mut rx: mpsc::UnboundedReceiver<Outcome<T>>) -> Vec<Outcome<T>> {
        let mut seen = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(outcome) = rx.recv().await {
                seen.push(outcome);
            }
        })
        .await
        .expect("callbacks were never released");
        seen
    }

    #[tokio::test]
    async fn mount_success_fires_only_success_callback() {
        let fake = FakeTransport::new();
        fake.push_reply(Method::Mount, Ok(Reply::Empty));
        let (tx, rx) = mpsc::unbounded_channel();

        let ok = tx.clone();
        dispatcher(&fake).mount(
            "/dev/sdb1",
            MountType::Device,
            move || ok.send(Outcome::Success(())).unwrap(),
            move || tx.send(Outcome::Error).unwrap(),
        );

        assert_eq!(outcomes(rx).await, vec![Outcome::Success(())]);
    }

    #[tokio::test]
    async fn transport_failure_fires_only_error_callback() {
        let fake = FakeTransport::new();
        fake.push_reply(
            Method::Unmount,
            Err(ClientError::Connection("bus went away".to_string())),
        );
        let (tx, rx) = mpsc::unbounded_channel();

        let ok = tx.clone();
        dispatcher(&fake).unmount(
            "/dev/sdb1",
            move |path| ok.send(Outcome::Success(path)).unwrap(),
            move || tx.send(Outcome::Error).unwrap(),
        );

        assert_eq!(outcomes(rx).await, vec![Outcome::Error]);
    }

    #[tokio::test]
    async fn every_reachable_outcome_fires_exactly_once() {
        let fake = FakeTransport::new();
        fake.push_reply(
            Method::EnumerateAutoMountableDevices,
            Ok(Reply::DevicePaths(vec!["/sys/block/sdb".to_string()])),
        );
        fake.push_reply(
            Method::EnumerateAutoMountableDevices,
            Err(ClientError::ServiceNotAvailable),
        );
        fake.push_reply(
            Method::EnumerateAutoMountableDevices,
            Ok(Reply::Formatted(true)),
        );
        let dispatcher = dispatcher(&fake);

        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            let ok = tx.clone();
            dispatcher.enumerate_auto_mountable_devices(
                move |paths| ok.send(Outcome::Success(paths)).unwrap(),
                move || tx.send(Outcome::Error).unwrap(),
            );
            assert_eq!(outcomes(rx).await.len(), 1);
        }
    }

    #[tokio::test]
    async fn unsuccessful_format_is_still_a_success_callback() {
        let fake = FakeTransport::new();
        fake.push_reply(Method::FormatDevice, Ok(Reply::Formatted(false)));
        let (tx, rx) = mpsc::unbounded_channel();

        let ok = tx.clone();
        dispatcher(&fake).format_device(
            "/dev/sdb1",
            "vfat",
            move |path, succeeded| ok.send(Outcome::Success((path, succeeded))).unwrap(),
            move || tx.send(Outcome::Error).unwrap(),
        );

        assert_eq!(
            outcomes(rx).await,
            vec![Outcome::Success(("/dev/sdb1".to_string(), false))]
        );
    }

    #[tokio::test]
    async fn undecodable_properties_fire_error_callback() {
        let fake = FakeTransport::new();
        let mut bag = usb_stick_properties("/dev/sdb1");
        bag.remove(keys::NATIVE_PATH);
        fake.push_reply(Method::GetDeviceProperties, Ok(Reply::Properties(bag)));
        let (tx, rx) = mpsc::unbounded_channel();

        let ok = tx.clone();
        dispatcher(&fake).get_device_properties(
            "/dev/sdb1",
            move |disk| ok.send(Outcome::Success(disk)).unwrap(),
            move || tx.send(Outcome::Error).unwrap(),
        );

        assert_eq!(outcomes(rx).await, vec![Outcome::Error]);
    }

    #[tokio::test]
    async fn device_properties_success_delivers_disk_info() {
        let fake = FakeTransport::new();
        fake.push_reply(
            Method::GetDeviceProperties,
            Ok(Reply::Properties(usb_stick_properties("/sys/block/sdb/sdb1"))),
        );
        let (tx, rx) = mpsc::unbounded_channel();

        let ok = tx.clone();
        dispatcher(&fake).get_device_properties(
            "/sys/block/sdb/sdb1",
            move |disk| ok.send(Outcome::Success(disk.device_path)).unwrap(),
            move || tx.send(Outcome::Error).unwrap(),
        );

        assert_eq!(
            outcomes(rx).await,
            vec![Outcome::Success("/sys/block/sdb/sdb1".to_string())]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn operations_can_be_issued_from_a_plain_thread() {
        let fake = FakeTransport::new();
        fake.push_reply(Method::Mount, Ok(Reply::Empty));
        let dispatcher = dispatcher(&fake);
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            let ok = tx.clone();
            dispatcher.mount(
                "/dev/sdb1",
                MountType::Device,
                move || ok.send(Outcome::Success(())).unwrap(),
                move || tx.send(Outcome::Error).unwrap(),
            );
        })
        .join()
        .expect("dispatching from a non-runtime thread");

        assert_eq!(outcomes(rx).await, vec![Outcome::Success(())]);
        assert_eq!(
            fake.calls(),
            vec![Request::Mount {
                source_path: "/dev/sdb1".to_string(),
                filesystem_type: String::new(),
                options: ClientConfig::default().mount_options,
            }]
        );
    }
}
