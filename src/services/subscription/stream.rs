//! Cancelable stream handle backing infinite subscriptions.

use std::{
	pin::Pin,
	task::{Context, Poll},
};

use futures::Stream;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::models::AdapterError;

/// An infinite, cancelable sequence of subscription items.
///
/// Items are produced by a background driver task and consumed through
/// the [`Stream`] interface. Dropping the stream aborts the driver, which
/// synchronously detaches every underlying ledger-stream listener; a
/// canceled subscription can never deliver another item. A subscription
/// is not restartable: after an error item the channel closes and the
/// stream ends.
pub struct SubscriptionStream<T> {
	receiver: mpsc::Receiver<Result<T, AdapterError>>,
	driver: JoinHandle<()>,
}

impl<T> SubscriptionStream<T> {
	pub(crate) fn new(
		receiver: mpsc::Receiver<Result<T, AdapterError>>,
		driver: JoinHandle<()>,
	) -> Self {
		Self { receiver, driver }
	}
}

impl<T> Stream for SubscriptionStream<T> {
	type Item = Result<T, AdapterError>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		self.get_mut().receiver.poll_recv(cx)
	}
}

impl<T> Drop for SubscriptionStream<T> {
	fn drop(&mut self) {
		self.driver.abort();
	}
}
