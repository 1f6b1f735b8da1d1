use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;

use async_channel::{Receiver, Sender};

use super::error::{SocialError, SocialResult};
use super::provider::Provider;
use super::ParameterMap;

/// Name of the thread every observer callback runs on.
pub const DELIVERY_THREAD_NAME: &str = "socialnetwork-delivery";

pub type CompletionCallback = Arc<dyn Fn(&CompletionEvent) + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Success(ParameterMap),
    Failure(SocialError),
}

/// The single notification produced for a handled redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    pub provider: Provider,
    pub outcome: CompletionOutcome,
}

impl CompletionEvent {
    pub fn parameters(&self) -> Option<&ParameterMap> {
        match &self.outcome {
            CompletionOutcome::Success(parameters) => Some(parameters),
            CompletionOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SocialError> {
        match &self.outcome {
            CompletionOutcome::Success(_) => None,
            CompletionOutcome::Failure(error) => Some(error),
        }
    }
}

type ObserverSlot = Arc<RwLock<Option<CompletionCallback>>>;

/// Delivers completion events to one observer on a dedicated thread.
///
/// Events are queued on an unbounded channel and drained in order by the
/// delivery thread, so observers always run on [`DELIVERY_THREAD_NAME`] no
/// matter which thread handled the redirect or finished the exchange. The
/// observer is looked up when an event is delivered; with none registered the
/// event is dropped. The thread exits once every clone of the notifier is gone.
#[derive(Clone)]
pub struct CompletionNotifier {
    observer: ObserverSlot,
    sender: Sender<CompletionEvent>,
}

impl CompletionNotifier {
    pub fn new() -> SocialResult<Self> {
        let (sender, receiver) = async_channel::unbounded();
        let observer: ObserverSlot = Arc::new(RwLock::new(None));
        let delivery_observer = Arc::clone(&observer);

        thread::Builder::new()
            .name(DELIVERY_THREAD_NAME.to_string())
            .spawn(move || futures::executor::block_on(deliver(receiver, delivery_observer)))
            .map_err(|err| {
                SocialError::Internal(format!("failed to start delivery thread: {err}"))
            })?;

        Ok(Self { observer, sender })
    }

    /// Replaces the registered observer.
    pub fn register<F>(&self, observer: F)
    where
        F: Fn(&CompletionEvent) + Send + Sync + 'static,
    {
        let mut slot = self.observer.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(observer));
    }

    pub fn unregister(&self) {
        self.observer
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn has_observer(&self) -> bool {
        self.observer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Queues one event for delivery.
    pub fn notify(&self, provider: Provider, outcome: CompletionOutcome) {
        let event = CompletionEvent { provider, outcome };
        if let Err(err) = self.sender.try_send(event) {
            log::warn!("dropping {provider} completion, delivery thread is gone: {err}");
        }
    }
}

impl std::fmt::Debug for CompletionNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionNotifier")
            .field("has_observer", &self.has_observer())
            .field("queued", &self.sender.len())
            .finish()
    }
}

async fn deliver(receiver: Receiver<CompletionEvent>, observer: ObserverSlot) {
    while let Ok(event) = receiver.recv().await {
        let callback = observer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(callback) = callback else {
            log::debug!("no observer registered, dropping {} completion", event.provider);
            continue;
        };
        if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
            log::warn!("completion observer panicked while handling {}", event.provider);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn success(token: &str) -> CompletionOutcome {
        CompletionOutcome::Success(ParameterMap::from([(
            "access_token".to_string(),
            token.to_string(),
        )]))
    }

    #[test]
    fn delivers_on_the_delivery_thread() {
        let notifier = CompletionNotifier::new().unwrap();
        let (tx, rx) = mpsc::channel();
        notifier.register(move |event: &CompletionEvent| {
            let thread_name = thread::current().name().map(str::to_string);
            tx.send((event.clone(), thread_name)).unwrap();
        });

        notifier.notify(Provider::Google, success("T"));

        let (event, thread_name) = rx.recv_timeout(WAIT).expect("event delivered");
        assert_eq!(event.provider, Provider::Google);
        assert_eq!(event.parameters().unwrap()["access_token"], "T");
        assert_eq!(thread_name.as_deref(), Some(DELIVERY_THREAD_NAME));
    }

    #[test]
    fn events_are_delivered_in_order() {
        let notifier = CompletionNotifier::new().unwrap();
        let (tx, rx) = mpsc::channel();
        notifier.register(move |event: &CompletionEvent| {
            tx.send(event.parameters().unwrap()["access_token"].clone())
                .unwrap();
        });

        for token in ["1", "2", "3"] {
            notifier.notify(Provider::Facebook, success(token));
        }

        let received: Vec<String> = (0..3).map(|_| rx.recv_timeout(WAIT).unwrap()).collect();
        assert_eq!(received, ["1", "2", "3"]);
    }

    #[test]
    fn unregistered_observer_receives_nothing() {
        let notifier = CompletionNotifier::new().unwrap();
        let (tx, rx) = mpsc::channel::<CompletionEvent>();
        notifier.register(move |event: &CompletionEvent| {
            let _ = tx.send(event.clone());
        });
        notifier.unregister();
        assert!(!notifier.has_observer());

        notifier.notify(Provider::Vkontakte, success("T"));
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn failures_are_delivered_as_events() {
        let notifier = CompletionNotifier::new().unwrap();
        let (tx, rx) = mpsc::channel();
        notifier.register(move |event: &CompletionEvent| {
            tx.send(event.clone()).unwrap();
        });

        let error = SocialError::ExchangeTransport {
            message: "connection refused".into(),
        };
        notifier.notify(Provider::Odnoklassniki, CompletionOutcome::Failure(error.clone()));

        let event = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(event.error(), Some(&error));
        assert!(event.parameters().is_none());
    }

    #[test]
    fn panicking_observer_does_not_stop_delivery() {
        let notifier = CompletionNotifier::new().unwrap();
        let (tx, rx) = mpsc::channel();
        notifier.register(move |event: &CompletionEvent| {
            let token = event.parameters().unwrap()["access_token"].clone();
            if token == "boom" {
                panic!("observer failure");
            }
            tx.send(token).unwrap();
        });

        notifier.notify(Provider::Facebook, success("boom"));
        notifier.notify(Provider::Facebook, success("after"));

        assert_eq!(rx.recv_timeout(WAIT).unwrap(), "after");
    }
}
