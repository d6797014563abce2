// SPDX-License-Identifier: GPL-3.0-only

//! Effect execution for the terminal front-end
//!
//! Every effect returned by [`AppModel::update`](crate::app::AppModel::update)
//! is performed here. Asynchronous effects run on the tokio runtime and post
//! their outcome back to the front-end loop as a message.

use super::LoopEvent;
use crate::app::{Effect, Message};
use crate::browser::{self, NavigationReporter};
use crate::haptics::Haptics;
use crate::storage::{self, ConfigStore};
use futures::channel::mpsc::UnboundedSender;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use url::Url;

/// What the loop has to do after an effect ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    Done,
    /// No motor fired; show a visual cue for this long instead
    VisualPulse(Duration),
    Exit,
}

/// Performs effects and reports their results as messages
pub struct EffectRunner {
    runtime: Handle,
    events: UnboundedSender<LoopEvent>,
    store: Arc<dyn ConfigStore>,
    haptics: Haptics,
}

impl EffectRunner {
    pub fn new(
        runtime: Handle,
        events: UnboundedSender<LoopEvent>,
        store: Arc<dyn ConfigStore>,
        haptics: Haptics,
    ) -> Self {
        Self {
            runtime,
            events,
            store,
            haptics,
        }
    }

    /// Read the stored configuration and post [`Message::ConfigLoaded`]
    pub fn load_configuration(&self) {
        let store = self.store.clone();
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let config = storage::load_configuration_async(store).await;
            send(&events, Message::ConfigLoaded(config));
        });
    }

    pub fn run(&self, effect: Effect) -> EffectOutcome {
        debug!(effect = ?effect, "Running effect");
        match effect {
            Effect::Vibrate(duration) => {
                if self.haptics.vibrate(duration) {
                    EffectOutcome::Done
                } else {
                    EffectOutcome::VisualPulse(duration)
                }
            }
            Effect::PersistConfig(config) => {
                let store = self.store.clone();
                let events = self.events.clone();
                self.runtime.spawn(async move {
                    let result = storage::save_configuration_async(store, config).await;
                    send(&events, Message::ConfigSaved(result));
                });
                EffectOutcome::Done
            }
            Effect::OpenExternal(url) => {
                self.open_external(url);
                EffectOutcome::Done
            }
            Effect::LoadPage(url) => {
                self.load_page(url);
                EffectOutcome::Done
            }
            Effect::Exit => EffectOutcome::Exit,
        }
    }

    fn open_external(&self, url: Url) {
        info!(url = %url, "Opening URL with system handler");
        let result = open::that_detached(url.as_str()).map_err(|e| e.to_string());
        send(&self.events, Message::ExternalOpened(result));
    }

    fn load_page(&self, url: Url) {
        let nav_events = self.events.clone();
        let view = url.clone();
        let report: NavigationReporter = Arc::new(move |navigated: &Url| {
            send(
                &nav_events,
                Message::BrowserNavigated {
                    view: view.clone(),
                    url: navigated.clone(),
                },
            );
        });

        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = browser::fetch_page(url.clone(), report)
                .await
                .map_err(|e| e.to_string());
            send(&events, Message::PageLoaded { url, result });
        });
    }
}

fn send(events: &UnboundedSender<LoopEvent>, message: Message) {
    if events.unbounded_send(LoopEvent::App(message)).is_err() {
        warn!("Front-end loop is gone, dropping message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::storage::MemoryConfigStore;
    use futures::StreamExt;
    use futures::channel::mpsc;

    fn runner(store: Arc<dyn ConfigStore>) -> (EffectRunner, mpsc::UnboundedReceiver<LoopEvent>) {
        let (tx, rx) = mpsc::unbounded();
        let runner = EffectRunner::new(Handle::current(), tx, store, Haptics::default());
        (runner, rx)
    }

    #[tokio::test]
    async fn test_vibrate_without_motor_falls_back_to_visual() {
        let (runner, _rx) = runner(Arc::new(MemoryConfigStore::new()));
        let pulse = Duration::from_millis(100);
        assert_eq!(
            runner.run(Effect::Vibrate(pulse)),
            EffectOutcome::VisualPulse(pulse)
        );
        assert_eq!(runner.run(Effect::Exit), EffectOutcome::Exit);
    }

    #[tokio::test]
    async fn test_persist_then_load_round_trips_through_store() {
        let store: Arc<dyn ConfigStore> = Arc::new(MemoryConfigStore::new());
        let (runner, mut rx) = runner(store);
        let config =
            Configuration::from_json(r#"{"a":[{"n":"A","u":"https://a"}]}"#).expect("valid json");

        runner.run(Effect::PersistConfig(config.clone()));
        match rx.next().await {
            Some(LoopEvent::App(Message::ConfigSaved(result))) => assert!(result.is_ok()),
            _ => panic!("Expected ConfigSaved"),
        }

        runner.load_configuration();
        match rx.next().await {
            Some(LoopEvent::App(Message::ConfigLoaded(loaded))) => {
                assert_eq!(loaded, Some(config))
            }
            _ => panic!("Expected ConfigLoaded"),
        }
    }

    #[tokio::test]
    async fn test_open_external_reports_without_waiting() {
        let (runner, mut rx) = runner(Arc::new(MemoryConfigStore::new()));
        let url = Url::parse("https://example.invalid/?data=1").expect("url");

        assert_eq!(runner.run(Effect::OpenExternal(url)), EffectOutcome::Done);
        // Detached opener: the outcome is posted before run returns
        assert!(matches!(
            rx.try_next(),
            Ok(Some(LoopEvent::App(Message::ExternalOpened(_))))
        ));
    }

    #[tokio::test]
    async fn test_failed_persist_is_reported() {
        let (runner, mut rx) = runner(Arc::new(MemoryConfigStore::failing()));
        runner.run(Effect::PersistConfig(Configuration::default()));
        match rx.next().await {
            Some(LoopEvent::App(Message::ConfigSaved(result))) => assert!(result.is_err()),
            _ => panic!("Expected ConfigSaved"),
        }
    }
}
