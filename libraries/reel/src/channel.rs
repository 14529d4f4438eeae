//! Best-effort broadcast of snapshots to sibling views of the same document.
//!
//! Backed by a named `BroadcastChannel` in the browser: same origin, same
//! device, not durable. The sender never receives its own messages. Delivery
//! is fire-and-forget with no acknowledgement and no retry, so the consumer's
//! only sane policy is last-message-wins.

use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to open broadcast channel {name}: {details}")]
    Open { name: String, details: String },
}

/// A typed handle on one named broadcast channel.
///
/// The subscription is scoped to the handle: dropping it (or calling
/// [`SyncChannel::close`]) closes the underlying channel and releases the
/// callback, so switching documents doesn't accumulate stale channels.
pub struct SyncChannel<M> {
    inner: backend::Channel,
    _marker: PhantomData<M>,
}

impl<M: Serialize + DeserializeOwned + 'static> SyncChannel<M> {
    pub fn open(name: &str) -> Result<SyncChannel<M>, ChannelError> {
        let inner = backend::Channel::open(name).map_err(|details| ChannelError::Open {
            name: name.to_string(),
            details,
        })?;
        Ok(SyncChannel {
            inner,
            _marker: PhantomData,
        })
    }

    /// Fire-and-forget JSON broadcast to every other subscriber on this
    /// channel name. Failures are logged and dropped.
    pub fn publish(&self, message: &M) {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize broadcast message: {e:?}");
                return;
            }
        };
        self.inner.post(&json);
    }

    /// Registers the message callback. A message that fails to deserialize is
    /// logged and discarded rather than reaching the callback.
    pub fn subscribe(&mut self, mut on_message: impl FnMut(M) + 'static) {
        self.inner.set_on_message(Box::new(move |raw| {
            match serde_json::from_str::<M>(raw) {
                Ok(message) => on_message(message),
                Err(e) => log::warn!("Discarding unparseable broadcast message: {e:?}"),
            }
        }));
    }

    pub fn close(&mut self) {
        self.inner.close();
    }
}

impl<M> Drop for SyncChannel<M> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

#[cfg(target_arch = "wasm32")]
mod backend {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::*;
    use web_sys::{BroadcastChannel, MessageEvent};

    pub(super) struct Channel {
        channel: BroadcastChannel,
        // Kept alive for as long as the subscription is registered.
        on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
    }

    impl Channel {
        pub(super) fn open(name: &str) -> Result<Channel, String> {
            BroadcastChannel::new(name)
                .map(|channel| Channel {
                    channel,
                    on_message: None,
                })
                .map_err(|e| format!("{e:?}"))
        }

        pub(super) fn post(&self, json: &str) {
            if let Err(e) = self.channel.post_message(&JsValue::from_str(json)) {
                log::error!("Failed to post broadcast message: {e:?}");
            }
        }

        pub(super) fn set_on_message(&mut self, mut handler: Box<dyn FnMut(&str)>) {
            let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
                if let Some(raw) = event.data().as_string() {
                    handler(&raw);
                }
            }) as Box<dyn FnMut(MessageEvent)>);
            self.channel
                .set_onmessage(Some(closure.as_ref().unchecked_ref()));
            self.on_message = Some(closure);
        }

        pub(super) fn close(&mut self) {
            self.channel.set_onmessage(None);
            self.on_message = None;
            self.channel.close();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod backend {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::{Rc, Weak};

    type Handler = Rc<RefCell<Option<Box<dyn FnMut(&str)>>>>;

    thread_local! {
        static BUS: RefCell<HashMap<String, Vec<(usize, Weak<RefCell<Option<Box<dyn FnMut(&str)>>>>)>>> =
            RefCell::new(HashMap::new());
        static NEXT_ID: Cell<usize> = const { Cell::new(0) };
    }

    /// In-process stand-in for `BroadcastChannel`: delivers to every other
    /// live subscriber registered under the same name on this thread.
    pub(super) struct Channel {
        id: usize,
        name: String,
        handler: Handler,
    }

    impl Channel {
        pub(super) fn open(name: &str) -> Result<Channel, String> {
            let id = NEXT_ID.with(|next| {
                let id = next.get();
                next.set(id + 1);
                id
            });
            let handler: Handler = Rc::new(RefCell::new(None));
            BUS.with(|bus| {
                bus.borrow_mut()
                    .entry(name.to_string())
                    .or_default()
                    .push((id, Rc::downgrade(&handler)));
            });
            Ok(Channel {
                id,
                name: name.to_string(),
                handler,
            })
        }

        pub(super) fn post(&self, json: &str) {
            // Collect strong handles first so callbacks never run while the
            // bus itself is borrowed.
            let peers: Vec<Handler> = BUS.with(|bus| {
                bus.borrow()
                    .get(&self.name)
                    .map(|subscribers| {
                        subscribers
                            .iter()
                            .filter(|(id, _)| *id != self.id)
                            .filter_map(|(_, weak)| weak.upgrade())
                            .collect()
                    })
                    .unwrap_or_default()
            });
            for peer in peers {
                if let Some(handler) = peer.borrow_mut().as_mut() {
                    handler(json);
                }
            }
        }

        pub(super) fn set_on_message(&mut self, handler: Box<dyn FnMut(&str)>) {
            *self.handler.borrow_mut() = Some(handler);
        }

        pub(super) fn close(&mut self) {
            *self.handler.borrow_mut() = None;
            BUS.with(|bus| {
                if let Some(subscribers) = bus.borrow_mut().get_mut(&self.name) {
                    subscribers.retain(|(id, _)| *id != self.id);
                }
            });
        }
    }
}
