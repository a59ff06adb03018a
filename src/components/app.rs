use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::MessageEvent;
use yew::prelude::*;

use super::map_view::MapView;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::model::{SnapshotUpdate, WorldSnapshot};

#[derive(Properties, PartialEq, Clone, Default)]
pub struct AppProps {
    #[prop_or_default]
    pub config: ViewerConfig,
}

/// Decodes a posted message. Strings are parsed as JSON text, anything
/// else is stringified first.
fn decode_message(e: &MessageEvent) -> Result<SnapshotUpdate, ViewerError> {
    let data = e.data();
    let raw = match data.as_string() {
        Some(raw) => raw,
        None => js_sys::JSON::stringify(&data)
            .ok()
            .and_then(|s| s.as_string())
            .ok_or(ViewerError::Dom("message data"))?,
    };
    SnapshotUpdate::from_json(&raw)
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let snapshot = use_reducer(|| {
        WorldSnapshot::demo().unwrap_or_else(|err| {
            tracing::warn!(%err, "demo world unavailable");
            WorldSnapshot::default()
        })
    });

    // Data source: snapshot updates posted to the window.
    {
        let snapshot = snapshot.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window();
            let message_cb = Closure::wrap(Box::new(move |e: MessageEvent| {
                match decode_message(&e) {
                    Ok(update) => {
                        let kind = match &update {
                            SnapshotUpdate::Static(_) => "static",
                            SnapshotUpdate::Dynamic(_) => "dynamic",
                        };
                        tracing::debug!(kind, "snapshot update");
                        snapshot.dispatch(update);
                    }
                    Err(err) => tracing::warn!(%err, "ignoring message"),
                }
            }) as Box<dyn FnMut(_)>);
            if let Some(window) = &window {
                window
                    .add_event_listener_with_callback("message", message_cb.as_ref().unchecked_ref())
                    .ok();
            }
            move || {
                if let Some(window) = &window {
                    let _ = window.remove_event_listener_with_callback(
                        "message",
                        message_cb.as_ref().unchecked_ref(),
                    );
                }
            }
        });
    }

    html! { <MapView snapshot={snapshot} config={props.config.clone()} /> }
}
