use chrono::{DateTime, Utc};
use concentration_core::{KeyValueStore, ShareError, ShareSink, StoreError};
use core::time::Duration;
use gloo::storage::{LocalStorage, Storage};
use wasm_bindgen::{JsCast, JsValue};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct ModalProps {
    #[prop_or_default]
    pub children: Html,
}

/// Helper component to attatch the contents into the document.body instead of in the place where it's used.
#[function_component]
pub(crate) fn Modal(props: &ModalProps) -> Html {
    let modal_host = gloo::utils::body();
    create_portal(props.children.clone(), modal_host.into())
}

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}

pub(crate) fn utc_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// Timer APIs take milliseconds as `u32`.
pub(crate) fn timer_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// The browser's `localStorage` as the session's key-value store.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct LocalStore;

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        match LocalStorage::raw().get_item(key) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("could not read {}: {:?}", key, err);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|err| StoreError::Write {
                key: key.to_string(),
                reason: format!("{:?}", err),
            })
    }
}

fn rejected(err: JsValue) -> ShareError {
    ShareError::Rejected(format!("{:?}", err))
}

/// Copies through the asynchronous Clipboard API.
pub(crate) async fn clipboard_write(text: &str) -> Result<(), ShareError> {
    let navigator = gloo::utils::window().navigator();
    let has_clipboard = js_sys::Reflect::has(&navigator, &JsValue::from_str("clipboard")).unwrap_or(false);
    if !has_clipboard {
        return Err(ShareError::Unavailable);
    }

    let promise = navigator.clipboard().write_text(text);
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(rejected)
}

/// Copies by selecting a temporary off-screen text area and issuing the legacy `copy` command.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct TextAreaCopy;

impl ShareSink for TextAreaCopy {
    fn copy(&mut self, text: &str) -> Result<(), ShareError> {
        let document = gloo::utils::document();
        let html_document = document
            .dyn_ref::<web_sys::HtmlDocument>()
            .ok_or(ShareError::Unavailable)?;
        let textarea: web_sys::HtmlTextAreaElement = document
            .create_element("textarea")
            .map_err(rejected)?
            .dyn_into()
            .map_err(|_| ShareError::Unavailable)?;

        textarea.set_value(text);
        textarea.set_read_only(true);
        let style = textarea.style();
        style.set_property("position", "fixed").map_err(rejected)?;
        style.set_property("left", "-9999px").map_err(rejected)?;

        let body = gloo::utils::body();
        body.append_child(&textarea).map_err(rejected)?;
        textarea.select();
        let copied = html_document.exec_command("copy");
        if let Err(err) = body.remove_child(&textarea) {
            log::debug!("could not remove copy helper: {:?}", err);
        }

        match copied {
            Ok(true) => Ok(()),
            Ok(false) => Err(ShareError::Rejected("copy command refused".to_string())),
            Err(err) => Err(rejected(err)),
        }
    }
}
