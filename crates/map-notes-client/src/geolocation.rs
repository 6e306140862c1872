//! Browser geolocation with one relaxed retry.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use map_notes_core::{
    GeolocationError, LngLat,
    geolocation::{LocateOptions, retry_options},
};
use wasm_bindgen::{JsCast, prelude::Closure};
use web_sys::{GeolocationPosition, GeolocationPositionError, PositionOptions};

type Reply = Rc<RefCell<Option<oneshot::Sender<Result<LngLat, GeolocationError>>>>>;

/// One `getCurrentPosition` call.
pub async fn current_position(options: LocateOptions) -> Result<LngLat, GeolocationError> {
    let geolocation = gloo::utils::window()
        .navigator()
        .geolocation()
        .map_err(|_| GeolocationError::Unsupported)?;

    let (tx, rx) = oneshot::channel();
    let reply: Reply = Rc::new(RefCell::new(Some(tx)));

    let on_success = {
        let reply = reply.clone();
        Closure::<dyn FnMut(GeolocationPosition)>::new(move |position: GeolocationPosition| {
            let coords = position.coords();
            if let Some(tx) = reply.borrow_mut().take() {
                let _ = tx.send(Ok(LngLat::new(coords.longitude(), coords.latitude())));
            }
        })
    };
    let on_error = {
        let reply = reply.clone();
        Closure::<dyn FnMut(GeolocationPositionError)>::new(move |error: GeolocationPositionError| {
            if let Some(tx) = reply.borrow_mut().take() {
                let _ = tx.send(Err(GeolocationError::from_code(error.code())));
            }
        })
    };

    let position_options = PositionOptions::new();
    position_options.set_enable_high_accuracy(options.high_accuracy);
    position_options.set_timeout(options.timeout_ms);
    position_options.set_maximum_age(options.maximum_age_ms);

    geolocation
        .get_current_position_with_error_callback_and_options(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
            &position_options,
        )
        .map_err(|_| GeolocationError::Unsupported)?;

    // The closures must outlive the browser's answer.
    let result = rx.await.unwrap_or(Err(GeolocationError::PositionUnavailable));
    drop((on_success, on_error));
    result
}

/// Precise lookup, then a relaxed one after a timeout or an unavailable
/// position. `on_retry` runs before the second attempt.
pub async fn locate(on_retry: impl FnOnce()) -> Result<LngLat, GeolocationError> {
    match current_position(LocateOptions::PRECISE).await {
        Ok(position) => Ok(position),
        Err(err) => match retry_options(err) {
            Some(relaxed) => {
                tracing::info!("precise location failed ({err:?}), retrying relaxed");
                on_retry();
                current_position(relaxed).await
            }
            None => Err(err),
        },
    }
}
