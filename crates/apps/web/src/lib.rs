//! Browser bindings for the exhibit.
//!
//! The page owns the 3D map element and forwards pointer events here; every
//! call re-reads the camera from the element. Results cross the boundary as
//! JSON strings.

mod host;
mod logging;
mod net;

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

use exhibit::{
    ClickOutcome, ElevationLookup, ExhibitConfig, ExhibitError, PostcardState, PostcardTicket,
    Session,
};
use foundation::LandmarkId;
use js_sys::Function;
use projection::{ScreenPoint, Viewport};
use scene::ChromeRegion;
use serde::Serialize;
use valuation::{NeighborhoodAtlas, neighborhoods};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::AbortController;

use crate::host::{JsMapHost, JsProjection};

// Guard against double initialization during hot reload.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

struct App {
    session: Session,
    host: JsMapHost,
    /// Base URL of the exhibit server; empty for same-origin.
    api_base: String,
    postcard_abort: Option<(PostcardTicket, AbortController)>,
    on_change: Option<Function>,
}

thread_local! {
    static STATE: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Runs `f` against the live app. Fails before `init_exhibit` or during
/// teardown.
fn with_app<F, R>(f: F) -> Result<R, JsValue>
where
    F: FnOnce(&mut App) -> Result<R, JsValue>,
{
    STATE
        .try_with(|state| match state.borrow_mut().as_mut() {
            Some(app) => f(app),
            None => Err(JsValue::from_str("exhibit not initialized")),
        })
        .map_err(js_err)?
}

fn to_json(value: &impl Serialize) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_err)
}

fn exhibit_err(err: ExhibitError) -> JsValue {
    if matches!(err, ExhibitError::EngineUnavailable(_)) {
        tracing::error!("{err}");
    }
    js_err(err)
}

// Tells the page that async work changed something worth redrawing.
fn notify_change() {
    let listener = with_app(|app| Ok(app.on_change.clone())).ok().flatten();
    if let Some(f) = listener {
        let _ = f.call0(&JsValue::NULL);
    }
}

// Aborts the in-flight request for `ticket`, if that is the one in flight.
fn abort_postcard(app: &mut App, ticket: Option<PostcardTicket>) {
    let Some(ticket) = ticket else {
        return;
    };
    if app.postcard_abort.as_ref().is_some_and(|(pending, _)| *pending == ticket) {
        if let Some((_, controller)) = app.postcard_abort.take() {
            controller.abort();
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    console_error_panic_hook::set_once();
    logging::init();
    Ok(())
}

/// Starts a session over `map`. `config_json` overlays the defaults.
#[wasm_bindgen]
pub fn init_exhibit(
    map: JsValue,
    width: f64,
    height: f64,
    api_base: String,
    config_json: Option<String>,
) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(json) => ExhibitConfig::from_json(json).map_err(exhibit_err)?,
        None => ExhibitConfig::default(),
    };
    if let Err(err) = neighborhoods::install_builtin() {
        tracing::warn!("neighborhood polygons unavailable, using bounding boxes: {err}");
    }

    let host = JsMapHost::new(map, Viewport::new(width, height));
    let session = Session::start(config, &host).map_err(exhibit_err)?;
    STATE
        .try_with(|state| {
            *state.borrow_mut() = Some(App {
                session,
                host,
                api_base: api_base.trim_end_matches('/').to_string(),
                postcard_abort: None,
                on_change: None,
            });
        })
        .map_err(js_err)?;
    tracing::info!("exhibit ready");
    Ok(())
}

#[wasm_bindgen]
pub fn set_change_listener(listener: Option<Function>) -> Result<(), JsValue> {
    with_app(|app| {
        app.on_change = listener;
        Ok(())
    })
}

#[wasm_bindgen]
pub fn set_viewport(width: f64, height: f64) -> Result<(), JsValue> {
    with_app(|app| {
        app.host.set_viewport(Viewport::new(width, height));
        Ok(())
    })
}

/// Registers the engine's exact transform once it reports ready.
#[wasm_bindgen]
pub fn set_exact_projection(
    is_ready: Function,
    geo_to_container: Function,
    container_to_geo: Function,
) -> Result<(), JsValue> {
    with_app(|app| {
        app.host
            .set_projection(Some(JsProjection::new(is_ready, geo_to_container, container_to_geo)));
        Ok(())
    })
}

#[wasm_bindgen]
pub fn clear_exact_projection() -> Result<(), JsValue> {
    with_app(|app| {
        app.host.set_projection(None);
        Ok(())
    })
}

/// Replaces the neighborhood polygons used for land classification.
#[wasm_bindgen]
pub fn install_neighborhoods(json: &str) -> Result<usize, JsValue> {
    let atlas = NeighborhoodAtlas::from_json(json).map_err(js_err)?;
    Ok(neighborhoods::install(atlas).len())
}

#[wasm_bindgen]
pub fn upsert_chrome_region(json: &str) -> Result<(), JsValue> {
    let region: ChromeRegion = serde_json::from_str(json).map_err(js_err)?;
    with_app(|app| {
        app.session.surface_mut().upsert(region);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn remove_chrome_region(id: &str) -> Result<bool, JsValue> {
    with_app(|app| Ok(app.session.surface_mut().remove(id)))
}

#[wasm_bindgen]
pub fn request_placement() -> Result<(), JsValue> {
    with_app(|app| app.session.request_placement().map_err(exhibit_err))
}

#[wasm_bindgen]
pub fn request_move(id: u32) -> Result<(), JsValue> {
    with_app(|app| app.session.request_move(LandmarkId::new(id)).map_err(exhibit_err))
}

#[wasm_bindgen]
pub fn request_visit(id: u32) -> Result<(), JsValue> {
    with_app(|app| {
        app.session
            .request_visit(&mut app.host, LandmarkId::new(id))
            .map(|_| ())
            .map_err(exhibit_err)
    })
}

#[wasm_bindgen]
pub fn exit_visit() -> Result<(), JsValue> {
    with_app(|app| {
        let aborted = app.session.exit_visit(&mut app.host).map_err(exhibit_err)?;
        abort_postcard(app, aborted);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn cancel() -> Result<(), JsValue> {
    with_app(|app| app.session.cancel().map_err(exhibit_err))
}

#[wasm_bindgen]
pub fn remove_landmark(id: u32) -> Result<(), JsValue> {
    with_app(|app| {
        app.session
            .remove(LandmarkId::new(id))
            .map(|_| ())
            .map_err(exhibit_err)
    })
}

#[wasm_bindgen]
pub fn erase_all() -> Result<usize, JsValue> {
    with_app(|app| {
        let (removed, aborted) = app.session.erase_all(&mut app.host);
        abort_postcard(app, aborted);
        Ok(removed)
    })
}

#[wasm_bindgen]
pub fn reset_view() -> Result<(), JsValue> {
    with_app(|app| {
        let (_, aborted) = app.session.reset_view(&mut app.host);
        abort_postcard(app, aborted);
        Ok(())
    })
}

/// Pointer sample in container pixels; returns the hover or preview update.
#[wasm_bindgen]
pub fn pointer_move(x: f64, y: f64) -> Result<String, JsValue> {
    with_app(|app| to_json(&app.session.pointer_move(&app.host, ScreenPoint::new(x, y))))
}

#[wasm_bindgen]
pub fn pointer_leave() -> Result<(), JsValue> {
    with_app(|app| {
        app.session.pointer_leave();
        Ok(())
    })
}

#[wasm_bindgen]
pub fn click(x: f64, y: f64) -> Result<String, JsValue> {
    let (outcome, base) = with_app(|app| {
        let outcome = app
            .session
            .click(&app.host, ScreenPoint::new(x, y))
            .map_err(exhibit_err)?;
        Ok((outcome, app.api_base.clone()))
    })?;
    match &outcome {
        ClickOutcome::Placed { lookup } | ClickOutcome::Moved { lookup } => {
            spawn_elevation_lookup(base, *lookup);
        }
        ClickOutcome::Ignored | ClickOutcome::Selected { .. } => {}
    }
    to_json(&outcome)
}

// The placement already stands on its provisional surface; this only refines it.
fn spawn_elevation_lookup(base: String, lookup: ElevationLookup) {
    spawn_local(async move {
        let elevation = match net::fetch_elevation(&base, lookup.at.lat, lookup.at.lng).await {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(id = %lookup.id, "elevation lookup failed: {err}");
                None
            }
        };
        let applied =
            with_app(|app| Ok(app.session.apply_elevation(lookup, elevation))).unwrap_or(false);
        if applied {
            notify_change();
        }
    });
}

/// Starts a postcard of the visited landmark, cancelling any earlier one.
#[wasm_bindgen]
pub fn make_postcard() -> Result<u32, JsValue> {
    let (ticket, request, base, signal) = with_app(|app| {
        let (ticket, request, superseded) =
            app.session.begin_postcard(&app.host).map_err(exhibit_err)?;
        abort_postcard(app, superseded);
        let controller = AbortController::new()?;
        let signal = controller.signal();
        app.postcard_abort = Some((ticket, controller));
        Ok((ticket, request, app.api_base.clone(), signal))
    })?;

    spawn_local(async move {
        let result = net::fetch_postcard(&base, &request, Some(&signal)).await;
        let accepted = with_app(|app| {
            if app.postcard_abort.as_ref().is_some_and(|(t, _)| *t == ticket) {
                app.postcard_abort = None;
            }
            Ok(app.session.complete_postcard(ticket, result))
        })
        .unwrap_or(false);
        if accepted {
            notify_change();
        }
    });
    Ok(ticket.get() as u32)
}

#[wasm_bindgen]
pub fn dismiss_postcard() -> Result<(), JsValue> {
    with_app(|app| {
        let aborted = app.session.dismiss_postcard();
        abort_postcard(app, aborted);
        Ok(())
    })
}

/// `idle`, `pending`, `ready`, or `unavailable: <reason>`.
#[wasm_bindgen]
pub fn postcard_status() -> Result<String, JsValue> {
    with_app(|app| {
        Ok(match app.session.postcard_state() {
            PostcardState::Idle => "idle".to_string(),
            PostcardState::Pending { .. } => "pending".to_string(),
            PostcardState::Ready { .. } => "ready".to_string(),
            PostcardState::Unavailable { reason, .. } => format!("unavailable: {reason}"),
        })
    })
}

#[wasm_bindgen]
pub fn postcard_image() -> Result<Option<Vec<u8>>, JsValue> {
    with_app(|app| {
        Ok(match app.session.postcard_state() {
            PostcardState::Ready { image, .. } => Some(image.data.clone()),
            _ => None,
        })
    })
}

#[wasm_bindgen]
pub fn postcard_content_type() -> Result<Option<String>, JsValue> {
    with_app(|app| {
        Ok(match app.session.postcard_state() {
            PostcardState::Ready { image, .. } => Some(image.content_type.clone()),
            _ => None,
        })
    })
}

#[wasm_bindgen]
pub fn landmarks_json() -> Result<String, JsValue> {
    with_app(|app| to_json(&app.session.landmarks().iter().collect::<Vec<_>>()))
}

#[wasm_bindgen]
pub fn ledger_json() -> Result<String, JsValue> {
    with_app(|app| to_json(&app.session.ledger()))
}

#[wasm_bindgen]
pub fn mode_json() -> Result<String, JsValue> {
    with_app(|app| to_json(&app.session.mode()))
}

#[wasm_bindgen]
pub fn hover_json() -> Result<String, JsValue> {
    with_app(|app| to_json(&app.session.hover()))
}

/// Diagnostics entries since the last drain.
#[wasm_bindgen]
pub fn drain_journal_json() -> Result<String, JsValue> {
    with_app(|app| to_json(&app.session.drain_journal()))
}
