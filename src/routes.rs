use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, guard, http::Method, web};
use serde::de::DeserializeOwned;

use crate::backend::remote::API_KEY_HEADER;
use crate::error::GpioError;
use crate::gpio::{GpioBackend, GpioManager, SetupRequest};
use crate::protocol::{
    Envelope, ServiceInfo, StateRequest, StatusReport, WirePinInfo, pin_levels,
};

pub struct AppState<B: GpioBackend> {
    pub manager: Arc<GpioManager<B>>,
}

impl<B: GpioBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<B: GpioBackend> AppState<B> {
    fn authorize(&self, req: &HttpRequest) -> Result<(), GpioError> {
        let Some(expected) = self.manager.config().http.api_key.as_deref() else {
            return Ok(());
        };

        match req.headers().get(API_KEY_HEADER) {
            Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
            Some(_) => Err(GpioError::Unauthorized("invalid API key".into())),
            None => Err(GpioError::Unauthorized("missing X-API-Key header".into())),
        }
    }
}

impl<B: GpioBackend + 'static> AppState<B> {
    pub fn api_scope(&self, base_path: &str) -> actix_web::Scope {
        web::scope(base_path)
            .service(
                web::resource("/")
                    .route(web::get().to(index::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/status")
                    .route(web::get().to(status::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins")
                    .route(web::get().to(list_pins::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins/{pin_id}")
                    .route(web::get().to(get_pin::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::GET]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins/{pin_id}/setup")
                    .route(web::post().to(setup_pin::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins/{pin_id}/state")
                    .route(web::post().to(set_state::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/pins/{pin_id}/cleanup")
                    .route(web::post().to(cleanup_pin::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .service(
                web::resource("/cleanup")
                    .route(web::post().to(cleanup_all::<B>))
                    .route(
                        web::route()
                            .guard(guard_not_methods(&[Method::POST]))
                            .to(method_not_allowed),
                    ),
            )
            .default_service(web::to(not_found))
    }
}

async fn index<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, GpioError> {
    state.authorize(&req)?;
    let info = ServiceInfo::for_backend(state.manager.backend_kind());

    Ok(web::Json(Envelope::success(info)))
}

async fn status<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, GpioError> {
    state.authorize(&req)?;
    let manager = &state.manager;
    let report = StatusReport {
        initialized: manager.is_initialized(),
        backend: manager.backend_kind(),
        remote: manager.is_remote(),
        mode: manager.numbering_mode().to_string(),
        pins: pin_levels(manager.all_pin_states().await),
    };

    Ok(web::Json(Envelope::success(report)))
}

async fn list_pins<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, GpioError> {
    state.authorize(&req)?;
    let pins = state.manager.configured_pins().await?;

    Ok(web::Json(Envelope::success(pin_levels(pins))))
}

async fn get_pin<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, GpioError> {
    state.authorize(&req)?;
    let pin = parse_pin_id(&req)?;

    pin_info_response(&state, pin).await
}

async fn setup_pin<B: GpioBackend + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, GpioError> {
    state.authorize(&req)?;
    let pin = parse_pin_id(&req)?;
    let request: SetupRequest = parse_json_payload(&body)
        .map_err(|e| GpioError::InvalidPayload(format!("setup: {e}")))?;

    state.manager.setup(pin, &request).await?;

    pin_info_response(&state, pin).await
}

async fn set_state<B: GpioBackend + 'static>(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, GpioError> {
    state.authorize(&req)?;
    let pin = parse_pin_id(&req)?;
    let request: StateRequest = parse_json_payload(&body)
        .map_err(|e| GpioError::InvalidPayload(format!("state: {e}")))?;

    state.manager.output(pin, request.state).await?;

    pin_info_response(&state, pin).await
}

async fn cleanup_pin<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, GpioError> {
    state.authorize(&req)?;
    let pin = parse_pin_id(&req)?;

    state.manager.cleanup(Some(pin)).await?;

    Ok(web::Json(Envelope::done(format!("Pin {pin} cleaned up"))))
}

async fn cleanup_all<B: GpioBackend + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<B>>,
) -> Result<impl Responder, GpioError> {
    state.authorize(&req)?;
    state.manager.cleanup(None).await?;

    Ok(web::Json(Envelope::done("All pins cleaned up")))
}

async fn pin_info_response<B: GpioBackend + 'static>(
    state: &AppState<B>,
    pin: u32,
) -> Result<web::Json<Envelope<WirePinInfo>>, GpioError> {
    let info = state
        .manager
        .pin_info(pin)
        .await?
        .ok_or(GpioError::NotConfigured(pin))?;

    Ok(web::Json(Envelope::success(WirePinInfo::from(&info))))
}

fn parse_pin_id(req: &HttpRequest) -> Result<u32, GpioError> {
    let pin_id = req
        .match_info()
        .get("pin_id")
        .ok_or_else(|| GpioError::InvalidPin("Missing pin id".into()))?;
    let pin_id = pin_id
        .parse::<u32>()
        .map_err(|_| GpioError::InvalidPin(format!("{pin_id:?} is not a pin number")))?;

    Ok(pin_id)
}

/// An empty body reads as `{}` so that a missing field is what gets reported.
fn parse_json_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"{}");
    }
    serde_json::from_slice(body)
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(Envelope::error("Not found"))
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(Envelope::error("Method not allowed"))
}

fn guard_not_methods(methods: &[Method]) -> impl guard::Guard {
    let allowed: Vec<Method> = methods.to_vec();
    guard::fn_guard(move |ctx| !allowed.iter().any(|m| m == ctx.head().method))
}
