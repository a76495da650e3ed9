use crate::{
    api::{attendance, delivery, employee, finance, inventory, leave_request, status, user},
    auth::{handlers, middleware::api_guard},
    config::Config,
    error::ApiError,
    store::Stores,
    utils::email_cache::EmailCache,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, middleware::from_fn, web};
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters for login and registration. Built once and shared by every
/// worker so the quota is per process, not per worker.
#[derive(Clone)]
pub struct RateLimiters {
    login: Limiter,
    register: Limiter,
}

impl RateLimiters {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min)?),
            register: Arc::new(build_limiter(config.rate_register_per_min)?),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / u64::from(requests_per_min);

    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} requests/min"))?;

    Ok(Governor::new(&cfg))
}

/// Everything the routes need, cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub stores: Stores,
    pub emails: EmailCache,
    pub limiters: RateLimiters,
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Result<Self> {
        let limiters = RateLimiters::new(&config)?;

        Ok(Self {
            config,
            stores,
            emails: EmailCache::default(),
            limiters,
        })
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(format!("Invalid request body: {err}")).into())
}

/// Non-numeric ids never match a record.
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| ApiError::NotFound("Resource not found".into()).into())
}

async fn fallback() -> actix_web::Result<HttpResponse> {
    Err(ApiError::NotFound("Route not found".into()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    let prefix = state.config.api_prefix.as_str();
    let limiters = &state.limiters;

    cfg.app_data(web::Data::new(state.config.clone()))
        .app_data(web::Data::new(state.emails.clone()))
        .app_data(json_config())
        .app_data(path_config());
    state.stores.register(cfg);

    // Public routes
    cfg.service(web::resource(format!("{prefix}/status")).route(web::get().to(status::api_status)))
        .service(
            web::scope(&format!("{prefix}/auth"))
                .service(
                    web::resource("/login")
                        .wrap(limiters.login.clone())
                        .route(web::post().to(handlers::login)),
                )
                .service(
                    web::resource("/register")
                        .wrap(limiters.register.clone())
                        .route(web::post().to(handlers::register)),
                )
                .service(web::resource("/logout").route(web::post().to(handlers::logout)))
                .service(web::resource("/session").route(web::get().to(handlers::session))),
        );

    // Protected routes
    cfg.service(
        web::scope(prefix)
            .wrap(from_fn(api_guard))
            .service(
                web::scope("/users")
                    .service(
                        web::resource("")
                            .route(web::get().to(user::list_users))
                            .route(web::post().to(user::create_user)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::scope("/inventory")
                    // specific routes before /{id}
                    .service(
                        web::resource("/categories").route(web::get().to(inventory::category_stats)),
                    )
                    .service(
                        web::resource("/category/{category}")
                            .route(web::get().to(inventory::items_by_category)),
                    )
                    .service(
                        web::resource("/alerts/low-stock")
                            .route(web::get().to(inventory::low_stock_alerts)),
                    )
                    .service(
                        web::resource("")
                            .route(web::get().to(inventory::list_items))
                            .route(web::post().to(inventory::create_item)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(inventory::get_item))
                            .route(web::put().to(inventory::update_item))
                            .route(web::delete().to(inventory::delete_item)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("/attendance")
                            .route(web::post().to(attendance::record_attendance)),
                    )
                    .service(
                        web::resource("/attendance/{employee_id}")
                            .route(web::get().to(attendance::attendance_for_employee)),
                    )
                    .service(
                        web::resource("/leave").route(web::post().to(leave_request::create_leave)),
                    )
                    // GET takes an employee id, PUT a request id
                    .service(
                        web::resource("/leave/{id}")
                            .route(web::get().to(leave_request::leave_for_employee))
                            .route(web::put().to(leave_request::update_leave)),
                    )
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/delivery")
                    .service(
                        web::resource("/driver/{driver_id}")
                            .route(web::get().to(delivery::deliveries_by_driver)),
                    )
                    .service(
                        web::resource("")
                            .route(web::get().to(delivery::list_deliveries))
                            .route(web::post().to(delivery::create_delivery)),
                    )
                    .service(
                        web::resource("/{id}/assign").route(web::put().to(delivery::assign_driver)),
                    )
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(delivery::update_delivery_status)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(delivery::get_delivery))
                            .route(web::put().to(delivery::update_delivery))
                            .route(web::delete().to(delivery::delete_delivery)),
                    ),
            )
            .service(
                web::scope("/finance")
                    .service(
                        web::resource("/invoices")
                            .route(web::get().to(finance::list_invoices))
                            .route(web::post().to(finance::create_invoice)),
                    )
                    .service(
                        web::resource("/invoices/{id}")
                            .route(web::get().to(finance::get_invoice))
                            .route(web::put().to(finance::update_invoice))
                            .route(web::delete().to(finance::delete_invoice)),
                    )
                    .service(
                        web::resource("/salary")
                            .route(web::get().to(finance::list_salaries))
                            .route(web::post().to(finance::create_salary)),
                    )
                    .service(
                        web::resource("/salary/{id}").route(web::get().to(finance::get_salary)),
                    )
                    .service(
                        web::resource("/reports").route(web::get().to(finance::financial_reports)),
                    ),
            ),
    );

    // Pages are rendered elsewhere; anything the gate lets through ends here.
    cfg.default_service(web::to(fallback));
}
