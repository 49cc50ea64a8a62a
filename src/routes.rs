use crate::{
    api::{attendance, correction, notification, policy, shift},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes. Literal segments are registered before the {id}
    // catch-alls so /corrections/pending does not resolve as an id.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance/clock-in, /attendance/clock-out
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out").route(web::post().to(attendance::clock_out)),
                    )
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::list_attendance)))
                    // /attendance/me/today
                    .service(
                        web::resource("/me/today")
                            .route(web::get().to(attendance::my_attendance_today)),
                    )
                    // /attendance/employee/{employee_id}
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(attendance::attendance_by_employee)),
                    )
                    // /attendance/{record_id}
                    .service(
                        web::resource("/{record_id}")
                            .route(web::get().to(attendance::get_attendance)),
                    )
                    // /attendance/{record_id}/correct
                    .service(
                        web::resource("/{record_id}/correct")
                            .route(web::put().to(attendance::correct_attendance)),
                    ),
            )
            .service(
                web::scope("/corrections")
                    // /corrections
                    .service(
                        web::resource("")
                            .route(web::post().to(correction::create_correction_request))
                            .route(web::get().to(correction::list_correction_requests)),
                    )
                    // /corrections/pending
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(correction::pending_correction_requests)),
                    )
                    // /corrections/me
                    .service(
                        web::resource("/me")
                            .route(web::get().to(correction::my_correction_requests)),
                    )
                    // /corrections/{request_id}
                    .service(
                        web::resource("/{request_id}")
                            .route(web::get().to(correction::get_correction_request)),
                    )
                    // /corrections/{request_id}/review
                    .service(
                        web::resource("/{request_id}/review")
                            .route(web::put().to(correction::review_correction_request)),
                    ),
            )
            .service(
                web::scope("/settings")
                    // /settings/punch-policy
                    .service(
                        web::resource("/punch-policy")
                            .route(web::get().to(policy::get_punch_policy))
                            .route(web::put().to(policy::update_punch_policy)),
                    ),
            )
            .service(
                web::scope("/shifts")
                    // /shifts
                    .service(
                        web::resource("")
                            .route(web::post().to(shift::assign_shift))
                            .route(web::get().to(shift::list_shifts)),
                    )
                    // /shifts/employee/{employee_id}
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(shift::shifts_by_employee)),
                    )
                    // /shifts/{assignment_id}
                    .service(
                        web::resource("/{assignment_id}")
                            .route(web::get().to(shift::get_shift))
                            .route(web::put().to(shift::update_shift))
                            .route(web::delete().to(shift::delete_shift)),
                    )
                    // /shifts/{assignment_id}/status
                    .service(
                        web::resource("/{assignment_id}/status")
                            .route(web::put().to(shift::update_shift_status)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    // /notifications
                    .service(
                        web::resource("").route(web::get().to(notification::list_notifications)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
