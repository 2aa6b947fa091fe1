use crate::{
    api::{attendance, process, report},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
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
            .per_millisecond(per_ms.max(1))
            .burst_size(requests_per_min.max(1))
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap_or_default();
        Governor::new(&cfg)
    }

    let process_limiter = Arc::new(build_limiter(config.rate_process_per_min));
    let query_limiter = Arc::new(build_limiter(config.rate_query_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            // /process
            .service(
                web::resource("/process")
                    .wrap(process_limiter)
                    .route(web::post().to(process::process_upload)),
            )
            // /search
            .service(
                web::resource("/search")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(attendance::search_records)),
            )
            // /employees
            .service(
                web::resource("/employees")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(attendance::list_employees)),
            )
            // /employees/{employee_id}/dashboard
            .service(
                web::resource("/employees/{employee_id}/dashboard")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(attendance::get_dashboard)),
            )
            // /summary
            .service(
                web::resource("/summary")
                    .wrap(query_limiter.clone())
                    .route(web::get().to(report::get_summary)),
            )
            // /report/latest
            .service(
                web::resource("/report/latest")
                    .wrap(query_limiter)
                    .route(web::get().to(report::download_latest)),
            )
            // /health is never throttled
            .service(web::resource("/health").route(web::get().to(report::health))),
    );
}
