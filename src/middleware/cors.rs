//! CORS middleware.
//!
//! Answers preflight `OPTIONS` requests directly with `204 No Content` and
//! stamps the allowed-origin header on every other response. Allowed
//! methods are restricted to what the configuration names (POST for this
//! service).

use crate::config::CorsConfig;
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{
        Method,
        header::{HeaderName, HeaderValue},
    },
};
use std::{
    future::{Ready, ready},
    pin::Pin,
};

/// CORS middleware factory
pub struct Cors {
    config: CorsConfig,
}

impl Cors {
    /// Create a new CORS middleware with the given configuration
    pub fn new(config: CorsConfig) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsService {
            service,
            config: self.config.clone(),
        }))
    }
}

/// The actual CORS middleware service
pub struct CorsService<S> {
    service: S,
    config: CorsConfig,
}

impl<S, B> Service<ServiceRequest> for CorsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let config = self.config.clone();

        // Preflight requests are answered here without touching handlers.
        if req.method() == Method::OPTIONS {
            let (req, _payload) = req.into_parts();
            let mut builder = HttpResponse::NoContent();
            builder.insert_header((
                "Access-Control-Allow-Origin",
                config.allowed_origin.clone(),
            ));
            builder.insert_header((
                "Access-Control-Allow-Methods",
                config.allowed_methods.clone(),
            ));
            builder.insert_header((
                "Access-Control-Allow-Headers",
                config.allowed_headers.clone(),
            ));
            builder.insert_header(("Access-Control-Max-Age", config.max_age_seconds.to_string()));
            let res = builder.finish().map_into_right_body();

            return Box::pin(async move { Ok(ServiceResponse::new(req, res)) });
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            if let Ok(value) = HeaderValue::from_str(&config.allowed_origin) {
                res.headers_mut()
                    .insert(HeaderName::from_static("access-control-allow-origin"), value);
            }

            Ok(res.map_into_left_body())
        })
    }
}
