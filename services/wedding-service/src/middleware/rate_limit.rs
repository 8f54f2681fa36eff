use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    Error, ResponseError,
};
use common::config::RateLimitConfig;
use common::AppError;
use futures_util::future::LocalBoxFuture;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::sync::{Arc, Mutex};
use std::time::Instant;

// Buckets are pruned once the map grows past this many keys.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, capacity: f64, refill_rate: f64, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_refill = now;
    }

    /// Takes one token, or returns the whole seconds until one is available.
    fn try_consume(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> Result<(), u64> {
        self.refill(capacity, refill_rate, now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let needed = 1.0 - self.tokens;
            Err((needed / refill_rate).ceil().max(1.0) as u64)
        }
    }

    fn is_full(&self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens + elapsed * refill_rate >= capacity
    }
}

#[derive(Debug)]
struct Buckets {
    capacity: f64,
    refill_rate: f64,
    by_key: HashMap<String, TokenBucket>,
}

impl Buckets {
    fn check(&mut self, key: &str, now: Instant) -> Result<(), u64> {
        if self.by_key.len() > PRUNE_THRESHOLD {
            let (capacity, refill_rate) = (self.capacity, self.refill_rate);
            self.by_key.retain(|_, b| !b.is_full(capacity, refill_rate, now));
        }

        let capacity = self.capacity;
        self.by_key
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(capacity, now))
            .try_consume(self.capacity, self.refill_rate, now)
    }
}

/// Per client-and-path token bucket for the public submission endpoints.
/// Reads pass through untouched.
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<Buckets>>,
    trust_forwarded: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(Buckets {
                capacity: config.burst,
                refill_rate: config.per_second,
                by_key: HashMap::new(),
            })),
            trust_forwarded: config.trust_forwarded,
        }
    }

    fn check(&self, key: &str) -> Result<(), u64> {
        match self.buckets.lock() {
            Ok(mut buckets) => buckets.check(key, Instant::now()),
            Err(poisoned) => poisoned.into_inner().check(key, Instant::now()),
        }
    }

    fn client_ip(&self, req: &ServiceRequest) -> String {
        let forwarded = if self.trust_forwarded {
            forwarded_ip(req)
        } else {
            None
        };

        forwarded
            .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn header<'a>(req: &'a ServiceRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|h| h.to_str().ok())
}

// X-Real-IP, then the first X-Forwarded-For hop.
fn forwarded_ip(req: &ServiceRequest) -> Option<String> {
    header(req, "X-Real-IP")
        .map(str::trim)
        .or_else(|| {
            header(req, "X-Forwarded-For")
                .and_then(|s| s.split(',').next())
                .map(str::trim)
        })
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == Method::GET || req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let ip = self.limiter.client_ip(&req);
        let key = format!("{}:{}", ip, req.path());

        if let Err(retry_after) = self.limiter.check(&key) {
            tracing::warn!(%ip, path = req.path(), retry_after, "rate limit exceeded");
            let response = AppError::RateLimited { retry_after }
                .error_response()
                .map_into_right_body();
            return Box::pin(async move { Ok(req.into_response(response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}
