// Admin session tokens and the middleware that checks them
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, IssuedToken, JwtValidator, ADMIN_ROLE};
pub use middleware::AuthMiddleware;
