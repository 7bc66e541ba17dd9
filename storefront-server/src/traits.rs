// storefront-server/src/traits.rs
use std::future::Future;
use std::pin::Pin;

/// Turns one raw request body into an optional response body.
pub trait MessageHandler: Send + Sync {
    fn handle_message<'a>(
        &'a self,
        message: String,
        client_id: String,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
}
