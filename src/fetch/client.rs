use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes HTTP requests. Implemented by [`super::BasicClient`]; tests and
/// callers needing auth or proxies can supply their own.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
