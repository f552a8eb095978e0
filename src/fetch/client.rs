use async_trait::async_trait;
use reqwest::{Request, Response};

/// Minimal HTTP seam so feed retrieval can be swapped out in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
