pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;

use crate::core::enrollment::EnrollmentService;
use crate::core::EnrollmentRepository;
use crate::utils::error::Result;

pub fn router<R: EnrollmentRepository + 'static>(service: Arc<EnrollmentService<R>>) -> Router {
    Router::new()
        .route(
            "/enrollments",
            get(handlers::list::<R>).post(handlers::create::<R>),
        )
        .route("/enrollments/roster", get(handlers::roster::<R>))
        .route("/enrollments/add-student", post(handlers::add_student::<R>))
        .route(
            "/enrollments/{id}",
            get(handlers::details::<R>)
                .put(handlers::edit::<R>)
                .delete(handlers::remove::<R>),
        )
        .route(
            "/students/search",
            get(handlers::search_students::<R>).post(handlers::search_students_form::<R>),
        )
        .route("/lookups", get(handlers::lookups::<R>))
        .layer(middleware::from_fn(log_requests))
        .with_state(service)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        "{} {} -> {} ({:?})",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

pub async fn serve<R: EnrollmentRepository + 'static>(
    service: Arc<EnrollmentService<R>>,
    addr: SocketAddr,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
