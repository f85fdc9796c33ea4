use super::context::RequestContext;
use crate::error::{StorefrontError, StorefrontResult};
use crate::logging;
use crate::permissions::Access;
use actix_web::{web, HttpResponse};
use futures_util::stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// Buffered log lines, oldest first.
pub async fn list_logs(ctx: RequestContext) -> StorefrontResult<HttpResponse> {
    ctx.allows(Access::IsAdminUser)?;
    Ok(HttpResponse::Ok().json(logging::get_logs()))
}

/// New log lines as server-sent events.
pub async fn stream_logs(ctx: RequestContext) -> StorefrontResult<HttpResponse> {
    ctx.allows(Access::IsAdminUser)?;
    let rx = logging::subscribe()
        .ok_or_else(|| StorefrontError::Config("Log streaming not available".to_string()))?;
    // Lagged receivers skip the missed lines.
    let stream = BroadcastStream::new(rx).filter_map(|msg| async move {
        msg.ok().map(|line| {
            Ok::<web::Bytes, actix_web::Error>(web::Bytes::from(format!("data: {}\n\n", line)))
        })
    });
    Ok(HttpResponse::Ok()
        .insert_header(("Content-Type", "text/event-stream"))
        .streaming(stream))
}
