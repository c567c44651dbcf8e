use actix_web::HttpResponse;
use uuid::Uuid;

#[tracing::instrument(name = "Health check", fields(request_id = %Uuid::new_v4()))]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
