use actix_web::{HttpResponse, http::header::ContentType, web};
use tera::Tera;

use crate::configuration::DeliveryConfiguration;

use super::helpers::{e500, render_page};

/// The coming-soon landing page with the waitlist form.
pub async fn home(
    templates: web::Data<Tera>,
    delivery: web::Data<DeliveryConfiguration>,
) -> Result<HttpResponse, actix_web::Error> {
    // the startup warning already reported what is missing
    let config_valid = delivery.missing_identifiers().is_empty();
    let page = render_page(&templates, "landing.html", &[("config_valid", config_valid)])
        .map_err(e500)?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page))
}
