//! # Plantillas HTML
//! src/html.rs
//!
//! Todas las páginas que genera el servidor (bienvenida, listado,
//! confirmaciones y errores) salen de este módulo.

use crate::http::codec::percent_encode;
use crate::http::StatusCode;
use crate::store::Page;

/// Marca presente en la página de bienvenida
pub const WELCOME_MARKER: &str = "Page Server";

/// Texto del listado cuando no hay páginas
pub const NO_PAGES_MARKER: &str = "No hay páginas almacenadas.";

/// Escapa `& < > " '` para insertar texto en HTML
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// URL relativa de una página: `/<collection>?uuid=<id>`
pub fn page_href(collection: &str, id: &str) -> String {
    format!("/{}?uuid={}", collection, percent_encode(id))
}

/// `<a href="/html?uuid=ID">ID</a>`
pub fn page_link(collection: &str, id: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape(&page_href(collection, id)),
        escape(id)
    )
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        escape(title),
        body
    )
}

/// Página estática de la raíz
pub fn welcome_page(collection: &str) -> String {
    document(
        WELCOME_MARKER,
        &format!(
            "<h1>{}</h1><p>Bienvenido. Las páginas están en <a href=\"/{}\">/{}</a>.</p>",
            WELCOME_MARKER,
            escape(collection),
            escape(collection)
        ),
    )
}

/// Listado de páginas, en el orden recibido
pub fn listing_page(collection: &str, pages: &[Page]) -> String {
    let mut body = String::from("<h1>Páginas disponibles</h1>");

    if pages.is_empty() {
        body.push_str("<p>");
        body.push_str(NO_PAGES_MARKER);
        body.push_str("</p>");
    } else {
        body.push_str("<ul>");
        for page in pages {
            body.push_str("<li>");
            body.push_str(&page_link(collection, &page.id));
            body.push_str("</li>");
        }
        body.push_str("</ul>");
    }

    document("Listado de páginas", &body)
}

/// Confirmación de un POST
pub fn stored_page(collection: &str, id: &str, created: bool) -> String {
    let action = if created { "creada" } else { "actualizada" };
    document(
        "Página guardada",
        &format!(
            "<h1>Página {}</h1><p>{}</p>",
            action,
            page_link(collection, id)
        ),
    )
}

/// Confirmación de un DELETE
pub fn deleted_page(id: &str) -> String {
    document(
        "Página eliminada",
        &format!("<h1>Página eliminada</h1><p>uuid={}</p>", escape(id)),
    )
}

/// Página de error uniforme: código, razón y mensaje
///
/// # Ejemplo
/// ```
/// use page_server::html::error_page;
/// use page_server::http::StatusCode;
///
/// let body = error_page(StatusCode::NotFound, "Página no encontrada");
/// assert!(body.contains("<h1>404 Not Found</h1>"));
/// ```
pub fn error_page(status: StatusCode, message: &str) -> String {
    document(
        &status.to_string(),
        &format!(
            "<h1>{} {}</h1><p>{}</p>",
            status.as_u16(),
            status.reason_phrase(),
            escape(message)
        ),
    )
}
