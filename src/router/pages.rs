//! # Handlers de la colección
//! src/router/pages.rs
//!
//! Cada handler retorna `Err` solo por fallos del backend; los errores del
//! cliente (400, 404) ya salen como `Response`.

use super::{id_param, lookup, CONTENT_PARAM};
use crate::html;
use crate::http::{Response, StatusCode};
use crate::ids::new_page_id;
use crate::store::{PageStore, StoreError};
use std::collections::HashMap;

/// GET /html → listado ordenado por id
pub fn list_pages(store: &dyn PageStore, collection: &str) -> Result<Response, StoreError> {
    let pages = store.list()?;
    Ok(Response::html(
        StatusCode::Ok,
        &html::listing_page(collection, &pages),
    ))
}

/// GET /html?uuid=ID → contenido guardado
pub fn get_page(store: &dyn PageStore, id: &str) -> Result<Response, StoreError> {
    match store.get(id)? {
        Some(content) => Ok(Response::html(StatusCode::Ok, &content)),
        None => Ok(not_found(id)),
    }
}

/// POST /html
///
/// - Sin `content` (o en blanco) → 400
/// - Sin id → se genera uno nuevo → 201
/// - Con id → upsert: 200 si existía, 201 si es nueva
pub fn post_page(
    store: &dyn PageStore,
    collection: &str,
    params: &HashMap<String, String>,
) -> Result<Response, StoreError> {
    let content = match lookup(params, &[CONTENT_PARAM, collection]) {
        Some(content) => content,
        None => {
            return Ok(Response::error(
                StatusCode::BadRequest,
                &format!("Falta el parámetro {}", CONTENT_PARAM),
            ))
        }
    };

    let (id, created) = match id_param(params) {
        Some(id) => {
            let existed = store.put(id, content)?;
            (id.to_string(), !existed)
        }
        None => {
            let id = new_page_id();
            store.put(&id, content)?;
            (id, true)
        }
    };

    let status = if created { StatusCode::Created } else { StatusCode::Ok };
    let mut response = Response::html(status, &html::stored_page(collection, &id, created));
    if created {
        response.add_header("Location", &html::page_href(collection, &id));
    }

    Ok(response)
}

/// DELETE /html?uuid=ID
pub fn delete_page(
    store: &dyn PageStore,
    params: &HashMap<String, String>,
) -> Result<Response, StoreError> {
    let id = match id_param(params) {
        Some(id) => id,
        None => return Ok(Response::error(StatusCode::BadRequest, "Falta el parámetro uuid")),
    };

    match store.remove(id)? {
        Some(_) => Ok(Response::html(StatusCode::Ok, &html::deleted_page(id))),
        None => Ok(not_found(id)),
    }
}

fn not_found(id: &str) -> Response {
    Response::error(StatusCode::NotFound, &format!("Página no encontrada: {}", id))
}
