//! # Dispatcher
//! src/router/mod.rs
//!
//! Mapea `(método, path, parámetros)` a una operación del almacén y a un
//! código de estado.
//!
//! ## Rutas
//!
//! ```text
//! /                         → 200 bienvenida (sin tocar el almacén)
//! /<otra cosa>              → 404
//! GET    /html              → 200 listado
//! GET    /html?uuid=ID      → 200 contenido | 404
//! POST   /html content=...  → 201 id nuevo | 400 sin contenido
//! POST   /html uuid=ID&...  → 200 reemplazada | 201 creada
//! DELETE /html?uuid=ID      → 200 | 404 | 400 sin uuid
//! otros métodos             → 405
//! ```
//!
//! Un fallo del backend en cualquier rama se convierte en 500.

pub mod pages;

use crate::html;
use crate::http::{Method, Request, Response, StatusCode};
use crate::store::PageStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Nombres aceptados para el parámetro id (el primero es el canónico)
pub const ID_PARAMS: [&str; 2] = ["uuid", "id"];

/// Parámetro canónico del contenido; el nombre de la colección es un alias
pub const CONTENT_PARAM: &str = "content";

/// Métodos atendidos, para el header `Allow`
pub const ALLOWED_METHODS: &str = "GET, POST, DELETE";

/// Dispatcher ligado a una colección y a un almacén
#[derive(Clone)]
pub struct Dispatcher {
    collection: String,
    store: Arc<dyn PageStore>,
}

impl Dispatcher {
    /// Crea un dispatcher para la colección `collection` (ej: "html")
    pub fn new(collection: &str, store: Arc<dyn PageStore>) -> Self {
        Self {
            collection: collection.to_string(),
            store,
        }
    }

    /// Nombre de la colección
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Resuelve un request completo y agrega los headers comunes
    ///
    /// # Ejemplo
    /// ```
    /// use page_server::http::{Request, StatusCode};
    /// use page_server::router::Dispatcher;
    /// use page_server::store::MemoryStore;
    /// use std::sync::Arc;
    ///
    /// let dispatcher = Dispatcher::new("html", Arc::new(MemoryStore::new()));
    /// let request = Request::parse(b"GET /html HTTP/1.1\r\n\r\n").unwrap();
    ///
    /// assert_eq!(dispatcher.route(&request).status(), StatusCode::Ok);
    /// ```
    pub fn route(&self, request: &Request) -> Response {
        let mut response = dispatch(
            &self.collection,
            request.method(),
            request.path(),
            request.params(),
            self.store.as_ref(),
        );
        add_common_headers(&mut response);
        response
    }
}

/// Función pura de enrutamiento
///
/// No guarda estado propio: todo lo que necesita llega por parámetro.
pub fn dispatch(
    collection: &str,
    method: Method,
    path: &str,
    params: &HashMap<String, String>,
    store: &dyn PageStore,
) -> Response {
    if path.is_empty() || path == "/" {
        return Response::html(StatusCode::Ok, &html::welcome_page(collection));
    }

    if first_segment(path) != collection {
        return Response::error(StatusCode::NotFound, &format!("Recurso desconocido: {}", path));
    }

    let result = match method {
        Method::GET => match id_param(params) {
            Some(id) => pages::get_page(store, id),
            None => pages::list_pages(store, collection),
        },
        Method::POST => pages::post_page(store, collection, params),
        Method::DELETE => pages::delete_page(store, params),
        other => {
            return Response::error(
                StatusCode::MethodNotAllowed,
                &format!("Método no permitido: {}", other),
            )
            .with_header("Allow", ALLOWED_METHODS);
        }
    };

    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, method = %method, path, "store failure");
        Response::error(StatusCode::InternalServerError, "Error del almacenamiento")
    })
}

/// Agrega headers comunes a todas las respuestas
pub fn add_common_headers(response: &mut Response) {
    response.add_header("Server", "page_server");
    response.add_header("Connection", "close");
}

/// Primer segmento del path: "/html/x" → "html"
fn first_segment(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or("")
}

/// Primer valor no vacío entre los nombres dados
pub(crate) fn lookup<'a>(params: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| params.get(*name))
        .map(|value| value.as_str())
        .find(|value| !value.trim().is_empty())
}

/// Id pedido por el cliente, sin espacios alrededor
pub(crate) fn id_param(params: &HashMap<String, String>) -> Option<&str> {
    lookup(params, &ID_PARAMS).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Page, StoreError};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run(store: &dyn PageStore, method: Method, path: &str, pairs: &[(&str, &str)]) -> Response {
        dispatch("html", method, path, &params(pairs), store)
    }

    /// Backend que siempre falla (o entra en pánico si se le llama)
    struct FailingStore {
        panic_on_use: bool,
    }

    impl FailingStore {
        fn fail(&self) -> StoreError {
            if self.panic_on_use {
                panic!("store should not be touched");
            }
            StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "db down"))
        }
    }

    impl PageStore for FailingStore {
        fn get(&self, _id: &str) -> Result<Option<String>, StoreError> {
            Err(self.fail())
        }
        fn put(&self, _id: &str, _content: &str) -> Result<bool, StoreError> {
            Err(self.fail())
        }
        fn remove(&self, _id: &str) -> Result<Option<String>, StoreError> {
            Err(self.fail())
        }
        fn list(&self) -> Result<Vec<Page>, StoreError> {
            Err(self.fail())
        }
    }

    // ==================== Raíz y colección ====================

    #[test]
    fn test_root_is_welcome_without_store() {
        let untouchable = FailingStore { panic_on_use: true };

        for path in ["/", ""] {
            let response = run(&untouchable, Method::GET, path, &[]);
            assert_eq!(response.status(), StatusCode::Ok);
            assert!(response.body_text().contains(html::WELCOME_MARKER));
        }
    }

    #[test]
    fn test_unknown_collection_404() {
        let store = MemoryStore::new();
        for path in ["/xml", "/htmlx", "/HTML", "/static/html"] {
            let response = run(&store, Method::GET, path, &[]);
            assert_eq!(response.status(), StatusCode::NotFound, "path: {}", path);
        }
    }

    #[test]
    fn test_collection_with_trailing_segments() {
        let store = MemoryStore::new();
        let response = run(&store, Method::GET, "/html/extra", &[]);
        assert_eq!(response.status(), StatusCode::Ok);
    }

    // ==================== GET ====================

    #[test]
    fn test_get_listing_empty() {
        let store = MemoryStore::new();
        let response = run(&store, Method::GET, "/html", &[]);

        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.body_text().contains(html::NO_PAGES_MARKER));
    }

    #[test]
    fn test_get_listing_sorted_links() {
        let store = MemoryStore::with_pages([("b-id", "B"), ("a-id", "A")]);
        let body = run(&store, Method::GET, "/html", &[]).body_text();

        let a = body.find("<a href=\"/html?uuid=a-id\">a-id</a>").unwrap();
        let b = body.find("<a href=\"/html?uuid=b-id\">b-id</a>").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_get_blank_id_lists() {
        let store = MemoryStore::new();
        let response = run(&store, Method::GET, "/html", &[("uuid", "  ")]);
        assert!(response.body_text().contains(html::NO_PAGES_MARKER));
    }

    #[test]
    fn test_get_existing_page() {
        let store = MemoryStore::with_pages([("abc", "<h1>Hola</h1>")]);

        let first = run(&store, Method::GET, "/html", &[("uuid", "abc")]);
        let second = run(&store, Method::GET, "/html", &[("uuid", "abc")]);

        assert_eq!(first.status(), StatusCode::Ok);
        assert_eq!(first.body(), b"<h1>Hola</h1>");
        assert_eq!(first.body(), second.body());
    }

    #[test]
    fn test_get_id_alias() {
        let store = MemoryStore::with_pages([("abc", "x")]);
        let response = run(&store, Method::GET, "/html", &[("id", "abc")]);
        assert_eq!(response.body(), b"x");
    }

    #[test]
    fn test_get_missing_page_404() {
        let store = MemoryStore::new();
        let response = run(&store, Method::GET, "/html", &[("uuid", "nope")]);
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    // ==================== POST ====================

    #[test]
    fn test_post_without_content_400() {
        let store = MemoryStore::new();

        let missing = run(&store, Method::POST, "/html", &[]);
        let blank = run(&store, Method::POST, "/html", &[("content", " \t ")]);

        assert_eq!(missing.status(), StatusCode::BadRequest);
        assert_eq!(blank.status(), StatusCode::BadRequest);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_post_mints_id() {
        let store = MemoryStore::new();
        let response = run(&store, Method::POST, "/html", &[("content", "X")]);

        assert_eq!(response.status(), StatusCode::Created);
        let pages = store.list().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content, "X");
        assert!(response.body_text().contains(&pages[0].id));
        assert_eq!(
            response.header("Location"),
            Some(html::page_href("html", &pages[0].id).as_str())
        );
    }

    #[test]
    fn test_post_collection_name_as_content_alias() {
        let store = MemoryStore::new();
        let response = run(&store, Method::POST, "/html", &[("html", "<p>alias</p>")]);

        assert_eq!(response.status(), StatusCode::Created);
        assert_eq!(store.list().unwrap()[0].content, "<p>alias</p>");
    }

    #[test]
    fn test_post_content_stored_verbatim() {
        let store = MemoryStore::new();
        run(&store, Method::POST, "/html", &[("uuid", "v"), ("content", "  padded  ")]);
        assert_eq!(store.get("v").unwrap(), Some("  padded  ".to_string()));
    }

    #[test]
    fn test_post_upsert() {
        let store = MemoryStore::new();

        let created = run(&store, Method::POST, "/html", &[("uuid", "mine"), ("content", "v1")]);
        let replaced = run(&store, Method::POST, "/html", &[("uuid", "mine"), ("content", "v2")]);

        assert_eq!(created.status(), StatusCode::Created);
        assert_eq!(replaced.status(), StatusCode::Ok);
        assert!(replaced.header("Location").is_none());
        assert_eq!(store.get("mine").unwrap(), Some("v2".to_string()));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    // ==================== DELETE ====================

    #[test]
    fn test_delete_without_id_400() {
        let store = MemoryStore::new();
        let response = run(&store, Method::DELETE, "/html", &[]);
        assert_eq!(response.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_delete_unknown_404() {
        let store = MemoryStore::with_pages([("other", "x")]);
        let response = run(&store, Method::DELETE, "/html", &[("id", "unknown")]);

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_existing() {
        let store = MemoryStore::with_pages([("abc", "x")]);
        let response = run(&store, Method::DELETE, "/html", &[("uuid", "abc")]);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(store.get("abc").unwrap(), None);
    }

    // ==================== Otros ====================

    #[test]
    fn test_other_methods_405() {
        let store = MemoryStore::new();
        for method in [Method::PUT, Method::HEAD, Method::OPTIONS, Method::TRACE, Method::CONNECT] {
            let response = run(&store, method, "/html", &[]);
            assert_eq!(response.status(), StatusCode::MethodNotAllowed);
            assert_eq!(response.header("Allow"), Some(ALLOWED_METHODS));
        }
    }

    #[test]
    fn test_store_failure_500() {
        let store = FailingStore { panic_on_use: false };
        let cases: [(Method, &[(&str, &str)]); 5] = [
            (Method::GET, &[]),
            (Method::GET, &[("uuid", "a")]),
            (Method::POST, &[("content", "x")]),
            (Method::POST, &[("uuid", "a"), ("content", "x")]),
            (Method::DELETE, &[("uuid", "a")]),
        ];

        for (method, pairs) in cases {
            let response = run(&store, method, "/html", pairs);
            assert_eq!(response.status(), StatusCode::InternalServerError);
            assert!(response.body_text().contains("500 Internal Server Error"));
        }
    }

    #[test]
    fn test_error_bodies_uniform() {
        let store = MemoryStore::new();
        let responses = [
            run(&store, Method::GET, "/nope", &[]),
            run(&store, Method::POST, "/html", &[]),
            run(&store, Method::PUT, "/html", &[]),
        ];

        for response in responses {
            let status = response.status();
            let heading = format!("<h1>{} {}</h1>", status.as_u16(), status.reason_phrase());
            assert!(response.body_text().contains(&heading));
        }
    }

    #[test]
    fn test_route_adds_common_headers() {
        let dispatcher = Dispatcher::new("html", Arc::new(MemoryStore::new()));
        let request = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        let response = dispatcher.route(&request);

        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(response.header("Server"), Some("page_server"));
        assert_eq!(response.header("Content-Type"), Some("text/html; charset=UTF-8"));
    }

    #[test]
    fn test_route_uses_body_params() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new("html", store.clone());
        let raw = b"POST /html HTTP/1.1\r\nContent-Length: 23\r\n\r\nuuid=k&content=%3Cp%3E1";
        let request = Request::parse(raw).unwrap();

        assert_eq!(dispatcher.route(&request).status(), StatusCode::Created);
        assert_eq!(store.get("k").unwrap(), Some("<p>1".to_string()));
    }

    #[test]
    fn test_custom_collection_name() {
        let store = MemoryStore::new();
        let response = dispatch("xml", Method::GET, "/xml", &HashMap::new(), &store);
        assert_eq!(response.status(), StatusCode::Ok);

        let response = dispatch("xml", Method::GET, "/html", &HashMap::new(), &store);
        assert_eq!(response.status(), StatusCode::NotFound);
    }
}
