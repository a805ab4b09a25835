//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Una conexión = un request. Se lee, se despacha, se escribe la respuesta y
//! se cierra el socket (sin keep-alive ni pipelining).

use crate::http::{write_response, ParseError, Request, Response, StatusCode};
use crate::router::{add_common_headers, Dispatcher};
use std::io::BufReader;
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

/// Atiende una conexión completa
///
/// Nunca retorna error: los fallos de escritura se registran y la conexión
/// se abandona.
pub fn handle_connection(stream: TcpStream, dispatcher: &Dispatcher, read_timeout: Option<Duration>) {
    let start = Instant::now();
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    if let Err(e) = stream.set_read_timeout(read_timeout) {
        tracing::warn!(%peer, error = %e, "could not set read timeout");
    }

    let parsed = {
        let mut reader = BufReader::new(&stream);
        Request::read_from(&mut reader)
    };

    let (response, label) = match parsed {
        Ok(request) => {
            let label = format!("{} {}", request.method(), request.path());
            (dispatcher.route(&request), label)
        }
        Err(ParseError::EmptyRequest) => {
            tracing::debug!(%peer, "connection closed without a request");
            close(&stream);
            return;
        }
        Err(e) => {
            tracing::warn!(%peer, error = %e, "malformed request");
            let mut response = Response::error(StatusCode::BadRequest, &e.to_string());
            add_common_headers(&mut response);
            (response, "<invalid>".to_string())
        }
    };

    let mut out = &stream;
    if let Err(e) = write_response(&mut out, &response) {
        tracing::debug!(%peer, error = %e, "failed to write response, abandoning connection");
    }

    tracing::debug!(
        %peer,
        request = %label,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "request served"
    );

    close(&stream);
}

fn close(stream: &TcpStream) {
    let _ = stream.shutdown(Shutdown::Both);
}
