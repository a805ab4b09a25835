//! # Percent-encoding de parámetros
//! src/http/codec.rs
//!
//! Decodifica y codifica query strings y bodies
//! `application/x-www-form-urlencoded`.

/// Decodifica un string percent-encoded
///
/// `+` se interpreta como espacio. Las secuencias `%XX` inválidas se dejan
/// tal cual y los bytes que no forman UTF-8 válido se reemplazan por `�`.
///
/// # Ejemplo
/// ```
/// use page_server::http::codec::percent_decode;
///
/// assert_eq!(percent_decode("hello%20world"), "hello world");
/// assert_eq!(percent_decode("a+b"), "a b");
/// ```
pub fn percent_decode(s: &str) -> String {
    let plus_as_space = s.replace('+', " ");
    let bytes = urlencoding::decode_binary(plus_as_space.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Codifica un string para usarlo en una query o en un body de formulario
///
/// Solo los caracteres no reservados (`A-Z a-z 0-9 - _ . ~`) quedan intactos.
pub fn percent_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Separa `k1=v1&k2=v2` en pares
///
/// - Los segmentos vacíos (`a=1&&b=2`) se ignoran
/// - Se separa en el primer `=`; sin `=` el valor es vacío
/// - `decode` se aplica a clave y valor
pub fn parse_pairs<F>(input: &str, decode: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> String,
{
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(pair), String::new()),
        })
        .collect()
}
