//! Ids de página nuevos.
//!
//! Se generan con ULID (128 bits, únicos entre threads y procesos) y se
//! muestran con el formato de un UUID: `8-4-4-4-12` dígitos hex en minúscula.

/// Genera un id nuevo, ej: `0190f2c4-5d7a-8b3e-9c1f-2a4b6c8d0e1f`
pub fn new_page_id() -> String {
    format_uuid(ulid::Ulid::new().into())
}

fn format_uuid(value: u128) -> String {
    let hex = format!("{:032x}", value);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
