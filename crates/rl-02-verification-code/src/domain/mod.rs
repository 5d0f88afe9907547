//! Domain layer: codes, URLs, QR artifacts and registration ids.

pub mod code;
pub mod qr;
pub mod registration_id;
pub mod url;
