use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// `{"mensaje": "..."}` body used by most non-entity responses.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Mensaje {
    pub mensaje: String,
}

impl Mensaje {
    pub fn new(mensaje: impl Into<String>) -> Self {
        Self { mensaje: mensaje.into() }
    }
}
