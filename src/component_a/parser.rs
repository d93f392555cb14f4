//! parser.rs
//! Decodes one telemetry datagram: `"<pot1>,<pot2>,<pot3>,<pot4>,<fsr>"`.
//! All-or-nothing: any bad field rejects the whole sample.

use std::str;

use crate::component_a::frame_drain::Datagram;
use crate::error::ParseError;

pub const FIELD_DELIMITER: char = ',';
pub const FIELD_COUNT: usize = 5;

/// Raw readings in wire order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub pot_1: f64,
    pub pot_2: f64,
    pub pot_3: f64,
    pub pot_4: f64,
    pub fsr_reading: f64,
}

impl SensorSample {
    pub fn pots(&self) -> [f64; 4] {
        [self.pot_1, self.pot_2, self.pot_3, self.pot_4]
    }
}

pub fn parse(datagram: &Datagram) -> Result<SensorSample, ParseError> {
    parse_payload(&datagram.payload)
}

pub fn parse_payload(payload: &[u8]) -> Result<SensorSample, ParseError> {
    let text = str::from_utf8(payload).map_err(|e| ParseError::Decode(e.to_string()))?;

    let tokens: Vec<&str> = text.split(FIELD_DELIMITER).collect();
    if tokens.len() != FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: FIELD_COUNT,
            actual: tokens.len(),
        });
    }

    let mut fields = [0.0f64; FIELD_COUNT];
    for (index, (slot, token)) in fields.iter_mut().zip(&tokens).enumerate() {
        *slot = parse_field(index, token)?;
    }

    Ok(SensorSample {
        pot_1: fields[0],
        pot_2: fields[1],
        pot_3: fields[2],
        pot_4: fields[3],
        fsr_reading: fields[4],
    })
}

// Trims so a serial bridge's trailing "\r\n" on the last field is accepted.
fn parse_field(index: usize, token: &str) -> Result<f64, ParseError> {
    let trimmed = token.trim();
    let value: f64 = trimmed.parse().map_err(|_| ParseError::NotNumeric {
        index,
        token: token.to_string(),
    })?;

    if !value.is_finite() {
        return Err(ParseError::NonFinite {
            index,
            token: token.to_string(),
        });
    }
    Ok(value)
}
