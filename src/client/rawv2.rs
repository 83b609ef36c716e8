//! Decoder for Ruuvi data format 5 ("RAWv2") manufacturer payloads.
//!
//! | Offset | Field                                            |
//! |--------|--------------------------------------------------|
//! | 0      | Format, always 0x05                              |
//! | 1-2    | Temperature, i16 in 0.005 °C steps               |
//! | 3-4    | Humidity, u16 in 0.0025 % steps                  |
//! | 5-6    | Pressure, u16 in Pa with a -50000 offset         |
//! | 7-12   | Acceleration X/Y/Z, i16 in mG                    |
//! | 13-14  | Power info, 11 bits battery + 5 bits TX power    |
//! | 15     | Movement counter                                 |
//! | 16-17  | Measurement sequence number                      |
//! | 18-23  | MAC address                                      |

use thiserror::Error;

pub const FORMAT_RAWV2: u8 = 0x05;
const PAYLOAD_LEN: usize = 24;
/// Manufacturer specific data type followed by Ruuvi's company id 0x0499, little endian.
const MANUFACTURER_MARKER: [u8; 3] = [0xFF, 0x99, 0x04];

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("Invalid hex string")]
    InvalidHex,

    #[error("Unsupported data format: {0:#04x}")]
    UnsupportedFormat(u8),

    #[error("Payload too short: {0} bytes")]
    TooShort(usize),

    #[error("Temperature not available")]
    TemperatureUnavailable,

    #[error("Battery voltage not available")]
    BatteryUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawV2 {
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub pressure: Option<u32>,
    /// Millivolts.
    pub battery: u16,
}

fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, DecodeError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(DecodeError::InvalidHex);
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or(DecodeError::InvalidHex)
        })
        .collect()
}

/// Finds the RAWv2 payload inside a full advertisement, or accepts a bare payload.
fn locate_payload(bytes: &[u8]) -> Result<&[u8], DecodeError> {
    if bytes.len() == PAYLOAD_LEN && bytes[0] == FORMAT_RAWV2 {
        return Ok(bytes);
    }

    let payload = bytes
        .windows(MANUFACTURER_MARKER.len())
        .position(|window| window == MANUFACTURER_MARKER)
        .map(|pos| &bytes[pos + MANUFACTURER_MARKER.len()..])
        .unwrap_or(bytes);

    match payload.first() {
        Some(&FORMAT_RAWV2) => Ok(payload),
        Some(&other) => Err(DecodeError::UnsupportedFormat(other)),
        None => Err(DecodeError::TooShort(0)),
    }
}

fn be_u16(payload: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([payload[offset], payload[offset + 1]])
}

pub fn decode_hex(hex: &str) -> Result<RawV2, DecodeError> {
    let bytes = hex_to_bytes(hex)?;
    decode(&bytes)
}

pub fn decode(bytes: &[u8]) -> Result<RawV2, DecodeError> {
    let payload = locate_payload(bytes)?;
    if payload.len() < PAYLOAD_LEN {
        return Err(DecodeError::TooShort(payload.len()));
    }

    let raw_temperature = be_u16(payload, 1);
    if raw_temperature == 0x8000 {
        return Err(DecodeError::TemperatureUnavailable);
    }
    let temperature = f64::from(raw_temperature as i16) * 0.005;

    let raw_humidity = be_u16(payload, 3);
    let humidity = (raw_humidity != 0xFFFF).then(|| f64::from(raw_humidity) * 0.0025);

    let raw_pressure = be_u16(payload, 5);
    let pressure = (raw_pressure != 0xFFFF).then(|| u32::from(raw_pressure) + 50_000);

    let battery_bits = be_u16(payload, 13) >> 5;
    if battery_bits == 0x07FF {
        return Err(DecodeError::BatteryUnavailable);
    }
    let battery = battery_bits + 1600;

    Ok(RawV2 {
        temperature,
        humidity,
        pressure,
        battery,
    })
}
