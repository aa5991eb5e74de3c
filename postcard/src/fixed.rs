/*!
Fixed-width little-endian IEEE-754 floats, the only numbers not written as
varints. Every bit pattern, NaN payloads included, round-trips unchanged.
*/

use super::Error;

fn take<const N: usize>(data: &[u8], offset: &mut usize) -> Result<[u8; N], Error> {
    let bytes = data
        .get(*offset..)
        .and_then(|d| d.first_chunk::<N>())
        .ok_or(Error::UnexpectedEnd)?;
    *offset += N;
    Ok(*bytes)
}

#[inline]
pub fn encode_f32(value: f32) -> [u8; 4] {
    value.to_le_bytes()
}

#[inline]
pub fn encode_f64(value: f64) -> [u8; 8] {
    value.to_le_bytes()
}

pub fn decode_f32(data: &[u8], offset: &mut usize) -> Result<f32, Error> {
    take(data, offset).map(f32::from_le_bytes)
}

pub fn decode_f64(data: &[u8], offset: &mut usize) -> Result<f64, Error> {
    take(data, offset).map(f64::from_le_bytes)
}
