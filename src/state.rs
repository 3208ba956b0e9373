//! Save-state serialization.
//!
//! The container is a flat, self-describing binary blob: a fixed header
//! of seven little-endian `u32` lengths (one per subsystem, in the order
//! CPU, MMU, PPU, Timer, Joypad, Cartridge, APU) followed by each
//! subsystem's opaque payload back to back. Payloads are versioned
//! internally by whichever subsystem produced them; the container itself
//! carries no version tag of its own. The ROM image is never part of the
//! payload — it's supplied externally when restoring.

use std::io::Cursor;

use crate::error::Error;

/// Implemented by every subsystem that participates in save states.
/// `state()` must be paired with a `set_state()` that accepts exactly
/// what it produces; callers outside this crate should treat the
/// encoding as opaque.
pub trait StateComponent {
    fn state(&self) -> Vec<u8>;
    fn set_state(&mut self, data: &[u8]) -> Result<(), Error>;
}

pub(crate) fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

pub(crate) fn write_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_bool(out: &mut Vec<u8>, value: bool) {
    out.push(value as u8);
}

pub(crate) fn write_bytes(out: &mut Vec<u8>, value: &[u8]) {
    out.extend_from_slice(value);
}

pub(crate) fn read_u8(component: &'static str, cursor: &mut Cursor<&[u8]>) -> Result<u8, Error> {
    let mut buf = [0u8; 1];
    read_exact(component, cursor, &mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_u16(component: &'static str, cursor: &mut Cursor<&[u8]>) -> Result<u16, Error> {
    let mut buf = [0u8; 2];
    read_exact(component, cursor, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32(component: &'static str, cursor: &mut Cursor<&[u8]>) -> Result<u32, Error> {
    let mut buf = [0u8; 4];
    read_exact(component, cursor, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_bool(component: &'static str, cursor: &mut Cursor<&[u8]>) -> Result<bool, Error> {
    Ok(read_u8(component, cursor)? != 0)
}

pub(crate) fn read_bytes(
    component: &'static str,
    cursor: &mut Cursor<&[u8]>,
    count: usize,
) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; count];
    read_exact(component, cursor, &mut buf)?;
    Ok(buf)
}

fn read_exact(component: &'static str, cursor: &mut Cursor<&[u8]>, buf: &mut [u8]) -> Result<(), Error> {
    use std::io::Read;
    let remaining = (cursor.get_ref().len() as u64).saturating_sub(cursor.position()) as usize;
    if remaining < buf.len() {
        return Err(Error::BufferUnderrun {
            component,
            expected: buf.len(),
            actual: remaining,
        });
    }
    cursor
        .read_exact(buf)
        .map_err(|_| Error::BufferUnderrun {
            component,
            expected: buf.len(),
            actual: remaining,
        })
}

/// Order in which subsystem payloads appear in the container header
/// and body. Fixed by the save-state format; never reorder.
pub const COMPONENT_NAMES: [&str; 7] = ["cpu", "mmu", "ppu", "timer", "pad", "cartridge", "apu"];
pub const HEADER_LEN: usize = COMPONENT_NAMES.len() * 4;

/// Assembles the fixed 28-byte header plus the seven payloads, in the
/// mandated CPU/MMU/PPU/Timer/Joypad/Cartridge/APU order.
pub fn encode_container(payloads: [Vec<u8>; 7]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payloads.iter().map(|p| p.len()).sum::<usize>());
    for payload in &payloads {
        write_u32(&mut out, payload.len() as u32);
    }
    for payload in &payloads {
        write_bytes(&mut out, payload);
    }
    out
}

/// Splits a container back into its seven opaque payload slices,
/// validating that the header declares lengths the buffer can satisfy.
pub fn decode_container(data: &[u8]) -> Result<[&[u8]; 7], Error> {
    if data.len() < HEADER_LEN {
        return Err(Error::BufferUnderrun {
            component: "state-container",
            expected: HEADER_LEN,
            actual: data.len(),
        });
    }
    let mut lengths = [0usize; 7];
    for (i, length) in lengths.iter_mut().enumerate() {
        let offset = i * 4;
        let bytes: [u8; 4] = data[offset..offset + 4].try_into().unwrap();
        *length = u32::from_le_bytes(bytes) as usize;
    }

    let mut offset = HEADER_LEN;
    let mut slices: [&[u8]; 7] = [&[]; 7];
    for (i, length) in lengths.iter().enumerate() {
        let end = offset + length;
        if data.len() < end {
            return Err(Error::BufferUnderrun {
                component: COMPONENT_NAMES[i],
                expected: *length,
                actual: data.len().saturating_sub(offset),
            });
        }
        slices[i] = &data[offset..end];
        offset = end;
    }
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_container() {
        let payloads: [Vec<u8>; 7] = [
            vec![1, 2, 3],
            vec![4; 10],
            vec![],
            vec![9],
            vec![1],
            vec![2, 2],
            vec![3, 3, 3],
        ];
        let encoded = encode_container(payloads.clone());
        let decoded = decode_container(&encoded).unwrap();
        for (a, b) in payloads.iter().zip(decoded.iter()) {
            assert_eq!(a.as_slice(), *b);
        }
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = decode_container(&[0u8; 10]).unwrap_err();
        matches!(err, Error::BufferUnderrun { .. });
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let payloads: [Vec<u8>; 7] = [
            vec![1, 2, 3, 4],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        ];
        let mut encoded = encode_container(payloads);
        encoded.truncate(encoded.len() - 2);
        assert!(decode_container(&encoded).is_err());
    }
}
