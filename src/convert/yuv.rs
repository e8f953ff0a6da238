use anyhow::{anyhow, Result};

use crate::frame::{chroma_len, PlanarImage};

/// Repack a strided planar frame into NV21: the full luma plane followed by
/// one (V, U) byte pair per 2x2 chroma block.
///
/// Each plane is indexed through its own strides. Any read outside a plane's
/// buffer is an error.
pub(crate) fn pack_nv21(frame: &PlanarImage) -> Result<Vec<u8>> {
    let w = frame.width as usize;
    let h = frame.height as usize;
    let cw = chroma_len(frame.width);
    let ch = chroma_len(frame.height);
    let len = nv21_len(w, h)?;

    let mut nv21 = Vec::with_capacity(len);
    for row in 0..h {
        for col in 0..w {
            let sample = frame
                .y
                .sample(row, col)
                .ok_or_else(|| anyhow!("luma plane too short at ({}, {})", row, col))?;
            nv21.push(sample);
        }
    }
    for row in 0..ch {
        for col in 0..cw {
            let v = frame
                .v
                .sample(row, col)
                .ok_or_else(|| anyhow!("V plane too short at ({}, {})", row, col))?;
            let u = frame
                .u
                .sample(row, col)
                .ok_or_else(|| anyhow!("U plane too short at ({}, {})", row, col))?;
            nv21.push(v);
            nv21.push(u);
        }
    }
    Ok(nv21)
}

fn nv21_len(w: usize, h: usize) -> Result<usize> {
    let luma = w
        .checked_mul(h)
        .ok_or_else(|| anyhow!("NV21 frame dimensions overflow"))?;
    let chroma = w
        .div_ceil(2)
        .checked_mul(h.div_ceil(2))
        .and_then(|v| v.checked_mul(2))
        .ok_or_else(|| anyhow!("NV21 frame dimensions overflow"))?;
    luma.checked_add(chroma)
        .ok_or_else(|| anyhow!("NV21 frame dimensions overflow"))
}

/// Decode NV21 into packed RGB24 with the full-range BT.601 (JFIF) matrix.
pub(crate) fn nv21_to_rgb(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let w = width as usize;
    let h = height as usize;
    let expected = nv21_len(w, h)?;
    if pixels.len() != expected {
        return Err(anyhow!(
            "NV21 frame length mismatch: expected {}, got {}",
            expected,
            pixels.len()
        ));
    }

    let y_plane = w * h;
    let chroma_row = w.div_ceil(2) * 2;
    let mut rgb = vec![0u8; y_plane * 3];
    for j in 0..h {
        for i in 0..w {
            let y = pixels[j * w + i] as f32;
            let vu_index = y_plane + (j / 2) * chroma_row + (i / 2) * 2;
            let v = pixels[vu_index] as f32 - 128.0;
            let u = pixels[vu_index + 1] as f32 - 128.0;

            let r = y + 1.402_f32 * v;
            let g = y - 0.344_136_f32 * u - 0.714_136_f32 * v;
            let b = y + 1.772_f32 * u;

            let offset = (j * w + i) * 3;
            rgb[offset] = clamp_to_u8(r);
            rgb[offset + 1] = clamp_to_u8(g);
            rgb[offset + 2] = clamp_to_u8(b);
        }
    }

    Ok(rgb)
}

fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
