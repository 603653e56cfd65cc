//! PNG encoding for charts and index buffers.

use std::io::Cursor;

use tiny_skia::Pixmap;

use crate::chart::IndexBuffer;
use crate::error::RenderError;

/// 300 DPI expressed in pixels per meter
pub const PRINT_PIXELS_PER_METER: u32 = 11_811;

/// Encode an opaque pixmap as 8-bit RGB PNG tagged with 300 DPI.
pub fn encode_chart_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let mut rgb = Vec::with_capacity(pixmap.width() as usize * pixmap.height() as usize * 3);
    for p in pixmap.pixels() {
        let c = p.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }
    encode_png(
        pixmap.width(),
        pixmap.height(),
        png::ColorType::Rgb,
        Some(PRINT_PIXELS_PER_METER),
        &rgb,
    )
}

/// Encode an index buffer as 8-bit grayscale where pixel value = index.
///
/// The result is re-compressed with oxipng. Color type and bit depth are
/// pinned so the pixel values survive optimization unchanged.
pub fn encode_index_png(buffer: &IndexBuffer) -> Result<Vec<u8>, RenderError> {
    let png_bytes = encode_png(
        buffer.width(),
        buffer.height(),
        png::ColorType::Grayscale,
        None,
        buffer.cells(),
    )?;

    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            bit_depth_reduction: false,
            color_type_reduction: false,
            palette_reduction: false,
            grayscale_reduction: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes);
    Ok(optimized)
}

/// Decode a PNG written by [`encode_index_png`]
pub fn decode_index_png(bytes: &[u8]) -> Result<IndexBuffer, RenderError> {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder
        .read_info()
        .map_err(|e| RenderError::PngDecode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| RenderError::PngDecode(e.to_string()))?;

    if info.color_type != png::ColorType::Grayscale || info.bit_depth != png::BitDepth::Eight {
        return Err(RenderError::PngDecode(format!(
            "expected 8-bit grayscale, got {:?} {:?}",
            info.color_type, info.bit_depth
        )));
    }
    buf.truncate(info.buffer_size());

    IndexBuffer::from_cells(info.width, info.height, buf).ok_or(
        RenderError::UnsupportedDimensions {
            width: info.width,
            height: info.height,
        },
    )
}

fn encode_png(
    width: u32,
    height: u32,
    color_type: png::ColorType,
    pixels_per_meter: Option<u32>,
    data: &[u8],
) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        if let Some(ppm) = pixels_per_meter {
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    #[test]
    fn test_chart_png_header_and_dpi() {
        let mut pixmap = Pixmap::new(3, 2).unwrap();
        pixmap.fill(Color::WHITE);
        let bytes = encode_chart_png(&pixmap).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoder = png::Decoder::new(Cursor::new(bytes.as_slice()));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(info.color_type, png::ColorType::Rgb);
        let dims = info.pixel_dims.unwrap();
        assert_eq!(dims.xppu, PRINT_PIXELS_PER_METER);
    }

    #[test]
    fn test_index_png_preserves_values() {
        let cells: Vec<u8> = vec![0, 1, 2, 3, 200, 255];
        let buffer = IndexBuffer::from_cells(3, 2, cells.clone()).unwrap();
        let bytes = encode_index_png(&buffer).unwrap();
        let decoded = decode_index_png(&bytes).unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn test_index_png_few_values_not_reduced() {
        // Only two distinct values: a bit depth reduction would rescale them
        let buffer = IndexBuffer::from_cells(4, 1, vec![0, 1, 1, 0]).unwrap();
        let decoded = decode_index_png(&encode_index_png(&buffer).unwrap()).unwrap();
        assert_eq!(decoded.cells(), &[0, 1, 1, 0]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_index_png(b"not a png"),
            Err(RenderError::PngDecode(_))
        ));
    }
}
