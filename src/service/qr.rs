//! QR code rendering to PNG data URLs.

use crate::error::QrgenError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma};
use qrcode::{Color, EcLevel, QrCode};

/// Listing thumbnail.
pub const THUMBNAIL_PX: u32 = 128;
/// Success page image.
pub const SUCCESS_PX: u32 = 256;
/// Printable image offered from the listing.
pub const PRINT_PX: u32 = 1024;
/// Quiet zone around the symbol, in modules.
pub const MARGIN_MODULES: u32 = 1;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Side length of the rendered image: `size_px`, or one pixel per module when
/// the symbol (plus quiet zone) has more modules than that.
pub fn rendered_side(size_px: u32, total_modules: u32) -> u32 {
    size_px.max(total_modules)
}

/// Render `payload` as a square grayscale PNG, normally `size_px` wide.
///
/// Output depends only on the arguments. Payloads beyond the symbol capacity
/// fail with `Encoding`. A symbol with more modules than `size_px` is drawn at
/// one pixel per module instead.
pub fn encode(payload: &[u8], size_px: u32, margin_modules: u32) -> Result<Vec<u8>, QrgenError> {
    let code = QrCode::with_error_correction_level(payload, EcLevel::M)?;
    let width = code.width() as u32;
    let total = width + 2 * margin_modules;
    let side = rendered_side(size_px, total);

    let colors = code.to_colors();
    let img = GrayImage::from_fn(side, side, |x, y| {
        let mx = x * total / side;
        let my = y * total / side;
        let inside = (margin_modules..margin_modules + width).contains(&mx)
            && (margin_modules..margin_modules + width).contains(&my);
        if !inside {
            return LIGHT;
        }
        let idx = ((my - margin_modules) * width + (mx - margin_modules)) as usize;
        match colors[idx] {
            Color::Dark => DARK,
            Color::Light => LIGHT,
        }
    });

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        img.as_raw(),
        side,
        side,
        ExtendedColorType::L8,
    )?;
    Ok(png)
}

/// Same as [`encode`], wrapped as a `data:image/png;base64,` URL for `<img src>`.
pub fn encode_data_url(payload: &[u8], size_px: u32) -> Result<String, QrgenError> {
    let png = encode(payload, size_px, MARGIN_MODULES)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &[u8] =
        br#"{"s_no":1,"lp_no":"LP1","items":"Widget","issue_voucher_number":"V1"}"#;

    #[test]
    fn encoding_is_deterministic() {
        let a = encode(PAYLOAD, SUCCESS_PX, MARGIN_MODULES).unwrap();
        let b = encode(PAYLOAD, SUCCESS_PX, MARGIN_MODULES).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn image_has_requested_size() {
        for size in [THUMBNAIL_PX, SUCCESS_PX, PRINT_PX] {
            let png = encode(PAYLOAD, size, MARGIN_MODULES).unwrap();
            let img = image::load_from_memory(&png).unwrap().to_luma8();
            assert_eq!(img.dimensions(), (size, size));
        }
    }

    #[test]
    fn quiet_zone_is_light_and_finder_is_dark() {
        let png = encode(PAYLOAD, SUCCESS_PX, MARGIN_MODULES).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(img.get_pixel(0, 0), &LIGHT);

        // Centre of the top-left finder pattern (modules 2..=4 past the margin).
        let width = QrCode::with_error_correction_level(PAYLOAD, EcLevel::M)
            .unwrap()
            .width() as u32;
        let total = width + 2 * MARGIN_MODULES;
        let centre = ((MARGIN_MODULES + 3) * SUCCESS_PX + SUCCESS_PX / 2) / total;
        assert_eq!(img.get_pixel(centre, centre), &DARK);
    }

    #[test]
    fn oversized_payload_fails_closed() {
        let big = vec![b'a'; 4000];
        assert!(matches!(
            encode(&big, PRINT_PX, MARGIN_MODULES),
            Err(QrgenError::Encoding(_))
        ));
    }

    /// Decode the first QR symbol found in a PNG. The image is framed with extra
    /// white paper so the detector never sees the symbol touching the edge.
    fn decode(png: &[u8]) -> String {
        const PAPER: usize = 16;
        let img = image::load_from_memory(png).unwrap().to_luma8();
        let (w, h) = (img.width() as usize, img.height() as usize);
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(w + 2 * PAPER, h + 2 * PAPER, |x, y| {
                if x < PAPER || y < PAPER || x >= w + PAPER || y >= h + PAPER {
                    255
                } else {
                    img.get_pixel((x - PAPER) as u32, (y - PAPER) as u32)[0]
                }
            });
        let grids = prepared.detect_grids();
        assert!(!grids.is_empty(), "no QR symbol detected");
        let (_, content) = grids[0].decode().unwrap();
        content
    }

    fn long_payload() -> String {
        format!(
            r#"{{"s_no":42,"lp_no":"LP-2024-0042","items":"{}","issue_voucher_number":"IV-77"}}"#,
            "Cable CAT6 x20, ".repeat(16)
        )
    }

    #[test]
    fn short_payload_decodes_at_every_size() {
        for size in [THUMBNAIL_PX, SUCCESS_PX, PRINT_PX] {
            let png = encode(PAYLOAD, size, MARGIN_MODULES).unwrap();
            assert_eq!(decode(&png).as_bytes(), PAYLOAD, "size {size}");
        }
    }

    #[test]
    fn long_payload_decodes_at_display_and_print_sizes() {
        let payload = long_payload();
        assert!(payload.len() > 300);
        for size in [SUCCESS_PX, PRINT_PX] {
            let png = encode(payload.as_bytes(), size, MARGIN_MODULES).unwrap();
            assert_eq!(decode(&png), payload, "size {size}");
        }
    }

    #[test]
    fn symbol_larger_than_requested_size_gets_one_pixel_per_module() {
        let payload = format!(
            r#"{{"s_no":1,"lp_no":"LP","items":"{}","issue_voucher_number":"V"}}"#,
            "x".repeat(1200)
        );
        let width = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .unwrap()
            .width() as u32;
        let total = width + 2 * MARGIN_MODULES;
        assert!(total > THUMBNAIL_PX);

        let png = encode(payload.as_bytes(), THUMBNAIL_PX, MARGIN_MODULES).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (total, total));
        assert_eq!(img.get_pixel(0, 0), &LIGHT);
        assert_eq!(img.get_pixel(MARGIN_MODULES, MARGIN_MODULES), &DARK);
    }

    #[test]
    fn rendered_side_only_grows() {
        assert_eq!(rendered_side(256, 35), 256);
        assert_eq!(rendered_side(128, 135), 135);
    }

    #[test]
    fn data_url_has_png_prefix() {
        let url = encode_data_url(PAYLOAD, THUMBNAIL_PX).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
