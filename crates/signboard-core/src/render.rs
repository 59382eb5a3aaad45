use crate::config::{Config, LayoutConfig};
use crate::error::Result;
use crate::font::Typeface;
use crate::record::{IncidentRecord, Store};
use crate::types::Reason;
use chrono::NaiveDate;
use image::{ImageFormat, Rgb, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

pub const INK_BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const INK_WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const INK_BLUE: Rgb<u8> = Rgb([0, 0, 255]);

const CHECKMARK: &str = "✓";
const CHECKMARK_FALLBACK: &str = "X";

/// Open the sign background. When it cannot be opened a blank white canvas
/// of the fallback size is returned instead.
pub fn load_background(path: &Path, layout: &LayoutConfig) -> RgbaImage {
    match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "background unavailable, using blank canvas"
            );
            RgbaImage::from_pixel(
                layout.fallback_width,
                layout.fallback_height,
                Rgba([255, 255, 255, 255]),
            )
        }
    }
}

/// Y coordinate of the checkbox for `reason`.
pub fn checkmark_y(layout: &LayoutConfig, reason: Reason) -> i32 {
    match reason {
        Reason::Change => layout.checkmark_change_y,
        Reason::Deploy => layout.checkmark_deploy_y,
        Reason::Missed => layout.checkmark_missed_y,
    }
}

/// Draw the record's counters onto `background`.
pub fn render_sign(
    mut canvas: RgbaImage,
    record: &IncidentRecord,
    layout: &LayoutConfig,
    face: &Typeface,
) -> RgbaImage {
    let width = canvas.width() as i32;

    let days = record.days_since.to_string();
    let extent = face.measure(&days, layout.days_font_size);
    let x = (width - extent.width).div_euclid(2) + layout.days_x_offset;
    face.draw(&mut canvas, x, layout.days_y, &days, layout.days_font_size, INK_BLACK);

    let prior = record.prior_count.to_string();
    let extent = face.measure(&prior, layout.prior_font_size);
    let x = layout.prior_x - extent.width.div_euclid(2);
    face.draw(&mut canvas, x, layout.prior_y, &prior, layout.prior_font_size, INK_WHITE);

    let incident = record.incident_number.as_str();
    let extent = face.measure(incident, layout.incident_font_size);
    let x = width.div_euclid(2) - extent.width.div_euclid(2) + layout.incident_x_offset;
    face.draw(
        &mut canvas,
        x,
        layout.incident_y,
        incident,
        layout.incident_font_size,
        INK_WHITE,
    );

    let mark = if CHECKMARK.chars().all(|c| face.supports(c)) {
        CHECKMARK
    } else {
        CHECKMARK_FALLBACK
    };
    face.draw(
        &mut canvas,
        layout.checkmark_x,
        checkmark_y(layout, record.reason),
        mark,
        layout.checkmark_font_size,
        INK_BLUE,
    );

    canvas
}

/// Load the record, refresh its counters for `today`, render the sign and
/// write it as PNG to the configured output path. Returns the refreshed
/// record; the record file itself is not modified.
pub fn generate_sign(root: &Path, config: &Config, today: NaiveDate) -> Result<IncidentRecord> {
    let record = Store::for_root(root, config).load()?.refreshed(today);

    let background = load_background(&config.background_path(root), &config.layout);
    let face = Typeface::load_or_builtin(&config.font_path(root));
    let sign = render_sign(background, &record, &config.layout, &face);

    let output = config.output_path(root);
    let mut png = Cursor::new(Vec::new());
    sign.write_to(&mut png, ImageFormat::Png)?;
    crate::io::atomic_write(&output, png.get_ref())?;

    tracing::info!(
        path = %output.display(),
        days_since = record.days_since,
        prior_count = record.prior_count,
        "rendered sign"
    );
    Ok(record)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesConfig;
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
    }

    fn noon() -> NaiveDateTime {
        today().and_hms_opt(12, 0, 0).unwrap()
    }

    fn record(reason: Reason) -> IncidentRecord {
        let mut r = IncidentRecord::initial(noon());
        r.reason = reason;
        r.refresh(today());
        r
    }

    fn has_ink(img: &RgbaImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>, ink: Rgb<u8>) -> bool {
        ys.clone().any(|y| {
            xs.clone().any(|x| {
                let p = img.get_pixel(x, y).0;
                p[0] == ink.0[0] && p[1] == ink.0[1] && p[2] == ink.0[2]
            })
        })
    }

    /// Config whose font path does not exist, so rendering is reproducible
    /// with the built-in bitmap font.
    fn builtin_config(dir: &TempDir) -> Config {
        Config {
            files: FilesConfig {
                font: dir.path().join("no-such-font.ttf"),
                ..FilesConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn missing_background_uses_white_canvas() {
        let dir = TempDir::new().unwrap();
        let layout = LayoutConfig::default();
        let img = load_background(&dir.path().join("nope.png"), &layout);
        assert_eq!(img.dimensions(), (1100, 800));
        assert_eq!(*img.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn render_keeps_background_size() {
        let layout = LayoutConfig::default();
        let canvas = RgbaImage::from_pixel(1200, 900, GRAY);
        let out = render_sign(canvas, &record(Reason::Deploy), &layout, &Typeface::Builtin);
        assert_eq!(out.dimensions(), (1200, 900));
    }

    #[test]
    fn render_places_each_layer() {
        let layout = LayoutConfig::default();
        let canvas = RgbaImage::from_pixel(1100, 800, GRAY);
        let out = render_sign(canvas, &record(Reason::Deploy), &layout, &Typeface::Builtin);

        // "15" centred: 20px wide starting at x=540.
        assert!(has_ink(&out, 535..565, 160..180, INK_BLACK));
        // "2" centred on x=220.
        assert!(has_ink(&out, 210..230, 630..650, INK_WHITE));
        // "540" centred on 550 + 70.
        assert!(has_ink(&out, 600..640, 650..670, INK_WHITE));
        // Deploy box only.
        assert!(has_ink(&out, 940..950, 645..665, INK_BLUE));
        assert!(!has_ink(&out, 940..950, 575..595, INK_BLUE));
        assert!(!has_ink(&out, 940..950, 705..725, INK_BLUE));
    }

    #[test]
    fn checkmark_follows_reason() {
        let layout = LayoutConfig::default();
        for reason in Reason::all() {
            let canvas = RgbaImage::from_pixel(1100, 800, GRAY);
            let out = render_sign(canvas, &record(*reason), &layout, &Typeface::Builtin);
            let y = checkmark_y(&layout, *reason) as u32;
            assert!(has_ink(&out, 940..950, y..y + 20, INK_BLUE), "{reason}");
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let layout = LayoutConfig::default();
        let a = render_sign(RgbaImage::from_pixel(1100, 800, GRAY), &record(Reason::Missed), &layout, &Typeface::Builtin);
        let b = render_sign(RgbaImage::from_pixel(1100, 800, GRAY), &record(Reason::Missed), &layout, &Typeface::Builtin);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn generate_sign_writes_png_and_leaves_record_alone() {
        let dir = TempDir::new().unwrap();
        let config = builtin_config(&dir);

        let record = generate_sign(dir.path(), &config, today()).unwrap();
        assert_eq!(record.days_since, 15);
        assert_eq!(record.prior_count, 2);

        let output = config.output_path(dir.path());
        let img = image::open(&output).unwrap();
        assert_eq!((img.width(), img.height()), (1100, 800));
        assert!(!config.data_path(dir.path()).exists());
    }

    #[test]
    fn generate_sign_uses_background_image() {
        let dir = TempDir::new().unwrap();
        let config = builtin_config(&dir);
        let bg = config.background_path(dir.path());
        std::fs::create_dir_all(bg.parent().unwrap()).unwrap();
        RgbaImage::from_pixel(640, 400, GRAY).save(&bg).unwrap();

        generate_sign(dir.path(), &config, today()).unwrap();
        let img = image::open(config.output_path(dir.path())).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (640, 400));
        assert_eq!(*img.get_pixel(0, 0), GRAY);
    }
}
