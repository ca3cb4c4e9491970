/// Sample renderer for the annotation toolkit
/// Writes one PNG per text mode and per compositing tool
///
/// Usage: cargo run --release --bin text_samples -- [--output dir]

use anyhow::{Context, Result};
use image::Rgb;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use region_annotator::core::config::Config;
use region_annotator::{
    draw_bar, draw_bar_segment, draw_region_mask, draw_regions, generate_colors, grid,
    pixelate_region, BlendMode, Canvas, GridOptions, HAlign, PaletteOptions, Region,
    RenderingError, TextWriter, VAlign, BLACK, WHITE,
};

const CANVAS_WIDTH: u32 = 640;
const CANVAS_HEIGHT: u32 = 400;

fn main() -> Result<()> {
    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let mut output_dir = "output".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                if i + 1 < args.len() {
                    output_dir = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    let config = Config::new().context("Failed to load configuration")?;

    let filter = EnvFilter::new(format!(
        "region_annotator={},text_samples={},cosmic_text=warn",
        level_name(config.log_level()),
        level_name(config.log_level())
    ));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    std::fs::create_dir_all(&output_dir)?;
    let output_dir = Path::new(&output_dir);

    info!("=== ANNOTATION SAMPLES ===");
    info!(
        "Fonts: {} | size {} (min {})",
        config.fonts.font_dir.display(),
        config.default_font_size(),
        config.min_font_size()
    );

    render_compositing_samples(output_dir)?;

    // Text needs the bundled font files; compositing samples are still useful without them
    let writer = TextWriter::from_config(&config);
    match render_text_samples(&writer, output_dir) {
        Ok(()) => {}
        Err(RenderingError::Font(e)) => {
            warn!("Skipping text samples: {}", e);
        }
        Err(e) => {
            error!("Text samples failed: {}", e);
            return Err(e.into());
        }
    }

    info!("✓ Samples written to {}", output_dir.display());
    Ok(())
}

fn level_name(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::TRACE => "trace",
        tracing::Level::DEBUG => "debug",
        tracing::Level::INFO => "info",
        tracing::Level::WARN => "warn",
        tracing::Level::ERROR => "error",
    }
}

/// Diagonal gradient so pixelation and masking are visible
fn backdrop() -> Canvas {
    Canvas::from_fn(CANVAS_WIDTH, CANVAS_HEIGHT, |x, y| {
        Rgb([
            (x * 255 / CANVAS_WIDTH) as u8,
            (y * 255 / CANVAS_HEIGHT) as u8,
            ((x + y) * 255 / (CANVAS_WIDTH + CANVAS_HEIGHT)) as u8,
        ])
    })
}

fn sample_regions() -> Vec<Region> {
    vec![
        Region::new(40, 220, 40, 160),
        Region::new(260, 420, 80, 240),
        Region::new(460, 700, 200, 380),
    ]
}

fn save(canvas: &Canvas, dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(name);
    canvas
        .save(&path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    info!("Saved {}", path.display());
    Ok(())
}

fn render_compositing_samples(dir: &Path) -> Result<()> {
    let regions = sample_regions();
    let colors = generate_colors(regions.len(), &PaletteOptions::default());

    let mut outlined = backdrop();
    for (region, color) in regions.iter().zip(&colors) {
        draw_regions(&mut outlined, std::slice::from_ref(region), *color, 3, true, 0.8);
    }
    save(&outlined, dir, "regions.png")?;

    let mut pixelated = backdrop();
    pixelate_region(&mut pixelated, &regions, 0.1);
    save(&pixelated, dir, "pixelate.png")?;

    let masked = draw_region_mask(&backdrop(), &regions, 1.0);
    save(&masked, dir, "mask.png")?;

    let mut bars = Canvas::from_pixel(CANVAS_WIDTH, 120, BLACK);
    draw_bar(&mut bars, 0.65, 20, 20, 600, 30, Rgb([60, 60, 60]), Rgb([80, 200, 120]));
    let segment_colors = generate_colors(4, &PaletteOptions { hue_range: 0.5, ..PaletteOptions::default() });
    for (i, color) in segment_colors.iter().enumerate() {
        let start = i as f32 * 0.25;
        draw_bar_segment(&mut bars, start, start + 0.25, 20, 70, 600, 30, *color);
    }
    save(&bars, dir, "bars.png")?;

    let tiles: Vec<Canvas> = generate_colors(10, &PaletteOptions { saturation: 0.6, ..PaletteOptions::default() })
        .into_iter()
        .map(|color| Canvas::from_pixel(80, 60, color))
        .collect();
    let sheet = grid(&tiles, &GridOptions::default())?;
    save(&sheet, dir, "grid.png")?;

    Ok(())
}

fn render_text_samples(writer: &TextWriter, dir: &Path) -> Result<(), RenderingError> {
    let style = writer.style();

    let mut canvas = backdrop();
    writer.raw_text(&mut canvas, "raw_text at (20, 20)", 20, 20, &style)?;
    writer.center_at_position(
        &mut canvas,
        "centered",
        (CANVAS_WIDTH / 2) as i32,
        (CANVAS_HEIGHT / 2) as i32,
        &style.clone().with_background(BLACK, BlendMode::Semi(0.6)),
    )?;
    writer.left_at_position(&mut canvas, "left of x", 20, 120, &style.clone().with_background(BLACK, BlendMode::Opaque))?;
    writer.write_icon(&mut canvas, "\u{f00c}", 560, 60, &style.clone().with_size(36))?;
    save_text(&canvas, dir, "text_points.png")?;

    let mut canvas = backdrop();
    let base = writer.region_options();
    for (region, h_align) in sample_regions().into_iter().zip([HAlign::Left, HAlign::Center, HAlign::Right]) {
        let mut opts = base.clone();
        opts.h_align = h_align;
        opts.show_region_outline = true;
        opts.style = opts.style.with_size(48).with_background(BLACK, BlendMode::Overlay(0.7));
        writer.write_into_region(&mut canvas, "a long caption shrunk to fit", region, &opts)?;
    }
    let mut icon_opts = base.clone();
    icon_opts.icon = Some("\u{f030}".to_string());
    icon_opts.fill_region = true;
    icon_opts.style = icon_opts.style.with_background(BLACK, BlendMode::Semi(0.5));
    writer.write_at_position(&mut canvas, "with icon", 20, 300, 300, &icon_opts)?;
    save_text(&canvas, dir, "text_regions.png")?;

    let mut canvas = backdrop();
    for (h, v, text) in [
        (HAlign::Left, VAlign::Top, "top left"),
        (HAlign::Right, VAlign::Top, "top right"),
        (HAlign::Center, VAlign::Center, "centre"),
        (HAlign::Left, VAlign::Bottom, "bottom left"),
        (HAlign::Right, VAlign::Bottom, "bottom right"),
    ] {
        let mut opts = base.clone();
        opts.style = opts.style.with_background(BLACK, BlendMode::Opaque);
        writer.write_anchored(&mut canvas, text, h, v, &opts)?;
    }
    save_text(&canvas, dir, "text_anchored.png")?;

    let mut canvas = backdrop();
    let regions = sample_regions();
    draw_regions(&mut canvas, &regions, WHITE, 2, false, 1.0);
    let label = writer.label_options();
    for (i, region) in regions.iter().enumerate() {
        let mut opts = label.clone();
        opts.inside = i % 2 == 1;
        opts.show_at_bottom = i == 2;
        if opts.show_at_bottom {
            opts.icon = Some("\u{f447}".to_string());
        }
        writer.label_region(&mut canvas, &format!("region {}", i), *region, &opts)?;
    }
    save_text(&canvas, dir, "text_labels.png")?;

    Ok(())
}

fn save_text(canvas: &Canvas, dir: &Path, name: &str) -> Result<(), RenderingError> {
    let path = dir.join(name);
    canvas.save(&path)?;
    info!("Saved {}", path.display());
    Ok(())
}
