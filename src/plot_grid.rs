use plotters::prelude::*;

use crate::heatmap::{Detection, Palette};

fn rgb_to_plotters(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// Renders a detection overlay in-memory as an RGBA pixel buffer.
///
/// A gridline through every kept column key, one filled marker per anchor in
/// its level color, and an outline around each grid group.
pub fn render_plot_rgba(
    width: u32,
    height: u32,
    detection: &Detection,
    palette: &Palette,
) -> Result<Vec<u8>, String> {
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| "width*height overflow".to_string())?;

    let mut rgb = vec![255u8; pixel_count * 3];
    let max_x = width.saturating_sub(1) as i32;
    let max_y = height.saturating_sub(1) as i32;

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let grid_color = RGBColor(210, 210, 210);
        for column in &detection.columns {
            let x = (column.x as i32).clamp(0, max_x);
            root.draw(&PathElement::new([(x, 0), (x, max_y)], grid_color))
                .map_err(|e| e.to_string())?;
        }

        let group_color = RGBColor(220, 40, 40);
        for group in &detection.groups {
            let Some((min, max)) = group.bounds() else {
                continue;
            };
            let tl = ((min.x as i32 - 2).clamp(0, max_x), (min.y as i32 - 2).clamp(0, max_y));
            let br = ((max.x as i32 + 2).clamp(0, max_x), (max.y as i32 + 2).clamp(0, max_y));
            root.draw(&Rectangle::new([tl, br], group_color.stroke_width(1)))
                .map_err(|e| e.to_string())?;
        }

        for anchor in &detection.anchors {
            let x = (anchor.point.x as i32).clamp(0, max_x);
            let y = (anchor.point.y as i32).clamp(0, max_y);
            let color = rgb_to_plotters(palette.color_for(anchor.level).unwrap_or([0, 0, 0]));
            root.draw(&Circle::new((x, y), 3, color.filled()))
                .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())?;
    }

    let mut rgba = vec![255u8; pixel_count * 4];
    for i in 0..pixel_count {
        rgba[i * 4] = rgb[i * 3];
        rgba[i * 4 + 1] = rgb[i * 3 + 1];
        rgba[i * 4 + 2] = rgb[i * 3 + 2];
        rgba[i * 4 + 3] = 255;
    }

    Ok(rgba)
}

/// [`render_plot_rgba`] written out as a PNG.
pub fn save_plot_png(
    path: &std::path::Path,
    detection: &Detection,
    palette: &Palette,
) -> Result<(), String> {
    let (width, height) = (detection.width, detection.height);
    let rgba = render_plot_rgba(width, height, detection, palette)?;
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| "plot buffer size mismatch".to_string())?;
    img.save(path)
        .map_err(|e| format!("Failed to save plot {}: {}", path.display(), e))
}
