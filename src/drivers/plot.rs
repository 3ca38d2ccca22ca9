use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::drivers::error::ScopeError;
use crate::drivers::frame::RenderFrame;
use crate::drivers::grid::LineStyle;

const ZERO_LINE: RGBColor = RGBColor(0, 0, 0);
const MAJOR_LINE: RGBColor = RGBColor(255, 165, 0);
const MINOR_LINE: RGBColor = RGBColor(144, 238, 144);
const TRACE: RGBColor = RGBColor(0, 0, 255);

/// Renders one frame into an in-memory PNG, for the one-shot snapshot mode.
pub fn render_frame_png(
    frame: &RenderFrame,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ScopeError> {
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        let label_style = ("sans-serif", 12)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Bottom));
        for line in &frame.grid {
            let color = match line.style {
                LineStyle::Zero => ZERO_LINE,
                LineStyle::Major => MAJOR_LINE,
                LineStyle::Minor => MINOR_LINE,
            };
            root.draw(&PathElement::new(
                vec![
                    (line.from[0] as i32, line.from[1] as i32),
                    (line.to[0] as i32, line.to[1] as i32),
                ],
                color.stroke_width(1),
            ))?;
        }
        for line in &frame.grid {
            if let Some(label) = &line.label {
                root.draw(&Text::new(
                    label.text.clone(),
                    (label.x as i32, label.y as i32),
                    label_style.clone(),
                ))?;
            }
        }
        let trace: Vec<(i32, i32)> = frame
            .vertices
            .iter()
            .map(|v| (v[0] as i32, v[1] as i32))
            .collect();
        root.draw(&PathElement::new(trace, TRACE.stroke_width(1)))?;
        root.present()?;
    }
    encode_png(&buffer, width, height)
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScopeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ScopeError::Snapshot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
