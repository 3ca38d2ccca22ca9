// src/gui.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Shape, Stroke};
use log::error;

use crate::drivers::{DisplayConfig, LineStyle, RenderFrame};
use crate::types::EngineMessage;

const ZERO_LINE: Color32 = Color32::BLACK;
const MAJOR_LINE: Color32 = Color32::from_rgb(255, 165, 0);
const MINOR_LINE: Color32 = Color32::from_rgb(144, 238, 144);
const TRACE: Color32 = Color32::BLUE;
const LABEL: Color32 = Color32::BLACK;

/// Presentation layer: paints the latest frame and raises the stop flag when
/// the window goes away.
pub struct ScopeApp {
    config: DisplayConfig,
    rx: Receiver<EngineMessage>,
    stop: Arc<AtomicBool>,
    frame: Option<RenderFrame>,
}

impl ScopeApp {
    pub fn new(config: DisplayConfig, rx: Receiver<EngineMessage>, stop: Arc<AtomicBool>) -> Self {
        Self {
            config,
            rx,
            stop,
            frame: None,
        }
    }

    fn drain_messages(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                EngineMessage::Frame(frame) => self.frame = Some(frame),
                EngineMessage::Fault(message) => {
                    error!("engine fault: {message}");
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
                EngineMessage::Stopped => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close)
                }
            }
        }
    }

    fn paint(&self, ui: &mut egui::Ui) {
        let size = egui::Vec2::new(self.config.width as f32, self.config.height as f32);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;
        let at = |v: &[f32; 2]| Pos2::new(origin.x + v[0], origin.y + v[1]);
        let Some(frame) = &self.frame else { return };
        for line in &frame.grid {
            let color = match line.style {
                LineStyle::Zero => ZERO_LINE,
                LineStyle::Major => MAJOR_LINE,
                LineStyle::Minor => MINOR_LINE,
            };
            painter.line_segment([at(&line.from), at(&line.to)], Stroke::new(1.0, color));
        }
        for line in &frame.grid {
            if let Some(label) = &line.label {
                painter.text(
                    at(&[label.x, label.y]),
                    Align2::LEFT_BOTTOM,
                    &label.text,
                    FontId::proportional(12.0),
                    LABEL,
                );
            }
        }
        let points: Vec<Pos2> = frame.vertices.iter().map(at).collect();
        painter.add(Shape::line(points, Stroke::new(1.0, TRACE)));
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_messages(ctx);
        if ctx.input(|i| i.viewport().close_requested()) {
            self.stop.store(true, Ordering::Relaxed);
        }
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::WHITE))
            .show(ctx, |ui| self.paint(ui));
        // Keep draining the channel even while the device read blocks.
        ctx.request_repaint();
    }
}
