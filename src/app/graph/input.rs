use eframe::egui::{self, Rect, Response, Ui};

use super::super::ViewModel;
use super::super::interaction::Gesture;

impl ViewModel {
    /// Feeds this frame's pointer state into the interaction controller.
    /// Positions are made relative to the canvas' top-left corner.
    pub(in crate::app) fn handle_canvas_input(&mut self, ui: &Ui, rect: Rect, response: &Response) {
        let (pressed, released, pointer, scroll) = ui.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.interact_pos().or(input.pointer.hover_pos()),
                input.raw_scroll_delta.y,
            )
        });
        let inside = pointer.filter(|position| rect.contains(*position));
        let canvas = self.config.canvas;

        if response.hovered() && scroll.abs() > f32::EPSILON {
            // egui reports wheel-up as positive; the controller expects a
            // positive delta to mean zoom out.
            self.interaction.wheel(&mut self.viewport, -scroll);
        }

        if pressed && let Some(position) = inside {
            self.interaction
                .pointer_down(&self.graph, &self.viewport, position - rect.min);
        }

        match pointer {
            Some(position) if inside.is_some() || self.interaction.is_active() => {
                self.interaction.pointer_move(
                    &mut self.graph,
                    &mut self.viewport,
                    canvas,
                    position - rect.min,
                );
            }
            _ => {
                if self.interaction.is_active() || self.interaction.hovered().is_some() {
                    self.interaction.pointer_leave();
                }
            }
        }

        if released && self.interaction.is_active() {
            self.interaction.pointer_up();
            if let Some(position) = inside {
                self.interaction
                    .click(&self.graph, &self.viewport, position - rect.min);
                self.related_rows_visible = Self::INITIAL_RELATED_ROWS;
            }
        }

        let cursor = match self.interaction.gesture() {
            Gesture::DraggingNode { .. } | Gesture::PanningViewport { .. } => {
                Some(egui::CursorIcon::Grabbing)
            }
            Gesture::Idle if self.interaction.hovered().is_some() => {
                Some(egui::CursorIcon::PointingHand)
            }
            Gesture::Idle => None,
        };
        if let Some(cursor) = cursor {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }
    }
}
