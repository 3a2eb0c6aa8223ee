//! Camera position toolbar drawn with bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use camerapos_core::Axis;
use camerapos_editor::CommandId;

use crate::camera::{EditorCameraQuery, QueryViewport};
use crate::state::CameraPositionState;
use crate::systems::CameraCommand;

pub struct ToolbarUiPlugin;

impl Plugin for ToolbarUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, toolbar_ui_system);
    }
}

fn toolbar_ui_system(
    mut contexts: EguiContexts,
    mut state: ResMut<CameraPositionState>,
    mut cameras: EditorCameraQuery,
    mut commands: MessageWriter<CameraCommand>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::TopBottomPanel::top("camera_position_toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.menu_button("Options", |ui| {
                let mut show = state.show_toolbar();
                if ui
                    .checkbox(&mut show, CommandId::ToggleShowCameraPosWidget.label())
                    .on_hover_text(CommandId::ToggleShowCameraPosWidget.description())
                    .changed()
                {
                    commands.write(CameraCommand(CommandId::ToggleShowCameraPosWidget));
                }
            });

            for id in [CommandId::RestoreCameraPosition, CommandId::SaveCameraPosition] {
                if ui.button(id.label()).on_hover_text(id.description()).clicked() {
                    commands.write(CameraCommand(id));
                }
            }

            if !state.show_toolbar() {
                return;
            }
            ui.separator();

            for axis in Axis::ALL {
                let mut value = state.toolbar().axis(axis);
                ui.label(axis.letter().to_string());
                if ui
                    .add(egui::DragValue::new(&mut value).speed(1.0).max_decimals(3))
                    .changed()
                {
                    state.set_toolbar_axis(QueryViewport::new(&mut cameras), axis, value);
                }
            }

            // Copy/paste go through the OS clipboard in the command system
            for (text, id) in [
                ("Copy", CommandId::CopyCameraLocation),
                ("Paste", CommandId::PasteCameraLocation),
            ] {
                if ui.button(text).on_hover_text(id.description()).clicked() {
                    commands.write(CameraCommand(id));
                }
            }
        });
    });
}
