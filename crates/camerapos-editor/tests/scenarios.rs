//! End-to-end editor sessions against a store on disk

use camerapos_core::{CameraPose, JsonPoseStore, LevelKey, Location, MockViewport, PoseStore, Rotation};
use camerapos_editor::{
    CameraPositionModule, CommandId, CommandResponse, Config, EditorShell, HostMode, LevelEvent,
    MemoryClipboard, Outcome, SettingsFile, SkipReason,
};
use std::path::Path;
use tempfile::TempDir;

type Module = CameraPositionModule<JsonPoseStore, MockViewport, MemoryClipboard>;

const FOO: &str = "/Game/Maps/Foo";

fn host_default() -> CameraPose {
    CameraPose::new(Location::new(0.0, 0.0, 170.0), Rotation::default()).with_fov(90.0)
}

fn p1() -> CameraPose {
    CameraPose::new(Location::new(1200.5, -340.25, 512.0), Rotation::new(-22.5, 135.0, 0.0)).with_fov(90.0)
}

fn p2() -> CameraPose {
    CameraPose::new(Location::new(-80.0, 4096.0, 33.3), Rotation::new(-5.0, -90.0, 0.0)).with_fov(75.0)
}

fn foo() -> LevelKey {
    LevelKey::from_level_path(FOO).unwrap()
}

/// Start an editor session whose camera sits at the host default
fn start_session(store_path: &Path, host: &mut EditorShell) -> Module {
    let mut module = CameraPositionModule::new(
        JsonPoseStore::open(store_path),
        MockViewport::new(host_default()),
        MemoryClipboard::new(),
        SettingsFile::in_memory(Config::default()),
    );
    module.startup(host);
    module
}

fn camera(module: &Module) -> Option<CameraPose> {
    module.with_coordinator(|c| c.viewport().camera())
}

fn move_camera(module: &Module, pose: CameraPose) {
    module.with_coordinator(|c| c.viewport_mut().move_to(pose));
}

#[test]
fn test_save_now_stores_moved_camera() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");
    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);

    host.events.emit(&LevelEvent::opened(FOO));
    assert_eq!(camera(&module), Some(host_default()));

    move_camera(&module, p1());
    assert_eq!(
        module.execute(CommandId::SaveCameraPosition),
        CommandResponse::Camera(Outcome::Captured(p1()))
    );
    assert_eq!(module.with_coordinator(|c| c.store().get(&foo())), Some(p1()));
    module.shutdown(&mut host);

    assert_eq!(JsonPoseStore::open(&store_path).get(&foo()), Some(p1()));
}

#[test]
fn test_reopen_restores_saved_camera() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");

    {
        let mut host = EditorShell::new(HostMode::Editor);
        let mut module = start_session(&store_path, &mut host);
        host.events.emit(&LevelEvent::opened(FOO));
        move_camera(&module, p1());
        module.execute(CommandId::SaveCameraPosition);
        host.events.emit(&LevelEvent::closing(FOO));
        module.shutdown(&mut host);
    }

    // A fresh process: new store handle, camera back at the host default
    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);
    assert_eq!(camera(&module), Some(host_default()));

    host.events.emit(&LevelEvent::opened(FOO));
    assert_eq!(camera(&module), Some(p1()));
    module.shutdown(&mut host);
}

#[test]
fn test_close_without_save_captures_camera() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");
    let mut store = JsonPoseStore::open(&store_path);
    store.put(&foo(), p1()).unwrap();
    drop(store);

    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);

    host.events.emit(&LevelEvent::opened(FOO));
    assert_eq!(camera(&module), Some(p1()));

    move_camera(&module, p2());
    host.events.emit(&LevelEvent::closing(FOO));
    assert_eq!(module.with_coordinator(|c| c.store().get(&foo())), Some(p2()));
    module.shutdown(&mut host);

    assert_eq!(JsonPoseStore::open(&store_path).get(&foo()), Some(p2()));
}

#[test]
fn test_save_now_twice_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");
    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);

    host.events.emit(&LevelEvent::opened(FOO));
    move_camera(&module, p1());
    let first = module.execute(CommandId::SaveCameraPosition);
    let second = module.execute(CommandId::SaveCameraPosition);
    assert_eq!(first, second);

    let stored = JsonPoseStore::open(&store_path);
    assert_eq!(stored.keys(), vec![foo()]);
    assert_eq!(stored.get(&foo()), Some(p1()));
    module.shutdown(&mut host);
}

#[test]
fn test_saved_and_closing_order_does_not_matter() {
    let orders: [[fn(&str) -> LevelEvent; 2]; 2] = [
        [|p| LevelEvent::saved(p), |p| LevelEvent::closing(p)],
        [|p| LevelEvent::closing(p), |p| LevelEvent::saved(p)],
    ];

    for order in orders {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("camerapos.json");
        let mut host = EditorShell::new(HostMode::Editor);
        let mut module = start_session(&store_path, &mut host);

        host.events.emit(&LevelEvent::opened(FOO));
        move_camera(&module, p2());
        for make_event in order {
            host.events.emit(&make_event(FOO));
        }

        let stored = JsonPoseStore::open(&store_path);
        assert_eq!(stored.keys(), vec![foo()]);
        assert_eq!(stored.get(&foo()), Some(p2()));
        module.shutdown(&mut host);
    }
}

#[test]
fn test_untitled_level_after_close_does_not_touch_closed_level() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");
    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);

    host.events.emit(&LevelEvent::opened(FOO));
    move_camera(&module, p1());
    host.events.emit(&LevelEvent::closing(FOO));
    host.events.emit(&LevelEvent::saved(FOO));
    host.events.emit(&LevelEvent::opened(""));
    assert_eq!(module.with_coordinator(|c| c.current_level().cloned()), None);

    move_camera(&module, p2());
    let no_level = CommandResponse::Camera(Outcome::Skipped(SkipReason::NoLevel));
    assert_eq!(module.execute(CommandId::SaveCameraPosition), no_level);
    assert_eq!(module.execute(CommandId::RestoreCameraPosition), no_level);
    assert_eq!(camera(&module), Some(p2()));
    module.shutdown(&mut host);

    assert_eq!(JsonPoseStore::open(&store_path).get(&foo()), Some(p1()));
}

#[test]
fn test_next_level_after_close_gets_its_own_entry() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");
    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);
    let bar = LevelKey::from_level_path("/Game/Maps/Bar").unwrap();

    host.events.emit(&LevelEvent::opened(FOO));
    move_camera(&module, p1());
    host.events.emit(&LevelEvent::closing(FOO));
    host.events.emit(&LevelEvent::saved(FOO));

    // The untitled level is saved under a new name, then Save Now
    host.events.emit(&LevelEvent::opened(""));
    move_camera(&module, p2());
    host.events.emit(&LevelEvent::saved(bar.as_str()));
    assert_eq!(module.execute(CommandId::SaveCameraPosition), CommandResponse::Camera(Outcome::Captured(p2())));

    let stored = JsonPoseStore::open(&store_path);
    assert_eq!(stored.get(&foo()), Some(p1()));
    assert_eq!(stored.get(&bar), Some(p2()));
    module.shutdown(&mut host);
}

#[test]
fn test_restore_now_without_entry_leaves_camera() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");
    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);

    host.events.emit(&LevelEvent::opened(FOO));
    move_camera(&module, p2());
    assert_eq!(
        module.execute(CommandId::RestoreCameraPosition),
        CommandResponse::Camera(Outcome::NoSavedPose)
    );
    assert_eq!(camera(&module), Some(p2()));
    module.shutdown(&mut host);
}

#[test]
fn test_events_after_shutdown_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");
    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);
    module.shutdown(&mut host);

    assert_eq!(host.events.emit(&LevelEvent::saved(FOO)), 0);
    assert!(!store_path.exists());
}

#[test]
fn test_corrupt_store_does_not_block_session() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("camerapos.json");
    std::fs::write(&store_path, "\u{0}\u{0}garbage").unwrap();

    let mut host = EditorShell::new(HostMode::Editor);
    let mut module = start_session(&store_path, &mut host);

    host.events.emit(&LevelEvent::opened(FOO));
    assert_eq!(camera(&module), Some(host_default()));

    move_camera(&module, p1());
    host.events.emit(&LevelEvent::saved(FOO));
    assert_eq!(JsonPoseStore::open(&store_path).get(&foo()), Some(p1()));
    module.shutdown(&mut host);
}
