//! The process-wide registry, in a test binary of its own.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use cvars::{CVarError, CommandResult, ConsoleSession};

fn serial() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let guard = LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    cvars::teardown();
    guard
}

#[test]
fn test_lazy_creation_and_teardown() {
    let _guard = serial();
    assert!(!cvars::is_initialized());

    assert!(cvars::exists("help"));
    assert!(cvars::is_initialized());

    assert!(cvars::teardown());
    assert!(!cvars::is_initialized());
    assert!(!cvars::teardown());
}

#[test]
fn test_create_or_get_is_idempotent() {
    let _guard = serial();

    // A per-frame function re-declaring its variable every call.
    fn frame() -> i32 {
        cvars::create_or_get("render.Frames", 0i32).unwrap().get()
    }

    let frames = cvars::create_or_get("render.Frames", 0i32).unwrap();
    frames.set(3);
    assert_eq!(frame(), 3);
    assert!(matches!(
        cvars::create("render.Frames", 1i32),
        Err(CVarError::AlreadyExists(_))
    ));
}

#[test]
fn test_bindings_survive_teardown() {
    let _guard = serial();

    let speed = cvars::create("player.Speed", 1.5f32).unwrap();
    cvars::teardown();

    assert_eq!(speed.get(), 1.5);
    assert!(matches!(cvars::get::<f32>("player.Speed"), Err(CVarError::NotFound(_))));
}

#[test]
fn test_facade_round_trip() {
    let _guard = serial();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cvars.xml");

    cvars::create("gui.width", 800i32).unwrap();
    cvars::create("gui.title", String::from("Main")).unwrap();
    cvars::create_unsaved("gui.session", 42i32).unwrap();

    assert_eq!(cvars::execute("gui.width = 1024", true).text, "gui.width = 1024");
    assert_eq!(cvars::value_as_text("gui.width").unwrap(), "1024");
    assert_eq!(cvars::save(&path, &["gui"]).unwrap(), 2);

    cvars::teardown();
    let width = cvars::create("gui.width", 0i32).unwrap();
    cvars::create("gui.title", String::new()).unwrap();

    assert_eq!(cvars::load::<&str>(&path, &[]).unwrap(), 2);
    assert_eq!(width.get(), 1024);
    assert_eq!(cvars::get::<String>("gui.title").unwrap(), "Main");
}

#[test]
fn test_functions_get_the_locked_registry() {
    let _guard = serial();

    cvars::create("count", 0i32).unwrap();
    cvars::create_function("bump", |_, registry| {
        let next = registry.get::<i32>("count").unwrap_or(0) + 1;
        match registry.set("count", next) {
            Ok(()) => CommandResult::ok(next.to_string()),
            Err(err) => CommandResult::err(err.to_string()),
        }
    })
    .unwrap();

    assert_eq!(cvars::execute("bump", true).text, "1");
    assert_eq!(cvars::execute("bump", false), CommandResult::empty());
    assert_eq!(cvars::get::<i32>("count").unwrap(), 1);
}

#[test]
fn test_completion_and_session() {
    let _guard = serial();

    cvars::create("a.one", 1i32).unwrap();
    cvars::create("a.two", 2i32).unwrap();
    cvars::create("b.one", 3i32).unwrap();

    let completion = cvars::complete("a", 80).unwrap();
    assert_eq!(completion.candidates, vec!["a.one", "a.two"]);

    let session = cvars::with_registry(ConsoleSession::new).unwrap();
    let result = cvars::with_registry(|registry| session.submit(registry, "a.two = 20"));
    assert!(result.success);
    assert_eq!(cvars::get::<i32>("a.two").unwrap(), 20);
    assert_eq!(cvars::find("one"), vec!["a.one", "b.one"]);
}
