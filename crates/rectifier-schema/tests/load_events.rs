//! Integration test: log events emitted while loading configuration files.

use std::sync::{Arc, Mutex};

use rectifier_schema::load_file;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Records the field names of every `WARN` event.
#[derive(Clone, Default)]
struct WarnRecorder(Arc<Mutex<Vec<Vec<String>>>>);

impl<S: Subscriber> Layer<S> for WarnRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let fields = event
                .metadata()
                .fields()
                .iter()
                .map(|f| f.name().to_string())
                .collect();
            self.0.lock().unwrap().push(fields);
        }
    }
}

fn warnings_while_loading(contents: &str) -> Vec<Vec<String>> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rectifier.json");
    std::fs::write(&path, contents).unwrap();

    let recorder = WarnRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let result = tracing::subscriber::with_default(subscriber, || load_file(&path));
    assert!(result.is_err(), "Expected {contents} to be rejected");

    let warnings = recorder.0.lock().unwrap().clone();
    warnings
}

#[test]
fn rejected_file_logs_one_warning_with_its_source() {
    let warnings = warnings_while_loading(r#"{"app": {"q": {"intervals": [0]}}}"#);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].iter().any(|f| f == "source"), "{warnings:?}");
    assert!(warnings[0].iter().any(|f| f == "violations"), "{warnings:?}");
}

#[test]
fn policy_rejection_logs_one_warning() {
    let warnings = warnings_while_loading(
        r#"{"app": {"q": {"intervals": [1], "workers": [1], "cooldown": 0, "consumers_formation_name": "w"}}}"#,
    );
    assert_eq!(warnings.len(), 1, "{warnings:?}");
}
