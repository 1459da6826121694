//! Tests for the polling log follower.

use logwarden::Tailer;
use std::fs;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::tempdir;

#[derive(Clone, Default)]
struct Sink(Arc<Mutex<Vec<u8>>>);

impl Sink {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn wait_for(sink: &Sink, needle: &str) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if sink.contents().contains(needle) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    false
}

#[test]
fn emits_only_appended_bytes() {
    std::env::set_var("LOGWARDEN_TAIL_POLL_INTERVAL", "50");
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "history\n").unwrap();

    let tailer = Tailer::new(path.clone());
    let stop = tailer.stop_handle();
    let sink = Sink::default();
    let mut worker_sink = sink.clone();
    let worker = std::thread::spawn(move || tailer.run(&mut worker_sink));

    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "fresh line").unwrap();

    assert!(wait_for(&sink, "fresh line\n"));
    assert!(!sink.contents().contains("history"));

    stop.store(true, std::sync::atomic::Ordering::SeqCst);
    worker.join().unwrap().unwrap();
}

#[test]
fn truncation_resets_the_cursor() {
    std::env::set_var("LOGWARDEN_TAIL_POLL_INTERVAL", "50");
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "old content\n").unwrap();

    let tailer = Tailer::new(path.clone());
    let stop = tailer.stop_handle();
    let sink = Sink::default();
    let mut worker_sink = sink.clone();
    let worker = std::thread::spawn(move || tailer.run(&mut worker_sink));

    // Rotation truncates in place, then writing resumes.
    fs::write(&path, "").unwrap();
    std::thread::sleep(Duration::from_millis(150));
    let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "after rotation").unwrap();

    assert!(wait_for(&sink, "after rotation\n"));

    stop.store(true, std::sync::atomic::Ordering::SeqCst);
    worker.join().unwrap().unwrap();
}
