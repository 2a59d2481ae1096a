// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

// The logger is process-wide, so this binary holds a single test.

use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

use pid_scope::graph::GraphConfig;
use pid_scope::pid::{PidConfig, PidController};
use pid_scope::plant::SimulatedPlant;
use pid_scope::regulator::Regulator;

struct Recorder {
    messages: Mutex<Vec<String>>,
}

impl Recorder {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

impl Log for Recorder {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.messages
            .lock()
            .unwrap()
            .push(record.args().to_string());
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder {
    messages: Mutex::new(Vec::new()),
};

#[test]
fn test_reset_paths_log_state_reset_once() {
    log::set_logger(&RECORDER).unwrap();
    log::set_max_level(LevelFilter::Debug);

    let mut regulator = Regulator::new(
        PidConfig::<f64>::default(),
        GraphConfig::default(),
        SimulatedPlant::default(),
    );
    regulator.set_target(1.0);
    regulator.tick();
    RECORDER.take();

    regulator.reset();
    let messages = RECORDER.take();
    assert!(messages.iter().any(|m| m == "regulator reset"));
    assert_eq!(
        messages.iter().filter(|m| *m == "PID state reset").count(),
        1
    );

    let mut pid = PidController::new(PidConfig::<f64>::default());
    pid.update(1.0, 0.0);
    RECORDER.take();

    pid.reset();
    assert_eq!(RECORDER.take(), vec!["PID state reset".to_string()]);
}
